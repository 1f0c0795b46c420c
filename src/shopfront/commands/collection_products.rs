//! Products inside one collection. The set lives in the collection document's
//! `products` array, so every mutation is a single document write.

use crate::commands::helpers::{commit_with_retry, load_collection, load_product, Plan};
use crate::commands::Outcome;
use crate::error::{Result, ShopError};
use crate::model::{tables, Collection, CollectionProduct};
use crate::ordering::{SiblingSet, TargetIndex};
use crate::store::{DocumentStore, WriteOp};

fn missing_entry(collection: &Collection, product_id: &str) -> ShopError {
    ShopError::not_found(format!(
        "Product '{}' in collection '{}'",
        product_id, collection.name
    ))
}

/// Writes `set` back into the collection and returns the commit plan with the
/// materialized list as output.
fn store_set(
    mut collection: Collection,
    set: SiblingSet<CollectionProduct>,
) -> Result<Plan<Vec<CollectionProduct>>> {
    let listed = set.clone().into_materialized();
    collection.products = set.into_items();
    let op = WriteOp::put(&collection.id, &collection)?;
    Ok(Plan::new(vec![op], listed))
}

/// Adds an existing product to the front of a collection.
pub fn add<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    collection_id: &str,
    product_id: &str,
) -> Result<Outcome<CollectionProduct>> {
    let listed = commit_with_retry(store, tables::COLLECTIONS, retries, |store| {
        let collection = load_collection(store, collection_id)?;
        let mut set = SiblingSet::new(collection.products.clone());
        if set.contains(product_id) {
            return Err(ShopError::already_exists(format!(
                "Product '{}' in collection '{}'",
                product_id, collection.name
            )));
        }

        let product = load_product(store, product_id)?;
        set.insert_at_front(CollectionProduct::from(&product));
        store_set(collection, set)
    })?;

    tracing::info!(collection = %collection_id, product = %product_id, "product added to collection");
    Ok(Outcome::new("Product added to collection").with_items(listed))
}

/// Removes a product from a collection and closes the gap.
pub fn remove<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    collection_id: &str,
    product_id: &str,
) -> Result<Outcome<CollectionProduct>> {
    let listed = commit_with_retry(store, tables::COLLECTIONS, retries, |store| {
        let collection = load_collection(store, collection_id)?;
        let mut set = SiblingSet::new(collection.products.clone());
        set.remove_by_id(product_id)
            .map_err(|_| missing_entry(&collection, product_id))?;
        store_set(collection, set)
    })?;

    tracing::info!(collection = %collection_id, product = %product_id, "product removed from collection");
    Ok(Outcome::new("Product removed from collection").with_items(listed))
}

pub fn reposition<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    collection_id: &str,
    product_id: &str,
    target: TargetIndex,
) -> Result<Outcome<CollectionProduct>> {
    let listed = commit_with_retry(store, tables::COLLECTIONS, retries, |store| {
        let collection = load_collection(store, collection_id)?;
        let mut set = SiblingSet::new(collection.products.clone());
        if !set.contains(product_id) {
            return Err(missing_entry(&collection, product_id));
        }
        set.swap_by_target_index(product_id, target)?;
        store_set(collection, set)
    })?;

    tracing::info!(collection = %collection_id, product = %product_id, %target, "collection product repositioned");
    Ok(Outcome::new(format!("Product moved to position {}", target)).with_items(listed))
}

pub fn list<S: DocumentStore>(store: &S, collection_id: &str) -> Result<Outcome<CollectionProduct>> {
    let collection = load_collection(store, collection_id)?;
    let listed = SiblingSet::new(collection.products).into_materialized();
    Ok(Outcome::new(format!("{} product(s)", listed.len())).with_items(listed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::collections;
    use crate::store::memory::fixtures::StoreFixture;

    struct Setup {
        fixture: StoreFixture,
        collection: String,
    }

    fn setup(products: usize) -> Setup {
        let mut fixture = StoreFixture::new().with_products(products);
        let created = collections::create(&mut fixture.store, 0, "Summer").unwrap();
        let collection = created.items()[0].id.clone();
        Setup {
            fixture,
            collection,
        }
    }

    fn order(outcome: &Outcome<CollectionProduct>) -> Vec<(String, u32)> {
        outcome
            .items()
            .iter()
            .map(|p| (p.id.clone(), p.index))
            .collect()
    }

    #[test]
    fn add_inserts_at_front_with_payload() {
        let mut s = setup(2);
        let [a, b] = [s.fixture.product_ids[0].clone(), s.fixture.product_ids[1].clone()];

        add(&mut s.fixture.store, 0, &s.collection, &a).unwrap();
        let result = add(&mut s.fixture.store, 0, &s.collection, &b).unwrap();

        assert_eq!(order(&result), vec![(b.clone(), 1), (a.clone(), 2)]);
        assert_eq!(result.items()[0].name, "Product 2");

        let listed = list(&s.fixture.store, &s.collection).unwrap();
        assert_eq!(order(&listed), order(&result));
    }

    #[test]
    fn add_rejects_duplicates_and_unknown_products() {
        let mut s = setup(1);
        let a = s.fixture.product_ids[0].clone();
        add(&mut s.fixture.store, 0, &s.collection, &a).unwrap();

        let err = add(&mut s.fixture.store, 0, &s.collection, &a).unwrap_err();
        assert!(matches!(err, ShopError::AlreadyExists(_)));

        let err = add(&mut s.fixture.store, 0, &s.collection, "ghost").unwrap_err();
        assert!(matches!(err, ShopError::NotFound(ref m) if m.contains("ghost")));

        let err = add(&mut s.fixture.store, 0, "nope", &a).unwrap_err();
        assert!(matches!(err, ShopError::NotFound(ref m) if m.starts_with("Collection")));
    }

    #[test]
    fn remove_compacts_remaining_products() {
        let mut s = setup(3);
        let ids = s.fixture.product_ids.clone();
        for id in ids.iter().rev() {
            add(&mut s.fixture.store, 0, &s.collection, id).unwrap();
        }
        // ids[0]=1, ids[1]=2, ids[2]=3
        let result = remove(&mut s.fixture.store, 0, &s.collection, &ids[1]).unwrap();
        assert_eq!(
            order(&result),
            vec![(ids[0].clone(), 1), (ids[2].clone(), 2)]
        );
    }

    #[test]
    fn remove_unknown_entry_names_the_collection() {
        let mut s = setup(1);
        let a = s.fixture.product_ids[0].clone();
        let err = remove(&mut s.fixture.store, 0, &s.collection, &a).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Product '{}' in collection 'Summer' not found", a)
        );
    }

    #[test]
    fn reposition_swaps_with_occupant() {
        let mut s = setup(3);
        let ids = s.fixture.product_ids.clone();
        for id in ids.iter().rev() {
            add(&mut s.fixture.store, 0, &s.collection, id).unwrap();
        }

        let result =
            reposition(&mut s.fixture.store, 0, &s.collection, &ids[0], TargetIndex::new(3))
                .unwrap();
        assert_eq!(
            order(&result),
            vec![
                (ids[2].clone(), 1),
                (ids[1].clone(), 2),
                (ids[0].clone(), 3)
            ]
        );
    }

    #[test]
    fn reposition_onto_itself_has_no_partner() {
        let mut s = setup(1);
        let a = s.fixture.product_ids[0].clone();
        add(&mut s.fixture.store, 0, &s.collection, &a).unwrap();

        let err = reposition(&mut s.fixture.store, 0, &s.collection, &a, TargetIndex::new(1))
            .unwrap_err();
        assert!(matches!(err, ShopError::NoSwapPartner(1)));
    }

    #[test]
    fn failed_write_keeps_previous_products() {
        let mut s = setup(2);
        let [a, b] = [s.fixture.product_ids[0].clone(), s.fixture.product_ids[1].clone()];
        add(&mut s.fixture.store, 0, &s.collection, &a).unwrap();

        s.fixture.store.set_simulate_write_error(true);
        assert!(add(&mut s.fixture.store, 0, &s.collection, &b).is_err());
        s.fixture.store.set_simulate_write_error(false);

        let listed = list(&s.fixture.store, &s.collection).unwrap();
        assert_eq!(order(&listed), vec![(a, 1)]);
    }
}
