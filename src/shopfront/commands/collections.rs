//! Top-level collections. Every collection document competes for a position in one
//! global ordering across the whole `collections` table.

use crate::commands::helpers::{changed_members, commit_with_retry, index_pairs, Plan};
use crate::commands::Outcome;
use crate::error::{Result, ShopError};
use crate::model::{tables, Collection};
use crate::ordering::{SiblingSet, TargetIndex};
use crate::store::{scan_typed, DocumentStore, WriteOp};

fn load_set<S: DocumentStore + ?Sized>(store: &S) -> Result<SiblingSet<Collection>> {
    Ok(SiblingSet::new(scan_typed(store, tables::COLLECTIONS)?))
}

/// Creates a collection at index 1 and moves every other collection down one place.
pub fn create<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    name: &str,
) -> Result<Outcome<Collection>> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ShopError::InvalidInput(
            "collection name cannot be empty".to_string(),
        ));
    }

    let created = commit_with_retry(store, tables::COLLECTIONS, retries, |store| {
        let mut set = load_set(store)?;
        if set.iter().any(|c| c.name.eq_ignore_ascii_case(name)) {
            return Err(ShopError::already_exists(format!("Collection '{}'", name)));
        }

        let collection = Collection::new(name.to_string());
        let id = collection.id.clone();
        set.insert_at_front(collection);

        let ops = set
            .iter()
            .map(|c| WriteOp::put(&c.id, c))
            .collect::<Result<Vec<_>>>()?;
        let created = set
            .get(&id)
            .cloned()
            .ok_or_else(|| ShopError::not_found(format!("Collection '{}'", id)))?;
        Ok(Plan::new(ops, created))
    })?;

    tracing::info!(collection = %created.id, name = %created.name, "collection created");
    Ok(Outcome::new(format!("Collection '{}' created", created.name)).with_items(vec![created]))
}

/// Swaps a collection with whichever collection currently holds `target`.
pub fn reposition<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    id: &str,
    target: TargetIndex,
) -> Result<Outcome<Collection>> {
    let listed = commit_with_retry(store, tables::COLLECTIONS, retries, |store| {
        let mut set = load_set(store)?;
        if !set.contains(id) {
            return Err(ShopError::not_found(format!("Collection '{}'", id)));
        }
        let before = index_pairs(&set);
        set.swap_by_target_index(id, target)?;
        let ops = changed_members(&before, &set)?;
        Ok(Plan::new(ops, set.into_materialized()))
    })?;

    tracing::info!(collection = %id, %target, "collection repositioned");
    Ok(Outcome::new(format!("Collection moved to position {}", target)).with_items(listed))
}

pub fn list<S: DocumentStore>(store: &S) -> Result<Outcome<Collection>> {
    let listed = load_set(store)?.into_materialized();
    Ok(Outcome::new(format!("{} collection(s)", listed.len())).with_items(listed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryStore;

    fn names(outcome: &Outcome<Collection>) -> Vec<(String, u32)> {
        outcome
            .items()
            .iter()
            .map(|c| (c.name.clone(), c.index))
            .collect()
    }

    fn id_of(store: &InMemoryStore, name: &str) -> String {
        list(store)
            .unwrap()
            .items()
            .iter()
            .find(|c| c.name == name)
            .unwrap()
            .id
            .clone()
    }

    #[test]
    fn newest_collection_takes_first_place() {
        let mut store = InMemoryStore::new();
        create(&mut store, 0, "Summer").unwrap();
        create(&mut store, 0, "Winter").unwrap();
        let result = create(&mut store, 0, "Sale").unwrap();
        assert_eq!(result.items()[0].index, 1);

        let listed = list(&store).unwrap();
        assert_eq!(
            names(&listed),
            vec![
                ("Sale".to_string(), 1),
                ("Winter".to_string(), 2),
                ("Summer".to_string(), 3)
            ]
        );
    }

    #[test]
    fn duplicate_name_is_rejected() {
        let mut store = InMemoryStore::new();
        create(&mut store, 0, "Summer").unwrap();
        let err = create(&mut store, 0, "summer").unwrap_err();
        assert!(matches!(err, ShopError::AlreadyExists(_)));
        assert_eq!(list(&store).unwrap().items().len(), 1);
    }

    #[test]
    fn reposition_swaps_two_collections() {
        let mut store = InMemoryStore::new();
        for name in ["A", "B", "C"] {
            create(&mut store, 0, name).unwrap();
        }
        // C=1, B=2, A=3
        let c = id_of(&store, "C");
        let result = reposition(&mut store, 0, &c, TargetIndex::new(3)).unwrap();
        assert_eq!(
            names(&result),
            vec![
                ("A".to_string(), 1),
                ("B".to_string(), 2),
                ("C".to_string(), 3)
            ]
        );
        assert_eq!(names(&list(&store).unwrap()), names(&result));
    }

    #[test]
    fn reposition_touches_only_the_two_documents() {
        let mut store = InMemoryStore::new();
        for name in ["A", "B", "C"] {
            create(&mut store, 0, name).unwrap();
        }
        let b_before = store.get(tables::COLLECTIONS, &id_of(&store, "B")).unwrap();
        let c = id_of(&store, "C");
        reposition(&mut store, 0, &c, TargetIndex::new(3)).unwrap();
        let b_after = store.get(tables::COLLECTIONS, &id_of(&store, "B")).unwrap();
        assert_eq!(b_before, b_after);
    }

    #[test]
    fn reposition_failures_leave_order_untouched() {
        let mut store = InMemoryStore::new();
        create(&mut store, 0, "A").unwrap();
        create(&mut store, 0, "B").unwrap();
        let a = id_of(&store, "A");
        let before = names(&list(&store).unwrap());

        let err = reposition(&mut store, 0, &a, TargetIndex::new(5)).unwrap_err();
        assert!(matches!(err, ShopError::InvalidIndex(_)));

        let err = reposition(&mut store, 0, &a, TargetIndex::new(2)).unwrap_err();
        assert!(matches!(err, ShopError::NoSwapPartner(2)));

        let err = reposition(&mut store, 0, "missing", TargetIndex::new(1)).unwrap_err();
        assert!(matches!(err, ShopError::NotFound(_)));

        assert_eq!(names(&list(&store).unwrap()), before);
    }

    #[test]
    fn write_failure_discards_the_reorder() {
        let mut store = InMemoryStore::new();
        create(&mut store, 0, "A").unwrap();
        store.set_simulate_write_error(true);

        let err = create(&mut store, 0, "B").unwrap_err();
        assert!(matches!(err, ShopError::Store(_)));

        store.set_simulate_write_error(false);
        assert_eq!(names(&list(&store).unwrap()), vec![("A".to_string(), 1)]);
    }

    #[test]
    fn concurrent_writer_is_absorbed_by_retry() {
        let mut store = InMemoryStore::new();
        create(&mut store, 0, "A").unwrap();
        store.bump_revision_before_next_commits(1);

        create(&mut store, 2, "B").unwrap();
        assert_eq!(
            names(&list(&store).unwrap()),
            vec![("B".to_string(), 1), ("A".to_string(), 2)]
        );
    }

    #[test]
    fn conflict_without_retries_surfaces() {
        let mut store = InMemoryStore::new();
        store.bump_revision_before_next_commits(1);
        let err = create(&mut store, 0, "A").unwrap_err();
        assert!(err.is_conflict());
    }
}
