//! Products inside a special offer. Like collection products the set is an array on the
//! owner document, but entries are refreshed from the product catalog so an offer always
//! shows current names, prices and posters.

use crate::commands::helpers::{commit_with_retry, load_offer, load_product, Plan};
use crate::commands::Outcome;
use crate::error::{Result, ShopError};
use crate::model::{tables, Offer, OfferProduct, Product};
use crate::ordering::{SiblingSet, TargetIndex};
use crate::store::{scan_typed, DocumentStore, WriteOp};
use std::collections::HashMap;

/// Refreshes each entry from the product catalog. Entries whose product no longer
/// exists keep their stored payload.
fn enrich<S: DocumentStore + ?Sized>(
    store: &S,
    offer_id: &str,
    entries: &mut [OfferProduct],
) -> Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    let products: HashMap<String, Product> = scan_typed::<Product, _>(store, tables::PRODUCTS)?
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();

    for entry in entries.iter_mut() {
        match products.get(&entry.id) {
            Some(product) => entry.refresh_from(product),
            None => {
                tracing::warn!(offer = %offer_id, product = %entry.id, "offer references a missing product")
            }
        }
    }
    Ok(())
}

fn missing_entry(offer: &Offer, product_id: &str) -> ShopError {
    ShopError::not_found(format!("Product '{}' in offer '{}'", product_id, offer.title))
}

/// Enriches `set`, writes it back into the offer and returns the plan with the
/// materialized list as output.
fn store_set<S: DocumentStore + ?Sized>(
    store: &S,
    mut offer: Offer,
    set: SiblingSet<OfferProduct>,
) -> Result<Plan<Vec<OfferProduct>>> {
    let mut items = set.into_items();
    enrich(store, &offer.id, &mut items)?;
    let listed = SiblingSet::new(items.clone()).into_materialized();
    offer.products = items;
    let op = WriteOp::put(&offer.id, &offer)?;
    Ok(Plan::new(vec![op], listed))
}

pub fn add<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    offer_id: &str,
    product_id: &str,
) -> Result<Outcome<OfferProduct>> {
    let listed = commit_with_retry(store, tables::OFFERS, retries, |store| {
        let offer = load_offer(store, offer_id)?;
        let mut set = SiblingSet::new(offer.products.clone());
        if set.contains(product_id) {
            return Err(ShopError::already_exists(format!(
                "Product '{}' in offer '{}'",
                product_id, offer.title
            )));
        }

        let product = load_product(store, product_id)?;
        set.insert_at_front(OfferProduct::from(&product));
        store_set(store, offer, set)
    })?;

    tracing::info!(offer = %offer_id, product = %product_id, "product added to offer");
    Ok(Outcome::new("Product added to offer").with_items(listed))
}

pub fn remove<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    offer_id: &str,
    product_id: &str,
) -> Result<Outcome<OfferProduct>> {
    let listed = commit_with_retry(store, tables::OFFERS, retries, |store| {
        let offer = load_offer(store, offer_id)?;
        let mut set = SiblingSet::new(offer.products.clone());
        set.remove_by_id(product_id)
            .map_err(|_| missing_entry(&offer, product_id))?;
        store_set(store, offer, set)
    })?;

    tracing::info!(offer = %offer_id, product = %product_id, "product removed from offer");
    Ok(Outcome::new("Product removed from offer").with_items(listed))
}

pub fn reposition<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    offer_id: &str,
    product_id: &str,
    target: TargetIndex,
) -> Result<Outcome<OfferProduct>> {
    let listed = commit_with_retry(store, tables::OFFERS, retries, |store| {
        let offer = load_offer(store, offer_id)?;
        let mut set = SiblingSet::new(offer.products.clone());
        if !set.contains(product_id) {
            return Err(missing_entry(&offer, product_id));
        }
        set.swap_by_target_index(product_id, target)?;
        store_set(store, offer, set)
    })?;

    tracing::info!(offer = %offer_id, product = %product_id, %target, "offer product repositioned");
    Ok(Outcome::new(format!("Product moved to position {}", target)).with_items(listed))
}

/// Materialized and enriched. Enrichment is not written back on read.
pub fn list<S: DocumentStore>(store: &S, offer_id: &str) -> Result<Outcome<OfferProduct>> {
    let offer = load_offer(store, offer_id)?;
    let mut listed = SiblingSet::new(offer.products).into_materialized();
    enrich(store, offer_id, &mut listed)?;
    Ok(Outcome::new(format!("{} product(s)", listed.len())).with_items(listed))
}
