use crate::error::{Result, ShopError};
use crate::model::{tables, Article, Collection, Offer, Product};
use crate::ordering::{Sibling, SiblingSet};
use crate::store::{get_typed, DocumentStore, WriteOp};

/// The writes a command wants to make, plus what it returns once they land.
pub struct Plan<T> {
    pub ops: Vec<WriteOp>,
    pub output: T,
}

impl<T> Plan<T> {
    pub fn new(ops: Vec<WriteOp>, output: T) -> Self {
        Self { ops, output }
    }
}

/// Runs read-compute-commit against `collection` with optimistic concurrency.
///
/// `plan` is handed the store, loads whatever it needs and returns the batch to write.
/// If the collection moved on between the read and the commit, the whole cycle runs
/// again, at most `retries` extra times. Errors from `plan` are returned as-is and
/// nothing is written. An empty batch skips the commit.
pub fn commit_with_retry<S, T, F>(
    store: &mut S,
    collection: &str,
    retries: u32,
    mut plan: F,
) -> Result<T>
where
    S: DocumentStore,
    F: FnMut(&S) -> Result<Plan<T>>,
{
    let mut attempt = 0;
    loop {
        let revision = store.revision(collection)?;
        let Plan { ops, output } = plan(&*store)?;
        if ops.is_empty() {
            return Ok(output);
        }

        match store.commit(collection, revision, &ops) {
            Ok(_) => return Ok(output),
            Err(err) if err.is_conflict() && attempt < retries => {
                attempt += 1;
                tracing::warn!(collection, attempt, "concurrent update detected, recomputing");
            }
            Err(err) => return Err(err),
        }
    }
}

/// `Put` ops for every member whose index differs from `before`, plus members that
/// were not there before.
pub fn changed_members<T>(
    before: &[(String, u32)],
    after: &SiblingSet<T>,
) -> Result<Vec<WriteOp>>
where
    T: Sibling + serde::Serialize,
{
    after
        .iter()
        .filter(|item| {
            !before
                .iter()
                .any(|(id, index)| id == item.id() && *index == item.index())
        })
        .map(|item| WriteOp::put(item.id(), item))
        .collect()
}

/// `(id, index)` pairs, for diffing with [`changed_members`].
pub fn index_pairs<T: Sibling>(set: &SiblingSet<T>) -> Vec<(String, u32)> {
    set.iter()
        .map(|item| (item.id().to_string(), item.index()))
        .collect()
}

pub fn load_product<S: DocumentStore + ?Sized>(store: &S, id: &str) -> Result<Product> {
    get_typed(store, tables::PRODUCTS, id)?
        .ok_or_else(|| ShopError::not_found(format!("Product '{}'", id)))
}

pub fn load_article<S: DocumentStore + ?Sized>(store: &S, id: &str) -> Result<Article> {
    get_typed(store, tables::ARTICLES, id)?
        .ok_or_else(|| ShopError::not_found(format!("Article '{}'", id)))
}

pub fn load_collection<S: DocumentStore + ?Sized>(store: &S, id: &str) -> Result<Collection> {
    get_typed(store, tables::COLLECTIONS, id)?
        .ok_or_else(|| ShopError::not_found(format!("Collection '{}'", id)))
}

pub fn load_offer<S: DocumentStore + ?Sized>(store: &S, id: &str) -> Result<Offer> {
    get_typed(store, tables::OFFERS, id)?
        .ok_or_else(|| ShopError::not_found(format!("Offer '{}'", id)))
}
