//! # Storage Layer
//!
//! The storefront keeps its data in a keyed document store: named collections (tables)
//! of JSON documents addressed by id. [`DocumentStore`] is the gateway every command
//! goes through, so the same commands run against the file store in production and the
//! in-memory store in tests.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: one `<collection>.json` file per collection under a data
//!   directory, rewritten atomically (tmp file, then rename).
//! - [`memory::InMemoryStore`]: no persistence; includes hooks to inject write failures
//!   and simulate a concurrent writer.
//!
//! ## Revisions and commits
//!
//! Each collection carries a revision counter that increases on every successful
//! commit. Writes are always submitted as a batch through [`DocumentStore::commit`]
//! together with the revision the caller read its data at:
//!
//! - if the collection is still at that revision, every op in the batch is applied and
//!   the revision is bumped once;
//! - otherwise nothing is applied and the commit fails with
//!   [`ShopError::Conflict`](crate::error::ShopError::Conflict).
//!
//! This is what makes reordering safe: renumbering N homepage articles or swapping two
//! collections is one batch, so it lands completely or not at all, and two admins
//! reordering the same set cannot silently overwrite each other.
//!
//! ## Storage Format
//!
//! For `FileStore`:
//! ```text
//! <data dir>/
//! ├── collections.json        # {"revision": 7, "documents": {"<id>": {...}, ...}}
//! ├── homepage_articles.json
//! ├── offers.json
//! ├── products.json
//! ├── articles.json
//! └── config.json             # ShopConfig
//! ```

use crate::error::{Result, ShopError};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod fs;
pub mod memory;

pub type Document = serde_json::Value;

/// A single write inside a commit batch.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    Put { id: String, doc: Document },
    Delete { id: String },
}

impl WriteOp {
    pub fn put<T: Serialize>(id: impl Into<String>, value: &T) -> Result<Self> {
        Ok(WriteOp::Put {
            id: id.into(),
            doc: serde_json::to_value(value)?,
        })
    }

    pub fn delete(id: impl Into<String>) -> Self {
        WriteOp::Delete { id: id.into() }
    }

    pub fn id(&self) -> &str {
        match self {
            WriteOp::Put { id, .. } | WriteOp::Delete { id } => id,
        }
    }
}

/// Abstract interface for the document store.
pub trait DocumentStore {
    /// Get one document by id.
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// All documents of a collection, ordered by id.
    fn scan(&self, collection: &str) -> Result<Vec<(String, Document)>>;

    /// Current revision of a collection. Collections never written are at 0.
    fn revision(&self, collection: &str) -> Result<u64>;

    /// Apply `ops` atomically if the collection is still at `expected_revision`.
    /// Returns the new revision.
    fn commit(&mut self, collection: &str, expected_revision: u64, ops: &[WriteOp])
        -> Result<u64>;

    /// Create or replace a single document.
    fn put(&mut self, collection: &str, id: &str, doc: Document) -> Result<u64> {
        let revision = self.revision(collection)?;
        self.commit(
            collection,
            revision,
            &[WriteOp::Put {
                id: id.to_string(),
                doc,
            }],
        )
    }

    /// Delete a single document. Fails with `NotFound` if it does not exist.
    fn delete(&mut self, collection: &str, id: &str) -> Result<u64> {
        if self.get(collection, id)?.is_none() {
            return Err(ShopError::not_found(format!("Document '{}/{}'", collection, id)));
        }
        let revision = self.revision(collection)?;
        self.commit(collection, revision, &[WriteOp::delete(id)])
    }
}

pub fn get_typed<T, S>(store: &S, collection: &str, id: &str) -> Result<Option<T>>
where
    T: DeserializeOwned,
    S: DocumentStore + ?Sized,
{
    match store.get(collection, id)? {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

pub fn scan_typed<T, S>(store: &S, collection: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    S: DocumentStore + ?Sized,
{
    store
        .scan(collection)?
        .into_iter()
        .map(|(_, doc)| serde_json::from_value(doc).map_err(ShopError::from))
        .collect()
}

/// Revision plus typed contents of a collection, read together so a later commit can
/// be checked against the revision the data came from.
pub fn snapshot<T, S>(store: &S, collection: &str) -> Result<(u64, Vec<T>)>
where
    T: DeserializeOwned,
    S: DocumentStore + ?Sized,
{
    let revision = store.revision(collection)?;
    let docs = scan_typed(store, collection)?;
    Ok((revision, docs))
}

/// Applies a batch to an id-ordered document map. Shared by both stores so they
/// agree on batch semantics: ops apply in order, deleting a missing id is a no-op.
pub(crate) fn apply_ops(
    documents: &mut std::collections::BTreeMap<String, Document>,
    ops: &[WriteOp],
) {
    for op in ops {
        match op {
            WriteOp::Put { id, doc } => {
                documents.insert(id.clone(), doc.clone());
            }
            WriteOp::Delete { id } => {
                documents.remove(id);
            }
        }
    }
}
