use super::{apply_ops, Document, DocumentStore, WriteOp};
use crate::error::{Result, ShopError};
use std::collections::{BTreeMap, HashMap};

#[derive(Default, Clone)]
struct Table {
    revision: u64,
    documents: BTreeMap<String, Document>,
}

/// In-memory storage for testing and development.
/// Does NOT persist data.
#[derive(Default)]
pub struct InMemoryStore {
    tables: HashMap<String, Table>,
    simulate_write_error: bool,
    interfering_writes: u32,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&mut self, simulate: bool) {
        self.simulate_write_error = simulate;
    }

    /// Pretend another writer commits right before each of the next `count` commits,
    /// so they see a revision that moved since the caller read it.
    pub fn bump_revision_before_next_commits(&mut self, count: u32) {
        self.interfering_writes = count;
    }
}

impl DocumentStore for InMemoryStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        Ok(self
            .tables
            .get(collection)
            .and_then(|t| t.documents.get(id))
            .cloned())
    }

    fn scan(&self, collection: &str) -> Result<Vec<(String, Document)>> {
        Ok(self
            .tables
            .get(collection)
            .map(|t| {
                t.documents
                    .iter()
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn revision(&self, collection: &str) -> Result<u64> {
        Ok(self.tables.get(collection).map(|t| t.revision).unwrap_or(0))
    }

    fn commit(
        &mut self,
        collection: &str,
        expected_revision: u64,
        ops: &[WriteOp],
    ) -> Result<u64> {
        if self.simulate_write_error {
            return Err(ShopError::Store("Simulated write error".to_string()));
        }

        let table = self.tables.entry(collection.to_string()).or_default();
        if self.interfering_writes > 0 {
            self.interfering_writes -= 1;
            table.revision += 1;
        }

        if table.revision != expected_revision {
            return Err(ShopError::Conflict {
                collection: collection.to_string(),
                expected: expected_revision,
                actual: table.revision,
            });
        }

        apply_ops(&mut table.documents, ops);
        table.revision += 1;
        Ok(table.revision)
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{tables, Article, Product, Visibility};

    pub struct StoreFixture {
        pub store: InMemoryStore,
        pub product_ids: Vec<String>,
        pub article_ids: Vec<String>,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
                product_ids: Vec::new(),
                article_ids: Vec::new(),
            }
        }

        pub fn with_products(mut self, count: usize) -> Self {
            for i in 0..count {
                let product = Product::new(format!("Product {}", i + 1), 1000 + i as u64, None);
                let doc = serde_json::to_value(&product).unwrap();
                self.store.put(tables::PRODUCTS, &product.id, doc).unwrap();
                self.product_ids.push(product.id);
            }
            self
        }

        pub fn with_articles(mut self, count: usize) -> Self {
            for i in 0..count {
                let article = Article::new(
                    format!("Article {}", i + 1),
                    String::new(),
                    Visibility::Public,
                );
                let doc = serde_json::to_value(&article).unwrap();
                self.store.put(tables::ARTICLES, &article.id, doc).unwrap();
                self.article_ids.push(article.id);
            }
            self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn commit_applies_batch_and_bumps_revision_once() {
        let mut store = InMemoryStore::new();
        let rev = store
            .commit(
                "things",
                0,
                &[
                    WriteOp::Put {
                        id: "a".into(),
                        doc: json!({"n": 1}),
                    },
                    WriteOp::Put {
                        id: "b".into(),
                        doc: json!({"n": 2}),
                    },
                ],
            )
            .unwrap();

        assert_eq!(rev, 1);
        assert_eq!(store.scan("things").unwrap().len(), 2);
    }

    #[test]
    fn stale_revision_is_rejected_without_partial_writes() {
        let mut store = InMemoryStore::new();
        store.put("things", "a", json!({"n": 1})).unwrap();

        let err = store
            .commit("things", 0, &[WriteOp::delete("a")])
            .unwrap_err();
        assert!(err.is_conflict());
        assert!(store.get("things", "a").unwrap().is_some());
        assert_eq!(store.revision("things").unwrap(), 1);
    }

    #[test]
    fn simulated_interference_causes_conflict() {
        let mut store = InMemoryStore::new();
        store.bump_revision_before_next_commits(1);
        assert!(store.put("things", "a", json!({})).unwrap_err().is_conflict());
        assert!(store.put("things", "a", json!({})).is_ok());
    }

    #[test]
    fn simulated_write_error_is_store_failure() {
        let mut store = InMemoryStore::new();
        store.set_simulate_write_error(true);
        let err = store.put("things", "a", json!({})).unwrap_err();
        assert!(matches!(err, ShopError::Store(_)));
    }

    #[test]
    fn delete_missing_document_is_not_found() {
        let mut store = InMemoryStore::new();
        let err = store.delete("things", "nope").unwrap_err();
        assert!(matches!(err, ShopError::NotFound(_)));
    }
}
