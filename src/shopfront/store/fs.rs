use super::{apply_ops, Document, DocumentStore, WriteOp};
use crate::error::{Result, ShopError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Default, Serialize, Deserialize)]
struct TableFile {
    revision: u64,
    #[serde(default)]
    documents: BTreeMap<String, Document>,
}

/// File-backed document store: one JSON file per collection.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn table_path(&self, collection: &str) -> Result<PathBuf> {
        let valid = !collection.is_empty()
            && collection
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(ShopError::Store(format!(
                "Invalid collection name: {}",
                collection
            )));
        }
        Ok(self.root.join(format!("{}.json", collection)))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root)?;
        }
        Ok(())
    }

    fn load_table(&self, collection: &str) -> Result<TableFile> {
        let path = self.table_path(collection)?;
        if !path.exists() {
            return Ok(TableFile::default());
        }
        let content = fs::read_to_string(&path)?;
        let table: TableFile = serde_json::from_str(&content)?;
        Ok(table)
    }

    /// Writes to a sibling tmp file, then renames over the target so readers never see
    /// a half-written table.
    fn save_table(&self, collection: &str, table: &TableFile) -> Result<()> {
        self.ensure_dir()?;
        let path = self.table_path(collection)?;
        let tmp_path = self.root.join(format!(".{}.json.tmp", collection));
        let content = serde_json::to_string_pretty(table)?;
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

impl DocumentStore for FileStore {
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let table = self.load_table(collection)?;
        Ok(table.documents.get(id).cloned())
    }

    fn scan(&self, collection: &str) -> Result<Vec<(String, Document)>> {
        let table = self.load_table(collection)?;
        Ok(table.documents.into_iter().collect())
    }

    fn revision(&self, collection: &str) -> Result<u64> {
        Ok(self.load_table(collection)?.revision)
    }

    fn commit(
        &mut self,
        collection: &str,
        expected_revision: u64,
        ops: &[WriteOp],
    ) -> Result<u64> {
        let mut table = self.load_table(collection)?;
        if table.revision != expected_revision {
            return Err(ShopError::Conflict {
                collection: collection.to_string(),
                expected: expected_revision,
                actual: table.revision,
            });
        }

        apply_ops(&mut table.documents, ops);
        table.revision += 1;
        self.save_table(collection, &table)?;

        tracing::debug!(
            collection,
            revision = table.revision,
            ops = ops.len(),
            "committed batch"
        );
        Ok(table.revision)
    }
}
