//! # Command Layer
//!
//! One module per entity type. Each mutating command follows the same cycle:
//!
//! 1. read the collection revision and load the affected sibling set,
//! 2. apply exactly one [`SiblingSet`](crate::ordering::SiblingSet) operation in memory,
//! 3. commit every changed document as one batch against that revision
//!    (see [`helpers::commit_with_retry`]),
//! 4. return an [`Outcome`] with a human-readable message and, for list-shaped
//!    operations, the materialized list.
//!
//! Commands return `Result<Outcome<T>>`; turning errors into status envelopes is the
//! API facade's job.

use crate::error::Result;
use std::path::PathBuf;

pub mod catalog;
pub mod collection_products;
pub mod collections;
pub mod config;
pub mod doctor;
pub mod helpers;
pub mod homepage;
pub mod init;
pub mod offer_products;
pub mod repair;

#[derive(Debug, Clone)]
pub struct ShopPaths {
    pub data_dir: PathBuf,
}

impl ShopPaths {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn ensure_data_dir(&self) -> Result<&PathBuf> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(&self.data_dir)
    }
}

/// What a successful command hands back to the API layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub message: String,
    pub items: Option<Vec<T>>,
}

impl<T> Outcome<T> {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            items: None,
        }
    }

    pub fn with_items(mut self, items: Vec<T>) -> Self {
        self.items = Some(items);
        self
    }

    pub fn items(&self) -> &[T] {
        self.items.as_deref().unwrap_or(&[])
    }
}
