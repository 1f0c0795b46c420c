//! Read-path repair for homepage articles.
//!
//! Homepage entries are separate documents that point at articles by id. Deleting an
//! article leaves its homepage entry behind; this pass finds those entries and persists
//! `visibility = "deleted"` on them so the storefront stops showing them. Entries are
//! never removed here, so the homepage ordering is untouched.
//!
//! Listing homepage articles runs this pass first unless `repair-on-read` is off. It can
//! also be run on its own (and `doctor` runs it).

use crate::commands::helpers::{commit_with_retry, Plan};
use crate::error::Result;
use crate::model::{tables, Article, HomepageArticle, Visibility};
use crate::store::{scan_typed, DocumentStore, WriteOp};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepairReport {
    /// Homepage entries examined.
    pub checked: usize,
    /// Ids newly marked deleted by this run.
    pub marked_deleted: Vec<String>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.marked_deleted.is_empty()
    }
}

pub fn repair_homepage_articles<S: DocumentStore>(
    store: &mut S,
    retries: u32,
) -> Result<RepairReport> {
    let report = commit_with_retry(store, tables::HOMEPAGE_ARTICLES, retries, |store| {
        let entries: Vec<HomepageArticle> = scan_typed(store, tables::HOMEPAGE_ARTICLES)?;
        let live: HashSet<String> = scan_typed::<Article, _>(store, tables::ARTICLES)?
            .into_iter()
            .map(|a| a.id)
            .collect();

        let mut report = RepairReport {
            checked: entries.len(),
            marked_deleted: Vec::new(),
        };
        let mut ops = Vec::new();
        for mut entry in entries {
            if live.contains(&entry.id) || entry.visibility == Visibility::Deleted {
                continue;
            }
            entry.visibility = Visibility::Deleted;
            ops.push(WriteOp::put(&entry.id, &entry)?);
            report.marked_deleted.push(entry.id);
        }
        Ok(Plan::new(ops, report))
    })?;

    for id in &report.marked_deleted {
        tracing::warn!(article = %id, "homepage entry points at a missing article, marked deleted");
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{catalog, homepage};
    use crate::store::get_typed;
    use crate::store::memory::fixtures::StoreFixture;

    #[test]
    fn marks_entries_with_missing_articles() {
        let mut f = StoreFixture::new().with_articles(2);
        let [a, b] = [f.article_ids[0].clone(), f.article_ids[1].clone()];
        homepage::add(&mut f.store, 0, &a).unwrap();
        homepage::add(&mut f.store, 0, &b).unwrap();
        catalog::delete_article(&mut f.store, 0, &a).unwrap();

        let report = repair_homepage_articles(&mut f.store, 0).unwrap();
        assert_eq!(report.checked, 2);
        assert_eq!(report.marked_deleted, vec![a.clone()]);

        let entry: HomepageArticle = get_typed(&f.store, tables::HOMEPAGE_ARTICLES, &a)
            .unwrap()
            .unwrap();
        assert_eq!(entry.visibility, Visibility::Deleted);
        assert_eq!(entry.index, 2);
    }

    #[test]
    fn second_run_is_clean() {
        let mut f = StoreFixture::new().with_articles(1);
        let a = f.article_ids[0].clone();
        homepage::add(&mut f.store, 0, &a).unwrap();
        catalog::delete_article(&mut f.store, 0, &a).unwrap();

        assert!(!repair_homepage_articles(&mut f.store, 0).unwrap().is_clean());
        let revision = f.store.revision(tables::HOMEPAGE_ARTICLES).unwrap();

        let report = repair_homepage_articles(&mut f.store, 0).unwrap();
        assert!(report.is_clean());
        assert_eq!(f.store.revision(tables::HOMEPAGE_ARTICLES).unwrap(), revision);
    }

    #[test]
    fn write_failure_is_reported() {
        let mut f = StoreFixture::new().with_articles(1);
        let a = f.article_ids[0].clone();
        homepage::add(&mut f.store, 0, &a).unwrap();
        catalog::delete_article(&mut f.store, 0, &a).unwrap();

        f.store.set_simulate_write_error(true);
        assert!(repair_homepage_articles(&mut f.store, 0).is_err());
    }
}
