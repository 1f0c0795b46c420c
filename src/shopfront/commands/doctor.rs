//! Consistency check for every ordered set in the store.
//!
//! A set whose indexes are not exactly `1..=N` (gaps, duplicates, zeros left by an
//! interrupted writer or a hand-edited file) is renumbered by current index, ties broken
//! by persisted order. The homepage repair pass runs as well.

use crate::commands::helpers::{changed_members, commit_with_retry, index_pairs, Plan};
use crate::commands::repair::repair_homepage_articles;
use crate::commands::Outcome;
use crate::error::Result;
use crate::model::{tables, Collection, HomepageArticle, Offer};
use crate::ordering::{Sibling, SiblingSet};
use crate::store::{scan_typed, DocumentStore, WriteOp};
use serde::Serialize;

/// One ordered set that needed renumbering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetReport {
    /// Which set: `collections`, `homepage`, `collection <id>` or `offer <id>`.
    pub owner: String,
    pub size: usize,
    pub renumbered: usize,
}

fn normalize<T: Sibling>(owner: String, items: Vec<T>) -> (Vec<T>, Option<SetReport>) {
    let mut set = SiblingSet::new(items);
    if set.is_contiguous() {
        return (set.into_items(), None);
    }
    let renumbered = set.normalize();
    let report = SetReport {
        owner,
        size: set.len(),
        renumbered,
    };
    (set.into_items(), Some(report))
}

fn fix_collections<S: DocumentStore>(store: &mut S, retries: u32) -> Result<Vec<SetReport>> {
    commit_with_retry(store, tables::COLLECTIONS, retries, |store| {
        let mut reports = Vec::new();
        let mut ops = Vec::new();

        let mut set = SiblingSet::new(scan_typed::<Collection, _>(store, tables::COLLECTIONS)?);
        let before = index_pairs(&set);
        if !set.is_contiguous() {
            reports.push(SetReport {
                owner: "collections".to_string(),
                size: set.len(),
                renumbered: set.normalize(),
            });
        }
        let reindexed: Vec<String> = changed_members(&before, &set)?
            .iter()
            .map(|op| op.id().to_string())
            .collect();

        for mut collection in set.into_items() {
            let products = std::mem::take(&mut collection.products);
            let (products, report) =
                normalize(format!("collection {}", collection.id), products);
            collection.products = products;
            if report.is_some() || reindexed.contains(&collection.id) {
                ops.push(WriteOp::put(&collection.id, &collection)?);
            }
            reports.extend(report);
        }
        Ok(Plan::new(ops, reports))
    })
}

fn fix_offers<S: DocumentStore>(store: &mut S, retries: u32) -> Result<Vec<SetReport>> {
    commit_with_retry(store, tables::OFFERS, retries, |store| {
        let mut reports = Vec::new();
        let mut ops = Vec::new();
        for mut offer in scan_typed::<Offer, _>(store, tables::OFFERS)? {
            let products = std::mem::take(&mut offer.products);
            let (products, report) = normalize(format!("offer {}", offer.id), products);
            offer.products = products;
            if let Some(report) = report {
                ops.push(WriteOp::put(&offer.id, &offer)?);
                reports.push(report);
            }
        }
        Ok(Plan::new(ops, reports))
    })
}

fn fix_homepage<S: DocumentStore>(store: &mut S, retries: u32) -> Result<Option<SetReport>> {
    commit_with_retry(store, tables::HOMEPAGE_ARTICLES, retries, |store| {
        let mut set = SiblingSet::new(scan_typed::<HomepageArticle, _>(
            store,
            tables::HOMEPAGE_ARTICLES,
        )?);
        if set.is_contiguous() {
            return Ok(Plan::new(Vec::new(), None));
        }
        let before = index_pairs(&set);
        let renumbered = set.normalize();
        let ops = changed_members(&before, &set)?;
        let report = SetReport {
            owner: "homepage".to_string(),
            size: set.len(),
            renumbered,
        };
        Ok(Plan::new(ops, Some(report)))
    })
}

pub fn run<S: DocumentStore>(store: &mut S, retries: u32) -> Result<Outcome<SetReport>> {
    let mut reports = fix_collections(store, retries)?;
    reports.extend(fix_offers(store, retries)?);
    reports.extend(fix_homepage(store, retries)?);
    let repair = repair_homepage_articles(store, retries)?;

    for report in &reports {
        tracing::warn!(owner = %report.owner, renumbered = report.renumbered, "renumbered ordered set");
    }

    if reports.is_empty() && repair.is_clean() {
        return Ok(Outcome::new("No inconsistencies found.").with_items(reports));
    }

    let mut message = String::from("Inconsistencies found and fixed:");
    if !reports.is_empty() {
        message.push_str(&format!("\n  - Renumbered {} ordered set(s).", reports.len()));
    }
    if !repair.is_clean() {
        message.push_str(&format!(
            "\n  - Marked {} homepage article(s) deleted.",
            repair.marked_deleted.len()
        ));
    }
    Ok(Outcome::new(message).with_items(reports))
}
