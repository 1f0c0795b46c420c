//! Homepage articles: one global ordered set, one document per entry keyed by the
//! article id. Removing an entry renumbers the rest, and every affected document goes
//! out in the same commit as the delete.

use crate::commands::helpers::{changed_members, commit_with_retry, index_pairs, load_article, Plan};
use crate::commands::repair::{repair_homepage_articles, RepairReport};
use crate::commands::Outcome;
use crate::error::{Result, ShopError};
use crate::model::{tables, Article, HomepageArticle};
use crate::ordering::{SiblingSet, TargetIndex};
use crate::store::{scan_typed, DocumentStore, WriteOp};
use std::collections::HashMap;

fn load_set<S: DocumentStore + ?Sized>(store: &S) -> Result<SiblingSet<HomepageArticle>> {
    Ok(SiblingSet::new(scan_typed(store, tables::HOMEPAGE_ARTICLES)?))
}

fn missing_entry(id: &str) -> ShopError {
    ShopError::not_found(format!("Article '{}' on the homepage", id))
}

pub fn add<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    article_id: &str,
) -> Result<Outcome<HomepageArticle>> {
    let listed = commit_with_retry(store, tables::HOMEPAGE_ARTICLES, retries, |store| {
        let mut set = load_set(store)?;
        if set.contains(article_id) {
            return Err(ShopError::already_exists(format!(
                "Article '{}' on the homepage",
                article_id
            )));
        }

        let article = load_article(store, article_id)?;
        let before = index_pairs(&set);
        set.insert_at_front(HomepageArticle::from(&article));
        let ops = changed_members(&before, &set)?;
        Ok(Plan::new(ops, set.into_materialized()))
    })?;

    tracing::info!(article = %article_id, "article added to homepage");
    Ok(Outcome::new("Article added to homepage").with_items(listed))
}

pub fn remove<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    article_id: &str,
) -> Result<Outcome<HomepageArticle>> {
    let listed = commit_with_retry(store, tables::HOMEPAGE_ARTICLES, retries, |store| {
        let mut set = load_set(store)?;
        let before = index_pairs(&set);
        set.remove_by_id(article_id)
            .map_err(|_| missing_entry(article_id))?;

        let mut ops = vec![WriteOp::delete(article_id)];
        ops.extend(changed_members(&before, &set)?);
        Ok(Plan::new(ops, set.into_materialized()))
    })?;

    tracing::info!(article = %article_id, "article removed from homepage");
    Ok(Outcome::new("Article removed from homepage").with_items(listed))
}

pub fn reposition<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    article_id: &str,
    target: TargetIndex,
) -> Result<Outcome<HomepageArticle>> {
    let listed = commit_with_retry(store, tables::HOMEPAGE_ARTICLES, retries, |store| {
        let mut set = load_set(store)?;
        if !set.contains(article_id) {
            return Err(missing_entry(article_id));
        }
        let before = index_pairs(&set);
        set.swap_by_target_index(article_id, target)?;
        let ops = changed_members(&before, &set)?;
        Ok(Plan::new(ops, set.into_materialized()))
    })?;

    tracing::info!(article = %article_id, %target, "homepage article repositioned");
    Ok(Outcome::new(format!("Article moved to position {}", target)).with_items(listed))
}

/// Lists the homepage in order with current titles and visibility.
///
/// With `repair` set, the repair pass runs first and may write. Without it the read is
/// side-effect free, and entries whose article is gone are shown as stored.
pub fn list<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    repair: bool,
) -> Result<Outcome<HomepageArticle>> {
    let report = if repair {
        repair_homepage_articles(store, retries)?
    } else {
        RepairReport::default()
    };

    let articles: HashMap<String, Article> = scan_typed::<Article, _>(&*store, tables::ARTICLES)?
        .into_iter()
        .map(|a| (a.id.clone(), a))
        .collect();

    let mut listed = load_set(&*store)?.into_materialized();
    for entry in &mut listed {
        if let Some(article) = articles.get(&entry.id) {
            entry.refresh_from(article);
        }
    }

    let mut message = format!("{} article(s)", listed.len());
    if !report.is_clean() {
        message.push_str(&format!(
            ", {} marked deleted",
            report.marked_deleted.len()
        ));
    }
    Ok(Outcome::new(message).with_items(listed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::catalog;
    use crate::model::Visibility;
    use crate::store::memory::fixtures::StoreFixture;

    fn order(outcome: &Outcome<HomepageArticle>) -> Vec<(String, u32)> {
        outcome
            .items()
            .iter()
            .map(|a| (a.id.clone(), a.index))
            .collect()
    }

    fn with_homepage(count: usize) -> (StoreFixture, Vec<String>) {
        let mut f = StoreFixture::new().with_articles(count);
        let ids = f.article_ids.clone();
        for id in ids.iter().rev() {
            add(&mut f.store, 0, id).unwrap();
        }
        // ids[0]=1, ids[1]=2, ...
        (f, ids)
    }

    #[test]
    fn insert_then_list_shifts_existing_entries() {
        let (mut f, ids) = with_homepage(2);
        let extra = catalog::create_article(&mut f.store, 0, "Fresh", "", Visibility::Public)
            .unwrap()
            .items()[0]
            .id
            .clone();

        add(&mut f.store, 0, &extra).unwrap();
        let listed = list(&mut f.store, 0, true).unwrap();
        assert_eq!(
            order(&listed),
            vec![(extra, 1), (ids[0].clone(), 2), (ids[1].clone(), 3)]
        );
    }

    #[test]
    fn add_requires_existing_article_and_rejects_duplicates() {
        let (mut f, ids) = with_homepage(1);
        let err = add(&mut f.store, 0, &ids[0]).unwrap_err();
        assert!(matches!(err, ShopError::AlreadyExists(_)));

        let err = add(&mut f.store, 0, "ghost").unwrap_err();
        assert!(matches!(err, ShopError::NotFound(ref m) if m.starts_with("Article")));
    }

    #[test]
    fn remove_renumbers_and_deletes_in_one_commit() {
        let (mut f, ids) = with_homepage(3);
        let revision = f.store.revision(tables::HOMEPAGE_ARTICLES).unwrap();

        let result = remove(&mut f.store, 0, &ids[0]).unwrap();
        assert_eq!(
            order(&result),
            vec![(ids[1].clone(), 1), (ids[2].clone(), 2)]
        );
        assert_eq!(
            f.store.revision(tables::HOMEPAGE_ARTICLES).unwrap(),
            revision + 1
        );
        assert!(f
            .store
            .get(tables::HOMEPAGE_ARTICLES, &ids[0])
            .unwrap()
            .is_none());
    }

    #[test]
    fn remove_failure_leaves_set_intact() {
        let (mut f, ids) = with_homepage(3);
        f.store.set_simulate_write_error(true);
        assert!(remove(&mut f.store, 0, &ids[0]).is_err());
        f.store.set_simulate_write_error(false);

        let listed = list(&mut f.store, 0, false).unwrap();
        assert_eq!(listed.items().len(), 3);
        assert_eq!(listed.items()[0].id, ids[0]);
    }

    #[test]
    fn remove_unknown_is_not_found() {
        let (mut f, _) = with_homepage(1);
        let err = remove(&mut f.store, 0, "ghost").unwrap_err();
        assert_eq!(err.to_string(), "Article 'ghost' on the homepage not found");
    }

    #[test]
    fn reposition_exchanges_two_entries() {
        let (mut f, ids) = with_homepage(3);
        let result = reposition(&mut f.store, 0, &ids[0], TargetIndex::new(3)).unwrap();
        assert_eq!(
            order(&result),
            vec![
                (ids[2].clone(), 1),
                (ids[1].clone(), 2),
                (ids[0].clone(), 3)
            ]
        );

        let err = reposition(&mut f.store, 0, &ids[1], TargetIndex::new(2)).unwrap_err();
        assert!(matches!(err, ShopError::NoSwapPartner(2)));
    }

    #[test]
    fn list_refreshes_title_and_visibility() {
        let (mut f, ids) = with_homepage(1);
        catalog::set_article_visibility(&mut f.store, 0, &ids[0], Visibility::Hidden).unwrap();

        let listed = list(&mut f.store, 0, false).unwrap();
        assert_eq!(listed.items()[0].visibility, Visibility::Hidden);
        assert_eq!(listed.items()[0].title, "Article 1");
    }

    #[test]
    fn list_with_repair_marks_missing_articles() {
        let (mut f, ids) = with_homepage(2);
        catalog::delete_article(&mut f.store, 0, &ids[1]).unwrap();

        let listed = list(&mut f.store, 0, true).unwrap();
        assert_eq!(listed.items()[1].visibility, Visibility::Deleted);
        assert!(listed.message.contains("1 marked deleted"));
    }

    #[test]
    fn list_without_repair_does_not_write() {
        let (mut f, ids) = with_homepage(2);
        catalog::delete_article(&mut f.store, 0, &ids[1]).unwrap();
        let revision = f.store.revision(tables::HOMEPAGE_ARTICLES).unwrap();

        let listed = list(&mut f.store, 0, false).unwrap();
        assert_eq!(listed.items()[1].visibility, Visibility::Public);
        assert_eq!(
            f.store.revision(tables::HOMEPAGE_ARTICLES).unwrap(),
            revision
        );
    }
}
