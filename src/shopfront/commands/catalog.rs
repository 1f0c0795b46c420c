//! Backing documents: products, articles and offers. These are plain keyed documents
//! without a position of their own; the ordered sets elsewhere point at them by id.

use crate::commands::helpers::{commit_with_retry, load_article, load_product, Plan};
use crate::commands::Outcome;
use crate::error::{Result, ShopError};
use crate::model::{tables, Article, Offer, Product, Visibility};
use crate::store::{scan_typed, DocumentStore, WriteOp};

fn require_text(field: &str, value: &str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ShopError::InvalidInput(format!("{} cannot be empty", field)));
    }
    Ok(value.to_string())
}

pub fn create_product<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    name: &str,
    price: u64,
    poster: Option<String>,
) -> Result<Outcome<Product>> {
    let product = Product::new(require_text("product name", name)?, price, poster);
    commit_with_retry(store, tables::PRODUCTS, retries, |_| {
        Ok(Plan::new(vec![WriteOp::put(&product.id, &product)?], ()))
    })?;

    tracing::info!(product = %product.id, "product created");
    Ok(Outcome::new(format!("Product '{}' created", product.name)).with_items(vec![product]))
}

/// Deletes the product document only. Collections keep their copy of the payload and
/// offers fall back to their stored copy.
pub fn delete_product<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    id: &str,
) -> Result<Outcome<Product>> {
    let product = commit_with_retry(store, tables::PRODUCTS, retries, |store| {
        let product = load_product(store, id)?;
        Ok(Plan::new(vec![WriteOp::delete(id)], product))
    })?;

    tracing::info!(product = %id, "product deleted");
    Ok(Outcome::new(format!("Product '{}' deleted", product.name)).with_items(vec![product]))
}

pub fn list_products<S: DocumentStore>(store: &S) -> Result<Outcome<Product>> {
    let mut products: Vec<Product> = scan_typed(store, tables::PRODUCTS)?;
    products.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(Outcome::new(format!("{} product(s)", products.len())).with_items(products))
}

pub fn create_article<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    title: &str,
    body: &str,
    visibility: Visibility,
) -> Result<Outcome<Article>> {
    let article = Article::new(
        require_text("article title", title)?,
        body.to_string(),
        visibility,
    );
    commit_with_retry(store, tables::ARTICLES, retries, |_| {
        Ok(Plan::new(vec![WriteOp::put(&article.id, &article)?], ()))
    })?;

    tracing::info!(article = %article.id, "article created");
    Ok(Outcome::new(format!("Article '{}' created", article.title)).with_items(vec![article]))
}

pub fn set_article_visibility<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    id: &str,
    visibility: Visibility,
) -> Result<Outcome<Article>> {
    let article = commit_with_retry(store, tables::ARTICLES, retries, |store| {
        let mut article = load_article(store, id)?;
        article.visibility = visibility;
        Ok(Plan::new(vec![WriteOp::put(id, &article)?], article))
    })?;

    tracing::info!(article = %id, %visibility, "article visibility changed");
    Ok(
        Outcome::new(format!("Article '{}' is now {}", article.title, visibility))
            .with_items(vec![article]),
    )
}

/// Deletes the article document. A homepage entry pointing at it is left in place and
/// marked deleted by the next repair pass.
pub fn delete_article<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    id: &str,
) -> Result<Outcome<Article>> {
    let article = commit_with_retry(store, tables::ARTICLES, retries, |store| {
        let article = load_article(store, id)?;
        Ok(Plan::new(vec![WriteOp::delete(id)], article))
    })?;

    tracing::info!(article = %id, "article deleted");
    Ok(Outcome::new(format!("Article '{}' deleted", article.title)).with_items(vec![article]))
}

pub fn list_articles<S: DocumentStore>(store: &S) -> Result<Outcome<Article>> {
    let mut articles: Vec<Article> = scan_typed(store, tables::ARTICLES)?;
    articles.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(Outcome::new(format!("{} article(s)", articles.len())).with_items(articles))
}

pub fn create_offer<S: DocumentStore>(
    store: &mut S,
    retries: u32,
    title: &str,
) -> Result<Outcome<Offer>> {
    let offer = Offer::new(require_text("offer title", title)?);
    commit_with_retry(store, tables::OFFERS, retries, |_| {
        Ok(Plan::new(vec![WriteOp::put(&offer.id, &offer)?], ()))
    })?;

    tracing::info!(offer = %offer.id, "offer created");
    Ok(Outcome::new(format!("Offer '{}' created", offer.title)).with_items(vec![offer]))
}

pub fn list_offers<S: DocumentStore>(store: &S) -> Result<Outcome<Offer>> {
    let mut offers: Vec<Offer> = scan_typed(store, tables::OFFERS)?;
    offers.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(Outcome::new(format!("{} offer(s)", offers.len())).with_items(offers))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::get_typed;
    use crate::store::memory::InMemoryStore;

    #[test]
    fn product_lifecycle() {
        let mut store = InMemoryStore::new();
        let created = create_product(&mut store, 0, "Hat", 1500, None).unwrap();
        let id = created.items()[0].id.clone();
        assert_eq!(list_products(&store).unwrap().items().len(), 1);

        delete_product(&mut store, 0, &id).unwrap();
        assert!(list_products(&store).unwrap().items().is_empty());

        let err = delete_product(&mut store, 0, &id).unwrap_err();
        assert!(matches!(err, ShopError::NotFound(_)));
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut store = InMemoryStore::new();
        let err = create_product(&mut store, 0, "  ", 1, None).unwrap_err();
        assert!(matches!(err, ShopError::InvalidInput(_)));
        let err = create_offer(&mut store, 0, "").unwrap_err();
        assert!(matches!(err, ShopError::InvalidInput(_)));
    }

    #[test]
    fn article_visibility_is_persisted() {
        let mut store = InMemoryStore::new();
        let created =
            create_article(&mut store, 0, "News", "body", Visibility::Public).unwrap();
        let id = created.items()[0].id.clone();

        set_article_visibility(&mut store, 0, &id, Visibility::Hidden).unwrap();
        let stored: Article = get_typed(&store, tables::ARTICLES, &id).unwrap().unwrap();
        assert_eq!(stored.visibility, Visibility::Hidden);

        delete_article(&mut store, 0, &id).unwrap();
        assert!(list_articles(&store).unwrap().items().is_empty());
    }

    #[test]
    fn offers_start_empty() {
        let mut store = InMemoryStore::new();
        create_offer(&mut store, 0, "Black Friday").unwrap();
        let offers = list_offers(&store).unwrap();
        assert_eq!(offers.items()[0].title, "Black Friday");
        assert!(offers.items()[0].products.is_empty());
    }
}
