//! # API Facade
//!
//! The API layer is a **thin facade** over the command layer and the single entry point
//! for every UI (the bundled CLI, an admin web handler, tests).
//!
//! ## Role and Responsibilities
//!
//! - **Dispatches** to the appropriate command function
//! - **Normalizes inputs**: target indexes arrive as raw strings and are turned into
//!   [`TargetIndex`] here
//! - **Recovers every error**: each method returns an [`Envelope`], never a `Result`.
//!   A failed command becomes a `failed` envelope carrying the error's status code and
//!   message, and is logged
//!
//! ## Generic Over DocumentStore
//!
//! `ShopApi<S: DocumentStore>` runs unchanged against:
//! - Production: `ShopApi<FileStore>`
//! - Testing: `ShopApi<InMemoryStore>`
//!
//! ## Testing Strategy
//!
//! API tests check dispatch and error-to-envelope mapping. Ordering behavior is covered
//! in `ordering.rs` and the command modules.

use crate::commands::config::ConfigAction;
use crate::commands::doctor::SetReport;
use crate::commands::repair::RepairReport;
use crate::commands::{self, Outcome, ShopPaths};
use crate::config::ShopConfig;
use crate::error::Result;
use crate::model::{
    Article, Collection, CollectionProduct, HomepageArticle, Offer, OfferProduct, Product,
    Visibility,
};
use crate::ordering::TargetIndex;
use crate::status::{Envelope, StatusCode};
use crate::store::DocumentStore;

/// The main API facade for storefront administration.
pub struct ShopApi<S: DocumentStore> {
    store: S,
    paths: ShopPaths,
    config: ShopConfig,
}

fn respond<T>(operation: &str, result: Result<Outcome<T>>) -> Envelope<T> {
    match result {
        Ok(outcome) => Envelope::success(outcome.message, outcome.items),
        Err(err) => {
            match err.status_code() {
                StatusCode::Failure => tracing::error!(operation, error = %err, "operation failed"),
                _ => tracing::warn!(operation, error = %err, "operation rejected"),
            }
            Envelope::failed(&err)
        }
    }
}

impl<S: DocumentStore> ShopApi<S> {
    pub fn new(store: S, paths: ShopPaths, config: ShopConfig) -> Self {
        Self {
            store,
            paths,
            config,
        }
    }

    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn retries(&self) -> u32 {
        self.config.conflict_retries
    }

    // --- Collections ---

    pub fn create_collection(&mut self, name: &str) -> Envelope<Collection> {
        let retries = self.retries();
        respond(
            "create_collection",
            commands::collections::create(&mut self.store, retries, name),
        )
    }

    pub fn reposition_collection(&mut self, id: &str, target: &str) -> Envelope<Collection> {
        let retries = self.retries();
        respond(
            "reposition_collection",
            commands::collections::reposition(&mut self.store, retries, id, target.into()),
        )
    }

    pub fn list_collections(&self) -> Envelope<Collection> {
        respond("list_collections", commands::collections::list(&self.store))
    }

    // --- Collection products ---

    pub fn add_collection_product(
        &mut self,
        collection_id: &str,
        product_id: &str,
    ) -> Envelope<CollectionProduct> {
        let retries = self.retries();
        respond(
            "add_collection_product",
            commands::collection_products::add(&mut self.store, retries, collection_id, product_id),
        )
    }

    pub fn remove_collection_product(
        &mut self,
        collection_id: &str,
        product_id: &str,
    ) -> Envelope<CollectionProduct> {
        let retries = self.retries();
        respond(
            "remove_collection_product",
            commands::collection_products::remove(
                &mut self.store,
                retries,
                collection_id,
                product_id,
            ),
        )
    }

    pub fn reposition_collection_product(
        &mut self,
        collection_id: &str,
        product_id: &str,
        target: &str,
    ) -> Envelope<CollectionProduct> {
        let retries = self.retries();
        respond(
            "reposition_collection_product",
            commands::collection_products::reposition(
                &mut self.store,
                retries,
                collection_id,
                product_id,
                TargetIndex::from(target),
            ),
        )
    }

    pub fn list_collection_products(&self, collection_id: &str) -> Envelope<CollectionProduct> {
        respond(
            "list_collection_products",
            commands::collection_products::list(&self.store, collection_id),
        )
    }

    // --- Offer products ---

    pub fn add_offer_product(&mut self, offer_id: &str, product_id: &str) -> Envelope<OfferProduct> {
        let retries = self.retries();
        respond(
            "add_offer_product",
            commands::offer_products::add(&mut self.store, retries, offer_id, product_id),
        )
    }

    pub fn remove_offer_product(
        &mut self,
        offer_id: &str,
        product_id: &str,
    ) -> Envelope<OfferProduct> {
        let retries = self.retries();
        respond(
            "remove_offer_product",
            commands::offer_products::remove(&mut self.store, retries, offer_id, product_id),
        )
    }

    pub fn reposition_offer_product(
        &mut self,
        offer_id: &str,
        product_id: &str,
        target: &str,
    ) -> Envelope<OfferProduct> {
        let retries = self.retries();
        respond(
            "reposition_offer_product",
            commands::offer_products::reposition(
                &mut self.store,
                retries,
                offer_id,
                product_id,
                TargetIndex::from(target),
            ),
        )
    }

    pub fn list_offer_products(&self, offer_id: &str) -> Envelope<OfferProduct> {
        respond(
            "list_offer_products",
            commands::offer_products::list(&self.store, offer_id),
        )
    }

    // --- Homepage articles ---

    pub fn add_homepage_article(&mut self, article_id: &str) -> Envelope<HomepageArticle> {
        let retries = self.retries();
        respond(
            "add_homepage_article",
            commands::homepage::add(&mut self.store, retries, article_id),
        )
    }

    pub fn remove_homepage_article(&mut self, article_id: &str) -> Envelope<HomepageArticle> {
        let retries = self.retries();
        respond(
            "remove_homepage_article",
            commands::homepage::remove(&mut self.store, retries, article_id),
        )
    }

    pub fn reposition_homepage_article(
        &mut self,
        article_id: &str,
        target: &str,
    ) -> Envelope<HomepageArticle> {
        let retries = self.retries();
        respond(
            "reposition_homepage_article",
            commands::homepage::reposition(
                &mut self.store,
                retries,
                article_id,
                TargetIndex::from(target),
            ),
        )
    }

    /// Runs the repair pass first when `repair-on-read` is enabled.
    pub fn list_homepage_articles(&mut self) -> Envelope<HomepageArticle> {
        let retries = self.retries();
        let repair = self.config.repair_on_read;
        respond(
            "list_homepage_articles",
            commands::homepage::list(&mut self.store, retries, repair),
        )
    }

    pub fn repair_homepage(&mut self) -> Envelope<RepairReport> {
        let retries = self.retries();
        let result = commands::repair::repair_homepage_articles(&mut self.store, retries).map(
            |report| {
                let message = if report.is_clean() {
                    format!("Checked {} homepage article(s), nothing to repair", report.checked)
                } else {
                    format!(
                        "Checked {} homepage article(s), marked {} deleted",
                        report.checked,
                        report.marked_deleted.len()
                    )
                };
                Outcome::new(message).with_items(vec![report])
            },
        );
        respond("repair_homepage", result)
    }

    // --- Catalog ---

    pub fn create_product(
        &mut self,
        name: &str,
        price: u64,
        poster: Option<String>,
    ) -> Envelope<Product> {
        let retries = self.retries();
        respond(
            "create_product",
            commands::catalog::create_product(&mut self.store, retries, name, price, poster),
        )
    }

    pub fn delete_product(&mut self, id: &str) -> Envelope<Product> {
        let retries = self.retries();
        respond(
            "delete_product",
            commands::catalog::delete_product(&mut self.store, retries, id),
        )
    }

    pub fn list_products(&self) -> Envelope<Product> {
        respond("list_products", commands::catalog::list_products(&self.store))
    }

    pub fn create_article(
        &mut self,
        title: &str,
        body: &str,
        visibility: Visibility,
    ) -> Envelope<Article> {
        let retries = self.retries();
        respond(
            "create_article",
            commands::catalog::create_article(&mut self.store, retries, title, body, visibility),
        )
    }

    pub fn set_article_visibility(&mut self, id: &str, visibility: Visibility) -> Envelope<Article> {
        let retries = self.retries();
        respond(
            "set_article_visibility",
            commands::catalog::set_article_visibility(&mut self.store, retries, id, visibility),
        )
    }

    pub fn delete_article(&mut self, id: &str) -> Envelope<Article> {
        let retries = self.retries();
        respond(
            "delete_article",
            commands::catalog::delete_article(&mut self.store, retries, id),
        )
    }

    pub fn list_articles(&self) -> Envelope<Article> {
        respond("list_articles", commands::catalog::list_articles(&self.store))
    }

    pub fn create_offer(&mut self, title: &str) -> Envelope<Offer> {
        let retries = self.retries();
        respond(
            "create_offer",
            commands::catalog::create_offer(&mut self.store, retries, title),
        )
    }

    pub fn list_offers(&self) -> Envelope<Offer> {
        respond("list_offers", commands::catalog::list_offers(&self.store))
    }

    // --- Maintenance ---

    pub fn doctor(&mut self) -> Envelope<SetReport> {
        let retries = self.retries();
        respond("doctor", commands::doctor::run(&mut self.store, retries))
    }

    /// A successful `Set` also takes effect for the rest of this session.
    pub fn config_action(&mut self, action: ConfigAction) -> Envelope<ShopConfig> {
        let is_set = matches!(action, ConfigAction::Set(..));
        let result = commands::config::run(&self.paths, action);
        if is_set {
            if let Some(updated) = result.as_ref().ok().and_then(|o| o.items().first()) {
                self.config = updated.clone();
            }
        }
        respond("config", result)
    }

    pub fn init(&self) -> Envelope<ShopConfig> {
        respond("init", commands::init::run(&self.paths))
    }
}
