use crate::ordering::Sibling;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Names of the store collections (tables) each document kind lives in.
pub mod tables {
    pub const PRODUCTS: &str = "products";
    pub const ARTICLES: &str = "articles";
    pub const OFFERS: &str = "offers";
    pub const COLLECTIONS: &str = "collections";
    pub const HOMEPAGE_ARTICLES: &str = "homepage_articles";
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Price in minor currency units.
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(name: String, price: u64, poster: Option<String>) -> Self {
        Self {
            id: new_id(),
            name,
            price,
            poster,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Hidden,
    Deleted,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Visibility::Public => "public",
            Visibility::Hidden => "hidden",
            Visibility::Deleted => "deleted",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Visibility::Public),
            "hidden" => Ok(Visibility::Hidden),
            "deleted" => Ok(Visibility::Deleted),
            other => Err(format!("Unknown visibility: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

impl Article {
    pub fn new(title: String, body: String, visibility: Visibility) -> Self {
        Self {
            id: new_id(),
            title,
            body,
            visibility,
            created_at: Utc::now(),
        }
    }
}

/// A product entry inside a collection's `products` array. Carries a full copy of the
/// product payload taken when it was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionProduct {
    pub id: String,
    pub index: u32,
    pub name: String,
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

impl From<&Product> for CollectionProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            index: 0,
            name: product.name.clone(),
            price: product.price,
            poster: product.poster.clone(),
        }
    }
}

/// A top-level collection. Collections are ordered globally across the whole
/// `collections` store collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub index: u32,
    #[serde(default)]
    pub products: Vec<CollectionProduct>,
    pub created_at: DateTime<Utc>,
}

impl Collection {
    pub fn new(name: String) -> Self {
        Self {
            id: new_id(),
            name,
            index: 0,
            products: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// A product entry inside an offer. Name, price and poster are refreshed from the
/// product store whenever the offer is read or changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferProduct {
    pub id: String,
    pub index: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<String>,
}

impl OfferProduct {
    pub fn refresh_from(&mut self, product: &Product) {
        self.name = product.name.clone();
        self.price = product.price;
        self.poster = product.poster.clone();
    }
}

impl From<&Product> for OfferProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            index: 0,
            name: product.name.clone(),
            price: product.price,
            poster: product.poster.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub products: Vec<OfferProduct>,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    pub fn new(title: String) -> Self {
        Self {
            id: new_id(),
            title,
            products: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

/// An article featured on the homepage. Stored as its own document keyed by the
/// article id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomepageArticle {
    pub id: String,
    pub index: u32,
    pub title: String,
    #[serde(default)]
    pub visibility: Visibility,
}

impl HomepageArticle {
    pub fn refresh_from(&mut self, article: &Article) {
        self.title = article.title.clone();
        self.visibility = article.visibility;
    }
}

impl From<&Article> for HomepageArticle {
    fn from(article: &Article) -> Self {
        Self {
            id: article.id.clone(),
            index: 0,
            title: article.title.clone(),
            visibility: article.visibility,
        }
    }
}

macro_rules! impl_sibling {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Sibling for $ty {
                fn id(&self) -> &str {
                    &self.id
                }

                fn index(&self) -> u32 {
                    self.index
                }

                fn set_index(&mut self, index: u32) {
                    self.index = index;
                }
            }
        )*
    };
}

impl_sibling!(Collection, CollectionProduct, OfferProduct, HomepageArticle);
