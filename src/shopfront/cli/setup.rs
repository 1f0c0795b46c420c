use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// "0.1.0" for releases, "0.1.0@abc1234 2024-01-15 14:30" for dev builds.
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "shopfront", bin_name = "shopfront", version = get_version())]
#[command(about = "Storefront catalog admin: collections, offers and homepage ordering", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory (defaults to $SHOPFRONT_HOME, then the platform data dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Print the raw status envelope as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage top-level collections
    #[command(display_order = 1)]
    Collection {
        #[command(subcommand)]
        action: CollectionAction,
    },

    /// Order products inside a collection
    #[command(name = "collection-product", alias = "cp", display_order = 2)]
    CollectionProduct {
        #[command(subcommand)]
        action: MemberAction,
    },

    /// Order products inside a special offer
    #[command(name = "offer-product", alias = "op", display_order = 3)]
    OfferProduct {
        #[command(subcommand)]
        action: MemberAction,
    },

    /// Order the articles featured on the homepage
    #[command(alias = "hp", display_order = 4)]
    Homepage {
        #[command(subcommand)]
        action: HomepageAction,
    },

    /// Manage products
    #[command(display_order = 10)]
    Product {
        #[command(subcommand)]
        action: ProductAction,
    },

    /// Manage articles
    #[command(display_order = 11)]
    Article {
        #[command(subcommand)]
        action: ArticleAction,
    },

    /// Manage special offers
    #[command(display_order = 12)]
    Offer {
        #[command(subcommand)]
        action: OfferAction,
    },

    /// Mark homepage entries whose article is gone as deleted
    #[command(display_order = 20)]
    Repair,

    /// Check every ordered set and renumber broken ones
    #[command(display_order = 21)]
    Doctor,

    /// Get or set configuration
    #[command(display_order = 22)]
    Config {
        /// Configuration key (e.g., conflict-retries)
        key: Option<String>,

        /// Value to set (if omitted, prints current value)
        value: Option<String>,
    },

    /// Initialize the data directory
    #[command(display_order = 23)]
    Init,
}

#[derive(Subcommand, Debug)]
pub enum CollectionAction {
    /// Create a collection at position 1
    #[command(alias = "new")]
    Create {
        /// Collection name words (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },

    /// Swap a collection with the one at the target position
    #[command(alias = "mv")]
    Move {
        id: String,
        #[arg(allow_hyphen_values = true)]
        target: String,
    },

    /// List collections in order
    #[command(alias = "ls")]
    List,
}

/// Shared by collection products and offer products; `owner` is the collection or
/// offer id.
#[derive(Subcommand, Debug)]
pub enum MemberAction {
    /// Add a product at position 1
    Add { owner: String, product: String },

    /// Remove a product and close the gap
    #[command(alias = "rm")]
    Remove { owner: String, product: String },

    /// Swap a product with the one at the target position
    #[command(alias = "mv")]
    Move {
        owner: String,
        product: String,
        #[arg(allow_hyphen_values = true)]
        target: String,
    },

    /// List products in order
    #[command(alias = "ls")]
    List { owner: String },
}

#[derive(Subcommand, Debug)]
pub enum HomepageAction {
    /// Feature an article at position 1
    Add { article: String },

    /// Remove an article from the homepage and close the gap
    #[command(alias = "rm")]
    Remove { article: String },

    /// Swap an article with the one at the target position
    #[command(alias = "mv")]
    Move {
        article: String,
        #[arg(allow_hyphen_values = true)]
        target: String,
    },

    /// List homepage articles in order
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand, Debug)]
pub enum ProductAction {
    /// Create a product
    #[command(alias = "new")]
    Create {
        name: String,

        /// Price in minor units (cents)
        price: u64,

        /// Poster image URL
        #[arg(long)]
        poster: Option<String>,
    },

    /// Delete a product
    #[command(alias = "rm")]
    Delete { id: String },

    /// List products
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand, Debug)]
pub enum ArticleAction {
    /// Create an article
    #[command(alias = "new")]
    Create {
        title: String,

        #[arg(long, default_value = "")]
        body: String,

        /// public, hidden or deleted
        #[arg(long, default_value = "public")]
        visibility: String,
    },

    /// Change an article's visibility (public, hidden or deleted)
    Visibility { id: String, visibility: String },

    /// Delete an article
    #[command(alias = "rm")]
    Delete { id: String },

    /// List articles
    #[command(alias = "ls")]
    List,
}

#[derive(Subcommand, Debug)]
pub enum OfferAction {
    /// Create an offer
    #[command(alias = "new")]
    Create {
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,
    },

    /// List offers
    #[command(alias = "ls")]
    List,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_nested_move_with_global_flags() {
        let cli = Cli::try_parse_from([
            "shopfront",
            "--json",
            "collection-product",
            "mv",
            "c1",
            "p1",
            "3",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::CollectionProduct {
                action:
                    MemberAction::Move {
                        owner,
                        product,
                        target,
                    },
            } => {
                assert_eq!(owner, "c1");
                assert_eq!(product, "p1");
                assert_eq!(target, "3");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn target_is_taken_verbatim() {
        let cli = Cli::try_parse_from(["shopfront", "homepage", "move", "a1", "abc"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Homepage {
                action: HomepageAction::Move { ref target, .. }
            } if target == "abc"
        ));
    }
}
