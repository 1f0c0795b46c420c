//! # CLI Layer
//!
//! This module is **one possible UI client** for shopfront, not the application itself.
//! It is the only place that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Decides the process exit code
//! - Parses shell arguments
//!
//! ## Structure
//!
//! - `run()`: parses arguments, builds the context, dispatches
//! - `init_context()`: resolves the data directory, loads config, installs logging
//! - `handle_*()`: one per command group; each calls the API and hands the envelope to
//!   [`render::emit`](super::render::emit)
//!
//! Exit code is 0 when the envelope reports success and 1 otherwise.

use super::render::emit;
use super::setup::{
    ArticleAction, Cli, CollectionAction, Commands, HomepageAction, MemberAction, OfferAction,
    ProductAction,
};
use clap::Parser;
use directories::ProjectDirs;
use shopfront::api::ShopApi;
use shopfront::commands::config::ConfigAction;
use shopfront::commands::ShopPaths;
use shopfront::config::ShopConfig;
use shopfront::error::{Result, ShopError};
use shopfront::logging::init_logging;
use shopfront::model::Visibility;
use shopfront::status::Envelope;
use shopfront::store::fs::FileStore;
use std::path::PathBuf;
use std::process::ExitCode;

pub const HOME_ENV_VAR: &str = "SHOPFRONT_HOME";

struct AppContext {
    api: ShopApi<FileStore>,
    json: bool,
}

pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let mut ctx = init_context(&cli)?;

    let ok = match cli.command {
        Commands::Collection { action } => handle_collection(&mut ctx, action),
        Commands::CollectionProduct { action } => handle_collection_product(&mut ctx, action),
        Commands::OfferProduct { action } => handle_offer_product(&mut ctx, action),
        Commands::Homepage { action } => handle_homepage(&mut ctx, action),
        Commands::Product { action } => handle_product(&mut ctx, action),
        Commands::Article { action } => handle_article(&mut ctx, action),
        Commands::Offer { action } => handle_offer(&mut ctx, action),
        Commands::Repair => emit(&ctx.api.repair_homepage(), ctx.json),
        Commands::Doctor => emit(&ctx.api.doctor(), ctx.json),
        Commands::Config { key, value } => handle_config(&mut ctx, key, value),
        Commands::Init => emit(&ctx.api.init(), ctx.json),
    };

    Ok(if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn resolve_data_dir(flag: Option<&PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = flag {
        return Ok(dir.clone());
    }
    if let Some(dir) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "shopfront", "shopfront")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| ShopError::Store("Could not determine data dir".to_string()))
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = resolve_data_dir(cli.data_dir.as_ref())?;
    let config = ShopConfig::load(&data_dir)?;
    init_logging(&config.log_level, cli.verbose);
    tracing::debug!(data_dir = %data_dir.display(), "using data directory");

    let store = FileStore::new(data_dir.clone());
    let api = ShopApi::new(store, ShopPaths::new(data_dir), config);
    Ok(AppContext {
        api,
        json: cli.json,
    })
}

fn handle_collection(ctx: &mut AppContext, action: CollectionAction) -> bool {
    match action {
        CollectionAction::Create { name } => {
            emit(&ctx.api.create_collection(&name.join(" ")), ctx.json)
        }
        CollectionAction::Move { id, target } => {
            emit(&ctx.api.reposition_collection(&id, &target), ctx.json)
        }
        CollectionAction::List => emit(&ctx.api.list_collections(), ctx.json),
    }
}

fn handle_collection_product(ctx: &mut AppContext, action: MemberAction) -> bool {
    let envelope = match action {
        MemberAction::Add { owner, product } => ctx.api.add_collection_product(&owner, &product),
        MemberAction::Remove { owner, product } => {
            ctx.api.remove_collection_product(&owner, &product)
        }
        MemberAction::Move {
            owner,
            product,
            target,
        } => ctx
            .api
            .reposition_collection_product(&owner, &product, &target),
        MemberAction::List { owner } => ctx.api.list_collection_products(&owner),
    };
    emit(&envelope, ctx.json)
}

fn handle_offer_product(ctx: &mut AppContext, action: MemberAction) -> bool {
    let envelope = match action {
        MemberAction::Add { owner, product } => ctx.api.add_offer_product(&owner, &product),
        MemberAction::Remove { owner, product } => ctx.api.remove_offer_product(&owner, &product),
        MemberAction::Move {
            owner,
            product,
            target,
        } => ctx.api.reposition_offer_product(&owner, &product, &target),
        MemberAction::List { owner } => ctx.api.list_offer_products(&owner),
    };
    emit(&envelope, ctx.json)
}

fn handle_homepage(ctx: &mut AppContext, action: HomepageAction) -> bool {
    let envelope = match action {
        HomepageAction::Add { article } => ctx.api.add_homepage_article(&article),
        HomepageAction::Remove { article } => ctx.api.remove_homepage_article(&article),
        HomepageAction::Move { article, target } => {
            ctx.api.reposition_homepage_article(&article, &target)
        }
        HomepageAction::List => ctx.api.list_homepage_articles(),
    };
    emit(&envelope, ctx.json)
}

fn handle_product(ctx: &mut AppContext, action: ProductAction) -> bool {
    let envelope = match action {
        ProductAction::Create {
            name,
            price,
            poster,
        } => ctx.api.create_product(&name, price, poster),
        ProductAction::Delete { id } => ctx.api.delete_product(&id),
        ProductAction::List => ctx.api.list_products(),
    };
    emit(&envelope, ctx.json)
}

fn handle_article(ctx: &mut AppContext, action: ArticleAction) -> bool {
    let envelope = match action {
        ArticleAction::Create {
            title,
            body,
            visibility,
        } => match visibility.parse::<Visibility>() {
            Ok(visibility) => ctx.api.create_article(&title, &body, visibility),
            Err(msg) => Envelope::failed(&ShopError::InvalidInput(msg)),
        },
        ArticleAction::Visibility { id, visibility } => match visibility.parse::<Visibility>() {
            Ok(visibility) => ctx.api.set_article_visibility(&id, visibility),
            Err(msg) => Envelope::failed(&ShopError::InvalidInput(msg)),
        },
        ArticleAction::Delete { id } => ctx.api.delete_article(&id),
        ArticleAction::List => ctx.api.list_articles(),
    };
    emit(&envelope, ctx.json)
}

fn handle_offer(ctx: &mut AppContext, action: OfferAction) -> bool {
    match action {
        OfferAction::Create { title } => emit(&ctx.api.create_offer(&title.join(" ")), ctx.json),
        OfferAction::List => emit(&ctx.api.list_offers(), ctx.json),
    }
}

fn handle_config(ctx: &mut AppContext, key: Option<String>, value: Option<String>) -> bool {
    let action = match (key, value) {
        (None, _) => ConfigAction::ShowAll,
        (Some(key), None) => ConfigAction::ShowKey(key),
        (Some(key), Some(value)) => ConfigAction::Set(key, value),
    };
    emit(&ctx.api.config_action(action), ctx.json)
}
