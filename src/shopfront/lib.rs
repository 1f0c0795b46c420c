//! # Shopfront Architecture
//!
//! Shopfront is the catalog administration core of a storefront: collections, special
//! offers and homepage articles, each kept in a user-defined order. It is a library that
//! happens to ship a CLI client, not the other way round.
//!
//! ## The Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, formats output, handles terminal I/O   │
//! │  - The ONLY place that knows about stdout/stderr/exit codes │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - Thin facade over commands                                │
//! │  - Normalizes inputs (raw target strings → TargetIndex)     │
//! │  - Returns status envelopes, never errors                   │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - One adapter per ordered set: load, apply, commit         │
//! │  - Operates on Rust types, returns Result<Outcome<T>>       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                 ┌────────────┴────────────┐
//!                 ▼                         ▼
//! ┌───────────────────────────┐ ┌───────────────────────────────┐
//! │  Ordering (ordering.rs)   │ │  Storage Layer (store/)       │
//! │  - SiblingSet: pure index │ │  - DocumentStore trait        │
//! │    maintenance            │ │  - FileStore, InMemoryStore   │
//! └───────────────────────────┘ └───────────────────────────────┘
//! ```
//!
//! ## Ordered sets
//!
//! Four kinds of ordered set exist, all driven by [`ordering::SiblingSet`]:
//!
//! | Set                  | Stored as                                   |
//! |----------------------|---------------------------------------------|
//! | collections          | one document per collection, global order   |
//! | collection products  | `products` array on the collection document |
//! | offer products       | `products` array on the offer document      |
//! | homepage articles    | one document per entry, global order        |
//!
//! Every change is computed in memory and committed as one batch against the revision
//! it was read at (see [`store`]), so concurrent admins cannot interleave half-applied
//! renumberings.
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! From `api.rs` inward, code never writes to stdout/stderr and never exits the process.
//! Diagnostics go through `tracing`; the subscriber is installed by the CLI (see
//! [`logging`]).
//!
//! ## Testing Strategy
//!
//! - **ordering.rs**: the index rules, exhaustively, with no store at all
//! - **commands/**: each adapter against `InMemoryStore`, including injected write
//!   failures and simulated concurrent writers
//! - **api.rs**: dispatch and error-to-envelope mapping
//! - **tests/**: the binary end to end against a temporary data directory

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod ordering;
pub mod status;
pub mod store;
