//! # Recipecart Architecture
//!
//! Recipecart is a **recipe and shopping-list library**: four related entity
//! collections (tags, ingredients, recipes, users), a set of validated use
//! cases over them, and file snapshots for persistence. The `recipecart`
//! binary is one client of the library, not the other way around.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (args.rs, wired by main.rs)                      │
//! │  - Parses arguments, prints messages, sets the exit code    │
//! │  - The ONLY place that knows about stdout/stderr            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  API Layer (api.rs)                                         │
//! │  - EntityCommander: binds commands to storage and runs them │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Command Layer (commands/*.rs)                              │
//! │  - Run-once lifecycle, validation, business rules           │
//! │  - Reports outcomes as success flag + message + output      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/)                                     │
//! │  - EntityStore trait, one RwLock per collection             │
//! │  - MapStore (memory), FileStore (snapshots + autosave)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Entities and keys
//!
//! Every entity is identified by a string key: a tag's name, an
//! ingredient's name, a recipe's unique (non-presentation) name, a user's
//! username. Storage is upsert-by-key. Entities reference each other by
//! value in memory and by key in snapshot files (see [`form`]).
//!
//! ## Outcomes vs errors
//!
//! A command that rejects its input, or hits a storage failure, still
//! *finishes*: it reports `is_successful() == false` and a message. `Err`
//! from the command layer means the caller broke the contract, such as
//! executing a command twice.
//!
//! ## Module Overview
//!
//! - [`api`]: `EntityCommander`, the entry point for all use cases
//! - [`commands`]: the lifecycle framework and every use case
//! - [`store`]: storage trait, in-memory and file-backed implementations
//! - [`model`]: `Tag`, `Ingredient`, `Recipe`, `User`, `Amount`
//! - [`form`]: key-flattened forms used for snapshots and recipe creation
//! - [`config`]: configuration file handling
//! - [`error`]: error types

pub mod api;
pub mod commands;
pub mod config;
pub mod error;
pub mod form;
pub mod model;
pub mod store;
