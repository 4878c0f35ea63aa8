//! # Storage Layer
//!
//! The [`EntityStore`] trait is the storage engine contract every use case
//! talks to. It is deliberately shaped per collection (tags, ingredients,
//! recipes, users) with the same five operations on each: batch fetch by
//! key, existence check, token search, and upsert, plus unique recipe-name
//! generation.
//!
//! ## Implementations
//!
//! - [`memory::MapStore`]: in-memory maps, one `RwLock` per collection.
//! - [`fs::FileStore`]: a `MapStore` plus whole-dataset snapshots to a file
//!   and call-counting autosave.
//! - [`database::DatabaseStore`]: placeholder for an external database; every
//!   operation fails with `Unsupported`.
//!
//! ## Contract
//!
//! Any implementation must honor the same semantics:
//!
//! - `get_*` is all-or-nothing: one absent key fails the whole call with
//!   `NotFound` and nothing is returned.
//! - `search_*` matches when any whitespace-separated, lowercased word of the
//!   key (and, for recipes, of the presentation name) is one of the lowercased
//!   tokens. Results are distinct and sorted by key.
//! - `update_*` rejects the whole batch if any entity lacks a key, otherwise
//!   upserts every entity.
//!
//! ## Generic access
//!
//! Commands are written once for all entity types through [`Stored`], which
//! routes each operation to the matching collection of a `&dyn EntityStore`.

use crate::error::{RecipeCartError, Result};
use crate::model::{Entity, Ingredient, Recipe, Tag, User};
use std::collections::HashSet;

pub mod database;
pub mod fs;
pub mod memory;
pub mod mock;
pub mod snapshot;

pub trait EntityStore: Send + Sync {
    fn get_tags(&self, names: &[String]) -> Result<Vec<Tag>>;
    fn get_ingredients(&self, names: &[String]) -> Result<Vec<Ingredient>>;
    fn get_recipes(&self, names: &[String]) -> Result<Vec<Recipe>>;
    fn get_users(&self, usernames: &[String]) -> Result<Vec<User>>;

    fn tag_exists(&self, name: &str) -> Result<bool>;
    fn ingredient_exists(&self, name: &str) -> Result<bool>;
    fn recipe_exists(&self, name: &str) -> Result<bool>;
    fn user_exists(&self, username: &str) -> Result<bool>;

    fn search_tags(&self, tokens: &HashSet<String>) -> Result<Vec<Tag>>;
    fn search_ingredients(&self, tokens: &HashSet<String>) -> Result<Vec<Ingredient>>;
    fn search_recipes(&self, tokens: &HashSet<String>) -> Result<Vec<Recipe>>;
    fn search_users(&self, tokens: &HashSet<String>) -> Result<Vec<User>>;

    fn update_tags(&self, tags: Vec<Tag>) -> Result<()>;
    fn update_ingredients(&self, ingredients: Vec<Ingredient>) -> Result<()>;
    fn update_recipes(&self, recipes: Vec<Recipe>) -> Result<()>;
    fn update_users(&self, users: Vec<User>) -> Result<()>;

    /// Derives a recipe name that is not currently taken.
    ///
    /// The name is not reserved: a concurrent `update_recipes` may claim it
    /// before the caller saves.
    fn generate_unique_recipe_name(&self, basis: Option<&str>) -> Result<String>;
}

/// Routes the per-collection operations of an [`EntityStore`] by entity type.
pub trait Stored: Entity {
    fn get_by_keys(store: &dyn EntityStore, keys: &[String]) -> Result<Vec<Self>>;
    fn exists(store: &dyn EntityStore, key: &str) -> Result<bool>;
    fn search(store: &dyn EntityStore, tokens: &HashSet<String>) -> Result<Vec<Self>>;
    fn update(store: &dyn EntityStore, entities: Vec<Self>) -> Result<()>;

    /// Fetches exactly one entity.
    fn get_one(store: &dyn EntityStore, key: &str) -> Result<Self> {
        Self::get_by_keys(store, &[key.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| RecipeCartError::NotFound {
                kind: Self::KIND,
                key: key.to_string(),
            })
    }
}

impl Stored for Tag {
    fn get_by_keys(store: &dyn EntityStore, keys: &[String]) -> Result<Vec<Self>> {
        store.get_tags(keys)
    }

    fn exists(store: &dyn EntityStore, key: &str) -> Result<bool> {
        store.tag_exists(key)
    }

    fn search(store: &dyn EntityStore, tokens: &HashSet<String>) -> Result<Vec<Self>> {
        store.search_tags(tokens)
    }

    fn update(store: &dyn EntityStore, entities: Vec<Self>) -> Result<()> {
        store.update_tags(entities)
    }
}

impl Stored for Ingredient {
    fn get_by_keys(store: &dyn EntityStore, keys: &[String]) -> Result<Vec<Self>> {
        store.get_ingredients(keys)
    }

    fn exists(store: &dyn EntityStore, key: &str) -> Result<bool> {
        store.ingredient_exists(key)
    }

    fn search(store: &dyn EntityStore, tokens: &HashSet<String>) -> Result<Vec<Self>> {
        store.search_ingredients(tokens)
    }

    fn update(store: &dyn EntityStore, entities: Vec<Self>) -> Result<()> {
        store.update_ingredients(entities)
    }
}

impl Stored for Recipe {
    fn get_by_keys(store: &dyn EntityStore, keys: &[String]) -> Result<Vec<Self>> {
        store.get_recipes(keys)
    }

    fn exists(store: &dyn EntityStore, key: &str) -> Result<bool> {
        store.recipe_exists(key)
    }

    fn search(store: &dyn EntityStore, tokens: &HashSet<String>) -> Result<Vec<Self>> {
        store.search_recipes(tokens)
    }

    fn update(store: &dyn EntityStore, entities: Vec<Self>) -> Result<()> {
        store.update_recipes(entities)
    }
}

impl Stored for User {
    fn get_by_keys(store: &dyn EntityStore, keys: &[String]) -> Result<Vec<Self>> {
        store.get_users(keys)
    }

    fn exists(store: &dyn EntityStore, key: &str) -> Result<bool> {
        store.user_exists(key)
    }

    fn search(store: &dyn EntityStore, tokens: &HashSet<String>) -> Result<Vec<Self>> {
        store.search_users(tokens)
    }

    fn update(store: &dyn EntityStore, entities: Vec<Self>) -> Result<()> {
        store.update_users(entities)
    }
}

/// Lowercases the tokens, rejecting blank ones.
pub(crate) fn fold_tokens(tokens: &HashSet<String>) -> Result<HashSet<String>> {
    tokens
        .iter()
        .map(|token| {
            if token.trim().is_empty() {
                Err(RecipeCartError::InvalidArgument(
                    "search tokens cannot be blank".to_string(),
                ))
            } else {
                Ok(token.to_lowercase())
            }
        })
        .collect()
}

/// True if any whitespace-separated word of `text`, lowercased, is a token.
pub(crate) fn matches_tokens(text: &str, folded_tokens: &HashSet<String>) -> bool {
    text.to_lowercase()
        .split_whitespace()
        .any(|word| folded_tokens.contains(word))
}

/// Trims `basis` and joins its whitespace-separated words with `-`.
pub(crate) fn recipe_name_candidate(basis: &str) -> String {
    basis.split_whitespace().collect::<Vec<_>>().join("-")
}
