use super::EntityStore;
use crate::error::{RecipeCartError, Result};
use crate::model::{Ingredient, Recipe, Tag, User};
use std::collections::HashSet;

/// Storage backed by an external database.
///
/// Not implemented yet: every operation returns
/// [`RecipeCartError::Unsupported`]. Commands bound to it finish with the
/// generic internal-error message.
#[derive(Debug, Clone)]
pub struct DatabaseStore {
    connection_string: String,
}

impl DatabaseStore {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
        }
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    fn unsupported<T>(&self, operation: &str) -> Result<T> {
        Err(RecipeCartError::Unsupported(format!(
            "{} is not available for database storage ({})",
            operation, self.connection_string
        )))
    }
}

impl EntityStore for DatabaseStore {
    fn get_tags(&self, _names: &[String]) -> Result<Vec<Tag>> {
        self.unsupported("get_tags")
    }

    fn get_ingredients(&self, _names: &[String]) -> Result<Vec<Ingredient>> {
        self.unsupported("get_ingredients")
    }

    fn get_recipes(&self, _names: &[String]) -> Result<Vec<Recipe>> {
        self.unsupported("get_recipes")
    }

    fn get_users(&self, _usernames: &[String]) -> Result<Vec<User>> {
        self.unsupported("get_users")
    }

    fn tag_exists(&self, _name: &str) -> Result<bool> {
        self.unsupported("tag_exists")
    }

    fn ingredient_exists(&self, _name: &str) -> Result<bool> {
        self.unsupported("ingredient_exists")
    }

    fn recipe_exists(&self, _name: &str) -> Result<bool> {
        self.unsupported("recipe_exists")
    }

    fn user_exists(&self, _username: &str) -> Result<bool> {
        self.unsupported("user_exists")
    }

    fn search_tags(&self, _tokens: &HashSet<String>) -> Result<Vec<Tag>> {
        self.unsupported("search_tags")
    }

    fn search_ingredients(&self, _tokens: &HashSet<String>) -> Result<Vec<Ingredient>> {
        self.unsupported("search_ingredients")
    }

    fn search_recipes(&self, _tokens: &HashSet<String>) -> Result<Vec<Recipe>> {
        self.unsupported("search_recipes")
    }

    fn search_users(&self, _tokens: &HashSet<String>) -> Result<Vec<User>> {
        self.unsupported("search_users")
    }

    fn update_tags(&self, _tags: Vec<Tag>) -> Result<()> {
        self.unsupported("update_tags")
    }

    fn update_ingredients(&self, _ingredients: Vec<Ingredient>) -> Result<()> {
        self.unsupported("update_ingredients")
    }

    fn update_recipes(&self, _recipes: Vec<Recipe>) -> Result<()> {
        self.unsupported("update_recipes")
    }

    fn update_users(&self, _users: Vec<User>) -> Result<()> {
        self.unsupported("update_users")
    }

    fn generate_unique_recipe_name(&self, _basis: Option<&str>) -> Result<String> {
        self.unsupported("generate_unique_recipe_name")
    }
}
