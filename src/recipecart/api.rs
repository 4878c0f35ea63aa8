//! # API Facade
//!
//! [`EntityCommander`] is the single entry point a front end (the CLI, or a
//! request handler) uses to run use cases. It binds each command to the
//! shared storage, executes it, and hands the finished command back so the
//! caller can read the success flag, message and output.
//!
//! The facade holds no business logic; that lives in `commands/*.rs`. It
//! does no I/O or formatting either.
//!
//! Errors returned from these methods are contract violations only
//! (`IllegalState`). Validation and storage failures are reported through
//! the finished command.

use crate::commands::bookmark::{BookmarkRecipe, BookmarkRecipeCommand};
use crate::commands::create::{
    CreateEntity, CreateIngredientCommand, CreateTagCommand, CreateUserCommand,
};
use crate::commands::create_recipe::{CreateRecipe, CreateRecipeCommand};
use crate::commands::get::{
    GetEntity, GetIngredientCommand, GetRecipeCommand, GetTagCommand, GetUserCommand,
};
use crate::commands::search::{
    SearchEntities, SearchIngredientsCommand, SearchRecipesCommand, SearchTagsCommand,
    SearchUsersCommand,
};
use crate::commands::shopping::{
    AddIngredientsToShoppingList, AddIngredientsToShoppingListCommand, AddRecipeToShoppingList,
    AddRecipeToShoppingListCommand,
};
use crate::commands::{Command, EntityCommand, UseCase};
use crate::error::Result;
use crate::form::RecipeForm;
use crate::model::{Ingredient, Tag, User};
use crate::store::EntityStore;
use std::sync::Arc;

pub struct EntityCommander {
    store: Arc<dyn EntityStore>,
}

impl EntityCommander {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// Binds `command` to this commander's storage and executes it.
    pub fn execute(&self, command: &mut dyn Command) -> Result<()> {
        command.set_storage_source(Arc::clone(&self.store));
        command.execute()
    }

    fn run<U: UseCase>(&self, use_case: U) -> Result<EntityCommand<U>> {
        let mut command = use_case.command();
        self.execute(&mut command)?;
        Ok(command)
    }

    pub fn create_tag(&self, tag: Tag) -> Result<CreateTagCommand> {
        self.run(CreateEntity::new(tag))
    }

    pub fn create_ingredient(&self, ingredient: Ingredient) -> Result<CreateIngredientCommand> {
        self.run(CreateEntity::new(ingredient))
    }

    pub fn create_user(&self, user: User) -> Result<CreateUserCommand> {
        self.run(CreateEntity::new(user))
    }

    pub fn create_recipe(&self, form: RecipeForm) -> Result<CreateRecipeCommand> {
        self.run(CreateRecipe::new(form))
    }

    pub fn get_tag(&self, name: &str) -> Result<GetTagCommand> {
        self.run(GetEntity::new(name))
    }

    pub fn get_ingredient(&self, name: &str) -> Result<GetIngredientCommand> {
        self.run(GetEntity::new(name))
    }

    pub fn get_recipe(&self, name: &str) -> Result<GetRecipeCommand> {
        self.run(GetEntity::new(name))
    }

    pub fn get_user(&self, username: &str) -> Result<GetUserCommand> {
        self.run(GetEntity::new(username))
    }

    pub fn search_tags<S: AsRef<str>>(&self, terms: &[S]) -> Result<SearchTagsCommand> {
        self.run(SearchEntities::new(term_list(terms)))
    }

    pub fn search_ingredients<S: AsRef<str>>(
        &self,
        terms: &[S],
    ) -> Result<SearchIngredientsCommand> {
        self.run(SearchEntities::new(term_list(terms)))
    }

    pub fn search_recipes<S: AsRef<str>>(&self, terms: &[S]) -> Result<SearchRecipesCommand> {
        self.run(SearchEntities::new(term_list(terms)))
    }

    pub fn search_users<S: AsRef<str>>(&self, terms: &[S]) -> Result<SearchUsersCommand> {
        self.run(SearchEntities::new(term_list(terms)))
    }

    pub fn bookmark_recipe(
        &self,
        username: &str,
        recipe_name: &str,
    ) -> Result<BookmarkRecipeCommand> {
        self.run(BookmarkRecipe::new(username, recipe_name))
    }

    pub fn add_ingredients_to_shopping_list(
        &self,
        username: &str,
        ingredients: &[(String, f64)],
    ) -> Result<AddIngredientsToShoppingListCommand> {
        self.run(AddIngredientsToShoppingList::new(
            username,
            ingredients.iter().cloned(),
        ))
    }

    pub fn add_recipe_to_shopping_list(
        &self,
        username: &str,
        recipe_name: &str,
        missing_only: bool,
    ) -> Result<AddRecipeToShoppingListCommand> {
        self.run(AddRecipeToShoppingList::new(username, recipe_name).missing_only(missing_only))
    }
}

fn term_list<S: AsRef<str>>(terms: &[S]) -> Vec<&str> {
    terms.iter().map(|t| t.as_ref()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MapStore;

    fn commander() -> EntityCommander {
        EntityCommander::new(Arc::new(MapStore::new()))
    }

    #[test]
    fn commands_share_one_store() {
        let api = commander();
        let ann = api.create_user(User::new("ann")).unwrap();
        assert!(ann.is_successful().unwrap());
        let eggs = api.create_ingredient(Ingredient::new("Eggs")).unwrap();
        assert!(eggs.is_successful().unwrap());

        let recipe = api
            .create_recipe(RecipeForm::new("Omelette", "ann").with_ingredient("Eggs", 3.0))
            .unwrap();
        assert!(recipe.is_successful().unwrap());

        let found = api.search_recipes(&["omelette"]).unwrap();
        assert_eq!(found.output().unwrap().map(Vec::len), Some(1));

        let bookmark = api.bookmark_recipe("ann", "Omelette").unwrap();
        assert!(bookmark.is_successful().unwrap());

        let shop = api
            .add_recipe_to_shopping_list("ann", "Omelette", false)
            .unwrap();
        assert!(shop.is_successful().unwrap());

        let ann = api.get_user("ann").unwrap();
        let ann = ann.output().unwrap().unwrap();
        assert_eq!(ann.saved_recipes.len(), 1);
        assert_eq!(ann.authored_recipes.len(), 1);
        assert_eq!(ann.shopping_list.len(), 1);
    }

    #[test]
    fn execute_binds_storage() {
        let api = commander();
        let mut command = CreateEntity::new(Tag::new("vegan")).command();
        api.execute(&mut command).unwrap();
        assert!(command.is_successful().unwrap());
        assert!(api.store().tag_exists("vegan").unwrap());

        assert!(api.execute(&mut command).unwrap_err().is_illegal_state());
    }

    #[test]
    fn unsuccessful_commands_are_not_errors() {
        let api = commander();
        let missing = api.get_tag("nope").unwrap();
        assert!(!missing.is_successful().unwrap());

        let shop = api
            .add_ingredients_to_shopping_list("ghost", &[("Eggs".to_string(), 1.0)])
            .unwrap();
        assert!(!shop.is_successful().unwrap());
    }
}
