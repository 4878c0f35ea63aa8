//! Use cases that grow a user's shopping list.
//!
//! Quantities are merged: adding 2 of an ingredient already listed at 1
//! leaves 3 on the list.

use super::{usable, EntityCommand, Step, UseCase};
use crate::error::Result;
use crate::model::{merge_amounts, Amount, Entity, Ingredient, Recipe, User};
use crate::store::{EntityStore, Stored};
use std::collections::BTreeMap;

pub const OK_SHOPPING_LIST_UPDATED: &str = "Shopping list update successful";
pub const NOT_OK_INVALID_USERNAME: &str =
    "Shopping list update unsuccessful: the given username is null or invalid";
pub const NOT_OK_USER_NOT_FOUND: &str =
    "Shopping list update unsuccessful: the given username doesn't correspond to an existing user";
pub const NOT_OK_INVALID_INGREDIENTS: &str =
    "Shopping list update unsuccessful: one of the given ingredient names is null or invalid";
pub const NOT_OK_INGREDIENT_NOT_FOUND: &str =
    "Shopping list update unsuccessful: one of the given ingredient names don't correspond to an \
     existing ingredient";
pub const NOT_OK_INVALID_RECIPE: &str =
    "Shopping list update unsuccessful: the given recipe name is null or invalid";
pub const NOT_OK_RECIPE_NOT_FOUND: &str =
    "Shopping list update unsuccessful: the given recipe name doesn't correspond to an existing \
     recipe";

pub type ShoppingList = BTreeMap<Ingredient, Amount>;

fn validate_shopper(
    store: &dyn EntityStore,
    username: Option<&str>,
) -> Result<Option<&'static str>> {
    let Some(username) = usable(username) else {
        return Ok(Some(NOT_OK_INVALID_USERNAME));
    };
    if !store.user_exists(username)? {
        return Ok(Some(NOT_OK_USER_NOT_FOUND));
    }
    Ok(None)
}

/// Merges `addition` into the shopper's list and saves the shopper.
fn save_merged(
    store: &dyn EntityStore,
    username: &str,
    addition: &ShoppingList,
) -> Result<Step<ShoppingList>> {
    let mut shopper = User::get_one(store, username)?;
    let merged = merge_amounts(&shopper.shopping_list, addition);
    shopper.shopping_list = merged.clone();
    store.update_users(vec![shopper])?;

    tracing::debug!(
        user = %username,
        added = addition.len(),
        total = merged.len(),
        "updated shopping list"
    );
    Ok(Step::Done {
        message: OK_SHOPPING_LIST_UPDATED,
        output: merged,
    })
}

/// Adds named ingredients in given quantities.
#[derive(Debug, Clone)]
pub struct AddIngredientsToShoppingList {
    username: Option<String>,
    ingredients: BTreeMap<String, Amount>,
}

impl AddIngredientsToShoppingList {
    pub fn new<I, S>(username: impl Into<String>, ingredients: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        Self {
            username: Some(username.into()),
            ingredients: ingredients
                .into_iter()
                .map(|(name, qty)| (name.into(), Amount(qty)))
                .collect(),
        }
    }

    pub fn without_user(ingredients: BTreeMap<String, Amount>) -> Self {
        Self {
            username: None,
            ingredients,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn ingredients(&self) -> &BTreeMap<String, Amount> {
        &self.ingredients
    }
}

impl UseCase for AddIngredientsToShoppingList {
    type Output = ShoppingList;

    fn validate(&self, store: &dyn EntityStore) -> Result<Option<&'static str>> {
        if let Some(invalid) = validate_shopper(store, self.username())? {
            return Ok(Some(invalid));
        }
        let well_formed = self
            .ingredients
            .iter()
            .all(|(name, qty)| usable(Some(name)).is_some() && qty.value().is_finite());
        if !well_formed {
            return Ok(Some(NOT_OK_INVALID_INGREDIENTS));
        }
        for name in self.ingredients.keys() {
            if !store.ingredient_exists(name)? {
                return Ok(Some(NOT_OK_INGREDIENT_NOT_FOUND));
            }
        }
        Ok(None)
    }

    fn operate(&self, store: &dyn EntityStore) -> Result<Step<ShoppingList>> {
        let Some(username) = self.username() else {
            return Ok(Step::Rejected(NOT_OK_INVALID_USERNAME));
        };
        let names: Vec<String> = self.ingredients.keys().cloned().collect();
        let addition: ShoppingList = store
            .get_ingredients(&names)?
            .into_iter()
            .zip(self.ingredients.values().copied())
            .collect();
        save_merged(store, username, &addition)
    }
}

/// Adds the required ingredients of a recipe, optionally skipping the
/// ingredients the user already owns.
#[derive(Debug, Clone)]
pub struct AddRecipeToShoppingList {
    username: Option<String>,
    recipe_name: Option<String>,
    missing_only: bool,
}

impl AddRecipeToShoppingList {
    pub fn new(username: impl Into<String>, recipe_name: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            recipe_name: Some(recipe_name.into()),
            missing_only: false,
        }
    }

    pub fn from_parts(username: Option<String>, recipe_name: Option<String>) -> Self {
        Self {
            username,
            recipe_name,
            missing_only: false,
        }
    }

    pub fn missing_only(mut self, missing_only: bool) -> Self {
        self.missing_only = missing_only;
        self
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn recipe_name(&self) -> Option<&str> {
        self.recipe_name.as_deref()
    }

    pub fn is_missing_only(&self) -> bool {
        self.missing_only
    }
}

impl UseCase for AddRecipeToShoppingList {
    type Output = ShoppingList;

    fn validate(&self, store: &dyn EntityStore) -> Result<Option<&'static str>> {
        if let Some(invalid) = validate_shopper(store, self.username())? {
            return Ok(Some(invalid));
        }
        let Some(recipe_name) = usable(self.recipe_name()) else {
            return Ok(Some(NOT_OK_INVALID_RECIPE));
        };
        if !store.recipe_exists(recipe_name)? {
            return Ok(Some(NOT_OK_RECIPE_NOT_FOUND));
        }
        Ok(None)
    }

    fn operate(&self, store: &dyn EntityStore) -> Result<Step<ShoppingList>> {
        let (Some(username), Some(recipe_name)) = (self.username(), self.recipe_name()) else {
            return Ok(Step::Rejected(NOT_OK_INVALID_RECIPE));
        };
        let recipe = Recipe::get_one(store, recipe_name)?;
        let mut addition = recipe.required_ingredients;

        if self.missing_only {
            let shopper = User::get_one(store, username)?;
            addition.retain(|ingredient, _| {
                !shopper
                    .owned_ingredients
                    .iter()
                    .any(|owned| owned.key() == ingredient.key())
            });
        }
        save_merged(store, username, &addition)
    }
}

pub type AddIngredientsToShoppingListCommand = EntityCommand<AddIngredientsToShoppingList>;
pub type AddRecipeToShoppingListCommand = EntityCommand<AddRecipeToShoppingList>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Command, NOT_OK_ERROR};
    use crate::store::database::DatabaseStore;
    use crate::store::memory::fixtures::StoreFixture;
    use std::sync::Arc;

    fn pantry() -> Arc<dyn EntityStore> {
        let eggs = Ingredient::new("Eggs");
        let flour = Ingredient::new("Flour").with_units("g");
        StoreFixture::new()
            .with_ingredient(eggs.clone())
            .with_ingredient(flour.clone())
            .with_user(
                User::new("ann")
                    .with_owned_ingredients([flour.clone()])
                    .with_shopping_list([(eggs.clone(), 2.0)]),
            )
            .with_recipe(
                Recipe::new("Pancakes").with_required_ingredients([(eggs, 3.0), (flour, 250.0)]),
            )
            .shared()
    }

    fn run<U: UseCase>(store: Arc<dyn EntityStore>, use_case: U) -> EntityCommand<U> {
        let mut cmd = use_case.command().with_storage_source(store);
        cmd.execute().unwrap();
        cmd
    }

    #[test]
    fn ingredient_quantities_are_summed() {
        let store = pantry();
        let cmd = run(
            store.clone(),
            AddIngredientsToShoppingList::new("ann", [("Eggs", 4.0), ("Flour", 100.0)]),
        );
        assert!(cmd.is_successful().unwrap());
        assert_eq!(cmd.execution_message().unwrap(), OK_SHOPPING_LIST_UPDATED);

        let list = cmd.output().unwrap().unwrap();
        assert_eq!(list[&Ingredient::new("Eggs")], Amount(6.0));
        assert_eq!(list[&Ingredient::new("Flour").with_units("g")], Amount(100.0));

        let ann = User::get_one(store.as_ref(), "ann").unwrap();
        assert_eq!(&ann.shopping_list, list);
    }

    #[test]
    fn ingredient_validation() {
        let store = pantry();

        let ghost = run(
            store.clone(),
            AddIngredientsToShoppingList::new("ghost", [("Eggs", 1.0)]),
        );
        assert_eq!(ghost.execution_message().unwrap(), NOT_OK_USER_NOT_FOUND);

        let nobody = run(
            store.clone(),
            AddIngredientsToShoppingList::without_user(BTreeMap::new()),
        );
        assert_eq!(nobody.execution_message().unwrap(), NOT_OK_INVALID_USERNAME);

        let blank = run(
            store.clone(),
            AddIngredientsToShoppingList::new("ann", [("", 1.0)]),
        );
        assert_eq!(blank.execution_message().unwrap(), NOT_OK_INVALID_INGREDIENTS);

        let unknown = run(
            store,
            AddIngredientsToShoppingList::new("ann", [("Saffron", 1.0)]),
        );
        assert!(!unknown.is_successful().unwrap());
        assert_eq!(
            unknown.execution_message().unwrap(),
            NOT_OK_INGREDIENT_NOT_FOUND
        );
    }

    #[test]
    fn recipe_ingredients_are_added() {
        let store = pantry();
        let cmd = run(store, AddRecipeToShoppingList::new("ann", "Pancakes"));

        let list = cmd.output().unwrap().unwrap();
        assert_eq!(list[&Ingredient::new("Eggs")], Amount(5.0));
        assert_eq!(list[&Ingredient::new("Flour").with_units("g")], Amount(250.0));
    }

    #[test]
    fn missing_only_skips_owned_ingredients() {
        let store = pantry();
        let cmd = run(
            store,
            AddRecipeToShoppingList::new("ann", "Pancakes").missing_only(true),
        );

        let list = cmd.output().unwrap().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[&Ingredient::new("Eggs")], Amount(5.0));
    }

    #[test]
    fn recipe_validation() {
        let store = pantry();

        let absent = run(
            store.clone(),
            AddRecipeToShoppingList::from_parts(Some("ann".into()), None),
        );
        assert_eq!(absent.execution_message().unwrap(), NOT_OK_INVALID_RECIPE);

        let unknown = run(store, AddRecipeToShoppingList::new("ann", "Waffles"));
        assert_eq!(unknown.execution_message().unwrap(), NOT_OK_RECIPE_NOT_FOUND);
    }

    #[test]
    fn storage_failure_is_generic_error() {
        let store: Arc<dyn EntityStore> = Arc::new(DatabaseStore::new("db://x"));
        let cmd = run(store, AddRecipeToShoppingList::new("ann", "Pancakes"));
        assert_eq!(cmd.execution_message().unwrap(), NOT_OK_ERROR);
    }
}
