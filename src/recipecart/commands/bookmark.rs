use super::{usable, EntityCommand, Step, UseCase};
use crate::error::Result;
use crate::model::{Entity, Recipe, User};
use crate::store::{EntityStore, Stored};

pub const OK_RECIPE_BOOKMARKED: &str = "Recipe bookmarking successful";
pub const NOT_OK_INVALID_RECIPE_NAME: &str =
    "Recipe bookmarking unsuccessful: the given recipe name was null or invalid";
pub const NOT_OK_INVALID_USERNAME: &str =
    "Recipe bookmarking unsuccessful: the username of the bookmark-er was null or invalid";
pub const NOT_OK_RECIPE_NOT_FOUND: &str =
    "Recipe bookmarking unsuccessful: the given recipe name doesn't correspond to an existing \
     recipe";
pub const NOT_OK_USER_NOT_FOUND: &str =
    "Recipe bookmarking unsuccessful: the given username doesn't correspond to an existing user";
pub const NOT_OK_RECIPE_ALREADY_BOOKMARKED: &str =
    "Recipe bookmarking unsuccessful: the given user already has the given recipe bookmarked";

/// Appends a recipe to a user's saved recipes.
#[derive(Debug, Clone)]
pub struct BookmarkRecipe {
    username: Option<String>,
    recipe_name: Option<String>,
}

impl BookmarkRecipe {
    pub fn new(username: impl Into<String>, recipe_name: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            recipe_name: Some(recipe_name.into()),
        }
    }

    pub fn from_parts(username: Option<String>, recipe_name: Option<String>) -> Self {
        Self {
            username,
            recipe_name,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn recipe_name(&self) -> Option<&str> {
        self.recipe_name.as_deref()
    }
}

impl UseCase for BookmarkRecipe {
    /// The user after the bookmark was added.
    type Output = User;

    fn validate(&self, store: &dyn EntityStore) -> Result<Option<&'static str>> {
        let Some(username) = usable(self.username()) else {
            return Ok(Some(NOT_OK_INVALID_USERNAME));
        };
        let Some(recipe_name) = usable(self.recipe_name()) else {
            return Ok(Some(NOT_OK_INVALID_RECIPE_NAME));
        };
        if !store.user_exists(username)? {
            return Ok(Some(NOT_OK_USER_NOT_FOUND));
        }
        if !store.recipe_exists(recipe_name)? {
            return Ok(Some(NOT_OK_RECIPE_NOT_FOUND));
        }
        Ok(None)
    }

    fn operate(&self, store: &dyn EntityStore) -> Result<Step<User>> {
        let (Some(username), Some(recipe_name)) = (self.username(), self.recipe_name()) else {
            return Ok(Step::Rejected(NOT_OK_INVALID_USERNAME));
        };
        let mut user = User::get_one(store, username)?;
        let recipe = Recipe::get_one(store, recipe_name)?;

        if user
            .saved_recipes
            .iter()
            .any(|saved| saved.key() == Some(recipe_name))
        {
            return Ok(Step::Rejected(NOT_OK_RECIPE_ALREADY_BOOKMARKED));
        }

        user.saved_recipes.push(recipe);
        store.update_users(vec![user.clone()])?;
        tracing::debug!(user = %username, recipe = %recipe_name, "bookmarked recipe");

        Ok(Step::Done {
            message: OK_RECIPE_BOOKMARKED,
            output: user,
        })
    }
}

pub type BookmarkRecipeCommand = EntityCommand<BookmarkRecipe>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Command, NOT_OK_ERROR};
    use crate::store::database::DatabaseStore;
    use crate::store::memory::fixtures::StoreFixture;
    use std::sync::Arc;

    fn run(store: Arc<dyn EntityStore>, use_case: BookmarkRecipe) -> BookmarkRecipeCommand {
        let mut cmd = use_case.command().with_storage_source(store);
        cmd.execute().unwrap();
        cmd
    }

    fn store() -> Arc<dyn EntityStore> {
        StoreFixture::new()
            .with_user(User::new("ann"))
            .with_recipe(Recipe::new("Soup"))
            .shared()
    }

    #[test]
    fn bookmarks_once() {
        let store = store();

        let first = run(store.clone(), BookmarkRecipe::new("ann", "Soup"));
        assert!(first.is_successful().unwrap());
        assert_eq!(first.execution_message().unwrap(), OK_RECIPE_BOOKMARKED);
        let ann = User::get_one(store.as_ref(), "ann").unwrap();
        assert_eq!(ann.saved_recipes, vec![Recipe::new("Soup")]);

        let second = run(store.clone(), BookmarkRecipe::new("ann", "Soup"));
        assert!(!second.is_successful().unwrap());
        assert_eq!(
            second.execution_message().unwrap(),
            NOT_OK_RECIPE_ALREADY_BOOKMARKED
        );
        let ann = User::get_one(store.as_ref(), "ann").unwrap();
        assert_eq!(ann.saved_recipes.len(), 1);
    }

    #[test]
    fn validation_order() {
        let store = store();
        let cases = [
            (BookmarkRecipe::from_parts(None, None), NOT_OK_INVALID_USERNAME),
            (
                BookmarkRecipe::from_parts(Some("ghost".into()), None),
                NOT_OK_INVALID_RECIPE_NAME,
            ),
            (BookmarkRecipe::new("ghost", "Nothing"), NOT_OK_USER_NOT_FOUND),
            (BookmarkRecipe::new("ann", "Nothing"), NOT_OK_RECIPE_NOT_FOUND),
        ];

        for (use_case, expected) in cases {
            let cmd = run(store.clone(), use_case);
            assert!(!cmd.is_successful().unwrap());
            assert_eq!(cmd.execution_message().unwrap(), expected);
        }
    }

    #[test]
    fn storage_failure_is_generic_error() {
        let cmd = run(
            Arc::new(DatabaseStore::new("db://x")),
            BookmarkRecipe::new("ann", "Soup"),
        );
        assert_eq!(cmd.execution_message().unwrap(), NOT_OK_ERROR);
    }
}
