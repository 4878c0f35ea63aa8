use super::create::{CreateEntity, CreateTagCommand};
use super::{usable, Command, EntityCommand, Step, UseCase, NOT_OK_ERROR};
use crate::error::Result;
use crate::form::RecipeForm;
use crate::model::{Entity, Recipe, Tag, User};
use crate::store::{EntityStore, Stored};
use std::collections::{BTreeMap, BTreeSet};

pub const OK_RECIPE_CREATED_WITH_GIVEN_NAME: &str =
    "Recipe creation successful: the given unique (non-presentation) recipe name was available";
pub const OK_RECIPE_CREATED_NAME_ASSIGNED: &str =
    "Recipe creation successful: the recipe was assigned a new unique (non-presentation) name";
pub const NOT_OK_INVALID_RECIPE: &str =
    "Recipe creation unsuccessful: the recipe was invalid or null";
pub const NOT_OK_RECIPE_RESOURCES_NOT_FOUND: &str =
    "Recipe creation unsuccessful: the user or ingredient name(s) doesn't correspond to an \
     existing user or ingredient";
pub const NOT_OK_RECIPE_NAME_TAKEN: &str =
    "Recipe creation unsuccessful: the given unique (non-presentation) recipe name is already \
     taken";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRecipe {
    pub recipe: Recipe,
    /// Tags that did not exist before and were created for this recipe.
    pub created_tags: BTreeSet<Tag>,
}

/// Creates a recipe from a form whose tags and ingredients are given by name.
///
/// Missing tags are created on the fly; ingredients and the author must
/// already exist. Without a name the recipe gets one derived from its
/// presentation name. The new recipe is also appended to the author's
/// authored recipes.
///
/// Tags, recipe and author are saved by separate updates, so a failure part
/// way through leaves the earlier writes in place.
#[derive(Debug, Clone)]
pub struct CreateRecipe {
    form: Option<RecipeForm>,
}

impl CreateRecipe {
    pub fn new(form: RecipeForm) -> Self {
        Self { form: Some(form) }
    }

    pub fn absent() -> Self {
        Self { form: None }
    }

    pub fn form(&self) -> Option<&RecipeForm> {
        self.form.as_ref()
    }

    fn is_well_formed(form: &RecipeForm) -> bool {
        let name_ok = form.name.is_none() || usable(form.name.as_deref()).is_some();
        let tags_ok = form.tag_names.iter().all(|t| usable(Some(t)).is_some());
        let ingredients_ok = form
            .required_ingredients
            .iter()
            .all(|(name, qty)| usable(Some(name)).is_some() && qty.value().is_finite());

        name_ok
            && usable(form.presentation_name.as_deref()).is_some()
            && usable(form.author_username.as_deref()).is_some()
            && tags_ok
            && ingredients_ok
    }

    fn create_missing_tags(
        form: &RecipeForm,
        store: &dyn EntityStore,
    ) -> Result<Option<BTreeSet<Tag>>> {
        let mut created = BTreeSet::new();
        for name in &form.tag_names {
            if store.tag_exists(name)? {
                continue;
            }
            let mut cmd: CreateTagCommand = CreateEntity::new(Tag::new(name.as_str())).command();
            cmd.execute_within(store)?;
            if !cmd.is_successful()? {
                tracing::warn!(
                    tag = %name,
                    message = cmd.execution_message()?,
                    "could not create tag for new recipe"
                );
                return Ok(None);
            }
            created.extend(cmd.into_output()?);
        }
        Ok(Some(created))
    }
}

impl UseCase for CreateRecipe {
    type Output = CreatedRecipe;

    fn validate(&self, store: &dyn EntityStore) -> Result<Option<&'static str>> {
        let Some(form) = self.form.as_ref().filter(|f| Self::is_well_formed(f)) else {
            return Ok(Some(NOT_OK_INVALID_RECIPE));
        };
        if let Some(author) = form.author_username.as_deref() {
            if !store.user_exists(author)? {
                return Ok(Some(NOT_OK_INVALID_RECIPE));
            }
        }
        for name in form.required_ingredients.keys() {
            if !store.ingredient_exists(name)? {
                return Ok(Some(NOT_OK_RECIPE_RESOURCES_NOT_FOUND));
            }
        }
        if let Some(name) = form.name.as_deref() {
            if store.recipe_exists(name)? {
                return Ok(Some(NOT_OK_RECIPE_NAME_TAKEN));
            }
        }
        Ok(None)
    }

    fn operate(&self, store: &dyn EntityStore) -> Result<Step<CreatedRecipe>> {
        let Some(form) = &self.form else {
            return Ok(Step::Rejected(NOT_OK_INVALID_RECIPE));
        };

        let Some(created_tags) = Self::create_missing_tags(form, store)? else {
            return Ok(Step::Rejected(NOT_OK_ERROR));
        };

        let tag_names: Vec<String> = form.tag_names.iter().cloned().collect();
        let tags: BTreeMap<String, Tag> = store
            .get_tags(&tag_names)?
            .into_iter()
            .filter_map(|tag| tag.key().map(str::to_string).map(|k| (k, tag)))
            .collect();
        let ingredient_names: Vec<String> = form.required_ingredients.keys().cloned().collect();
        let ingredients = store
            .get_ingredients(&ingredient_names)?
            .into_iter()
            .filter_map(|i| i.key().map(str::to_string).map(|k| (k, i)))
            .collect();

        let mut recipe = form.clone().into_recipe(&tags, &ingredients);
        let message = if recipe.name.is_some() {
            OK_RECIPE_CREATED_WITH_GIVEN_NAME
        } else {
            let name = store.generate_unique_recipe_name(recipe.presentation_name.as_deref())?;
            recipe.name = Some(name);
            OK_RECIPE_CREATED_NAME_ASSIGNED
        };
        store.update_recipes(vec![recipe.clone()])?;

        if let Some(author) = recipe.author_username.as_deref() {
            let mut user = User::get_one(store, author)?;
            user.authored_recipes.push(recipe.clone());
            store.update_users(vec![user])?;
        }

        tracing::debug!(
            recipe = ?recipe.name,
            created_tags = created_tags.len(),
            "created recipe"
        );
        Ok(Step::Done {
            message,
            output: CreatedRecipe {
                recipe,
                created_tags,
            },
        })
    }
}

pub type CreateRecipeCommand = EntityCommand<CreateRecipe>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Amount, Ingredient};
    use crate::store::database::DatabaseStore;
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::MapStore;
    use std::sync::Arc;

    fn kitchen() -> Arc<MapStore> {
        StoreFixture::new()
            .with_tags(&["Vegan"])
            .with_ingredient(Ingredient::new("Flour").with_units("g"))
            .with_ingredients(&["Water"])
            .with_user(User::new("baker"))
            .shared()
    }

    fn run(store: Arc<dyn EntityStore>, use_case: CreateRecipe) -> CreateRecipeCommand {
        let mut cmd = use_case.command().with_storage_source(store);
        cmd.execute().unwrap();
        cmd
    }

    fn bread_form() -> RecipeForm {
        RecipeForm::new("Plain Bread", "baker")
            .with_directions(["Mix", "Bake"])
            .with_tag_names(["Vegan", "Rustic"])
            .with_ingredient("Flour", 500.0)
            .with_ingredient("Water", 300.0)
    }

    #[test]
    fn assigns_name_and_creates_missing_tags() {
        let store = kitchen();
        let cmd = run(store.clone(), CreateRecipe::new(bread_form()));

        assert!(cmd.is_successful().unwrap());
        assert_eq!(
            cmd.execution_message().unwrap(),
            OK_RECIPE_CREATED_NAME_ASSIGNED
        );
        let created = cmd.output().unwrap().unwrap();
        assert_eq!(created.recipe.name.as_deref(), Some("Plain-Bread"));
        assert_eq!(created.created_tags, BTreeSet::from([Tag::new("Rustic")]));
        assert!(store.tag_exists("Rustic").unwrap());

        let flour = Ingredient::new("Flour").with_units("g");
        assert_eq!(
            created.recipe.required_ingredients.get(&flour),
            Some(&Amount(500.0))
        );

        let saved = Recipe::get_one(store.as_ref(), "Plain-Bread").unwrap();
        assert_eq!(&saved, &created.recipe);

        let baker = User::get_one(store.as_ref(), "baker").unwrap();
        assert_eq!(baker.authored_recipes, vec![created.recipe.clone()]);
    }

    #[test]
    fn second_unnamed_recipe_gets_suffix() {
        let store = kitchen();
        run(store.clone(), CreateRecipe::new(bread_form()));
        let cmd = run(store.clone(), CreateRecipe::new(bread_form()));

        let created = cmd.output().unwrap().unwrap();
        assert_eq!(created.recipe.name.as_deref(), Some("Plain-Bread0"));
        assert!(created.created_tags.is_empty());
    }

    #[test]
    fn keeps_given_name_when_free() {
        let store = kitchen();
        let cmd = run(
            store.clone(),
            CreateRecipe::new(bread_form().with_name("bread-v1")),
        );
        assert_eq!(
            cmd.execution_message().unwrap(),
            OK_RECIPE_CREATED_WITH_GIVEN_NAME
        );
        assert!(store.recipe_exists("bread-v1").unwrap());

        let again = run(store, CreateRecipe::new(bread_form().with_name("bread-v1")));
        assert!(!again.is_successful().unwrap());
        assert_eq!(again.execution_message().unwrap(), NOT_OK_RECIPE_NAME_TAKEN);
    }

    #[test]
    fn unknown_author_or_missing_fields_are_invalid() {
        let store = kitchen();

        let stranger = run(
            store.clone(),
            CreateRecipe::new(RecipeForm::new("Soup", "nobody")),
        );
        assert_eq!(stranger.execution_message().unwrap(), NOT_OK_INVALID_RECIPE);

        let nameless = RecipeForm {
            author_username: Some("baker".into()),
            ..RecipeForm::default()
        };
        let cmd = run(store.clone(), CreateRecipe::new(nameless));
        assert_eq!(cmd.execution_message().unwrap(), NOT_OK_INVALID_RECIPE);

        let absent = run(store, CreateRecipe::absent());
        assert_eq!(absent.execution_message().unwrap(), NOT_OK_INVALID_RECIPE);
    }

    #[test]
    fn unknown_ingredient_is_reported() {
        let store = kitchen();
        let form = RecipeForm::new("Saffron rice", "baker").with_ingredient("Saffron", 0.1);
        let cmd = run(store.clone(), CreateRecipe::new(form));

        assert!(!cmd.is_successful().unwrap());
        assert_eq!(
            cmd.execution_message().unwrap(),
            NOT_OK_RECIPE_RESOURCES_NOT_FOUND
        );
        assert!(store.entities().unwrap().recipes.is_empty());
    }

    #[test]
    fn storage_failure_is_generic_error() {
        let cmd = run(
            Arc::new(DatabaseStore::new("db://x")),
            CreateRecipe::new(bread_form()),
        );
        assert!(!cmd.is_successful().unwrap());
        assert_eq!(cmd.execution_message().unwrap(), NOT_OK_ERROR);
    }
}
