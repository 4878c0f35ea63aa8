//! Reference-flattened entity forms.
//!
//! A form replaces nested entities with their keys: a [`RecipeForm`] names its
//! tags and ingredients, a [`UserForm`] names its recipes and ingredients.
//! Forms are what the snapshot file stores, and a [`RecipeForm`] is also the
//! input of recipe creation, where the referenced entities are resolved
//! against the store.

use crate::model::{Amount, Entity, Ingredient, Recipe, Tag, User};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeForm {
    pub name: Option<String>,
    pub presentation_name: Option<String>,
    pub author_username: Option<String>,
    #[serde(default)]
    pub prep_time: Option<u32>,
    #[serde(default)]
    pub cook_time: Option<u32>,
    #[serde(default)]
    pub image_uri: Option<String>,
    #[serde(default)]
    pub num_servings: Option<u32>,
    #[serde(default)]
    pub avg_rating: Amount,
    #[serde(default)]
    pub num_ratings: u32,
    #[serde(default)]
    pub directions: Vec<String>,
    #[serde(default)]
    pub tag_names: BTreeSet<String>,
    #[serde(default)]
    pub required_ingredients: BTreeMap<String, Amount>,
}

impl RecipeForm {
    pub fn new(presentation_name: impl Into<String>, author_username: impl Into<String>) -> Self {
        Self {
            presentation_name: Some(presentation_name.into()),
            author_username: Some(author_username.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_directions<I, S>(mut self, directions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directions = directions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tag_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_ingredient(mut self, name: impl Into<String>, quantity: f64) -> Self {
        self.required_ingredients
            .insert(name.into(), Amount(quantity));
        self
    }

    /// Rebuilds the recipe, resolving names against the given maps.
    ///
    /// A tag missing from `tags` is rebuilt as a bare tag; an ingredient
    /// missing from `ingredients` is rebuilt with only its name.
    pub fn into_recipe(
        self,
        tags: &BTreeMap<String, Tag>,
        ingredients: &BTreeMap<String, Ingredient>,
    ) -> Recipe {
        let resolved_tags = self
            .tag_names
            .into_iter()
            .map(|name| match tags.get(&name) {
                Some(tag) => tag.clone(),
                None => {
                    tracing::warn!(tag = %name, "recipe form references an unknown tag");
                    Tag::new(name)
                }
            })
            .collect();

        let resolved_ingredients = self
            .required_ingredients
            .into_iter()
            .map(|(name, qty)| {
                let ingredient = match ingredients.get(&name) {
                    Some(ingredient) => ingredient.clone(),
                    None => {
                        tracing::warn!(
                            ingredient = %name,
                            "recipe form references an unknown ingredient"
                        );
                        Ingredient::new(name)
                    }
                };
                (ingredient, qty)
            })
            .collect();

        Recipe {
            name: self.name,
            presentation_name: self.presentation_name,
            author_username: self.author_username,
            prep_time: self.prep_time,
            cook_time: self.cook_time,
            image_uri: self.image_uri,
            num_servings: self.num_servings,
            avg_rating: self.avg_rating,
            num_ratings: self.num_ratings,
            directions: self.directions,
            tags: resolved_tags,
            required_ingredients: resolved_ingredients,
        }
    }
}

impl From<&Recipe> for RecipeForm {
    fn from(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name.clone(),
            presentation_name: recipe.presentation_name.clone(),
            author_username: recipe.author_username.clone(),
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            image_uri: recipe.image_uri.clone(),
            num_servings: recipe.num_servings,
            avg_rating: recipe.avg_rating,
            num_ratings: recipe.num_ratings,
            directions: recipe.directions.clone(),
            tag_names: recipe
                .tags
                .iter()
                .filter_map(|tag| tag.key().map(str::to_string))
                .collect(),
            required_ingredients: keyed_amounts(&recipe.required_ingredients),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserForm {
    pub username: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub authored_recipes: Vec<String>,
    #[serde(default)]
    pub saved_recipes: Vec<String>,
    #[serde(default)]
    pub rated_recipes: BTreeMap<String, Amount>,
    #[serde(default)]
    pub owned_ingredients: BTreeSet<String>,
    #[serde(default)]
    pub shopping_list: BTreeMap<String, Amount>,
}

impl UserForm {
    /// Rebuilds the user, resolving names against the given maps.
    ///
    /// Recipe names missing from `recipes` are dropped; ingredient names
    /// missing from `ingredients` are rebuilt with only their name.
    pub fn into_user(
        self,
        ingredients: &BTreeMap<String, Ingredient>,
        recipes: &BTreeMap<String, Recipe>,
    ) -> User {
        let username = self.username;
        let find_recipe = |name: &String| {
            let found = recipes.get(name).cloned();
            if found.is_none() {
                tracing::warn!(
                    user = ?username,
                    recipe = %name,
                    "user form references an unknown recipe, dropping it"
                );
            }
            found
        };
        let find_ingredient = |name: String| match ingredients.get(&name) {
            Some(ingredient) => ingredient.clone(),
            None => {
                tracing::warn!(ingredient = %name, "user form references an unknown ingredient");
                Ingredient::new(name)
            }
        };

        let authored_recipes = self.authored_recipes.iter().filter_map(find_recipe).collect();
        let saved_recipes = self.saved_recipes.iter().filter_map(find_recipe).collect();
        let rated_recipes = self
            .rated_recipes
            .iter()
            .filter_map(|(name, rating)| find_recipe(name).map(|recipe| (recipe, *rating)))
            .collect();
        let owned_ingredients = self
            .owned_ingredients
            .into_iter()
            .map(find_ingredient)
            .collect();
        let shopping_list = self
            .shopping_list
            .into_iter()
            .map(|(name, qty)| (find_ingredient(name), qty))
            .collect();

        User {
            username,
            email_address: self.email_address,
            authored_recipes,
            saved_recipes,
            rated_recipes,
            owned_ingredients,
            shopping_list,
        }
    }
}

impl From<&User> for UserForm {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            email_address: user.email_address.clone(),
            authored_recipes: recipe_names(&user.authored_recipes),
            saved_recipes: recipe_names(&user.saved_recipes),
            rated_recipes: keyed_amounts(&user.rated_recipes),
            owned_ingredients: user
                .owned_ingredients
                .iter()
                .filter_map(|ingredient| ingredient.key().map(str::to_string))
                .collect(),
            shopping_list: keyed_amounts(&user.shopping_list),
        }
    }
}

fn recipe_names(recipes: &[Recipe]) -> Vec<String> {
    recipes
        .iter()
        .filter_map(|recipe| recipe.key().map(str::to_string))
        .collect()
}

fn keyed_amounts<E: Entity>(map: &BTreeMap<E, Amount>) -> BTreeMap<String, Amount> {
    map.iter()
        .filter_map(|(entity, amount)| entity.key().map(|key| (key.to_string(), *amount)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pantry() -> (BTreeMap<String, Tag>, BTreeMap<String, Ingredient>) {
        let tags = BTreeMap::from([("Vegan".to_string(), Tag::new("Vegan"))]);
        let ingredients = BTreeMap::from([(
            "Flour".to_string(),
            Ingredient::new("Flour").with_units("g"),
        )]);
        (tags, ingredients)
    }

    #[test]
    fn recipe_round_trips_through_form() {
        let (tags, ingredients) = pantry();
        let recipe = Recipe::new("Bread")
            .with_presentation_name("Plain bread")
            .with_author("baker")
            .with_directions(["Mix", "Bake"])
            .with_tags([tags["Vegan"].clone()])
            .with_required_ingredients([(ingredients["Flour"].clone(), 500.0)]);

        let form = RecipeForm::from(&recipe);
        assert_eq!(form.tag_names, BTreeSet::from(["Vegan".to_string()]));
        assert_eq!(form.required_ingredients["Flour"], Amount(500.0));

        assert_eq!(form.into_recipe(&tags, &ingredients), recipe);
    }

    #[test]
    fn dangling_recipe_references_are_rebuilt_minimally() {
        let form = RecipeForm::new("Mystery", "nobody")
            .with_tag_names(["Spicy"])
            .with_ingredient("Saffron", 0.1);

        let recipe = form.into_recipe(&BTreeMap::new(), &BTreeMap::new());
        assert!(recipe.tags.contains(&Tag::new("Spicy")));
        assert_eq!(
            recipe.required_ingredients.get(&Ingredient::new("Saffron")),
            Some(&Amount(0.1))
        );
    }

    #[test]
    fn user_form_drops_unknown_recipes() {
        let (_, ingredients) = pantry();
        let bread = Recipe::new("Bread");
        let recipes = BTreeMap::from([("Bread".to_string(), bread.clone())]);
        let form = UserForm {
            username: Some("baker".into()),
            authored_recipes: vec!["Bread".into(), "Gone".into()],
            shopping_list: BTreeMap::from([("Flour".to_string(), Amount(2.0))]),
            ..UserForm::default()
        };

        let user = form.into_user(&ingredients, &recipes);
        assert_eq!(user.authored_recipes, vec![bread]);
        assert_eq!(
            user.shopping_list.get(&ingredients["Flour"]),
            Some(&Amount(2.0))
        );
    }
}
