//! Demo dataset for trying the CLI (`--mock-data`).

use super::EntityStore;
use crate::error::Result;
use crate::model::{Ingredient, Recipe, Tag, User};

/// Upserts five tags, five ingredients, three recipes and two authors.
pub fn populate(store: &dyn EntityStore) -> Result<()> {
    let tags: Vec<Tag> = (1..=5).map(|i| Tag::new(format!("Tag{i}"))).collect();
    let ingredients: Vec<Ingredient> = (1..=5)
        .map(|i| {
            Ingredient::new(format!("Ingredient{i}"))
                .with_units(format!("Units{i}"))
                .with_image_uri(format!("ImageUri{i}"))
        })
        .collect();

    let recipe1 = Recipe::new("Recipe1")
        .with_presentation_name("First recipe x y")
        .with_author("Author1")
        .with_prep_time(60)
        .with_cook_time(10)
        .with_directions(["Preheat oven to 475", "Preheat oven to 300", "etc."]);
    let recipe2 = Recipe::new("Recipe2")
        .with_presentation_name("Second recipe y z")
        .with_author("Author2")
        .with_image_uri("ImageUri4")
        .with_servings(10)
        .with_tags([tags[0].clone(), tags[1].clone(), tags[4].clone()]);
    let recipe3 = Recipe::new("Recipe3")
        .with_presentation_name("Third recipe x z")
        .with_author("Author1")
        .with_rating(4.9, 100)
        .with_required_ingredients([
            (ingredients[1].clone(), 0.03),
            (ingredients[3].clone(), 5.0),
        ]);

    let users = vec![
        User::new("Author1").with_authored_recipes([recipe1.clone(), recipe3.clone()]),
        User::new("Author2").with_authored_recipes([recipe2.clone()]),
    ];

    store.update_tags(tags)?;
    store.update_ingredients(ingredients)?;
    store.update_recipes(vec![recipe1, recipe2, recipe3])?;
    store.update_users(users)?;

    tracing::debug!("populated store with mock data");
    Ok(())
}
