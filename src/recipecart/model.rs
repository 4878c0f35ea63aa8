//! Entity value types.
//!
//! Entities are plain values: two instances with identical fields are
//! interchangeable, and "mutating" one means building a replacement and
//! saving it under the same key. The key field of every entity is an
//! `Option<String>`; `None` means the key has not been assigned yet and the
//! storage layer refuses to persist it.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign};

/// The four entity collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Tag,
    Ingredient,
    Recipe,
    User,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Tag => "Tag",
            EntityKind::Ingredient => "Ingredient",
            EntityKind::Recipe => "Recipe",
            EntityKind::User => "User",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common shape of the stored entity types.
pub trait Entity: Clone + fmt::Debug + Send + Sync + 'static {
    const KIND: EntityKind;

    /// The unique key of this entity within its collection, if assigned.
    fn key(&self) -> Option<&str>;
}

/// A quantity or rating.
///
/// Wraps `f64` with a total order (`f64::total_cmp`) so that entities holding
/// amounts can be compared, hashed and used as map keys.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub f64);

impl Amount {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl PartialEq for Amount {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Amount {}

impl PartialOrd for Amount {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Amount {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Hash for Amount {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Amount(value)
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0 + rhs.0)
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        self.0 += rhs.0;
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }
}

impl Entity for Tag {
    const KIND: EntityKind = EntityKind::Tag;

    fn key(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: Option<String>,
    pub units: Option<String>,
    pub image_uri: Option<String>,
}

impl Ingredient {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }

    pub fn with_image_uri(mut self, uri: impl Into<String>) -> Self {
        self.image_uri = Some(uri.into());
        self
    }
}

impl Entity for Ingredient {
    const KIND: EntityKind = EntityKind::Ingredient;

    fn key(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// A recipe. `name` is the unique storage key; `presentation_name` is what
/// people see and need not be unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Recipe {
    pub name: Option<String>,
    pub presentation_name: Option<String>,
    pub author_username: Option<String>,
    pub prep_time: Option<u32>,
    pub cook_time: Option<u32>,
    pub image_uri: Option<String>,
    pub num_servings: Option<u32>,
    pub avg_rating: Amount,
    pub num_ratings: u32,
    pub directions: Vec<String>,
    pub tags: BTreeSet<Tag>,
    pub required_ingredients: BTreeMap<Ingredient, Amount>,
}

impl Recipe {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Returns this recipe under a different key, all other fields kept.
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..self.clone()
        }
    }

    pub fn with_presentation_name(mut self, name: impl Into<String>) -> Self {
        self.presentation_name = Some(name.into());
        self
    }

    pub fn with_author(mut self, username: impl Into<String>) -> Self {
        self.author_username = Some(username.into());
        self
    }

    pub fn with_prep_time(mut self, minutes: u32) -> Self {
        self.prep_time = Some(minutes);
        self
    }

    pub fn with_cook_time(mut self, minutes: u32) -> Self {
        self.cook_time = Some(minutes);
        self
    }

    pub fn with_image_uri(mut self, uri: impl Into<String>) -> Self {
        self.image_uri = Some(uri.into());
        self
    }

    pub fn with_servings(mut self, servings: u32) -> Self {
        self.num_servings = Some(servings);
        self
    }

    pub fn with_rating(mut self, avg_rating: f64, num_ratings: u32) -> Self {
        self.avg_rating = Amount(avg_rating);
        self.num_ratings = num_ratings;
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

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn with_required_ingredients(
        mut self,
        ingredients: impl IntoIterator<Item = (Ingredient, f64)>,
    ) -> Self {
        self.required_ingredients = ingredients
            .into_iter()
            .map(|(ingredient, qty)| (ingredient, Amount(qty)))
            .collect();
        self
    }
}

impl Entity for Recipe {
    const KIND: EntityKind = EntityKind::Recipe;

    fn key(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct User {
    pub username: Option<String>,
    pub email_address: Option<String>,
    pub authored_recipes: Vec<Recipe>,
    pub saved_recipes: Vec<Recipe>,
    pub rated_recipes: BTreeMap<Recipe, Amount>,
    pub owned_ingredients: BTreeSet<Ingredient>,
    pub shopping_list: BTreeMap<Ingredient, Amount>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email_address = Some(email.into());
        self
    }

    pub fn with_authored_recipes(mut self, recipes: impl IntoIterator<Item = Recipe>) -> Self {
        self.authored_recipes = recipes.into_iter().collect();
        self
    }

    pub fn with_saved_recipes(mut self, recipes: impl IntoIterator<Item = Recipe>) -> Self {
        self.saved_recipes = recipes.into_iter().collect();
        self
    }

    pub fn with_rated_recipes(mut self, ratings: impl IntoIterator<Item = (Recipe, f64)>) -> Self {
        self.rated_recipes = ratings
            .into_iter()
            .map(|(recipe, rating)| (recipe, Amount(rating)))
            .collect();
        self
    }

    pub fn with_owned_ingredients(
        mut self,
        ingredients: impl IntoIterator<Item = Ingredient>,
    ) -> Self {
        self.owned_ingredients = ingredients.into_iter().collect();
        self
    }

    pub fn with_shopping_list(
        mut self,
        items: impl IntoIterator<Item = (Ingredient, f64)>,
    ) -> Self {
        self.shopping_list = items
            .into_iter()
            .map(|(ingredient, qty)| (ingredient, Amount(qty)))
            .collect();
        self
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;

    fn key(&self) -> Option<&str> {
        self.username.as_deref()
    }
}

/// Sums `addition` into `base`, key by key.
pub fn merge_amounts<K: Ord + Clone>(
    base: &BTreeMap<K, Amount>,
    addition: &BTreeMap<K, Amount>,
) -> BTreeMap<K, Amount> {
    let mut merged = base.clone();
    for (key, amount) in addition {
        *merged.entry(key.clone()).or_default() += *amount;
    }
    merged
}

const UNNAMED: &str = "<unnamed>";

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key().unwrap_or(UNNAMED))
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key().unwrap_or(UNNAMED))?;
        if let Some(units) = &self.units {
            write!(f, " ({})", units)?;
        }
        Ok(())
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.key().unwrap_or(UNNAMED),
            self.presentation_name.as_deref().unwrap_or("")
        )?;
        if let Some(author) = &self.author_username {
            write!(f, " by {}", author)?;
        }
        Ok(())
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key().unwrap_or(UNNAMED))?;
        if let Some(email) = &self.email_address {
            write!(f, " <{}>", email)?;
        }
        Ok(())
    }
}
