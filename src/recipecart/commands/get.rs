use super::{usable, EntityCommand, Step, UseCase};
use crate::error::{RecipeCartError, Result};
use crate::model::{Ingredient, Recipe, Tag, User};
use crate::store::{EntityStore, Stored};
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy)]
pub struct GetMessages {
    pub ok: &'static str,
    pub not_found: &'static str,
}

pub trait Retrievable: Stored {
    const GET_MESSAGES: GetMessages;
}

impl Retrievable for Tag {
    const GET_MESSAGES: GetMessages = GetMessages {
        ok: "Tag retrieval successful",
        not_found: "Tag retrieval unsuccessful: a tag with the given name could not be found",
    };
}

impl Retrievable for Ingredient {
    const GET_MESSAGES: GetMessages = GetMessages {
        ok: "Ingredient retrieval successful",
        not_found:
            "Ingredient retrieval unsuccessful: a ingredient with the given name could not be found",
    };
}

impl Retrievable for Recipe {
    const GET_MESSAGES: GetMessages = GetMessages {
        ok: "Recipe retrieval successful",
        not_found: "Recipe retrieval unsuccessful: a recipe with the given name could not be found",
    };
}

impl Retrievable for User {
    const GET_MESSAGES: GetMessages = GetMessages {
        ok: "User retrieval successful",
        not_found: "User retrieval unsuccessful: a user with the given name could not be found",
    };
}

/// Fetches one entity by key.
#[derive(Debug, Clone)]
pub struct GetEntity<E: Retrievable> {
    key: Option<String>,
    kind: PhantomData<fn() -> E>,
}

impl<E: Retrievable> GetEntity<E> {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            kind: PhantomData,
        }
    }

    pub fn absent() -> Self {
        Self {
            key: None,
            kind: PhantomData,
        }
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

impl<E: Retrievable> UseCase for GetEntity<E> {
    type Output = E;

    fn validate(&self, store: &dyn EntityStore) -> Result<Option<&'static str>> {
        match usable(self.key()) {
            Some(key) if E::exists(store, key)? => Ok(None),
            _ => Ok(Some(E::GET_MESSAGES.not_found)),
        }
    }

    fn operate(&self, store: &dyn EntityStore) -> Result<Step<E>> {
        let Some(key) = self.key() else {
            return Ok(Step::Rejected(E::GET_MESSAGES.not_found));
        };
        match E::get_one(store, key) {
            Ok(entity) => Ok(Step::Done {
                message: E::GET_MESSAGES.ok,
                output: entity,
            }),
            // Removed between validation and fetch.
            Err(RecipeCartError::NotFound { .. }) => {
                Ok(Step::Rejected(E::GET_MESSAGES.not_found))
            }
            Err(e) => Err(e),
        }
    }
}

pub type GetTagCommand = EntityCommand<GetEntity<Tag>>;
pub type GetIngredientCommand = EntityCommand<GetEntity<Ingredient>>;
pub type GetRecipeCommand = EntityCommand<GetEntity<Recipe>>;
pub type GetUserCommand = EntityCommand<GetEntity<User>>;
