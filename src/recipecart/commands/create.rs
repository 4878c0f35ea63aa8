use super::{EntityCommand, Step, UseCase};
use crate::error::Result;
use crate::model::{Entity, Ingredient, Tag, User};
use crate::store::{EntityStore, Stored};

/// Messages reported by [`CreateEntity`] for one entity type.
#[derive(Debug, Clone, Copy)]
pub struct CreateMessages {
    pub ok: &'static str,
    pub invalid: &'static str,
    pub taken: &'static str,
}

pub trait Creatable: Stored {
    const CREATE_MESSAGES: CreateMessages;
}

impl Creatable for Tag {
    const CREATE_MESSAGES: CreateMessages = CreateMessages {
        ok: "Tag creation successful",
        invalid: "Tag creation unsuccessful: the tag was invalid or null",
        taken: "Tag creation unsuccessful: the tag name is already taken",
    };
}

impl Creatable for Ingredient {
    const CREATE_MESSAGES: CreateMessages = CreateMessages {
        ok: "Ingredient creation successful",
        invalid: "Ingredient creation unsuccessful: the ingredient was invalid or null",
        taken: "Ingredient creation unsuccessful: the ingredient name is already taken",
    };
}

impl Creatable for User {
    const CREATE_MESSAGES: CreateMessages = CreateMessages {
        ok: "User creation successful",
        invalid: "User creation unsuccessful: the user was invalid or null",
        taken: "User creation unsuccessful: the username is already taken",
    };
}

/// Saves a new entity whose key is not yet taken.
#[derive(Debug, Clone)]
pub struct CreateEntity<E: Creatable> {
    entity: Option<E>,
}

impl<E: Creatable> CreateEntity<E> {
    pub fn new(entity: E) -> Self {
        Self {
            entity: Some(entity),
        }
    }

    /// A request carrying no entity at all.
    pub fn absent() -> Self {
        Self { entity: None }
    }

    pub fn entity(&self) -> Option<&E> {
        self.entity.as_ref()
    }

    fn key(&self) -> Option<&str> {
        super::usable(self.entity.as_ref().and_then(Entity::key))
    }
}

impl<E: Creatable> UseCase for CreateEntity<E> {
    type Output = E;

    fn validate(&self, store: &dyn EntityStore) -> Result<Option<&'static str>> {
        let Some(key) = self.key() else {
            return Ok(Some(E::CREATE_MESSAGES.invalid));
        };
        if E::exists(store, key)? {
            return Ok(Some(E::CREATE_MESSAGES.taken));
        }
        Ok(None)
    }

    fn operate(&self, store: &dyn EntityStore) -> Result<Step<E>> {
        let Some(entity) = self.entity.clone() else {
            return Ok(Step::Rejected(E::CREATE_MESSAGES.invalid));
        };
        E::update(store, vec![entity.clone()])?;
        Ok(Step::Done {
            message: E::CREATE_MESSAGES.ok,
            output: entity,
        })
    }
}

pub type CreateTagCommand = EntityCommand<CreateEntity<Tag>>;
pub type CreateIngredientCommand = EntityCommand<CreateEntity<Ingredient>>;
pub type CreateUserCommand = EntityCommand<CreateEntity<User>>;
