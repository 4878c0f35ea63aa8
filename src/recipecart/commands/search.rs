use super::{EntityCommand, Step, UseCase};
use crate::error::Result;
use crate::model::{Ingredient, Recipe, Tag, User};
use crate::store::{EntityStore, Stored};
use std::collections::HashSet;
use std::marker::PhantomData;

#[derive(Debug, Clone, Copy)]
pub struct SearchMessages {
    pub matches: &'static str,
    pub no_matches: &'static str,
    pub bad_terms: &'static str,
}

pub trait Searchable: Stored {
    const SEARCH_MESSAGES: SearchMessages;
}

impl Searchable for Tag {
    const SEARCH_MESSAGES: SearchMessages = SearchMessages {
        matches: "Search successful: tags that matched were found",
        no_matches: "Search successful: but no matching tags were found",
        bad_terms: "Search unsuccessful: tag search terms were not well-formed",
    };
}

impl Searchable for Ingredient {
    const SEARCH_MESSAGES: SearchMessages = SearchMessages {
        matches: "Search successful: ingredients that matched were found",
        no_matches: "Search successful: but no matching ingredients were found",
        bad_terms: "Search unsuccessful: ingredient search terms were not well-formed",
    };
}

impl Searchable for Recipe {
    const SEARCH_MESSAGES: SearchMessages = SearchMessages {
        matches: "Search successful: recipes that matched were found",
        no_matches: "Search successful: but no matching recipes were found",
        bad_terms: "Search unsuccessful: recipe search terms were not well-formed",
    };
}

impl Searchable for User {
    const SEARCH_MESSAGES: SearchMessages = SearchMessages {
        matches: "Search successful: users that matched were found",
        no_matches: "Search successful: but no matching users were found",
        bad_terms: "Search unsuccessful: user search terms were not well-formed",
    };
}

/// Token search over one collection. Finding nothing is still a success.
#[derive(Debug, Clone)]
pub struct SearchEntities<E: Searchable> {
    terms: HashSet<String>,
    kind: PhantomData<fn() -> E>,
}

impl<E: Searchable> SearchEntities<E> {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            terms: terms.into_iter().map(Into::into).collect(),
            kind: PhantomData,
        }
    }

    pub fn terms(&self) -> &HashSet<String> {
        &self.terms
    }

    fn well_formed(&self) -> bool {
        !self.terms.is_empty() && self.terms.iter().all(|t| !t.trim().is_empty())
    }
}

impl<E: Searchable> UseCase for SearchEntities<E> {
    type Output = Vec<E>;

    fn validate(&self, _store: &dyn EntityStore) -> Result<Option<&'static str>> {
        if self.well_formed() {
            Ok(None)
        } else {
            Ok(Some(E::SEARCH_MESSAGES.bad_terms))
        }
    }

    fn operate(&self, store: &dyn EntityStore) -> Result<Step<Vec<E>>> {
        let found = E::search(store, &self.terms)?;
        let message = if found.is_empty() {
            E::SEARCH_MESSAGES.no_matches
        } else {
            E::SEARCH_MESSAGES.matches
        };
        Ok(Step::Done {
            message,
            output: found,
        })
    }
}

pub type SearchTagsCommand = EntityCommand<SearchEntities<Tag>>;
pub type SearchIngredientsCommand = EntityCommand<SearchEntities<Ingredient>>;
pub type SearchRecipesCommand = EntityCommand<SearchEntities<Recipe>>;
pub type SearchUsersCommand = EntityCommand<SearchEntities<User>>;
