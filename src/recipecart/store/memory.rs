use super::{fold_tokens, matches_tokens, recipe_name_candidate, EntityStore};
use crate::error::{RecipeCartError, Result};
use crate::model::{Entity, Ingredient, Recipe, Tag, User};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

type Entries<E> = HashMap<String, E>;

/// One keyed collection with its own lock.
struct Collection<E: Entity> {
    entries: RwLock<Entries<E>>,
}

impl<E: Entity> Default for Collection<E> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<E: Entity> Collection<E> {
    fn read(&self) -> Result<RwLockReadGuard<'_, Entries<E>>> {
        self.entries
            .read()
            .map_err(|_| RecipeCartError::LockPoisoned(E::KIND))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Entries<E>>> {
        self.entries
            .write()
            .map_err(|_| RecipeCartError::LockPoisoned(E::KIND))
    }

    fn get_by_keys(&self, keys: &[String]) -> Result<Vec<E>> {
        let entries = self.read()?;
        keys.iter()
            .map(|key| {
                entries
                    .get(key)
                    .cloned()
                    .ok_or_else(|| RecipeCartError::NotFound {
                        kind: E::KIND,
                        key: key.clone(),
                    })
            })
            .collect()
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(key))
    }

    /// `also` names a second text field to match against, if any.
    fn search(&self, tokens: &HashSet<String>, also: fn(&E) -> Option<&str>) -> Result<Vec<E>> {
        let folded = fold_tokens(tokens)?;
        let entries = self.read()?;

        let mut matched: Vec<(&String, &E)> = entries
            .iter()
            .filter(|(key, entity)| {
                matches_tokens(key, &folded)
                    || also(entity).is_some_and(|text| matches_tokens(text, &folded))
            })
            .collect();
        matched.sort_by(|(a, _), (b, _)| a.cmp(b));

        Ok(matched.into_iter().map(|(_, e)| e.clone()).collect())
    }

    fn upsert(&self, entities: Vec<E>) -> Result<()> {
        let keyed = entities
            .into_iter()
            .map(|entity| match entity.key() {
                Some(key) => Ok((key.to_string(), entity)),
                None => Err(RecipeCartError::MissingKey(E::KIND)),
            })
            .collect::<Result<Vec<_>>>()?;

        let count = keyed.len();
        self.write()?.extend(keyed);
        tracing::debug!(kind = %E::KIND, count, "upserted entities");
        Ok(())
    }
}

fn no_secondary<E>(_: &E) -> Option<&str> {
    None
}

fn presentation_name(recipe: &Recipe) -> Option<&str> {
    recipe.presentation_name.as_deref()
}

/// A consistent copy of every collection, keyed by entity key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities {
    pub tags: BTreeMap<String, Tag>,
    pub ingredients: BTreeMap<String, Ingredient>,
    pub recipes: BTreeMap<String, Recipe>,
    pub users: BTreeMap<String, User>,
}

/// Write guards over all four collections, taken in the fixed order
/// tag, ingredient, recipe, user.
pub(crate) struct AllCollections<'a> {
    tags: RwLockWriteGuard<'a, Entries<Tag>>,
    ingredients: RwLockWriteGuard<'a, Entries<Ingredient>>,
    recipes: RwLockWriteGuard<'a, Entries<Recipe>>,
    users: RwLockWriteGuard<'a, Entries<User>>,
}

impl AllCollections<'_> {
    pub(crate) fn to_entities(&self) -> Entities {
        fn sorted<E: Clone>(entries: &Entries<E>) -> BTreeMap<String, E> {
            entries
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()
        }
        Entities {
            tags: sorted(&self.tags),
            ingredients: sorted(&self.ingredients),
            recipes: sorted(&self.recipes),
            users: sorted(&self.users),
        }
    }

    /// Clears every collection and repopulates it from `entities`.
    pub(crate) fn replace_with(&mut self, entities: Entities) {
        self.tags.clear();
        self.tags.extend(entities.tags);
        self.ingredients.clear();
        self.ingredients.extend(entities.ingredients);
        self.recipes.clear();
        self.recipes.extend(entities.recipes);
        self.users.clear();
        self.users.extend(entities.users);
    }
}

/// Thread-safe in-memory storage engine.
///
/// Each collection has its own `RwLock`, so work on tags never waits on work
/// on users. Nothing here is persisted; see [`super::fs::FileStore`].
#[derive(Default)]
pub struct MapStore {
    tags: Collection<Tag>,
    ingredients: Collection<Ingredient>,
    recipes: Collection<Recipe>,
    users: Collection<User>,
}

impl MapStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn lock_all(&self) -> Result<AllCollections<'_>> {
        let tags = self.tags.write()?;
        let ingredients = self.ingredients.write()?;
        let recipes = self.recipes.write()?;
        let users = self.users.write()?;
        Ok(AllCollections {
            tags,
            ingredients,
            recipes,
            users,
        })
    }

    /// Copies out all four collections while holding every lock.
    pub fn entities(&self) -> Result<Entities> {
        Ok(self.lock_all()?.to_entities())
    }

    /// Replaces all four collections. Existing contents are discarded.
    pub fn replace(&self, entities: Entities) -> Result<()> {
        self.lock_all()?.replace_with(entities);
        Ok(())
    }
}

impl EntityStore for MapStore {
    fn get_tags(&self, names: &[String]) -> Result<Vec<Tag>> {
        self.tags.get_by_keys(names)
    }

    fn get_ingredients(&self, names: &[String]) -> Result<Vec<Ingredient>> {
        self.ingredients.get_by_keys(names)
    }

    fn get_recipes(&self, names: &[String]) -> Result<Vec<Recipe>> {
        self.recipes.get_by_keys(names)
    }

    fn get_users(&self, usernames: &[String]) -> Result<Vec<User>> {
        self.users.get_by_keys(usernames)
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        self.tags.contains(name)
    }

    fn ingredient_exists(&self, name: &str) -> Result<bool> {
        self.ingredients.contains(name)
    }

    fn recipe_exists(&self, name: &str) -> Result<bool> {
        self.recipes.contains(name)
    }

    fn user_exists(&self, username: &str) -> Result<bool> {
        self.users.contains(username)
    }

    fn search_tags(&self, tokens: &HashSet<String>) -> Result<Vec<Tag>> {
        self.tags.search(tokens, no_secondary)
    }

    fn search_ingredients(&self, tokens: &HashSet<String>) -> Result<Vec<Ingredient>> {
        self.ingredients.search(tokens, no_secondary)
    }

    fn search_recipes(&self, tokens: &HashSet<String>) -> Result<Vec<Recipe>> {
        self.recipes.search(tokens, presentation_name)
    }

    fn search_users(&self, tokens: &HashSet<String>) -> Result<Vec<User>> {
        self.users.search(tokens, no_secondary)
    }

    fn update_tags(&self, tags: Vec<Tag>) -> Result<()> {
        self.tags.upsert(tags)
    }

    fn update_ingredients(&self, ingredients: Vec<Ingredient>) -> Result<()> {
        self.ingredients.upsert(ingredients)
    }

    fn update_recipes(&self, recipes: Vec<Recipe>) -> Result<()> {
        self.recipes.upsert(recipes)
    }

    fn update_users(&self, users: Vec<User>) -> Result<()> {
        self.users.upsert(users)
    }

    fn generate_unique_recipe_name(&self, basis: Option<&str>) -> Result<String> {
        let recipes = self.recipes.read()?;

        let base = basis.map(recipe_name_candidate).unwrap_or_default();
        if basis.is_some() && !recipes.contains_key(&base) {
            return Ok(base);
        }

        (0u64..)
            .map(|suffix| format!("{}{}", base, suffix))
            .find(|candidate| !recipes.contains_key(candidate))
            .ok_or_else(|| {
                RecipeCartError::InvalidArgument(format!("no free recipe name for '{}'", base))
            })
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use std::sync::Arc;

    pub struct StoreFixture {
        pub store: MapStore,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: MapStore::new(),
            }
        }

        pub fn with_tags(self, names: &[&str]) -> Self {
            let tags = names.iter().map(|n| Tag::new(*n)).collect();
            self.store.update_tags(tags).unwrap();
            self
        }

        pub fn with_ingredient(self, ingredient: Ingredient) -> Self {
            self.store.update_ingredients(vec![ingredient]).unwrap();
            self
        }

        pub fn with_ingredients(self, names: &[&str]) -> Self {
            let ingredients = names.iter().map(|n| Ingredient::new(*n)).collect();
            self.store.update_ingredients(ingredients).unwrap();
            self
        }

        pub fn with_recipe(self, recipe: Recipe) -> Self {
            self.store.update_recipes(vec![recipe]).unwrap();
            self
        }

        pub fn with_user(self, user: User) -> Self {
            self.store.update_users(vec![user]).unwrap();
            self
        }

        pub fn shared(self) -> Arc<MapStore> {
            Arc::new(self.store)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::StoreFixture;
    use super::*;
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    fn tokens(words: &[&str]) -> HashSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    fn keys(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn upsert_is_idempotent() {
        let store = MapStore::new();
        let flour = Ingredient::new("Flour").with_units("g");
        store.update_ingredients(vec![flour.clone()]).unwrap();
        let once = store.entities().unwrap();

        store.update_ingredients(vec![flour.clone()]).unwrap();
        assert_eq!(store.entities().unwrap(), once);
        assert!(store.ingredient_exists("Flour").unwrap());
        assert_eq!(store.get_ingredients(&keys(&["Flour"])).unwrap(), vec![flour]);
    }

    #[test]
    fn upsert_overwrites_by_key() {
        let store = MapStore::new();
        store
            .update_ingredients(vec![Ingredient::new("Milk").with_units("ml")])
            .unwrap();
        store
            .update_ingredients(vec![Ingredient::new("Milk").with_units("cups")])
            .unwrap();

        let milk = store.get_ingredients(&keys(&["Milk"])).unwrap();
        assert_eq!(milk[0].units.as_deref(), Some("cups"));
    }

    #[test]
    fn batch_fetch_is_all_or_nothing() {
        let store = StoreFixture::new().with_tags(&["a", "b"]).store;

        let both = store.get_tags(&keys(&["b", "a"])).unwrap();
        assert_eq!(both, vec![Tag::new("b"), Tag::new("a")]);

        let err = store.get_tags(&keys(&["a", "missing", "b"])).unwrap_err();
        match err {
            RecipeCartError::NotFound { kind, key } => {
                assert_eq!(kind, crate::model::EntityKind::Tag);
                assert_eq!(key, "missing");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn batch_with_missing_key_writes_nothing() {
        let store = MapStore::new();
        let err = store
            .update_tags(vec![Tag::new("ok"), Tag { name: None }])
            .unwrap_err();
        assert!(matches!(err, RecipeCartError::MissingKey(_)));
        assert!(!store.tag_exists("ok").unwrap());
    }

    #[test]
    fn search_matches_any_word_case_insensitively() {
        let store = StoreFixture::new()
            .with_tags(&["Quick Dinner", "Vegan", "Dessert"])
            .store;

        let found = store.search_tags(&tokens(&["DINNER", "vegan"])).unwrap();
        assert_eq!(found, vec![Tag::new("Quick Dinner"), Tag::new("Vegan")]);

        assert!(store.search_tags(&tokens(&["breakfast"])).unwrap().is_empty());
    }

    #[test]
    fn recipe_search_includes_presentation_name() {
        let store = StoreFixture::new()
            .with_recipe(Recipe::new("r-1").with_presentation_name("Lemon Tart"))
            .with_recipe(Recipe::new("Lemonade"))
            .store;

        let found = store.search_recipes(&tokens(&["lemon"])).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key(), Some("r-1"));

        let by_key = store.search_recipes(&tokens(&["lemonade"])).unwrap();
        assert_eq!(by_key[0].key(), Some("Lemonade"));
    }

    #[test]
    fn search_rejects_blank_token() {
        let store = MapStore::new();
        let err = store.search_users(&tokens(&[""])).unwrap_err();
        assert!(matches!(err, RecipeCartError::InvalidArgument(_)));
    }

    #[test]
    fn unique_names_take_smallest_free_suffix() {
        let store = MapStore::new();
        assert_eq!(
            store.generate_unique_recipe_name(Some("My Recipe")).unwrap(),
            "My-Recipe"
        );

        store.update_recipes(vec![Recipe::new("My-Recipe")]).unwrap();
        assert_eq!(
            store.generate_unique_recipe_name(Some(" My  Recipe")).unwrap(),
            "My-Recipe0"
        );

        store
            .update_recipes(vec![Recipe::new("My-Recipe0"), Recipe::new("My-Recipe2")])
            .unwrap();
        assert_eq!(
            store.generate_unique_recipe_name(Some("My Recipe")).unwrap(),
            "My-Recipe1"
        );
    }

    #[test]
    fn unique_name_without_basis_is_numeric() {
        let store = MapStore::new();
        assert_eq!(store.generate_unique_recipe_name(None).unwrap(), "0");
        store.update_recipes(vec![Recipe::new("0")]).unwrap();
        assert_eq!(store.generate_unique_recipe_name(None).unwrap(), "1");
    }

    #[test]
    fn tag_writer_does_not_block_user_readers() {
        let store = Arc::new(StoreFixture::new().with_user(User::new("ann")).store);
        let tag_guard = store.tags.write().unwrap();

        let (tx, rx) = mpsc::channel();
        let reader = Arc::clone(&store);
        thread::spawn(move || {
            tx.send(reader.user_exists("ann").unwrap()).unwrap();
        });

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(true));
        drop(tag_guard);
    }

    #[test]
    fn tag_writer_blocks_tag_readers_until_released() {
        let store = Arc::new(StoreFixture::new().with_tags(&["vegan"]).store);
        let tag_guard = store.tags.write().unwrap();

        let (tx, rx) = mpsc::channel();
        let reader = Arc::clone(&store);
        thread::spawn(move || {
            tx.send(reader.tag_exists("vegan").unwrap()).unwrap();
        });

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        drop(tag_guard);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(true));
    }

    #[test]
    fn concurrent_writers_to_different_collections() {
        let store = Arc::new(MapStore::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..50 {
                        store
                            .update_tags(vec![Tag::new(format!("tag-{t}-{i}"))])
                            .unwrap();
                        store
                            .update_users(vec![User::new(format!("user-{t}-{i}"))])
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let entities = store.entities().unwrap();
        assert_eq!(entities.tags.len(), 200);
        assert_eq!(entities.users.len(), 200);
    }

    #[test]
    fn replace_discards_previous_contents() {
        let store = StoreFixture::new().with_tags(&["old"]).store;
        let mut entities = Entities::default();
        entities.tags.insert("new".into(), Tag::new("new"));

        store.replace(entities).unwrap();
        assert!(!store.tag_exists("old").unwrap());
        assert!(store.tag_exists("new").unwrap());
    }
}
