use super::memory::MapStore;
use super::snapshot::Snapshot;
use super::EntityStore;
use crate::error::{RecipeCartError, Result};
use crate::model::{EntityKind, Ingredient, Recipe, Tag, User};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

struct Autosave {
    path: PathBuf,
    every: u32,
}

/// A [`MapStore`] that can be saved to and loaded from a snapshot file.
///
/// With autosave enabled, every `n`-th update call (across all collections)
/// writes a snapshot to the autosave path.
pub struct FileStore {
    inner: MapStore,
    autosave: Option<Autosave>,
    updates_since_save: Mutex<u32>,
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStore {
    pub fn new() -> Self {
        Self {
            inner: MapStore::new(),
            autosave: None,
            updates_since_save: Mutex::new(0),
        }
    }

    /// `updates_per_save == 0` disables autosave.
    pub fn with_autosave(path: impl Into<PathBuf>, updates_per_save: u32) -> Self {
        let autosave = (updates_per_save > 0).then(|| Autosave {
            path: path.into(),
            every: updates_per_save,
        });
        Self {
            autosave,
            ..Self::new()
        }
    }

    pub fn autosave_path(&self) -> Option<&Path> {
        self.autosave.as_ref().map(|a| a.path.as_path())
    }

    /// Writes all four collections to `path`. Holds every collection lock
    /// until the file is in place.
    pub fn save(&self, path: &Path) -> Result<()> {
        let collections = self.inner.lock_all()?;
        let snapshot = Snapshot::capture(&collections.to_entities());
        snapshot.write_to(path)?;
        drop(collections);

        tracing::info!(
            path = %path.display(),
            tags = snapshot.tags.len(),
            ingredients = snapshot.ingredients.len(),
            recipes = snapshot.recipes.len(),
            users = snapshot.users.len(),
            "saved entities"
        );
        Ok(())
    }

    /// Replaces all four collections with the contents of `path`.
    pub fn load(&self, path: &Path) -> Result<()> {
        let mut collections = self.inner.lock_all()?;
        let entities = Snapshot::read_from(path)?.restore();
        tracing::info!(
            path = %path.display(),
            tags = entities.tags.len(),
            ingredients = entities.ingredients.len(),
            recipes = entities.recipes.len(),
            users = entities.users.len(),
            "loaded entities"
        );
        collections.replace_with(entities);
        Ok(())
    }

    /// Like [`FileStore::load`], but a missing file leaves the store as is.
    /// Returns whether anything was loaded.
    pub fn load_if_exists(&self, path: &Path) -> Result<bool> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no entity file to load");
            return Ok(false);
        }
        self.load(path)?;
        Ok(true)
    }

    pub fn map_store(&self) -> &MapStore {
        &self.inner
    }

    /// Counts one update and autosaves when the threshold is reached. A
    /// failed autosave is logged and retried on the next update.
    fn record_update(&self) -> Result<()> {
        let Some(autosave) = &self.autosave else {
            return Ok(());
        };

        let mut count = self
            .updates_since_save
            .lock()
            .map_err(|_| RecipeCartError::IllegalState("autosave counter lock poisoned"))?;
        *count += 1;
        if *count < autosave.every {
            return Ok(());
        }

        *count = 0;
        if let Err(e) = self.save(&autosave.path) {
            tracing::warn!(
                path = %autosave.path.display(),
                error = %e,
                "autosave failed"
            );
            *count = autosave.every - 1;
        }
        Ok(())
    }

    fn updated(&self, kind: EntityKind, result: Result<()>) -> Result<()> {
        result?;
        tracing::debug!(kind = %kind, "update recorded");
        self.record_update()
    }
}

impl EntityStore for FileStore {
    fn get_tags(&self, names: &[String]) -> Result<Vec<Tag>> {
        self.inner.get_tags(names)
    }

    fn get_ingredients(&self, names: &[String]) -> Result<Vec<Ingredient>> {
        self.inner.get_ingredients(names)
    }

    fn get_recipes(&self, names: &[String]) -> Result<Vec<Recipe>> {
        self.inner.get_recipes(names)
    }

    fn get_users(&self, usernames: &[String]) -> Result<Vec<User>> {
        self.inner.get_users(usernames)
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        self.inner.tag_exists(name)
    }

    fn ingredient_exists(&self, name: &str) -> Result<bool> {
        self.inner.ingredient_exists(name)
    }

    fn recipe_exists(&self, name: &str) -> Result<bool> {
        self.inner.recipe_exists(name)
    }

    fn user_exists(&self, username: &str) -> Result<bool> {
        self.inner.user_exists(username)
    }

    fn search_tags(&self, tokens: &HashSet<String>) -> Result<Vec<Tag>> {
        self.inner.search_tags(tokens)
    }

    fn search_ingredients(&self, tokens: &HashSet<String>) -> Result<Vec<Ingredient>> {
        self.inner.search_ingredients(tokens)
    }

    fn search_recipes(&self, tokens: &HashSet<String>) -> Result<Vec<Recipe>> {
        self.inner.search_recipes(tokens)
    }

    fn search_users(&self, tokens: &HashSet<String>) -> Result<Vec<User>> {
        self.inner.search_users(tokens)
    }

    fn update_tags(&self, tags: Vec<Tag>) -> Result<()> {
        self.updated(EntityKind::Tag, self.inner.update_tags(tags))
    }

    fn update_ingredients(&self, ingredients: Vec<Ingredient>) -> Result<()> {
        self.updated(
            EntityKind::Ingredient,
            self.inner.update_ingredients(ingredients),
        )
    }

    fn update_recipes(&self, recipes: Vec<Recipe>) -> Result<()> {
        self.updated(EntityKind::Recipe, self.inner.update_recipes(recipes))
    }

    fn update_users(&self, users: Vec<User>) -> Result<()> {
        self.updated(EntityKind::User, self.inner.update_users(users))
    }

    fn generate_unique_recipe_name(&self, basis: Option<&str>) -> Result<String> {
        self.inner.generate_unique_recipe_name(basis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn autosaves_every_nth_update() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entities.json");
        let store = FileStore::with_autosave(&path, 3);

        store.update_tags(vec![Tag::new("a")]).unwrap();
        store.update_users(vec![User::new("ann")]).unwrap();
        assert!(!path.exists());

        store.update_tags(vec![Tag::new("b")]).unwrap();
        assert!(path.exists());

        let reloaded = FileStore::new();
        reloaded.load(&path).unwrap();
        assert!(reloaded.tag_exists("a").unwrap());
        assert!(reloaded.tag_exists("b").unwrap());
        assert!(reloaded.user_exists("ann").unwrap());

        // Next save is three updates away.
        store.update_tags(vec![Tag::new("c")]).unwrap();
        let reloaded = FileStore::new();
        reloaded.load(&path).unwrap();
        assert!(!reloaded.tag_exists("c").unwrap());
    }

    #[test]
    fn zero_threshold_disables_autosave() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entities.json");
        let store = FileStore::with_autosave(&path, 0);

        for i in 0..5 {
            store.update_tags(vec![Tag::new(format!("t{i}"))]).unwrap();
        }
        assert!(!path.exists());
        assert!(store.autosave_path().is_none());
    }

    #[test]
    fn failed_update_is_not_counted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entities.json");
        let store = FileStore::with_autosave(&path, 1);

        assert!(store.update_tags(vec![Tag { name: None }]).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn failed_autosave_keeps_update_and_retries() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the rename fail.
        let path = dir.path().join("entities.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("blocker"), "x").unwrap();
        let store = FileStore::with_autosave(&path, 2);

        store.update_tags(vec![Tag::new("a")]).unwrap();
        store.update_tags(vec![Tag::new("b")]).unwrap();
        assert!(store.tag_exists("b").unwrap());

        fs::remove_dir_all(&path).unwrap();
        store.update_tags(vec![Tag::new("c")]).unwrap();
        assert!(path.is_file());

        let reloaded = FileStore::new();
        reloaded.load(&path).unwrap();
        assert!(reloaded.tag_exists("c").unwrap());
    }

    #[test]
    fn save_load_round_trip_keeps_cross_references() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entities.json");
        let store = FileStore::new();

        let flour = Ingredient::new("Flour").with_units("g");
        let bread = Recipe::new("Bread")
            .with_presentation_name("Bread")
            .with_tags([Tag::new("Vegan")])
            .with_required_ingredients([(flour.clone(), 500.0)]);
        store.update_tags(vec![Tag::new("Vegan")]).unwrap();
        store.update_ingredients(vec![flour]).unwrap();
        store.update_recipes(vec![bread.clone()]).unwrap();
        store
            .update_users(vec![User::new("ann").with_saved_recipes([bread])])
            .unwrap();
        store.save(&path).unwrap();

        let reloaded = FileStore::new();
        reloaded.load(&path).unwrap();
        assert_eq!(
            reloaded.map_store().entities().unwrap(),
            store.map_store().entities().unwrap()
        );
    }

    #[test]
    fn load_replaces_rather_than_merges() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("entities.json");
        let saved = FileStore::new();
        saved.update_tags(vec![Tag::new("kept")]).unwrap();
        saved.save(&path).unwrap();

        let store = FileStore::new();
        store.update_tags(vec![Tag::new("dropped")]).unwrap();
        store.load(&path).unwrap();

        assert!(store.tag_exists("kept").unwrap());
        assert!(!store.tag_exists("dropped").unwrap());
    }

    #[test]
    fn load_if_exists_ignores_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new();
        store.update_tags(vec![Tag::new("a")]).unwrap();

        let loaded = store
            .load_if_exists(&dir.path().join("missing.json"))
            .unwrap();
        assert!(!loaded);
        assert!(store.tag_exists("a").unwrap());
    }
}
