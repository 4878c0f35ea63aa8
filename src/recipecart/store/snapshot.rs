//! On-disk snapshot of the whole dataset.
//!
//! A snapshot is a single JSON document holding the four collections keyed by
//! entity key. Recipes and users are stored as forms so that shared tags,
//! ingredients and recipes are written once and re-linked on load. Paths
//! ending in `.gz` are gzip-compressed.

use super::memory::Entities;
use crate::error::{RecipeCartError, Result};
use crate::form::{RecipeForm, UserForm};
use crate::model::{Ingredient, Tag};
use chrono::{DateTime, Utc};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use uuid::Uuid;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: BTreeMap<String, Tag>,
    #[serde(default)]
    pub ingredients: BTreeMap<String, Ingredient>,
    #[serde(default)]
    pub recipes: BTreeMap<String, RecipeForm>,
    #[serde(default)]
    pub users: BTreeMap<String, UserForm>,
}

impl Snapshot {
    pub fn capture(entities: &Entities) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            tags: entities.tags.clone(),
            ingredients: entities.ingredients.clone(),
            recipes: entities
                .recipes
                .iter()
                .map(|(key, recipe)| (key.clone(), RecipeForm::from(recipe)))
                .collect(),
            users: entities
                .users
                .iter()
                .map(|(key, user)| (key.clone(), UserForm::from(user)))
                .collect(),
        }
    }

    /// Re-links the forms: recipes against tags and ingredients first, then
    /// users against ingredients and the rebuilt recipes.
    pub fn restore(self) -> Entities {
        let recipes = self
            .recipes
            .into_iter()
            .map(|(key, form)| (key, form.into_recipe(&self.tags, &self.ingredients)))
            .collect();
        let users = self
            .users
            .into_iter()
            .map(|(key, form)| (key, form.into_user(&self.ingredients, &recipes)))
            .collect();

        Entities {
            tags: self.tags,
            ingredients: self.ingredients,
            recipes,
            users,
        }
    }

    /// Writes the snapshot atomically: a temp file in the target directory
    /// is renamed over `path`.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir)?;

        let content = self.encode(is_gzip(path))?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("snapshot");
        let tmp_file = dir.join(format!(".{}-{}.tmp", file_name, Uuid::new_v4()));

        fs::write(&tmp_file, content)?;
        if let Err(e) = fs::rename(&tmp_file, path) {
            let _ = fs::remove_file(&tmp_file);
            return Err(e.into());
        }
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let value: serde_json::Value = if is_gzip(path) {
            serde_json::from_reader(GzDecoder::new(bytes.as_slice()))?
        } else {
            serde_json::from_slice(&bytes)?
        };

        match value.get("version").and_then(|v| v.as_u64()) {
            Some(v) if v == u64::from(SNAPSHOT_VERSION) => Ok(serde_json::from_value(value)?),
            Some(v) => Err(RecipeCartError::Snapshot(format!(
                "unsupported snapshot version {} in {}",
                v,
                path.display()
            ))),
            None => Err(RecipeCartError::Snapshot(format!(
                "{} is not a snapshot file (no version)",
                path.display()
            ))),
        }
    }

    fn encode(&self, gzip: bool) -> Result<Vec<u8>> {
        let json = serde_json::to_vec_pretty(self)?;
        if !gzip {
            return Ok(json);
        }
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        Ok(encoder.finish()?)
    }
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}
