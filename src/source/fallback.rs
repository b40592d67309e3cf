use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use super::catalog::{load_catalog_json, parse_catalog_json};
use crate::recipe::Recipe;

const EMBEDDED_CATALOG: &str = include_str!("../../data/fallback_recipes.json");

/// Parses the catalog compiled into the binary.
pub fn embedded_catalog() -> Result<Vec<Recipe>> {
    parse_catalog_json(EMBEDDED_CATALOG).context("Embedded fallback catalog is invalid")
}

/// Small local catalog used when the live source is unreachable or a live
/// search comes back empty. Needs no network or storage once loaded.
#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    recipes: Arc<Vec<Recipe>>,
}

impl FallbackCatalog {
    pub fn embedded() -> Result<Self> {
        Ok(Self::from_recipes(embedded_catalog()?))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let recipes = load_catalog_json(path)
            .with_context(|| format!("Failed to load fallback catalog from {:?}", path))?;
        Ok(Self::from_recipes(recipes))
    }

    pub fn from_recipes(recipes: Vec<Recipe>) -> Self {
        Self {
            recipes: Arc::new(recipes),
        }
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }
}
