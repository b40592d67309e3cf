use anyhow::{Context, Result};
use async_trait::async_trait;
use csv::ReaderBuilder;
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

use super::connection::SourceError;
use super::endpoints::RecipeRow;
use super::CandidateSource;
use crate::recipe::Recipe;

/// A recipe catalog held in memory, e.g. loaded from a CSV export of the
/// backend table or a JSON recipe list.
#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    label: String,
    recipes: Vec<Recipe>,
}

impl CatalogSource {
    pub fn new(label: impl Into<String>, recipes: Vec<Recipe>) -> Self {
        Self {
            label: label.into(),
            recipes,
        }
    }

    /// Loads `path` as CSV or JSON depending on its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let recipes = if is_json {
            load_catalog_json(path)?
        } else {
            load_catalog_csv(path)?
        };
        Ok(Self::new(path.display().to_string(), recipes))
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

#[async_trait]
impl CandidateSource for CatalogSource {
    fn name(&self) -> &str {
        &self.label
    }

    async fn fetch_all(&self) -> Result<Vec<Recipe>, SourceError> {
        Ok(self.recipes.clone())
    }
}

/// Loads a catalog CSV whose header follows the backend `recipes` table
/// (`id,title,desc,yl,fl,zid,steptext,costtime,difficulty,健康度,...`).
/// Untitled rows are skipped; an empty result is an error.
pub fn load_catalog_csv(csv_path: &Path) -> Result<Vec<Recipe>> {
    if !csv_path.exists() {
        return Err(anyhow::anyhow!("Catalog CSV file not found at: {:?}", csv_path));
    }

    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("Failed to open catalog CSV file at {:?}", csv_path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

    let mut recipes = Vec::new();
    for (row_index, result) in rdr.deserialize::<RecipeRow>().enumerate() {
        let row = result.with_context(|| format!("Failed to read record at row index {}", row_index))?;
        match row.into_recipe() {
            Some(recipe) => recipes.push(recipe),
            None => warn!(row = row_index + 1, "skipping catalog row without a title"),
        }
    }

    if recipes.is_empty() {
        return Err(anyhow::anyhow!("No valid recipes loaded from {:?}", csv_path));
    }
    Ok(recipes)
}

/// Loads a JSON array of recipes in the engine's own shape.
pub fn load_catalog_json(json_path: &Path) -> Result<Vec<Recipe>> {
    let data = std::fs::read_to_string(json_path)
        .with_context(|| format!("Failed to read catalog JSON file at {:?}", json_path))?;
    parse_catalog_json(&data).with_context(|| format!("Invalid catalog JSON in {:?}", json_path))
}

/// Parses and validates a JSON recipe list: it must be non-empty and ids
/// must be unique.
pub fn parse_catalog_json(data: &str) -> Result<Vec<Recipe>> {
    let recipes: Vec<Recipe> = serde_json::from_str(data).context("Failed to parse recipe list")?;
    if recipes.is_empty() {
        return Err(anyhow::anyhow!("Recipe list is empty"));
    }
    let mut ids = HashSet::new();
    for recipe in &recipes {
        if !ids.insert(recipe.id.as_str()) {
            return Err(anyhow::anyhow!("Duplicate recipe id '{}'", recipe.id));
        }
    }
    Ok(recipes)
}
