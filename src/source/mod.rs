pub mod catalog;
pub mod connection;
pub mod endpoints;
pub mod fallback;

use async_trait::async_trait;

use crate::recipe::{Recipe, ScoreVector};
use crate::scoring::preference_distance;

pub use catalog::{load_catalog_csv, load_catalog_json, CatalogSource};
pub use connection::{HttpRecipeSource, SourceError};
pub use fallback::{embedded_catalog, FallbackCatalog};

/// How many recipes a proximity pre-filter keeps.
pub const PROXIMITY_POOL_SIZE: usize = 20;

/// Where recommendation candidates come from. Implementations own the
/// storage or network access; the engine only sees recipe lists.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &str;

    async fn fetch_all(&self) -> Result<Vec<Recipe>, SourceError>;

    /// Optional pre-ranking by score-vector distance. The default fetches
    /// everything and keeps the [`PROXIMITY_POOL_SIZE`] nearest recipes.
    async fn fetch_by_preference_proximity(
        &self,
        preferences: &ScoreVector,
    ) -> Result<Vec<Recipe>, SourceError> {
        let recipes = self.fetch_all().await?;
        Ok(nearest_by_preference(recipes, preferences, PROXIMITY_POOL_SIZE))
    }
}

/// Orders recipes by L1 distance to `preferences` (stable for ties) and
/// keeps the first `limit`.
pub fn nearest_by_preference(mut recipes: Vec<Recipe>, preferences: &ScoreVector, limit: usize) -> Vec<Recipe> {
    recipes.sort_by_key(|recipe| preference_distance(&recipe.scores, preferences));
    recipes.truncate(limit);
    recipes
}
