use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::diversify::Diversifier;
use crate::recipe::{Recipe, ScoreVector, ScoredCandidate};
use crate::scoring::{score_candidates, PreferenceInput};
use crate::search::{is_blank, search, SearchMode, SearchOutcome};
use crate::session::RequestContext;
use crate::source::{CandidateSource, FallbackCatalog, SourceError};

pub const DEFAULT_RESULT_LIMIT: usize = 12;
pub const DEFAULT_SEARCH_ALPHA: f64 = 0.2;
pub const DEFAULT_BROWSE_ALPHA: f64 = 0.35;

/// Where a single request currently is. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    FetchingCandidates,
    Scoring,
    Searching,
    Diversifying,
    Done,
    Failed,
    UsingLocalCatalog,
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestPhase::Idle => "idle",
            RequestPhase::FetchingCandidates => "fetching-candidates",
            RequestPhase::Scoring => "scoring",
            RequestPhase::Searching => "searching",
            RequestPhase::Diversifying => "diversifying",
            RequestPhase::Done => "done",
            RequestPhase::Failed => "failed",
            RequestPhase::UsingLocalCatalog => "using-local-catalog",
        };
        f.write_str(name)
    }
}

fn enter(phase: RequestPhase) {
    debug!(%phase, "request phase");
}

/// A caller's request: a preference vector, a search query, or neither.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<PreferenceInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
}

impl RecommendRequest {
    pub fn by_preferences(preferences: impl Into<PreferenceInput>) -> Self {
        Self {
            preferences: Some(preferences.into()),
            search_query: None,
        }
    }

    pub fn by_search(query: impl Into<String>) -> Self {
        Self {
            preferences: None,
            search_query: Some(query.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Normal,
    /// Results came from the local catalog instead of the live source.
    Degraded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogKind {
    Live,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSummary {
    pub query: String,
    pub terms: Vec<String>,
    pub matched_terms: Vec<String>,
    pub mode: SearchMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    pub items: Vec<ScoredCandidate>,
    pub status: ResponseStatus,
    pub catalog: CatalogKind,
    /// Resolved preference vector, present on preference-scored responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<ScoreVector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<SearchSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommenderSettings {
    pub limit: usize,
    pub search_alpha: f64,
    pub browse_alpha: f64,
    /// Ask the source for its nearest recipes instead of the full table
    /// when scoring by preference.
    pub proximity_prefilter: bool,
}

impl Default for RecommenderSettings {
    fn default() -> Self {
        Self {
            limit: DEFAULT_RESULT_LIMIT,
            search_alpha: DEFAULT_SEARCH_ALPHA,
            browse_alpha: DEFAULT_BROWSE_ALPHA,
            proximity_prefilter: false,
        }
    }
}

enum Plan {
    Search(String),
    Browse(ScoreVector),
}

/// Turns requests into ranked, diversified recipe lists. Holds no mutable
/// state, so one instance can serve concurrent requests.
pub struct Recommender {
    source: Arc<dyn CandidateSource>,
    fallback: FallbackCatalog,
    settings: RecommenderSettings,
}

impl Recommender {
    /// Builds a recommender backed by the embedded fallback catalog.
    pub fn new(source: Arc<dyn CandidateSource>, settings: RecommenderSettings) -> Result<Self> {
        Ok(Self::with_fallback(source, FallbackCatalog::embedded()?, settings))
    }

    pub fn with_fallback(
        source: Arc<dyn CandidateSource>,
        fallback: FallbackCatalog,
        settings: RecommenderSettings,
    ) -> Self {
        Self {
            source,
            fallback,
            settings,
        }
    }

    pub fn settings(&self) -> &RecommenderSettings {
        &self.settings
    }

    pub async fn recommend(&self, request: &RecommendRequest, context: &RequestContext) -> RecommendationResponse {
        let plan = self.plan(request, context);
        let fetched = self.fetch(&plan).await;
        self.finish(plan, fetched, &mut StdRng::from_entropy())
    }

    /// Same as [`Recommender::recommend`] but with a fixed diversification
    /// seed, so identical inputs give identical orderings.
    pub async fn recommend_seeded(
        &self,
        request: &RecommendRequest,
        context: &RequestContext,
        seed: u64,
    ) -> RecommendationResponse {
        let plan = self.plan(request, context);
        let fetched = self.fetch(&plan).await;
        self.finish(plan, fetched, &mut StdRng::seed_from_u64(seed))
    }

    fn plan(&self, request: &RecommendRequest, context: &RequestContext) -> Plan {
        enter(RequestPhase::Idle);
        let query = request
            .search_query
            .as_deref()
            .filter(|q| !is_blank(q))
            .or_else(|| context.active_search());

        match query {
            Some(query) => Plan::Search(query.trim().to_string()),
            None => {
                let preferences = request
                    .preferences
                    .or(context.last_preferences)
                    .unwrap_or_default()
                    .resolve();
                Plan::Browse(preferences)
            }
        }
    }

    async fn fetch(&self, plan: &Plan) -> Result<Vec<Recipe>, SourceError> {
        enter(RequestPhase::FetchingCandidates);
        match plan {
            Plan::Browse(preferences) if self.settings.proximity_prefilter => {
                self.source.fetch_by_preference_proximity(preferences).await
            }
            _ => self.source.fetch_all().await,
        }
    }

    fn finish<R: Rng + ?Sized>(
        &self,
        plan: Plan,
        fetched: Result<Vec<Recipe>, SourceError>,
        rng: &mut R,
    ) -> RecommendationResponse {
        let (recipes, mut catalog, mut status) = match fetched {
            Ok(recipes) => {
                debug!(source = self.source.name(), count = recipes.len(), "fetched candidates");
                (recipes, CatalogKind::Live, ResponseStatus::Normal)
            }
            Err(err) => {
                enter(RequestPhase::Failed);
                warn!(source = self.source.name(), error = %err, "recipe source failed, using local catalog");
                enter(RequestPhase::UsingLocalCatalog);
                (
                    self.fallback.recipes().to_vec(),
                    CatalogKind::Fallback,
                    ResponseStatus::Degraded,
                )
            }
        };

        let response = match plan {
            Plan::Search(query) => {
                enter(RequestPhase::Searching);
                let mut outcome = search(&recipes, &query);
                if outcome.is_empty() && catalog == CatalogKind::Live {
                    let retry = search(self.fallback.recipes(), &query);
                    if !retry.is_empty() {
                        info!(query = %query, found = retry.candidates.len(), "live search empty, serving local catalog matches");
                        enter(RequestPhase::UsingLocalCatalog);
                        outcome = retry;
                        catalog = CatalogKind::Fallback;
                        status = ResponseStatus::Degraded;
                    }
                }
                let SearchOutcome {
                    terms,
                    mode,
                    candidates,
                    matched_terms,
                } = outcome;

                enter(RequestPhase::Diversifying);
                let items = Diversifier::new(self.settings.search_alpha).diversify(candidates, self.settings.limit, rng);
                RecommendationResponse {
                    items,
                    status,
                    catalog,
                    preferences: None,
                    search: Some(SearchSummary {
                        query,
                        terms,
                        matched_terms,
                        mode,
                    }),
                }
            }
            Plan::Browse(preferences) => {
                enter(RequestPhase::Scoring);
                let candidates = score_candidates(recipes, &preferences)
                    .into_iter()
                    .map(|(recipe, match_score)| ScoredCandidate::new(recipe, match_score))
                    .collect();

                enter(RequestPhase::Diversifying);
                let items = Diversifier::new(self.settings.browse_alpha).diversify(candidates, self.settings.limit, rng);
                RecommendationResponse {
                    items,
                    status,
                    catalog,
                    preferences: Some(preferences),
                    search: None,
                }
            }
        };

        enter(RequestPhase::Done);
        info!(
            items = response.items.len(),
            status = ?response.status,
            catalog = ?response.catalog,
            "recommendation ready"
        );
        response
    }
}
