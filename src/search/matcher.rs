use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::debug;

use super::query::tokenize;
use super::synonyms::counterparts;
use crate::recipe::{Recipe, ScoredCandidate};

/// Upper bound on candidates a search hands to the diversifier.
pub const MAX_SEARCH_CANDIDATES: usize = 36;

/// Which strategy produced a search result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchMode {
    /// Every term matched (single-term searches report this too).
    #[serde(rename = "and")]
    And,
    /// Every term matched and at least one recipe contained the terms
    /// joined together; those recipes lead the result.
    #[serde(rename = "phrase-fallback")]
    Phrase,
    /// Nothing matched every term, so recipes matching any term were kept.
    #[serde(rename = "or")]
    Or,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMode::And => "and",
            SearchMode::Phrase => "phrase-fallback",
            SearchMode::Or => "or",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub terms: Vec<String>,
    pub mode: SearchMode,
    pub candidates: Vec<ScoredCandidate>,
    /// Terms that matched at least one returned candidate, in query order.
    pub matched_terms: Vec<String>,
}

impl SearchOutcome {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// A recipe with its searchable fields lower-cased once up front.
struct Searchable<'a> {
    recipe: &'a Recipe,
    fields: Vec<String>,
}

impl<'a> Searchable<'a> {
    fn new(recipe: &'a Recipe) -> Self {
        Self {
            recipe,
            fields: recipe.searchable_fields().map(str::to_lowercase).collect(),
        }
    }

    fn contains(&self, needle: &str) -> bool {
        self.fields.iter().any(|field| field.contains(needle))
    }

    /// Single-term rule: literal substring of some field, or a field holds
    /// one of the term's synonyms.
    fn matches_term(&self, lowered_term: &str) -> bool {
        self.contains(lowered_term) || counterparts(lowered_term).any(|other| self.contains(other))
    }

    fn term_hits(&self, lowered_terms: &[String]) -> Vec<bool> {
        lowered_terms.iter().map(|term| self.matches_term(term)).collect()
    }
}

fn lower_all(terms: &[String]) -> Vec<String> {
    terms.iter().map(|term| term.to_lowercase()).collect()
}

/// True when `term` matches `recipe` under the single-term rule.
pub fn matches_term(recipe: &Recipe, term: &str) -> bool {
    Searchable::new(recipe).matches_term(&term.to_lowercase())
}

/// Recipes matching every term.
pub fn and_pass<'a>(recipes: &'a [Recipe], terms: &[String]) -> Vec<&'a Recipe> {
    let lowered = lower_all(terms);
    recipes
        .iter()
        .map(Searchable::new)
        .filter(|s| !lowered.is_empty() && lowered.iter().all(|t| s.matches_term(t)))
        .map(|s| s.recipe)
        .collect()
}

/// Recipes matching at least one term.
pub fn or_pass<'a>(recipes: &'a [Recipe], terms: &[String]) -> Vec<&'a Recipe> {
    let lowered = lower_all(terms);
    recipes
        .iter()
        .map(Searchable::new)
        .filter(|s| lowered.iter().any(|t| s.matches_term(t)))
        .map(|s| s.recipe)
        .collect()
}

/// Recipes where the concatenated terms appear literally in one field.
pub fn phrase_pass<'a>(recipes: &'a [Recipe], terms: &[String]) -> Vec<&'a Recipe> {
    let phrase = lower_all(terms).concat();
    if phrase.is_empty() {
        return Vec::new();
    }
    recipes
        .iter()
        .map(Searchable::new)
        .filter(|s| s.contains(&phrase))
        .map(|s| s.recipe)
        .collect()
}

/// Runs an ingredient search over `recipes`.
///
/// One term keeps every recipe matching it. Several terms run the phrase
/// and AND passes and union them, phrase hits first; when that union is
/// empty the OR pass widens the result. Output is de-duplicated by recipe
/// id and capped at [`MAX_SEARCH_CANDIDATES`].
///
/// Match scores: phrase and single-term hits get 100, other hits get the
/// rounded share of query terms they matched.
pub fn search(recipes: &[Recipe], query: &str) -> SearchOutcome {
    let terms = tokenize(query);
    let lowered = lower_all(&terms);
    let searchable: Vec<Searchable<'_>> = recipes.iter().map(Searchable::new).collect();

    let mut seen: HashSet<&str> = HashSet::new();
    let mut picked: Vec<(&Searchable<'_>, Vec<bool>, bool)> = Vec::new();
    let mode;

    if lowered.is_empty() {
        mode = SearchMode::And;
    } else if lowered.len() == 1 {
        mode = SearchMode::And;
        for s in &searchable {
            if s.matches_term(&lowered[0]) && seen.insert(s.recipe.id.as_str()) {
                picked.push((s, vec![true], true));
            }
        }
    } else {
        let phrase = lowered.concat();
        let mut phrase_hits = Vec::new();
        let mut and_hits = Vec::new();
        for s in &searchable {
            let hits = s.term_hits(&lowered);
            if s.contains(&phrase) {
                phrase_hits.push((s, hits, true));
            } else if hits.iter().all(|&hit| hit) {
                and_hits.push((s, hits, false));
            }
        }
        debug!(
            phrase = phrase_hits.len(),
            and = and_hits.len(),
            "multi-term search passes"
        );

        if phrase_hits.is_empty() && and_hits.is_empty() {
            mode = SearchMode::Or;
            for s in &searchable {
                let hits = s.term_hits(&lowered);
                if hits.iter().any(|&hit| hit) && seen.insert(s.recipe.id.as_str()) {
                    picked.push((s, hits, false));
                }
            }
        } else {
            mode = if phrase_hits.is_empty() {
                SearchMode::And
            } else {
                SearchMode::Phrase
            };
            for entry in phrase_hits.into_iter().chain(and_hits) {
                if seen.insert(entry.0.recipe.id.as_str()) {
                    picked.push(entry);
                }
            }
        }
    }

    picked.truncate(MAX_SEARCH_CANDIDATES);

    let mut matched_any = vec![false; terms.len()];
    let candidates = picked
        .into_iter()
        .map(|(s, hits, full_marks)| {
            let matched_terms: Vec<String> = terms
                .iter()
                .zip(&hits)
                .filter(|(_, hit)| **hit)
                .map(|(term, _)| term.clone())
                .collect();
            for (flag, &hit) in matched_any.iter_mut().zip(&hits) {
                *flag |= hit;
            }
            let match_score = if full_marks {
                100
            } else {
                (100.0 * matched_terms.len() as f64 / terms.len() as f64).round() as u8
            };
            ScoredCandidate {
                recipe: s.recipe.clone(),
                match_score,
                matched_terms,
            }
        })
        .collect::<Vec<_>>();

    let matched_terms = terms
        .iter()
        .zip(&matched_any)
        .filter(|(_, hit)| **hit)
        .map(|(term, _)| term.clone())
        .collect();

    SearchOutcome {
        terms,
        mode,
        candidates,
        matched_terms,
    }
}
