use serde::{Deserialize, Serialize};

use crate::recipe::{Dimension, Recipe, ScoreVector};

/// Best possible per-dimension closeness.
const MAX_CLOSENESS: u32 = 10;

/// Preference vector as it arrives from a caller: every field optional and
/// unchecked. Resolving it never fails; missing fields take the neutral
/// midpoint and out-of-range values are clamped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthy: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vegetarian: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spicy: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sweetness: Option<i64>,
}

impl PreferenceInput {
    fn get(&self, dimension: Dimension) -> Option<i64> {
        match dimension {
            Dimension::Healthy => self.healthy,
            Dimension::Difficulty => self.difficulty,
            Dimension::Vegetarian => self.vegetarian,
            Dimension::Spicy => self.spicy,
            Dimension::Sweetness => self.sweetness,
        }
    }

    pub fn resolve(&self) -> ScoreVector {
        let mut resolved = ScoreVector::default();
        for dimension in Dimension::ALL {
            if let Some(value) = self.get(dimension) {
                resolved.set(dimension, dimension.clamp(value));
            }
        }
        resolved
    }
}

impl From<ScoreVector> for PreferenceInput {
    fn from(vector: ScoreVector) -> Self {
        Self {
            healthy: Some(vector.healthy as i64),
            difficulty: Some(vector.difficulty as i64),
            vegetarian: Some(vector.vegetarian as i64),
            spicy: Some(vector.spicy as i64),
            sweetness: Some(vector.sweetness as i64),
        }
    }
}

/// Calculates the match score between a recipe's score vector and a
/// preference vector.
///
/// Every dimension carries weight 1 and contributes `max(0, 10 - |r - p|)`;
/// the sum is normalised by `10 * dimension count` and scaled to 0-100.
/// Difficulty rewards closeness like every other dimension.
///
/// # Arguments
/// * `recipe_scores`: the recipe's attribute ratings.
/// * `preferences`: the resolved preference vector.
///
/// # Returns
/// An integer in `[0, 100]`; 100 means the vectors are identical.
pub fn score(recipe_scores: &ScoreVector, preferences: &ScoreVector) -> u8 {
    let recipe_scores = recipe_scores.clamped();
    let preferences = preferences.clamped();

    let closeness: u32 = Dimension::ALL
        .iter()
        .map(|&dimension| {
            let diff = recipe_scores.get(dimension).abs_diff(preferences.get(dimension)) as u32;
            MAX_CLOSENESS.saturating_sub(diff)
        })
        .sum();

    let max_total = MAX_CLOSENESS * Dimension::ALL.len() as u32;
    (closeness as f64 / max_total as f64 * 100.0).round() as u8
}

/// L1 distance between two score vectors, the ordering key used when a
/// source pre-ranks candidates by proximity.
pub fn preference_distance(recipe_scores: &ScoreVector, preferences: &ScoreVector) -> u32 {
    let recipe_scores = recipe_scores.clamped();
    let preferences = preferences.clamped();
    Dimension::ALL
        .iter()
        .map(|&dimension| recipe_scores.get(dimension).abs_diff(preferences.get(dimension)) as u32)
        .sum()
}

/// Pairs every recipe with its match score against `preferences`.
pub fn score_candidates(recipes: Vec<Recipe>, preferences: &ScoreVector) -> Vec<(Recipe, u8)> {
    recipes
        .into_iter()
        .map(|recipe| {
            let match_score = score(&recipe.scores, preferences);
            (recipe, match_score)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors_score_100() {
        let preferences = ScoreVector::new(10, 1, 8, 2, 3);
        assert_eq!(score(&preferences, &preferences), 100);
    }

    #[test]
    fn test_score_depends_only_on_absolute_difference() {
        let centre = ScoreVector::new(5, 2, 5, 5, 5);
        let above = ScoreVector::new(8, 3, 7, 6, 9);
        let below = ScoreVector::new(2, 1, 3, 4, 1);
        assert_eq!(score(&above, &centre), score(&below, &centre));
        assert_eq!(score(&centre, &above), score(&above, &centre));
    }

    #[test]
    fn test_score_is_non_increasing_in_difference() {
        let preferences = ScoreVector::new(0, 2, 5, 5, 5);
        let mut previous = 101u8;
        for healthy in 0..=10 {
            let recipe = ScoreVector::new(healthy, 2, 5, 5, 5);
            let current = score(&recipe, &preferences);
            assert!(current <= previous, "score rose at healthy={}", healthy);
            previous = current;
        }
        // 4 perfect dimensions plus one with distance 10: 40/50
        assert_eq!(previous, 80);
    }

    #[test]
    fn test_difficulty_rewards_closeness() {
        let wants_hard = ScoreVector::new(5, 3, 5, 5, 5);
        let hard = ScoreVector::new(5, 3, 5, 5, 5);
        let simple = ScoreVector::new(5, 1, 5, 5, 5);
        assert!(score(&hard, &wants_hard) > score(&simple, &wants_hard));
        // distance 2 on difficulty: 48/50
        assert_eq!(score(&simple, &wants_hard), 96);
    }

    #[test]
    fn test_out_of_range_values_are_clamped_before_comparison() {
        let recipe = ScoreVector::new(15, 9, 5, 5, 5);
        let preferences = ScoreVector::new(10, 3, 5, 5, 5);
        assert_eq!(score(&recipe, &preferences), 100);
    }

    #[test]
    fn test_preference_input_defaults_and_clamps() {
        let input = PreferenceInput {
            healthy: Some(42),
            spicy: Some(-3),
            ..Default::default()
        };
        assert_eq!(input.resolve(), ScoreVector::new(10, 2, 5, 0, 5));
        assert_eq!(PreferenceInput::default().resolve(), ScoreVector::default());
    }

    #[test]
    fn test_preference_input_from_json_with_missing_fields() -> anyhow::Result<()> {
        let input: PreferenceInput = serde_json::from_str(r#"{"healthy":9,"difficulty":7}"#)?;
        assert_eq!(input.resolve(), ScoreVector::new(9, 3, 5, 5, 5));
        Ok(())
    }

    #[test]
    fn test_preference_distance() {
        let a = ScoreVector::new(10, 1, 8, 2, 3);
        let b = ScoreVector::new(7, 2, 8, 4, 3);
        assert_eq!(preference_distance(&a, &b), 6);
        assert_eq!(preference_distance(&a, &a), 0);
    }
}
