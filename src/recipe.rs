use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// One axis of a recipe's score vector (and of a preference vector).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Healthy,
    Difficulty,
    Vegetarian,
    Spicy,
    Sweetness,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::Healthy,
        Dimension::Difficulty,
        Dimension::Vegetarian,
        Dimension::Spicy,
        Dimension::Sweetness,
    ];

    pub fn range(self) -> RangeInclusive<u8> {
        match self {
            Dimension::Difficulty => 1..=3,
            _ => 0..=10,
        }
    }

    /// Neutral midpoint used when a value is missing.
    pub fn neutral(self) -> u8 {
        match self {
            Dimension::Difficulty => 2,
            _ => 5,
        }
    }

    pub fn clamp(self, value: i64) -> u8 {
        let range = self.range();
        value.clamp(*range.start() as i64, *range.end() as i64) as u8
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dimension::Healthy => "healthy",
            Dimension::Difficulty => "difficulty",
            Dimension::Vegetarian => "vegetarian",
            Dimension::Spicy => "spicy",
            Dimension::Sweetness => "sweetness",
        };
        f.write_str(name)
    }
}

fn neutral_taste() -> u8 {
    5
}

fn neutral_difficulty() -> u8 {
    2
}

/// Fixed attribute ratings of a recipe. Also used as the resolved form of a
/// caller's preference vector, since both share the same dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreVector {
    #[serde(default = "neutral_taste")]
    pub healthy: u8,
    #[serde(default = "neutral_difficulty")]
    pub difficulty: u8,
    #[serde(default = "neutral_taste")]
    pub vegetarian: u8,
    #[serde(default = "neutral_taste")]
    pub spicy: u8,
    #[serde(default = "neutral_taste")]
    pub sweetness: u8,
}

impl Default for ScoreVector {
    fn default() -> Self {
        Self {
            healthy: Dimension::Healthy.neutral(),
            difficulty: Dimension::Difficulty.neutral(),
            vegetarian: Dimension::Vegetarian.neutral(),
            spicy: Dimension::Spicy.neutral(),
            sweetness: Dimension::Sweetness.neutral(),
        }
    }
}

impl ScoreVector {
    pub fn new(healthy: u8, difficulty: u8, vegetarian: u8, spicy: u8, sweetness: u8) -> Self {
        Self {
            healthy,
            difficulty,
            vegetarian,
            spicy,
            sweetness,
        }
    }

    pub fn get(&self, dimension: Dimension) -> u8 {
        match dimension {
            Dimension::Healthy => self.healthy,
            Dimension::Difficulty => self.difficulty,
            Dimension::Vegetarian => self.vegetarian,
            Dimension::Spicy => self.spicy,
            Dimension::Sweetness => self.sweetness,
        }
    }

    pub fn set(&mut self, dimension: Dimension, value: u8) {
        let slot = match dimension {
            Dimension::Healthy => &mut self.healthy,
            Dimension::Difficulty => &mut self.difficulty,
            Dimension::Vegetarian => &mut self.vegetarian,
            Dimension::Spicy => &mut self.spicy,
            Dimension::Sweetness => &mut self.sweetness,
        };
        *slot = value;
    }

    /// Copy with every dimension forced into its declared range.
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for dimension in Dimension::ALL {
            out.set(dimension, dimension.clamp(self.get(dimension) as i64));
        }
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Difficulty {
    Simple,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn level(self) -> u8 {
        match self {
            Difficulty::Simple => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Simple => "简单",
            Difficulty::Medium => "中等",
            Difficulty::Hard => "困难",
        }
    }

    /// Lenient mapping used for backend rows: 0 and 1 read as simple,
    /// anything unknown reads as medium.
    pub fn from_level_lossy(level: i64) -> Self {
        match level {
            0 | 1 => Difficulty::Simple,
            3 => Difficulty::Hard,
            _ => Difficulty::Medium,
        }
    }
}

impl TryFrom<u8> for Difficulty {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            1 => Ok(Difficulty::Simple),
            2 => Ok(Difficulty::Medium),
            3 => Ok(Difficulty::Hard),
            other => Err(format!("difficulty level must be 1, 2 or 3, got {}", other)),
        }
    }
}

impl From<Difficulty> for u8 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.level()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub cooking_time: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub scores: ScoreVector,
}

impl Recipe {
    /// The fields ingredient search looks at: title, description, every
    /// ingredient line and every tag.
    pub fn searchable_fields(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.title.as_str())
            .chain(std::iter::once(self.description.as_str()))
            .chain(self.ingredients.iter().map(String::as_str))
            .chain(self.tags.iter().map(String::as_str))
    }
}

/// A recipe annotated with its match score for the current request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScoredCandidate {
    pub recipe: Recipe,
    pub match_score: u8,
    /// Query terms this recipe matched; empty for preference scoring.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_terms: Vec<String>,
}

impl ScoredCandidate {
    pub fn new(recipe: Recipe, match_score: u8) -> Self {
        Self {
            recipe,
            match_score: match_score.min(100),
            matched_terms: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_scores_default_to_neutral() -> anyhow::Result<()> {
        let recipe: Recipe = serde_json::from_str(
            r#"{"id":"7","title":"凉拌黄瓜","scores":{"healthy":9,"spicy":4}}"#,
        )?;
        assert_eq!(recipe.scores, ScoreVector::new(9, 2, 5, 4, 5));
        assert_eq!(recipe.difficulty, Difficulty::Medium);
        assert!(recipe.ingredients.is_empty());
        Ok(())
    }

    #[test]
    fn test_absent_score_object_is_fully_neutral() -> anyhow::Result<()> {
        let recipe: Recipe = serde_json::from_str(r#"{"id":"1","title":"白粥"}"#)?;
        assert_eq!(recipe.scores, ScoreVector::default());
        Ok(())
    }

    #[test]
    fn test_difficulty_rejects_unknown_level() {
        let parsed: Result<Recipe, _> =
            serde_json::from_str(r#"{"id":"1","title":"x","difficulty":4}"#);
        assert!(parsed.is_err());
        assert_eq!(Difficulty::from_level_lossy(0), Difficulty::Simple);
        assert_eq!(Difficulty::from_level_lossy(9), Difficulty::Medium);
        assert_eq!(Difficulty::Hard.label(), "困难");
    }

    #[test]
    fn test_clamped_respects_difficulty_range() {
        let raw = ScoreVector::new(12, 7, 0, 10, 11);
        assert_eq!(raw.clamped(), ScoreVector::new(10, 3, 0, 10, 10));
        assert_eq!(Dimension::Difficulty.clamp(-4), 1);
    }
}
