use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::OnceLock;

use crate::recipe::{Difficulty, Dimension, Recipe, ScoreVector};

pub const RECIPES_PATH: &str = "/api/recipes";
pub const RECOMMENDATIONS_PATH: &str = "/api/recommendations";

const DEFAULT_DESCRIPTION: &str = "美味佳肴";
const DEFAULT_COOKING_TIME: &str = "未知";
const DEFAULT_CATEGORY: &str = "家常菜";

/// Score at or above which a dimension turns into a descriptive tag.
const TAG_THRESHOLD: u8 = 7;

#[derive(Deserialize)]
#[serde(untagged)]
enum RowId {
    Int(i64),
    Text(String),
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match RowId::deserialize(deserializer)? {
        RowId::Int(id) => id.to_string(),
        RowId::Text(id) => id.trim().to_string(),
    })
}

/// One row of the backend `recipes` table, as served by `/api/recipes` and
/// as stored in catalog CSV exports. Only the columns the engine reads are
/// kept; unknown columns are ignored.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RecipeRow {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub desc: Option<String>,
    /// `#`-separated ingredient lines.
    #[serde(default)]
    pub yl: Option<String>,
    /// Comma-separated category labels.
    #[serde(default)]
    pub fl: Option<String>,
    #[serde(default)]
    pub zid: Option<String>,
    /// `#`-separated, numbered step lines.
    #[serde(default)]
    pub steptext: Option<String>,
    #[serde(default)]
    pub costtime: Option<String>,
    #[serde(default)]
    pub difficulty: Option<i64>,
    #[serde(rename = "健康度", default)]
    pub healthy: Option<i64>,
    #[serde(rename = "制作难易", default)]
    pub effort: Option<i64>,
    #[serde(rename = "素食偏好", default)]
    pub vegetarian: Option<i64>,
    #[serde(rename = "辛辣程度", default)]
    pub spicy: Option<i64>,
    #[serde(rename = "甜度", default)]
    pub sweetness: Option<i64>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn split_hash_list(value: &Option<String>) -> Vec<String> {
    non_empty(value)
        .map(|v| {
            v.split('#')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn step_prefix() -> &'static Regex {
    static STEP_PREFIX: OnceLock<Regex> = OnceLock::new();
    STEP_PREFIX.get_or_init(|| Regex::new(r"^\d+\.\s*▲?\s*").expect("step prefix pattern is valid"))
}

fn clamp_or_neutral(value: Option<i64>, dimension: Dimension) -> u8 {
    value.map_or(dimension.neutral(), |v| dimension.clamp(v))
}

impl RecipeRow {
    fn score_vector(&self, level: Difficulty) -> ScoreVector {
        ScoreVector {
            healthy: clamp_or_neutral(self.healthy, Dimension::Healthy),
            difficulty: match (self.effort, self.difficulty) {
                (Some(effort), _) => Dimension::Difficulty.clamp(effort),
                (None, Some(_)) => level.level(),
                (None, None) => Dimension::Difficulty.neutral(),
            },
            vegetarian: clamp_or_neutral(self.vegetarian, Dimension::Vegetarian),
            spicy: clamp_or_neutral(self.spicy, Dimension::Spicy),
            sweetness: clamp_or_neutral(self.sweetness, Dimension::Sweetness),
        }
    }

    /// Converts a backend row into a catalog recipe. Rows without a title
    /// are not recipes and yield `None`.
    pub fn into_recipe(self) -> Option<Recipe> {
        let title = non_empty(&self.title)?.to_string();
        let ingredients = split_hash_list(&self.yl);
        let steps = split_hash_list(&self.steptext)
            .into_iter()
            .map(|step| step_prefix().replace(&step, "").trim().to_string())
            .filter(|step| !step.is_empty())
            .collect();

        let difficulty = Difficulty::from_level_lossy(self.difficulty.unwrap_or(2));
        let scores = self.score_vector(difficulty);

        let mut tags = Vec::new();
        if scores.vegetarian >= TAG_THRESHOLD {
            tags.push("素食".to_string());
        }
        if scores.healthy >= TAG_THRESHOLD {
            tags.push("健康".to_string());
        }
        if scores.spicy >= TAG_THRESHOLD {
            tags.push("辣".to_string());
        }
        if difficulty == Difficulty::Simple {
            tags.push("简单".to_string());
        }
        if let Some(fl) = non_empty(&self.fl) {
            for label in fl.split([',', '，', '、']).map(str::trim).filter(|l| !l.is_empty()) {
                if !tags.iter().any(|t| t == label) {
                    tags.push(label.to_string());
                }
            }
        }

        let category = ingredients
            .first()
            .cloned()
            .or_else(|| non_empty(&self.zid).map(str::to_string))
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Some(Recipe {
            id: self.id,
            title,
            description: non_empty(&self.desc).unwrap_or(DEFAULT_DESCRIPTION).to_string(),
            ingredients,
            steps,
            cooking_time: non_empty(&self.costtime).unwrap_or(DEFAULT_COOKING_TIME).to_string(),
            difficulty,
            category,
            tags,
            scores,
        })
    }
}

/// Converts a batch of rows, dropping untitled ones.
pub fn rows_into_recipes(rows: Vec<RecipeRow>) -> Vec<Recipe> {
    rows.into_iter().filter_map(RecipeRow::into_recipe).collect()
}

/// Body of `POST /api/recommendations`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PreferenceRequestBody {
    pub healthy: u8,
    pub difficulty: u8,
    pub vegetarian: u8,
    pub spicy: u8,
    pub sweetness: u8,
}

impl From<&ScoreVector> for PreferenceRequestBody {
    fn from(v: &ScoreVector) -> Self {
        Self {
            healthy: v.healthy,
            difficulty: v.difficulty,
            vegetarian: v.vegetarian,
            spicy: v.spicy,
            sweetness: v.sweetness,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_conversion_from_backend_json() -> anyhow::Result<()> {
        let row: RecipeRow = serde_json::from_str(
            r##"{
                "id": 42,
                "title": "番茄炒蛋",
                "desc": "",
                "yl": "番茄 2个#鸡蛋 3个# #葱 1根",
                "fl": "家常菜，快手菜",
                "steptext": "1. ▲番茄切块#2.鸡蛋打散#3.  下锅翻炒",
                "costtime": "10分钟",
                "difficulty": 1,
                "健康度": 8,
                "制作难易": 1,
                "素食偏好": 7,
                "辛辣程度": 0,
                "甜度": 4,
                "viewnum": 123
            }"##,
        )?;
        let recipe = row.into_recipe().expect("titled row converts");

        assert_eq!(recipe.id, "42");
        assert_eq!(recipe.description, "美味佳肴");
        assert_eq!(recipe.ingredients, vec!["番茄 2个", "鸡蛋 3个", "葱 1根"]);
        assert_eq!(recipe.steps, vec!["番茄切块", "鸡蛋打散", "下锅翻炒"]);
        assert_eq!(recipe.category, "番茄 2个");
        assert_eq!(recipe.difficulty, Difficulty::Simple);
        assert_eq!(recipe.scores, ScoreVector::new(8, 1, 7, 0, 4));
        assert_eq!(recipe.tags, vec!["素食", "健康", "简单", "家常菜", "快手菜"]);
        Ok(())
    }

    #[test]
    fn test_row_defaults_and_clamping() -> anyhow::Result<()> {
        let row: RecipeRow = serde_json::from_str(
            r#"{"id":"7","title":"酸菜猪肉水饺","zid":"面点","制作难易":8,"辛辣程度":14}"#,
        )?;
        let recipe = row.into_recipe().expect("titled row converts");
        assert_eq!(recipe.cooking_time, "未知");
        assert_eq!(recipe.category, "面点");
        assert_eq!(recipe.difficulty, Difficulty::Medium);
        assert_eq!(recipe.scores, ScoreVector::new(5, 3, 5, 10, 5));
        assert_eq!(recipe.tags, vec!["辣"]);
        Ok(())
    }

    #[test]
    fn test_difficulty_column_used_when_effort_missing() {
        let row = RecipeRow {
            id: "3".to_string(),
            title: Some("红烧肉".to_string()),
            difficulty: Some(3),
            ..Default::default()
        };
        let recipe = row.into_recipe().expect("titled row converts");
        assert_eq!(recipe.scores.difficulty, 3);
        assert_eq!(recipe.category, "家常菜");
    }

    #[test]
    fn test_untitled_rows_are_dropped() {
        let rows = vec![
            RecipeRow {
                id: "1".to_string(),
                title: Some("  ".to_string()),
                ..Default::default()
            },
            RecipeRow {
                id: "2".to_string(),
                title: Some("凉拌黄瓜".to_string()),
                ..Default::default()
            },
        ];
        let recipes = rows_into_recipes(rows);
        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].id, "2");
    }
}
