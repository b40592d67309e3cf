use crate::recipe::{Difficulty, ScoreVector};

/// A named preference vector offered as a one-tap starting point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preset {
    pub name: &'static str,
    /// ASCII alias accepted on the command line.
    pub key: &'static str,
    pub emoji: &'static str,
    pub description: &'static str,
    pub preferences: ScoreVector,
}

pub const PRESETS: [Preset; 6] = [
    Preset {
        name: "健康达人",
        key: "healthy",
        emoji: "🥗",
        description: "注重营养均衡",
        preferences: ScoreVector { healthy: 10, difficulty: 1, vegetarian: 8, spicy: 2, sweetness: 3 },
    },
    Preset {
        name: "简单易做",
        key: "quick",
        emoji: "⚡",
        description: "制作简单快手",
        preferences: ScoreVector { healthy: 6, difficulty: 1, vegetarian: 5, spicy: 4, sweetness: 5 },
    },
    Preset {
        name: "素食主义",
        key: "vegetarian",
        emoji: "🥬",
        description: "纯素食菜品",
        preferences: ScoreVector { healthy: 9, difficulty: 2, vegetarian: 10, spicy: 3, sweetness: 4 },
    },
    Preset {
        name: "重口味",
        key: "bold",
        emoji: "🌶️",
        description: "香辣刺激",
        preferences: ScoreVector { healthy: 4, difficulty: 3, vegetarian: 3, spicy: 10, sweetness: 2 },
    },
    Preset {
        name: "精致烹饪",
        key: "refined",
        emoji: "👨‍🍳",
        description: "复杂精美菜品",
        preferences: ScoreVector { healthy: 7, difficulty: 3, vegetarian: 4, spicy: 5, sweetness: 6 },
    },
    Preset {
        name: "均衡口味",
        key: "balanced",
        emoji: "⚖️",
        description: "中等偏好",
        preferences: ScoreVector { healthy: 5, difficulty: 2, vegetarian: 5, spicy: 5, sweetness: 5 },
    },
];

impl Preset {
    /// One-line description for listings, with the difficulty spelled out.
    pub fn summary(&self) -> String {
        let p = self.preferences;
        let difficulty = Difficulty::from_level_lossy(p.difficulty as i64);
        format!(
            "{} {} ({}): {}  healthy={} difficulty={}({}) vegetarian={} spicy={} sweetness={}",
            self.emoji,
            self.name,
            self.key,
            self.description,
            p.healthy,
            p.difficulty,
            difficulty.label(),
            p.vegetarian,
            p.spicy,
            p.sweetness
        )
    }
}

/// Finds a preset by display name or alias (alias match ignores ASCII case).
pub fn find_preset(name: &str) -> Option<&'static Preset> {
    let name = name.trim();
    PRESETS
        .iter()
        .find(|preset| preset.name == name || preset.key.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_preset_by_name_and_alias() {
        let by_name = find_preset("重口味").unwrap();
        let by_key = find_preset(" BOLD ").unwrap();
        assert_eq!(by_name, by_key);
        assert_eq!(by_name.preferences.spicy, 10);
        assert!(find_preset("甜品控").is_none());
    }

    #[test]
    fn test_presets_are_in_range_and_unique() {
        for (i, preset) in PRESETS.iter().enumerate() {
            assert_eq!(preset.preferences, preset.preferences.clamped(), "{}", preset.name);
            assert!(PRESETS[i + 1..].iter().all(|other| other.key != preset.key));
        }
        assert_eq!(find_preset("均衡口味").unwrap().preferences, ScoreVector::default());
    }

    #[test]
    fn test_summary_includes_difficulty_label() {
        let line = find_preset("refined").unwrap().summary();
        assert!(line.starts_with("👨‍🍳 精致烹饪 (refined)"));
        assert!(line.contains("difficulty=3(困难)"));
        assert!(find_preset("quick").unwrap().summary().contains("difficulty=1(简单)"));
    }
}
