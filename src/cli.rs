use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::presets::find_preset;
use crate::recipe::Dimension;
use crate::scoring::PreferenceInput;

/// Recommend recipes by taste preferences or by ingredients.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Healthiness preference (0-10)
    #[arg(long)]
    pub healthy: Option<i64>,

    /// Difficulty preference (1 simple, 2 medium, 3 hard)
    #[arg(long)]
    pub difficulty: Option<i64>,

    /// Vegetarian preference (0-10)
    #[arg(long)]
    pub vegetarian: Option<i64>,

    /// Spiciness preference (0-10)
    #[arg(long)]
    pub spicy: Option<i64>,

    /// Sweetness preference (0-10)
    #[arg(long)]
    pub sweetness: Option<i64>,

    /// Start from a named preset (e.g. 健康达人 or healthy); dimension flags override it
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Ingredient search, terms separated by spaces (e.g. "番茄 鸡蛋")
    #[arg(short, long)]
    pub query: Option<String>,

    /// Base URL of the recipe backend
    #[arg(long)]
    pub source_url: Option<String>,

    /// Recipe catalog file (.csv or .json) used when no backend URL is set
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// JSON recipe list replacing the embedded fallback catalog
    #[arg(long)]
    pub fallback: Option<PathBuf>,

    /// Maximum number of recipes to return
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Seed for reproducible ordering
    #[arg(long)]
    pub seed: Option<u64>,

    /// Session file holding the last search and preferences
    #[arg(long)]
    pub session: Option<PathBuf>,

    /// Forget the remembered search before running
    #[arg(long)]
    pub clear_search: bool,

    /// Print the available presets and exit
    #[arg(long)]
    pub list_presets: bool,
}

impl Cli {
    /// Preferences assembled from `--preset` and the dimension flags, or
    /// `None` when the caller gave neither.
    pub fn preferences(&self) -> Result<Option<PreferenceInput>, String> {
        let mut input = match &self.preset {
            Some(name) => {
                let preset = find_preset(name).ok_or_else(|| format!("Unknown preset '{}'", name))?;
                Some(PreferenceInput::from(preset.preferences))
            }
            None => None,
        };

        for dimension in Dimension::ALL {
            let Some(value) = self.flag(dimension) else {
                continue;
            };
            let target = input.get_or_insert_with(PreferenceInput::default);
            match dimension {
                Dimension::Healthy => target.healthy = Some(value),
                Dimension::Difficulty => target.difficulty = Some(value),
                Dimension::Vegetarian => target.vegetarian = Some(value),
                Dimension::Spicy => target.spicy = Some(value),
                Dimension::Sweetness => target.sweetness = Some(value),
            }
        }
        Ok(input)
    }

    fn flag(&self, dimension: Dimension) -> Option<i64> {
        match dimension {
            Dimension::Healthy => self.healthy,
            Dimension::Difficulty => self.difficulty,
            Dimension::Vegetarian => self.vegetarian,
            Dimension::Spicy => self.spicy,
            Dimension::Sweetness => self.sweetness,
        }
    }

    /// Applies command-line overrides on top of `config`.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(url) = &self.source_url {
            config.source_url = Some(url.clone());
        }
        if let Some(path) = &self.catalog {
            config.catalog_path = Some(path.clone());
        }
        if let Some(path) = &self.fallback {
            config.fallback_path = Some(path.clone());
        }
        if let Some(limit) = self.limit {
            config.result_limit = limit;
        }
        if let Some(path) = &self.session {
            config.session_path = Some(path.clone());
        }
    }
}

pub fn parse_args() -> Cli {
    Cli::parse()
}
