use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::scoring::PreferenceInput;
use crate::search::is_blank;

/// What a caller carries between requests: the last search and the last
/// preference vector. Passed explicitly into every `recommend` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_preferences: Option<PreferenceInput>,
}

impl RequestContext {
    /// The remembered search, if it still holds a usable term.
    pub fn active_search(&self) -> Option<&str> {
        self.last_search.as_deref().filter(|q| !is_blank(q))
    }

    /// Records the parts of a request worth carrying forward. A blank
    /// query leaves the remembered search untouched.
    pub fn remember(&mut self, search_query: Option<&str>, preferences: Option<PreferenceInput>) {
        if let Some(query) = search_query.map(str::trim).filter(|q| !is_blank(q)) {
            self.last_search = Some(query.to_string());
        }
        if preferences.is_some() {
            self.last_preferences = preferences;
        }
    }

    pub fn clear_search(&mut self) {
        self.last_search = None;
    }

    /// Reads a context file; a missing file yields an empty context.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file at {:?}", path))?;
        serde_json::from_str(&data).with_context(|| format!("Invalid session file at {:?}", path))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Failed to serialize session")?;
        std::fs::write(path, data).with_context(|| format!("Failed to write session file at {:?}", path))
    }
}
