//! Cart Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Wrapper for a cart in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Lines in the order they were added
    pub lines: Vec<LineFixture>,
}

/// Cart Line Fixture
#[derive(Debug, Deserialize)]
pub struct LineFixture {
    /// Product slug from the catalog
    pub product: String,

    /// Quantity ordered
    pub quantity: u32,

    /// Size variant, for sized products
    #[serde(default)]
    pub variant: Option<String>,

    /// Option group name -> chosen value
    #[serde(default)]
    pub options: FxHashMap<String, String>,
}

impl LineFixture {
    /// Option selections as `(group, choice)` pairs, ordered by group name.
    pub fn selections(&self) -> Vec<(&str, &str)> {
        let mut selections: Vec<(&str, &str)> = self
            .options
            .iter()
            .map(|(group, choice)| (group.as_str(), choice.as_str()))
            .collect();

        selections.sort_unstable();

        selections
    }
}
