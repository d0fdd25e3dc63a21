//! Classification to marker color lookup

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::models::AirIndexLevel;

/// Color used for classifications the table does not know
pub const DEFAULT_COLOR: &str = "grey";

static AIR_INDEX_COLORS: LazyLock<ColorTable> = LazyLock::new(|| {
    ColorTable::new(
        [
            (AirIndexLevel::VeryGood, "green"),
            (AirIndexLevel::Good, "lightgreen"),
            (AirIndexLevel::Satisfactory, "orange"),
            (AirIndexLevel::Moderate, "red"),
            (AirIndexLevel::Bad, "darkred"),
            (AirIndexLevel::VeryBad, "black"),
        ],
        DEFAULT_COLOR,
    )
});

/// Immutable mapping from air index level to a CSS color name
#[derive(Debug, Clone)]
pub struct ColorTable {
    colors: HashMap<AirIndexLevel, &'static str>,
    fallback: &'static str,
}

impl ColorTable {
    pub fn new(
        entries: impl IntoIterator<Item = (AirIndexLevel, &'static str)>,
        fallback: &'static str,
    ) -> Self {
        Self {
            colors: entries.into_iter().collect(),
            fallback,
        }
    }

    /// The table used for published maps
    #[must_use]
    pub fn air_index() -> &'static ColorTable {
        &AIR_INDEX_COLORS
    }

    /// Color for a raw classification, the fallback for unrecognized ones
    #[must_use]
    pub fn lookup(&self, raw_level: &str) -> &'static str {
        raw_level
            .parse::<AirIndexLevel>()
            .ok()
            .and_then(|level| self.colors.get(&level).copied())
            .unwrap_or(self.fallback)
    }
}
