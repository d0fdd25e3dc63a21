//! Response envelopes of the points API

use serde::Deserialize;

use super::{Coordinates, Point};

/// Response to the unpaged request
#[derive(Debug, Deserialize)]
pub struct PageCount {
    pub total_pages: u32,
}

/// Response to a `page=<n>` request
#[derive(Debug, Deserialize)]
pub struct PointsPage {
    pub items: Vec<PageItem>,
}

/// One listed item before filtering
///
/// Unclassified items are dropped unread, so nothing except the level is
/// required of them.
#[derive(Debug, Deserialize)]
pub struct PageItem {
    #[serde(default)]
    pub location: Option<Coordinates>,
    #[serde(default)]
    pub air_index_level: Option<String>,
}

impl PointsPage {
    /// Items that carry a classification, in page order
    ///
    /// Fails when a classified item has no location.
    pub fn into_classified(self) -> Result<Vec<Point>, String> {
        self.items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let level = item.air_index_level?;
                Some(match item.location {
                    Some(location) => Ok(Point {
                        location,
                        air_index_level: Some(level),
                    }),
                    None => Err(format!("item {index} is classified but has no location")),
                })
            })
            .collect()
    }
}
