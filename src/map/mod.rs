//! Map rendering
//!
//! Turns classified points into a Leaflet document: one colored circle per
//! point and a title naming the time the data was fetched.

pub mod colors;
pub mod render;

pub use colors::ColorTable;
pub use render::{MapDocument, Marker, render};
