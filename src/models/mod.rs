//! Data models for the `AirMap` job
//!
//! - Point: a parcel locker location with its air quality reading
//! - Page: the envelopes returned by the points API

pub mod page;
pub mod point;

pub use page::{PageCount, PageItem, PointsPage};
pub use point::{AirIndexLevel, Coordinates, Point};
