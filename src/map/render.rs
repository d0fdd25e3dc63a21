//! Leaflet map document

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use tracing::{debug, instrument};

use super::ColorTable;
use crate::models::{Coordinates, Point};

/// Roughly the middle of Poland
pub const MAP_CENTER: Coordinates = Coordinates {
    latitude: 52.0,
    longitude: 19.0,
};
pub const MAP_ZOOM: u8 = 7;

/// Circle radius in meters
pub const MARKER_RADIUS_M: f64 = 750.0;
pub const MARKER_FILL_OPACITY: f64 = 0.6;

pub const TITLE_PREFIX: &str = "Dane pobrano o godzinie";
pub const TITLE_TIME_FORMAT: &str = "%H:%M %d.%m.%Y";

const LEAFLET_CSS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.css";
const LEAFLET_JS: &str = "https://unpkg.com/leaflet@1.9.4/dist/leaflet.js";
const TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// One filled circle on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub location: Coordinates,
    pub radius: f64,
    pub fill_color: &'static str,
    pub fill_opacity: f64,
    pub stroke: bool,
    /// Raw classification shown on hover
    pub tooltip: String,
}

/// A fully built map, ready to be serialized
#[derive(Debug, Clone, PartialEq)]
pub struct MapDocument {
    pub center: Coordinates,
    pub zoom: u8,
    pub markers: Vec<Marker>,
    pub title: String,
}

/// Build the map for the given points
///
/// Points without a classification get no marker. The timestamp is
/// rendered in its own time zone.
#[instrument(skip_all, fields(points = points.len()))]
pub fn render<Tz>(points: &[Point], colors: &ColorTable, timestamp: &DateTime<Tz>) -> MapDocument
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let markers: Vec<Marker> = points
        .iter()
        .filter_map(|point| {
            let level = point.air_index_level.as_ref()?;
            Some(Marker {
                location: point.location,
                radius: MARKER_RADIUS_M,
                fill_color: colors.lookup(level),
                fill_opacity: MARKER_FILL_OPACITY,
                stroke: false,
                tooltip: level.clone(),
            })
        })
        .collect();

    let title = format!("{TITLE_PREFIX} {}", timestamp.format(TITLE_TIME_FORMAT));
    debug!("Rendered {} markers, title '{}'", markers.len(), title);

    MapDocument {
        center: MAP_CENTER,
        zoom: MAP_ZOOM,
        markers,
        title,
    }
}

impl MapDocument {
    /// Serialize as a standalone HTML page
    pub fn to_html(&self) -> Result<String, serde_json::Error> {
        let markers: Vec<Marker> = self
            .markers
            .iter()
            .map(|marker| Marker {
                tooltip: escape_html(&marker.tooltip),
                ..marker.clone()
            })
            .collect();
        let markers_json = script_safe_json(&markers)?;

        let mut html = String::with_capacity(2048 + markers_json.len());
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str("<meta charset=\"utf-8\">\n");
        html.push_str(
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        html.push_str(&format!("<title>{}</title>\n", escape_html(&self.title)));
        html.push_str(&format!("<link rel=\"stylesheet\" href=\"{LEAFLET_CSS}\">\n"));
        html.push_str(&format!("<script src=\"{LEAFLET_JS}\"></script>\n"));
        html.push_str(concat!(
            "<style>\n",
            "html, body { width: 100%; height: 100%; margin: 0; padding: 0; }\n",
            "#map { position: absolute; top: 0; bottom: 0; right: 0; left: 0; }\n",
            "</style>\n",
        ));
        html.push_str("</head>\n<body>\n");
        html.push_str(&format!(
            "<h1 style=\"position:absolute;z-index:100000;left:35vw\">{}</h1>\n",
            escape_html(&self.title)
        ));
        html.push_str("<div id=\"map\"></div>\n<script>\n");
        html.push_str(&format!(
            "const map = L.map(\"map\").setView([{}, {}], {});\n",
            self.center.latitude, self.center.longitude, self.zoom
        ));
        html.push_str(&format!(
            "L.tileLayer(\"{TILE_URL}\", {{ maxZoom: 19, attribution: \"&copy; OpenStreetMap contributors\" }}).addTo(map);\n"
        ));
        html.push_str(&format!("const markers = {markers_json};\n"));
        html.push_str(concat!(
            "for (const m of markers) {\n",
            "  L.circle([m.location.latitude, m.location.longitude], {\n",
            "    radius: m.radius, stroke: m.stroke, fill: true,\n",
            "    fillColor: m.fillColor, fillOpacity: m.fillOpacity\n",
            "  }).bindTooltip(m.tooltip).addTo(map);\n",
            "}\n",
        ));
        html.push_str("</script>\n</body>\n</html>\n");
        Ok(html)
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

// JSON inside <script> must not contain a literal "</script>"
fn script_safe_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    Ok(serde_json::to_string(value)?.replace('<', "\\u003c"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use chrono_tz::Europe::Warsaw;

    fn timestamp() -> DateTime<chrono_tz::Tz> {
        Utc.with_ymd_and_hms(2026, 1, 15, 7, 5, 0)
            .unwrap()
            .with_timezone(&Warsaw)
    }

    #[test]
    fn test_empty_map_has_title() {
        let doc = render(&[], ColorTable::air_index(), &timestamp());
        assert!(doc.markers.is_empty());
        assert_eq!(doc.title, "Dane pobrano o godzinie 08:05 15.01.2026");
        assert_eq!(doc.center, MAP_CENTER);
        assert_eq!(doc.zoom, 7);

        let html = doc.to_html().unwrap();
        assert!(html.contains("const markers = [];"));
        assert!(html.contains(
            "<h1 style=\"position:absolute;z-index:100000;left:35vw\">Dane pobrano o godzinie 08:05 15.01.2026</h1>"
        ));
    }

    #[test]
    fn test_markers_follow_color_table() {
        let points = vec![
            Point::new(52.1, 21.0, Some("GOOD")),
            Point::new(52.2, 21.1, None),
            Point::new(50.0, 19.9, Some("VERY_BAD")),
            Point::new(51.0, 17.0, Some("UNKNOWN_LEVEL")),
        ];
        let doc = render(&points, ColorTable::air_index(), &timestamp());

        let colors: Vec<&str> = doc.markers.iter().map(|m| m.fill_color).collect();
        assert_eq!(colors, vec!["lightgreen", "black", "grey"]);

        let first = &doc.markers[0];
        assert_eq!(first.location.latitude, 52.1);
        assert_eq!(first.location.longitude, 21.0);
        assert_eq!(first.tooltip, "GOOD");
        assert_eq!(first.radius, 750.0);
        assert_eq!(first.fill_opacity, 0.6);
        assert!(!first.stroke);
    }

    #[test]
    fn test_render_is_deterministic() {
        let points = vec![Point::new(52.1, 21.0, Some("MODERATE"))];
        let a = render(&points, ColorTable::air_index(), &timestamp()).to_html().unwrap();
        let b = render(&points, ColorTable::air_index(), &timestamp()).to_html().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_html_embeds_markers() {
        let points = vec![Point::new(50.0, 19.9, Some("VERY_BAD"))];
        let html = render(&points, ColorTable::air_index(), &timestamp()).to_html().unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("L.map(\"map\").setView([52, 19], 7)"));
        assert!(html.contains(
            r#"{"location":{"latitude":50.0,"longitude":19.9},"radius":750.0,"fillColor":"black","fillOpacity":0.6,"stroke":false,"tooltip":"VERY_BAD"}"#
        ));
    }

    #[test]
    fn test_tooltip_cannot_break_out_of_script() {
        let points = vec![Point::new(50.0, 19.9, Some("</script><b>x</b>"))];
        let html = render(&points, ColorTable::air_index(), &timestamp()).to_html().unwrap();
        assert_eq!(html.matches("</script>").count(), 2);
        assert!(!html.contains("<b>x</b>"));
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refused"))
        }
    }

    #[test]
    fn test_serialization_failure_is_not_masked() {
        let err = script_safe_json(&Unserializable).unwrap_err();
        assert!(err.to_string().contains("refused"));
        assert_eq!(script_safe_json(&vec!["<"]).unwrap(), r#"["\u003c"]"#);
    }
}
