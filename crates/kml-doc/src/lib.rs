//! Minimal KML 2.2 document builder for photo2kml
//!
//! Covers the subset needed to drop photo markers on a map: placemarks with a
//! point, an HTML popup and a normal/highlight icon style pair.
//!
//! # Example
//!
//! ```
//! use kml_doc::{Document, IconStyle, Placemark, StyleMap};
//!
//! let mut doc = Document::new();
//! doc.add_placemark(
//!     Placemark::new("pier.jpg", Some((-122.4, 37.8)))
//!         .with_description(kml_doc::image_popup("pier.jpg", "500px"))
//!         .with_style_map(StyleMap::new(
//!             IconStyle::new("camera.png", 1.0),
//!             IconStyle::new("pier.jpg", 2.0),
//!         )),
//! );
//! assert!(doc.to_xml().unwrap().contains("<coordinates>-122.4,37.8,0</coordinates>"));
//! ```

pub mod writer;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use quick_xml::escape::escape;

pub const KML_NAMESPACE: &str = "http://www.opengis.net/kml/2.2";

/// Icon and scale for one style state
#[derive(Debug, Clone, PartialEq)]
pub struct IconStyle {
    pub href: String,
    pub scale: f64,
}

impl IconStyle {
    pub fn new(href: impl Into<String>, scale: f64) -> Self {
        Self {
            href: href.into(),
            scale,
        }
    }
}

/// Styles for the unselected and the selected/hovered marker
#[derive(Debug, Clone, PartialEq)]
pub struct StyleMap {
    pub normal: IconStyle,
    pub highlight: IconStyle,
}

impl StyleMap {
    pub fn new(normal: IconStyle, highlight: IconStyle) -> Self {
        Self { normal, highlight }
    }
}

/// A named marker. Without coordinates it is listed but not placed.
#[derive(Debug, Clone, PartialEq)]
pub struct Placemark {
    name: String,
    /// (longitude, latitude)
    coordinates: Option<(f64, f64)>,
    description: Option<String>,
    style_map: Option<StyleMap>,
}

impl Placemark {
    /// `coordinates` is longitude first, as KML stores points
    pub fn new(name: impl Into<String>, coordinates: Option<(f64, f64)>) -> Self {
        Self {
            name: name.into(),
            coordinates,
            description: None,
            style_map: None,
        }
    }

    /// HTML shown in the popup
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_style_map(mut self, style_map: StyleMap) -> Self {
        self.style_map = Some(style_map);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.coordinates
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn style_map(&self) -> Option<&StyleMap> {
        self.style_map.as_ref()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    placemarks: Vec<Placemark>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_placemark(&mut self, placemark: Placemark) {
        self.placemarks.push(placemark);
    }

    pub fn placemarks(&self) -> &[Placemark] {
        &self.placemarks
    }

    /// Serialize as a KML document
    pub fn to_xml(&self) -> Result<String> {
        writer::write_document(self)
    }

    /// Write the document to `path`, replacing any existing file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let xml = self.to_xml()?;
        fs::write(path, xml)
            .with_context(|| format!("Failed to write KML to {}", path.display()))
    }
}

/// Popup HTML embedding an image
pub fn image_popup(src: &str, height: &str) -> String {
    format!(r#"<img src="{}" height="{}" />"#, escape(src), escape(height))
}
