//! GPS coordinate resolution for photo2kml
//!
//! Converts the degree/minute/second magnitudes and hemisphere references of
//! a decoded GPS block into signed decimal degrees.
//!
//! A field that is absent and a field that is present but empty are reported
//! separately. An all-zero magnitude is a real position (equator or prime
//! meridian) and resolves normally.

use thiserror::Error;

use crate::metadata::{Metadata, Value};
use crate::tags::{
    TagKey, GPS_INFO, GPS_LATITUDE, GPS_LATITUDE_REF, GPS_LONGITUDE, GPS_LONGITUDE_REF,
};

const SOUTH: &str = "S";
const WEST: &str = "W";

/// A position in signed decimal degrees. Not range-checked.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn lat_lon(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }

    /// Point order used by KML and GeoJSON
    pub fn lon_lat(&self) -> (f64, f64) {
        (self.longitude, self.latitude)
    }
}

/// Why a mapping has no GPS fix
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FixError {
    #[error("no GPS block")]
    NoGpsBlock,
    #[error("{0} is missing")]
    Missing(TagKey),
    #[error("{0} is present but empty")]
    Degenerate(TagKey),
    #[error("{0} is not a degree/minute/second triple")]
    Malformed(TagKey),
}

/// Resolve the position of a decoded metadata mapping, if it has one
pub fn resolve(metadata: &Metadata) -> Option<Coordinate> {
    locate(metadata).ok()
}

/// Like [`resolve`], reporting why there is no fix
pub fn locate(metadata: &Metadata) -> Result<Coordinate, FixError> {
    let gps = match metadata.get(&GPS_INFO) {
        Some(Value::Block(gps)) => gps,
        _ => return Err(FixError::NoGpsBlock),
    };

    let latitude = required(gps, GPS_LATITUDE)?;
    let latitude_ref = required(gps, GPS_LATITUDE_REF)?;
    let longitude = required(gps, GPS_LONGITUDE)?;
    let longitude_ref = required(gps, GPS_LONGITUDE_REF)?;

    let mut lat = magnitude(latitude, GPS_LATITUDE)?;
    if latitude_ref.as_text() == Some(SOUTH) {
        lat = -lat;
    }

    let mut lon = magnitude(longitude, GPS_LONGITUDE)?;
    if longitude_ref.as_text() == Some(WEST) {
        lon = -lon;
    }

    Ok(Coordinate::new(lat, lon))
}

/// Sexagesimal to decimal degrees
pub fn dms_to_decimal(degrees: f64, minutes: f64, seconds: f64) -> f64 {
    degrees + minutes / 60.0 + seconds / 3600.0
}

fn required(gps: &Metadata, key: TagKey) -> Result<&Value, FixError> {
    match gps.get(&key) {
        None => Err(FixError::Missing(key)),
        Some(value) if value.is_empty() => Err(FixError::Degenerate(key)),
        Some(value) => Ok(value),
    }
}

fn magnitude(value: &Value, key: TagKey) -> Result<f64, FixError> {
    match value.as_reals().as_deref() {
        Some(&[degrees, minutes, seconds]) => Ok(dms_to_decimal(degrees, minutes, seconds)),
        _ => Err(FixError::Malformed(key)),
    }
}
