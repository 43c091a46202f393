//! EXIF metadata extraction and GPS resolution library for photo2kml
//!
//! This crate reads the embedded metadata of a photo, resolves tag identifiers
//! to names, normalizes the GPS block and turns it into a signed
//! decimal-degree position.

pub mod extract;
pub mod gps;
pub mod metadata;
pub mod photo;
pub mod raw;
pub mod tags;

pub use extract::{decode_gps_value, extract};
pub use gps::{dms_to_decimal, locate, resolve, Coordinate, FixError};
pub use metadata::{Metadata, Value};
pub use photo::{read_metadata, Photo};
pub use raw::{Fraction, RawEntry, RawMetadata, RawValue};
pub use tags::TagKey;
