//! Metadata extraction for photo2kml
//!
//! Turns the raw entries of an image into a [`Metadata`] mapping keyed by tag
//! name. The GPS block is resolved through its own table and its fractions are
//! reduced to floating point; everything else keeps its encoded shape.

use crate::metadata::{Metadata, Value};
use crate::raw::{RawEntry, RawMetadata, RawValue};
use crate::tags::{self, TagKey, GPS_INFO};

/// Decode the metadata block of an image. No block, or an empty one,
/// yields an empty mapping.
pub fn extract(raw: Option<&RawMetadata>) -> Metadata {
    let Some(raw) = raw else {
        return Metadata::new();
    };

    raw.entries()
        .iter()
        .map(|entry| {
            let key = tags::exif_key(entry.tag);
            let value = match (&entry.value, key == GPS_INFO) {
                (RawValue::Ifd(block), true) => Value::Block(gps_block(block)),
                _ => convert(entry.value.clone()),
            };
            (key, value)
        })
        .collect()
}

/// Resolve and decode the entries of a GPS block
pub fn gps_block(entries: &[RawEntry]) -> Metadata {
    entries
        .iter()
        .map(|entry| (tags::gps_key(entry.tag), decode_gps_value(entry.value.clone())))
        .collect()
}

/// Reduce a single fraction to its quotient and a fraction tuple to a tuple
/// of quotients, keeping length and order. Other shapes pass through.
pub fn decode_gps_value(value: RawValue) -> Value {
    match value {
        RawValue::Fraction(fraction) => Value::Real(fraction.to_f64()),
        RawValue::Fractions(fractions) => {
            Value::Reals(fractions.into_iter().map(|f| f.to_f64()).collect())
        }
        other => convert(other),
    }
}

fn convert(value: RawValue) -> Value {
    match value {
        RawValue::Integer(v) => Value::Integer(v),
        RawValue::Integers(v) => Value::Integers(v),
        RawValue::Real(v) => Value::Real(v),
        RawValue::Reals(v) => Value::Reals(v),
        RawValue::Text(v) => Value::Text(v),
        RawValue::Bytes(v) => Value::Bytes(v),
        RawValue::Fraction(v) => Value::Fraction(v),
        RawValue::Fractions(v) => Value::Fractions(v),
        RawValue::Ifd(entries) => Value::Block(
            entries
                .into_iter()
                .map(|entry| (TagKey::Raw(entry.tag), convert(entry.value)))
                .collect(),
        ),
    }
}
