//! Decoded metadata mapping

use std::collections::BTreeMap;

use crate::raw::Fraction;
use crate::tags::TagKey;

/// A decoded metadata value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Integers(Vec<i64>),
    Real(f64),
    Reals(Vec<f64>),
    Text(String),
    Bytes(Vec<u8>),
    /// Fractions outside the GPS block are kept as encoded
    Fraction(Fraction),
    Fractions(Vec<Fraction>),
    Block(Metadata),
}

impl Value {
    /// True for a present value that carries nothing: empty text or an
    /// empty sequence. Zero numbers are not empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Text(text) => text.is_empty(),
            Value::Bytes(bytes) => bytes.is_empty(),
            Value::Integers(values) => values.is_empty(),
            Value::Reals(values) => values.is_empty(),
            Value::Fractions(values) => values.is_empty(),
            Value::Block(block) => block.is_empty(),
            Value::Integer(_) | Value::Real(_) | Value::Fraction(_) => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric sequence view, whatever the element encoding
    pub fn as_reals(&self) -> Option<Vec<f64>> {
        match self {
            Value::Reals(values) => Some(values.clone()),
            Value::Integers(values) => Some(values.iter().map(|&v| v as f64).collect()),
            Value::Fractions(values) => Some(values.iter().map(|f| f.to_f64()).collect()),
            _ => None,
        }
    }
}

/// Mapping from resolved tag name to decoded value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    entries: BTreeMap<TagKey, Value>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: TagKey, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    pub fn get(&self, key: &TagKey) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &TagKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TagKey, &Value)> {
        self.entries.iter()
    }
}

impl FromIterator<(TagKey, Value)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (TagKey, Value)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(Value::Text(String::new()).is_empty());
        assert!(Value::Reals(vec![]).is_empty());
        assert!(Value::Block(Metadata::new()).is_empty());
        assert!(!Value::Reals(vec![0.0, 0.0, 0.0]).is_empty());
        assert!(!Value::Integer(0).is_empty());
        assert!(!Value::Text("N".into()).is_empty());
    }

    #[test]
    fn test_as_reals_accepts_any_numeric_sequence() {
        assert_eq!(Value::Integers(vec![10, 0, 0]).as_reals(), Some(vec![10.0, 0.0, 0.0]));
        assert_eq!(
            Value::Fractions(vec![Fraction::new(3, 2)]).as_reals(),
            Some(vec![1.5])
        );
        assert_eq!(Value::Real(1.0).as_reals(), None);
        assert_eq!(Value::Text("N".into()).as_reals(), None);
    }

    #[test]
    fn test_keys_are_unique() {
        let mut metadata = Metadata::new();
        assert!(metadata.insert(TagKey::Name("Make"), Value::Text("A".into())).is_none());
        let previous = metadata.insert(TagKey::Name("Make"), Value::Text("B".into()));
        assert_eq!(previous, Some(Value::Text("A".into())));
        assert_eq!(metadata.len(), 1);
    }
}
