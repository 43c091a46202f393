//! Uninterpreted metadata as stored in the image container

/// A rational number exactly as encoded in the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fraction {
    pub num: i64,
    pub denom: i64,
}

impl Fraction {
    pub fn new(num: i64, denom: i64) -> Self {
        Self { num, denom }
    }

    /// Floating-point quotient. A zero denominator yields inf or NaN.
    pub fn to_f64(self) -> f64 {
        self.num as f64 / self.denom as f64
    }
}

/// Value of a raw entry, by shape
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Integer(i64),
    Integers(Vec<i64>),
    Real(f64),
    Reals(Vec<f64>),
    Text(String),
    Bytes(Vec<u8>),
    Fraction(Fraction),
    Fractions(Vec<Fraction>),
    /// Nested directory of entries, such as the GPS block
    Ifd(Vec<RawEntry>),
}

impl RawValue {
    /// Collapse a one-element sequence to a scalar
    pub fn integers(values: impl IntoIterator<Item = i64>) -> Self {
        let mut values: Vec<i64> = values.into_iter().collect();
        if values.len() == 1 {
            RawValue::Integer(values.remove(0))
        } else {
            RawValue::Integers(values)
        }
    }

    pub fn reals(values: impl IntoIterator<Item = f64>) -> Self {
        let mut values: Vec<f64> = values.into_iter().collect();
        if values.len() == 1 {
            RawValue::Real(values.remove(0))
        } else {
            RawValue::Reals(values)
        }
    }

    pub fn fractions(values: impl IntoIterator<Item = Fraction>) -> Self {
        let mut values: Vec<Fraction> = values.into_iter().collect();
        if values.len() == 1 {
            RawValue::Fraction(values.remove(0))
        } else {
            RawValue::Fractions(values)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawEntry {
    pub tag: u16,
    pub value: RawValue,
}

impl RawEntry {
    pub fn new(tag: u16, value: RawValue) -> Self {
        Self { tag, value }
    }
}

/// The embedded metadata block of one image
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMetadata {
    entries: Vec<RawEntry>,
}

impl RawMetadata {
    pub fn new(entries: Vec<RawEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[RawEntry] {
        &self.entries
    }
}
