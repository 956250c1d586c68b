//! Operation attributes.

use num_bigint::BigInt;
use strum::{EnumIs, EnumTryAs};

use crate::affine::MapRef;

/// A constant attribute value attached to an operation under a name.
///
/// Printed attribute text is a diagnostic rendering: strings are
/// emitted quoted but unescaped and floats through the shortest `f64`
/// form, so attribute text is not guaranteed to round-trip bit-exactly.
#[derive(Debug, Clone, PartialEq, EnumIs, EnumTryAs)]
pub enum Attribute {
    Bool(bool),
    /// Arbitrary-precision integer.
    Integer(BigInt),
    Float(f64),
    String(String),
    /// Ordered, possibly nested sequence of attributes.
    Array(Vec<Attribute>),
    AffineMap(MapRef),
}

impl From<bool> for Attribute {
    fn from(value: bool) -> Self {
        Attribute::Bool(value)
    }
}

impl From<i64> for Attribute {
    fn from(value: i64) -> Self {
        Attribute::Integer(BigInt::from(value))
    }
}

impl From<BigInt> for Attribute {
    fn from(value: BigInt) -> Self {
        Attribute::Integer(value)
    }
}

impl From<f64> for Attribute {
    fn from(value: f64) -> Self {
        Attribute::Float(value)
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Attribute::String(value.to_string())
    }
}

impl From<MapRef> for Attribute {
    fn from(value: MapRef) -> Self {
        Attribute::AffineMap(value)
    }
}

/// An attribute together with the name it is attached under.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedAttribute {
    pub name: String,
    pub value: Attribute,
}

impl NamedAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<Attribute>) -> Self {
        NamedAttribute {
            name: name.into(),
            value: value.into(),
        }
    }
}
