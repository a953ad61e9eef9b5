use std::fmt;

/// Integer widths of the source language's primitive integer types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntWidth {
    /// `byte`
    W8,
    /// `short`
    W16,
    /// `int`
    W32,
    /// `long`
    W64,
}

impl IntWidth {
    pub fn bits(self) -> u32 {
        match self {
            IntWidth::W8 => 8,
            IntWidth::W16 => 16,
            IntWidth::W32 => 32,
            IntWidth::W64 => 64,
        }
    }

    /// Numeric promotion: never narrower than 32 bits.
    pub fn promoted(self) -> Self {
        self.max(IntWidth::W32)
    }

    /// Binary numeric promotion of two operand widths.
    pub fn widen(self, other: Self) -> Self {
        self.max(other).promoted()
    }
}

impl fmt::Display for IntWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntWidth::W8 => "byte",
            IntWidth::W16 => "short",
            IntWidth::W32 => "int",
            IntWidth::W64 => "long",
        };
        write!(f, "{}", name)
    }
}

/// A signed integer of a given width.
///
/// The stored value always fits the width: constructing through [`IntValue::new`]
/// wraps it the same way a narrowing cast would.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntValue {
    width: IntWidth,
    value: i64,
}

impl IntValue {
    pub fn new(width: IntWidth, value: i64) -> Self {
        let value = match width {
            IntWidth::W8 => value as i8 as i64,
            IntWidth::W16 => value as i16 as i64,
            IntWidth::W32 => value as i32 as i64,
            IntWidth::W64 => value,
        };
        Self { width, value }
    }

    pub fn byte(value: i8) -> Self {
        Self::new(IntWidth::W8, value.into())
    }

    pub fn int(value: i32) -> Self {
        Self::new(IntWidth::W32, value.into())
    }

    pub fn long(value: i64) -> Self {
        Self::new(IntWidth::W64, value)
    }

    pub fn width(self) -> IntWidth {
        self.width
    }

    pub fn get(self) -> i64 {
        self.value
    }

    /// Same numeric value, re-typed to `width` (sign-extending or truncating).
    pub fn cast(self, width: IntWidth) -> Self {
        Self::new(width, self.value)
    }
}

impl fmt::Display for IntValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

/// Result of evaluating a constant expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Bool(bool),
    /// UTF-16 code unit.
    Char(u16),
    Int(IntValue),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// View a value as an integer operand; `char` counts as an unsigned 16-bit number.
    pub fn as_int(&self) -> Option<IntValue> {
        match self {
            Value::Int(v) => Some(*v),
            Value::Char(c) => Some(IntValue::int(i32::from(*c))),
            _ => None,
        }
    }

    /// String conversion used by text concatenation.
    pub fn to_text(&self) -> String {
        match self {
            Value::Text(text) => text.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Char(c) => char::decode_utf16([*c])
                .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect(),
            Value::Int(v) => v.to_string(),
        }
    }
}
