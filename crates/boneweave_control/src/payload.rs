//! Typed mechanism payloads.
//!
//! A [`Payload`] is the raw value a front-end passes alongside a mechanism
//! name. Coercions are strict about shape but accept the spellings scripts
//! commonly produce, such as an integer where a float is expected or a
//! `"20t"` duration string.

use std::fmt;

use boneweave_core::errors::{BoneError, Result};
use boneweave_core::{ItemStack, ObserverId};
use glam::{Quat, Vec3};

/// Ticks per second of the host's world clock.
pub const TICKS_PER_SECOND: u32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Vector(Vec3),
    Quaternion(Quat),
    Item(ItemStack),
    /// A duration already expressed in ticks.
    Ticks(u32),
    Observer(ObserverId),
    List(Vec<Payload>),
}

impl Payload {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Int(_) => "integer",
            Self::Float(_) => "number",
            Self::Text(_) => "text",
            Self::Vector(_) => "vector",
            Self::Quaternion(_) => "quaternion",
            Self::Item(_) => "item",
            Self::Ticks(_) => "duration",
            Self::Observer(_) => "observer",
            Self::List(_) => "list",
        }
    }

    pub fn as_bool(&self, mechanism: &str) -> Result<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            Self::Text(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Self::Text(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            other => Err(other.mismatch(mechanism, "boolean")),
        }
    }

    pub fn as_int(&self, mechanism: &str) -> Result<i64> {
        match self {
            Self::Int(i) => Ok(*i),
            Self::Ticks(t) => Ok(i64::from(*t)),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| self.mismatch(mechanism, "integer")),
            other => Err(other.mismatch(mechanism, "integer")),
        }
    }

    pub fn as_float(&self, mechanism: &str) -> Result<f32> {
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        let value = match self {
            Self::Float(f) => *f as f32,
            Self::Int(i) => *i as f32,
            Self::Text(s) => s
                .trim()
                .parse::<f32>()
                .map_err(|_| self.mismatch(mechanism, "number"))?,
            other => return Err(other.mismatch(mechanism, "number")),
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(BoneError::invalid_payload(
                mechanism,
                format!("{value} is not a finite number"),
            ))
        }
    }

    /// Accepts a vector or a list of exactly three numbers.
    pub fn as_vector(&self, mechanism: &str) -> Result<Vec3> {
        match self {
            Self::Vector(v) => Ok(*v),
            Self::List(items) => match items.as_slice() {
                [x, y, z] => Ok(Vec3::new(
                    x.as_float(mechanism)?,
                    y.as_float(mechanism)?,
                    z.as_float(mechanism)?,
                )),
                _ => Err(arity(mechanism, "3 numbers", items.len())),
            },
            other => Err(other.mismatch(mechanism, "vector")),
        }
    }

    /// Accepts a quaternion or a list of exactly four numbers `[x, y, z, w]`.
    pub fn as_quaternion(&self, mechanism: &str) -> Result<Quat> {
        match self {
            Self::Quaternion(q) => Ok(*q),
            Self::List(items) => match items.as_slice() {
                [x, y, z, w] => Ok(Quat::from_xyzw(
                    x.as_float(mechanism)?,
                    y.as_float(mechanism)?,
                    z.as_float(mechanism)?,
                    w.as_float(mechanism)?,
                )),
                _ => Err(arity(mechanism, "4 numbers", items.len())),
            },
            other => Err(other.mismatch(mechanism, "quaternion")),
        }
    }

    /// Accepts ticks, a non-negative integer, or text like `20t`, `2s` or `1m`.
    pub fn as_ticks(&self, mechanism: &str) -> Result<u32> {
        match self {
            Self::Ticks(t) => Ok(*t),
            Self::Int(i) => u32::try_from(*i).map_err(|_| {
                BoneError::invalid_payload(mechanism, format!("{i} is not a valid tick count"))
            }),
            Self::Text(s) => parse_duration(s).ok_or_else(|| {
                BoneError::invalid_payload(mechanism, format!("'{s}' is not a duration"))
            }),
            other => Err(other.mismatch(mechanism, "duration")),
        }
    }

    pub fn as_observer(&self, mechanism: &str) -> Result<ObserverId> {
        match self {
            Self::Observer(id) => Ok(*id),
            Self::Text(s) => ObserverId::parse_str(s.trim())
                .map_err(|_| self.mismatch(mechanism, "observer")),
            other => Err(other.mismatch(mechanism, "observer")),
        }
    }

    pub fn as_list(&self, mechanism: &str) -> Result<&[Payload]> {
        match self {
            Self::List(items) => Ok(items),
            other => Err(other.mismatch(mechanism, "list")),
        }
    }

    fn mismatch(&self, mechanism: &str, expected: &str) -> BoneError {
        BoneError::invalid_payload(
            mechanism,
            format!("expected {expected}, got {} ({self})", self.type_name()),
        )
    }
}

fn arity(mechanism: &str, expected: &str, got: usize) -> BoneError {
    BoneError::invalid_payload(
        mechanism,
        format!("expected a list of {expected}, got {got} elements"),
    )
}

fn parse_duration(text: &str) -> Option<u32> {
    let text = text.trim().to_ascii_lowercase();
    let (number, unit) = match text.char_indices().last()? {
        (i, c @ ('t' | 's' | 'm')) => (&text[..i], Some(c)),
        _ => (text.as_str(), None),
    };
    let value: u32 = number.trim().parse().ok()?;
    match unit {
        None | Some('t') => Some(value),
        Some('s') => value.checked_mul(TICKS_PER_SECOND),
        Some('m') => value.checked_mul(TICKS_PER_SECOND * 60),
        Some(_) => None,
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "'{s}'"),
            Self::Vector(v) => write!(f, "{},{},{}", v.x, v.y, v.z),
            Self::Quaternion(q) => write!(f, "{},{},{},{}", q.x, q.y, q.z, q.w),
            Self::Item(item) => f.write_str(&item.id),
            Self::Ticks(t) => write!(f, "{t}t"),
            Self::Observer(id) => write!(f, "{id}"),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Payload {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Payload {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Payload {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Payload {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec3> for Payload {
    fn from(value: Vec3) -> Self {
        Self::Vector(value)
    }
}

impl From<Quat> for Payload {
    fn from(value: Quat) -> Self {
        Self::Quaternion(value)
    }
}

impl From<ItemStack> for Payload {
    fn from(value: ItemStack) -> Self {
        Self::Item(value)
    }
}

impl From<ObserverId> for Payload {
    fn from(value: ObserverId) -> Self {
        Self::Observer(value)
    }
}

impl<T: Into<Payload>> From<Vec<T>> for Payload {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}
