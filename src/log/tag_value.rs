use crate::util::escape_ascii;
use std::fmt::{Debug, Display, Formatter};

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum TagValue {
    Str(&'static str),
    String(String),
    Bool(bool),
    I64(i64),
    U64(u64),
    Null,
}
impl From<&'static str> for TagValue {
    fn from(value: &'static str) -> Self {
        Self::Str(value)
    }
}
impl From<String> for TagValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}
impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
impl From<i32> for TagValue {
    fn from(value: i32) -> Self {
        Self::I64(i64::from(value))
    }
}
impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        Self::I64(value)
    }
}
impl From<u16> for TagValue {
    fn from(value: u16) -> Self {
        Self::U64(u64::from(value))
    }
}
impl From<u32> for TagValue {
    fn from(value: u32) -> Self {
        Self::U64(u64::from(value))
    }
}
impl From<u64> for TagValue {
    fn from(value: u64) -> Self {
        Self::U64(value)
    }
}
impl From<usize> for TagValue {
    fn from(value: usize) -> Self {
        Self::U64(value as u64)
    }
}
impl<T: Into<TagValue>> From<Option<T>> for TagValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(TagValue::Null, Into::into)
    }
}
impl Display for TagValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            TagValue::Str(s) => write!(f, "\"{}\"", escape_ascii(s.as_bytes())),
            TagValue::String(s) => write!(f, "\"{}\"", escape_ascii(s.as_bytes())),
            TagValue::Bool(b) => write!(f, "{b}"),
            TagValue::I64(n) => write!(f, "{n}"),
            TagValue::U64(n) => write!(f, "{n}"),
            TagValue::Null => write!(f, "null"),
        }
    }
}
