use crate::util::escape_and_elide;
use core::borrow::Borrow;
use core::fmt::{Display, Formatter};
use std::ops::Deref;

/// Wraps a [`String`] that contains only US-ASCII chars.
///
/// Implements [`Deref`] so you can access the internal string directly.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct AsciiString(String);
impl AsciiString {
    #[must_use]
    pub fn new() -> Self {
        Self(String::new())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}
impl AsRef<[u8]> for AsciiString {
    fn as_ref(&self) -> &[u8] {
        self.0.as_bytes()
    }
}
impl AsRef<str> for AsciiString {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
impl Borrow<str> for AsciiString {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}
impl Default for AsciiString {
    fn default() -> Self {
        Self::new()
    }
}
impl Deref for AsciiString {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl Display for AsciiString {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), core::fmt::Error> {
        write!(f, "{}", self.0)
    }
}
impl From<AsciiString> for String {
    fn from(ascii_string: AsciiString) -> Self {
        ascii_string.0
    }
}
impl TryFrom<&str> for AsciiString {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::try_from(s.to_string())
    }
}
impl TryFrom<String> for AsciiString {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.is_ascii() {
            Ok(Self(s))
        } else {
            Err(format!(
                "string is not US-ASCII: \"{}\"",
                escape_and_elide(s.as_bytes(), 100)
            ))
        }
    }
}
impl From<u16> for AsciiString {
    fn from(n: u16) -> Self {
        Self(n.to_string())
    }
}
impl From<u64> for AsciiString {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}
impl From<usize> for AsciiString {
    fn from(n: usize) -> Self {
        Self(n.to_string())
    }
}
