use crate::BodyReader;
use crate::util::escape_and_elide;
use std::fmt::Debug;
use std::path::PathBuf;

/// The entity of an outgoing response.
///
/// `File` streams a file's bytes at send time without loading them into
/// memory; the recorded length is written as `content-length`.
#[derive(Clone, Eq, PartialEq)]
pub enum ResponseBody {
    StaticStr(&'static str),
    Vec(Vec<u8>),
    File(PathBuf, u64),
}
impl ResponseBody {
    #[must_use]
    pub fn empty() -> Self {
        ResponseBody::StaticStr("")
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        match self {
            ResponseBody::StaticStr(s) => s.len() as u64,
            ResponseBody::Vec(v) => v.len() as u64,
            ResponseBody::File(.., len) => *len,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// # Errors
    /// Returns an error when the body is a file and we fail to open it.
    pub fn reader(&self) -> Result<BodyReader<'_>, std::io::Error> {
        match self {
            ResponseBody::StaticStr(s) => Ok(BodyReader::bytes(s.as_bytes())),
            ResponseBody::Vec(v) => Ok(BodyReader::bytes(v.as_slice())),
            ResponseBody::File(path, ..) => BodyReader::file(path),
        }
    }
}
impl Debug for ResponseBody {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        match self {
            ResponseBody::StaticStr(s) => write!(
                f,
                "ResponseBody::StaticStr(len={} \"{}\")",
                s.len(),
                escape_and_elide(s.as_bytes(), 100),
            ),
            ResponseBody::Vec(v) => write!(
                f,
                "ResponseBody::Vec(len={} [{}])",
                v.len(),
                escape_and_elide(v.as_slice(), 100)
            ),
            ResponseBody::File(path, len) => {
                write!(
                    f,
                    "ResponseBody::File(len={}, path={:?})",
                    len,
                    path.to_string_lossy()
                )
            }
        }
    }
}
impl From<&'static str> for ResponseBody {
    fn from(s: &'static str) -> Self {
        ResponseBody::StaticStr(s)
    }
}
impl From<String> for ResponseBody {
    fn from(s: String) -> Self {
        ResponseBody::Vec(s.into_bytes())
    }
}
impl From<Vec<u8>> for ResponseBody {
    fn from(v: Vec<u8>) -> Self {
        ResponseBody::Vec(v)
    }
}
impl From<&[u8]> for ResponseBody {
    fn from(b: &[u8]) -> Self {
        ResponseBody::Vec(b.to_vec())
    }
}
