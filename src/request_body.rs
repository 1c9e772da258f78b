use crate::BodyReader;
use crate::util::escape_and_elide;
use std::fmt::Debug;
use std::io::ErrorKind;

/// The body of an incoming request.
///
/// The connection receives the body in full before dispatching the
/// request, so consumers see either [`RequestBody::Vec`] or one of the
/// pending variants for a body that was not read (for example a body
/// larger than the configured limit).
#[derive(Clone, Eq, PartialEq)]
pub enum RequestBody {
    PendingKnown(u64),
    PendingUnknown,
    Vec(Vec<u8>),
}
impl RequestBody {
    #[must_use]
    pub fn empty() -> Self {
        RequestBody::Vec(Vec::new())
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        match self {
            RequestBody::PendingKnown(..) | RequestBody::PendingUnknown => true,
            RequestBody::Vec(..) => false,
        }
    }

    /// The number of bytes received, or the expected length of a pending
    /// body when the client declared one.
    #[must_use]
    pub fn len(&self) -> u64 {
        match self {
            RequestBody::PendingKnown(len) => *len,
            RequestBody::PendingUnknown => 0,
            RequestBody::Vec(v) => v.len() as u64,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// # Errors
    /// Returns an error when the body is pending and therefore unreadable.
    pub fn reader(&self) -> Result<BodyReader<'_>, std::io::Error> {
        match self {
            RequestBody::PendingKnown(..) | RequestBody::PendingUnknown => Err(
                std::io::Error::new(ErrorKind::InvalidInput, "the request body was not received"),
            ),
            RequestBody::Vec(v) => Ok(BodyReader::bytes(v.as_slice())),
        }
    }

    /// # Errors
    /// Returns an error when the body is pending and therefore unreadable.
    pub fn as_bytes(&self) -> Result<&[u8], std::io::Error> {
        match self {
            RequestBody::PendingKnown(..) | RequestBody::PendingUnknown => Err(
                std::io::Error::new(ErrorKind::InvalidInput, "the request body was not received"),
            ),
            RequestBody::Vec(v) => Ok(v.as_slice()),
        }
    }
}
impl Debug for RequestBody {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        match self {
            RequestBody::PendingKnown(len) => write!(f, "RequestBody::PendingKnown({len})"),
            RequestBody::PendingUnknown => write!(f, "RequestBody::PendingUnknown"),
            RequestBody::Vec(v) => write!(
                f,
                "RequestBody::Vec(len={} [{}])",
                v.len(),
                escape_and_elide(v.as_slice(), 100)
            ),
        }
    }
}
impl From<Vec<u8>> for RequestBody {
    fn from(v: Vec<u8>) -> Self {
        RequestBody::Vec(v)
    }
}
impl From<&[u8]> for RequestBody {
    fn from(b: &[u8]) -> Self {
        RequestBody::Vec(b.to_vec())
    }
}
