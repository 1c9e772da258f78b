use std::fmt::{Display, Formatter};

/// Whether calling the method changes state on the server.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MethodScope {
    CausesSideEffect,
    NoSideEffect,
    Unknown,
}

/// How the method relates to request entities.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum MethodKind {
    Common,
    EntityEncoded,
    Special,
}

/// The closed set of legal HTTP/1.1 method tokens.
///
/// [`Method::scope`] and [`Method::kind`] are descriptive metadata;
/// routing uses only the method identity.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Get,
    Post,
    Put,
    Head,
    Trace,
    Options,
    Delete,
    Connect,
}
impl Method {
    pub const ALL: [Method; 8] = [
        Method::Get,
        Method::Post,
        Method::Put,
        Method::Head,
        Method::Trace,
        Method::Options,
        Method::Delete,
        Method::Connect,
    ];

    /// Looks up a method by its token.  The comparison is case-sensitive,
    /// since method tokens are case-sensitive in HTTP/1.1.
    /// Returns `None` for tokens outside the legal method set.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "GET" => Some(Method::Get),
            "POST" => Some(Method::Post),
            "PUT" => Some(Method::Put),
            "HEAD" => Some(Method::Head),
            "TRACE" => Some(Method::Trace),
            "OPTIONS" => Some(Method::Options),
            "DELETE" => Some(Method::Delete),
            "CONNECT" => Some(Method::Connect),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Head => "HEAD",
            Method::Trace => "TRACE",
            Method::Options => "OPTIONS",
            Method::Delete => "DELETE",
            Method::Connect => "CONNECT",
        }
    }

    #[must_use]
    pub fn scope(&self) -> MethodScope {
        match self {
            Method::Get | Method::Head | Method::Options => MethodScope::NoSideEffect,
            Method::Post | Method::Put | Method::Delete => MethodScope::CausesSideEffect,
            Method::Trace | Method::Connect => MethodScope::Unknown,
        }
    }

    #[must_use]
    pub fn kind(&self) -> MethodKind {
        match self {
            Method::Get => MethodKind::Common,
            Method::Post | Method::Put => MethodKind::EntityEncoded,
            Method::Head | Method::Trace | Method::Options | Method::Delete | Method::Connect => {
                MethodKind::Special
            }
        }
    }
}
impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.as_str())
    }
}
