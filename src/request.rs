use crate::head::read_http_head;
use crate::http_error::HttpError;
use crate::url::Url;
use crate::{ContentType, HeaderList, RequestBody};
use fixed_buffer::FixedBuf;
use std::fmt::Debug;
use std::io::Read;
use std::net::SocketAddr;

/// An immutable view of one received request.
///
/// The connection owns the request for the duration of one
/// request/response cycle; consumers borrow it.
#[derive(Clone, Eq, PartialEq)]
pub struct Request {
    pub remote_addr: SocketAddr,
    pub method: String,
    pub url: Url,
    pub headers: HeaderList,
    pub content_type: ContentType,
    pub expect_continue: bool,
    pub chunked: bool,
    pub content_length: Option<u64>,
    pub body: RequestBody,
}
impl Request {
    #[must_use]
    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    #[must_use]
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// The request method token, which may be outside the legal HTTP
    /// method set.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the value of the named header, using a case-insensitive
    /// comparison.  Returns `None` when no header matched or multiple did.
    #[must_use]
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers.get_only(name).map(|value| value.as_str())
    }

    /// True when the request carries an entity body, per
    /// [RFC 7230 section 3.3](https://datatracker.ietf.org/doc/html/rfc7230#section-3.3).
    #[must_use]
    pub fn is_entity_enclosing(&self) -> bool {
        self.chunked || matches!(self.content_length, Some(n) if n > 0) || self.body.is_pending()
    }
}
impl Debug for Request {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        write!(
            f,
            "Request{{{}, {}, {:?}, headers={:?}, {:?}{}{}{}, {:?}}}",
            self.remote_addr,
            self.method(),
            self.url.path(),
            self.headers,
            self.content_type,
            if self.expect_continue { ", expect" } else { "" },
            if self.chunked { ", chunked" } else { "" },
            if let Some(len) = &self.content_length {
                format!(", {len}")
            } else {
                String::new()
            },
            self.body
        )
    }
}

/// Reads and parses one request head, then decides the body framing per
/// [RFC 7230 section 3.3](https://datatracker.ietf.org/doc/html/rfc7230#section-3.3).
///
/// # Errors
/// Returns an error when:
/// - the connection is closed
/// - we fail to read a full request head
/// - we fail to parse the request head
/// - the request uses an unsupported transfer encoding
/// - the request content-length does not parse
#[allow(clippy::module_name_repetitions)]
pub fn read_http_request<const BUF_SIZE: usize>(
    remote_addr: SocketAddr,
    buf: &mut FixedBuf<BUF_SIZE>,
    reader: impl Read,
) -> Result<Request, HttpError> {
    buf.shift();
    let head = read_http_head(buf, reader)?;
    let content_type = head
        .headers
        .get_only("content-type")
        .map_or(ContentType::None, |s| ContentType::parse(s));
    let expect_continue = head
        .headers
        .get_only("expect")
        .is_some_and(|s| s.eq_ignore_ascii_case("100-continue"));
    let transfer_encoding = head
        .headers
        .get_only("transfer-encoding")
        .map(|s| s.as_str().to_ascii_lowercase())
        .unwrap_or_default();
    let mut chunked = false;
    for encoding in transfer_encoding
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        if encoding == "chunked" {
            chunked = true;
        } else {
            return Err(HttpError::UnsupportedTransferEncoding);
        }
    }
    let content_length = if let Some(s) = head.headers.get_only("content-length") {
        Some(
            s.as_str()
                .parse()
                .map_err(|_| HttpError::InvalidContentLength)?,
        )
    } else {
        None
    };
    #[allow(clippy::match_same_arms)]
    // https://datatracker.ietf.org/doc/html/rfc7230#section-3.3
    let body = match (chunked, &content_length, head.method.as_str()) {
        (true, _, _) => RequestBody::PendingUnknown,
        (false, Some(0), _) => RequestBody::empty(),
        (false, Some(len), _) => RequestBody::PendingKnown(*len),
        (false, None, "POST" | "PUT") => RequestBody::PendingUnknown,
        (false, None, _) if expect_continue => RequestBody::PendingUnknown,
        (false, None, _) => RequestBody::empty(),
    };
    Ok(Request {
        remote_addr,
        method: head.method,
        url: head.url,
        headers: head.headers,
        content_type,
        expect_continue,
        chunked,
        content_length,
        body,
    })
}
