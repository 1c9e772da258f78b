use crate::http_error::HttpError;
use crate::method::Method;
use crate::util::{CopyResult, copy};
use crate::{AsciiString, ContentType, ResponseBody};
use std::fmt::Debug;
use std::io::{Read, Write};

/// One response under construction.
///
/// Exactly one consumer builds the response for a request; the connection
/// owns it until it is handed to [`write_http_response`].
#[derive(Clone, Eq, PartialEq)]
pub struct Response {
    pub code: u16,
    pub reason: Option<&'static str>,
    pub content_type: ContentType,
    pub headers: Vec<(AsciiString, AsciiString)>,
    pub body: ResponseBody,
}
impl Response {
    #[must_use]
    pub fn new(code: u16) -> Self {
        Self {
            code,
            reason: None,
            content_type: ContentType::None,
            headers: Vec::new(),
            body: ResponseBody::empty(),
        }
    }

    #[must_use]
    pub fn text(code: u16, body: impl Into<ResponseBody>) -> Self {
        Response::new(code)
            .with_type(ContentType::PlainText)
            .with_body(body)
    }

    #[must_use]
    pub fn html(code: u16, body: impl Into<ResponseBody>) -> Self {
        Response::new(code)
            .with_type(ContentType::Html)
            .with_body(body)
    }

    #[must_use]
    pub fn code(&self) -> u16 {
        self.code
    }

    /// The reason phrase that will appear in the status line.
    #[must_use]
    pub fn reason_phrase(&self) -> &'static str {
        self.reason.unwrap_or_else(|| reason_phrase(self.code))
    }

    #[must_use]
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    #[must_use]
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    pub fn set_code(&mut self, code: u16) {
        self.code = code;
    }

    /// Overrides the canonical reason phrase for the status line.
    pub fn set_reason(&mut self, reason: &'static str) {
        self.reason = Some(reason);
    }

    pub fn set_content_type(&mut self, content_type: ContentType) {
        self.content_type = content_type;
    }

    pub fn set_body(&mut self, body: impl Into<ResponseBody>) {
        self.body = body.into();
    }

    /// Adds a header.
    ///
    /// You can call this multiple times to add multiple headers with the same name.
    ///
    /// The [HTTP spec](https://datatracker.ietf.org/doc/html/rfc7230#section-3.2.4)
    /// limits header names to US-ASCII and header values to US-ASCII or ISO-8859-1.
    ///
    /// # Panics
    /// Panics when `name` is not US-ASCII.
    pub fn add_header(&mut self, name: impl AsRef<str>, value: AsciiString) {
        self.headers
            .push((name.as_ref().try_into().unwrap(), value));
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<ResponseBody>) -> Self {
        self.set_body(body);
        self
    }

    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: AsciiString) -> Self {
        self.add_header(name, value);
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: &'static str) -> Self {
        self.set_reason(reason);
        self
    }

    #[must_use]
    pub fn with_status(mut self, code: u16) -> Self {
        self.set_code(code);
        self
    }

    #[must_use]
    pub fn with_type(mut self, content_type: ContentType) -> Self {
        self.set_content_type(content_type);
        self
    }

    #[must_use]
    pub fn is_1xx(&self) -> bool {
        self.code / 100 == 1
    }

    #[must_use]
    pub fn is_2xx(&self) -> bool {
        self.code / 100 == 2
    }

    #[must_use]
    pub fn is_4xx(&self) -> bool {
        self.code / 100 == 4
    }

    #[must_use]
    pub fn is_5xx(&self) -> bool {
        self.code / 100 == 5
    }
}
impl Debug for Response {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        let mut headers: Vec<String> = self
            .headers
            .iter()
            .map(|(n, v)| format!("{n}: {v:?}"))
            .collect();
        headers.sort();
        write!(
            f,
            "Response({} {}, {:?}, headers={{{}}}, {:?})",
            self.code,
            self.reason_phrase(),
            self.content_type,
            headers.join(", "),
            self.body
        )
    }
}
impl From<std::io::Error> for Response {
    fn from(e: std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::InvalidData => Response::text(400, "Bad request"),
            _ => Response::text(500, "Internal server error"),
        }
    }
}

#[must_use]
pub fn reason_phrase(code: u16) -> &'static str {
    // https://developer.mozilla.org/en-US/docs/Web/HTTP/Status
    match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Payload Too Large",
        414 => "URI Too Long",
        415 => "Unsupported Media Type",
        417 => "Expectation Failed",
        421 => "Misdirected Request",
        426 => "Upgrade Required",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => "Response",
    }
}

/// True when HTTP/1.1 permits an entity body for this response.
///
/// A body is prohibited when the request method was HEAD, the status is
/// informational (1xx), or the status is 204, 205, or 304, regardless of
/// what the consumer set.
#[must_use]
fn may_send_body(code: u16, opt_method: Option<Method>) -> bool {
    opt_method != Some(Method::Head) && code >= 200 && code != 204 && code != 205 && code != 304
}

/// Writes the status line, headers, and (when the protocol permits one)
/// the entity body, then flushes.
///
/// # Errors
/// Any error from this function means the connection is unusable; callers
/// must close it rather than retry.
/// Returns an error when:
/// - we fail to send bytes on the connection
/// - the response body is a file and we fail to open or read it
#[allow(clippy::module_name_repetitions)]
pub fn write_http_response(
    mut writer: impl Write,
    response: &Response,
    opt_method: Option<Method>,
) -> Result<(), HttpError> {
    // https://datatracker.ietf.org/doc/html/rfc7230#section-3.1.2
    //     status-line = HTTP-version SP status-code SP reason-phrase CRLF
    //     status-code    = 3DIGIT
    //     reason-phrase  = *( HTAB / SP / VCHAR )
    let mut head_bytes: Vec<u8> =
        format!("HTTP/1.1 {} {}\r\n", response.code, response.reason_phrase()).into_bytes();
    if response.content_type != ContentType::None {
        write!(
            head_bytes,
            "content-type: {}\r\n",
            response.content_type.as_str()
        )
        .unwrap();
    }
    let body_allowed = may_send_body(response.code, opt_method);
    let is_head = opt_method == Some(Method::Head);
    let body_len = response.body.len();
    if body_allowed || is_head {
        write!(head_bytes, "content-length: {body_len}\r\n").unwrap();
    }
    for (name, value) in &response.headers {
        // Convert headers from UTF-8 back to ISO-8859-1, with 0xFF for a
        // replacement byte.
        write!(head_bytes, "{name}: ").unwrap();
        head_bytes.extend(value.chars().map(|c| u8::try_from(c).unwrap_or(255)));
        head_bytes.extend(b"\r\n");
    }
    head_bytes.extend(b"\r\n");
    writer
        .write_all(head_bytes.as_slice())
        .map_err(|_| HttpError::Disconnected)?;
    drop(head_bytes);
    if body_allowed && body_len > 0 {
        let reader = response
            .body
            .reader()
            .map_err(HttpError::error_reading_file)?
            .take(body_len);
        match copy(reader, &mut writer) {
            CopyResult::Ok(len) if len == body_len => {}
            CopyResult::Ok(_len) => {
                return Err(HttpError::ErrorReadingFile(
                    std::io::ErrorKind::UnexpectedEof,
                    "body file is smaller than expected".to_string(),
                ));
            }
            CopyResult::ReaderErr(e) => return Err(HttpError::error_reading_file(e)),
            CopyResult::WriterErr(..) => return Err(HttpError::Disconnected),
        }
    }
    writer.flush().map_err(|_| HttpError::Disconnected)
}
