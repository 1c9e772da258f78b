use safe_regex::{Matcher2, regex};
use std::fmt::{Display, Formatter};

/// # Panics
/// Panics when `b` is not in `0..=15`.
#[must_use]
pub fn upper_hex_char(b: u8) -> char {
    const TABLE: [char; 16] = [
        '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F',
    ];
    assert!(b < 16, "cannot convert number to hex: {b}");
    TABLE[b as usize]
}

#[must_use]
pub fn from_hex_byte(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(10 + b - b'a'),
        b'A'..=b'F' => Some(10 + b - b'A'),
        _ => None,
    }
}

pub fn percent_decode(bytes: impl AsRef<[u8]>) -> String {
    // https://datatracker.ietf.org/doc/html/rfc3986#section-2.1
    let mut result_bytes: Vec<u8> = Vec::new();
    let bytes = bytes.as_ref();
    let mut n = 0;
    while n < bytes.len() {
        match bytes[n] {
            b'%' if n + 2 < bytes.len() => {
                let opt_d1 = from_hex_byte(bytes[n + 1]);
                let opt_d0 = from_hex_byte(bytes[n + 2]);
                match (opt_d1, opt_d0) {
                    (Some(d1), Some(d0)) => {
                        let b = (d1 << 4) | d0;
                        result_bytes.push(b);
                        n += 2;
                    }
                    _ => result_bytes.push(b'%'),
                }
            }
            c => result_bytes.push(c),
        }
        n += 1;
    }
    String::from_utf8_lossy(&result_bytes).to_string()
}

pub fn percent_encode_path(s: impl AsRef<str>) -> String {
    // https://datatracker.ietf.org/doc/html/rfc3986#section-2.1
    let mut result = String::new();
    for c in s.as_ref().chars() {
        if c.is_ascii_graphic() && c != '#' && c != '?' && c != '%' {
            result.push(c);
        } else {
            let mut buf = [0; 4];
            let c_str = c.encode_utf8(&mut buf);
            for b in c_str.as_bytes() {
                result.push('%');
                result.push(upper_hex_char(*b >> 4));
                result.push(upper_hex_char(*b & 0xf));
            }
        }
    }
    result
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum UrlParseError {
    MalformedUrl,
}

/// An HTTP/1.1 request target in origin form or asterisk form.
///
/// `path` is percent-decoded; `raw_path` and `query` are kept as received.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct Url {
    pub path: String,
    pub raw_path: String,
    pub query: String,
}
impl Url {
    /// Parses `target_bytes` as
    /// [origin-form](https://datatracker.ietf.org/doc/html/rfc7230#section-5.3.1),
    /// `/path?query`, or the asterisk form `*` used by OPTIONS.
    ///
    /// # Errors
    /// Returns an error when it fails to parse `target_bytes`.
    #[allow(clippy::missing_panics_doc)]
    pub fn parse_request_target(target_bytes: impl AsRef<[u8]>) -> Result<Self, UrlParseError> {
        // https://datatracker.ietf.org/doc/html/rfc3986#section-3.3
        // path-abempty  = *( "/" segment )
        // segment       = *pchar
        // pchar         = unreserved / pct-encoded / sub-delims / ":" / "@"
        // query         = *( pchar / "/" / "?" )
        let orig_bytes = target_bytes.as_ref();
        if orig_bytes == b"*" {
            return Ok(Self {
                path: "*".to_string(),
                raw_path: "*".to_string(),
                query: String::new(),
            });
        }
        #[allow(clippy::assign_op_pattern)]
        #[allow(clippy::range_plus_one)]
        let matcher: Matcher2<_> = regex!(
            br"(/[-._~a-zA-Z0-9%!$&'()*+,;=:@/]*)(?:\?([-._~a-zA-Z0-9%!$&'()*+,;=:@/?]*))?"
        );
        let (path_bytes, query_bytes) = matcher
            .match_slices(orig_bytes)
            .ok_or(UrlParseError::MalformedUrl)?;
        let raw_path = std::str::from_utf8(path_bytes).unwrap().to_string();
        let path = percent_decode(raw_path.as_bytes());
        let query = std::str::from_utf8(query_bytes).unwrap().to_string();
        Ok(Self {
            path,
            raw_path,
            query,
        })
    }

    /// The percent-decoded path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The path exactly as the client sent it.
    #[must_use]
    pub fn raw_path(&self) -> &str {
        &self.raw_path
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }
}
impl Display for Url {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", percent_encode_path(&self.path))?;
        if !self.query.is_empty() {
            write!(f, "?{}", self.query)?;
        }
        Ok(())
    }
}
