
use fixed_buffer::FixedBuf;
use hutch::internal::{Head, HeadError, HttpError, read_http_head};
use test_util::{TestServer, assert_starts_with};

fn buf_with(bytes: &[u8]) -> FixedBuf<400> {
    let mut buf: FixedBuf<400> = FixedBuf::new();
    buf.writable()[..bytes.len()].copy_from_slice(bytes);
    buf.wrote(bytes.len());
    buf
}

#[test]
fn try_read_request_line() {
    for (expected, req) in [
        (Err(HeadError::Truncated), "".as_bytes()),
        (Err(HeadError::MalformedRequestLine), b" / HTTP/1.1\r\n\r\n"),
        (Err(HeadError::MalformedRequestLine), b"M  HTTP/1.1\r\n\r\n"),
        (Err(HeadError::MalformedPath), b"M a HTTP/1.1\r\n\r\n"),
        (Err(HeadError::MalformedPath), b"M h://h/ HTTP/1.1\r\n\r\n"),
        (Err(HeadError::UnsupportedProtocol), b"M / HTTP/1.0\r\n\r\n"),
        (Err(HeadError::UnsupportedProtocol), b"M / HTTP/2\r\n\r\n"),
        (Ok(("M", "/")), b"M / HTTP/1.1\r\n\r\n"),
        (Ok(("GET", "/x")), b"GET /x HTTP/1.1\r\n\r\n"),
        (Ok(("M", "*")), b"M * HTTP/1.1\r\n\r\n"),
    ] {
        let mut buf = buf_with(req);
        let result = Head::try_read(&mut buf);
        match expected {
            Ok((method, path)) => {
                let head = result.unwrap_or_else(|e| {
                    panic!(
                        "unexpected {e:?} for request {:?}",
                        String::from_utf8_lossy(req)
                    )
                });
                assert_eq!(head.method, method);
                assert_eq!(head.url.path(), path);
            }
            Err(e) => assert_eq!(result.map(|_| ()).unwrap_err(), e),
        }
    }
}

#[test]
fn try_read_decodes_percent_encoded_paths() {
    let mut buf = buf_with(b"GET /a%20b/c%2Bd HTTP/1.1\r\n\r\n");
    let head = Head::try_read(&mut buf).unwrap();
    assert_eq!(head.url.path(), "/a b/c+d");
    assert_eq!(head.url.raw_path(), "/a%20b/c%2Bd");
}

#[test]
fn try_read_query() {
    let mut buf = buf_with(b"GET /p?a=b&c=d HTTP/1.1\r\n\r\n");
    let head = Head::try_read(&mut buf).unwrap();
    assert_eq!(head.url.path(), "/p");
    assert_eq!(head.url.query(), "a=b&c=d");
}

#[test]
fn try_read_headers() {
    let mut buf = buf_with(
        b"GET / HTTP/1.1\r\nHost: example.com\r\naccept: */*\r\nx-n:  padded value \r\n\r\n",
    );
    let head = Head::try_read(&mut buf).unwrap();
    assert_eq!(
        head.headers.get_only("host").map(|v| v.as_str()),
        Some("example.com")
    );
    assert_eq!(
        head.headers.get_only("ACCEPT").map(|v| v.as_str()),
        Some("*/*")
    );
    assert_eq!(
        head.headers.get_only("x-n").map(|v| v.as_str()),
        Some("padded value")
    );
    assert_eq!(head.headers.get_only("missing"), None);
}

#[test]
fn try_read_malformed_header() {
    let mut buf = buf_with(b"GET / HTTP/1.1\r\nno-colon-here\r\n\r\n");
    assert_eq!(
        Head::try_read(&mut buf).map(|_| ()),
        Err(HeadError::MalformedHeader)
    );
}

#[test]
fn server_rejects_malformed_request_line() {
    let server = TestServer::start_read_only();
    assert_starts_with(
        server.exchange(" / HTTP/1.1\r\n\r\n").unwrap(),
        "HTTP/1.1 400 Bad Request",
    );
}

#[test]
fn server_rejects_unsupported_protocol_version() {
    let server = TestServer::start_read_only();
    assert_starts_with(
        server.exchange("GET / HTTP/1.0\r\n\r\n").unwrap(),
        "HTTP/1.1 505 HTTP Version Not Supported",
    );
}

#[test]
fn server_ignores_empty_connection() {
    let server = TestServer::start_read_only();
    assert_eq!(server.exchange("").unwrap(), "");
}

#[test]
fn oversized_head_is_rejected() {
    let mut buf: FixedBuf<400> = FixedBuf::new();
    let request = format!("GET /{} HTTP/1.1\r\n\r\n", "x".repeat(500));
    let result = read_http_head(&mut buf, request.as_bytes());
    assert_eq!(result.map(|_| ()), Err(HttpError::HeadTooLong));
}
