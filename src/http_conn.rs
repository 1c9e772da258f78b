use crate::accept::{SocketConfig, configure_stream};
use crate::http_error::HttpError;
use crate::log::tag;
use crate::method::Method;
use crate::request::read_http_request;
use crate::response::write_http_response;
use crate::token_set::Token;
use crate::url::from_hex_byte;
use crate::util::WriteCounter;
use crate::{Request, RequestBody, RequestConsumer, Response, log};
use fixed_buffer::FixedBuf;
use permit::Permit;
use std::io::{Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};
use std::panic::{AssertUnwindSafe, catch_unwind};

const MAX_CHUNK_SIZE_LINE_LEN: usize = 256;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ReadState {
    Ready,
    Bytes(u64),
    Chunks,
    Unknown,
    Shutdown,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WriteState {
    None,
    Response,
    Shutdown,
}

/// One accepted connection: the stream, a buffer for request heads, and
/// the receive/send state that keeps request framing intact across
/// pipelined requests.
pub struct HttpConn {
    pub remote_addr: SocketAddr,
    pub buf: FixedBuf<8192>,
    pub stream: TcpStream,
    pub read_state: ReadState,
    pub expect_continue: bool,
    pub write_state: WriteState,
}
impl HttpConn {
    #[must_use]
    pub fn new(remote_addr: SocketAddr, stream: TcpStream) -> Self {
        Self {
            remote_addr,
            buf: FixedBuf::new(),
            stream,
            read_state: ReadState::Ready,
            expect_continue: false,
            write_state: WriteState::None,
        }
    }

    /// True when the connection can receive another request head.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.read_state == ReadState::Ready
    }

    pub fn shutdown(&mut self) {
        self.shutdown_read();
        self.shutdown_write();
    }

    pub fn shutdown_read(&mut self) {
        let _ignored = self.stream.shutdown(Shutdown::Read);
        self.read_state = ReadState::Shutdown;
    }

    pub fn shutdown_write(&mut self) {
        let _ignored = self.stream.shutdown(Shutdown::Write);
        self.write_state = WriteState::Shutdown;
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn shutdown_read_on_err<T, E>(&mut self, result: Result<T, E>) -> Result<T, E> {
        if result.is_err() {
            self.shutdown_read();
        }
        result
    }

    #[allow(clippy::missing_errors_doc)]
    pub fn shutdown_on_err<T, E>(&mut self, result: Result<T, E>) -> Result<T, E> {
        if result.is_err() {
            self.shutdown_read();
            self.shutdown_write();
        }
        result
    }

    /// Receives one request head and records how the body is framed.
    ///
    /// # Errors
    /// Returns an error when:
    /// - we did not send a response to the previous request
    /// - the connection is closed
    /// - we did not read the body of the previous request
    /// - we fail to read or parse the request head
    pub fn read_request(&mut self) -> Result<Request, HttpError> {
        let result = {
            match self.write_state {
                WriteState::None => {}
                WriteState::Response => return Err(HttpError::ResponseNotSent),
                WriteState::Shutdown => return Err(HttpError::Disconnected),
            }
            match self.read_state {
                ReadState::Ready => {}
                ReadState::Bytes(..) | ReadState::Chunks | ReadState::Unknown => {
                    return Err(HttpError::BodyNotRead);
                }
                ReadState::Shutdown => return Err(HttpError::Disconnected),
            }
            self.write_state = WriteState::Response;
            let req = read_http_request(self.remote_addr, &mut self.buf, &mut self.stream)?;
            self.expect_continue = req.expect_continue;
            if req.body.is_pending() {
                // HTTP/1.1 defines three ways to frame a body and rules for
                // deciding which framing to expect:
                // https://datatracker.ietf.org/doc/html/rfc7230#section-3.3
                if req.chunked {
                    self.read_state = ReadState::Chunks;
                } else if let Some(content_length) = &req.content_length {
                    self.read_state = ReadState::Bytes(*content_length);
                } else {
                    self.read_state = ReadState::Unknown;
                }
            } else {
                self.read_state = ReadState::Ready;
            }
            Ok(req)
        };
        self.shutdown_read_on_err(result)
    }

    /// Sends the interim `100 Continue` response when the client asked for
    /// one and it was not sent yet.
    ///
    /// # Errors
    /// Returns an error when the connection is closed or we fail to send.
    pub fn write_http_continue_if_needed(&mut self) -> Result<(), HttpError> {
        match self.write_state {
            WriteState::None => return Err(HttpError::ResponseAlreadySent),
            WriteState::Response => {}
            WriteState::Shutdown => return Err(HttpError::Disconnected),
        }
        let result = {
            if self.expect_continue {
                self.stream
                    .write_all(b"HTTP/1.1 100 Continue\r\n\r\n")
                    .map_err(|_| HttpError::Disconnected)?;
                self.expect_continue = false;
            }
            Ok(())
        };
        self.shutdown_on_err(result)
    }

    #[must_use]
    pub fn has_body(&self) -> bool {
        match self.read_state {
            ReadState::Ready | ReadState::Shutdown => false,
            ReadState::Bytes(..) | ReadState::Chunks | ReadState::Unknown => true,
        }
    }

    fn fill_buf(&mut self) -> Result<(), HttpError> {
        if self.buf.is_empty() {
            self.buf.shift();
            match self.stream.read(self.buf.writable()) {
                Err(..) | Ok(0) => return Err(HttpError::Truncated),
                Ok(n) => self.buf.wrote(n),
            }
        }
        Ok(())
    }

    fn next_body_byte(&mut self) -> Result<u8, HttpError> {
        self.fill_buf()?;
        Ok(self.buf.try_read_exact(1).unwrap()[0])
    }

    /// Appends exactly `len` body bytes to `dest`, taking buffered bytes
    /// first and reading the stream for the rest.
    fn read_body_exact(&mut self, dest: &mut Vec<u8>, len: usize) -> Result<(), HttpError> {
        let from_buf = self.buf.readable().len().min(len);
        if from_buf > 0 {
            dest.extend_from_slice(self.buf.try_read_exact(from_buf).unwrap());
        }
        let mut remaining = len - from_buf;
        let mut chunk = [0_u8; 65536];
        while remaining > 0 {
            let want = remaining.min(chunk.len());
            match self.stream.read(&mut chunk[..want]) {
                Err(..) | Ok(0) => return Err(HttpError::Truncated),
                Ok(n) => {
                    dest.extend_from_slice(&chunk[..n]);
                    remaining -= n;
                }
            }
        }
        Ok(())
    }

    /// Reads one line, stripping the trailing CRLF.
    fn read_crlf_line(&mut self) -> Result<Vec<u8>, HttpError> {
        let mut line = Vec::new();
        loop {
            match self.next_body_byte()? {
                b'\n' => {
                    if line.last() == Some(&b'\r') {
                        line.pop();
                    }
                    return Ok(line);
                }
                b => line.push(b),
            }
            if line.len() > MAX_CHUNK_SIZE_LINE_LEN {
                return Err(HttpError::InvalidChunk);
            }
        }
    }

    fn read_chunked_body(&mut self, max_len: u64) -> Result<Vec<u8>, HttpError> {
        // https://datatracker.ietf.org/doc/html/rfc7230#section-4.1
        //     chunked-body   = *chunk
        //                      last-chunk
        //                      trailer-part
        //                      CRLF
        //     chunk          = chunk-size [ chunk-ext ] CRLF
        //                      chunk-data CRLF
        //     chunk-size     = 1*HEXDIG
        let mut body = Vec::new();
        loop {
            let line = self.read_crlf_line()?;
            let chunk_size = parse_chunk_size(&line)?;
            if chunk_size == 0 {
                break;
            }
            if body.len() as u64 + chunk_size > max_len {
                return Err(HttpError::BodyTooLong);
            }
            let chunk_size =
                usize::try_from(chunk_size).map_err(|_| HttpError::InvalidChunk)?;
            self.read_body_exact(&mut body, chunk_size)?;
            if !self.read_crlf_line()?.is_empty() {
                return Err(HttpError::InvalidChunk);
            }
        }
        // Discard the trailer-part.
        loop {
            if self.read_crlf_line()?.is_empty() {
                break;
            }
        }
        Ok(body)
    }

    /// Receives the request body in full, first sending `100 Continue`
    /// when the client asked for one.  The body is always consumed, even
    /// when the dispatched consumer does not want it, so the next
    /// pipelined request stays correctly framed.
    ///
    /// # Errors
    /// Returns an error when:
    /// - the body is longer than `max_len`
    /// - the connection is closed
    /// - the chunked framing is malformed
    /// - we fail to read the body
    pub fn read_body_to_vec(&mut self, max_len: u64) -> Result<RequestBody, HttpError> {
        let result = {
            match self.read_state.clone() {
                ReadState::Ready => return Ok(RequestBody::empty()),
                ReadState::Bytes(len_u64) => {
                    if len_u64 > max_len {
                        return Err(HttpError::BodyTooLong);
                    }
                    let len_usize =
                        usize::try_from(len_u64).map_err(|_| HttpError::InvalidContentLength)?;
                    self.write_http_continue_if_needed()?;
                    self.read_state = ReadState::Ready;
                    let mut body = Vec::with_capacity(len_usize);
                    self.read_body_exact(&mut body, len_usize)?;
                    Ok(RequestBody::Vec(body))
                }
                ReadState::Chunks => {
                    self.write_http_continue_if_needed()?;
                    // The zero chunk delimits the body, so the connection
                    // can keep pipelining afterwards.
                    let body = self.read_chunked_body(max_len)?;
                    self.read_state = ReadState::Ready;
                    Ok(RequestBody::Vec(body))
                }
                ReadState::Unknown => {
                    self.write_http_continue_if_needed()?;
                    // Reading until EOF leaves nothing for a next request.
                    self.read_state = ReadState::Shutdown;
                    let mut body = Vec::new();
                    let buffered = self.buf.readable().len();
                    if buffered > 0 {
                        body.extend_from_slice(self.buf.try_read_exact(buffered).unwrap());
                    }
                    if body.len() as u64 > max_len {
                        return Err(HttpError::BodyTooLong);
                    }
                    let mut limited = (&mut self.stream).take(max_len + 1 - body.len() as u64);
                    limited
                        .read_to_end(&mut body)
                        .map_err(|_| HttpError::Truncated)?;
                    if body.len() as u64 > max_len {
                        return Err(HttpError::BodyTooLong);
                    }
                    Ok(RequestBody::Vec(body))
                }
                ReadState::Shutdown => Err(HttpError::Disconnected),
            }
        };
        self.shutdown_read_on_err(result)
    }

    /// Sends `response` over the connection.
    ///
    /// # Errors
    /// Returns an error when a response was already sent, the connection
    /// is closed, or we fail to send the response bytes.  Any failure here
    /// is connection-fatal; the caller must close, never retry.
    pub fn write_response(
        &mut self,
        response: &Response,
        opt_method: Option<Method>,
    ) -> Result<(), HttpError> {
        match self.write_state {
            WriteState::None => return Err(HttpError::ResponseAlreadySent),
            WriteState::Response => {}
            WriteState::Shutdown => return Err(HttpError::Disconnected),
        }
        let mut write_counter = WriteCounter::new(&mut self.stream);
        match write_http_response(&mut write_counter, response, opt_method) {
            Ok(()) => {
                self.write_state = WriteState::None;
                Ok(())
            }
            Err(e) => {
                if write_counter.num_bytes_written() > 0 {
                    self.shutdown_write();
                }
                Err(e)
            }
        }
    }
}

fn parse_chunk_size(line: &[u8]) -> Result<u64, HttpError> {
    let digits = line
        .split(|b| *b == b';')
        .next()
        .ok_or(HttpError::InvalidChunk)?;
    let digits = digits
        .iter()
        .copied()
        .take_while(|b| !b.is_ascii_whitespace())
        .collect::<Vec<u8>>();
    if digits.is_empty() || digits.len() > 8 {
        return Err(HttpError::InvalidChunk);
    }
    let mut size: u64 = 0;
    for b in digits {
        let digit = from_hex_byte(b).ok_or(HttpError::InvalidChunk)?;
        size = (size << 4) | u64::from(digit);
    }
    Ok(size)
}

/// Receives one request, dispatches it, and sends the response.
///
/// An unexpected panic inside the dispatched consumer is converted to a
/// `500` here; plugin logic must never take the connection down with it.
///
/// # Errors
/// Returns an error when:
/// - we fail to receive or parse the request
/// - the request body is too long
/// - we fail to send the response
pub fn handle_connection_once(
    conn: &mut HttpConn,
    max_body_len: u64,
    consumer: &dyn RequestConsumer,
) -> Result<(), HttpError> {
    let mut req = conn.read_request()?;
    if req.body.is_pending() {
        req.body = conn.read_body_to_vec(max_body_len)?;
    }
    let mut response = Response::new(200);
    if catch_unwind(AssertUnwindSafe(|| consumer.consume(&req, &mut response))).is_err() {
        log::error(
            "consumer panicked",
            (
                tag("method", req.method.clone()),
                tag("path", req.url.path().to_string()),
            ),
        );
        response = Response::text(500, "Internal server error");
    }
    conn.write_response(&response, Method::from_token(req.method()))
}

/// Owns the lifecycle of one accepted connection: configures the socket,
/// then receives request/response pairs until the connection is no longer
/// usable or the permit is revoked.
pub fn handle_connection(
    permit: &Permit,
    _token: Token,
    stream: TcpStream,
    remote_addr: SocketAddr,
    config: &SocketConfig,
    max_body_len: u64,
    consumer: &dyn RequestConsumer,
) {
    if let Err(e) = configure_stream(config, &stream) {
        log::error(
            "failed configuring accepted socket",
            (
                tag("remote_addr", remote_addr.to_string()),
                tag("err", e.to_string()),
            ),
        );
        return;
    }
    let mut conn = HttpConn::new(remote_addr, stream);
    while !permit.is_revoked() {
        if !conn.is_ready() {
            // The previous request left unread body bytes.
            break;
        }
        match handle_connection_once(&mut conn, max_body_len, consumer) {
            Ok(()) => {}
            Err(HttpError::Disconnected) => break,
            Err(e) => {
                if e.is_server_error() {
                    log::error(
                        "error handling request",
                        (
                            tag("remote_addr", remote_addr.to_string()),
                            tag("err", e.description()),
                        ),
                    );
                }
                // The stream may be desynchronized, so send the error
                // response and let the connection close.
                let _ignored = conn.write_response(&e.into(), None);
                break;
            }
        }
    }
    // Best-effort flush and close; failures here are logged, never escalated.
    if let Err(e) = (&conn.stream).flush() {
        log::debug(
            "error flushing connection",
            (tag("remote_addr", remote_addr.to_string()), tag("err", e.to_string())),
        );
    }
    conn.shutdown();
}
