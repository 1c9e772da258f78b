//! Hutch
//! =====
//! An embeddable, pluggable HTTP/1.1 server core in Rust, with a
//! filesystem content plugin.
//!
//! # Features
//! - `forbid(unsafe_code)`
//! - Blocking I/O: one dedicated accept thread, one thread per
//!   connection, bounded by a configured connection limit
//! - Pluggable request consumers selected by HTTP method:
//!   `consume(&Request, &mut Response)`
//! - Pipelined requests, `Expect: 100-continue`, chunked request bodies
//! - A stoppable listener: `stop()` halts new acceptance and lets
//!   in-flight requests finish
//! - Socket configuration: backlog, buffer sizes, keep-alive, TCP_NODELAY,
//!   receive timeout, address reuse
//! - A file-server plugin with read-only or read-write modes and a
//!   pluggable directory policy
//! - Modular: roll your own logging, build your own plugin out of the
//!   internal parts
//!
//! # Limitations
//! - HTTP/1.1 only; no TLS, no HTTP/2
//! - Request bodies are held in memory, bounded by
//!   [`HttpServerBuilder::max_body_len`]
//! - No request timeouts beyond the socket receive timeout
//!
//! # Example
//! ```no_run
//! use hutch::fileserv::{DirectoryPolicy, FileServerBuilder, FileServerMode};
//! use hutch::{HttpServerBuilder, SocketConfig, socket_addr_127_0_0_1};
//! use std::time::Duration;
//!
//! let plugin = FileServerBuilder::new("/var/www")
//!     .mode(FileServerMode::ReadAndWrite)
//!     .directory_policy(DirectoryPolicy::ServeIndexFile("index.html".to_string()))
//!     .build()
//!     .unwrap();
//! let mut server = HttpServerBuilder::new()
//!     .socket_config(SocketConfig::new().with_listen_addr(socket_addr_127_0_0_1(8000)))
//!     .max_conns(100)
//!     .start(plugin)
//!     .unwrap();
//! println!("listening on {}", server.addr());
//! // ... later:
//! server.stop(Duration::from_secs(10));
//! ```
#![forbid(unsafe_code)]
mod accept;
mod ascii_string;
mod body_reader;
mod content_type;
mod dispatch;
mod executors;
mod head;
mod headers;
mod http_conn;
mod http_error;
mod listener;
mod method;
mod request;
mod request_body;
mod response;
mod response_body;
mod time;
mod token_set;
mod url;
mod util;

pub mod fileserv;
pub mod log;

pub use crate::accept::{
    AddrReusePolicy, KeepAliveMode, SmallPacketsPolicy, SocketConfig, socket_addr_127_0_0_1,
    socket_addr_127_0_0_1_any_port, socket_addr_all_interfaces,
};
pub use crate::ascii_string::AsciiString;
pub use crate::body_reader::BodyReader;
pub use crate::content_type::ContentType;
pub use crate::dispatch::{ConsumerSelector, RequestDispatcher};
pub use crate::headers::{Header, HeaderList};
pub use crate::http_conn::HttpConn;
pub use crate::http_error::HttpError;
pub use crate::listener::{ConnectionListener, ListenerState};
pub use crate::method::{Method, MethodKind, MethodScope};
pub use crate::request::Request;
pub use crate::request_body::RequestBody;
pub use crate::response::Response;
pub use crate::response_body::ResponseBody;

/// This part of the library is not covered by the semver guarantees.
/// If you use these in your program, a minor version upgrade could break
/// your build.
pub mod internal {
    pub use crate::accept::*;
    pub use crate::body_reader::*;
    pub use crate::executors::*;
    pub use crate::head::*;
    pub use crate::http_conn::*;
    pub use crate::http_error::*;
    pub use crate::request::*;
    pub use crate::response::*;
    pub use crate::time::*;
    pub use crate::token_set::*;
    pub use crate::url::*;
    pub use crate::util::*;
}

use crate::accept::bind_listener;
use crate::executors::{ConnectionExecutor, ListenerExecutor};
use crate::log::tag;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// A unit of logic receiving a request/response pair and deciding the
/// outcome.
///
/// The server invokes `consume` once per request, concurrently across
/// connections, so implementations hold no mutable instance state.
pub trait RequestConsumer: Send + Sync {
    fn consume(&self, request: &Request, response: &mut Response);
}

/// Builds an HTTP server.
pub struct HttpServerBuilder {
    socket_config: SocketConfig,
    max_conns: usize,
    max_body_len: u64,
}
impl HttpServerBuilder {
    /// Makes a new builder with these default settings:
    /// - Listens on 127.0.0.1
    /// - Picks a random port
    /// - 100 max connections
    /// - 64 KiB max request body length
    #[allow(clippy::new_without_default)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            socket_config: SocketConfig::new(),
            max_conns: 100,
            max_body_len: 64 * 1024,
        }
    }

    #[must_use]
    pub fn socket_config(mut self, config: SocketConfig) -> Self {
        self.socket_config = config;
        self
    }

    #[must_use]
    pub fn listen_addr(mut self, addr: SocketAddr) -> Self {
        self.socket_config.listen_addr = addr;
        self
    }

    /// Sets the maximum number of connections to handle at one time.
    ///
    /// When the server is handling the maximum number of connections,
    /// it waits for a connection to drop before accepting new ones.
    ///
    /// Each connection uses a thread and a file handle.
    ///
    /// # Panics
    /// Panics when `n` is zero.
    #[must_use]
    pub fn max_conns(mut self, n: usize) -> Self {
        assert!(n > 0, "refusing to set max_conns to zero");
        self.max_conns = n;
        self
    }

    /// Sets the maximum request body size the server receives into
    /// memory.  Requests with larger bodies get `413 Payload Too Large`.
    ///
    /// You can estimate the server memory usage with:
    /// `max_body_len * max_conns`.
    #[must_use]
    pub fn max_body_len(mut self, n: u64) -> Self {
        self.max_body_len = n;
        self
    }

    /// Binds the listening socket and starts the accept loop on a
    /// dedicated thread.  Every request goes to `consumer`.
    ///
    /// # Errors
    /// Returns an error when we fail to bind the socket or spawn the
    /// listener thread.
    pub fn start(self, consumer: Arc<dyn RequestConsumer>) -> Result<HttpServer, std::io::Error> {
        let socket = bind_listener(&self.socket_config)?;
        let addr = socket.local_addr()?;
        let listener = Arc::new(ConnectionListener::new(
            ConnectionExecutor::new(self.max_conns),
            self.socket_config,
            self.max_body_len,
            consumer,
        ));
        let mut listener_executor = ListenerExecutor::new();
        listener_executor.execute(listener.clone(), socket)?;
        log::info("listening", (tag("addr", addr.to_string()),));
        Ok(HttpServer {
            addr,
            listener,
            listener_executor,
        })
    }
}

/// A running server: the bound address, the listener state machine, and
/// the thread driving its accept loop.
pub struct HttpServer {
    addr: SocketAddr,
    listener: Arc<ConnectionListener>,
    listener_executor: ListenerExecutor,
}
impl HttpServer {
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    #[must_use]
    pub fn listener(&self) -> &Arc<ConnectionListener> {
        &self.listener
    }

    /// Stops accepting connections and waits up to `timeout` for the
    /// accept loop to exit and the connection pool to drain.  In-flight
    /// requests are not interrupted; they run to completion.
    ///
    /// Returns `true` when the listener terminated within the timeout.
    pub fn stop(&mut self, timeout: Duration) -> bool {
        self.listener.stop();
        self.listener_executor.wait_for_termination(timeout)
    }
}
