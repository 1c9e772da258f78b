use socket2::{Domain, Protocol, SockRef, Socket, Type};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

/// How often the accept loop wakes up to observe a stop request.
pub const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[must_use]
pub fn socket_addr_127_0_0_1_any_port() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0)
}

#[must_use]
pub fn socket_addr_127_0_0_1(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
}

#[must_use]
pub fn socket_addr_all_interfaces(port: u16) -> SocketAddr {
    SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), port)
}

/// Whether to ask the OS to probe idle connections with keep-alive packets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum KeepAliveMode {
    SendKeepAlivePackets,
    NoKeepAlivePackets,
}

/// Whether small writes are sent immediately (`TCP_NODELAY`) or coalesced.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SmallPacketsPolicy {
    SendImmediately,
    Coalesce,
}

/// Whether the listening address and port may be rebound while old
/// connections linger, risking delivery of stale packets.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AddrReusePolicy {
    Reuse,
    NoReuse,
}

/// Validated network configuration for the listening socket and for every
/// accepted connection.
///
/// Defaults: loopback address with an OS-assigned port, accept backlog of
/// 1024, and OS defaults for everything else.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SocketConfig {
    pub listen_addr: SocketAddr,
    pub backlog: u32,
    pub recv_buffer_size: Option<usize>,
    pub send_buffer_size: Option<usize>,
    pub keep_alive: Option<KeepAliveMode>,
    pub small_packets: Option<SmallPacketsPolicy>,
    pub read_timeout: Option<Duration>,
    pub addr_reuse: Option<AddrReusePolicy>,
}
impl SocketConfig {
    #[allow(clippy::new_without_default)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            listen_addr: socket_addr_127_0_0_1_any_port(),
            backlog: 1024,
            recv_buffer_size: None,
            send_buffer_size: None,
            keep_alive: None,
            small_packets: None,
            read_timeout: None,
            addr_reuse: None,
        }
    }

    #[must_use]
    pub fn with_listen_addr(mut self, addr: SocketAddr) -> Self {
        self.listen_addr = addr;
        self
    }

    /// Sets the length of the queue of connections the OS accepts on our
    /// behalf before we get to them.
    ///
    /// # Panics
    /// Panics when `n` is zero.
    #[must_use]
    pub fn with_backlog(mut self, n: u32) -> Self {
        assert!(n > 0, "refusing to set backlog to zero");
        self.backlog = n;
        self
    }

    /// # Panics
    /// Panics when `n` is zero.
    #[must_use]
    pub fn with_recv_buffer_size(mut self, n: usize) -> Self {
        assert!(n > 0, "refusing to set recv buffer size to zero");
        self.recv_buffer_size = Some(n);
        self
    }

    /// # Panics
    /// Panics when `n` is zero.
    #[must_use]
    pub fn with_send_buffer_size(mut self, n: usize) -> Self {
        assert!(n > 0, "refusing to set send buffer size to zero");
        self.send_buffer_size = Some(n);
        self
    }

    #[must_use]
    pub fn with_keep_alive(mut self, mode: KeepAliveMode) -> Self {
        self.keep_alive = Some(mode);
        self
    }

    #[must_use]
    pub fn with_small_packets(mut self, policy: SmallPacketsPolicy) -> Self {
        self.small_packets = Some(policy);
        self
    }

    /// Sets the receive timeout applied to every accepted connection.
    /// When the timeout expires while waiting for a request, the
    /// connection is treated as failed and closed.
    ///
    /// # Panics
    /// Panics when `timeout` is zero.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        assert!(!timeout.is_zero(), "refusing to set read timeout to zero");
        self.read_timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_addr_reuse(mut self, policy: AddrReusePolicy) -> Self {
        self.addr_reuse = Some(policy);
        self
    }
}

/// Binds a listening socket per `config`.
///
/// The socket carries a short receive timeout so the accept loop
/// periodically wakes up and observes stop requests.
///
/// # Errors
/// Returns an error when the OS refuses to create, configure, or bind the
/// socket.
pub fn bind_listener(config: &SocketConfig) -> Result<TcpListener, std::io::Error> {
    let domain = if config.listen_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };
    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;
    if let Some(policy) = config.addr_reuse {
        socket.set_reuse_address(policy == AddrReusePolicy::Reuse)?;
    }
    if let Some(n) = config.recv_buffer_size {
        socket.set_recv_buffer_size(n)?;
    }
    socket.bind(&config.listen_addr.into())?;
    socket.listen(i32::try_from(config.backlog).unwrap_or(i32::MAX))?;
    socket.set_read_timeout(Some(ACCEPT_POLL_INTERVAL))?;
    Ok(socket.into())
}

/// Applies the per-connection options from `config` to an accepted stream.
///
/// # Errors
/// Returns an error when the OS refuses one of the options.
pub fn configure_stream(config: &SocketConfig, stream: &TcpStream) -> Result<(), std::io::Error> {
    stream.set_read_timeout(config.read_timeout)?;
    if let Some(policy) = config.small_packets {
        stream.set_nodelay(policy == SmallPacketsPolicy::SendImmediately)?;
    }
    let sock_ref = SockRef::from(stream);
    if let Some(mode) = config.keep_alive {
        sock_ref.set_keepalive(mode == KeepAliveMode::SendKeepAlivePackets)?;
    }
    if let Some(n) = config.recv_buffer_size {
        sock_ref.set_recv_buffer_size(n)?;
    }
    if let Some(n) = config.send_buffer_size {
        sock_ref.set_send_buffer_size(n)?;
    }
    Ok(())
}

#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum AcceptResult {
    Ok(TcpStream, SocketAddr),
    /// The accept timeout elapsed; the loop should observe its state and
    /// retry.
    Poll,
    TooManyOpenFiles,
    Err(std::io::Error),
}
impl AcceptResult {
    #[must_use]
    pub fn new(res: Result<(TcpStream, SocketAddr), std::io::Error>) -> Self {
        match res {
            Ok((stream, addr)) => AcceptResult::Ok(stream, addr),
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                AcceptResult::Poll
            }
            // On Unix, std translates errno EMFILE (Too many open files) into
            // ErrorKind::Other (stable) or ErrorKind::Uncategorized (unstable).
            // The docs say that we shouldn't use either of these.
            // So we check for the POSIX errno EMFILE value: 24.
            Err(e) if e.raw_os_error() == Some(24) => AcceptResult::TooManyOpenFiles,
            Err(e) => AcceptResult::Err(e),
        }
    }
}
