use crate::accept::SocketConfig;
use crate::http_conn::handle_connection;
use crate::listener::ConnectionListener;
use crate::log::tag;
use crate::token_set::{Token, TokenSet};
use crate::{RequestConsumer, log};
use permit::Permit;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Runs the blocking accept loop on one dedicated thread, decoupling it
/// from the caller.
///
/// There is no way to kill the thread; termination is reached by calling
/// [`ConnectionListener::stop`] and waiting here.
pub struct ListenerExecutor {
    opt_handle: Option<JoinHandle<()>>,
}
impl ListenerExecutor {
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self { opt_handle: None }
    }

    /// Starts `listener` accepting connections from `socket` on a new
    /// thread.
    ///
    /// # Errors
    /// Returns an error when a previous accept loop is still running on
    /// this executor, or when the OS refuses to spawn the thread.
    pub fn execute(
        &mut self,
        listener: Arc<ConnectionListener>,
        socket: TcpListener,
    ) -> Result<(), std::io::Error> {
        if let Some(handle) = self.opt_handle.take() {
            if handle.is_finished() {
                let _ignored = handle.join();
            } else {
                self.opt_handle = Some(handle);
                return Err(std::io::Error::other("listener executor is already running"));
            }
        }
        let handle = std::thread::Builder::new()
            .name("listener".to_string())
            .spawn(move || listener.listen(socket))?;
        self.opt_handle = Some(handle);
        Ok(())
    }

    /// Waits up to `timeout` for the accept loop to exit.
    /// Returns `true` when it has terminated (or never ran).
    #[allow(clippy::missing_panics_doc)]
    pub fn wait_for_termination(&mut self, timeout: Duration) -> bool {
        let Some(handle) = &self.opt_handle else {
            return true;
        };
        let deadline = Instant::now() + timeout;
        while !handle.is_finished() {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        let _ignored = self.opt_handle.take().unwrap().join();
        true
    }
}

/// A bounded pool of connection-handler threads.
///
/// Capacity is enforced with a [`TokenSet`]: the accept loop reserves a
/// token before accepting, so at most `max_conns` connections are in
/// flight and overflow waits in the TCP backlog, the only client-visible
/// backpressure.  Handing a connection over never blocks the accept
/// thread.
pub struct ConnectionExecutor {
    token_set: TokenSet,
}
impl ConnectionExecutor {
    /// # Panics
    /// Panics when `max_conns` is zero.
    #[must_use]
    pub fn new(max_conns: usize) -> Self {
        Self {
            token_set: TokenSet::new(max_conns),
        }
    }

    #[must_use]
    pub fn max_conns(&self) -> usize {
        self.token_set.size()
    }

    /// Reserves capacity for one connection, giving up after `timeout`.
    pub fn reserve_timeout(&self, timeout: Duration) -> Option<Token> {
        self.token_set.wait_token_timeout(timeout)
    }

    /// Spawns a thread to run `stream` through the connection consumer.
    /// The thread carries `token`, returning it to the pool when the
    /// connection ends.
    pub fn execute(
        &self,
        permit: Permit,
        token: Token,
        stream: TcpStream,
        remote_addr: SocketAddr,
        config: SocketConfig,
        max_body_len: u64,
        consumer: Arc<dyn RequestConsumer>,
    ) {
        let spawn_result = std::thread::Builder::new()
            .name(format!("connection-{remote_addr}"))
            .spawn(move || {
                handle_connection(
                    &permit,
                    token,
                    stream,
                    remote_addr,
                    &config,
                    max_body_len,
                    consumer.as_ref(),
                );
            });
        if let Err(e) = spawn_result {
            log::error(
                "failed spawning connection thread",
                (
                    tag("remote_addr", remote_addr.to_string()),
                    tag("err", e.to_string()),
                ),
            );
        }
    }

    /// Waits up to `timeout` for all in-flight connections to finish.
    /// Returns `true` when the pool is fully drained.
    pub fn drain(&self, timeout: Duration) -> bool {
        self.token_set.wait_all_returned(timeout)
    }
}
