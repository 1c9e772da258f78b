use crate::accept::{ACCEPT_POLL_INTERVAL, AcceptResult, SocketConfig};
use crate::executors::ConnectionExecutor;
use crate::log::tag;
use crate::{RequestConsumer, log};
use permit::Permit;
use std::net::TcpListener;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How long a stopping listener waits for in-flight connections to finish.
pub const POOL_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ListenerState {
    Stopped,
    Running,
    Stopping,
}
impl ListenerState {
    fn as_u8(self) -> u8 {
        match self {
            ListenerState::Stopped => 0,
            ListenerState::Running => 1,
            ListenerState::Stopping => 2,
        }
    }

    fn from_u8(n: u8) -> Self {
        match n {
            0 => ListenerState::Stopped,
            1 => ListenerState::Running,
            2 => ListenerState::Stopping,
            _ => unreachable!(),
        }
    }
}

/// The listener state, shared between the accept thread and callers of
/// [`ConnectionListener::stop`].  Transitions use compare-and-swap so each
/// one happens at most once, without a mutex.
struct StateCell(AtomicU8);
impl StateCell {
    fn new() -> Self {
        Self(AtomicU8::new(ListenerState::Stopped.as_u8()))
    }

    fn get(&self) -> ListenerState {
        ListenerState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn compare_and_set(&self, from: ListenerState, to: ListenerState) -> bool {
        self.0
            .compare_exchange(
                from.as_u8(),
                to.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    fn set(&self, to: ListenerState) {
        self.0.store(to.as_u8(), Ordering::Release);
    }
}

/// Accepts raw connections from a bound socket and hands each one to the
/// connection executor.
///
/// State machine: Stopped → Running → Stopping → Stopped.  At most one
/// accept loop is active per listener instance.
pub struct ConnectionListener {
    state: StateCell,
    executor: ConnectionExecutor,
    config: SocketConfig,
    max_body_len: u64,
    consumer: Arc<dyn RequestConsumer>,
    permit: Mutex<Permit>,
}
impl ConnectionListener {
    #[must_use]
    pub fn new(
        executor: ConnectionExecutor,
        config: SocketConfig,
        max_body_len: u64,
        consumer: Arc<dyn RequestConsumer>,
    ) -> Self {
        Self {
            state: StateCell::new(),
            executor,
            config,
            max_body_len,
            consumer,
            permit: Mutex::new(Permit::new()),
        }
    }

    #[must_use]
    pub fn state(&self) -> ListenerState {
        self.state.get()
    }

    /// Asks the accept loop to exit and revokes the permits of in-flight
    /// connections, which finish their current request and then close.
    ///
    /// Returns `true` when this call performed the Running → Stopping
    /// transition; `stop()` on a stopped listener is a no-op.
    #[allow(clippy::missing_panics_doc)]
    pub fn stop(&self) -> bool {
        let transitioned = self
            .state
            .compare_and_set(ListenerState::Running, ListenerState::Stopping);
        // Dropping the old permit revokes the subordinate permits held by
        // connection threads.
        *self.permit.lock().unwrap() = Permit::new();
        transitioned
    }

    /// Runs the accept loop on the calling thread until [`stop`] is
    /// observed.  When another loop is already active the call returns
    /// immediately, leaving that loop undisturbed.
    ///
    /// On exit the connection pool is drained (bounded wait) and the state
    /// resets to Stopped.
    ///
    /// [`stop`]: ConnectionListener::stop
    pub fn listen(&self, socket: TcpListener) {
        if !self
            .state
            .compare_and_set(ListenerState::Stopped, ListenerState::Running)
        {
            return;
        }
        self.accept_until_stopped(&socket);
        if !self.executor.drain(POOL_DRAIN_TIMEOUT) {
            log::info("stopped listening with connections still in flight", ());
        }
        self.state.set(ListenerState::Stopped);
    }

    #[allow(clippy::missing_panics_doc)]
    fn accept_until_stopped(&self, socket: &TcpListener) {
        while self.state.get() == ListenerState::Running {
            // Reserve pool capacity before accepting, so overflow waits in
            // the TCP backlog.
            let Some(token) = self.executor.reserve_timeout(ACCEPT_POLL_INTERVAL) else {
                continue;
            };
            match AcceptResult::new(socket.accept()) {
                AcceptResult::Ok(stream, remote_addr) => {
                    if self.state.get() != ListenerState::Running {
                        // stop() won the race; refuse the connection.
                        return;
                    }
                    let sub_permit = self.permit.lock().unwrap().new_sub();
                    self.executor.execute(
                        sub_permit,
                        token,
                        stream,
                        remote_addr,
                        self.config.clone(),
                        self.max_body_len,
                        self.consumer.clone(),
                    );
                }
                AcceptResult::Poll => {}
                AcceptResult::TooManyOpenFiles => {
                    log::error("out of file handles while accepting, backing off", ());
                    std::thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                AcceptResult::Err(e) => {
                    if self.state.get() == ListenerState::Running {
                        // An accept failure that is not a timeout and not a
                        // closed-socket shutdown signal is fatal.
                        log::error(
                            "fatal error accepting connection",
                            (tag("err", e.to_string()),),
                        );
                        return;
                    }
                    // The socket was closed as part of a shutdown; exit
                    // cleanly.
                    return;
                }
            }
        }
    }
}
