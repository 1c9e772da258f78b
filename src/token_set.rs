use std::sync::Mutex;
use std::sync::mpsc::{Receiver, RecvTimeoutError, SyncSender, sync_channel};
use std::time::{Duration, Instant};

/// A token.  If the token came from a [`TokenSet`], dropping the token puts
/// it back in the set.
pub struct Token(SyncSender<()>);
impl Token {
    /// Makes a new token that is not part of a set.  This is useful for testing.
    #[must_use]
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let (sender, _receiver) = sync_channel(1);
        Self(sender)
    }
}
impl Drop for Token {
    fn drop(&mut self) {
        let _ = self.0.try_send(());
    }
}

/// A set of tokens.  You can take a token from the set.
/// Dropping the token returns it to the set.
/// When the set is empty, you must wait for a token to be returned.
///
/// This struct is useful for limiting the number of things that can happen
/// at the same time.  The server uses it to bound the number of connections
/// it handles concurrently.
pub struct TokenSet {
    size: usize,
    sender: SyncSender<()>,
    receiver: Mutex<Receiver<()>>,
}
impl TokenSet {
    /// # Panics
    /// Panics when `size` is zero.
    #[must_use]
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "refusing to make an empty TokenSet");
        let (sender, receiver) = sync_channel(size);
        for _ in 0..size {
            sender.try_send(()).unwrap();
        }
        Self {
            size,
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Takes a token from the set, blocking until one is available.
    #[must_use]
    #[allow(clippy::missing_panics_doc)]
    pub fn wait_token(&self) -> Token {
        self.receiver.lock().unwrap().recv().unwrap();
        Token(self.sender.clone())
    }

    /// Takes a token from the set, giving up after `timeout`.
    #[allow(clippy::missing_panics_doc)]
    pub fn wait_token_timeout(&self, timeout: Duration) -> Option<Token> {
        match self.receiver.lock().unwrap().recv_timeout(timeout) {
            Ok(()) => Some(Token(self.sender.clone())),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => unreachable!(),
        }
    }

    /// Waits up to `timeout` for every token to return to the set.
    /// Returns `true` on success.  The collected tokens are put back, so
    /// the set is full afterwards.
    #[allow(clippy::missing_panics_doc)]
    pub fn wait_all_returned(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let receiver = self.receiver.lock().unwrap();
        let mut collected = 0;
        while collected < self.size {
            let now = Instant::now();
            let remaining = if deadline > now {
                deadline.duration_since(now)
            } else {
                Duration::ZERO
            };
            match receiver.recv_timeout(remaining) {
                Ok(()) => collected += 1,
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => unreachable!(),
            }
        }
        let all_returned = collected == self.size;
        for _ in 0..collected {
            self.sender.try_send(()).unwrap();
        }
        all_returned
    }
}
