//! Interrupting a blocked event wait.
//!
//! [`Waker`] calls the engine's wakeup from any thread. [`WakeupPipe`] wraps
//! the engine's readable descriptor so an embedding application can poll it
//! next to its own I/O sources and only call `wait_event` when it fires.

use std::io;
use std::os::fd::{AsRawFd, RawFd};
use std::sync::Arc;
use std::time::Duration;

use crate::engine::Engine;
use crate::handle::SharedEngine;

/// Cloneable, thread-safe wakeup trigger for one handle.
pub struct Waker<E: Engine> {
    engine: SharedEngine<E>,
}

impl<E: Engine> Waker<E> {
    pub(crate) fn new(engine: SharedEngine<E>) -> Self {
        Self { engine }
    }

    /// Wake the thread blocked in `wait_event`. Returns `false` if the handle
    /// has been closed.
    pub fn wake(&self) -> bool {
        match self.engine.read().as_ref() {
            Some(engine) => {
                engine.wakeup();
                true
            }
            None => false,
        }
    }
}

impl<E: Engine> Clone for Waker<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

/// The engine-owned wakeup descriptor.
///
/// Never closed here: the engine owns it, and it becomes invalid once the
/// handle it came from is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WakeupPipe {
    fd: RawFd,
}

impl WakeupPipe {
    pub(crate) fn new(fd: RawFd) -> Self {
        Self { fd }
    }

    /// Wait until the descriptor is readable. `None` waits indefinitely.
    ///
    /// Returns `false` on timeout.
    pub fn poll(&self, timeout: Option<Duration>) -> io::Result<bool> {
        let timeout_ms = poll_timeout_ms(timeout);
        let mut pfd = libc::pollfd {
            fd: self.fd,
            events: libc::POLLIN,
            revents: 0,
        };
        loop {
            let n = unsafe { libc::poll(&mut pfd, 1, timeout_ms) };
            if n < 0 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(err);
            }
            return Ok(n > 0 && pfd.revents & (libc::POLLIN | libc::POLLHUP) != 0);
        }
    }

    /// Consume pending wakeup bytes without blocking. Returns how many were
    /// read.
    pub fn drain(&self) -> io::Result<usize> {
        let mut total = 0;
        let mut buf = [0u8; 64];
        while self.poll(Some(Duration::ZERO))? {
            let n = unsafe { libc::read(self.fd, buf.as_mut_ptr().cast(), buf.len()) };
            if n < 0 {
                let err = io::Error::last_os_error();
                match err.kind() {
                    io::ErrorKind::Interrupted => continue,
                    io::ErrorKind::WouldBlock => break,
                    _ => return Err(err),
                }
            }
            if n == 0 {
                break;
            }
            total += n as usize;
        }
        Ok(total)
    }
}

/// `poll(2)` timeout in whole milliseconds, rounded up so a short bounded
/// wait still blocks.
fn poll_timeout_ms(timeout: Option<Duration>) -> libc::c_int {
    match timeout {
        None => -1,
        Some(d) => d.as_nanos().div_ceil(1_000_000).min(i32::MAX as u128) as libc::c_int,
    }
}

impl AsRawFd for WakeupPipe {
    fn as_raw_fd(&self) -> RawFd {
        self.fd
    }
}
