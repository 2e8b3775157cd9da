//! Deadline-bounded socket I/O.
//!
//! A [`SocketTable`] owns socket handles through their lifecycle: created
//! → opened → used for send/receive → closed → freed. [`receive`] is a
//! single bounded read attempt: it returns within its remaining-seconds
//! allotment or reports `None` on timeout/EOF. It never loops — callers
//! that want to drain a stream own the deadline budget (see the harness's
//! drain loop). Per-socket statistics accumulate monotonically until the
//! handle is freed.
//!
//! [`receive`]: SocketTable::receive

use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::error::{CapError, CapResult};

// ---------------------------------------------------------------------------
// Handle data model
// ---------------------------------------------------------------------------

/// Identifies one socket in a [`SocketTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketId(pub u64);

impl std::fmt::Display for SocketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "socket#{}", self.0)
    }
}

/// Connection role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketMode {
    Client,
    Server,
}

impl SocketMode {
    /// Display name for the mode.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SocketMode::Client => "client",
            SocketMode::Server => "server",
        }
    }
}

/// Wire protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketProtocol {
    Tcp,
    Udp,
}

impl SocketProtocol {
    /// Display name for the protocol.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SocketProtocol::Tcp => "tcp/ip",
            SocketProtocol::Udp => "udp",
        }
    }
}

/// Lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    Created,
    Open,
    Closed,
}

impl SocketState {
    /// Display name for the state.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SocketState::Created => "created",
            SocketState::Open => "open",
            SocketState::Closed => "closed",
        }
    }
}

/// Cumulative per-socket counters. Monotonically non-decreasing until the
/// handle is freed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SocketStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub reads_attempted: u64,
    pub reads_completed: u64,
    pub writes_attempted: u64,
    pub writes_completed: u64,
    pub total_read_time: Duration,
    pub total_write_time: Duration,
}

enum Transport {
    Tcp(TcpStream),
    TcpListener(TcpListener),
    Udp(UdpSocket),
}

struct Slot {
    mode: SocketMode,
    protocol: SocketProtocol,
    host: String,
    port: u16,
    state: SocketState,
    transport: Option<Transport>,
    stats: SocketStats,
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Registry of live sockets.
#[derive(Default)]
pub struct SocketTable {
    slots: Mutex<HashMap<u64, Arc<Mutex<Slot>>>>,
    next_id: AtomicU64,
}

impl SocketTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Allocate a socket handle in the Created state.
    pub fn create(
        &self,
        mode: SocketMode,
        protocol: SocketProtocol,
        host: &str,
        port: u16,
    ) -> SocketId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.slots.lock().insert(
            id,
            Arc::new(Mutex::new(Slot {
                mode,
                protocol,
                host: host.to_string(),
                port,
                state: SocketState::Created,
                transport: None,
                stats: SocketStats::default(),
            })),
        );
        SocketId(id)
    }

    fn slot(&self, id: SocketId) -> CapResult<Arc<Mutex<Slot>>> {
        self.slots
            .lock()
            .get(&id.0)
            .cloned()
            .ok_or(CapError::InvalidHandle(id.0))
    }

    /// Connect (client) or bind (server) the socket.
    ///
    /// Returns `Ok(false)` when the peer is unreachable, leaving the
    /// handle in the Created state so the caller may retry or skip.
    pub fn open(&self, id: SocketId) -> CapResult<bool> {
        let slot = self.slot(id)?;
        let mut slot = slot.lock();
        if slot.state != SocketState::Created {
            return Err(CapError::InvalidState(format!(
                "{id} is {}, expected created",
                slot.state.as_str()
            )));
        }

        let endpoint = (slot.host.as_str(), slot.port);
        let transport = match (slot.mode, slot.protocol) {
            (SocketMode::Client, SocketProtocol::Tcp) => match TcpStream::connect(endpoint) {
                Ok(stream) => Transport::Tcp(stream),
                Err(_) => return Ok(false),
            },
            (SocketMode::Client, SocketProtocol::Udp) => {
                let socket = UdpSocket::bind(("0.0.0.0", 0))?;
                if socket.connect(endpoint).is_err() {
                    return Ok(false);
                }
                Transport::Udp(socket)
            }
            (SocketMode::Server, SocketProtocol::Tcp) => match TcpListener::bind(endpoint) {
                Ok(listener) => Transport::TcpListener(listener),
                Err(_) => return Ok(false),
            },
            (SocketMode::Server, SocketProtocol::Udp) => match UdpSocket::bind(endpoint) {
                Ok(socket) => Transport::Udp(socket),
                Err(_) => return Ok(false),
            },
        };

        slot.transport = Some(transport);
        slot.state = SocketState::Open;
        Ok(true)
    }

    /// Write `buf` once. Returns the number of bytes accepted; a short
    /// write is a retryable partial-write condition, not an error.
    pub fn send(&self, id: SocketId, buf: &[u8]) -> CapResult<usize> {
        let slot = self.slot(id)?;
        let mut slot = slot.lock();
        if slot.state != SocketState::Open {
            return Err(CapError::InvalidState(format!(
                "{id} is {}, expected open",
                slot.state.as_str()
            )));
        }

        slot.stats.writes_attempted += 1;
        let started = Instant::now();
        let written = match slot.transport.as_mut() {
            Some(Transport::Tcp(stream)) => stream.write(buf),
            Some(Transport::Udp(socket)) => socket.send(buf),
            Some(Transport::TcpListener(_)) | None => {
                return Err(CapError::InvalidState(format!(
                    "{id} has no writable transport"
                )));
            }
        };
        slot.stats.total_write_time += started.elapsed();

        let written = written?;
        slot.stats.bytes_sent += written as u64;
        if written == buf.len() {
            slot.stats.writes_completed += 1;
        }
        Ok(written)
    }

    /// One bounded read attempt of up to `chunk_size` bytes.
    ///
    /// Blocks no longer than `remaining_secs`; returns `None` on timeout
    /// or EOF. A non-positive remaining budget is an immediate timeout.
    pub fn receive(
        &self,
        id: SocketId,
        chunk_size: usize,
        remaining_secs: f64,
    ) -> CapResult<Option<Vec<u8>>> {
        if chunk_size == 0 {
            return Err(CapError::InvalidArgument(
                "receive chunk size must be non-zero".to_string(),
            ));
        }

        let slot = self.slot(id)?;
        let mut slot = slot.lock();
        if slot.state != SocketState::Open {
            return Err(CapError::InvalidState(format!(
                "{id} is {}, expected open",
                slot.state.as_str()
            )));
        }

        slot.stats.reads_attempted += 1;
        if !(remaining_secs > 0.0) || !remaining_secs.is_finite() {
            return Ok(None);
        }

        // A sub-microsecond allotment would round to a zero timeout,
        // which the socket API rejects.
        let deadline = Duration::try_from_secs_f64(remaining_secs)
            .unwrap_or(Duration::MAX)
            .max(Duration::from_micros(1));
        let mut buf = vec![0u8; chunk_size];
        let started = Instant::now();
        let outcome = match slot.transport.as_mut() {
            Some(Transport::Tcp(stream)) => {
                stream.set_read_timeout(Some(deadline))?;
                stream.read(&mut buf)
            }
            Some(Transport::Udp(socket)) => {
                socket.set_read_timeout(Some(deadline))?;
                socket.recv(&mut buf)
            }
            Some(Transport::TcpListener(_)) | None => {
                return Err(CapError::InvalidState(format!(
                    "{id} has no readable transport"
                )));
            }
        };
        slot.stats.total_read_time += started.elapsed();

        match outcome {
            Ok(0) => Ok(None),
            Ok(n) => {
                buf.truncate(n);
                slot.stats.bytes_received += n as u64;
                slot.stats.reads_completed += 1;
                Ok(Some(buf))
            }
            Err(err)
                if matches!(
                    err.kind(),
                    std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                ) =>
            {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Shut the transport down. The handle (and its statistics) remain
    /// readable until freed.
    pub fn close(&self, id: SocketId) -> CapResult<bool> {
        let slot = self.slot(id)?;
        let mut slot = slot.lock();
        if slot.state != SocketState::Open {
            return Err(CapError::InvalidState(format!(
                "{id} is {}, expected open",
                slot.state.as_str()
            )));
        }
        slot.transport = None;
        slot.state = SocketState::Closed;
        Ok(true)
    }

    /// Release the handle.
    pub fn free(&self, id: SocketId) -> CapResult<()> {
        self.slots
            .lock()
            .remove(&id.0)
            .map(|_| ())
            .ok_or(CapError::InvalidHandle(id.0))
    }

    /// Cumulative statistics snapshot.
    pub fn stats(&self, id: SocketId) -> CapResult<SocketStats> {
        Ok(self.slot(id)?.lock().stats)
    }

    /// Display name of the lifecycle state.
    pub fn state_label(&self, id: SocketId) -> CapResult<&'static str> {
        Ok(self.slot(id)?.lock().state.as_str())
    }

    /// Display name of the mode.
    pub fn mode_label(&self, id: SocketId) -> CapResult<&'static str> {
        Ok(self.slot(id)?.lock().mode.as_str())
    }

    /// Display name of the protocol.
    pub fn protocol_label(&self, id: SocketId) -> CapResult<&'static str> {
        Ok(self.slot(id)?.lock().protocol.as_str())
    }

    /// Raw descriptor for diagnostics; `-1` when no transport is live.
    pub fn descriptor(&self, id: SocketId) -> CapResult<i64> {
        let slot = self.slot(id)?;
        let slot = slot.lock();
        #[cfg(unix)]
        {
            use std::os::fd::AsRawFd;
            Ok(match slot.transport.as_ref() {
                Some(Transport::Tcp(stream)) => i64::from(stream.as_raw_fd()),
                Some(Transport::TcpListener(listener)) => i64::from(listener.as_raw_fd()),
                Some(Transport::Udp(socket)) => i64::from(socket.as_raw_fd()),
                None => -1,
            })
        }
        #[cfg(not(unix))]
        {
            let _ = slot;
            Ok(-1)
        }
    }
}
