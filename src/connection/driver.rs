//! Background thread that owns a connection state and applies transport
//! events sent to it over a channel.

use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};

use log::{debug, warn};

use super::state::{ConnectionState, TransportEvent};

/// Statistics from the driver thread.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DriverStats {
    /// Events that moved the state.
    pub applied: usize,
    /// Events rejected for the state they arrived in.
    pub rejected: usize,
    pub final_state: ConnectionState,
}

enum Message {
    Event(TransportEvent),
    Stop,
}

/// Returned by [`ConnectionDriver::send`] once the driver thread is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverStopped(pub TransportEvent);

impl std::fmt::Display for DriverStopped {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "connection driver stopped; dropped event {}", self.0)
    }
}

impl std::error::Error for DriverStopped {}

/// Owns a [`ConnectionState`] on a background thread.
///
/// Events are applied in the order they are sent; `stop` drains everything
/// already queued before returning.
///
/// ## Example
///
/// ```
/// use mdb::connection::{ConnectionDriver, ConnectionState, TransportEvent};
///
/// let driver = ConnectionDriver::spawn();
/// driver.send(TransportEvent::Connect).unwrap();
/// driver.send(TransportEvent::Established).unwrap();
///
/// let stats = driver.stop();
/// assert_eq!(stats.applied, 2);
/// assert_eq!(stats.final_state, ConnectionState::Connected);
/// ```
pub struct ConnectionDriver {
    tx: Sender<Message>,
    state: Arc<RwLock<ConnectionState>>,
    handle: Option<JoinHandle<DriverStats>>,
}

impl ConnectionDriver {
    pub fn spawn() -> Self {
        let (tx, rx) = channel();
        let state = Arc::new(RwLock::new(ConnectionState::default()));
        let shared = state.clone();

        let handle = thread::spawn(move || {
            let mut stats = DriverStats::default();
            let mut current = ConnectionState::default();

            while let Ok(Message::Event(event)) = rx.recv() {
                match current.next(event) {
                    Ok(next) => {
                        debug!(
                            "event=connection_transition module=connection from={} to={}",
                            current, next
                        );
                        current = next;
                        stats.applied += 1;
                        if let Ok(mut guard) = shared.write() {
                            *guard = next;
                        }
                    }
                    Err(err) => {
                        warn!(
                            "event=connection_transition module=connection status=rejected error={}",
                            err
                        );
                        stats.rejected += 1;
                    }
                }
            }

            stats.final_state = current;
            stats
        });

        Self {
            tx,
            state,
            handle: Some(handle),
        }
    }

    /// Queue a transport event.
    pub fn send(&self, event: TransportEvent) -> Result<(), DriverStopped> {
        self.tx.send(Message::Event(event)).map_err(|e| match e.0 {
            Message::Event(event) => DriverStopped(event),
            Message::Stop => DriverStopped(TransportEvent::Disconnect),
        })
    }

    /// State after the most recently applied event.
    pub fn state(&self) -> ConnectionState {
        match self.state.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    /// Apply every queued event, stop the thread and return its statistics.
    pub fn stop(mut self) -> DriverStats {
        let _ = self.tx.send(Message::Stop);
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap_or_default()
        } else {
            DriverStats::default()
        }
    }

    /// Signal the driver to stop without waiting.
    pub fn signal_stop(&self) {
        let _ = self.tx.send(Message::Stop);
    }
}

impl Drop for ConnectionDriver {
    fn drop(&mut self) {
        let _ = self.tx.send(Message::Stop);
    }
}
