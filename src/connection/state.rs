use std::error::Error;
use std::fmt;

/// Where a transport connection stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Disconnecting,
}

/// Callback from the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The client asked to connect.
    Connect,
    /// The transport finished its handshake.
    Established,
    /// The client asked to disconnect.
    Disconnect,
    /// The transport closed the session.
    Closed,
    /// The transport gave up; carries the reason.
    Failed(String),
}

/// An event that makes no sense in the current state. The state is left
/// unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionError {
    pub state: ConnectionState,
    pub event: TransportEvent,
}

impl ConnectionState {
    /// Apply `event`, returning the new state.
    pub fn next(self, event: TransportEvent) -> Result<ConnectionState, TransitionError> {
        use ConnectionState::*;
        use TransportEvent::*;

        let next = match (self, &event) {
            (Disconnected, Connect) => Some(Connecting),
            (Connecting, Established) => Some(Connected),
            (Connected, Disconnect) => Some(Disconnecting),
            (Disconnecting, Closed) => Some(Disconnected),
            (Connecting | Connected | Disconnecting, Failed(_) | Closed) => Some(Disconnected),
            _ => None,
        };
        next.ok_or(TransitionError { state: self, event })
    }

    pub fn is_connected(self) -> bool {
        self == ConnectionState::Connected
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnecting => "disconnecting",
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for TransportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportEvent::Connect => f.write_str("connect"),
            TransportEvent::Established => f.write_str("established"),
            TransportEvent::Disconnect => f.write_str("disconnect"),
            TransportEvent::Closed => f.write_str("closed"),
            TransportEvent::Failed(reason) => write!(f, "failed ({})", reason),
        }
    }
}

impl fmt::Display for TransitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot apply {} while {}", self.event, self.state)
    }
}

impl Error for TransitionError {}
