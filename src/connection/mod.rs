//! Transport connection state machine.
//!
//! The transport reports its progress as [`TransportEvent`]s; the state is a
//! plain value moved forward by [`ConnectionState::next`], or owned by a
//! [`ConnectionDriver`] thread that receives events over a channel.

mod driver;
mod state;

pub use driver::{ConnectionDriver, DriverStats, DriverStopped};
pub use state::{ConnectionState, TransitionError, TransportEvent};
