//! Live-event plumbing: the wire format and the reconnecting channel.

pub mod channel;
pub mod events;

pub use channel::{ChannelState, EventChannel};
pub use events::GatewayEvent;
