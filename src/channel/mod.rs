//! Cross-frame channel.
//!
//! This module provides:
//! - `Channel` - on/once/emit/remove_listener with handler isolation
//! - `Envelope` - the plain-data wire form of an event
//! - `transport::pair` - connected endpoints for a manager and a preview
//! - `highlight` - the a11y highlight decoration, reset on story change
//! - `events` - event names

mod bus;
mod envelope;
pub mod events;
pub mod highlight;
pub mod transport;

#[cfg(test)]
#[path = "channel_tests.rs"]
mod channel_tests;

pub use bus::{payload, Channel, Handler, ListenerId};
pub use envelope::{log_preview, parse_envelope_graceful, Envelope, EnvelopeParse};
pub use highlight::{highlight_css, install_highlight, HighlightInfo, MemoryStyleHost, StyleHost};
pub use transport::{pair, PostMessageTransport, Transport};
