//! The event bus shared by the manager and preview contexts.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::envelope::{parse_envelope_graceful, Envelope, EnvelopeParse};
use super::transport::Transport;
use crate::error::{Result, ResultExt};
use crate::logging::log_channel_event;

/// Event handler. Receives the emitted arguments as plain data.
pub type Handler = Arc<dyn Fn(&[Value]) -> anyhow::Result<()> + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Listener {
    id: ListenerId,
    handler: Handler,
    once: bool,
}

struct ChannelInner {
    listeners: Mutex<HashMap<String, Vec<Listener>>>,
    next_id: AtomicU64,
    transport: Option<Box<dyn Transport>>,
}

/// Event bus with optional peer transport.
///
/// `emit` delivers to local listeners synchronously and, when a transport is
/// attached, queues the envelope for the peer, whose `pump` delivers it there.
/// A failing or panicking handler is logged and never stops the remaining
/// handlers for the same event.
#[derive(Clone)]
pub struct Channel {
    inner: Arc<ChannelInner>,
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("events", &self.inner.listeners.lock().len())
            .field("has_transport", &self.inner.transport.is_some())
            .finish()
    }
}

impl Channel {
    fn build(transport: Option<Box<dyn Transport>>) -> Self {
        Self {
            inner: Arc::new(ChannelInner {
                listeners: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                transport,
            }),
        }
    }

    /// In-process channel without a peer; delivery is synchronous.
    pub fn mock() -> Self {
        Self::build(None)
    }

    pub fn with_transport(transport: impl Transport + 'static) -> Self {
        Self::build(Some(Box::new(transport)))
    }

    fn add_listener<F>(&self, event: &str, handler: F, once: bool) -> ListenerId
    where
        F: Fn(&[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .listeners
            .lock()
            .entry(event.to_string())
            .or_default()
            .push(Listener {
                id,
                handler: Arc::new(handler),
                once,
            });
        debug!(event = %event, listener = id.0, once, "Listener added");
        id
    }

    pub fn on<F>(&self, event: &str, handler: F) -> ListenerId
    where
        F: Fn(&[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.add_listener(event, handler, false)
    }

    /// Listen for the next occurrence of `event` only.
    pub fn once<F>(&self, event: &str, handler: F) -> ListenerId
    where
        F: Fn(&[Value]) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.add_listener(event, handler, true)
    }

    pub fn remove_listener(&self, event: &str, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.lock();
        let Some(list) = listeners.get_mut(event) else {
            return false;
        };
        let before = list.len();
        list.retain(|l| l.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            listeners.remove(event);
        }
        removed
    }

    /// Remove every listener for `event`, or for all events when `None`.
    pub fn remove_all_listeners(&self, event: Option<&str>) {
        let mut listeners = self.inner.listeners.lock();
        match event {
            Some(event) => {
                listeners.remove(event);
            }
            None => listeners.clear(),
        }
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.inner
            .listeners
            .lock()
            .get(event)
            .map_or(0, |list| list.len())
    }

    pub fn has_transport(&self) -> bool {
        self.inner.transport.is_some()
    }

    /// Fire-and-forget emit.
    pub fn emit(&self, event: &str, args: Vec<Value>) {
        if let Some(transport) = &self.inner.transport {
            let envelope = Envelope::new(event, args.clone());
            match serde_json::to_string(&envelope) {
                Ok(frame) => {
                    transport.send(event, frame).warn_on_err();
                }
                Err(e) => warn!(event = %event, error = %e, "Failed to encode envelope"),
            }
        }
        self.dispatch(event, &args, "emit");
    }

    /// Emit a single serializable payload.
    pub fn emit_data<T: Serialize>(&self, event: &str, payload: &T) -> Result<()> {
        let value = serde_json::to_value(payload)?;
        self.emit(event, vec![value]);
        Ok(())
    }

    /// Deliver every frame the peer has queued. Returns how many were
    /// delivered; malformed frames are skipped.
    pub fn pump(&self) -> usize {
        let Some(transport) = &self.inner.transport else {
            return 0;
        };
        let mut delivered = 0;
        while let Some(frame) = transport.try_recv() {
            if self.receive(&frame) {
                delivered += 1;
            }
        }
        delivered
    }

    /// Deliver frames as they arrive until the peer closes its side.
    pub fn run_until_closed(&self) -> usize {
        let Some(transport) = &self.inner.transport else {
            return 0;
        };
        let mut delivered = 0;
        while let Some(frame) = transport.recv_blocking() {
            if self.receive(&frame) {
                delivered += 1;
            }
        }
        debug!(delivered, "Peer closed the channel");
        delivered
    }

    fn receive(&self, frame: &str) -> bool {
        match parse_envelope_graceful(frame) {
            EnvelopeParse::Ok(envelope) => {
                self.dispatch(&envelope.event, &envelope.args, "receive");
                true
            }
            EnvelopeParse::MissingEvent { raw } => {
                warn!(raw = %raw, "Frame without event name, skipping");
                false
            }
            EnvelopeParse::InvalidPayload { event, error, raw } => {
                warn!(event = %event, error = %error, raw = %raw, "Invalid frame, skipping");
                false
            }
            EnvelopeParse::ParseError(e) => {
                warn!(error = %e, "Unparseable frame, skipping");
                false
            }
        }
    }

    fn dispatch(&self, event: &str, args: &[Value], direction: &str) {
        // Handlers run outside the lock so they can emit or (un)subscribe
        let handlers: Vec<(ListenerId, Handler)> = {
            let mut listeners = self.inner.listeners.lock();
            let Some(list) = listeners.get_mut(event) else {
                log_channel_event(event, direction, 0);
                return;
            };
            let handlers = list.iter().map(|l| (l.id, l.handler.clone())).collect();
            list.retain(|l| !l.once);
            if list.is_empty() {
                listeners.remove(event);
            }
            handlers
        };
        log_channel_event(event, direction, handlers.len());

        for (id, handler) in handlers {
            match catch_unwind(AssertUnwindSafe(|| handler(args))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    warn!(event = %event, listener = id.0, error = %e, "Channel handler failed");
                }
                Err(_) => {
                    error!(event = %event, listener = id.0, "Channel handler panicked");
                }
            }
        }
    }
}

/// Deserialize argument `index` of an event.
pub fn payload<T: DeserializeOwned>(args: &[Value], index: usize) -> anyhow::Result<T> {
    let value = args
        .get(index)
        .ok_or_else(|| anyhow::anyhow!("missing argument {}", index))?;
    Ok(serde_json::from_value(value.clone())?)
}
