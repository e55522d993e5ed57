//! Preview host: renders the selected story and reports back over the channel.

mod host;
mod render;

#[cfg(test)]
#[path = "preview_tests.rs"]
mod preview_tests;

pub use host::{update_args_payload, Preview};
pub use render::{render_isolated, RecordingRenderer, RenderContext, RenderOutcome, Renderer};
