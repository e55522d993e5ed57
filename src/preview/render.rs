//! Render isolation.
//!
//! A story's render can fail or panic; either way the preview keeps running
//! and reports `Errored` instead of losing the frame.

use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::registry::{Params, StoryRecord};
use crate::selection::ViewMode;

/// Everything a renderer needs for one story.
#[derive(Debug)]
pub struct RenderContext<'a> {
    pub story: &'a StoryRecord,
    pub args: &'a Params,
    pub globals: &'a Params,
    pub view_mode: ViewMode,
    /// Same story as the previous render; keep component state.
    pub force_render: bool,
}

/// Framework-specific renderer.
pub trait Renderer: Send {
    fn render(&mut self, context: &RenderContext<'_>) -> anyhow::Result<()>;

    /// Unmount whatever the previous story rendered.
    fn teardown(&mut self) {}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    Errored(String),
}

impl RenderOutcome {
    pub fn is_rendered(&self) -> bool {
        matches!(self, RenderOutcome::Rendered)
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "render panicked".to_string()
    }
}

/// Render with failures and panics turned into `Errored`.
pub fn render_isolated<R: Renderer + ?Sized>(
    renderer: &mut R,
    context: &RenderContext<'_>,
) -> RenderOutcome {
    match catch_unwind(AssertUnwindSafe(|| renderer.render(context))) {
        Ok(Ok(())) => {
            debug!(story_id = %context.story.id, force = context.force_render, "Story rendered");
            RenderOutcome::Rendered
        }
        Ok(Err(e)) => {
            warn!(story_id = %context.story.id, error = %e, "Story render failed");
            RenderOutcome::Errored(format!("{:#}", e))
        }
        Err(panic) => {
            let cause = panic_message(panic.as_ref());
            warn!(story_id = %context.story.id, cause = %cause, "Story render panicked");
            RenderOutcome::Errored(cause)
        }
    }
}

/// Renderer that records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub rendered: Vec<(String, bool)>,
    pub teardowns: usize,
    /// Story ids whose render fails.
    pub failing: Vec<String>,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, context: &RenderContext<'_>) -> anyhow::Result<()> {
        if self.failing.contains(&context.story.id) {
            anyhow::bail!("{} failed to render", context.story.id);
        }
        self.rendered
            .push((context.story.id.clone(), context.force_render));
        Ok(())
    }

    fn teardown(&mut self) {
        self.teardowns += 1;
    }
}
