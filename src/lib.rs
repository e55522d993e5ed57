//! Storybook core - story registry, selection and the manager/preview channel
//!
//! The manager resolves the URL to a story against the registry and drives
//! the preview over a plain-data event channel.

pub mod channel;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod preview;
pub mod registry;
pub mod selection;
pub mod shortcuts;
pub mod story_sort;
