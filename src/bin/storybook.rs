//! Storybook - story index inspection from the command line
//!
//! # Usage
//!
//! ```bash
//! storybook list --index stories.json
//! storybook resolve --index stories.json "iframe.html?id=button--primary&viewMode=story"
//! storybook suites --index stories.json --kind "^Widgets"
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use regex::Regex;
use tracing::info;

use storybook_core::channel::{pair, Channel};
use storybook_core::config::{load_config, load_config_from, StorybookConfig};
use storybook_core::controller::{ControllerOptions, SelectionController};
use storybook_core::logging;
use storybook_core::preview::{Preview, RecordingRenderer};
use storybook_core::registry::{snapshot_suites, SharedRegistry, StoryIndex, StoryRegistry, SuiteOptions};
use storybook_core::selection::{MemoryHistory, SelectionCodec};

#[derive(Parser, Debug)]
#[command(name = "storybook")]
#[command(about = "Inspect and resolve stories from a stories.json index")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.storybook/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print stories in sidebar order, grouped by kind
    List {
        #[arg(long)]
        index: PathBuf,
    },
    /// Resolve a URL to a story the way the manager does on load
    Resolve {
        #[arg(long)]
        index: PathBuf,
        /// URL or query string, e.g. "?path=/story/button--primary"
        url: String,
    },
    /// Print the snapshot test suites
    Suites {
        #[arg(long)]
        index: PathBuf,
        /// Only stories whose name matches
        #[arg(long)]
        name: Option<String>,
        /// Only stories whose kind matches
        #[arg(long)]
        kind: Option<String>,
    },
}

fn load_registry(index: &Path, config: &StorybookConfig) -> Result<StoryRegistry> {
    let index = StoryIndex::load(index)
        .with_context(|| format!("Failed to read story index {}", index.display()))?;
    Ok(index.into_registry(config.registry_builder())?)
}

fn list(registry: &StoryRegistry, config: &StorybookConfig) {
    let mut current_kind: Option<&str> = None;
    for story in registry.sorted(&config.story_sort) {
        if current_kind != Some(story.kind.as_str()) {
            println!("{}", story.kind);
            current_kind = Some(story.kind.as_str());
        }
        println!("  {:<40} {}", story.id, story.name);
    }
}

fn resolve(registry: StoryRegistry, config: &StorybookConfig, url: &str) -> Result<()> {
    let (manager_end, preview_end) = pair();
    let manager_channel = Channel::with_transport(manager_end);
    let preview_channel = Channel::with_transport(preview_end);

    let preview = Preview::new(
        preview_channel.clone(),
        SharedRegistry::new(registry),
        Box::new(RecordingRenderer::default()),
    );
    preview.install();

    let controller = SelectionController::new(
        manager_channel.clone(),
        SharedRegistry::default(),
        Arc::new(SelectionCodec::new()),
        Box::new(MemoryHistory::new(url)),
        ControllerOptions::from_config(config),
    );
    controller.install();
    controller.boot()?;

    preview.announce_stories();
    manager_channel.pump();
    // The index is complete, so a miss now is final
    controller.settle();
    preview_channel.pump();
    manager_channel.pump();

    let state = controller.state();
    info!(state = state.name(), "Resolution settled");
    println!("{}", serde_json::to_string_pretty(&state)?);
    println!("url: {}", controller.location_href());
    if let Some(message) = state.user_message() {
        println!("{}", message);
    }
    if let Some(outcome) = preview.last_outcome() {
        println!("preview: {:?}", outcome);
    }
    Ok(())
}

fn suites(registry: &StoryRegistry, name: Option<&str>, kind: Option<&str>) -> Result<()> {
    let options = SuiteOptions {
        story_name_regex: name.map(Regex::new).transpose()?,
        story_kind_regex: kind.map(Regex::new).transpose()?,
    };
    for suite in snapshot_suites(registry, &options)? {
        println!("{}", suite.kind);
        for story in suite.stories {
            println!("  {}", story.name);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let _guard = logging::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config_from(path)?,
        None => load_config(),
    };

    match cli.command {
        Command::List { index } => {
            let registry = load_registry(&index, &config)?;
            list(&registry, &config);
        }
        Command::Resolve { index, url } => {
            let registry = load_registry(&index, &config)?;
            resolve(registry, &config, &url)?;
        }
        Command::Suites { index, name, kind } => {
            let registry = load_registry(&index, &config)?;
            suites(&registry, name.as_deref(), kind.as_deref())?;
        }
    }
    Ok(())
}
