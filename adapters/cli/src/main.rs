#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Labpyrinthe map viewer.
//!
//! A demo rule engine plays a bot match on its own thread and posts its
//! publications to the mailbox; the macroquad loop drains the mailbox at
//! idle and publishes into the scene.

mod config;
mod demo;
mod flat_skin;
mod session;

use std::{path::PathBuf, sync::mpsc};

use anyhow::{Context, Result};
use clap::Parser;
use labpyrinthe_core::GameMessage;
use labpyrinthe_rendering::{Channel, Mailbox, MapPublisher, Presentation, RenderingBackend};
use labpyrinthe_rendering_macroquad::{ImmediateScene, MacroquadBackend, SceneHandle};
use tracing_subscriber::EnvFilter;

use crate::{
    config::{LabConfig, Resolution},
    demo::DemoEngine,
    session::Session,
};

#[derive(Debug, Parser)]
#[command(name = "labpyrinthe", version, about = "Labpyrinthe map viewer with a demo match")]
struct Args {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Skin directory; omit to draw flat generated tiles.
    #[arg(long)]
    skin: Option<PathBuf>,
    /// Largest cell side in pixels.
    #[arg(long)]
    max_cell_size: Option<u32>,
    /// Flatten robot sprites onto opaque floor tiles.
    #[arg(long)]
    opt_mode: bool,
    /// How animated moves are drawn.
    #[arg(long, value_enum)]
    animation_resolution: Option<Resolution>,
    /// Milliseconds between engine ticks.
    #[arg(long)]
    tick_millis: Option<u64>,
    /// Seed of the generated match.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of map columns.
    #[arg(long)]
    map_width: Option<u32>,
    /// Number of map rows.
    #[arg(long)]
    map_height: Option<u32>,
    /// Number of robots, the first one being yours.
    #[arg(long)]
    robots: Option<u32>,
    /// Render as fast as possible instead of waiting for the display.
    #[arg(long)]
    no_vsync: bool,
    /// Log frame timings once per second.
    #[arg(long)]
    show_fps: bool,
}

impl Args {
    fn apply(&self, config: &mut LabConfig) {
        if let Some(skin) = &self.skin {
            config.skin_root = Some(skin.clone());
        }
        if let Some(max_cell_size) = self.max_cell_size {
            config.max_cell_size = max_cell_size;
        }
        if let Some(resolution) = self.animation_resolution {
            config.animation_resolution = resolution;
        }
        if let Some(tick_millis) = self.tick_millis {
            config.tick_millis = tick_millis;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(map_width) = self.map_width {
            config.map_width = map_width;
        }
        if let Some(map_height) = self.map_height {
            config.map_height = map_height;
        }
        if let Some(robots) = self.robots {
            config.robots = robots;
        }
        config.opt_mode |= self.opt_mode;
        config.vsync &= !self.no_vsync;
        config.show_fps |= self.show_fps;
    }
}

/// Entry point for the Labpyrinthe command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let mut config = LabConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate().context("invalid configuration")?;

    let skin = flat_skin::load_skin(&config)?;
    let publisher: MapPublisher<SceneHandle> =
        MapPublisher::new(config.publisher_config()?, skin)?;

    let mailbox = Mailbox::<GameMessage>::new();
    let (command_sender, command_receiver) = mpsc::channel();
    let engine = DemoEngine::new(config.demo_settings());
    let _engine = demo::spawn(
        engine,
        config.tick(),
        mailbox.sender(Channel::Game),
        command_receiver,
    );

    let mut session = Session::new(publisher, mailbox, command_sender);
    let presentation = Presentation::new(
        config.window_title.clone(),
        config.publisher_config()?.mask,
        config.window_size(),
    );
    tracing::info!(
        seed = config.seed,
        width = config.map_width,
        height = config.map_height,
        "starting demo match"
    );

    MacroquadBackend::new()
        .with_vsync(config.vsync)
        .with_show_fps(config.show_fps)
        .run(presentation, move |input, scene: &mut ImmediateScene| {
            session.frame(input, scene)
        })
}
