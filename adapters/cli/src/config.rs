use std::{fs, path::Path, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use glam::UVec2;
use labpyrinthe_core::{HexColor, DEFAULT_MAX_CELL_SIZE};
use labpyrinthe_rendering::{AnimationResolution, Color, PublisherConfig};
use labpyrinthe_skin::SkinConfig;
use serde::Deserialize;

use crate::demo::DemoSettings;

/// How animated moves are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Resolution {
    /// Robots jump from cell to cell.
    #[default]
    Cell,
    /// An external animator interpolates positions.
    Pixel,
}

impl From<Resolution> for AnimationResolution {
    fn from(value: Resolution) -> Self {
        match value {
            Resolution::Cell => Self::Cell,
            Resolution::Pixel => Self::Pixel,
        }
    }
}

/// Settings read from the optional TOML file, then overridden by flags.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LabConfig {
    /// Skin directory; a generated flat skin is used when absent.
    pub(crate) skin_root: Option<PathBuf>,
    pub(crate) max_cell_size: u32,
    pub(crate) opt_mode: bool,
    pub(crate) animation_resolution: Resolution,
    pub(crate) background_color: String,
    pub(crate) mask_color: String,
    pub(crate) window_title: String,
    pub(crate) window_width: u32,
    pub(crate) window_height: u32,
    pub(crate) tick_millis: u64,
    pub(crate) seed: u64,
    pub(crate) map_width: u32,
    pub(crate) map_height: u32,
    pub(crate) robots: u32,
    pub(crate) vsync: bool,
    pub(crate) show_fps: bool,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            skin_root: None,
            max_cell_size: DEFAULT_MAX_CELL_SIZE,
            opt_mode: false,
            animation_resolution: Resolution::Cell,
            background_color: "#000000".to_owned(),
            mask_color: "#181818".to_owned(),
            window_title: "Labpyrinthe".to_owned(),
            window_width: 960,
            window_height: 720,
            tick_millis: 400,
            seed: 0x1ab,
            map_width: 21,
            map_height: 15,
            robots: 4,
            vsync: true,
            show_fps: false,
        }
    }
}

impl LabConfig {
    /// Reads the configuration file, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration at {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("invalid configuration at {}", path.display()))
    }

    pub(crate) fn from_toml(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse configuration toml contents")?;
        Ok(config)
    }

    /// Rejects settings no map could be drawn or played with.
    pub(crate) fn validate(&self) -> Result<()> {
        ensure!(self.max_cell_size > 0, "max_cell_size must be positive");
        ensure!(
            self.map_width >= 3 && self.map_height >= 3,
            "the map needs at least 3x3 cells (got {}x{})",
            self.map_width,
            self.map_height
        );
        ensure!(self.robots > 0, "at least one robot is required");
        ensure!(
            self.robots < (self.map_width - 2) * (self.map_height - 2),
            "{} robots do not fit a {}x{} map",
            self.robots,
            self.map_width,
            self.map_height
        );
        ensure!(self.tick_millis > 0, "tick_millis must be positive");
        Ok(())
    }

    pub(crate) fn publisher_config(&self) -> Result<PublisherConfig> {
        Ok(PublisherConfig {
            max_cell_size: self.max_cell_size,
            animation_resolution: self.animation_resolution.into(),
            background: parse_color(&self.background_color, "background_color")?,
            mask: parse_color(&self.mask_color, "mask_color")?,
        })
    }

    pub(crate) fn skin_config(&self) -> Option<SkinConfig> {
        self.skin_root.as_ref().map(|root| SkinConfig {
            root: root.clone(),
            opt_mode: self.opt_mode,
            max_cell_size: self.max_cell_size,
        })
    }

    pub(crate) fn demo_settings(&self) -> DemoSettings {
        DemoSettings {
            width: self.map_width,
            height: self.map_height,
            robots: self.robots,
            seed: self.seed,
        }
    }

    pub(crate) fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }

    pub(crate) fn window_size(&self) -> UVec2 {
        UVec2::new(self.window_width, self.window_height)
    }
}

fn parse_color(value: &str, field: &str) -> Result<Color> {
    let color = HexColor::parse(value)
        .with_context(|| format!("{field} `{value}` is not a #RRGGBB colour"))?;
    Ok(Color::from_hex(color))
}
