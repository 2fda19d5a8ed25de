#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Skin resource store for Labpyrinthe.
//!
//! The store loads every source raster once at startup, synthesises the
//! derived variants (button states, tinted robots, zones) on demand and
//! memoises one resample per requested size. Cached rasters are immutable and
//! shared through [`Raster`] handles, so two lookups of the same variant
//! return pointer-equal handles. Callers rely on that to skip redundant
//! image swaps.
//!
//! Lookups on the hot path never fail loudly: a missing asset yields `None`
//! and the caller draws nothing for that cell.

mod buttons;
mod layout;
mod raster;
mod source;
mod store;

use std::{fmt, path::PathBuf, sync::Arc};

pub use buttons::{ButtonPalette, ButtonState, PaletteSet};
pub use layout::{SkinConfig, SkinLayout};
pub use raster::{
    compose, override_alpha, resample, tint, tint_hex, ImageRasterBackend, RasterBackend,
    ResizeFilter,
};
pub use source::ImageSource;
pub use store::{SkinStore, ZONE_ALPHA};

/// Immutable RGBA raster shared between the cache and the renderer.
pub type Raster = Arc<image::RgbaImage>;

/// Flat asset namespaces of a skin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Assets shared by every screen.
    Common,
    /// Welcome screen artwork.
    Accueil,
    /// Navigation and command buttons, one entry per state.
    Nav,
    /// Robot portraits for the robot list.
    Bots,
    /// Screen decorations and gauges.
    Screens,
    /// Loading animation.
    Loading,
    /// Map tiles and composed robot sprites.
    Carte,
    /// Network status arrows.
    Net,
}

impl Category {
    /// Every category.
    pub const ALL: [Self; 8] = [
        Self::Common,
        Self::Accueil,
        Self::Nav,
        Self::Bots,
        Self::Screens,
        Self::Loading,
        Self::Carte,
        Self::Net,
    ];

    /// Lowercase name of the category.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Accueil => "accueil",
            Self::Nav => "nav",
            Self::Bots => "bots",
            Self::Screens => "screens",
            Self::Loading => "loading",
            Self::Carte => "carte",
            Self::Net => "net",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failures raised while loading a skin from disk.
#[derive(Debug, thiserror::Error)]
pub enum SkinError {
    /// A required asset is absent.
    #[error("missing skin asset {}", path.display())]
    MissingAsset {
        /// Expected location of the asset.
        path: PathBuf,
    },
    /// The skin root is not a directory.
    #[error("skin root {} is not a directory", path.display())]
    InvalidRoot {
        /// Configured root.
        path: PathBuf,
    },
}
