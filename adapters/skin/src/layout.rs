use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use image::RgbaImage;
use labpyrinthe_core::{Behavior, DEFAULT_MAX_CELL_SIZE, POWER_LEVELS};

use crate::{
    raster::{ImageRasterBackend, RasterBackend},
    store::SkinStore,
    Category, SkinError,
};

/// Number of player digits shipped with a skin.
const HUMAN_DIGITS: u8 = 10;
/// Number of explosion frames shipped with a skin.
const EXPLOSION_FRAMES: u8 = 5;

/// Tiles every skin must provide.
const TILES: [&str; 8] = [
    "mur_ext", "mur", "vide", "porte", "bonus", "cible", "sortie", "grenade",
];

/// Where and how to load a skin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkinConfig {
    /// Root directory of the skin.
    pub root: PathBuf,
    /// Whether robot sprites are flattened onto opaque tiles.
    pub opt_mode: bool,
    /// Largest cell size the map will be drawn at.
    pub max_cell_size: u32,
}

impl SkinConfig {
    /// Creates a configuration for the skin rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            opt_mode: false,
            max_cell_size: DEFAULT_MAX_CELL_SIZE,
        }
    }
}

/// Resolved directory layout of a skin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkinLayout {
    root: PathBuf,
    carte: PathBuf,
    explosions: PathBuf,
}

impl SkinLayout {
    /// Resolves the directories used by a configuration.
    ///
    /// The 40 pixel carte set serves maps capped at 40 pixels per cell; the 80
    /// pixel set serves anything larger.
    #[must_use]
    pub fn new(config: &SkinConfig) -> Self {
        let resolution = if config.max_cell_size <= 40 { "40" } else { "80" };
        let alpha = if config.opt_mode { "no_alpha" } else { "alpha" };
        let carte = config.root.join("carte");
        Self {
            root: config.root.clone(),
            explosions: carte.join("explosions").join(resolution),
            carte: carte.join(alpha).join(resolution),
        }
    }

    /// Skin root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of the map tiles and robot layers.
    #[must_use]
    pub fn carte_dir(&self) -> &Path {
        &self.carte
    }

    /// Directory of the explosion frames.
    #[must_use]
    pub fn explosions_dir(&self) -> &Path {
        &self.explosions
    }

    /// Directory holding the button body and border masks.
    #[must_use]
    pub fn buttons_dir(&self) -> PathBuf {
        self.root.join("btns")
    }

    /// Directory scanned for a flat category, `None` for categories that are
    /// assembled rather than scanned.
    #[must_use]
    pub fn category_dir(&self, category: Category) -> Option<PathBuf> {
        let dir = match category {
            Category::Common => self.root.join("common"),
            Category::Accueil => self.root.join("accueil"),
            Category::Screens => self.root.join("screens").join("jauge"),
            Category::Loading => self.root.join("loading"),
            Category::Bots => self.root.join("bots"),
            Category::Net => self.root.join("net"),
            Category::Nav | Category::Carte => return None,
        };
        Some(dir)
    }

    /// Carte assets that must exist, with their expected paths.
    #[must_use]
    pub fn required_carte_assets(&self) -> Vec<(String, PathBuf)> {
        let mut names: Vec<String> = TILES.iter().map(|name| (*name).to_owned()).collect();
        names.extend(POWER_LEVELS.iter().map(|power| format!("mine_{power}")));
        for behavior in Behavior::ALL {
            names.push(format!("{}_bg", behavior.sprite_base()));
            names.push(format!("{}_fil", behavior.sprite_base()));
        }
        names.extend((1..=HUMAN_DIGITS).map(|digit| format!("number_{digit}")));

        let mut assets: Vec<(String, PathBuf)> = names
            .into_iter()
            .map(|name| {
                let path = self.carte.join(format!("{name}.png"));
                (name, path)
            })
            .collect();
        assets.extend((1..=EXPLOSION_FRAMES).map(|frame| {
            let name = format!("explosion_{frame}");
            let path = self.explosions.join(format!("{name}.png"));
            (name, path)
        }));
        assets
    }

    /// Carte assets loaded when present.
    #[must_use]
    pub fn optional_carte_assets(&self) -> Vec<(String, PathBuf)> {
        ["zone", "debug1", "debug2", "debug3"]
            .into_iter()
            .map(|name| (name.to_owned(), self.carte.join(format!("{name}.png"))))
            .collect()
    }
}

/// Decodes a png from disk; `Ok(None)` when the file does not exist.
fn read_png(path: &Path) -> Result<Option<RgbaImage>> {
    if !path.is_file() {
        return Ok(None);
    }
    let image = image::open(path).with_context(|| format!("failed to decode {}", path.display()))?;
    Ok(Some(image.to_rgba8()))
}

/// Png stems of a directory, sorted; empty when the directory is absent.
fn png_stems(dir: &Path) -> Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "skin directory absent");
            return Ok(Vec::new());
        }
        Err(error) => {
            return Err(error).with_context(|| format!("failed to list {}", dir.display()));
        }
    };

    let mut stems = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to list {}", dir.display()))?
            .path();
        if path.extension().is_some_and(|extension| extension == "png") {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                stems.push(stem.to_owned());
            }
        }
    }
    stems.sort();
    Ok(stems)
}

impl SkinStore<ImageRasterBackend> {
    /// Loads a skin from disk.
    ///
    /// # Errors
    ///
    /// Fails when the root is not a directory, a required asset is missing or
    /// a png cannot be decoded. The error names the offending path.
    pub fn load(config: &SkinConfig) -> Result<Self> {
        if !config.root.is_dir() {
            return Err(SkinError::InvalidRoot {
                path: config.root.clone(),
            }
            .into());
        }
        Self::load_with_loader(config, ImageRasterBackend::default(), read_png)
    }
}

impl<R: RasterBackend> SkinStore<R> {
    /// Loads a skin, decoding every png through `loader`.
    ///
    /// The loader returns `Ok(None)` for files that do not exist. Flat
    /// categories and buttons are discovered by listing their directories;
    /// absent directories contribute nothing.
    ///
    /// # Errors
    ///
    /// Fails when a required asset is missing, a button lacks its border, a
    /// directory cannot be listed or the loader fails.
    pub fn load_with_loader<F>(config: &SkinConfig, raster: R, mut loader: F) -> Result<Self>
    where
        F: FnMut(&Path) -> Result<Option<RgbaImage>>,
    {
        let layout = SkinLayout::new(config);
        let mut store = Self::new(raster, config.opt_mode);

        for (name, path) in layout.required_carte_assets() {
            let image = loader(&path)?.ok_or(SkinError::MissingAsset { path })?;
            store.insert(Category::Carte, name, image);
        }
        for (name, path) in layout.optional_carte_assets() {
            match loader(&path)? {
                Some(image) => store.insert(Category::Carte, name, image),
                None => tracing::debug!(path = %path.display(), "optional skin asset absent"),
            }
        }

        for category in Category::ALL {
            let Some(dir) = layout.category_dir(category) else {
                continue;
            };
            for stem in png_stems(&dir)? {
                let path = dir.join(format!("{stem}.png"));
                let image = loader(&path)?.ok_or(SkinError::MissingAsset { path })?;
                store.insert(category, stem, image);
            }
        }

        let buttons = layout.buttons_dir();
        for stem in png_stems(&buttons)? {
            let Some(name) = stem.strip_suffix("_body") else {
                continue;
            };
            let body_path = buttons.join(format!("{stem}.png"));
            let border_path = buttons.join(format!("{name}_border.png"));
            let body = loader(&body_path)?.ok_or(SkinError::MissingAsset { path: body_path })?;
            let border = loader(&border_path)?.ok_or(SkinError::MissingAsset { path: border_path })?;
            store.install_buttons(name, &body, &border);
        }

        for category in Category::ALL {
            tracing::debug!(%category, assets = store.count(category), "skin category loaded");
        }
        tracing::info!(
            root = %layout.root().display(),
            assets = store.len(),
            opt_mode = config.opt_mode,
            "skin loaded"
        );
        Ok(store)
    }
}
