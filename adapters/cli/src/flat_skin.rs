//! Skin generated in memory, used when no skin directory is configured.

use std::path::PathBuf;

use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use labpyrinthe_skin::{Category, ImageRasterBackend, SkinConfig, SkinLayout, SkinStore};

use crate::config::LabConfig;

/// Loads the configured skin, falling back to the generated one.
pub(crate) fn load_skin(config: &LabConfig) -> Result<SkinStore> {
    match config.skin_config() {
        Some(skin) => SkinStore::load(&skin)
            .with_context(|| format!("failed to load skin from {}", skin.root.display())),
        None => {
            tracing::info!("no skin configured, drawing flat shapes");
            Ok(flat_skin(config.opt_mode, config.max_cell_size))
        }
    }
}

fn flat_skin(opt_mode: bool, max_cell_size: u32) -> SkinStore {
    let side = if max_cell_size <= 40 { 40 } else { 80 };
    let layout = SkinLayout::new(&SkinConfig {
        root: PathBuf::new(),
        opt_mode,
        max_cell_size,
    });
    let mut store = SkinStore::new(ImageRasterBackend::default(), opt_mode);
    let names = layout
        .required_carte_assets()
        .into_iter()
        .chain(layout.optional_carte_assets())
        .map(|(name, _)| name);
    for name in names {
        if let Some(image) = draw_asset(&name, side) {
            store.insert(Category::Carte, name, image);
        }
    }
    store
}

fn draw_asset(name: &str, side: u32) -> Option<RgbaImage> {
    let image = match name {
        "mur_ext" => square(side, [52, 54, 66, 255]),
        "mur" => square(side, [104, 108, 124, 255]),
        "vide" => square(side, [226, 222, 208, 255]),
        "porte" => square(side, [150, 102, 56, 255]),
        "sortie" => square(side, [72, 168, 96, 255]),
        "bonus" => disc(side, 0.25, [240, 200, 40, 255]),
        "cible" => ring(side, 0.4, 0.1, [220, 40, 40, 255]),
        "grenade" => disc(side, 0.2, [40, 48, 40, 255]),
        "zone" => square(side, [255, 255, 255, 255]),
        _ => return draw_numbered(name, side),
    };
    Some(image)
}

fn draw_numbered(name: &str, side: u32) -> Option<RgbaImage> {
    if let Some(power) = name.strip_prefix("mine_") {
        let power: f32 = power.parse().ok()?;
        return Some(disc(side, 0.1 + power / 100.0, [200, 30, 30, 255]));
    }
    if let Some(frame) = name.strip_prefix("explosion_") {
        let frame: f32 = frame.parse().ok()?;
        return Some(disc(side, 0.1 * frame, [250, 140, 20, 220]));
    }
    if let Some(digit) = name.strip_prefix("number_") {
        let digit: u32 = digit.parse().ok()?;
        return Some(tally(side, digit));
    }
    if let Some(face) = name.strip_prefix("debug") {
        let face: f32 = face.parse().ok()?;
        return Some(ring(side, 0.15 * face, 0.05, [220, 0, 220, 255]));
    }
    if name.ends_with("_bg") {
        return Some(disc(side, 0.38, [255, 255, 255, 255]));
    }
    if name.ends_with("_fil") {
        return Some(ring(side, 0.42, 0.06, [20, 20, 20, 255]));
    }
    None
}

fn square(side: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(side, side, Rgba(color))
}

fn disc(side: u32, radius: f32, color: [u8; 4]) -> RgbaImage {
    ring(side, radius, radius, color)
}

/// Annulus centred in the cell; radii are fractions of the side.
fn ring(side: u32, radius: f32, width: f32, color: [u8; 4]) -> RgbaImage {
    let outer = radius * side as f32;
    let inner = (radius - width) * side as f32;
    let centre = side as f32 / 2.0;
    RgbaImage::from_fn(side, side, |x, y| {
        let dx = x as f32 + 0.5 - centre;
        let dy = y as f32 + 0.5 - centre;
        let distance = (dx * dx + dy * dy).sqrt();
        if distance <= outer && distance >= inner {
            Rgba(color)
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

/// `count` vertical bars across the middle of the cell.
fn tally(side: u32, count: u32) -> RgbaImage {
    let slot = (side / (count * 2 + 1)).max(1);
    let top = side / 3;
    let bottom = side - side / 3;
    RgbaImage::from_fn(side, side, |x, y| {
        let bar = x / slot;
        let drawn = y >= top && y < bottom && bar % 2 == 1 && bar < count * 2 + 1;
        if drawn {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}
