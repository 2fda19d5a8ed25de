use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use anyhow::{Context, Result};
use labpyrinthe_skin::Raster;
use macroquad::texture::{FilterMode, Texture2D};

/// GPU copies of the rasters drawn during recent frames.
///
/// Rasters are immutable and shared, so the allocation address identifies
/// the pixels. Each entry keeps its raster alive, which stops the address
/// from being reused while the texture exists.
#[derive(Debug, Default)]
pub(crate) struct TextureCache {
    entries: HashMap<usize, (Raster, Texture2D)>,
    used: HashSet<usize>,
}

impl TextureCache {
    /// Returns the texture for a raster, uploading it on first use.
    pub(crate) fn texture(&mut self, raster: &Raster) -> Result<Texture2D> {
        let key = Arc::as_ptr(raster) as usize;
        let _ = self.used.insert(key);
        if let Some((_, texture)) = self.entries.get(&key) {
            return Ok(*texture);
        }

        let width = u16::try_from(raster.width())
            .with_context(|| format!("raster width {} exceeds texture limits", raster.width()))?;
        let height = u16::try_from(raster.height()).with_context(|| {
            format!("raster height {} exceeds texture limits", raster.height())
        })?;
        let texture = Texture2D::from_rgba8(width, height, raster.as_raw());
        texture.set_filter(FilterMode::Nearest);
        let _ = self.entries.insert(key, (Arc::clone(raster), texture));
        Ok(texture)
    }

    /// Releases textures no drawn node referenced since the last call.
    pub(crate) fn end_frame(&mut self) {
        let used = &self.used;
        self.entries.retain(|key, (_, texture)| {
            let keep = used.contains(key);
            if !keep {
                texture.delete();
            }
            keep
        });
        self.used.clear();
    }
}
