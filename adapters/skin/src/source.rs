use std::{collections::HashMap, sync::Arc};

use image::RgbaImage;

use crate::{raster::RasterBackend, Raster};

/// Immutable source raster with its memoised per-size exports.
#[derive(Clone, Debug)]
pub struct ImageSource {
    native: Raster,
    exports: HashMap<u32, Raster>,
}

impl ImageSource {
    /// Wraps a decoded raster.
    #[must_use]
    pub fn new(native: RgbaImage) -> Self {
        Self {
            native: Arc::new(native),
            exports: HashMap::new(),
        }
    }

    /// Raster at its native resolution.
    #[must_use]
    pub fn native(&self) -> &Raster {
        &self.native
    }

    /// Longest side of the native raster in pixels.
    #[must_use]
    pub fn native_side(&self) -> u32 {
        self.native.width().max(self.native.height())
    }

    /// Raster whose longest side equals `size`, or the native raster when
    /// `size` is `None` or not smaller than the native side.
    ///
    /// Each size is resampled once; later calls return the same handle.
    pub fn at_size<R: RasterBackend>(&mut self, size: Option<u32>, raster: &R) -> Raster {
        let native_side = self.native_side();
        let side = match size {
            Some(side) if side > 0 && side < native_side => side,
            _ => return Arc::clone(&self.native),
        };
        let native = &self.native;
        Arc::clone(
            self.exports
                .entry(side)
                .or_insert_with(|| Arc::new(raster.resample(native, side))),
        )
    }

    /// Number of memoised exports.
    #[must_use]
    pub fn export_count(&self) -> usize {
        self.exports.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{ImageRasterBackend, ResizeFilter};

    #[test]
    fn exports_are_memoised_per_size() {
        let raster = ImageRasterBackend::new(ResizeFilter::Nearest);
        let mut source = ImageSource::new(RgbaImage::new(40, 40));

        let first = source.at_size(Some(20), &raster);
        let second = source.at_size(Some(20), &raster);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.dimensions(), (20, 20));
        assert_eq!(source.export_count(), 1);
    }

    #[test]
    fn sources_are_never_upscaled() {
        let raster = ImageRasterBackend::default();
        let mut source = ImageSource::new(RgbaImage::new(40, 40));

        let larger = source.at_size(Some(80), &raster);
        assert!(Arc::ptr_eq(&larger, source.native()));
        let unsized_ = source.at_size(None, &raster);
        assert!(Arc::ptr_eq(&unsized_, source.native()));
        assert_eq!(source.export_count(), 0);
    }
}
