use image::{imageops, imageops::FilterType, RgbaImage};
use labpyrinthe_core::HexColor;

/// Filter used when resampling sources to cell size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResizeFilter {
    /// Blocky nearest-neighbour sampling.
    Nearest,
    /// High quality antialiased sampling.
    #[default]
    Antialias,
}

impl ResizeFilter {
    const fn filter_type(self) -> FilterType {
        match self {
            Self::Nearest => FilterType::Nearest,
            Self::Antialias => FilterType::Lanczos3,
        }
    }
}

/// Pixel operations the skin needs to derive variants from its sources.
pub trait RasterBackend {
    /// Replaces the colour of every non-transparent pixel.
    fn tint(&self, source: &RgbaImage, color: HexColor) -> RgbaImage {
        tint(source, color)
    }

    /// Sets the alpha of every non-transparent pixel.
    fn with_alpha(&self, source: &RgbaImage, alpha: u8) -> RgbaImage {
        override_alpha(source, alpha)
    }

    /// Alpha-composites `overlay` centred over `base`.
    fn compose(&self, base: &RgbaImage, overlay: &RgbaImage) -> RgbaImage {
        compose(base, overlay)
    }

    /// Scales `source` so its longest side equals `side`, keeping the aspect ratio.
    fn resample(&self, source: &RgbaImage, side: u32) -> RgbaImage;
}

/// Raster backend built on the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageRasterBackend {
    filter: ResizeFilter,
}

impl ImageRasterBackend {
    /// Creates a backend resampling with the provided filter.
    #[must_use]
    pub const fn new(filter: ResizeFilter) -> Self {
        Self { filter }
    }

    /// Filter used by [`RasterBackend::resample`].
    #[must_use]
    pub const fn filter(&self) -> ResizeFilter {
        self.filter
    }
}

impl RasterBackend for ImageRasterBackend {
    fn resample(&self, source: &RgbaImage, side: u32) -> RgbaImage {
        resample(source, side, self.filter)
    }
}

/// Replaces the colour of every non-transparent pixel, keeping alpha.
#[must_use]
pub fn tint(source: &RgbaImage, color: HexColor) -> RgbaImage {
    let mut tinted = source.clone();
    for pixel in tinted.pixels_mut() {
        if pixel[3] > 0 {
            pixel[0] = color.red();
            pixel[1] = color.green();
            pixel[2] = color.blue();
        }
    }
    tinted
}

/// Tints with a `#RRGGBB` code; `None` when the code is invalid.
#[must_use]
pub fn tint_hex(source: &RgbaImage, color: &str) -> Option<RgbaImage> {
    HexColor::parse(color).map(|color| tint(source, color))
}

/// Sets the alpha of every non-transparent pixel.
#[must_use]
pub fn override_alpha(source: &RgbaImage, alpha: u8) -> RgbaImage {
    let mut result = source.clone();
    for pixel in result.pixels_mut() {
        if pixel[3] > 0 {
            pixel[3] = alpha;
        }
    }
    result
}

/// Alpha-composites `overlay` centred over a copy of `base`.
#[must_use]
pub fn compose(base: &RgbaImage, overlay: &RgbaImage) -> RgbaImage {
    let mut result = base.clone();
    let x = (i64::from(base.width()) - i64::from(overlay.width())) / 2;
    let y = (i64::from(base.height()) - i64::from(overlay.height())) / 2;
    imageops::overlay(&mut result, overlay, x, y);
    result
}

/// Scales `source` so its longest side equals `side`.
#[must_use]
pub fn resample(source: &RgbaImage, side: u32, filter: ResizeFilter) -> RgbaImage {
    let (width, height) = source.dimensions();
    let longest = width.max(height).max(1);
    let side = side.max(1);
    let scaled = |extent: u32| -> u32 {
        let value = (u64::from(extent) * u64::from(side) + u64::from(longest) / 2) / u64::from(longest);
        u32::try_from(value).unwrap_or(u32::MAX).max(1)
    };
    imageops::resize(source, scaled(width), scaled(height), filter.filter_type())
}
