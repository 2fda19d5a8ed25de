use glam::{IVec2, UVec2, Vec2};
use labpyrinthe_core::CellCoord;

use crate::PixelRect;

/// Square-cell projection of the logical map onto the canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    canvas: UVec2,
    map: UVec2,
    cell_size: u32,
    origin: IVec2,
}

impl Viewport {
    /// Fits a `map` of cells into `canvas` pixels, centring it.
    ///
    /// The cell size is the largest that fits both axes, capped at
    /// `max_cell_size` and never below one pixel. Returns `None` while the
    /// canvas or the map has no area.
    #[must_use]
    pub fn compute(canvas: UVec2, map: UVec2, max_cell_size: u32) -> Option<Self> {
        if canvas.x == 0 || canvas.y == 0 || map.x == 0 || map.y == 0 {
            return None;
        }
        let cell_size = (canvas.x / map.x)
            .min(canvas.y / map.y)
            .min(max_cell_size)
            .max(1);
        let origin = IVec2::new(
            centred_offset(canvas.x, map.x, cell_size),
            centred_offset(canvas.y, map.y, cell_size),
        );
        Some(Self {
            canvas,
            map,
            cell_size,
            origin,
        })
    }

    /// Canvas size the viewport was computed for.
    #[must_use]
    pub const fn canvas(&self) -> UVec2 {
        self.canvas
    }

    /// Map size in cells.
    #[must_use]
    pub const fn map(&self) -> UVec2 {
        self.map
    }

    /// Pixel side of a cell.
    #[must_use]
    pub const fn cell_size(&self) -> u32 {
        self.cell_size
    }

    /// Pixel position of the map's top-left corner.
    #[must_use]
    pub const fn origin(&self) -> IVec2 {
        self.origin
    }

    /// Top-left pixel of a cell.
    #[must_use]
    pub fn case_to_pixel(&self, cell: CellCoord) -> IVec2 {
        self.grid_to_pixel(Vec2::new(cell.x() as f32, cell.y() as f32))
    }

    /// Pixel under a fractional grid position, rounded down.
    #[must_use]
    pub fn grid_to_pixel(&self, position: Vec2) -> IVec2 {
        (position * self.cell_size as f32 + self.origin.as_vec2())
            .floor()
            .as_ivec2()
    }

    /// Cell under a pixel, or `None` outside the map.
    #[must_use]
    pub fn pixel_to_case(&self, pixel: IVec2) -> Option<CellCoord> {
        let relative = pixel - self.origin;
        if relative.x < 0 || relative.y < 0 {
            return None;
        }
        let side = i32::try_from(self.cell_size).ok()?;
        let column = u32::try_from(relative.x / side).ok()?;
        let row = u32::try_from(relative.y / side).ok()?;
        (column < self.map.x && row < self.map.y).then(|| CellCoord::new(column, row))
    }

    /// Pixel area covered by the map.
    #[must_use]
    pub fn map_rect(&self) -> PixelRect {
        PixelRect::new(self.origin, self.map * self.cell_size)
    }

    /// Four rectangles covering the canvas outside the map: left, right, top
    /// and bottom.
    #[must_use]
    pub fn mask_rects(&self) -> [PixelRect; 4] {
        let map = self.map_rect();
        let canvas = self.canvas.as_ivec2();
        let start = map.origin.max(IVec2::ZERO);
        let end = (map.origin + map.size.as_ivec2()).min(canvas);
        let extent = |from: i32, to: i32| u32::try_from(to - from).unwrap_or(0);

        [
            PixelRect::new(IVec2::ZERO, UVec2::new(extent(0, start.x), self.canvas.y)),
            PixelRect::new(
                IVec2::new(end.x, 0),
                UVec2::new(extent(end.x, canvas.x), self.canvas.y),
            ),
            PixelRect::new(
                IVec2::new(start.x, 0),
                UVec2::new(extent(start.x, end.x), extent(0, start.y)),
            ),
            PixelRect::new(
                IVec2::new(start.x, end.y),
                UVec2::new(extent(start.x, end.x), extent(end.y, canvas.y)),
            ),
        ]
    }
}

/// `ceil((canvas - cells * cell_size) / 2)`, negative when the map overflows.
fn centred_offset(canvas: u32, cells: u32, cell_size: u32) -> i32 {
    let spare = i64::from(canvas) - i64::from(cells) * i64::from(cell_size);
    // Integer division truncates towards zero, which is a ceiling for negatives.
    let offset = if spare >= 0 { (spare + 1) / 2 } else { spare / 2 };
    i32::try_from(offset).unwrap_or(if offset < 0 { i32::MIN } else { i32::MAX })
}
