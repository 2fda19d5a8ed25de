use std::f32::consts::FRAC_1_SQRT_2;

use glam::Vec2;
use labpyrinthe_core::{CellCoord, HexColor, RobotListing};

use crate::{geometry::Viewport, PixelRect};

/// Rectangle in fractional grid units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridRect {
    /// Top-left corner.
    pub min: Vec2,
    /// Width and height.
    pub size: Vec2,
}

impl GridRect {
    /// Converts the rectangle to canvas pixels.
    #[must_use]
    pub fn to_pixels(&self, viewport: &Viewport) -> PixelRect {
        let min = viewport.grid_to_pixel(self.min);
        let max = viewport.grid_to_pixel(self.min + self.size);
        PixelRect::new(min, (max - min).max(glam::IVec2::ZERO).as_uvec2())
    }
}

/// Circle centred on a cell, sized from a move allowance.
///
/// A circle of `k` moves has radius `k·√2/2` cells: it passes through the
/// corners of the `k × k` square centred on the cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HighlightCircle {
    center: Vec2,
    radius: f32,
}

impl HighlightCircle {
    /// Circle around `cell` for an allowance of `moves` cells.
    #[must_use]
    pub fn around(cell: CellCoord, moves: u32) -> Self {
        Self {
            center: Vec2::new(cell.x() as f32 + 0.5, cell.y() as f32 + 0.5),
            radius: moves as f32 * FRAC_1_SQRT_2,
        }
    }

    /// Centre in grid units.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Radius in cells.
    #[must_use]
    pub const fn radius(&self) -> f32 {
        self.radius
    }

    /// Bounding square of the circle, `k·√2` cells wide.
    #[must_use]
    pub fn bounds(&self) -> GridRect {
        GridRect {
            min: self.center - Vec2::splat(self.radius),
            size: Vec2::splat(2.0 * self.radius),
        }
    }

    /// Square inscribed in the circle, `k` cells wide. For one move it is the
    /// robot's own cell.
    #[must_use]
    pub fn inscribed_square(&self) -> GridRect {
        let half = self.radius * FRAC_1_SQRT_2;
        GridRect {
            min: self.center - Vec2::splat(half),
            size: Vec2::splat(2.0 * half),
        }
    }
}

/// Player and action circles around the robot playing the active turn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Highlight {
    /// Circle around the robot's own cell.
    pub player: HighlightCircle,
    /// Circle reaching as far as the turn allows.
    pub action: HighlightCircle,
    /// Outline colour, the robot's colour.
    pub color: HexColor,
}

impl Highlight {
    /// Highlight for the active robot of a listing, or `None` when no robot
    /// is playing or the active one is dead.
    #[must_use]
    pub fn for_listing(listing: &RobotListing) -> Option<Self> {
        let gamble = listing.gamble?;
        let case = listing.active_robot()?;
        let robot = case.robot().filter(|robot| robot.alive)?;
        Some(Self {
            player: HighlightCircle::around(case.cell(), 1),
            action: HighlightCircle::around(case.cell(), gamble.total_coups),
            color: robot.color,
        })
    }
}
