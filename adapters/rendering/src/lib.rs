#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Map publication pipeline and rendering contracts for Labpyrinthe adapters.
//!
//! [`MapPublisher`] turns full map payloads and per-tick change logs into a
//! layered scene of cell-sized items hosted by a [`SceneBackend`]. Item
//! identity survives across ticks: robots and grenades are keyed by their
//! identifiers, everything else by grid coordinate. Backends only need to
//! honour the layer passed to [`SceneBackend::raise_to_layer`] for the
//! painter's order to match ascending layer z.

mod geometry;
mod highlight;
mod mailbox;
mod pipeline;
mod resize;
mod retained;
mod scene;

use anyhow::Result as AnyResult;
use glam::{IVec2, UVec2};
use labpyrinthe_core::{HexColor, LayerName};
use labpyrinthe_skin::Raster;
use std::{error::Error, fmt, hash::Hash, time::Duration};

pub use geometry::Viewport;
pub use highlight::{GridRect, Highlight, HighlightCircle};
pub use mailbox::{Channel, Mailbox, MailboxSender};
pub use pipeline::{AnimationResolution, MapPublisher, PublishStats, PublisherConfig};
pub use resize::ResizeCoordinator;
pub use retained::{NodeId, NodeView, RetainedCanvas};
pub use scene::{Item, ItemKey, SceneModel, ShapeLayers};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Creates an opaque color from a hex colour.
    #[must_use]
    pub fn from_hex(color: HexColor) -> Self {
        Self::from_rgb_u8(color.red(), color.green(), color.blue())
    }
}

/// Axis-aligned rectangle in canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct PixelRect {
    /// Top-left corner.
    pub origin: IVec2,
    /// Width and height.
    pub size: UVec2,
}

impl PixelRect {
    /// Creates a rectangle from its corner and size.
    #[must_use]
    pub const fn new(origin: IVec2, size: UVec2) -> Self {
        Self { origin, size }
    }

    /// Whether the rectangle covers no pixel.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size.x == 0 || self.size.y == 0
    }
}

/// Vector element hosted by a shape layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Filled rectangle.
    Rect {
        /// Covered area.
        rect: PixelRect,
        /// Fill colour.
        fill: Color,
    },
    /// Outlined circle inscribed in `bounds`.
    Circle {
        /// Bounding square of the circle.
        bounds: PixelRect,
        /// Outline colour.
        outline: Color,
        /// Outline width in pixels.
        width: f32,
    },
}

/// Renderer-facing scene graph hosting the published items.
///
/// Every mutation happens on the UI loop. Handles stay valid until passed to
/// [`SceneBackend::destroy`].
pub trait SceneBackend {
    /// Opaque identifier of a hosted node.
    type Handle: Copy + Eq + Hash + fmt::Debug;

    /// Current canvas size in pixels.
    fn canvas_size(&self) -> UVec2;

    /// Creates a visible image node on top of its own layer.
    fn create_image(&mut self, layer: LayerName, image: Option<Raster>, position: IVec2)
        -> Self::Handle;

    /// Swaps the raster shown by an image node.
    fn set_image(&mut self, handle: Self::Handle, image: Option<Raster>);

    /// Creates a visible shape node on top of its own layer.
    fn create_shape(&mut self, layer: LayerName, shape: Shape) -> Self::Handle;

    /// Replaces the geometry of a shape node.
    fn set_shape(&mut self, handle: Self::Handle, shape: Shape);

    /// Moves the top-left corner of a node.
    fn move_to(&mut self, handle: Self::Handle, position: IVec2);

    /// Shows or hides a node.
    fn set_visible(&mut self, handle: Self::Handle, visible: bool);

    /// Restacks a node so it paints above every node of lower layers and below
    /// every node of higher layers.
    fn raise_to_layer(&mut self, handle: Self::Handle, layer: LayerName);

    /// Removes a node.
    fn destroy(&mut self, handle: Self::Handle);
}

/// Static description of the window hosting the map.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title of the window.
    pub window_title: String,
    /// Colour used to clear the frame before drawing.
    pub clear_color: Color,
    /// Initial window size in pixels.
    pub window_size: UVec2,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, window_size: UVec2) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            window_size,
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Time elapsed since the previous frame.
    pub dt: Duration,
    /// Canvas size observed this frame.
    pub canvas_size: UVec2,
    /// Pixel clicked this frame, if any.
    pub click: Option<IVec2>,
}

/// Whether the loop keeps running after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Render the next frame.
    Continue,
    /// Leave the loop.
    Exit,
}

/// Rendering backend driving the UI loop.
pub trait RenderingBackend {
    /// Scene backend owned by the loop.
    type Scene: SceneBackend;

    /// Runs the loop until the update closure or the user asks to exit.
    ///
    /// The closure runs once per frame at the loop's idle boundary, before the
    /// scene is drawn, and may publish into the scene.
    fn run<F>(self, presentation: Presentation, update: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut Self::Scene) -> FrameControl + 'static;
}

/// Errors that can occur when configuring the publisher.
#[derive(Debug, PartialEq, Eq)]
pub enum RenderingError {
    /// The cell size cap must be positive to avoid zero-sized cells.
    InvalidMaxCellSize {
        /// Provided cap that failed validation.
        max_cell_size: u32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMaxCellSize { max_cell_size } => {
                write!(
                    f,
                    "max_cell_size must be positive (received {max_cell_size})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
