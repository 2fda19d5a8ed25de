use image::RgbaImage;
use labpyrinthe_core::HexColor;

use crate::raster::RasterBackend;

/// Visual state of a button.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ButtonState {
    /// Idle.
    Unselected,
    /// Hovered by the pointer.
    Over,
    /// Held down.
    Pressed,
    /// Toggled on.
    Selected,
    /// Not actionable.
    Disabled,
}

impl ButtonState {
    /// Every state, in palette order.
    pub const ALL: [Self; 5] = [
        Self::Unselected,
        Self::Over,
        Self::Pressed,
        Self::Selected,
        Self::Disabled,
    ];

    /// Suffix used in asset names.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Unselected => "unselected",
            Self::Over => "over",
            Self::Pressed => "pressed",
            Self::Selected => "selected",
            Self::Disabled => "disabled",
        }
    }

    /// Parses a state suffix; `None` for anything else.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|state| state.name() == name)
    }

    const fn index(self) -> usize {
        match self {
            Self::Unselected => 0,
            Self::Over => 1,
            Self::Pressed => 2,
            Self::Selected => 3,
            Self::Disabled => 4,
        }
    }
}

/// Body and border colours of a button for every state.
///
/// A `None` entry leaves the matching glyph out of that state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonPalette {
    bg: [Option<HexColor>; 5],
    bd: [Option<HexColor>; 5],
}

impl ButtonPalette {
    /// Creates a palette from per-state body and border colours.
    #[must_use]
    pub const fn new(bg: [Option<HexColor>; 5], bd: [Option<HexColor>; 5]) -> Self {
        Self { bg, bd }
    }

    /// Body colour for a state.
    #[must_use]
    pub const fn bg_color(&self, state: ButtonState) -> Option<HexColor> {
        self.bg[state.index()]
    }

    /// Border colour for a state.
    #[must_use]
    pub const fn bd_color(&self, state: ButtonState) -> Option<HexColor> {
        self.bd[state.index()]
    }

    /// Renders one state from the body and border masks.
    ///
    /// The result is a transparent canvas of the body's size with the tinted
    /// body underneath the tinted border.
    pub fn synthesize<R: RasterBackend>(
        &self,
        body: &RgbaImage,
        border: &RgbaImage,
        state: ButtonState,
        raster: &R,
    ) -> RgbaImage {
        let mut canvas = RgbaImage::new(body.width(), body.height());
        if let Some(color) = self.bg_color(state) {
            canvas = raster.compose(&canvas, &raster.tint(body, color));
        }
        if let Some(color) = self.bd_color(state) {
            canvas = raster.compose(&canvas, &raster.tint(border, color));
        }
        canvas
    }
}

const fn hex(value: u32) -> Option<HexColor> {
    Some(HexColor::from_rgb_u32(value))
}

/// Families of buttons sharing one palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PaletteSet {
    /// Game action buttons (`btns_cmd`).
    Command,
    /// Menu, quit, help and fullscreen (`btns_glb`).
    Global,
    /// The start button (`btns_alt`).
    Alternate,
}

impl PaletteSet {
    /// Buttons drawn with the global palette.
    pub const GLOBAL_BUTTONS: [&'static str; 4] = ["menu", "quit", "help", "fullscreen"];
    /// Buttons drawn with the alternate palette.
    pub const ALTERNATE_BUTTONS: [&'static str; 1] = ["start"];

    /// Palette of the set.
    #[must_use]
    pub const fn palette(&self) -> ButtonPalette {
        match self {
            Self::Command => ButtonPalette::new(
                [hex(0x2b2b2b), hex(0x3c3c3c), hex(0x1e1e1e), hex(0x3cb44b), hex(0x2b2b2b)],
                [hex(0x808080), hex(0xffffff), hex(0xffe119), hex(0xffffff), None],
            ),
            Self::Global => ButtonPalette::new(
                [None, hex(0x3c3c3c), hex(0x1e1e1e), hex(0x4363d8), None],
                [hex(0xd0d0d0), hex(0xffffff), hex(0xffe119), hex(0xffffff), hex(0x606060)],
            ),
            Self::Alternate => ButtonPalette::new(
                [hex(0x3cb44b), hex(0x50c878), hex(0x228b22), hex(0x3cb44b), hex(0x606060)],
                [hex(0xffffff), hex(0xffffff), hex(0xffe119), hex(0xffe119), hex(0x808080)],
            ),
        }
    }

    /// Set a button belongs to, by name.
    #[must_use]
    pub fn for_button(name: &str) -> Self {
        if Self::GLOBAL_BUTTONS.contains(&name) {
            Self::Global
        } else if Self::ALTERNATE_BUTTONS.contains(&name) {
            Self::Alternate
        } else {
            Self::Command
        }
    }
}
