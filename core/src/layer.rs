use serde::{Deserialize, Serialize};

use crate::case::TypeCase;

/// Whether a layer holds case-backed images or a fixed set of shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Small fixed set of vector shapes.
    Shape,
    /// Keyed index of case-backed images.
    Image,
}

/// Named slice of the scene, stacked by ascending z.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayerName {
    /// Map background rectangle.
    ShapeBg,
    /// Walls, floor, doors and exits.
    BaseCaseLayer,
    /// Mines.
    Danger,
    /// Bonuses.
    Bonus,
    /// Robot zones of influence.
    ZoneRobot,
    /// Circles around the gambling robot.
    ShapeHighlightRobot,
    /// Robots.
    Robot,
    /// Grenades in flight.
    Grenade,
    /// Animation frames.
    Animation,
    /// Aim markers.
    Target,
    /// Debug markers.
    Debug,
    /// Viewport clip mask.
    ShapeMask,
}

impl LayerName {
    /// Every layer ordered by ascending z.
    pub const ALL: [Self; 12] = [
        Self::ShapeBg,
        Self::BaseCaseLayer,
        Self::Danger,
        Self::Bonus,
        Self::ZoneRobot,
        Self::ShapeHighlightRobot,
        Self::Robot,
        Self::Grenade,
        Self::Animation,
        Self::Target,
        Self::Debug,
        Self::ShapeMask,
    ];

    /// Stacking index of the layer; higher layers are painted last.
    #[must_use]
    pub const fn z(&self) -> u8 {
        match self {
            Self::ShapeBg => 0,
            Self::BaseCaseLayer => 1,
            Self::Danger => 2,
            Self::Bonus => 3,
            Self::ZoneRobot => 4,
            Self::ShapeHighlightRobot => 5,
            Self::Robot => 6,
            Self::Grenade => 7,
            Self::Animation => 8,
            Self::Target => 9,
            Self::Debug => 10,
            Self::ShapeMask => 11,
        }
    }

    /// Whether the layer holds shapes or images.
    #[must_use]
    pub const fn kind(&self) -> LayerKind {
        match self {
            Self::ShapeBg | Self::ShapeHighlightRobot | Self::ShapeMask => LayerKind::Shape,
            _ => LayerKind::Image,
        }
    }

    /// Layer receiving cases of the provided type.
    #[must_use]
    pub const fn for_type(type_case: TypeCase) -> Self {
        match type_case {
            TypeCase::WallPerimeter
            | TypeCase::Wall
            | TypeCase::Void
            | TypeCase::Door
            | TypeCase::Sortie => Self::BaseCaseLayer,
            TypeCase::Danger => Self::Danger,
            TypeCase::Bonus => Self::Bonus,
            TypeCase::ZoneRobot => Self::ZoneRobot,
            TypeCase::Robot => Self::Robot,
            TypeCase::Grenade => Self::Grenade,
            TypeCase::Animation => Self::Animation,
            TypeCase::Target => Self::Target,
            TypeCase::Debug => Self::Debug,
        }
    }
}
