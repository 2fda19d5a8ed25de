use std::fmt;

use serde::{Deserialize, Serialize};

/// Impact levels accepted for grenades and mines.
pub const POWER_LEVELS: [u8; 6] = [1, 5, 9, 13, 17, 25];

/// Location of a cell within the logical map grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: u32,
    y: u32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }
}

/// Stable identifier of a robot, preserved across ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RobotId(u32);

impl RobotId {
    /// Creates a new robot identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw identifier value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Stable identifier of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GrenadeId(u32);

impl GrenadeId {
    /// Creates a new grenade identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the raw identifier value.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// 24-bit RGB colour written as `#RRGGBB` on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(u32);

impl HexColor {
    /// Pure black.
    pub const BLACK: Self = Self(0x000000);
    /// Pure white.
    pub const WHITE: Self = Self(0xffffff);

    /// Creates a colour from a packed `0xRRGGBB` value. Bits above 24 are dropped.
    #[must_use]
    pub const fn from_rgb_u32(value: u32) -> Self {
        Self(value & 0x00ff_ffff)
    }

    /// Creates a colour from byte components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self(((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    /// Parses `#RRGGBB` (the leading `#` is optional, hex digits are case-insensitive).
    ///
    /// Returns `None` for anything else.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let digits = value.strip_prefix('#').unwrap_or(value);
        if digits.len() != 6 || !digits.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self)
    }

    /// Packed `0xRRGGBB` value.
    #[must_use]
    pub const fn rgb(&self) -> u32 {
        self.0
    }

    /// Red component.
    #[must_use]
    pub const fn red(&self) -> u8 {
        (self.0 >> 16) as u8
    }

    /// Green component.
    #[must_use]
    pub const fn green(&self) -> u8 {
        (self.0 >> 8) as u8
    }

    /// Blue component.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.0 as u8
    }

    /// Complementary colour, `0xFFFFFF XOR rgb`.
    #[must_use]
    pub const fn complementary(&self) -> Self {
        Self(0x00ff_ffff ^ self.0)
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06X}", self.0)
    }
}

impl TryFrom<String> for HexColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid hex colour `{value}`"))
    }
}

impl From<HexColor> for String {
    fn from(value: HexColor) -> Self {
        value.to_string()
    }
}

/// Strategy driving a robot. Each behaviour owns its own sprite family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Behavior {
    /// Controlled by a human player.
    Human,
    /// Chases the nearest robot.
    Hunter,
    /// Heads straight for the exit.
    Winner,
    /// Picks moves at random.
    Random,
    /// Wanders around the map.
    Tourist,
    /// Lays mines.
    Sapper,
    /// Builds walls and doors.
    Builder,
}

impl Behavior {
    /// Every behaviour, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Human,
        Self::Hunter,
        Self::Winner,
        Self::Random,
        Self::Tourist,
        Self::Sapper,
        Self::Builder,
    ];

    /// Prefix of the skin assets used to draw robots with this behaviour.
    #[must_use]
    pub const fn sprite_base(&self) -> &'static str {
        match self {
            Self::Human => "humain",
            Self::Hunter => "hunter",
            Self::Winner => "winner",
            Self::Random => "random",
            Self::Tourist => "tourist",
            Self::Sapper => "sapper",
            Self::Builder => "builder",
        }
    }
}

/// Robot abilities, as reported by the rule engine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotStats {
    /// Maximum number of cells walked in one move.
    pub speed: u32,
    /// Propensity to attack, in `0.0..=1.0`.
    pub aggressiveness: f32,
    /// Propensity to flee danger, in `0.0..=1.0`.
    pub survival_instinct: f32,
    /// Whether the robot can throw grenades.
    pub has_grenade: bool,
    /// Maximum grenade throw distance in cells.
    pub grenade_range: u32,
    /// Maximum grenade impact level.
    pub grenade_power: u8,
    /// Whether the robot can lay mines.
    pub has_mine: bool,
    /// Maximum mine impact level.
    pub mine_power: u8,
}

/// Robot occupying a cell.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RobotCase {
    /// Identifier preserved for the robot's whole life.
    pub uid: RobotId,
    /// Tint applied to the robot sprite.
    pub color: HexColor,
    /// Whether the robot is still in play.
    pub alive: bool,
    /// Strategy driving the robot.
    pub behavior: Behavior,
    /// Player number (1..=10) shown on human robots.
    #[serde(default)]
    pub human_number: Option<u8>,
    /// Abilities of the robot.
    #[serde(default)]
    pub stats: RobotStats,
}

/// Kind of hazard laid on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DangerType {
    /// Buried mine exploding when walked on.
    Mine,
}

/// Scripted animation played on a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnimationScenario {
    /// Five-frame explosion.
    Explosion,
}

impl AnimationScenario {
    /// Number of frames in the scenario.
    #[must_use]
    pub const fn frame_count(&self) -> u8 {
        match self {
            Self::Explosion => 5,
        }
    }
}

/// Semantic content of a cell.
///
/// Unknown tags coming from a newer engine deserialize into
/// [`CaseKind::Unknown`] and are skipped by consumers.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type_case", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseKind {
    /// Outer wall of the map.
    WallPerimeter,
    /// Inner wall.
    Wall,
    /// Walkable empty floor.
    Void,
    /// Door crossing a wall.
    Door,
    /// Collectable bonus.
    Bonus,
    /// Robot standing on the cell.
    Robot(RobotCase),
    /// Grenade in flight.
    Grenade {
        /// Projectile identifier.
        cuid: GrenadeId,
    },
    /// Hazard laid on the cell.
    Danger {
        /// Kind of hazard.
        danger_type: DangerType,
        /// Impact level, one of [`POWER_LEVELS`].
        danger_impact: u8,
    },
    /// Animation frame.
    Animation {
        /// Scenario being played.
        scenario_anim: AnimationScenario,
        /// Zero-based frame index.
        local_step: u8,
    },
    /// Aim marker.
    Target,
    /// Map exit.
    Sortie,
    /// Cell of a robot's zone of influence.
    ZoneRobot {
        /// Robot owning the zone.
        robot: RobotId,
        /// Colour of the owning robot.
        color: HexColor,
    },
    /// Debug marker.
    Debug {
        /// Marker face, `1`, `2` or `3`.
        face: u8,
    },
    /// Case type not understood by this build.
    #[serde(other)]
    Unknown,
}

/// Fieldless discriminant of [`CaseKind`], used for layer routing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeCase {
    /// See [`CaseKind::WallPerimeter`].
    WallPerimeter,
    /// See [`CaseKind::Wall`].
    Wall,
    /// See [`CaseKind::Void`].
    Void,
    /// See [`CaseKind::Door`].
    Door,
    /// See [`CaseKind::Bonus`].
    Bonus,
    /// See [`CaseKind::Robot`].
    Robot,
    /// See [`CaseKind::Grenade`].
    Grenade,
    /// See [`CaseKind::Danger`].
    Danger,
    /// See [`CaseKind::Animation`].
    Animation,
    /// See [`CaseKind::Target`].
    Target,
    /// See [`CaseKind::Sortie`].
    Sortie,
    /// See [`CaseKind::ZoneRobot`].
    ZoneRobot,
    /// See [`CaseKind::Debug`].
    Debug,
}

/// One cell of the game grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Case {
    /// Column of the cell.
    pub x: u32,
    /// Row of the cell.
    pub y: u32,
    /// Whether the cell should be drawn.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Semantic content of the cell.
    pub kind: CaseKind,
}

fn default_visible() -> bool {
    true
}

impl Case {
    /// Creates a visible case at the provided coordinates.
    #[must_use]
    pub const fn new(x: u32, y: u32, kind: CaseKind) -> Self {
        Self {
            x,
            y,
            visible: true,
            kind,
        }
    }

    /// Grid coordinate of the case.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        CellCoord::new(self.x, self.y)
    }

    /// Returns a copy of the case relocated to another cell.
    #[must_use]
    pub const fn moved_to(mut self, x: u32, y: u32) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Discriminant of the case, or `None` for unknown case types.
    #[must_use]
    pub const fn type_case(&self) -> Option<TypeCase> {
        let type_case = match self.kind {
            CaseKind::WallPerimeter => TypeCase::WallPerimeter,
            CaseKind::Wall => TypeCase::Wall,
            CaseKind::Void => TypeCase::Void,
            CaseKind::Door => TypeCase::Door,
            CaseKind::Bonus => TypeCase::Bonus,
            CaseKind::Robot(_) => TypeCase::Robot,
            CaseKind::Grenade { .. } => TypeCase::Grenade,
            CaseKind::Danger { .. } => TypeCase::Danger,
            CaseKind::Animation { .. } => TypeCase::Animation,
            CaseKind::Target => TypeCase::Target,
            CaseKind::Sortie => TypeCase::Sortie,
            CaseKind::ZoneRobot { .. } => TypeCase::ZoneRobot,
            CaseKind::Debug { .. } => TypeCase::Debug,
            CaseKind::Unknown => return None,
        };
        Some(type_case)
    }

    /// Robot payload when the case holds a robot.
    #[must_use]
    pub const fn robot(&self) -> Option<&RobotCase> {
        match &self.kind {
            CaseKind::Robot(robot) => Some(robot),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complementary_is_an_involution() {
        for value in [0x000000, 0x3cb44b, 0x808080, 0xffffff, 0x123456] {
            let color = HexColor::from_rgb_u32(value);
            assert_eq!(color.complementary().complementary(), color);
        }
    }

    #[test]
    fn complementary_matches_reference_values() {
        assert_eq!(HexColor::WHITE.complementary(), HexColor::BLACK);
        assert_eq!(
            HexColor::parse("#808080").map(|color| color.complementary().to_string()),
            Some("#7F7F7F".to_string())
        );
    }

    #[test]
    fn parse_rejects_malformed_codes() {
        assert!(HexColor::parse("#12345").is_none());
        assert!(HexColor::parse("#12345g").is_none());
        assert!(HexColor::parse("").is_none());
        assert!(HexColor::parse("#+12345").is_none());
        assert_eq!(HexColor::parse("3cb44b"), HexColor::parse("#3CB44B"));
    }

    #[test]
    fn unknown_case_has_no_type() {
        let case = Case::new(1, 1, CaseKind::Unknown);
        assert_eq!(case.type_case(), None);
        assert!(case.robot().is_none());
    }
}
