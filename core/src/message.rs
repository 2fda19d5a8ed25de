use serde::{Deserialize, Serialize};

use crate::{
    case::{Case, RobotId},
    layer::LayerName,
};

/// Complete description of the map, sent when a game starts or is reloaded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapPayload {
    /// Number of columns of the map.
    pub width: u32,
    /// Number of rows of the map.
    pub height: u32,
    /// Walls, floor, doors and exits.
    pub base: Vec<Case>,
    /// Mines.
    pub dangers: Vec<Case>,
    /// Bonuses.
    pub bonus: Vec<Case>,
    /// Robots.
    pub robots: Vec<Case>,
    /// Grenades in flight.
    pub grenade: Vec<Case>,
    /// Aim markers.
    pub target: Vec<Case>,
    /// Animation frames.
    pub animation: Vec<Case>,
    /// Robot zones of influence.
    #[serde(default)]
    pub zones: Vec<Case>,
    /// Debug markers, only sent by debug engines.
    #[serde(default)]
    pub debug: Option<Vec<Case>>,
}

impl MapPayload {
    /// Creates an empty payload for a map of the provided size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Iterates every case of every matrix, base layer first.
    pub fn cases(&self) -> impl Iterator<Item = &Case> {
        [
            &self.base,
            &self.dangers,
            &self.bonus,
            &self.zones,
            &self.robots,
            &self.grenade,
            &self.target,
            &self.animation,
        ]
        .into_iter()
        .chain(self.debug.as_ref())
        .flat_map(|matrix| matrix.iter())
    }
}

/// Incremental update produced by the rule engine for one tick.
///
/// Consumers apply the lists in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeLog {
    /// New or modified cases.
    #[serde(default)]
    pub cases_added: Vec<Case>,
    /// Cases to remove from the scene.
    #[serde(default)]
    pub cases_deleted: Vec<Case>,
    /// Cases that moved, carrying their new coordinates.
    #[serde(default)]
    pub cases_moved: Vec<Case>,
    /// Layers to clear entirely.
    #[serde(default)]
    pub cleared_typecases: Vec<LayerName>,
    /// Animation frames.
    #[serde(default)]
    pub cases_anim: Vec<Case>,
}

impl ChangeLog {
    /// Whether the tick drives an animation.
    #[must_use]
    pub fn has_anim(&self) -> bool {
        !self.cases_moved.is_empty() || !self.cases_anim.is_empty()
    }

    /// Whether the change log carries no change at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases_added.is_empty()
            && self.cases_deleted.is_empty()
            && self.cleared_typecases.is_empty()
            && !self.has_anim()
    }
}

/// Turn scheduled for one player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GambleInfo {
    /// Robot playing the turn.
    pub uid: RobotId,
    /// Index of the current move within the turn.
    pub coup: u32,
    /// Number of moves allowed during the turn.
    pub total_coups: u32,
}

/// Robots in play together with the active turn, if any.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotListing {
    /// Robot cases currently on the map.
    pub robots: Vec<Case>,
    /// Active turn.
    pub gamble: Option<GambleInfo>,
}

impl RobotListing {
    /// Case of the robot playing the active turn.
    #[must_use]
    pub fn active_robot(&self) -> Option<&Case> {
        let gamble = self.gamble?;
        self.robots
            .iter()
            .find(|case| case.robot().is_some_and(|robot| robot.uid == gamble.uid))
    }
}

/// Abilities of the local player, bounding the commands it may emit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerPower {
    /// Maximum number of cells walked in one move.
    pub speed: u32,
    /// Whether a grenade can be thrown.
    pub has_grenade: bool,
    /// Maximum grenade throw distance.
    pub grenade_range: u32,
    /// Maximum grenade impact level.
    pub grenade_power: u8,
    /// Whether a mine can be laid.
    pub has_mine: bool,
    /// Maximum mine impact level.
    pub mine_power: u8,
}

/// Work item posted to the UI loop by the engine or the network.
#[derive(Clone, Debug, PartialEq)]
pub enum GameMessage {
    /// Publish the whole map.
    PublishFull(MapPayload),
    /// Apply an incremental change log.
    PublishDelta(ChangeLog),
    /// Refresh the robot list and the active turn.
    PublishRobotList(RobotListing),
    /// Refresh the local player's abilities.
    PlayerPower(PlayerPower),
}

/// Display state of the partie container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PartieState {
    /// Waiting for the first map.
    Creating,
    /// Game in progress.
    Game,
    /// Resize overlay shown.
    Resize,
}

/// Notifications emitted towards the partie container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContainerEvent {
    /// A full map publication completed.
    CartePublished,
    /// The canvas started resizing; the container shows its overlay.
    ResizeStart,
    /// Resizing completed; the container returns to `resume`.
    ResizeEnd {
        /// State the container goes back to.
        resume: PartieState,
    },
    /// Cell size or origin changed.
    GeometryUpdated {
        /// Pixel side of a cell.
        cell_size: u32,
        /// Pixel position of the map's top-left corner.
        origin: (i32, i32),
    },
    /// The player assembled a command.
    ChoiceMade(String),
    /// The player asked for the main menu.
    GotoMenu,
    /// The player asked to quit.
    QuitGame,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::case::{Behavior, CaseKind, HexColor, RobotCase, RobotStats};

    fn robot(uid: u32, x: u32, y: u32) -> Case {
        Case::new(
            x,
            y,
            CaseKind::Robot(RobotCase {
                uid: RobotId::new(uid),
                color: HexColor::from_rgb_u32(0x3cb44b),
                alive: true,
                behavior: Behavior::Hunter,
                human_number: None,
                stats: RobotStats::default(),
            }),
        )
    }

    #[test]
    fn has_anim_tracks_moves_and_frames() {
        let mut log = ChangeLog::default();
        assert!(!log.has_anim());
        assert!(log.is_empty());

        log.cases_added.push(Case::new(0, 0, CaseKind::Wall));
        assert!(!log.has_anim());

        log.cases_moved.push(robot(1, 2, 3));
        assert!(log.has_anim());
    }

    #[test]
    fn active_robot_follows_gamble_uid() {
        let listing = RobotListing {
            robots: vec![robot(1, 0, 0), robot(2, 4, 5)],
            gamble: Some(GambleInfo {
                uid: RobotId::new(2),
                coup: 0,
                total_coups: 3,
            }),
        };
        assert_eq!(listing.active_robot().map(Case::cell), Some(robot(2, 4, 5).cell()));

        let idle = RobotListing {
            gamble: None,
            ..listing
        };
        assert!(idle.active_robot().is_none());
    }

    #[test]
    fn payload_iterates_debug_matrix_last() {
        let mut payload = MapPayload::new(3, 3);
        payload.base.push(Case::new(0, 0, CaseKind::WallPerimeter));
        payload.debug = Some(vec![Case::new(1, 1, CaseKind::Debug { face: 2 })]);
        let kinds: Vec<_> = payload.cases().map(|case| case.kind).collect();
        assert_eq!(kinds, vec![CaseKind::WallPerimeter, CaseKind::Debug { face: 2 }]);
    }
}
