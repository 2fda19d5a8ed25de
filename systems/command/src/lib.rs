#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command zone system that assembles player choices into command strings.
//!
//! A command is written `action direction distance? ('-' power)?`. The
//! [`CommandAssembler`] collects the player's selections, validates them
//! against the current [`PlayerPower`] and emits
//! [`ContainerEvent::ChoiceMade`] once the command is complete. Engines read
//! the string back with [`GameCommand::from_str`](std::str::FromStr).

use std::{fmt, str::FromStr};

use labpyrinthe_core::{ContainerEvent, PlayerPower, POWER_LEVELS};

/// Symbol of the upward direction.
pub const CHAR_TOP: char = 'N';
/// Symbol of the leftward direction.
pub const CHAR_LEFT: char = 'O';
/// Symbol of the rightward direction.
pub const CHAR_RIGHT: char = 'E';
/// Symbol of the downward direction.
pub const CHAR_BOTTOM: char = 'S';
/// Symbol of the door-building action.
pub const CHAR_PORTE: char = 'P';
/// Symbol of the wall-building action.
pub const CHAR_MUR: char = 'M';
/// Symbol of the melee attack.
pub const CHAR_KILL: char = 'K';
/// Symbol of the grenade throw.
pub const CHAR_GRENADE: char = 'G';
/// Symbol of the mine drop.
pub const CHAR_MINE: char = 'X';

const POWER_SEPARATOR: char = '-';

/// What the robot does during its move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    /// Walk; written without an action symbol.
    Move,
    /// Turn an adjacent wall into a door.
    Door,
    /// Turn an adjacent door into a wall.
    Wall,
    /// Attack an adjacent robot.
    Kill,
    /// Throw a grenade.
    Grenade,
    /// Lay a mine.
    Mine,
}

impl Action {
    /// Symbol prefixing the command, `None` for moves.
    #[must_use]
    pub const fn symbol(&self) -> Option<char> {
        match self {
            Self::Move => None,
            Self::Door => Some(CHAR_PORTE),
            Self::Wall => Some(CHAR_MUR),
            Self::Kill => Some(CHAR_KILL),
            Self::Grenade => Some(CHAR_GRENADE),
            Self::Mine => Some(CHAR_MINE),
        }
    }

    /// Action written with the provided symbol.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            CHAR_PORTE => Some(Self::Door),
            CHAR_MUR => Some(Self::Wall),
            CHAR_KILL => Some(Self::Kill),
            CHAR_GRENADE => Some(Self::Grenade),
            CHAR_MINE => Some(Self::Mine),
            _ => None,
        }
    }

    const fn takes_distance(&self) -> bool {
        matches!(self, Self::Move | Self::Grenade)
    }

    const fn takes_power(&self) -> bool {
        matches!(self, Self::Grenade | Self::Mine)
    }
}

/// Cardinal direction of a command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards decreasing rows.
    Top,
    /// Towards decreasing columns.
    Left,
    /// Towards increasing columns.
    Right,
    /// Towards increasing rows.
    Bottom,
}

impl Direction {
    /// Symbol of the direction.
    #[must_use]
    pub const fn symbol(&self) -> char {
        match self {
            Self::Top => CHAR_TOP,
            Self::Left => CHAR_LEFT,
            Self::Right => CHAR_RIGHT,
            Self::Bottom => CHAR_BOTTOM,
        }
    }

    /// Direction written with the provided symbol.
    #[must_use]
    pub const fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            CHAR_TOP => Some(Self::Top),
            CHAR_LEFT => Some(Self::Left),
            CHAR_RIGHT => Some(Self::Right),
            CHAR_BOTTOM => Some(Self::Bottom),
            _ => None,
        }
    }

    /// Unit grid offset `(dx, dy)` of the direction.
    #[must_use]
    pub const fn offset(&self) -> (i32, i32) {
        match self {
            Self::Top => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::Bottom => (0, 1),
        }
    }
}

/// Reasons a command cannot be emitted.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// No action was selected.
    #[error("no action selected")]
    MissingAction,
    /// The command has no direction.
    #[error("{action:?} requires a direction")]
    MissingDirection {
        /// Action being assembled.
        action: Action,
    },
    /// The command needs a distance.
    #[error("{action:?} requires a distance")]
    MissingDistance {
        /// Action being assembled.
        action: Action,
    },
    /// The command needs a power.
    #[error("{action:?} requires a power")]
    MissingPower {
        /// Action being assembled.
        action: Action,
    },
    /// A distance was given to an action that takes none.
    #[error("{action:?} does not take a distance")]
    UnexpectedDistance {
        /// Action being assembled.
        action: Action,
    },
    /// A power was given to an action that takes none.
    #[error("{action:?} does not take a power")]
    UnexpectedPower {
        /// Action being assembled.
        action: Action,
    },
    /// Distance is zero or beyond the robot's reach.
    #[error("distance {distance} outside 1..={max}")]
    DistanceOutOfRange {
        /// Requested distance.
        distance: u32,
        /// Largest allowed distance.
        max: u32,
    },
    /// Power is not one of the impact levels.
    #[error("power {power} is not an impact level")]
    InvalidPower {
        /// Requested power.
        power: u8,
    },
    /// Power exceeds the robot's ability.
    #[error("power {power} exceeds maximum {max}")]
    PowerExceeded {
        /// Requested power.
        power: u8,
        /// Largest allowed power.
        max: u8,
    },
    /// The robot carries no grenade.
    #[error("no grenade available")]
    NoGrenade,
    /// The robot carries no mine.
    #[error("no mine available")]
    NoMine,
    /// The string does not follow the command grammar.
    #[error("malformed command `{0}`")]
    Malformed(String),
}

/// Fully specified player command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GameCommand {
    action: Action,
    direction: Direction,
    distance: Option<u32>,
    power: Option<u8>,
}

impl GameCommand {
    /// Creates a command, checking that its parts fit the action.
    pub fn new(
        action: Action,
        direction: Direction,
        distance: Option<u32>,
        power: Option<u8>,
    ) -> Result<Self, CommandError> {
        match (action.takes_distance(), distance) {
            (true, None) => return Err(CommandError::MissingDistance { action }),
            (false, Some(_)) => return Err(CommandError::UnexpectedDistance { action }),
            _ => {}
        }
        match (action.takes_power(), power) {
            (true, None) => return Err(CommandError::MissingPower { action }),
            (false, Some(_)) => return Err(CommandError::UnexpectedPower { action }),
            _ => {}
        }
        if let Some(power) = power {
            if !POWER_LEVELS.contains(&power) {
                return Err(CommandError::InvalidPower { power });
            }
        }
        Ok(Self {
            action,
            direction,
            distance,
            power,
        })
    }

    /// Action of the command.
    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    /// Direction of the command.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Distance in cells, for moves and grenades.
    #[must_use]
    pub const fn distance(&self) -> Option<u32> {
        self.distance
    }

    /// Impact level, for grenades and mines.
    #[must_use]
    pub const fn power(&self) -> Option<u8> {
        self.power
    }

    /// Checks the command against the player's abilities.
    pub fn validate(&self, player: &PlayerPower) -> Result<(), CommandError> {
        match self.action {
            Action::Move => check_distance(self.distance, player.speed),
            Action::Door | Action::Wall | Action::Kill => Ok(()),
            Action::Grenade => {
                if !player.has_grenade {
                    return Err(CommandError::NoGrenade);
                }
                check_distance(self.distance, player.grenade_range)?;
                check_power(self.power, player.grenade_power)
            }
            Action::Mine => {
                if !player.has_mine {
                    return Err(CommandError::NoMine);
                }
                check_power(self.power, player.mine_power)
            }
        }
    }
}

fn check_distance(distance: Option<u32>, max: u32) -> Result<(), CommandError> {
    match distance {
        Some(distance) if (1..=max).contains(&distance) => Ok(()),
        Some(distance) => Err(CommandError::DistanceOutOfRange { distance, max }),
        None => Ok(()),
    }
}

fn check_power(power: Option<u8>, max: u8) -> Result<(), CommandError> {
    match power {
        Some(power) if power > max => Err(CommandError::PowerExceeded { power, max }),
        _ => Ok(()),
    }
}

impl fmt::Display for GameCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(symbol) = self.action.symbol() {
            write!(f, "{symbol}")?;
        }
        write!(f, "{}", self.direction.symbol())?;
        if let Some(distance) = self.distance {
            write!(f, "{distance}")?;
        }
        if let Some(power) = self.power {
            write!(f, "{POWER_SEPARATOR}{power}")?;
        }
        Ok(())
    }
}

impl FromStr for GameCommand {
    type Err = CommandError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let malformed = || CommandError::Malformed(value.to_owned());
        let mut chars = value.trim().chars();

        let first = chars.next().ok_or_else(malformed)?;
        let (action, direction_symbol) = match Action::from_symbol(first) {
            Some(action) => (action, chars.next().ok_or_else(malformed)?),
            None => (Action::Move, first),
        };
        let direction = Direction::from_symbol(direction_symbol).ok_or_else(malformed)?;

        let rest: String = chars.collect();
        let (distance_part, power_part) = match rest.split_once(POWER_SEPARATOR) {
            Some((distance, power)) => (distance, Some(power)),
            None => (rest.as_str(), None),
        };
        let distance = if distance_part.is_empty() {
            None
        } else {
            Some(parse_digits::<u32>(distance_part).ok_or_else(malformed)?)
        };
        let power = match power_part {
            Some(power) => Some(parse_digits::<u8>(power).ok_or_else(malformed)?),
            None => None,
        };

        Self::new(action, direction, distance, power)
    }
}

fn parse_digits<T: FromStr>(value: &str) -> Option<T> {
    if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Collects command-zone selections and emits validated command strings.
#[derive(Clone, Debug, Default)]
pub struct CommandAssembler {
    power: PlayerPower,
    action: Option<Action>,
    direction: Option<Direction>,
    distance: Option<u32>,
    impact: Option<u8>,
}

impl CommandAssembler {
    /// Creates an assembler bounded by the provided abilities.
    #[must_use]
    pub fn new(power: PlayerPower) -> Self {
        Self {
            power,
            ..Self::default()
        }
    }

    /// Replaces the player's abilities, dropping selections they no longer allow.
    pub fn set_player_power(&mut self, power: PlayerPower) {
        self.power = power;
        if let Some(distance) = self.distance {
            if !self.available_distances().contains(&distance) {
                self.distance = None;
            }
        }
        if let Some(impact) = self.impact {
            if !self.available_powers().contains(&impact) {
                self.impact = None;
            }
        }
    }

    /// Selects the action, clearing selections the new action does not take.
    pub fn select_action(&mut self, action: Action) {
        self.action = Some(action);
        if !action.takes_distance() {
            self.distance = None;
        }
        if !action.takes_power() {
            self.impact = None;
        }
    }

    /// Selects the direction.
    pub fn select_direction(&mut self, direction: Direction) {
        self.direction = Some(direction);
    }

    /// Selects the distance.
    pub fn select_distance(&mut self, distance: u32) {
        self.distance = Some(distance);
    }

    /// Selects the impact level.
    pub fn select_power(&mut self, power: u8) {
        self.impact = Some(power);
    }

    /// Clears every selection, keeping the abilities.
    pub fn reset(&mut self) {
        *self = Self::new(self.power);
    }

    /// Distances the current action accepts.
    #[must_use]
    pub fn available_distances(&self) -> Vec<u32> {
        let max = match self.action {
            Some(Action::Move) => self.power.speed,
            Some(Action::Grenade) => self.power.grenade_range,
            _ => 0,
        };
        (1..=max).collect()
    }

    /// Impact levels the current action accepts.
    #[must_use]
    pub fn available_powers(&self) -> Vec<u8> {
        let max = match self.action {
            Some(Action::Grenade) if self.power.has_grenade => self.power.grenade_power,
            Some(Action::Mine) if self.power.has_mine => self.power.mine_power,
            _ => 0,
        };
        POWER_LEVELS
            .into_iter()
            .filter(|&level| level <= max)
            .collect()
    }

    /// Builds the command from the current selections.
    pub fn assemble(&self) -> Result<GameCommand, CommandError> {
        let action = self.action.ok_or(CommandError::MissingAction)?;
        let direction = self
            .direction
            .ok_or(CommandError::MissingDirection { action })?;
        let distance = self.distance.filter(|_| action.takes_distance());
        let impact = self.impact.filter(|_| action.takes_power());
        let command = GameCommand::new(action, direction, distance, impact)?;
        command.validate(&self.power)?;
        Ok(command)
    }

    /// Emits the assembled command as a [`ContainerEvent::ChoiceMade`] and resets.
    ///
    /// Selections are kept when the command is incomplete or invalid.
    pub fn submit(&mut self, out: &mut Vec<ContainerEvent>) -> Result<GameCommand, CommandError> {
        let command = self.assemble().map_err(|error| {
            tracing::warn!(%error, "command rejected");
            error
        })?;
        out.push(ContainerEvent::ChoiceMade(command.to_string()));
        self.reset();
        Ok(command)
    }
}
