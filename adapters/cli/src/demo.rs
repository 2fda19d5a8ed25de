//! Standalone rule engine feeding the UI loop with a small bot match.

use std::{
    sync::mpsc::Receiver,
    thread::{self, JoinHandle},
    time::Duration,
};

use labpyrinthe_core::{
    AnimationScenario, Behavior, Case, CaseKind, CellCoord, ChangeLog, DangerType, GambleInfo,
    GameMessage, LayerName, MapPayload, PlayerPower, RobotCase, RobotId, RobotListing, RobotStats,
    POWER_LEVELS,
};
use labpyrinthe_rendering::MailboxSender;
use labpyrinthe_system_command::{Action, Direction, GameCommand};
use labpyrinthe_system_palette::ColorAllocator;
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const WALL_DENSITY: f64 = 0.18;
/// Ticks the engine waits for the human player before skipping its turn.
const HUMAN_PATIENCE: u32 = 25;
const DIRECTIONS: [Direction; 4] = [
    Direction::Top,
    Direction::Left,
    Direction::Right,
    Direction::Bottom,
];

/// Shape of the generated match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DemoSettings {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) robots: u32,
    pub(crate) seed: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Tile {
    Perimeter,
    Wall,
    Floor,
    Exit,
}

#[derive(Clone, Copy, Debug)]
struct Explosion {
    cell: CellCoord,
    step: u8,
}

/// Bot match played on a random bordered maze.
///
/// Robot 0 is the human player and acts on the commands it receives; the
/// other robots pick random moves, grenades and mines.
#[derive(Debug)]
pub(crate) struct DemoEngine {
    settings: DemoSettings,
    rng: ChaCha8Rng,
    colors: ColorAllocator,
    tiles: Vec<Tile>,
    robots: Vec<Case>,
    mines: Vec<Case>,
    explosion: Option<Explosion>,
    turn: usize,
    waited: u32,
    generation: u32,
    power: PlayerPower,
}

impl DemoEngine {
    pub(crate) fn new(settings: DemoSettings) -> Self {
        let mut engine = Self {
            settings,
            rng: ChaCha8Rng::seed_from_u64(settings.seed),
            colors: ColorAllocator::with_seed(settings.seed),
            tiles: Vec::new(),
            robots: Vec::new(),
            mines: Vec::new(),
            explosion: None,
            turn: 0,
            waited: 0,
            generation: 0,
            power: PlayerPower {
                speed: 3,
                has_grenade: true,
                grenade_range: 4,
                grenade_power: 9,
                has_mine: true,
                mine_power: 5,
            },
        };
        engine.generate();
        engine
    }

    /// Messages describing the current match from scratch.
    pub(crate) fn opening(&self, out: &mut Vec<GameMessage>) {
        out.push(GameMessage::PublishFull(self.payload()));
        out.push(GameMessage::PlayerPower(self.power));
        out.push(GameMessage::PublishRobotList(self.listing()));
    }

    /// Plays one tick, applying `command` if the human player is on turn.
    pub(crate) fn tick(&mut self, command: Option<&str>, out: &mut Vec<GameMessage>) {
        if self.alive_count() <= 1 {
            self.generation += 1;
            tracing::info!(generation = self.generation, "match over, generating a new maze");
            self.generate();
            self.opening(out);
            return;
        }

        let mut log = ChangeLog::default();
        self.advance_explosion(&mut log);

        let human_turn = self.turn == 0;
        let command = if human_turn {
            command.and_then(|wire| match wire.parse::<GameCommand>() {
                Ok(command) => Some(command),
                Err(error) => {
                    tracing::warn!(%error, wire, "ignoring malformed command");
                    None
                }
            })
        } else {
            self.bot_command()
        };

        let played = match command {
            Some(command) => match command.validate(&self.power) {
                Ok(()) => {
                    self.apply(command, &mut log);
                    true
                }
                Err(error) => {
                    tracing::warn!(%error, %command, "command refused");
                    false
                }
            },
            None => false,
        };

        if played || !human_turn || self.waited >= HUMAN_PATIENCE {
            self.waited = 0;
            self.next_turn();
        } else {
            self.waited += 1;
        }

        if !log.is_empty() {
            out.push(GameMessage::PublishDelta(log));
        }
        out.push(GameMessage::PublishRobotList(self.listing()));
    }

    fn generate(&mut self) {
        let DemoSettings { width, height, .. } = self.settings;
        self.tiles = (0..height)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| {
                if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                    Tile::Perimeter
                } else if self.rng.gen_bool(WALL_DENSITY) {
                    Tile::Wall
                } else {
                    Tile::Floor
                }
            })
            .collect();

        let mut free: Vec<CellCoord> = (1..height - 1)
            .flat_map(|y| (1..width - 1).map(move |x| CellCoord::new(x, y)))
            .collect();
        free.shuffle(&mut self.rng);

        if let Some(exit) = free.pop() {
            self.set_tile(exit, Tile::Exit);
        }
        self.robots.clear();
        self.mines.clear();
        self.explosion = None;
        self.turn = 0;
        self.waited = 0;

        for index in 0..self.settings.robots {
            let Some(cell) = free.pop() else {
                break;
            };
            self.set_tile(cell, Tile::Floor);
            let color = self
                .colors
                .next_color()
                .unwrap_or_else(|| self.colors.random_color());
            let behavior = if index == 0 {
                Behavior::Human
            } else {
                Behavior::ALL[1 + (index as usize - 1) % (Behavior::ALL.len() - 1)]
            };
            self.robots.push(Case::new(
                cell.x(),
                cell.y(),
                CaseKind::Robot(RobotCase {
                    uid: RobotId::new(index),
                    color,
                    alive: true,
                    behavior,
                    human_number: (index == 0).then_some(1),
                    stats: RobotStats {
                        speed: self.power.speed,
                        has_grenade: self.power.has_grenade,
                        grenade_range: self.power.grenade_range,
                        grenade_power: self.power.grenade_power,
                        has_mine: self.power.has_mine,
                        mine_power: self.power.mine_power,
                        ..RobotStats::default()
                    },
                }),
            ));
        }
        tracing::debug!(
            width,
            height,
            robots = self.robots.len(),
            "generated maze"
        );
    }

    fn payload(&self) -> MapPayload {
        let mut payload = MapPayload::new(self.settings.width, self.settings.height);
        for (index, tile) in self.tiles.iter().enumerate() {
            let cell = self.cell_at(index);
            let kind = match tile {
                Tile::Perimeter => CaseKind::WallPerimeter,
                Tile::Wall => CaseKind::Wall,
                Tile::Floor => CaseKind::Void,
                Tile::Exit => CaseKind::Sortie,
            };
            payload.base.push(Case::new(cell.x(), cell.y(), kind));
        }
        payload.dangers = self.mines.clone();
        payload.robots = self.robots.clone();
        payload
    }

    fn listing(&self) -> RobotListing {
        let gamble = self.robots.get(self.turn).and_then(Case::robot).map(|robot| GambleInfo {
            uid: robot.uid,
            coup: 1,
            total_coups: self.power.speed,
        });
        RobotListing {
            robots: self.robots.clone(),
            gamble,
        }
    }

    fn bot_command(&mut self) -> Option<GameCommand> {
        let direction = *DIRECTIONS.choose(&mut self.rng)?;
        let roll = self.rng.gen_range(0..10);
        let command = if roll < 7 {
            let distance = self.rng.gen_range(1..=self.power.speed);
            GameCommand::new(Action::Move, direction, Some(distance), None)
        } else if roll < 9 {
            let distance = self.rng.gen_range(1..=self.power.grenade_range);
            let power = self.random_power(self.power.grenade_power)?;
            GameCommand::new(Action::Grenade, direction, Some(distance), Some(power))
        } else {
            let power = self.random_power(self.power.mine_power)?;
            GameCommand::new(Action::Mine, direction, None, Some(power))
        };
        command.ok()
    }

    fn random_power(&mut self, max: u8) -> Option<u8> {
        let levels: Vec<u8> = POWER_LEVELS.into_iter().filter(|level| *level <= max).collect();
        levels.choose(&mut self.rng).copied()
    }

    fn apply(&mut self, command: GameCommand, log: &mut ChangeLog) {
        let Some(robot) = self.robots.get(self.turn).copied() else {
            return;
        };
        let start = robot.cell();
        match command.action() {
            Action::Move => {
                let mut cell = start;
                for _ in 0..command.distance().unwrap_or(1) {
                    match self.step(cell, command.direction()) {
                        Some(next) if self.is_walkable(next) => cell = next,
                        _ => break,
                    }
                }
                if cell == start {
                    return;
                }
                let mut moved = robot.moved_to(cell.x(), cell.y());
                if let Some(index) = self.mines.iter().position(|mine| mine.cell() == cell) {
                    let mine = self.mines.swap_remove(index);
                    log.cases_deleted.push(mine);
                    kill(&mut moved);
                    self.start_explosion(cell, log);
                }
                self.robots[self.turn] = moved;
                log.cases_moved.push(moved);
            }
            Action::Grenade => {
                let mut target = start;
                for _ in 0..command.distance().unwrap_or(1) {
                    match self.step(target, command.direction()) {
                        Some(next) if self.tile(next) != Some(Tile::Perimeter) => target = next,
                        _ => break,
                    }
                }
                if self.tile(target) == Some(Tile::Wall) {
                    self.set_tile(target, Tile::Floor);
                    log.cases_added
                        .push(Case::new(target.x(), target.y(), CaseKind::Void));
                }
                for robot in &mut self.robots {
                    if robot.cell() == target && robot.robot().is_some_and(|robot| robot.alive) {
                        kill(robot);
                        log.cases_added.push(*robot);
                    }
                }
                self.start_explosion(target, log);
            }
            Action::Mine => {
                let Some(cell) = self.step(start, command.direction()) else {
                    return;
                };
                let occupied = self.robots.iter().any(|robot| robot.cell() == cell)
                    || self.mines.iter().any(|mine| mine.cell() == cell);
                if !self.is_walkable(cell) || occupied {
                    return;
                }
                let mine = Case::new(
                    cell.x(),
                    cell.y(),
                    CaseKind::Danger {
                        danger_type: DangerType::Mine,
                        danger_impact: command.power().unwrap_or(POWER_LEVELS[0]),
                    },
                );
                self.mines.push(mine);
                log.cases_added.push(mine);
            }
            Action::Door | Action::Wall | Action::Kill => {
                tracing::debug!(%command, "action not played by the demo engine");
            }
        }
    }

    fn start_explosion(&mut self, cell: CellCoord, log: &mut ChangeLog) {
        if self.explosion.is_some() {
            log.cleared_typecases.push(LayerName::Animation);
        }
        self.explosion = Some(Explosion { cell, step: 0 });
        log.cases_anim.push(explosion_frame(cell, 0));
    }

    fn advance_explosion(&mut self, log: &mut ChangeLog) {
        let Some(explosion) = self.explosion.as_mut() else {
            return;
        };
        explosion.step += 1;
        if explosion.step < AnimationScenario::Explosion.frame_count() {
            log.cases_anim
                .push(explosion_frame(explosion.cell, explosion.step));
        } else {
            self.explosion = None;
            log.cleared_typecases.push(LayerName::Animation);
        }
    }

    fn next_turn(&mut self) {
        let count = self.robots.len();
        for offset in 1..=count {
            let index = (self.turn + offset) % count;
            if self.robots[index].robot().is_some_and(|robot| robot.alive) {
                self.turn = index;
                return;
            }
        }
    }

    fn alive_count(&self) -> usize {
        self.robots
            .iter()
            .filter(|case| case.robot().is_some_and(|robot| robot.alive))
            .count()
    }

    fn step(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        let (dx, dy) = direction.offset();
        let x = cell.x().checked_add_signed(dx)?;
        let y = cell.y().checked_add_signed(dy)?;
        (x < self.settings.width && y < self.settings.height).then(|| CellCoord::new(x, y))
    }

    fn is_walkable(&self, cell: CellCoord) -> bool {
        matches!(self.tile(cell), Some(Tile::Floor | Tile::Exit))
            && !self
                .robots
                .iter()
                .any(|robot| robot.cell() == cell && robot.robot().is_some_and(|r| r.alive))
    }

    fn tile(&self, cell: CellCoord) -> Option<Tile> {
        self.tiles.get(self.index_of(cell)).copied()
    }

    fn set_tile(&mut self, cell: CellCoord, tile: Tile) {
        let index = self.index_of(cell);
        if let Some(slot) = self.tiles.get_mut(index) {
            *slot = tile;
        }
    }

    fn index_of(&self, cell: CellCoord) -> usize {
        (cell.y() * self.settings.width + cell.x()) as usize
    }

    fn cell_at(&self, index: usize) -> CellCoord {
        let width = self.settings.width as usize;
        CellCoord::new((index % width) as u32, (index / width) as u32)
    }
}

fn kill(case: &mut Case) {
    if let CaseKind::Robot(robot) = &mut case.kind {
        robot.alive = false;
    }
}

fn explosion_frame(cell: CellCoord, step: u8) -> Case {
    Case::new(
        cell.x(),
        cell.y(),
        CaseKind::Animation {
            scenario_anim: AnimationScenario::Explosion,
            local_step: step,
        },
    )
}

/// Runs the engine on its own thread until the mailbox goes away.
///
/// Commands chosen in the UI arrive on `commands`; the latest one received
/// during a tick is played.
pub(crate) fn spawn(
    mut engine: DemoEngine,
    tick: Duration,
    game: MailboxSender<GameMessage>,
    commands: Receiver<String>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut messages = Vec::new();
        engine.opening(&mut messages);
        loop {
            for message in messages.drain(..) {
                if !game.send(message) {
                    tracing::debug!("mailbox closed, stopping the demo engine");
                    return;
                }
            }
            thread::sleep(tick);
            let command = commands.try_iter().last();
            engine.tick(command.as_deref(), &mut messages);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> DemoSettings {
        DemoSettings {
            width: 12,
            height: 9,
            robots: 4,
            seed: 7,
        }
    }

    fn full_payload(messages: &[GameMessage]) -> Option<&MapPayload> {
        messages.iter().find_map(|message| match message {
            GameMessage::PublishFull(payload) => Some(payload),
            _ => None,
        })
    }

    #[test]
    fn opening_describes_a_bordered_map_with_every_robot() {
        let engine = DemoEngine::new(settings());
        let mut messages = Vec::new();
        engine.opening(&mut messages);

        let payload = full_payload(&messages).expect("opening publishes the map");
        assert_eq!(payload.base.len(), 12 * 9);
        assert_eq!(payload.robots.len(), 4);
        for case in &payload.base {
            let border = case.x == 0 || case.y == 0 || case.x == 11 || case.y == 8;
            assert_eq!(border, case.kind == CaseKind::WallPerimeter, "{case:?}");
        }
        let human = payload.robots[0].robot().expect("robot case");
        assert_eq!(human.behavior, Behavior::Human);
        assert_eq!(human.human_number, Some(1));
        assert!(matches!(messages.last(), Some(GameMessage::PublishRobotList(_))));
    }

    #[test]
    fn same_seed_plays_the_same_match() {
        let play = || {
            let mut engine = DemoEngine::new(settings());
            let mut messages = Vec::new();
            for _ in 0..40 {
                engine.tick(None, &mut messages);
            }
            messages
        };
        assert_eq!(play(), play());
    }

    #[test]
    fn human_moves_follow_received_commands() {
        let mut engine = DemoEngine::new(settings());
        for (index, robot) in engine.robots.iter_mut().enumerate() {
            *robot = robot.moved_to(1 + index as u32, 7);
        }
        for x in 1..5 {
            engine.set_tile(CellCoord::new(x, 6), Tile::Floor);
        }
        engine.set_tile(CellCoord::new(1, 5), Tile::Wall);
        let wire = GameCommand::new(Action::Move, Direction::Top, Some(2), None)
            .expect("valid command")
            .to_string();

        let mut messages = Vec::new();
        engine.tick(Some(&wire), &mut messages);

        let moved = messages
            .iter()
            .find_map(|message| match message {
                GameMessage::PublishDelta(log) => log.cases_moved.first().copied(),
                _ => None,
            })
            .expect("the human robot moved");
        assert_eq!(moved.cell(), CellCoord::new(1, 6));
        assert_eq!(engine.turn, 1);
    }

    #[test]
    fn human_turn_waits_for_a_command() {
        let mut engine = DemoEngine::new(settings());
        let mut messages = Vec::new();
        engine.tick(Some("not a command"), &mut messages);
        assert_eq!(engine.turn, 0);
        for _ in 0..HUMAN_PATIENCE {
            engine.tick(None, &mut messages);
        }
        assert_eq!(engine.turn, 1);
    }

    #[test]
    fn explosions_play_every_frame_then_clear() {
        let mut engine = DemoEngine::new(settings());
        let mut log = ChangeLog::default();
        engine.start_explosion(CellCoord::new(3, 3), &mut log);
        let mut steps = vec![log.cases_anim.len()];
        loop {
            let mut log = ChangeLog::default();
            engine.advance_explosion(&mut log);
            if log.cleared_typecases.contains(&LayerName::Animation) {
                break;
            }
            steps.push(log.cases_anim.len());
        }
        assert_eq!(
            steps.len(),
            usize::from(AnimationScenario::Explosion.frame_count())
        );
        assert!(engine.explosion.is_none());
    }
}
