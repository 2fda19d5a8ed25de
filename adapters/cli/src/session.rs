use std::{fmt, hash::Hash, sync::mpsc::Sender};

use glam::IVec2;
use labpyrinthe_core::{
    Behavior, CellCoord, ContainerEvent, GameMessage, PartieState, RobotListing,
};
use labpyrinthe_rendering::{
    Channel, FrameControl, FrameInput, Mailbox, MapPublisher, ResizeCoordinator, SceneBackend,
};
use labpyrinthe_system_command::{Action, CommandAssembler, Direction};

/// State of the UI loop: publication, resize handling and the command zone.
#[derive(Debug)]
pub(crate) struct Session<H> {
    publisher: MapPublisher<H>,
    mailbox: Mailbox<GameMessage>,
    coordinator: ResizeCoordinator,
    assembler: CommandAssembler,
    listing: RobotListing,
    commands: Sender<String>,
    state: PartieState,
    inbox: Vec<(Channel, GameMessage)>,
    events: Vec<ContainerEvent>,
}

impl<H> Session<H>
where
    H: Copy + Eq + Hash + fmt::Debug,
{
    pub(crate) fn new(
        publisher: MapPublisher<H>,
        mailbox: Mailbox<GameMessage>,
        commands: Sender<String>,
    ) -> Self {
        Self {
            publisher,
            mailbox,
            coordinator: ResizeCoordinator::new(),
            assembler: CommandAssembler::default(),
            listing: RobotListing::default(),
            commands,
            state: PartieState::Creating,
            inbox: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Runs one iteration of the UI loop at its idle boundary.
    pub(crate) fn frame<B>(&mut self, input: FrameInput, backend: &mut B) -> FrameControl
    where
        B: SceneBackend<Handle = H>,
    {
        // The reflow waits for a frame whose size held still.
        let resized = self
            .coordinator
            .observe(input.canvas_size, &mut self.publisher, &mut self.events);
        if !resized {
            self.coordinator
                .on_idle(backend, &mut self.publisher, &mut self.events);
        }

        let mut inbox = std::mem::take(&mut self.inbox);
        self.mailbox.drain(&mut inbox);
        for (channel, message) in inbox.drain(..) {
            self.dispatch(backend, channel, message);
        }
        self.inbox = inbox;

        if let Some(click) = input.click {
            self.click(click);
        }

        self.handle_events()
    }

    fn dispatch<B>(&mut self, backend: &mut B, channel: Channel, message: GameMessage)
    where
        B: SceneBackend<Handle = H>,
    {
        match message {
            GameMessage::PublishFull(payload) => {
                self.publisher
                    .publish_full(backend, &payload, &mut self.events);
            }
            GameMessage::PublishDelta(log) => self.publisher.publish_delta(backend, &log),
            GameMessage::PublishRobotList(listing) => {
                self.publisher.publish_robotlist(backend, &listing);
                self.listing = listing;
            }
            GameMessage::PlayerPower(power) => {
                tracing::debug!(?channel, ?power, "player power updated");
                self.assembler.set_player_power(power);
            }
        }
    }

    /// Turns a click on the map into a move of the human robot, when it is
    /// on turn and the clicked cell lies on one of its axes.
    fn click(&mut self, pixel: IVec2) {
        let Some(cell) = self
            .publisher
            .viewport()
            .and_then(|viewport| viewport.pixel_to_case(pixel))
        else {
            return;
        };
        let Some(robot) = self.listing.active_robot() else {
            return;
        };
        let human = robot
            .robot()
            .is_some_and(|robot| robot.alive && robot.behavior == Behavior::Human);
        if !human {
            return;
        }
        let Some((direction, distance)) = aim(robot.cell(), cell) else {
            return;
        };

        self.assembler.select_action(Action::Move);
        self.assembler.select_direction(direction);
        self.assembler.select_distance(distance);
        if self.assembler.submit(&mut self.events).is_err() {
            self.assembler.reset();
        }
    }

    fn handle_events(&mut self) -> FrameControl {
        let mut control = FrameControl::Continue;
        for event in self.events.drain(..) {
            match event {
                ContainerEvent::CartePublished => {
                    if self.state == PartieState::Creating {
                        tracing::info!("map published, game started");
                    }
                    self.state = PartieState::Game;
                }
                ContainerEvent::ResizeStart => self.state = PartieState::Resize,
                ContainerEvent::ResizeEnd { resume } => self.state = resume,
                ContainerEvent::GeometryUpdated { cell_size, origin } => {
                    tracing::debug!(cell_size, ?origin, "map geometry updated");
                }
                ContainerEvent::ChoiceMade(command) => {
                    tracing::debug!(%command, "command chosen");
                    if self.commands.send(command).is_err() {
                        tracing::warn!("engine stopped, command dropped");
                    }
                }
                ContainerEvent::GotoMenu | ContainerEvent::QuitGame => {
                    control = FrameControl::Exit;
                }
            }
        }
        control
    }
}

/// Direction and distance from `from` to `to` when both share a row or a
/// column.
fn aim(from: CellCoord, to: CellCoord) -> Option<(Direction, u32)> {
    let (fx, fy, tx, ty) = (from.x(), from.y(), to.x(), to.y());
    match (fx == tx, fy == ty) {
        (true, false) if ty < fy => Some((Direction::Top, fy - ty)),
        (true, false) => Some((Direction::Bottom, ty - fy)),
        (false, true) if tx < fx => Some((Direction::Left, fx - tx)),
        (false, true) => Some((Direction::Right, tx - fx)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use glam::UVec2;
    use labpyrinthe_core::{
        Case, CaseKind, GambleInfo, HexColor, MapPayload, PlayerPower, RobotCase, RobotId,
        RobotStats,
    };
    use labpyrinthe_rendering::{NodeId, PublisherConfig, RetainedCanvas};
    use labpyrinthe_skin::{ImageRasterBackend, SkinStore};

    use super::*;

    fn human(x: u32, y: u32) -> Case {
        Case::new(
            x,
            y,
            CaseKind::Robot(RobotCase {
                uid: RobotId::new(0),
                color: HexColor::from_rgb_u32(0xe6194b),
                alive: true,
                behavior: Behavior::Human,
                human_number: Some(1),
                stats: RobotStats::default(),
            }),
        )
    }

    fn session() -> (
        Session<NodeId>,
        labpyrinthe_rendering::MailboxSender<GameMessage>,
        mpsc::Receiver<String>,
    ) {
        let skin = SkinStore::new(ImageRasterBackend::default(), false);
        let publisher =
            MapPublisher::new(PublisherConfig::default(), skin).expect("valid publisher config");
        let mailbox = Mailbox::new();
        let sender = mailbox.sender(Channel::Game);
        let (commands, received) = mpsc::channel();
        (Session::new(publisher, mailbox, commands), sender, received)
    }

    fn input(width: u32, height: u32, click: Option<IVec2>) -> FrameInput {
        FrameInput {
            canvas_size: UVec2::new(width, height),
            click,
            ..FrameInput::default()
        }
    }

    #[test]
    fn aim_requires_a_shared_axis() {
        let from = CellCoord::new(4, 4);
        assert_eq!(aim(from, CellCoord::new(4, 1)), Some((Direction::Top, 3)));
        assert_eq!(aim(from, CellCoord::new(6, 4)), Some((Direction::Right, 2)));
        assert_eq!(aim(from, CellCoord::new(5, 5)), None);
        assert_eq!(aim(from, from), None);
    }

    #[test]
    fn mailbox_messages_publish_and_clicks_emit_commands() {
        let (mut session, game, commands) = session();
        let mut canvas = RetainedCanvas::new(UVec2::new(400, 400));
        let robot = human(2, 2);
        let mut payload = MapPayload::new(10, 10);
        payload.robots.push(robot);

        assert!(game.send(GameMessage::PublishFull(payload)));
        assert!(game.send(GameMessage::PlayerPower(PlayerPower {
            speed: 3,
            ..PlayerPower::default()
        })));
        assert!(game.send(GameMessage::PublishRobotList(RobotListing {
            robots: vec![robot],
            gamble: Some(GambleInfo {
                uid: RobotId::new(0),
                coup: 1,
                total_coups: 3,
            }),
        })));

        assert_eq!(session.frame(input(400, 400, None), &mut canvas), FrameControl::Continue);
        assert_eq!(session.state, PartieState::Game);
        assert!(session.publisher.is_published());

        // Cell (2, 0) lies two cells above the robot, at 40 pixels per cell.
        let _ = session.frame(input(400, 400, Some(IVec2::new(95, 15))), &mut canvas);
        assert_eq!(commands.try_recv().ok().as_deref(), Some("N2"));

        // Beyond the robot's speed: nothing is sent.
        let _ = session.frame(input(400, 400, Some(IVec2::new(395, 95))), &mut canvas);
        assert!(commands.try_recv().is_err());
    }

    #[test]
    fn resizing_passes_through_the_resize_state() {
        let (mut session, game, _commands) = session();
        let mut canvas = RetainedCanvas::new(UVec2::new(400, 400));
        assert!(game.send(GameMessage::PublishFull(MapPayload::new(10, 10))));
        let _ = session.frame(input(400, 400, None), &mut canvas);
        let _ = session.frame(input(400, 400, None), &mut canvas);
        assert_eq!(session.state, PartieState::Game);

        canvas.set_canvas_size(UVec2::new(300, 300));
        let _ = session.frame(input(300, 300, None), &mut canvas);
        assert_eq!(session.state, PartieState::Resize);

        canvas.set_canvas_size(UVec2::new(200, 200));
        let _ = session.frame(input(200, 200, None), &mut canvas);
        assert_eq!(session.state, PartieState::Resize);

        let _ = session.frame(input(200, 200, None), &mut canvas);
        assert_eq!(session.state, PartieState::Game);
        assert_eq!(
            session.publisher.viewport().map(|viewport| viewport.cell_size()),
            Some(20)
        );
    }
}
