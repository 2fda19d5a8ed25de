mod common;

use glam::UVec2;
use labpyrinthe_core::{Case, CaseKind, ContainerEvent, MapPayload, PartieState};
use labpyrinthe_rendering::{ResizeCoordinator, SceneBackend};

use common::{canvas, publisher, robot};

fn payload() -> MapPayload {
    let mut payload = MapPayload::new(20, 15);
    payload.base.push(Case::new(0, 0, CaseKind::WallPerimeter));
    payload.robots.push(robot(1, 2, 3, 0x3cb44b, true));
    payload
}

fn count(events: &[ContainerEvent], wanted: fn(&ContainerEvent) -> bool) -> usize {
    events.iter().filter(|event| wanted(event)).count()
}

#[test]
fn resize_storm_coalesces_into_one_reflow() {
    let mut canvas = canvas(800, 600);
    let mut publisher = publisher();
    let mut coordinator = ResizeCoordinator::new();
    let mut events = Vec::new();

    assert!(coordinator.observe(canvas.canvas_size(), &mut publisher, &mut events));
    coordinator.on_idle(&mut canvas, &mut publisher, &mut events);
    publisher.publish_full(&mut canvas, &payload(), &mut events);
    events.clear();

    for size in [UVec2::new(700, 500), UVec2::new(520, 390), UVec2::new(400, 300)] {
        canvas.set_canvas_size(size);
        assert!(coordinator.observe(size, &mut publisher, &mut events));
        assert!(!publisher.is_initialised());
    }
    assert!(coordinator.is_pending());
    assert_eq!(events, vec![ContainerEvent::ResizeStart]);

    coordinator.on_idle(&mut canvas, &mut publisher, &mut events);
    assert!(publisher.is_initialised());
    assert!(!coordinator.is_pending());
    assert_eq!(
        count(&events, |event| matches!(event, ContainerEvent::GeometryUpdated { .. })),
        1
    );
    assert_eq!(
        events,
        vec![
            ContainerEvent::ResizeStart,
            ContainerEvent::GeometryUpdated {
                cell_size: 20,
                origin: (0, 0)
            },
            ContainerEvent::ResizeEnd {
                resume: PartieState::Game
            },
        ]
    );

    events.clear();
    coordinator.on_idle(&mut canvas, &mut publisher, &mut events);
    assert!(events.is_empty());
}

#[test]
fn unchanged_size_is_not_a_resize() {
    let mut publisher = publisher();
    let mut coordinator = ResizeCoordinator::new();
    let mut events = Vec::new();

    assert!(coordinator.observe(UVec2::new(640, 480), &mut publisher, &mut events));
    events.clear();
    assert!(!coordinator.observe(UVec2::new(640, 480), &mut publisher, &mut events));
    assert!(events.is_empty());
    assert_eq!(coordinator.last_size(), Some(UVec2::new(640, 480)));
}

#[test]
fn resize_before_first_map_resumes_creation() {
    let mut canvas = canvas(800, 600);
    let mut publisher = publisher();
    let mut coordinator = ResizeCoordinator::new();
    let mut events = Vec::new();

    let _ = coordinator.observe(UVec2::new(800, 600), &mut publisher, &mut events);
    coordinator.on_idle(&mut canvas, &mut publisher, &mut events);

    assert_eq!(
        events,
        vec![
            ContainerEvent::ResizeStart,
            ContainerEvent::ResizeEnd {
                resume: PartieState::Creating
            },
        ]
    );
    assert!(!publisher.is_initialised());
}
