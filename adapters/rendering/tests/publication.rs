mod common;

use std::sync::Arc;

use glam::{IVec2, UVec2};
use labpyrinthe_core::{
    AnimationScenario, Case, CaseKind, CellCoord, ChangeLog, ContainerEvent, GambleInfo,
    GrenadeId, LayerName, MapPayload, PartieState, RobotId, RobotListing,
};
use labpyrinthe_rendering::{
    AnimationResolution, ItemKey, MapPublisher, NodeView, PublisherConfig, SceneBackend, Shape,
};

use common::{canvas, publisher, robot, skin};

const GREEN: u32 = 0x3cb44b;

fn boot_payload() -> MapPayload {
    let mut payload = MapPayload::new(20, 15);
    payload.base = vec![
        Case::new(0, 0, CaseKind::WallPerimeter),
        Case::new(19, 0, CaseKind::WallPerimeter),
        Case::new(0, 14, CaseKind::WallPerimeter),
        Case::new(19, 14, CaseKind::WallPerimeter),
    ];
    payload.robots = vec![robot(1, 2, 3, GREEN, true)];
    payload
}

fn explosion(x: u32, y: u32, step: u8) -> Case {
    Case::new(
        x,
        y,
        CaseKind::Animation {
            scenario_anim: AnimationScenario::Explosion,
            local_step: step,
        },
    )
}

#[test]
fn boot_publish_places_walls_and_robot() {
    let mut canvas = canvas(800, 600);
    let mut publisher = publisher();
    let mut events = Vec::new();

    publisher.publish_full(&mut canvas, &boot_payload(), &mut events);

    let viewport = publisher.viewport().expect("geometry initialised");
    assert_eq!(viewport.cell_size(), 40);
    assert_eq!(viewport.origin(), IVec2::ZERO);

    let scene = publisher.scene();
    assert_eq!(scene.layer(LayerName::BaseCaseLayer).map(|items| items.len()), Some(4));
    let item = scene
        .item(LayerName::Robot, ItemKey::Robot(RobotId::new(1)))
        .expect("robot item");
    assert_eq!(canvas.position(item.handle()), Some(IVec2::new(80, 120)));
    assert!(item.is_visible());
    assert_eq!(item.z(), 6);

    assert!(publisher.is_published());
    assert_eq!(events.last(), Some(&ContainerEvent::CartePublished));
    assert!(events.contains(&ContainerEvent::GeometryUpdated {
        cell_size: 40,
        origin: (0, 0)
    }));
    assert!(canvas.is_layer_ordered());
}

#[test]
fn shrinking_the_canvas_keeps_robot_identity() {
    let mut canvas = canvas(800, 600);
    let mut publisher = publisher();
    let mut events = Vec::new();
    publisher.publish_full(&mut canvas, &boot_payload(), &mut events);
    let key = ItemKey::Robot(RobotId::new(1));
    let handle = publisher
        .scene()
        .item(LayerName::Robot, key)
        .map(|item| item.handle())
        .expect("robot item");

    canvas.set_canvas_size(UVec2::new(400, 300));
    publisher.reflow(&mut canvas, &mut events);

    let viewport = publisher.viewport().expect("geometry initialised");
    assert_eq!(viewport.cell_size(), 20);
    assert_eq!(viewport.origin(), IVec2::ZERO);

    let item = publisher.scene().item(LayerName::Robot, key).expect("robot item");
    assert_eq!(item.handle(), handle);
    assert_eq!(canvas.position(handle), Some(IVec2::new(40, 60)));
    let raster = item.skin_image().expect("robot raster");
    assert_eq!(raster.dimensions(), (20, 20));
    match canvas.view(handle) {
        Some(NodeView::Image(Some(shown))) => assert!(Arc::ptr_eq(shown, raster)),
        other => panic!("unexpected view: {other:?}"),
    }
}

#[test]
fn dead_robot_is_hidden_but_retained() {
    let mut canvas = canvas(800, 600);
    let mut publisher = publisher();
    let mut events = Vec::new();
    publisher.publish_full(&mut canvas, &boot_payload(), &mut events);
    let key = ItemKey::Robot(RobotId::new(1));
    let handle = publisher
        .scene()
        .item(LayerName::Robot, key)
        .map(|item| item.handle())
        .expect("robot item");

    let log = ChangeLog {
        cases_added: vec![robot(1, 2, 3, GREEN, false)],
        ..ChangeLog::default()
    };
    publisher.publish_delta(&mut canvas, &log);

    let item = publisher.scene().item(LayerName::Robot, key).expect("robot item");
    assert_eq!(item.handle(), handle);
    assert!(!item.is_visible());
    assert_eq!(canvas.is_visible(handle), Some(false));
}

#[test]
fn animated_ticks_skip_z_management() {
    let mut canvas = canvas(800, 600);
    let mut publisher = publisher();
    let mut events = Vec::new();
    let mut payload = boot_payload();
    payload.robots.push(robot(2, 5, 5, 0x4363d8, true));
    publisher.publish_full(&mut canvas, &payload, &mut events);
    let before = publisher.stats();

    let log = ChangeLog {
        cases_anim: vec![explosion(8, 8, 2)],
        cases_moved: vec![robot(2, 6, 5, 0x4363d8, true)],
        ..ChangeLog::default()
    };
    publisher.publish_delta(&mut canvas, &log);

    let after = publisher.stats();
    assert_eq!(after.z_passes, before.z_passes);
    assert_eq!(after.skipped_z_passes, before.skipped_z_passes + 1);

    let scene = publisher.scene();
    let frame = scene
        .item(LayerName::Animation, ItemKey::Grid(CellCoord::new(8, 8)))
        .expect("explosion item");
    let moved = scene
        .item(LayerName::Robot, ItemKey::Robot(RobotId::new(2)))
        .expect("moved robot");
    assert!(frame.is_visible());
    assert!(moved.is_visible());
    assert_eq!(canvas.position(moved.handle()), Some(IVec2::new(240, 200)));

    // The new explosion frame already paints below the target, debug and mask layers.
    assert!(canvas.is_layer_ordered());
    let order = canvas.painters_order();
    assert_eq!(order.last().map(|(_, layer)| *layer), Some(LayerName::ShapeMask));
    assert!(order.contains(&(frame.handle(), LayerName::Animation)));

    publisher.publish_delta(&mut canvas, &ChangeLog::default());
    assert_eq!(publisher.stats().z_passes, before.z_passes + 1);
    assert!(canvas.is_layer_ordered());
}

#[test]
fn pixel_resolution_ignores_moved_cases() {
    let mut canvas = canvas(800, 600);
    let config = PublisherConfig {
        animation_resolution: AnimationResolution::Pixel,
        ..PublisherConfig::default()
    };
    let mut publisher = MapPublisher::new(config, skin()).expect("valid config");
    let mut events = Vec::new();
    publisher.publish_full(&mut canvas, &boot_payload(), &mut events);

    let log = ChangeLog {
        cases_moved: vec![robot(1, 9, 9, GREEN, true)],
        ..ChangeLog::default()
    };
    publisher.publish_delta(&mut canvas, &log);

    let item = publisher
        .scene()
        .item(LayerName::Robot, ItemKey::Robot(RobotId::new(1)))
        .expect("robot item");
    assert_eq!(item.cell(), CellCoord::new(2, 3));
}

#[test]
fn full_publish_prunes_vanished_items() {
    let mut canvas = canvas(800, 600);
    let mut publisher = publisher();
    let mut events = Vec::new();
    let mut payload = boot_payload();
    payload.bonus = vec![Case::new(4, 4, CaseKind::Bonus)];
    payload.grenade = vec![Case::new(6, 6, CaseKind::Grenade { cuid: GrenadeId::new(3) })];
    publisher.publish_full(&mut canvas, &payload, &mut events);
    let robot_handle = publisher
        .scene()
        .item(LayerName::Robot, ItemKey::Robot(RobotId::new(1)))
        .map(|item| item.handle())
        .expect("robot item");

    let mut next = boot_payload();
    next.robots = vec![robot(1, 3, 3, GREEN, true)];
    publisher.publish_full(&mut canvas, &next, &mut events);

    let scene = publisher.scene();
    assert_eq!(scene.layer(LayerName::Bonus).map(|items| items.len()), Some(0));
    assert_eq!(scene.layer(LayerName::Grenade).map(|items| items.len()), Some(0));
    let item = scene
        .item(LayerName::Robot, ItemKey::Robot(RobotId::new(1)))
        .expect("robot survives");
    assert_eq!(item.handle(), robot_handle);
    assert_eq!(scene.item_count(), canvas.node_count() - 5);
}

#[test]
fn unknown_cases_are_ignored() {
    let mut canvas = canvas(800, 600);
    let mut publisher = publisher();
    let mut events = Vec::new();
    let mut payload = boot_payload();
    payload.target.push(Case::new(1, 1, CaseKind::Unknown));
    publisher.publish_full(&mut canvas, &payload, &mut events);

    assert_eq!(publisher.stats().ignored_cases, 1);
    assert_eq!(publisher.scene().item_count(), 5);
}

#[test]
fn missing_images_yield_invisible_items() {
    let mut canvas = canvas(800, 600);
    let mut publisher = publisher();
    let mut events = Vec::new();
    let mut payload = boot_payload();
    payload.debug = Some(vec![Case::new(3, 3, CaseKind::Debug { face: 2 })]);
    publisher.publish_full(&mut canvas, &payload, &mut events);

    let item = publisher
        .scene()
        .item(LayerName::Debug, ItemKey::Grid(CellCoord::new(3, 3)))
        .expect("debug item exists");
    assert!(!item.is_visible());
    assert!(item.skin_image().is_none());
}

#[test]
fn debug_markers_survive_deltas_until_cleared() {
    let mut canvas = canvas(800, 600);
    let mut publisher = publisher();
    let mut events = Vec::new();
    let mut payload = boot_payload();
    payload.debug = Some(vec![Case::new(3, 3, CaseKind::Debug { face: 1 })]);
    publisher.publish_full(&mut canvas, &payload, &mut events);

    publisher.publish_delta(&mut canvas, &ChangeLog::default());
    assert_eq!(publisher.scene().layer(LayerName::Debug).map(|items| items.len()), Some(1));

    let log = ChangeLog {
        cleared_typecases: vec![LayerName::Debug],
        ..ChangeLog::default()
    };
    publisher.publish_delta(&mut canvas, &log);
    assert_eq!(publisher.scene().layer(LayerName::Debug).map(|items| items.len()), Some(0));
}

#[test]
fn robot_list_drives_highlight_circles() {
    let mut canvas = canvas(800, 600);
    let mut publisher = publisher();
    let mut events = Vec::new();
    publisher.publish_full(&mut canvas, &boot_payload(), &mut events);

    let listing = RobotListing {
        robots: vec![robot(1, 2, 3, GREEN, true)],
        gamble: Some(GambleInfo {
            uid: RobotId::new(1),
            coup: 0,
            total_coups: 3,
        }),
    };
    publisher.publish_robotlist(&mut canvas, &listing);
    assert!(canvas.is_layer_ordered());

    let shapes = *publisher.scene().shapes();
    let player = shapes.player_circle().expect("player circle");
    let action = shapes.action_circle().expect("action circle");
    assert_eq!(canvas.is_visible(player), Some(true));
    match canvas.view(player) {
        Some(NodeView::Shape(Shape::Circle { bounds, .. })) => {
            let centre = bounds.origin + (bounds.size / 2).as_ivec2();
            assert!((centre - IVec2::new(100, 140)).abs().max_element() <= 1);
        }
        other => panic!("unexpected view: {other:?}"),
    }
    let layers: Vec<LayerName> = canvas
        .painters_order()
        .into_iter()
        .map(|(_, layer)| layer)
        .collect();
    let circles = layers
        .iter()
        .position(|layer| *layer == LayerName::ShapeHighlightRobot)
        .expect("circles painted");
    let robot_layer = layers
        .iter()
        .position(|layer| *layer == LayerName::Robot)
        .expect("robot painted");
    assert!(circles < robot_layer);
    match (canvas.view(player), canvas.view(action)) {
        (
            Some(NodeView::Shape(Shape::Circle { outline: inner, .. })),
            Some(NodeView::Shape(Shape::Circle { outline: outer, .. })),
        ) => assert_eq!(inner, outer),
        other => panic!("unexpected views: {other:?}"),
    }

    publisher.publish_robotlist(
        &mut canvas,
        &RobotListing {
            gamble: None,
            ..listing
        },
    );
    assert_eq!(canvas.is_visible(player), Some(false));
    assert_eq!(canvas.is_visible(action), Some(false));
}

#[test]
fn zero_cell_cap_is_rejected() {
    let config = PublisherConfig {
        max_cell_size: 0,
        ..PublisherConfig::default()
    };
    assert!(MapPublisher::<u32>::new(config, skin()).is_err());
}

#[test]
fn empty_canvas_defers_geometry() {
    let mut canvas = canvas(0, 0);
    let mut publisher = publisher();
    let mut events = Vec::new();
    publisher.publish_full(&mut canvas, &boot_payload(), &mut events);

    assert!(!publisher.is_initialised());
    assert!(publisher.viewport().is_none());
    assert_eq!(publisher.game_phase(), PartieState::Game);
    assert_eq!(publisher.scene().item_count(), 5);
    assert!(publisher.scene().items().all(|item| !item.is_visible()));

    canvas.set_canvas_size(UVec2::new(800, 600));
    publisher.reflow(&mut canvas, &mut events);
    assert!(publisher.is_initialised());
    assert!(publisher.scene().items().all(|item| item.is_visible()));
    assert_eq!(canvas.canvas_size(), UVec2::new(800, 600));
}
