mod common;

use std::collections::{BTreeMap, HashMap};

use glam::UVec2;
use labpyrinthe_core::{
    AnimationScenario, Case, CaseKind, ChangeLog, DangerType, GambleInfo, GrenadeId, LayerName,
    MapPayload, RobotId, RobotListing, POWER_LEVELS,
};
use labpyrinthe_rendering::{ItemKey, NodeId, Viewport};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use common::{canvas, publisher, robot};

const WIDTH: u32 = 16;
const HEIGHT: u32 = 12;

type Model = BTreeMap<(LayerName, ItemKey), Case>;

fn random_cell(rng: &mut ChaCha8Rng) -> (u32, u32) {
    (rng.gen_range(0..WIDTH), rng.gen_range(0..HEIGHT))
}

fn random_payload(rng: &mut ChaCha8Rng) -> MapPayload {
    let mut payload = MapPayload::new(WIDTH, HEIGHT);
    for y in 0..HEIGHT {
        for x in 0..WIDTH {
            let kind = if x == 0 || y == 0 || x == WIDTH - 1 || y == HEIGHT - 1 {
                CaseKind::WallPerimeter
            } else {
                *[CaseKind::Void, CaseKind::Void, CaseKind::Wall, CaseKind::Door]
                    .choose(rng)
                    .unwrap_or(&CaseKind::Void)
            };
            payload.base.push(Case::new(x, y, kind));
        }
    }
    for uid in 0..rng.gen_range(1..6) {
        let (x, y) = random_cell(rng);
        payload.robots.push(robot(uid, x, y, rng.gen_range(0..0xffffff), true));
    }
    for _ in 0..rng.gen_range(0..6) {
        let (x, y) = random_cell(rng);
        payload.bonus.push(Case::new(x, y, CaseKind::Bonus));
    }
    for _ in 0..rng.gen_range(0..4) {
        let (x, y) = random_cell(rng);
        payload.dangers.push(Case::new(
            x,
            y,
            CaseKind::Danger {
                danger_type: DangerType::Mine,
                danger_impact: *POWER_LEVELS.choose(rng).unwrap_or(&1),
            },
        ));
    }
    payload
}

fn random_delta(rng: &mut ChaCha8Rng, model: &Model) -> ChangeLog {
    let mut log = ChangeLog::default();
    let robots: Vec<Case> = model
        .iter()
        .filter(|((layer, _), _)| *layer == LayerName::Robot)
        .map(|(_, case)| *case)
        .collect();

    for _ in 0..rng.gen_range(0..4) {
        let (x, y) = random_cell(rng);
        log.cases_added.push(Case::new(x, y, CaseKind::Bonus));
    }
    if rng.gen_bool(0.3) {
        let (x, y) = random_cell(rng);
        log.cases_added.push(Case::new(
            x,
            y,
            CaseKind::Grenade {
                cuid: GrenadeId::new(rng.gen_range(0..3)),
            },
        ));
    }
    let existing: Vec<&Case> = model.values().collect();
    for _ in 0..rng.gen_range(0..3) {
        if let Some(case) = existing.choose(rng) {
            log.cases_deleted.push(**case);
        }
    }
    for case in &robots {
        if rng.gen_bool(0.5) {
            let (x, y) = random_cell(rng);
            log.cases_moved.push(case.moved_to(x, y));
        }
    }
    if rng.gen_bool(0.2) {
        log.cleared_typecases.push(LayerName::Bonus);
    }
    if rng.gen_bool(0.4) {
        let (x, y) = random_cell(rng);
        log.cases_anim.push(Case::new(
            x,
            y,
            CaseKind::Animation {
                scenario_anim: AnimationScenario::Explosion,
                local_step: rng.gen_range(0..5),
            },
        ));
    }
    log
}

fn model_of(payload: &MapPayload) -> Model {
    let mut model = Model::new();
    for case in payload.cases() {
        if let Some(key) = ItemKey::route(case) {
            let _ = model.insert(key, *case);
        }
    }
    model
}

fn upsert(case: &Case, model: &mut Model) {
    if let Some(key) = ItemKey::route(case) {
        let _ = model.insert(key, *case);
    }
}

fn random_listing<R: Rng>(rng: &mut R, model: &Model) -> RobotListing {
    let robots: Vec<Case> = model
        .values()
        .filter(|case| case.robot().is_some())
        .copied()
        .collect();
    let gamble = robots.choose(&mut *rng).and_then(Case::robot).map(|robot| GambleInfo {
        uid: robot.uid,
        coup: 1,
        total_coups: rng.gen_range(1..=4),
    });
    RobotListing { robots, gamble }
}

fn apply(log: &ChangeLog, model: &mut Model) {
    for case in &log.cases_added {
        upsert(case, model);
    }
    for case in &log.cases_deleted {
        if let Some(key) = ItemKey::route(case) {
            let _ = model.remove(&key);
        }
    }
    for case in &log.cases_moved {
        upsert(case, model);
    }
    for layer in &log.cleared_typecases {
        model.retain(|(owner, _), _| owner != layer);
    }
    for case in &log.cases_anim {
        upsert(case, model);
    }
}

#[test]
fn published_items_follow_the_change_logs() {
    for seed in 0..32 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut canvas = canvas(640, 480);
        let mut publisher = publisher();
        let mut events = Vec::new();

        let payload = random_payload(&mut rng);
        let mut model = model_of(&payload);
        publisher.publish_full(&mut canvas, &payload, &mut events);
        assert!(canvas.is_layer_ordered(), "seed {seed}: full publish order");

        for tick in 0..20 {
            let robot_handles: HashMap<RobotId, NodeId> = publisher
                .scene()
                .layer(LayerName::Robot)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|(key, item)| match key {
                            ItemKey::Robot(uid) => Some((*uid, item.handle())),
                            _ => None,
                        })
                        .collect()
                })
                .unwrap_or_default();

            let log = random_delta(&mut rng, &model);
            apply(&log, &mut model);
            publisher.publish_delta(&mut canvas, &log);

            let published: Vec<_> = publisher.scene().keys();
            let expected: Vec<_> = model.keys().copied().collect();
            assert_eq!(published, expected, "seed {seed} tick {tick}: item keys");
            for (key, case) in &model {
                let item = publisher.scene().item(key.0, key.1).expect("item exists");
                assert_eq!(item.case(), case, "seed {seed} tick {tick}: bound case");
                assert_eq!(item.z(), key.0.z());
            }

            let deleted: Vec<RobotId> = log
                .cases_deleted
                .iter()
                .filter_map(|case| case.robot().map(|robot| robot.uid))
                .collect();
            for (uid, handle) in robot_handles {
                if deleted.contains(&uid) {
                    continue;
                }
                if let Some(item) = publisher
                    .scene()
                    .item(LayerName::Robot, ItemKey::Robot(uid))
                {
                    assert_eq!(item.handle(), handle, "seed {seed} tick {tick}: robot {uid:?}");
                }
            }

            assert!(canvas.is_layer_ordered(), "seed {seed} tick {tick}: delta order");

            publisher.publish_robotlist(&mut canvas, &random_listing(&mut rng, &model));
            assert!(canvas.is_layer_ordered(), "seed {seed} tick {tick}: listing order");
        }
    }
}

#[test]
fn viewport_projection_is_monotone_and_square() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..200 {
        let canvas = UVec2::new(rng.gen_range(1..2000), rng.gen_range(1..2000));
        let map = UVec2::new(rng.gen_range(1..60), rng.gen_range(1..60));
        let max_cell_size = rng.gen_range(1..120);
        let viewport = Viewport::compute(canvas, map, max_cell_size).expect("non-empty inputs");

        assert!((1..=max_cell_size).contains(&viewport.cell_size()));
        let cell = |x, y| viewport.case_to_pixel(labpyrinthe_core::CellCoord::new(x, y));
        assert_eq!(cell(0, 0), viewport.origin());
        let side = viewport.cell_size() as i32;
        for x in 1..map.x {
            let step = cell(x, 0) - cell(x - 1, 0);
            assert_eq!(step.x, side);
        }
        for y in 1..map.y {
            let step = cell(0, y) - cell(0, y - 1);
            assert_eq!(step.y, side);
        }
    }
}
