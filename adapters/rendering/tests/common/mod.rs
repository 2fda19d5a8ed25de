#![allow(dead_code)]

use glam::UVec2;
use image::{Rgba, RgbaImage};
use labpyrinthe_core::{
    Behavior, Case, CaseKind, HexColor, RobotCase, RobotId, RobotStats, POWER_LEVELS,
};
use labpyrinthe_rendering::{MapPublisher, NodeId, PublisherConfig, RetainedCanvas};
use labpyrinthe_skin::{Category, ImageRasterBackend, ResizeFilter, SkinStore};

pub const SPRITE_SIDE: u32 = 40;

fn tile(shade: u8) -> RgbaImage {
    RgbaImage::from_pixel(SPRITE_SIDE, SPRITE_SIDE, Rgba([shade, shade, shade, 255]))
}

/// Skin holding every carte asset as a flat 40 pixel tile.
pub fn skin() -> SkinStore {
    let mut store = SkinStore::new(ImageRasterBackend::new(ResizeFilter::Nearest), false);
    let mut names: Vec<String> = [
        "mur_ext", "mur", "vide", "porte", "bonus", "cible", "sortie", "grenade", "zone",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect();
    names.extend(POWER_LEVELS.iter().map(|power| format!("mine_{power}")));
    names.extend((1..=5).map(|frame| format!("explosion_{frame}")));
    names.extend((1..=10).map(|digit| format!("number_{digit}")));
    for behavior in Behavior::ALL {
        names.push(format!("{}_bg", behavior.sprite_base()));
        names.push(format!("{}_fil", behavior.sprite_base()));
    }
    for (index, name) in names.into_iter().enumerate() {
        store.insert(Category::Carte, name, tile((index * 3) as u8));
    }
    store
}

pub fn publisher() -> MapPublisher<NodeId> {
    MapPublisher::new(PublisherConfig::default(), skin()).expect("valid publisher config")
}

pub fn canvas(width: u32, height: u32) -> RetainedCanvas {
    RetainedCanvas::new(UVec2::new(width, height))
}

pub fn robot(uid: u32, x: u32, y: u32, color: u32, alive: bool) -> Case {
    Case::new(
        x,
        y,
        CaseKind::Robot(RobotCase {
            uid: RobotId::new(uid),
            color: HexColor::from_rgb_u32(color),
            alive,
            behavior: Behavior::Hunter,
            human_number: None,
            stats: RobotStats::default(),
        }),
    )
}
