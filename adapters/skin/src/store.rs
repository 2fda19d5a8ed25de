use std::{collections::HashMap, sync::Arc};

use image::RgbaImage;
use labpyrinthe_core::{AnimationScenario, Behavior, Case, CaseKind, DangerType, HexColor, RobotCase};

use crate::{
    buttons::{ButtonState, PaletteSet},
    raster::{ImageRasterBackend, RasterBackend},
    source::ImageSource,
    Category, Raster,
};

/// Alpha applied to robot zone tiles.
pub const ZONE_ALPHA: u8 = 96;

/// Tint of dead robots.
const BOT_DEAD: HexColor = HexColor::from_rgb_u32(0x4a4a4a);

/// Cache of every skin raster, keyed by category and name.
///
/// Composed variants (button states, robots, zones) are stored next to the
/// sources they derive from and are never evicted.
#[derive(Debug)]
pub struct SkinStore<R = ImageRasterBackend> {
    categories: HashMap<Category, HashMap<String, ImageSource>>,
    raster: R,
    opt_mode: bool,
}

impl<R: RasterBackend> SkinStore<R> {
    /// Creates an empty store.
    #[must_use]
    pub fn new(raster: R, opt_mode: bool) -> Self {
        Self {
            categories: HashMap::new(),
            raster,
            opt_mode,
        }
    }

    /// Whether composed sprites are flattened onto an opaque tile.
    #[must_use]
    pub const fn opt_mode(&self) -> bool {
        self.opt_mode
    }

    /// Raster backend used for derived variants.
    #[must_use]
    pub const fn raster(&self) -> &R {
        &self.raster
    }

    /// Registers a source raster, replacing any previous one with that name.
    pub fn insert(&mut self, category: Category, name: impl Into<String>, image: RgbaImage) {
        let _ = self
            .categories
            .entry(category)
            .or_default()
            .insert(name.into(), ImageSource::new(image));
    }

    /// Whether a raster is registered under the name.
    #[must_use]
    pub fn contains(&self, category: Category, name: &str) -> bool {
        self.categories
            .get(&category)
            .is_some_and(|sources| sources.contains_key(name))
    }

    /// Number of rasters in a category.
    #[must_use]
    pub fn count(&self, category: Category) -> usize {
        self.categories.get(&category).map_or(0, HashMap::len)
    }

    /// Total number of rasters, composed variants included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.values().map(HashMap::len).sum()
    }

    /// Whether the store holds no raster at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up a raster resampled to `size`.
    ///
    /// With a `state`, the raster registered as `{name}_{state}` is returned.
    pub fn get(
        &mut self,
        category: Category,
        name: &str,
        size: Option<u32>,
        state: Option<ButtonState>,
    ) -> Option<Raster> {
        let sources = self.categories.get_mut(&category)?;
        let source = match state {
            Some(state) => sources.get_mut(&format!("{name}_{}", state.name()))?,
            None => sources.get_mut(name)?,
        };
        Some(source.at_size(size, &self.raster))
    }

    /// Synthesises the five states of a button into the `nav` category.
    pub fn install_buttons(&mut self, name: &str, body: &RgbaImage, border: &RgbaImage) {
        let palette = PaletteSet::for_button(name).palette();
        for state in ButtonState::ALL {
            let image = palette.synthesize(body, border, state, &self.raster);
            self.insert(Category::Nav, format!("{name}_{}", state.name()), image);
        }
    }

    fn native(&self, category: Category, name: &str) -> Option<Raster> {
        self.categories
            .get(&category)?
            .get(name)
            .map(|source| Arc::clone(source.native()))
    }

    fn cached(&mut self, key: &str, size: Option<u32>) -> Option<Raster> {
        let source = self.categories.get_mut(&Category::Carte)?.get_mut(key)?;
        Some(source.at_size(size, &self.raster))
    }

    /// Composed sprite of a robot.
    ///
    /// The variant is built once per behaviour, colour, life and alpha mode
    /// and then served from the `carte` category.
    pub fn robot_image(&mut self, robot: &RobotCase, size: Option<u32>) -> Option<Raster> {
        let base = robot.behavior.sprite_base();
        let mode = if self.opt_mode { "opt" } else { "alpha" };
        let mut key = format!("{base}{}{}{mode}", robot.color, robot.alive);
        let digit = match (robot.behavior, robot.human_number) {
            (Behavior::Human, Some(number)) => {
                key.push_str(&number.to_string());
                Some(number)
            }
            _ => None,
        };
        if self.contains(Category::Carte, &key) {
            return self.cached(&key, size);
        }

        let bg = self.native(Category::Carte, &format!("{base}_bg"))?;
        let fil = self.native(Category::Carte, &format!("{base}_fil"))?;
        let tint = if robot.alive { robot.color } else { BOT_DEAD };
        let mut composite = self.raster.compose(&self.raster.tint(&bg, tint), &fil);

        if let Some(number) = digit {
            match self.native(Category::Carte, &format!("number_{number}")) {
                Some(glyph) => {
                    let glyph = self.raster.tint(&glyph, robot.color.complementary());
                    composite = self.raster.compose(&composite, &glyph);
                }
                None => tracing::debug!(number, "missing robot digit glyph"),
            }
        }

        if self.opt_mode {
            if let Some(tile) = self.native(Category::Carte, "vide") {
                composite = self.raster.compose(&tile, &composite);
            }
        }

        tracing::trace!(key = %key, "composed robot sprite");
        self.insert(Category::Carte, key.clone(), composite);
        self.cached(&key, size)
    }

    /// Translucent zone tile tinted with the owning robot's colour.
    pub fn zone_image(&mut self, color: HexColor, size: Option<u32>) -> Option<Raster> {
        let key = format!("zone{color}");
        if !self.contains(Category::Carte, &key) {
            let zone = self.native(Category::Carte, "zone")?;
            let tinted = self.raster.tint(&zone, color);
            let image = self.raster.with_alpha(&tinted, ZONE_ALPHA);
            self.insert(Category::Carte, key.clone(), image);
        }
        self.cached(&key, size)
    }

    /// Image drawn for a case at the provided cell size.
    ///
    /// `None` means nothing is drawn: the asset is missing, the animation
    /// frame is hidden or the case type is unknown.
    pub fn image_for_case(&mut self, case: &Case, size: u32) -> Option<Raster> {
        let size = Some(size);
        let name = match case.kind {
            CaseKind::WallPerimeter => "mur_ext".to_owned(),
            CaseKind::Wall => "mur".to_owned(),
            CaseKind::Void => "vide".to_owned(),
            CaseKind::Door => "porte".to_owned(),
            CaseKind::Bonus => "bonus".to_owned(),
            CaseKind::Target => "cible".to_owned(),
            CaseKind::Sortie => "sortie".to_owned(),
            CaseKind::Grenade { .. } => "grenade".to_owned(),
            CaseKind::Animation {
                scenario_anim,
                local_step,
            } => {
                if !case.visible {
                    return None;
                }
                match scenario_anim {
                    AnimationScenario::Explosion if local_step < scenario_anim.frame_count() => {
                        format!("explosion_{}", local_step + 1)
                    }
                    AnimationScenario::Explosion => "vide".to_owned(),
                }
            }
            CaseKind::Danger {
                danger_type: DangerType::Mine,
                danger_impact,
            } => format!("mine_{danger_impact}"),
            CaseKind::Debug { face } => format!("debug{face}"),
            CaseKind::Robot(robot) => return self.robot_image(&robot, size),
            CaseKind::ZoneRobot { color, .. } => return self.zone_image(color, size),
            CaseKind::Unknown => return None,
        };
        self.get(Category::Carte, &name, size, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::ResizeFilter;
    use image::Rgba;
    use labpyrinthe_core::{RobotId, RobotStats};

    fn store(opt_mode: bool) -> SkinStore {
        let mut store = SkinStore::new(ImageRasterBackend::new(ResizeFilter::Nearest), opt_mode);
        let mask = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        store.insert(Category::Carte, "hunter_bg", mask.clone());
        store.insert(Category::Carte, "hunter_fil", RgbaImage::new(4, 4));
        store.insert(Category::Carte, "vide", RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255])));
        store
    }

    fn hunter(alive: bool) -> RobotCase {
        RobotCase {
            uid: RobotId::new(1),
            color: HexColor::from_rgb_u32(0x3cb44b),
            alive,
            behavior: Behavior::Hunter,
            human_number: None,
            stats: RobotStats::default(),
        }
    }

    #[test]
    fn dead_robots_are_tinted_grey() {
        let mut store = store(false);
        let dead = store.robot_image(&hunter(false), None).expect("dead sprite");
        assert_eq!(dead.get_pixel(0, 0), &Rgba([0x4a, 0x4a, 0x4a, 255]));
        let alive = store.robot_image(&hunter(true), None).expect("alive sprite");
        assert_eq!(alive.get_pixel(0, 0), &Rgba([0x3c, 0xb4, 0x4b, 255]));
    }

    #[test]
    fn unknown_cases_resolve_to_nothing() {
        let mut store = store(false);
        assert!(store.image_for_case(&Case::new(0, 0, CaseKind::Unknown), 4).is_none());
        assert!(store.image_for_case(&Case::new(0, 0, CaseKind::Wall), 4).is_none());
        assert!(store.image_for_case(&Case::new(0, 0, CaseKind::Void), 4).is_some());
    }
}
