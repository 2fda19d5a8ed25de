use std::collections::{BTreeMap, HashMap};

use labpyrinthe_core::{Case, CaseKind, CellCoord, GrenadeId, LayerKind, LayerName, RobotId};
use labpyrinthe_skin::Raster;

/// Identity of an item within its layer.
///
/// Robots and zones are keyed by robot uid, grenades by projectile uid and
/// everything else by grid coordinate, so moving robots and grenades keep
/// their items across ticks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ItemKey {
    /// Keyed by cell.
    Grid(CellCoord),
    /// Keyed by owning robot.
    Robot(RobotId),
    /// Keyed by projectile.
    Grenade(GrenadeId),
}

impl ItemKey {
    /// Layer and key of a case, or `None` for unknown case types.
    #[must_use]
    pub fn route(case: &Case) -> Option<(LayerName, Self)> {
        let layer = LayerName::for_type(case.type_case()?);
        let key = match case.kind {
            CaseKind::Robot(robot) => Self::Robot(robot.uid),
            CaseKind::ZoneRobot { robot, .. } => Self::Robot(robot),
            CaseKind::Grenade { cuid } => Self::Grenade(cuid),
            _ => Self::Grid(case.cell()),
        };
        Some((layer, key))
    }
}

/// Scene node backing one case.
#[derive(Clone, Debug)]
pub struct Item<H> {
    pub(crate) case: Case,
    pub(crate) layer: LayerName,
    pub(crate) skin_image: Option<Raster>,
    pub(crate) handle: H,
    pub(crate) visible: bool,
}

impl<H: Copy> Item<H> {
    /// Case currently bound to the item.
    #[must_use]
    pub const fn case(&self) -> &Case {
        &self.case
    }

    /// Cached grid coordinate.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.case.cell()
    }

    /// Layer owning the item.
    #[must_use]
    pub const fn layer(&self) -> LayerName {
        self.layer
    }

    /// Stacking index, always the owning layer's z.
    #[must_use]
    pub const fn z(&self) -> u8 {
        self.layer.z()
    }

    /// Raster currently shown.
    #[must_use]
    pub const fn skin_image(&self) -> Option<&Raster> {
        self.skin_image.as_ref()
    }

    /// Backend handle of the item.
    #[must_use]
    pub const fn handle(&self) -> H {
        self.handle
    }

    /// Whether the item is shown.
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Handles of the shape layers.
#[derive(Clone, Copy, Debug)]
pub struct ShapeLayers<H> {
    pub(crate) background: Option<H>,
    pub(crate) player_circle: Option<H>,
    pub(crate) action_circle: Option<H>,
    pub(crate) mask: Option<[H; 4]>,
}

impl<H> Default for ShapeLayers<H> {
    fn default() -> Self {
        Self {
            background: None,
            player_circle: None,
            action_circle: None,
            mask: None,
        }
    }
}

impl<H: Copy> ShapeLayers<H> {
    /// Background rectangle.
    #[must_use]
    pub const fn background(&self) -> Option<H> {
        self.background
    }

    /// Circle around the active robot.
    #[must_use]
    pub const fn player_circle(&self) -> Option<H> {
        self.player_circle
    }

    /// Circle reaching as far as the active turn allows.
    #[must_use]
    pub const fn action_circle(&self) -> Option<H> {
        self.action_circle
    }

    /// Mask rectangles: left, right, top and bottom.
    #[must_use]
    pub const fn mask(&self) -> Option<[H; 4]> {
        self.mask
    }

    /// Every shape handle with its layer.
    pub fn handles(&self) -> impl Iterator<Item = (LayerName, H)> + '_ {
        let background = self.background.map(|handle| (LayerName::ShapeBg, handle));
        let circles = [self.player_circle, self.action_circle]
            .into_iter()
            .flatten()
            .map(|handle| (LayerName::ShapeHighlightRobot, handle));
        let mask = self
            .mask
            .into_iter()
            .flatten()
            .map(|handle| (LayerName::ShapeMask, handle));
        background.into_iter().chain(circles).chain(mask)
    }
}

/// Per-layer item indexes plus the shape layers.
#[derive(Clone, Debug)]
pub struct SceneModel<H> {
    pub(crate) layers: BTreeMap<LayerName, HashMap<ItemKey, Item<H>>>,
    pub(crate) shapes: ShapeLayers<H>,
}

impl<H: Copy> SceneModel<H> {
    pub(crate) fn new() -> Self {
        let layers = LayerName::ALL
            .into_iter()
            .filter(|layer| layer.kind() == LayerKind::Image)
            .map(|layer| (layer, HashMap::new()))
            .collect();
        Self {
            layers,
            shapes: ShapeLayers::default(),
        }
    }

    /// Items of an image layer; `None` for shape layers.
    #[must_use]
    pub fn layer(&self, layer: LayerName) -> Option<&HashMap<ItemKey, Item<H>>> {
        self.layers.get(&layer)
    }

    /// Item stored under a key.
    #[must_use]
    pub fn item(&self, layer: LayerName, key: ItemKey) -> Option<&Item<H>> {
        self.layers.get(&layer)?.get(&key)
    }

    /// Item backing a case, resolved through the key rules.
    #[must_use]
    pub fn item_for_case(&self, case: &Case) -> Option<&Item<H>> {
        let (layer, key) = ItemKey::route(case)?;
        self.item(layer, key)
    }

    /// Every image item, by ascending layer.
    pub fn items(&self) -> impl Iterator<Item = &Item<H>> + '_ {
        self.layers.values().flat_map(HashMap::values)
    }

    /// Number of image items.
    #[must_use]
    pub fn item_count(&self) -> usize {
        self.layers.values().map(HashMap::len).sum()
    }

    /// Keys of every image item with their layer, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<(LayerName, ItemKey)> {
        let mut keys: Vec<_> = self
            .layers
            .iter()
            .flat_map(|(layer, items)| items.keys().map(move |key| (*layer, *key)))
            .collect();
        keys.sort();
        keys
    }

    /// Shape layer handles.
    #[must_use]
    pub const fn shapes(&self) -> &ShapeLayers<H> {
        &self.shapes
    }
}
