use std::collections::{BTreeMap, HashMap};

use glam::{IVec2, UVec2};
use labpyrinthe_core::LayerName;
use labpyrinthe_rendering::{SceneBackend, Shape};
use labpyrinthe_skin::Raster;

/// Identifier of a node hosted by an [`ImmediateScene`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneHandle(u64);

impl SceneHandle {
    /// Retrieves the raw identifier value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// What a node paints.
#[derive(Clone, Debug)]
pub enum Drawable {
    /// Raster drawn with its top-left corner at the node position.
    Image(Option<Raster>),
    /// Vector shape in canvas pixels.
    Shape(Shape),
}

/// One entry of the per-frame draw list.
#[derive(Clone, Copy, Debug)]
pub struct DrawItem<'a> {
    /// Node being painted.
    pub handle: SceneHandle,
    /// Layer hosting the node.
    pub layer: LayerName,
    /// Top-left corner in canvas pixels.
    pub position: IVec2,
    /// Content of the node.
    pub drawable: &'a Drawable,
}

#[derive(Clone, Debug)]
struct Node {
    layer: LayerName,
    drawable: Drawable,
    position: IVec2,
    visible: bool,
    slot: (u8, u64),
}

/// Scene redrawn from scratch every frame.
///
/// Nodes are kept in a stack ordered by `(layer z, sequence)`. Creating or
/// raising a node gives it a fresh sequence number, so it paints above the
/// other nodes of its layer and never above a higher layer.
#[derive(Clone, Debug, Default)]
pub struct ImmediateScene {
    size: UVec2,
    next_handle: u64,
    next_sequence: u64,
    nodes: HashMap<SceneHandle, Node>,
    stack: BTreeMap<(u8, u64), SceneHandle>,
}

impl ImmediateScene {
    /// Creates an empty scene for a canvas of the provided size.
    #[must_use]
    pub fn new(size: UVec2) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    /// Records the size of the window's drawable area.
    pub fn set_canvas_size(&mut self, size: UVec2) {
        self.size = size;
    }

    /// Number of hosted nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the scene hosts no node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Visible nodes in painting order, bottom first.
    pub fn draw_list(&self) -> impl Iterator<Item = DrawItem<'_>> + '_ {
        self.stack.values().filter_map(|handle| {
            let node = self.nodes.get(handle)?;
            node.visible.then_some(DrawItem {
                handle: *handle,
                layer: node.layer,
                position: node.position,
                drawable: &node.drawable,
            })
        })
    }

    fn insert(&mut self, layer: LayerName, drawable: Drawable, position: IVec2) -> SceneHandle {
        let handle = SceneHandle(self.next_handle);
        self.next_handle += 1;
        let slot = self.claim_slot(layer);
        let _ = self.stack.insert(slot, handle);
        let _ = self.nodes.insert(
            handle,
            Node {
                layer,
                drawable,
                position,
                visible: true,
                slot,
            },
        );
        handle
    }

    fn claim_slot(&mut self, layer: LayerName) -> (u8, u64) {
        let slot = (layer.z(), self.next_sequence);
        self.next_sequence += 1;
        slot
    }
}

impl SceneBackend for ImmediateScene {
    type Handle = SceneHandle;

    fn canvas_size(&self) -> UVec2 {
        self.size
    }

    fn create_image(
        &mut self,
        layer: LayerName,
        image: Option<Raster>,
        position: IVec2,
    ) -> SceneHandle {
        self.insert(layer, Drawable::Image(image), position)
    }

    fn set_image(&mut self, handle: SceneHandle, image: Option<Raster>) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.drawable = Drawable::Image(image);
        }
    }

    fn create_shape(&mut self, layer: LayerName, shape: Shape) -> SceneHandle {
        self.insert(layer, Drawable::Shape(shape), IVec2::ZERO)
    }

    fn set_shape(&mut self, handle: SceneHandle, shape: Shape) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.drawable = Drawable::Shape(shape);
        }
    }

    fn move_to(&mut self, handle: SceneHandle, position: IVec2) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.position = position;
        }
    }

    fn set_visible(&mut self, handle: SceneHandle, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.visible = visible;
        }
    }

    fn raise_to_layer(&mut self, handle: SceneHandle, layer: LayerName) {
        if !self.nodes.contains_key(&handle) {
            return;
        }
        let slot = self.claim_slot(layer);
        if let Some(node) = self.nodes.get_mut(&handle) {
            let _ = self.stack.remove(&node.slot);
            node.layer = layer;
            node.slot = slot;
        }
        let _ = self.stack.insert(slot, handle);
    }

    fn destroy(&mut self, handle: SceneHandle) {
        if let Some(node) = self.nodes.remove(&handle) {
            let _ = self.stack.remove(&node.slot);
        }
    }
}
