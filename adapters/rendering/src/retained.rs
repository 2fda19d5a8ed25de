use std::collections::HashMap;

use glam::{IVec2, UVec2};
use labpyrinthe_core::LayerName;
use labpyrinthe_skin::Raster;

use crate::{SceneBackend, Shape};

/// Identifier of a node in a [`RetainedCanvas`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Retrieves the raw identifier value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Content of a retained node.
#[derive(Clone, Debug)]
pub enum NodeView {
    /// Zero-pixel sentinel marking the bottom of a layer.
    Splitter,
    /// Raster drawn at the node position.
    Image(Option<Raster>),
    /// Vector shape.
    Shape(Shape),
}

#[derive(Clone, Debug)]
struct Node {
    layer: LayerName,
    view: NodeView,
    position: IVec2,
    visible: bool,
}

/// Retained-mode display list.
///
/// One splitter per layer is inserted at construction, in ascending z. New
/// nodes land on top of their own layer, just below the next layer's
/// splitter; raising a node to its layer reinserts it just above that
/// layer's splitter. Either way the painter's order stays sorted by layer z.
#[derive(Clone, Debug)]
pub struct RetainedCanvas {
    size: UVec2,
    next_id: u64,
    nodes: HashMap<NodeId, Node>,
    order: Vec<NodeId>,
    splitters: HashMap<LayerName, NodeId>,
}

impl RetainedCanvas {
    /// Creates an empty canvas of the provided size.
    #[must_use]
    pub fn new(size: UVec2) -> Self {
        let mut canvas = Self {
            size,
            next_id: 0,
            nodes: HashMap::new(),
            order: Vec::new(),
            splitters: HashMap::new(),
        };
        for layer in LayerName::ALL {
            let id = canvas.push(layer, NodeView::Splitter);
            let _ = canvas.splitters.insert(layer, id);
        }
        canvas
    }

    /// Resizes the canvas, as a window resize would.
    pub fn set_canvas_size(&mut self, size: UVec2) {
        self.size = size;
    }

    /// Number of nodes, splitters excluded.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.splitters.len()
    }

    /// Content of a node.
    #[must_use]
    pub fn view(&self, id: NodeId) -> Option<&NodeView> {
        self.nodes.get(&id).map(|node| &node.view)
    }

    /// Position of a node.
    #[must_use]
    pub fn position(&self, id: NodeId) -> Option<IVec2> {
        self.nodes.get(&id).map(|node| node.position)
    }

    /// Whether a node is shown; `None` for unknown nodes.
    #[must_use]
    pub fn is_visible(&self, id: NodeId) -> Option<bool> {
        self.nodes.get(&id).map(|node| node.visible)
    }

    /// Visible nodes from bottom to top, with their layers.
    #[must_use]
    pub fn painters_order(&self) -> Vec<(NodeId, LayerName)> {
        self.order
            .iter()
            .filter_map(|id| {
                let node = self.nodes.get(id)?;
                let drawn = node.visible && !matches!(node.view, NodeView::Splitter);
                drawn.then_some((*id, node.layer))
            })
            .collect()
    }

    /// Whether the visible nodes are painted by ascending layer z.
    #[must_use]
    pub fn is_layer_ordered(&self) -> bool {
        self.painters_order()
            .windows(2)
            .all(|pair| pair[0].1.z() <= pair[1].1.z())
    }

    fn push(&mut self, layer: LayerName, view: NodeView) -> NodeId {
        let id = self.allocate(layer, view);
        self.order.push(id);
        id
    }

    /// Inserts a node at the top of its layer's segment.
    fn push_in_layer(&mut self, layer: LayerName, view: NodeView) -> NodeId {
        let id = self.allocate(layer, view);
        let index = self.segment_end(layer);
        self.order.insert(index, id);
        id
    }

    /// Index of the first splitter above `layer`'s splitter, or the end of
    /// the list for the topmost layer.
    fn segment_end(&self, layer: LayerName) -> usize {
        let Some(start) = self
            .splitters
            .get(&layer)
            .and_then(|splitter| self.order.iter().position(|id| id == splitter))
        else {
            return self.order.len();
        };
        self.order[start + 1..]
            .iter()
            .position(|id| {
                self.nodes
                    .get(id)
                    .is_some_and(|node| matches!(node.view, NodeView::Splitter))
            })
            .map_or(self.order.len(), |offset| start + 1 + offset)
    }

    fn allocate(&mut self, layer: LayerName, view: NodeView) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        let _ = self.nodes.insert(
            id,
            Node {
                layer,
                view,
                position: IVec2::ZERO,
                visible: true,
            },
        );
        id
    }

    fn unlink(&mut self, id: NodeId) {
        self.order.retain(|other| *other != id);
    }
}

impl SceneBackend for RetainedCanvas {
    type Handle = NodeId;

    fn canvas_size(&self) -> UVec2 {
        self.size
    }

    fn create_image(&mut self, layer: LayerName, image: Option<Raster>, position: IVec2) -> NodeId {
        let id = self.push_in_layer(layer, NodeView::Image(image));
        self.move_to(id, position);
        id
    }

    fn set_image(&mut self, handle: NodeId, image: Option<Raster>) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.view = NodeView::Image(image);
        }
    }

    fn create_shape(&mut self, layer: LayerName, shape: Shape) -> NodeId {
        self.push_in_layer(layer, NodeView::Shape(shape))
    }

    fn set_shape(&mut self, handle: NodeId, shape: Shape) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.view = NodeView::Shape(shape);
        }
    }

    fn move_to(&mut self, handle: NodeId, position: IVec2) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.position = position;
        }
    }

    fn set_visible(&mut self, handle: NodeId, visible: bool) {
        if let Some(node) = self.nodes.get_mut(&handle) {
            node.visible = visible;
        }
    }

    fn raise_to_layer(&mut self, handle: NodeId, layer: LayerName) {
        let Some(&splitter) = self.splitters.get(&layer) else {
            return;
        };
        let Some(node) = self.nodes.get_mut(&handle) else {
            return;
        };
        node.layer = layer;
        self.unlink(handle);
        let index = self
            .order
            .iter()
            .position(|id| *id == splitter)
            .map_or(self.order.len(), |index| index + 1);
        self.order.insert(index, handle);
    }

    fn destroy(&mut self, handle: NodeId) {
        if self.nodes.remove(&handle).is_some() {
            self.unlink(handle);
        }
    }
}
