use std::{collections::HashSet, sync::Arc};

use glam::{IVec2, UVec2};
use labpyrinthe_core::{
    Case, ChangeLog, ContainerEvent, LayerKind, LayerName, MapPayload, PartieState,
    RobotListing, DEFAULT_MAX_CELL_SIZE,
};
use labpyrinthe_skin::{ImageRasterBackend, Raster, RasterBackend, SkinStore};

use crate::{
    geometry::Viewport,
    highlight::Highlight,
    scene::{Item, ItemKey, SceneModel},
    Color, RenderingError, SceneBackend, Shape,
};

/// Outline width of the highlight circles, in pixels.
const HIGHLIGHT_WIDTH: f32 = 2.0;

/// How moves reach the screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AnimationResolution {
    /// Moved cases jump from cell to cell inside the change log.
    #[default]
    Cell,
    /// Moves are interpolated per pixel by an external animator; moved cases
    /// in change logs are ignored.
    Pixel,
}

/// Settings of a [`MapPublisher`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PublisherConfig {
    /// Largest cell side in pixels.
    pub max_cell_size: u32,
    /// How moves are animated.
    pub animation_resolution: AnimationResolution,
    /// Fill of the map background rectangle.
    pub background: Color,
    /// Fill of the clip mask around the map.
    pub mask: Color,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            max_cell_size: DEFAULT_MAX_CELL_SIZE,
            animation_resolution: AnimationResolution::Cell,
            background: Color::from_rgb_u8(0, 0, 0),
            mask: Color::from_rgb_u8(24, 24, 24),
        }
    }
}

/// Counters describing the publisher's work so far.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PublishStats {
    /// Image items created.
    pub created: u64,
    /// Image items destroyed.
    pub destroyed: u64,
    /// Existing items rebound to a new case.
    pub updated: u64,
    /// Raster swaps performed on existing items.
    pub image_swaps: u64,
    /// Z-management passes run.
    pub z_passes: u64,
    /// Z-management passes skipped because the tick animated.
    pub skipped_z_passes: u64,
    /// Cases dropped because their type is unknown.
    pub ignored_cases: u64,
    /// Full publications completed.
    pub full_publishes: u64,
    /// Change logs applied.
    pub deltas: u64,
}

/// Translates map payloads and change logs into a layered scene.
///
/// The publisher owns the item indexes and the skin; the backend passed to
/// each call owns the nodes. Always pass the same backend: handles are only
/// meaningful to the backend that created them.
#[derive(Debug)]
pub struct MapPublisher<H, R = ImageRasterBackend> {
    config: PublisherConfig,
    skin: SkinStore<R>,
    scene: SceneModel<H>,
    map_size: Option<UVec2>,
    viewport: Option<Viewport>,
    initialised: bool,
    published: bool,
    highlight: Option<Highlight>,
    seen: Option<HashSet<(LayerName, ItemKey)>>,
    stats: PublishStats,
}

impl<H, R> MapPublisher<H, R>
where
    H: Copy + Eq + std::hash::Hash + std::fmt::Debug,
    R: RasterBackend,
{
    /// Creates a publisher drawing with the provided skin.
    ///
    /// # Errors
    ///
    /// Fails when `max_cell_size` is zero.
    pub fn new(config: PublisherConfig, skin: SkinStore<R>) -> Result<Self, RenderingError> {
        if config.max_cell_size == 0 {
            return Err(RenderingError::InvalidMaxCellSize {
                max_cell_size: config.max_cell_size,
            });
        }
        Ok(Self {
            config,
            skin,
            scene: SceneModel::new(),
            map_size: None,
            viewport: None,
            initialised: false,
            published: false,
            highlight: None,
            seen: None,
            stats: PublishStats::default(),
        })
    }

    /// Settings of the publisher.
    #[must_use]
    pub const fn config(&self) -> &PublisherConfig {
        &self.config
    }

    /// Item indexes and shape handles.
    #[must_use]
    pub const fn scene(&self) -> &SceneModel<H> {
        &self.scene
    }

    /// Skin used to resolve case images.
    #[must_use]
    pub const fn skin(&self) -> &SkinStore<R> {
        &self.skin
    }

    /// Mutable access to the skin, for callers drawing outside the map.
    pub fn skin_mut(&mut self) -> &mut SkinStore<R> {
        &mut self.skin
    }

    /// Current geometry, `None` until the canvas and the map have an area.
    #[must_use]
    pub const fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    /// Whether the geometry matches the current canvas.
    #[must_use]
    pub const fn is_initialised(&self) -> bool {
        self.initialised
    }

    /// Whether a full publication has completed.
    #[must_use]
    pub const fn is_published(&self) -> bool {
        self.published
    }

    /// State the container returns to after a resize.
    #[must_use]
    pub const fn game_phase(&self) -> PartieState {
        if self.published {
            PartieState::Game
        } else {
            PartieState::Creating
        }
    }

    /// Highlight currently drawn, if any.
    #[must_use]
    pub const fn highlight(&self) -> Option<&Highlight> {
        self.highlight.as_ref()
    }

    /// Work counters.
    #[must_use]
    pub const fn stats(&self) -> PublishStats {
        self.stats
    }

    /// Marks the geometry stale; the next [`Self::reflow`] recomputes it.
    pub fn invalidate_geometry(&mut self) {
        self.initialised = false;
    }

    /// Publishes the whole map.
    ///
    /// Items whose key is absent from the payload are destroyed afterwards,
    /// so the indexes end up holding exactly the payload's cases.
    pub fn publish_full<B>(
        &mut self,
        backend: &mut B,
        payload: &MapPayload,
        out: &mut Vec<ContainerEvent>,
    ) where
        B: SceneBackend<Handle = H>,
    {
        let map_size = UVec2::new(payload.width, payload.height);
        if !self.initialised || self.map_size != Some(map_size) {
            self.map_size = Some(map_size);
            self.reflow(backend, out);
        }

        self.clear_layer(backend, LayerName::Animation);
        if payload.debug.is_some() {
            self.clear_layer(backend, LayerName::Debug);
        }
        self.refresh_shapes(backend);

        self.seen = Some(HashSet::new());
        for case in payload.cases() {
            self.set_case(backend, case);
        }
        if let Some(seen) = self.seen.take() {
            self.prune(backend, &seen);
        }

        self.restack(backend);
        self.published = true;
        self.stats.full_publishes += 1;
        tracing::debug!(
            width = payload.width,
            height = payload.height,
            items = self.scene.item_count(),
            "published full map"
        );
        out.push(ContainerEvent::CartePublished);
    }

    /// Applies one tick's change log.
    ///
    /// Lists are applied as added, deleted, moved, cleared, animated. Ticks
    /// that animate skip z-management.
    pub fn publish_delta<B>(&mut self, backend: &mut B, log: &ChangeLog)
    where
        B: SceneBackend<Handle = H>,
    {
        for case in &log.cases_added {
            self.set_case(backend, case);
        }
        for case in &log.cases_deleted {
            self.delete_case(backend, case);
        }
        if self.config.animation_resolution == AnimationResolution::Cell {
            for case in &log.cases_moved {
                self.set_case(backend, case);
            }
        }
        for layer in &log.cleared_typecases {
            self.clear_layer(backend, *layer);
        }
        for case in &log.cases_anim {
            self.set_case(backend, case);
        }

        if log.has_anim() {
            self.stats.skipped_z_passes += 1;
        } else {
            self.restack(backend);
        }
        self.stats.deltas += 1;
        tracing::trace!(
            added = log.cases_added.len(),
            deleted = log.cases_deleted.len(),
            moved = log.cases_moved.len(),
            cleared = log.cleared_typecases.len(),
            anim = log.cases_anim.len(),
            "applied change log"
        );
    }

    /// Refreshes the highlight of the robot playing the active turn.
    pub fn publish_robotlist<B>(&mut self, backend: &mut B, listing: &RobotListing)
    where
        B: SceneBackend<Handle = H>,
    {
        self.highlight = Highlight::for_listing(listing);
        self.refresh_highlight(backend);
    }

    /// Binds a case to its item, creating the item when needed.
    ///
    /// Unknown case types are ignored. A case whose image cannot be resolved
    /// gets an invisible item; dead robots keep their item but are hidden.
    pub fn set_case<B>(&mut self, backend: &mut B, case: &Case)
    where
        B: SceneBackend<Handle = H>,
    {
        let Some((layer, key)) = ItemKey::route(case) else {
            self.stats.ignored_cases += 1;
            tracing::trace!(x = case.x, y = case.y, "ignored case of unknown type");
            return;
        };
        if let Some(seen) = self.seen.as_mut() {
            let _ = seen.insert((layer, key));
        }

        let image = self
            .viewport
            .and_then(|viewport| self.skin.image_for_case(case, viewport.cell_size()));
        let position = self.position_of(case);
        let visible = case_visible(case, image.as_ref());

        let Some(items) = self.scene.layers.get_mut(&layer) else {
            return;
        };
        match items.get_mut(&key) {
            Some(item) => {
                item.case = *case;
                if !same_raster(item.skin_image.as_ref(), image.as_ref()) {
                    backend.set_image(item.handle, image.clone());
                    item.skin_image = image;
                    self.stats.image_swaps += 1;
                }
                backend.move_to(item.handle, position);
                if item.visible != visible {
                    backend.set_visible(item.handle, visible);
                    item.visible = visible;
                }
                self.stats.updated += 1;
            }
            None => {
                let handle = backend.create_image(layer, image.clone(), position);
                if !visible {
                    backend.set_visible(handle, false);
                }
                let _ = items.insert(
                    key,
                    Item {
                        case: *case,
                        layer,
                        skin_image: image,
                        handle,
                        visible,
                    },
                );
                self.stats.created += 1;
            }
        }
    }

    /// Removes the item backing a case, if any.
    pub fn delete_case<B>(&mut self, backend: &mut B, case: &Case)
    where
        B: SceneBackend<Handle = H>,
    {
        let Some((layer, key)) = ItemKey::route(case) else {
            return;
        };
        let removed = self
            .scene
            .layers
            .get_mut(&layer)
            .and_then(|items| items.remove(&key));
        if let Some(item) = removed {
            backend.destroy(item.handle);
            self.stats.destroyed += 1;
        }
    }

    /// Moves the item backing a case to another cell, creating it if needed.
    pub fn move_case<B>(&mut self, backend: &mut B, case: &Case, x: u32, y: u32)
    where
        B: SceneBackend<Handle = H>,
    {
        self.set_case(backend, &case.moved_to(x, y));
    }

    /// Empties a layer: image items are destroyed, shapes are hidden.
    pub fn clear_layer<B>(&mut self, backend: &mut B, layer: LayerName)
    where
        B: SceneBackend<Handle = H>,
    {
        if layer.kind() == LayerKind::Shape {
            let handles: Vec<H> = self
                .scene
                .shapes
                .handles()
                .filter(|(owner, _)| *owner == layer)
                .map(|(_, handle)| handle)
                .collect();
            for handle in handles {
                backend.set_visible(handle, false);
            }
            if layer == LayerName::ShapeHighlightRobot {
                self.highlight = None;
            }
            return;
        }

        let Some(items) = self.scene.layers.get_mut(&layer) else {
            return;
        };
        for (_, item) in items.drain() {
            backend.destroy(item.handle);
            self.stats.destroyed += 1;
        }
    }

    /// Recomputes the geometry from the backend's canvas.
    ///
    /// Rasters are refreshed when the cell size changed and items moved when
    /// the cell size or the origin changed. Stays uninitialised while the
    /// canvas has no area.
    pub fn reflow<B>(&mut self, backend: &mut B, out: &mut Vec<ContainerEvent>)
    where
        B: SceneBackend<Handle = H>,
    {
        self.initialised = false;
        let Some(map_size) = self.map_size else {
            return;
        };
        let canvas = backend.canvas_size();
        let Some(viewport) = Viewport::compute(canvas, map_size, self.config.max_cell_size)
        else {
            tracing::debug!(?canvas, "geometry deferred until the canvas has an area");
            return;
        };

        let previous = self.viewport.replace(viewport);
        let size_changed = previous.map(|old| old.cell_size()) != Some(viewport.cell_size());
        let origin_changed = previous.map(|old| old.origin()) != Some(viewport.origin());

        if size_changed || origin_changed {
            for items in self.scene.layers.values_mut() {
                for item in items.values_mut() {
                    if size_changed {
                        let image = self.skin.image_for_case(&item.case, viewport.cell_size());
                        if !same_raster(item.skin_image.as_ref(), image.as_ref()) {
                            backend.set_image(item.handle, image.clone());
                            self.stats.image_swaps += 1;
                        }
                        let visible = case_visible(&item.case, image.as_ref());
                        if item.visible != visible {
                            backend.set_visible(item.handle, visible);
                            item.visible = visible;
                        }
                        item.skin_image = image;
                    }
                    backend.move_to(item.handle, viewport.case_to_pixel(item.case.cell()));
                }
            }
        }

        self.refresh_shapes(backend);
        self.initialised = true;
        tracing::debug!(
            cell_size = viewport.cell_size(),
            origin = ?viewport.origin(),
            "geometry updated"
        );
        out.push(ContainerEvent::GeometryUpdated {
            cell_size: viewport.cell_size(),
            origin: (viewport.origin().x, viewport.origin().y),
        });
    }

    fn position_of(&self, case: &Case) -> IVec2 {
        self.viewport
            .map_or(IVec2::ZERO, |viewport| viewport.case_to_pixel(case.cell()))
    }

    fn prune<B>(&mut self, backend: &mut B, seen: &HashSet<(LayerName, ItemKey)>)
    where
        B: SceneBackend<Handle = H>,
    {
        for (layer, items) in &mut self.scene.layers {
            let stale: Vec<ItemKey> = items
                .keys()
                .filter(|key| !seen.contains(&(*layer, **key)))
                .copied()
                .collect();
            for key in stale {
                if let Some(item) = items.remove(&key) {
                    backend.destroy(item.handle);
                    self.stats.destroyed += 1;
                }
            }
        }
    }

    /// Raises every node above its layer's lower neighbours, in layer order.
    fn restack<B>(&mut self, backend: &mut B)
    where
        B: SceneBackend<Handle = H>,
    {
        let shapes: Vec<(LayerName, H)> = self.scene.shapes.handles().collect();
        for layer in LayerName::ALL {
            for (owner, handle) in &shapes {
                if *owner == layer {
                    backend.raise_to_layer(*handle, layer);
                }
            }
            if let Some(items) = self.scene.layers.get(&layer) {
                let mut keys: Vec<&ItemKey> = items.keys().collect();
                keys.sort();
                for key in keys {
                    if let Some(item) = items.get(key) {
                        backend.raise_to_layer(item.handle, layer);
                    }
                }
            }
        }
        self.stats.z_passes += 1;
    }

    fn refresh_shapes<B>(&mut self, backend: &mut B)
    where
        B: SceneBackend<Handle = H>,
    {
        let Some(viewport) = self.viewport else {
            return;
        };

        let background = Shape::Rect {
            rect: viewport.map_rect(),
            fill: self.config.background,
        };
        match self.scene.shapes.background {
            Some(handle) => backend.set_shape(handle, background),
            None => {
                self.scene.shapes.background =
                    Some(backend.create_shape(LayerName::ShapeBg, background));
            }
        }

        let rects = viewport.mask_rects();
        match self.scene.shapes.mask {
            Some(handles) => {
                for (handle, rect) in handles.into_iter().zip(rects) {
                    backend.set_shape(
                        handle,
                        Shape::Rect {
                            rect,
                            fill: self.config.mask,
                        },
                    );
                }
            }
            None => {
                let fill = self.config.mask;
                self.scene.shapes.mask = Some(rects.map(|rect| {
                    backend.create_shape(LayerName::ShapeMask, Shape::Rect { rect, fill })
                }));
            }
        }

        self.refresh_highlight(backend);
    }

    fn refresh_highlight<B>(&mut self, backend: &mut B)
    where
        B: SceneBackend<Handle = H>,
    {
        let Some(viewport) = self.viewport else {
            return;
        };
        let circles = self.highlight.map(|highlight| {
            let outline = Color::from_hex(highlight.color);
            (
                Shape::Circle {
                    bounds: highlight.player.bounds().to_pixels(&viewport),
                    outline,
                    width: HIGHLIGHT_WIDTH,
                },
                Shape::Circle {
                    bounds: highlight.action.bounds().to_pixels(&viewport),
                    outline,
                    width: HIGHLIGHT_WIDTH,
                },
            )
        });

        let shapes = &mut self.scene.shapes;
        for (slot, shape) in [
            (&mut shapes.player_circle, circles.map(|(player, _)| player)),
            (&mut shapes.action_circle, circles.map(|(_, action)| action)),
        ] {
            match (*slot, shape) {
                (Some(handle), Some(shape)) => {
                    backend.set_shape(handle, shape);
                    backend.set_visible(handle, true);
                }
                (Some(handle), None) => backend.set_visible(handle, false),
                (None, Some(shape)) => {
                    *slot = Some(backend.create_shape(LayerName::ShapeHighlightRobot, shape));
                }
                (None, None) => {}
            }
        }
    }
}

fn case_visible(case: &Case, image: Option<&Raster>) -> bool {
    let alive = case.robot().map_or(true, |robot| robot.alive);
    case.visible && alive && image.is_some()
}

fn same_raster(current: Option<&Raster>, next: Option<&Raster>) -> bool {
    match (current, next) {
        (Some(current), Some(next)) => Arc::ptr_eq(current, next),
        (None, None) => true,
        _ => false,
    }
}
