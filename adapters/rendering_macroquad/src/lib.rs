#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Immediate-mode rendering of the Labpyrinthe map on macroquad.
//!
//! The map publisher mutates an [`ImmediateScene`] from the update closure;
//! the loop then repaints every visible node by ascending layer z. Rasters
//! are uploaded to the GPU lazily and released once no node shows them.
//! Macroquad is built without its `audio` feature: nothing here plays sound.

mod scene;
mod textures;

pub use scene::{DrawItem, Drawable, ImmediateScene, SceneHandle};

use anyhow::{Context, Result};
use glam::{IVec2, UVec2};
use labpyrinthe_rendering::{
    Color, FrameControl, FrameInput, Presentation, RenderingBackend, Shape,
};
use macroquad::input::{
    is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton,
};
use std::{
    sync::mpsc,
    time::{Duration, Instant},
};

use self::textures::TextureCache;

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `F` toggles fullscreen.
    toggle_fullscreen: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            toggle_fullscreen: is_key_pressed(KeyCode::F),
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

/// Durations of one loop iteration.
#[derive(Clone, Copy, Debug, Default)]
struct FrameSample {
    frame: Duration,
    update: Duration,
    render: Duration,
}

/// Summary of the frames rendered during the last second.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FrameReport {
    fps: f32,
    mean_update: Duration,
    mean_render: Duration,
    slowest_frame: Duration,
}

/// Accumulates frame samples and yields a [`FrameReport`] once per second.
#[derive(Debug, Default)]
struct FrameTimings {
    window: Duration,
    samples: u32,
    update: Duration,
    render: Duration,
    slowest_frame: Duration,
}

impl FrameTimings {
    fn record(&mut self, sample: FrameSample) -> Option<FrameReport> {
        self.window += sample.frame;
        self.samples = self.samples.saturating_add(1);
        self.update += sample.update;
        self.render += sample.render;
        self.slowest_frame = self.slowest_frame.max(sample.frame);

        if self.window < Duration::from_secs(1) {
            return None;
        }

        let timings = std::mem::take(self);
        Some(FrameReport {
            fps: timings.samples as f32 / timings.window.as_secs_f32(),
            mean_update: timings.update / timings.samples,
            mean_render: timings.render / timings.samples,
            slowest_frame: timings.slowest_frame,
        })
    }
}

impl RenderingBackend for MacroquadBackend {
    type Scene = ImmediateScene;

    fn run<F>(self, presentation: Presentation, mut update: F) -> Result<()>
    where
        F: FnMut(FrameInput, &mut ImmediateScene) -> FrameControl + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            window_size,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: i32::try_from(window_size.x).context("window width exceeds i32")?,
            window_height: i32::try_from(window_size.y).context("window height exceeds i32")?,
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        let (outcome_sender, outcome_receiver) = mpsc::channel::<Result<()>>();

        macroquad::Window::from_config(config, async move {
            let background = to_macroquad_color(clear_color);
            let mut scene = ImmediateScene::new(window_size);
            let mut textures = TextureCache::default();
            let mut timings = FrameTimings::default();
            let mut fullscreen = false;
            let mut outcome = Ok(());

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }
                if keyboard.toggle_fullscreen {
                    fullscreen = !fullscreen;
                    macroquad::window::set_fullscreen(fullscreen);
                }

                macroquad::window::clear_background(background);

                let canvas_size = UVec2::new(
                    macroquad::window::screen_width().max(0.0) as u32,
                    macroquad::window::screen_height().max(0.0) as u32,
                );
                scene.set_canvas_size(canvas_size);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let click = is_mouse_button_pressed(MouseButton::Left).then(|| {
                    let (x, y) = mouse_position();
                    IVec2::new(x.floor() as i32, y.floor() as i32)
                });
                let frame_input = FrameInput {
                    dt: frame_dt,
                    canvas_size,
                    click,
                };

                let update_start = Instant::now();
                let control = update(frame_input, &mut scene);
                let update_duration = update_start.elapsed();

                let render_start = Instant::now();
                if let Err(error) = draw_scene(&scene, &mut textures) {
                    tracing::error!(error = %format!("{error:#}"), "failed to draw the scene");
                    outcome = Err(error);
                    break;
                }
                textures.end_frame();
                let render_duration = render_start.elapsed();

                let report = timings.record(FrameSample {
                    frame: frame_dt,
                    update: update_duration,
                    render: render_duration,
                });
                if let Some(report) = report.filter(|_| show_fps) {
                    tracing::info!(
                        fps = f64::from(report.fps),
                        update_ms = report.mean_update.as_secs_f64() * 1_000.0,
                        render_ms = report.mean_render.as_secs_f64() * 1_000.0,
                        slowest_ms = report.slowest_frame.as_secs_f64() * 1_000.0,
                        nodes = scene.len(),
                        "frame timings"
                    );
                }

                if control == FrameControl::Exit {
                    break;
                }
                macroquad::window::next_frame().await;
            }

            let _ = outcome_sender.send(outcome);
        });

        outcome_receiver.recv().unwrap_or_else(|_| Ok(()))?;

        Ok(())
    }
}

fn draw_scene(scene: &ImmediateScene, textures: &mut TextureCache) -> Result<()> {
    for item in scene.draw_list() {
        match item.drawable {
            Drawable::Image(Some(raster)) => {
                let texture = textures.texture(raster)?;
                macroquad::texture::draw_texture(
                    texture,
                    item.position.x as f32,
                    item.position.y as f32,
                    macroquad::color::WHITE,
                );
            }
            Drawable::Image(None) => {}
            Drawable::Shape(shape) => draw_shape(*shape, item.position),
        }
    }
    Ok(())
}

fn draw_shape(shape: Shape, offset: IVec2) {
    match shape {
        Shape::Rect { rect, fill } => {
            if rect.is_empty() {
                return;
            }
            let origin = rect.origin + offset;
            macroquad::shapes::draw_rectangle(
                origin.x as f32,
                origin.y as f32,
                rect.size.x as f32,
                rect.size.y as f32,
                to_macroquad_color(fill),
            );
        }
        Shape::Circle {
            bounds,
            outline,
            width,
        } => {
            if bounds.is_empty() {
                return;
            }
            let radius = bounds.size.x.min(bounds.size.y) as f32 / 2.0;
            let origin = bounds.origin + offset;
            macroquad::shapes::draw_circle_lines(
                origin.x as f32 + bounds.size.x as f32 / 2.0,
                origin.y as f32 + bounds.size.y as f32 / 2.0,
                radius,
                width,
                to_macroquad_color(outline),
            );
        }
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_maps_to_swap_interval() {
        assert_eq!(MacroquadBackend::new().with_vsync(true).swap_interval, Some(1));
        assert_eq!(MacroquadBackend::new().with_vsync(false).swap_interval, Some(0));
        assert_eq!(MacroquadBackend::new().swap_interval, None);
    }

    #[test]
    fn colours_keep_their_channels() {
        let color = to_macroquad_color(Color::new(0.25, 0.5, 0.75, 1.0));
        assert_eq!((color.r, color.g, color.b, color.a), (0.25, 0.5, 0.75, 1.0));
    }

    fn sample(frame_millis: u64, update_millis: u64) -> FrameSample {
        FrameSample {
            frame: Duration::from_millis(frame_millis),
            update: Duration::from_millis(update_millis),
            render: Duration::from_millis(1),
        }
    }

    #[test]
    fn timings_report_once_per_second() {
        let mut timings = FrameTimings::default();
        assert!(timings.record(sample(250, 2)).is_none());
        assert!(timings.record(sample(250, 4)).is_none());
        assert!(timings.record(sample(400, 6)).is_none());

        let report = timings
            .record(sample(100, 4))
            .expect("one second of samples");
        assert!((report.fps - 4.0).abs() <= 1e-3);
        assert_eq!(report.mean_update, Duration::from_millis(4));
        assert_eq!(report.mean_render, Duration::from_millis(1));
        assert_eq!(report.slowest_frame, Duration::from_millis(400));

        assert!(timings.record(sample(250, 2)).is_none());
    }

    #[test]
    fn a_single_long_frame_still_reports() {
        let mut timings = FrameTimings::default();
        let report = timings
            .record(sample(2_000, 0))
            .expect("the frame alone spans a second");
        assert!((report.fps - 0.5).abs() <= 1e-3);
        assert_eq!(report.slowest_frame, Duration::from_secs(2));
    }
}
