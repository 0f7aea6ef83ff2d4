use crate::{run, App, CropUniform, Fps, Rect, Render, PKG_NAME};
use glam::Vec2;
use std::sync::Arc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
use wgpu::SurfaceError;
use winit::dpi::PhysicalSize;
use winit::event::KeyEvent;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::Window;

#[cfg_attr(target_arch = "wasm32", wasm_bindgen(start))]
pub fn start() {
    run::<AppData>(PKG_NAME).expect("failed to run the event loop");
}

/// Pixels the crop moves per arrow-key press.
const CROP_STEP: f32 = 16.0;
/// Smallest crop edge the demo allows, to keep the view readable.
const MIN_CROP: f32 = 32.0;

pub struct AppData {
    render: Render,
    texture_size: Vec2,
    /// Pixel-space crop of the source; `None` shows the full texture.
    crop: Option<Rect>,
    size: PhysicalSize<u32>,
    if_size_changed: bool,
    fps: Fps,
}

impl AppData {
    fn default_crop(&self) -> Rect {
        // Centered, half the source on each axis.
        let size = self.texture_size / 2.0;
        Rect::from_origin_size(self.texture_size / 4.0, size)
    }

    fn move_crop(&mut self, offset: Vec2) {
        if let Some(crop) = self.crop {
            self.crop = Some(crop.translate_within(offset, self.texture_size));
        }
    }

    /// Grows (positive) or shrinks (negative) the crop around its center.
    fn scale_crop(&mut self, amount: f32) {
        if let Some(crop) = self.crop {
            let size = (crop.size() + Vec2::splat(2.0 * amount))
                .clamp(Vec2::splat(MIN_CROP), self.texture_size);
            let center = (crop.min + crop.max) / 2.0;
            self.crop = Some(
                Rect::from_origin_size(center - size / 2.0, size)
                    .translate_within(Vec2::ZERO, self.texture_size),
            );
        }
    }
}

impl App for AppData {
    async fn new(window: Arc<Window>) -> Self {
        let mut render = Render::new(window.clone())
            .await
            .expect("Failed to create render");

        let texture_size = load_source_texture(&mut render);
        log::info!("source texture: {texture_size:?}");

        Self {
            render,
            texture_size,
            crop: None,
            size: window.inner_size(),
            // Starts true so the surface is sized before the first frame.
            if_size_changed: true,
            fps: Fps::new(),
        }
    }

    fn set_window_resized(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        self.if_size_changed = true;
    }

    fn keyboard_input(&mut self, event: &KeyEvent) -> bool {
        if !event.state.is_pressed() {
            return false;
        }
        if let PhysicalKey::Code(key_code) = event.physical_key {
            match key_code {
                KeyCode::Space => {
                    self.crop = match self.crop {
                        Some(_) => None,
                        None => Some(self.default_crop()),
                    };
                    log::info!("crop: {:?}", self.crop);
                }
                KeyCode::ArrowLeft => self.move_crop(Vec2::new(-CROP_STEP, 0.0)),
                KeyCode::ArrowRight => self.move_crop(Vec2::new(CROP_STEP, 0.0)),
                KeyCode::ArrowUp => self.move_crop(Vec2::new(0.0, -CROP_STEP)),
                KeyCode::ArrowDown => self.move_crop(Vec2::new(0.0, CROP_STEP)),
                KeyCode::KeyZ => self.scale_crop(-CROP_STEP),
                KeyCode::KeyX => self.scale_crop(CROP_STEP),
                _ => {}
            }
        }
        false
    }

    fn render(&mut self) -> Result<(), SurfaceError> {
        if self.if_size_changed {
            self.render.resize(self.size.width, self.size.height);
            self.if_size_changed = false;
        }

        // Only update state while minimized, don't render.
        if self.size.width > 0 && self.size.height > 0 {
            let crop = self
                .crop
                .map(|rect| CropUniform::from_rect(rect, self.texture_size));
            self.render.render(crop);
        }
        self.fps.update();

        Ok(())
    }
}

/// Loads the source texture: a png path from argv on native, otherwise a
/// generated checkerboard.
fn load_source_texture(render: &mut Render) -> Vec2 {
    #[cfg(not(target_arch = "wasm32"))]
    if let Some(path) = std::env::args().nth(1) {
        match std::fs::read(&path) {
            Ok(bytes) => match render.load_texture(&bytes) {
                Ok(size) => return size,
                Err(e) => log::error!("couldn't decode {path}: {e}"),
            },
            Err(e) => log::error!("couldn't read {path}: {e}"),
        }
    }

    const SIZE: u32 = 512;
    const CELL: u32 = 64;
    render.load_texture_raw(SIZE, SIZE, &checker_pixels(SIZE, CELL))
}

/// RGBA8 checkerboard with a position-dependent tint, so any crop region is
/// visually distinct from the full texture.
fn checker_pixels(size: u32, cell: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let even = ((x / cell) + (y / cell)) % 2 == 0;
            let (r, g, b) = if even {
                (230, 230, 230)
            } else {
                ((x * 255 / size) as u8, (y * 255 / size) as u8, 90)
            };
            pixels.extend_from_slice(&[r, g, b, 255]);
        }
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checker_pixels_are_rgba8() {
        let pixels = checker_pixels(16, 4);
        assert_eq!(pixels.len(), 16 * 16 * 4);
        assert!(pixels.chunks_exact(4).all(|px| px[3] == 255));
    }
}
