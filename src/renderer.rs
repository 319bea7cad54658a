//! CPU frame renderer
//!
//! Every pixel is an independent ray march, so the frame is rendered with a
//! rayon parallel iterator over pixels. The resulting framebuffer can be
//! converted to terminal output or written out as a PNG.

use crate::marcher::{shade, Frame};
use image::{ImageBuffer, Rgb};
use nalgebra::Vector3;
use rayon::prelude::*;
use std::path::Path;
use std::time::Instant;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write frame: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Pixel-parallel renderer holding the last rendered frame
pub struct Renderer {
    width: usize,
    height: usize,
    framebuffer: Vec<Vector3<f32>>,
    /// Whether the last rendered frame had an empty (inverted) disk
    disk_degenerate: bool,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        Self {
            width,
            height,
            framebuffer: vec![Vector3::zeros(); width * height],
            disk_degenerate: false,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.framebuffer = vec![Vector3::zeros(); self.width * self.height];
        tracing::debug!(width = self.width, height = self.height, "renderer resized");
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Gamma-encoded colour of a pixel from the last render
    pub fn pixel(&self, x: usize, y: usize) -> Vector3<f32> {
        self.framebuffer[y * self.width + x]
    }

    /// Screen coordinate of a pixel centre: origin at the image centre, y up,
    /// scaled by the image height
    pub fn pixel_uv(&self, x: usize, y: usize) -> (f32, f32) {
        let w = self.width as f32;
        let h = self.height as f32;
        (
            ((x as f32 + 0.5) - 0.5 * w) / h,
            (0.5 * h - (y as f32 + 0.5)) / h,
        )
    }

    /// Render the frame to the framebuffer (parallel over pixels)
    pub fn render(&mut self, frame: &Frame) {
        let start = Instant::now();
        self.track_disk_state(frame);

        let width = self.width;
        let height = self.height;
        let this = &*self;

        let colors: Vec<Vector3<f32>> = (0..height)
            .into_par_iter()
            .flat_map(|y| {
                (0..width).into_par_iter().map(move |x| {
                    let ray = frame.camera_ray(this.pixel_uv(x, y));
                    shade(&ray, frame)
                })
            })
            .collect();

        self.framebuffer = colors;

        tracing::debug!(
            width,
            height,
            step = frame.quality.step_size,
            max_steps = frame.quality.max_steps,
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "frame rendered"
        );
    }

    /// Log when the disk becomes empty or visible again; returns whether it changed
    fn track_disk_state(&mut self, frame: &Frame) -> bool {
        let params = &frame.params;
        let degenerate = params.features.disk && params.disk_is_degenerate();
        if degenerate == self.disk_degenerate {
            return false;
        }
        self.disk_degenerate = degenerate;

        if degenerate {
            tracing::warn!(
                inner = params.disk_inner_radius(),
                outer = params.disk_outer_radius(),
                "disk inner radius reaches outer radius, disk is empty"
            );
        } else {
            tracing::info!("disk geometry valid again");
        }
        true
    }

    /// Convert framebuffer to ASCII string (grayscale)
    pub fn to_ascii(&self) -> String {
        let gradient_chars: Vec<char> = crate::ASCII_GRADIENT.chars().collect();
        let mut result = String::with_capacity(self.width * self.height + self.height);

        for row in self.framebuffer.chunks(self.width) {
            for color in row {
                let index = ((luminance(color) * (gradient_chars.len() - 1) as f32).round() as usize)
                    .min(gradient_chars.len() - 1);
                result.push(gradient_chars[index]);
            }
            result.push('\n');
        }

        result
    }

    /// Convert RGB (0-255) to 256-color palette index
    fn rgb_to_256color(r: u8, g: u8, b: u8) -> u8 {
        // 6x6x6 color cube (colors 16-231)
        let r6 = (r as u16 * 6 / 256) as u8;
        let g6 = (g as u16 * 6 / 256) as u8;
        let b6 = (b as u16 * 6 / 256) as u8;
        16 + 36 * r6 + 6 * g6 + b6
    }

    fn palette_index(color: &Vector3<f32>) -> u8 {
        let [r, g, b] = to_rgb8(color);
        Self::rgb_to_256color(r, g, b)
    }

    /// Convert framebuffer to half-block ASCII with 2x vertical resolution.
    /// Each `▀` cell shows the upper pixel as foreground and the lower as background.
    pub fn to_ascii_halfblock(&self) -> String {
        let mut dithered = self.framebuffer.clone();
        self.apply_dithering_to_colors(&mut dithered);

        let output_height = self.height.div_ceil(2);
        let mut result = String::with_capacity(self.width * output_height * 15);

        // Only emit escape codes when a colour changes
        let mut last_fg: Option<u8> = None;
        let mut last_bg: Option<u8> = None;

        for y in 0..output_height {
            let top_y = y * 2;
            let bottom_y = y * 2 + 1;

            for x in 0..self.width {
                let top = Self::palette_index(&dithered[top_y * self.width + x]);
                let bottom = if bottom_y < self.height {
                    Self::palette_index(&dithered[bottom_y * self.width + x])
                } else {
                    16
                };

                let fg_changed = last_fg != Some(top);
                let bg_changed = last_bg != Some(bottom);

                if fg_changed && bg_changed {
                    result.push_str(&format!("\x1b[38;5;{};48;5;{}m", top, bottom));
                } else if fg_changed {
                    result.push_str(&format!("\x1b[38;5;{}m", top));
                } else if bg_changed {
                    result.push_str(&format!("\x1b[48;5;{}m", bottom));
                }
                last_fg = Some(top);
                last_bg = Some(bottom);

                result.push('\u{2580}');
            }
            result.push('\n');
        }

        result.push_str("\x1b[0m");
        result
    }

    /// Floyd-Steinberg dithering to 8 bits per channel
    fn apply_dithering_to_colors(&self, colors: &mut [Vector3<f32>]) {
        let width = self.width;

        for y in 0..self.height {
            for x in 0..width {
                let idx = y * width + x;

                for c in 0..3 {
                    let old_val = colors[idx][c];
                    let new_val = (old_val * 255.0).round() / 255.0;
                    colors[idx][c] = new_val;

                    let error = old_val - new_val;
                    if x + 1 < width {
                        colors[idx + 1][c] += error * 7.0 / 16.0;
                    }
                    if y + 1 < self.height && x > 0 {
                        colors[idx + width - 1][c] += error * 3.0 / 16.0;
                    }
                    if y + 1 < self.height {
                        colors[idx + width][c] += error * 5.0 / 16.0;
                    }
                    if y + 1 < self.height && x + 1 < width {
                        colors[idx + width + 1][c] += error * 1.0 / 16.0;
                    }
                }
            }
        }
    }

    /// Write the framebuffer as an 8-bit RGB PNG
    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let image = ImageBuffer::from_fn(self.width as u32, self.height as u32, |x, y| {
            Rgb(to_rgb8(&self.pixel(x as usize, y as usize)))
        });
        image.save(path)?;

        tracing::debug!(path = %path.display(), "frame written");
        Ok(())
    }
}

fn luminance(color: &Vector3<f32>) -> f32 {
    (0.299 * color.x + 0.587 * color.y + 0.114 * color.z).clamp(0.0, 1.0)
}

fn to_rgb8(color: &Vector3<f32>) -> [u8; 3] {
    [
        (color.x.clamp(0.0, 1.0) * 255.0) as u8,
        (color.y.clamp(0.0, 1.0) * 255.0) as u8,
        (color.z.clamp(0.0, 1.0) * 255.0) as u8,
    ]
}
