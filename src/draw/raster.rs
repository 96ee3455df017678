//! Pixel buffer backing the drawing surface.
//!
//! The raster is a Cairo ARGB32 image surface. Cairo stores each pixel as a
//! native-endian `u32` with premultiplied alpha (`0xAARRGGBB`).

use super::color::Color;
use super::render::render_shape;
use super::shape::Shape;
use crate::util::Rect;
use cairo::{Context, Format, ImageSurface, Operator};
use thiserror::Error;

/// Errors raised while creating or accessing a raster.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Cairo error: {0}")]
    Cairo(#[from] cairo::Error),

    #[error("Raster pixels are in use: {0}")]
    Borrow(#[from] cairo::BorrowError),

    #[error("Pixel buffer of {len} bytes does not match a {width}x{height} image")]
    SizeMismatch { width: u32, height: u32, len: usize },
}

/// Fixed-resolution pixel grid.
#[derive(Debug)]
pub struct Raster {
    surface: ImageSurface,
}

impl Raster {
    /// Creates a raster filled with `background`.
    pub fn new(width: i32, height: i32, background: Color) -> Result<Self, RasterError> {
        let surface = ImageSurface::create(Format::ARgb32, width, height)?;
        let raster = Self { surface };
        {
            let ctx = Context::new(&raster.surface)?;
            ctx.set_operator(Operator::Source);
            background.apply(&ctx);
            ctx.paint()?;
        }
        raster.surface.flush();
        Ok(raster)
    }

    /// Builds a raster from straight-alpha RGBA8 pixels.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, RasterError> {
        if width == 0 || height == 0 || rgba.len() != width as usize * height as usize * 4 {
            return Err(RasterError::SizeMismatch {
                width,
                height,
                len: rgba.len(),
            });
        }
        let mut raster = Self {
            surface: ImageSurface::create(Format::ARgb32, width as i32, height as i32)?,
        };
        let stride = raster.surface.stride() as usize;
        let mut data = raster.surface.data()?;
        for (y, row) in rgba.chunks_exact(width as usize * 4).enumerate() {
            for (x, px) in row.chunks_exact(4).enumerate() {
                let offset = y * stride + x * 4;
                let packed = pack_premultiplied(px[0], px[1], px[2], px[3]);
                data[offset..offset + 4].copy_from_slice(&packed.to_ne_bytes());
            }
        }
        drop(data);
        Ok(raster)
    }

    /// Surface width in pixels.
    pub fn width(&self) -> i32 {
        self.surface.width()
    }

    /// Surface height in pixels.
    pub fn height(&self) -> i32 {
        self.surface.height()
    }

    /// Underlying Cairo surface, for compositing onto other surfaces.
    pub fn surface(&self) -> &ImageSurface {
        &self.surface
    }

    /// Rasterizes a shape into the buffer.
    pub fn render(&mut self, shape: &Shape) -> Result<(), RasterError> {
        {
            let ctx = Context::new(&self.surface)?;
            ctx.set_antialias(cairo::Antialias::Default);
            render_shape(&ctx, shape);
            ctx.status()?;
        }
        self.surface.flush();
        Ok(())
    }

    /// Makes an independent pixel-exact copy.
    pub fn try_clone(&self) -> Result<Self, RasterError> {
        let copy = ImageSurface::create(Format::ARgb32, self.width(), self.height())?;
        {
            let ctx = Context::new(&copy)?;
            ctx.set_operator(Operator::Source);
            ctx.set_source_surface(&self.surface, 0.0, 0.0)?;
            ctx.paint()?;
        }
        copy.flush();
        Ok(Self { surface: copy })
    }

    /// Returns a raster of the new size with this raster's content at the origin.
    ///
    /// Areas not covered by the old content are filled with `background`.
    pub fn resized(
        &self,
        width: i32,
        height: i32,
        background: Color,
    ) -> Result<Self, RasterError> {
        let resized = Self::new(width, height, background)?;
        {
            let ctx = Context::new(&resized.surface)?;
            ctx.set_operator(Operator::Source);
            ctx.set_source_surface(&self.surface, 0.0, 0.0)?;
            ctx.rectangle(
                0.0,
                0.0,
                self.width().min(width) as f64,
                self.height().min(height) as f64,
            );
            ctx.fill()?;
        }
        resized.surface.flush();
        Ok(resized)
    }

    /// Samples the straight-alpha color at `(x, y)`; `None` when out of bounds.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let [r, g, b, a] = self.pixel_rgba8(x, y)?;
        Some(Color::from_rgba8(r, g, b, a))
    }

    /// Samples the straight-alpha RGBA8 channels at `(x, y)`.
    pub fn pixel_rgba8(&self, x: i32, y: i32) -> Option<[u8; 4]> {
        if x < 0 || y < 0 || x >= self.width() || y >= self.height() {
            return None;
        }
        let offset = y as usize * self.surface.stride() as usize + x as usize * 4;
        let mut sample = None;
        self.surface
            .with_data(|data| {
                let packed = u32::from_ne_bytes([
                    data[offset],
                    data[offset + 1],
                    data[offset + 2],
                    data[offset + 3],
                ]);
                sample = Some(unpack_straight(packed));
            })
            .ok()?;
        sample
    }

    /// Inverts the color channels of every pixel inside `rect`.
    ///
    /// Alpha is preserved. Pixels outside `rect` are left untouched.
    pub fn invert_region(&mut self, rect: Rect) -> Result<(), RasterError> {
        let Some(rect) = rect.clamp_to_bounds(self.width(), self.height()) else {
            return Ok(());
        };
        let stride = self.surface.stride() as usize;
        let mut data = self.surface.data()?;
        for y in rect.y..rect.y + rect.height {
            for x in rect.x..rect.x + rect.width {
                let offset = y as usize * stride + x as usize * 4;
                let mut bytes = [0u8; 4];
                bytes.copy_from_slice(&data[offset..offset + 4]);
                let inverted = invert_premultiplied(u32::from_ne_bytes(bytes));
                data[offset..offset + 4].copy_from_slice(&inverted.to_ne_bytes());
            }
        }
        Ok(())
    }

    /// Exports the pixels as straight-alpha RGBA8, row-major without padding.
    pub fn to_rgba(&self) -> Result<Vec<u8>, RasterError> {
        let width = self.width() as usize;
        let height = self.height() as usize;
        let stride = self.surface.stride() as usize;
        let mut out = Vec::with_capacity(width * height * 4);
        self.surface.with_data(|data| {
            for y in 0..height {
                let row = &data[y * stride..y * stride + width * 4];
                for px in row.chunks_exact(4) {
                    let packed = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
                    out.extend_from_slice(&unpack_straight(packed));
                }
            }
        })?;
        Ok(out)
    }

    /// Returns true when both rasters have the same size and identical pixels.
    pub fn pixels_eq(&self, other: &Raster) -> bool {
        if self.width() != other.width() || self.height() != other.height() {
            return false;
        }
        match (self.to_rgba(), other.to_rgba()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

fn pack_premultiplied(r: u8, g: u8, b: u8, a: u8) -> u32 {
    let premultiply = |c: u8| ((c as u32 * a as u32 + 127) / 255) & 0xff;
    (a as u32) << 24 | premultiply(r) << 16 | premultiply(g) << 8 | premultiply(b)
}

fn unpack_straight(packed: u32) -> [u8; 4] {
    let a = (packed >> 24) & 0xff;
    if a == 0 {
        return [0, 0, 0, 0];
    }
    let unpremultiply = |c: u32| ((c * 255 + a / 2) / a).min(255) as u8;
    [
        unpremultiply((packed >> 16) & 0xff),
        unpremultiply((packed >> 8) & 0xff),
        unpremultiply(packed & 0xff),
        a as u8,
    ]
}

/// Inverts a premultiplied pixel: each channel `c` becomes `a - c`, which is
/// `255 - c` (a bitwise NOT) for opaque pixels.
fn invert_premultiplied(packed: u32) -> u32 {
    let a = (packed >> 24) & 0xff;
    let invert = |c: u32| a - c.min(a);
    let r = invert((packed >> 16) & 0xff);
    let g = invert((packed >> 8) & 0xff);
    let b = invert(packed & 0xff);
    a << 24 | r << 16 | g << 8 | b
}
