//! Image decoding capability and procedural placeholder textures.
//!
//! Decoding lives behind the `AssetDecoder` trait (the engine never touches
//! image formats itself). A failed decode is never fatal: every load site
//! substitutes a generated placeholder and logs a warning.

use crate::renderer::traits::{PixelBuffer, RenderBackend, TextureId};

/// Image decoding capability provided by the host.
pub trait AssetDecoder {
    /// Decode an image file into a pixel buffer. `None` on any failure
    /// (missing file, unsupported format) — the caller substitutes a
    /// placeholder.
    fn decode(&mut self, path: &str) -> Option<PixelBuffer>;
}

/// A decoder that fails every request. Useful for tests and for running
/// without any asset files (everything falls back to procedural textures).
pub struct NullDecoder;

impl AssetDecoder for NullDecoder {
    fn decode(&mut self, _path: &str) -> Option<PixelBuffer> {
        None
    }
}

/// 1×1 solid-color placeholder.
pub fn solid_color(r: u8, g: u8, b: u8) -> PixelBuffer {
    PixelBuffer {
        width: 1,
        height: 1,
        channels: 3,
        data: vec![r, g, b],
    }
}

/// 256×256 ring banding pattern: concentric sine bands in warm grays,
/// standing in for a missing Saturn ring texture.
pub fn ring_banding() -> PixelBuffer {
    const SIZE: u32 = 256;
    let mut data = Vec::with_capacity((SIZE * SIZE * 3) as usize);
    let half = SIZE as f32 / 2.0;
    for y in 0..SIZE {
        for x in 0..SIZE {
            let dx = x as f32 - half;
            let dy = y as f32 - half;
            let dist = (dx * dx + dy * dy).sqrt() / half;
            let pattern = ((dist * 20.0).sin() * 0.5 + 0.5) * 0.7;
            data.push((200.0 * pattern + 55.0) as u8);
            data.push((180.0 * pattern + 55.0) as u8);
            data.push((160.0 * pattern + 55.0) as u8);
        }
    }
    PixelBuffer {
        width: SIZE,
        height: SIZE,
        channels: 3,
        data,
    }
}

/// 64×64 radial dust sprite with a soft falloff and transparent rim.
pub fn dust_sprite() -> PixelBuffer {
    const SIZE: u32 = 64;
    let mut data = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    let half = SIZE as f32 / 2.0;
    for y in 0..SIZE {
        for x in 0..SIZE {
            let dx = (x as f32 - half) / half;
            let dy = (y as f32 - half) / half;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist > 1.0 {
                data.extend_from_slice(&[0, 0, 0, 0]);
            } else {
                let intensity = (1.0 - dist).powi(2);
                let value = (200.0 * intensity + 55.0) as u8;
                data.push(value);
                data.push((value as f32 * 0.95) as u8);
                data.push((value as f32 * 0.9) as u8);
                data.push((255.0 * intensity) as u8);
            }
        }
    }
    PixelBuffer {
        width: SIZE,
        height: SIZE,
        channels: 4,
        data,
    }
}

/// Decode `path` and upload it, or upload `fallback` when decoding fails.
/// Logs the substitution; never fails the caller.
pub fn load_or_fallback(
    decoder: &mut dyn AssetDecoder,
    backend: &mut dyn RenderBackend,
    path: &str,
    fallback: PixelBuffer,
) -> TextureId {
    match decoder.decode(path) {
        Some(pixels) => backend.create_texture(&pixels),
        None => {
            log::warn!("texture {path} failed to load, using placeholder");
            backend.create_texture(&fallback)
        }
    }
}

/// Decode six cubemap faces and upload them; any missing face drops the
/// whole cubemap to solid near-black faces.
pub fn load_cubemap_or_fallback(
    decoder: &mut dyn AssetDecoder,
    backend: &mut dyn RenderBackend,
    faces: &[String; 6],
) -> TextureId {
    let mut decoded: Vec<PixelBuffer> = Vec::with_capacity(6);
    for path in faces {
        match decoder.decode(path) {
            Some(pixels) => decoded.push(pixels),
            None => {
                log::warn!("cubemap face {path} failed to load, using dark placeholder");
                decoded.clear();
                break;
            }
        }
    }
    if decoded.len() != 6 {
        let dark = solid_color(5, 5, 13);
        let faces: [PixelBuffer; 6] = std::array::from_fn(|_| dark.clone());
        return backend.create_cubemap(&faces);
    }
    let faces: [PixelBuffer; 6] = match decoded.try_into() {
        Ok(f) => f,
        Err(_) => return TextureId::INVALID,
    };
    backend.create_cubemap(&faces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solid_color_is_one_pixel() {
        let p = solid_color(255, 128, 0);
        assert_eq!((p.width, p.height, p.channels), (1, 1, 3));
        assert_eq!(p.data, vec![255, 128, 0]);
    }

    #[test]
    fn ring_banding_dimensions() {
        let p = ring_banding();
        assert_eq!((p.width, p.height, p.channels), (256, 256, 3));
        assert_eq!(p.data.len(), 256 * 256 * 3);
    }

    #[test]
    fn ring_banding_is_radial() {
        // Pixels at equal distance from center share a value.
        let p = ring_banding();
        let at = |x: u32, y: u32| p.data[((y * p.width + x) * 3) as usize];
        assert_eq!(at(128 + 40, 128), at(128 - 40, 128));
        assert_eq!(at(128 + 40, 128), at(128, 128 + 40));
    }

    #[test]
    fn dust_sprite_rim_is_transparent() {
        let p = dust_sprite();
        assert_eq!(p.channels, 4);
        // corner pixel is outside the unit disc
        assert_eq!(p.data[3], 0);
        // center pixel is opaque-ish
        let center = ((32 * p.width + 32) * 4 + 3) as usize;
        assert!(p.data[center] > 200);
    }

    #[test]
    fn generators_are_deterministic() {
        assert_eq!(ring_banding().data, ring_banding().data);
        assert_eq!(dust_sprite().data, dust_sprite().data);
    }
}
