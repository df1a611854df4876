//! PNG encoding for RGBA canvases.
//!
//! Plots are mostly flat band colours, so [`encode_auto`] first tries to build
//! a palette and writes an indexed PNG (colour type 3). Images with more than
//! 256 distinct colours fall back to truecolour with alpha (colour type 6).

use std::collections::HashMap;
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use rayon::prelude::*;

use crate::error::{RenderError, RenderResult};

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for indexed PNG (PNG8)
pub const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096;

/// Which PNG colour type an image was written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Indexed,
    Rgba,
}

impl ColorMode {
    fn color_type(self) -> u8 {
        match self {
            ColorMode::Indexed => 3,
            ColorMode::Rgba => 6,
        }
    }

    fn bytes_per_pixel(self) -> usize {
        match self {
            ColorMode::Indexed => 1,
            ColorMode::Rgba => 4,
        }
    }
}

/// A palette of RGBA colours with one index byte per pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Indexed {
    pub palette: Vec<[u8; 4]>,
    pub indices: Vec<u8>,
}

/// Encode RGBA pixels, choosing indexed mode when the colours fit a palette.
pub fn encode_auto(pixels: &[u8], width: usize, height: usize) -> RenderResult<(Vec<u8>, ColorMode)> {
    check_len(pixels.len(), width, height, ColorMode::Rgba)?;

    let indexed = if pixels.len() / 4 >= PARALLEL_THRESHOLD {
        quantize_parallel(pixels)
    } else {
        quantize(pixels)
    };

    match indexed {
        Some(indexed) => Ok((encode_indexed(&indexed, width, height)?, ColorMode::Indexed)),
        None => Ok((encode_rgba(pixels, width, height)?, ColorMode::Rgba)),
    }
}

/// Encode RGBA pixels as colour type 6.
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> RenderResult<Vec<u8>> {
    check_len(pixels.len(), width, height, ColorMode::Rgba)?;
    write_png(width, height, ColorMode::Rgba, &[], pixels)
}

/// Encode a palette image as colour type 3.
///
/// A `tRNS` chunk is only written when some palette entry is not opaque.
pub fn encode_indexed(indexed: &Indexed, width: usize, height: usize) -> RenderResult<Vec<u8>> {
    check_len(indexed.indices.len(), width, height, ColorMode::Indexed)?;
    if indexed.palette.is_empty() || indexed.palette.len() > MAX_PALETTE_SIZE {
        return Err(RenderError::Encode(format!(
            "palette has {} entries, expected 1..={}",
            indexed.palette.len(),
            MAX_PALETTE_SIZE
        )));
    }
    if let Some(&bad) = indexed
        .indices
        .iter()
        .find(|&&i| i as usize >= indexed.palette.len())
    {
        return Err(RenderError::Encode(format!(
            "index {} outside palette of {}",
            bad,
            indexed.palette.len()
        )));
    }

    let mut chunks: Vec<(&[u8; 4], Vec<u8>)> = Vec::with_capacity(2);
    chunks.push((
        b"PLTE",
        indexed.palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect(),
    ));
    if indexed.palette.iter().any(|c| c[3] < 255) {
        chunks.push((b"tRNS", indexed.palette.iter().map(|c| c[3]).collect()));
    }
    write_png(width, height, ColorMode::Indexed, &chunks, &indexed.indices)
}

fn check_len(len: usize, width: usize, height: usize, mode: ColorMode) -> RenderResult<()> {
    if width == 0 || height == 0 {
        return Err(RenderError::Encode(format!("empty image {}x{}", width, height)));
    }
    let expected = width * height * mode.bytes_per_pixel();
    if len != expected {
        return Err(RenderError::Encode(format!(
            "{} bytes for a {}x{} {:?} image, expected {}",
            len, width, height, mode, expected
        )));
    }
    Ok(())
}

fn write_png(
    width: usize,
    height: usize,
    mode: ColorMode,
    extra_chunks: &[(&[u8; 4], Vec<u8>)],
    data: &[u8],
) -> RenderResult<Vec<u8>> {
    let mut png = Vec::with_capacity(data.len() / 4 + 128);
    png.extend_from_slice(&SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.extend_from_slice(&[8, mode.color_type(), 0, 0, 0]);
    write_chunk(&mut png, b"IHDR", &ihdr);

    for (name, body) in extra_chunks {
        write_chunk(&mut png, name, body);
    }

    let idat = deflate_scanlines(data, width * mode.bytes_per_pixel())
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Prefix each row with filter type 0 and zlib-compress.
fn deflate_scanlines(data: &[u8], stride: usize) -> std::io::Result<Vec<u8>> {
    let mut raw = Vec::with_capacity(data.len() + data.len() / stride);
    for row in data.chunks_exact(stride) {
        raw.push(0);
        raw.extend_from_slice(row);
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    encoder.finish()
}

fn write_chunk(png: &mut Vec<u8>, name: &[u8; 4], body: &[u8]) {
    png.extend_from_slice(&(body.len() as u32).to_be_bytes());
    png.extend_from_slice(name);
    png.extend_from_slice(body);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(name);
    hasher.update(body);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

#[inline(always)]
fn pack(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

/// Build a palette in first-seen order, or `None` past 256 colours.
pub fn quantize(pixels: &[u8]) -> Option<Indexed> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = pack(px);
        let index = match lookup.get(&key) {
            Some(&i) => i,
            None => {
                if palette.len() == MAX_PALETTE_SIZE {
                    return None;
                }
                let i = palette.len() as u8;
                palette.push([px[0], px[1], px[2], px[3]]);
                lookup.insert(key, i);
                i
            }
        };
        indices.push(index);
    }

    Some(Indexed { palette, indices })
}

/// Same result set as [`quantize`] for large images: colours are gathered per
/// chunk in parallel, merged, and pixels are then mapped in parallel.
///
/// Palette order may differ from [`quantize`].
pub fn quantize_parallel(pixels: &[u8]) -> Option<Indexed> {
    let chunk_px = (pixels.len() / 4 / rayon::current_num_threads()).max(256);

    let per_chunk: Vec<Option<Vec<u32>>> = pixels
        .par_chunks(chunk_px * 4)
        .map(|chunk| {
            let mut seen: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                seen.insert(pack(px), ());
                if seen.len() > MAX_PALETTE_SIZE {
                    return None;
                }
            }
            Some(seen.into_keys().collect())
        })
        .collect();

    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    for colors in per_chunk {
        for key in colors? {
            if lookup.contains_key(&key) {
                continue;
            }
            if palette.len() == MAX_PALETTE_SIZE {
                return None;
            }
            lookup.insert(key, palette.len() as u8);
            palette.push(key.to_le_bytes());
        }
    }

    let indices = pixels
        .par_chunks_exact(4)
        .map(|px| lookup.get(&pack(px)).copied().unwrap_or(0))
        .collect();

    Some(Indexed { palette, indices })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_simple() {
        let pixels = [
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, 255, 255, // blue
            255, 0, 0, 255, // red again
        ];
        let indexed = quantize(&pixels).unwrap();
        assert_eq!(indexed.palette.len(), 3);
        assert_eq!(indexed.indices, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_quantize_parallel_matches_colors() {
        let mut pixels = Vec::with_capacity(128 * 128 * 4);
        for y in 0..128u32 {
            for x in 0..128u32 {
                let band = ((x / 8) + (y / 8)) % 50;
                pixels.extend_from_slice(&[(band * 5) as u8, 100, (200 - band * 2) as u8, 255]);
            }
        }

        let indexed = quantize_parallel(&pixels).unwrap();
        assert_eq!(indexed.palette.len(), 31);
        assert_eq!(indexed.indices.len(), 128 * 128);
        for (px, &i) in pixels.chunks_exact(4).zip(&indexed.indices) {
            assert_eq!(&indexed.palette[i as usize][..], px);
        }
    }

    #[test]
    fn test_too_many_colors() {
        let pixels: Vec<u8> = (0..300u32).flat_map(|i| [i as u8, (i / 256) as u8, 0, 255]).collect();
        assert!(quantize(&pixels).is_none());
        let (png, mode) = encode_auto(&pixels, 300, 1).unwrap();
        assert_eq!(mode, ColorMode::Rgba);
        assert_eq!(png[25], 6);
    }

    #[test]
    fn test_auto_prefers_indexed() {
        let pixels = [255, 0, 0, 255, 0, 255, 0, 255, 0, 255, 0, 255, 255, 0, 0, 255];
        let (png, mode) = encode_auto(&pixels, 2, 2).unwrap();
        assert_eq!(mode, ColorMode::Indexed);
        assert_eq!(&png[..8], &SIGNATURE);
        assert_eq!(png[25], 3);
    }

    #[test]
    fn test_transparency_chunk_only_when_needed() {
        let has = |png: &[u8], name: &[u8]| png.windows(4).any(|w| w == name);

        let opaque = Indexed { palette: vec![[1, 2, 3, 255]], indices: vec![0, 0] };
        let png = encode_indexed(&opaque, 2, 1).unwrap();
        assert!(has(&png, b"PLTE"));
        assert!(!has(&png, b"tRNS"));

        let clear = Indexed { palette: vec![[0, 0, 0, 0], [1, 2, 3, 255]], indices: vec![0, 1] };
        assert!(has(&encode_indexed(&clear, 2, 1).unwrap(), b"tRNS"));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(matches!(encode_rgba(&[0u8; 12], 2, 2), Err(RenderError::Encode(_))));
        assert!(matches!(encode_auto(&[], 0, 3), Err(RenderError::Encode(_))));
        let bad = Indexed { palette: vec![[0, 0, 0, 255]], indices: vec![1] };
        assert!(encode_indexed(&bad, 1, 1).is_err());
    }
}
