// Copyright 2002 Andrea Mazzoleni (AdvanceMAME)
// Copyright 2020 Evgeniy Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The nine RGB bit-layout converters, grounded on `irgb.h`. Each is a
//! per-pixel unpack/pack through [`RgbDef`]'s shift-and-mask accessors.

use crate::rgb::{RgbConversion, RgbDef};

fn src_def(conv: RgbConversion) -> RgbDef {
    match conv {
        RgbConversion::Rgb888To8888 => RgbDef::RGB_888_REVERSED,
        RgbConversion::Rgb8888To332 | RgbConversion::Rgb8888To555 | RgbConversion::Rgb8888To565 => RgbDef::RGB_8888,
        RgbConversion::Rgb555To332 | RgbConversion::Rgb555To565 | RgbConversion::Rgb555To8888 => RgbDef::RGB_555,
    }
}

fn dst_def(conv: RgbConversion) -> RgbDef {
    match conv {
        RgbConversion::Rgb888To8888 => RgbDef::RGB_8888,
        RgbConversion::Rgb8888To332 | RgbConversion::Rgb555To332 => RgbDef::RGB_332,
        RgbConversion::Rgb8888To555 | RgbConversion::Rgb555To8888 => {
            if matches!(conv, RgbConversion::Rgb555To8888) {
                RgbDef::RGB_8888
            } else {
                RgbDef::RGB_555
            }
        }
        RgbConversion::Rgb8888To565 | RgbConversion::Rgb555To565 => RgbDef::RGB_565,
    }
}

/// Converts `sdx` pixels from `conv`'s source layout (bytes-per-pixel
/// `sbpp`, stride `sdp`) into `conv`'s destination layout.
pub fn convert(conv: RgbConversion, dst: &mut [u8], src: &[u8], sdx: u32, sbpp: u8, sdp: u8) {
    let sbpp = sbpp as usize;
    let sdp = sdp as usize;
    let dst_bpp = conv.dst_bpp() as usize;
    let from = src_def(conv);
    let to = dst_def(conv);

    for i in 0..sdx as usize {
        let s = i * sdp;
        let mut word_bytes = [0u8; 4];
        word_bytes[..sbpp].copy_from_slice(&src[s..s + sbpp]);
        let word = u32::from_le_bytes(word_bytes);
        let (r, g, b) = from.unpack(word);
        let packed = to.pack(r, g, b);
        let d = i * dst_bpp;
        dst[d..d + dst_bpp].copy_from_slice(&packed.to_le_bytes()[..dst_bpp]);
    }
}
