// Copyright 2002 Andrea Mazzoleni (AdvanceMAME)
// Copyright 2020 Evgeniy Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Horizontal stage descriptors: one value record per per-row transformation,
//! plus the closed kernel-capability enum stages carry instead of a function
//! pointer bundle.

use std::rc::Rc;

use crate::kernels;
use crate::rgb::RgbDef;

/// Closed tag enumeration for every horizontal stage kind the assembler can
/// emit. Kept complete (including tags nothing currently emits) so the
/// enumeration stays a faithful, documented catalogue of the domain rather
/// than only the subset this crate's assembler reaches for.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StageTag {
    XStretch,
    XDouble,
    XTriple,
    XQuadruple,
    XFilter,
    XCopy,
    Rotation,
    XRgbTriad3Pix,
    XRgbTriad6Pix,
    XRgbTriad16Pix,
    XRgbTriadStrong3Pix,
    XRgbTriadStrong6Pix,
    XRgbTriadStrong16Pix,
    XRgbScanDoubleHorz,
    XRgbScanTripleHorz,
    XRgbScanDoubleVert,
    XRgbScanTripleVert,
    Unchained,
    UnchainedPalette16To8,
    UnchainedXDouble,
    UnchainedXDoublePalette16To8,
    Palette8To8,
    Palette8To16,
    Palette8To32,
    Palette16To8,
    Palette16To16,
    Palette16To32,
    Rgb8888To332,
    Rgb8888To565,
    Rgb8888To555,
    Rgb555To332,
    Rgb555To565,
    Rgb555To8888,
    RgbRgb888To8888,
    YCopy,
    YReductionCopy,
    YExpansionCopy,
    YMean,
    YReductionMean,
    YExpansionMean,
    YFilter,
    YReductionFilter,
    YExpansionFilter,
    YReductionMax,
    YScale2x,
}

impl StageTag {
    /// Human-readable name, mirroring the original's `pipe_name` table.
    pub fn name(self) -> &'static str {
        match self {
            StageTag::XStretch => "x_stretch",
            StageTag::XDouble => "x_double",
            StageTag::XTriple => "x_triple",
            StageTag::XQuadruple => "x_quadruple",
            StageTag::XFilter => "x_filter",
            StageTag::XCopy => "x_copy",
            StageTag::Rotation => "rotation",
            StageTag::XRgbTriad3Pix => "x_rgb_triad3pix",
            StageTag::XRgbTriad6Pix => "x_rgb_triad6pix",
            StageTag::XRgbTriad16Pix => "x_rgb_triad16pix",
            StageTag::XRgbTriadStrong3Pix => "x_rgb_triadstrong3pix",
            StageTag::XRgbTriadStrong6Pix => "x_rgb_triadstrong6pix",
            StageTag::XRgbTriadStrong16Pix => "x_rgb_triadstrong16pix",
            StageTag::XRgbScanDoubleHorz => "x_rgb_scandoublehorz",
            StageTag::XRgbScanTripleHorz => "x_rgb_scantriplehorz",
            StageTag::XRgbScanDoubleVert => "x_rgb_scandoublevert",
            StageTag::XRgbScanTripleVert => "x_rgb_scantriplevert",
            StageTag::Unchained => "unchained",
            StageTag::UnchainedPalette16To8 => "unchained_palette16to8",
            StageTag::UnchainedXDouble => "unchained_double",
            StageTag::UnchainedXDoublePalette16To8 => "unchained_double_palette16to8",
            StageTag::Palette8To8 => "palette8to8",
            StageTag::Palette8To16 => "palette8to16",
            StageTag::Palette8To32 => "palette8to32",
            StageTag::Palette16To8 => "palette16to8",
            StageTag::Palette16To16 => "palette16to16",
            StageTag::Palette16To32 => "palette16to32",
            StageTag::Rgb8888To332 => "rgb8888to332",
            StageTag::Rgb8888To565 => "rgb8888to565",
            StageTag::Rgb8888To555 => "rgb8888to555",
            StageTag::Rgb555To332 => "rgb555to332",
            StageTag::Rgb555To565 => "rgb555to565",
            StageTag::Rgb555To8888 => "rgb555to8888",
            StageTag::RgbRgb888To8888 => "rgb_rgb888to8888",
            StageTag::YCopy => "y_copy",
            StageTag::YReductionCopy => "y_reduction_copy",
            StageTag::YExpansionCopy => "y_expansion_copy",
            StageTag::YMean => "y_mean",
            StageTag::YReductionMean => "y_reduction_mean",
            StageTag::YExpansionMean => "y_expansion_mean",
            StageTag::YFilter => "y_filter",
            StageTag::YReductionFilter => "y_reduction_filter",
            StageTag::YExpansionFilter => "y_expansion_filter",
            StageTag::YReductionMax => "y_reduction_max",
            StageTag::YScale2x => "y_scale2x",
        }
    }

    /// Stages that change the RGB/palette representation of a pixel.
    pub fn is_conversion(self) -> bool {
        matches!(
            self,
            StageTag::Palette8To8
                | StageTag::Palette8To16
                | StageTag::Palette8To32
                | StageTag::Palette16To8
                | StageTag::Palette16To16
                | StageTag::Palette16To32
                | StageTag::Unchained
                | StageTag::UnchainedPalette16To8
                | StageTag::UnchainedXDouble
                | StageTag::UnchainedXDoublePalette16To8
                | StageTag::Rgb8888To332
                | StageTag::Rgb8888To565
                | StageTag::Rgb8888To555
                | StageTag::Rgb555To332
                | StageTag::Rgb555To565
                | StageTag::Rgb555To8888
                | StageTag::RgbRgb888To8888
                | StageTag::Rotation
        )
    }

    /// The six chroma triads plus the four scanline decorations.
    pub fn is_decoration(self) -> bool {
        matches!(
            self,
            StageTag::XRgbTriad3Pix
                | StageTag::XRgbTriad6Pix
                | StageTag::XRgbTriad16Pix
                | StageTag::XRgbTriadStrong3Pix
                | StageTag::XRgbTriadStrong6Pix
                | StageTag::XRgbTriadStrong16Pix
                | StageTag::XRgbScanDoubleHorz
                | StageTag::XRgbScanTripleHorz
                | StageTag::XRgbScanDoubleVert
                | StageTag::XRgbScanTripleVert
        )
    }

    /// Whether this stage's terminal write uses the wide-register path,
    /// given the context's wide-store capability and whether the stage's
    /// input is plain (`sdp == sbpp`).
    pub fn is_fastwrite(self, capability: bool, plain: bool) -> bool {
        match self {
            StageTag::XCopy | StageTag::Rotation => true,
            StageTag::Palette16To8 | StageTag::Palette16To16 | StageTag::Palette16To32 => capability,
            StageTag::Unchained
            | StageTag::UnchainedPalette16To8
            | StageTag::UnchainedXDouble
            | StageTag::UnchainedXDoublePalette16To8 => capability,
            StageTag::XDouble
            | StageTag::XRgbTriad3Pix
            | StageTag::XRgbTriad6Pix
            | StageTag::XRgbTriad16Pix
            | StageTag::XRgbTriadStrong3Pix
            | StageTag::XRgbTriadStrong6Pix
            | StageTag::XRgbTriadStrong16Pix
            | StageTag::XRgbScanDoubleHorz
            | StageTag::XRgbScanTripleHorz
            | StageTag::XRgbScanDoubleVert
            | StageTag::XRgbScanTripleVert
            | StageTag::XFilter
            | StageTag::Rgb555To332
            | StageTag::Rgb555To565
            | StageTag::Rgb555To8888
            | StageTag::Rgb8888To332
            | StageTag::Rgb8888To555
            | StageTag::Rgb8888To565
            | StageTag::Palette8To16 => {
                let _ = capability;
                plain
            }
            StageTag::XStretch | StageTag::XTriple | StageTag::XQuadruple => false,
            StageTag::Palette8To8 | StageTag::Palette8To32 | StageTag::RgbRgb888To8888 => false,
            // Vertical tags never appear in the horizontal fast-write check.
            _ => plain,
        }
    }
}

/// The closed capability surface a horizontal stage exposes. A tagged
/// variant instead of `dyn Trait`: every kernel is monomorphic over bpp and
/// the stage set is closed, so static dispatch costs nothing and keeps the
/// whole catalogue enumerable.
#[derive(Clone)]
pub enum StageKernel {
    Copy { bpp: u8 },
    Rotation { bpp: u8 },
    Stretch { bpp: u8 },
    Filter { bpp: u8 },
    Triad(kernels::triad::TriadKind),
    Scale2x { bpp: u8 },
    Palette8 { table: Rc<[u32]>, dst_bpp: u8 },
    Palette16 { table: Rc<[u32]>, dst_bpp: u8 },
    RgbConv(crate::rgb::RgbConversion),
    Unchained { plane_num: u8 },
}

impl StageKernel {
    /// Runs the stage over a row, reading a (possibly strided) source.
    pub fn put(&self, dst: &mut [u8], src: &[u8], sdx: u32, sbpp: u8, sdp: u8) {
        match self {
            StageKernel::Copy { bpp } => kernels::copy::copy_step(dst, src, sdx, *bpp, sdp),
            StageKernel::Rotation { bpp } => kernels::copy::copy_step(dst, src, sdx, *bpp, sdp),
            StageKernel::Stretch { bpp } => kernels::stretch::stretch(dst, src, sdx, *bpp, sdp, dst_len_pixels(dst, *bpp)),
            StageKernel::Filter { bpp } => kernels::filter::filter(dst, src, sdx, *bpp, sdp),
            StageKernel::Triad(kind) => kernels::triad::apply(*kind, dst, src, sdx, sbpp, sdp),
            StageKernel::Scale2x { .. } => unreachable!("scale2x is driven by the vertical stage, not a horizontal put"),
            StageKernel::Palette8 { table, dst_bpp } => kernels::palette::palette8(dst, src, sdx, sdp, table, *dst_bpp),
            StageKernel::Palette16 { table, dst_bpp } => kernels::palette::palette16(dst, src, sdx, sdp, table, *dst_bpp),
            StageKernel::RgbConv(conv) => kernels::rgbconv::convert(*conv, dst, src, sdx, sbpp, sdp),
            StageKernel::Unchained { plane_num } => kernels::unchained::write_plane(dst, src, sdx, sbpp, sdp, *plane_num),
        }
    }

    /// Runs the stage assuming a plain (`sdp == sbpp`) source, when available.
    pub fn put_plain(&self, dst: &mut [u8], src: &[u8], sdx: u32, sbpp: u8) {
        self.put(dst, src, sdx, sbpp, sbpp)
    }

    /// Scratch bytes this stage needs for one row of output, or 0 when it
    /// writes straight through (the terminal stage).
    pub fn buffer_size(&self, ddx: u32) -> usize {
        match self {
            StageKernel::Copy { bpp } | StageKernel::Rotation { bpp } => ddx as usize * *bpp as usize,
            StageKernel::Stretch { bpp } => ddx as usize * *bpp as usize,
            StageKernel::Filter { bpp } => ddx as usize * *bpp as usize,
            StageKernel::Triad(_) => ddx as usize * 4,
            StageKernel::Scale2x { bpp } => ddx as usize * *bpp as usize,
            StageKernel::Palette8 { dst_bpp, .. } | StageKernel::Palette16 { dst_bpp, .. } => ddx as usize * *dst_bpp as usize,
            StageKernel::RgbConv(conv) => ddx as usize * conv.dst_bpp() as usize,
            StageKernel::Unchained { .. } => 0,
        }
    }
}

fn dst_len_pixels(dst: &[u8], bpp: u8) -> u32 {
    (dst.len() / bpp as usize) as u32
}

/// One horizontal stage: geometry plus the kernel that executes it.
#[derive(Clone)]
pub struct HorzStage {
    pub tag: StageTag,
    /// Input row width in pixels.
    pub sdx: u32,
    /// Source bytes per pixel.
    pub sbpp: u8,
    /// Source stride per pixel; `sdp == sbpp` means the input is plain.
    pub sdp: u8,
    pub kernel: StageKernel,
    /// Destination width in pixels this stage produces.
    pub ddx: u32,
    /// Offset into the arena's backing bytes for this stage's scratch
    /// buffer, set by [`crate::pipeline::HorizontalPipeline::realize`].
    pub buffer: Option<crate::arena::ScratchHandle>,
    pub buffer_len: usize,
}

impl HorzStage {
    pub fn new(tag: StageTag, sdx: u32, sbpp: u8, sdp: u8, ddx: u32, kernel: StageKernel) -> Self {
        HorzStage { tag, sdx, sbpp, sdp, ddx, kernel, buffer: None, buffer_len: 0 }
    }

    pub fn is_plain(&self) -> bool {
        self.sdp == self.sbpp
    }
}

/// The RGB layout a stage's output is expressed in, used by the assembler to
/// chain converters. `None` when the stage operates on palette indices.
pub fn dst_rgb_def(tag: StageTag) -> Option<RgbDef> {
    match tag {
        StageTag::Rgb8888To332 | StageTag::Rgb555To332 => Some(RgbDef::RGB_332),
        StageTag::Rgb8888To555 | StageTag::Rgb555To8888 => Some(RgbDef::RGB_8888),
        StageTag::Rgb8888To565 | StageTag::Rgb555To565 => Some(RgbDef::RGB_565),
        StageTag::RgbRgb888To8888 => Some(RgbDef::RGB_8888),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        assert_eq!(StageTag::XCopy.name(), "x_copy");
        assert_eq!(StageTag::YScale2x.name(), "y_scale2x");
    }

    #[test]
    fn classification_matches_table() {
        assert!(StageTag::Palette16To8.is_conversion());
        assert!(!StageTag::XCopy.is_conversion());
        assert!(StageTag::XRgbTriad3Pix.is_decoration());
        assert!(!StageTag::XStretch.is_decoration());
    }

    #[test]
    fn fastwrite_copy_is_always_fast() {
        assert!(StageTag::XCopy.is_fastwrite(false, false));
        assert!(StageTag::XCopy.is_fastwrite(true, true));
    }

    #[test]
    fn fastwrite_stretch_is_never_fast() {
        assert!(!StageTag::XStretch.is_fastwrite(true, true));
        assert!(!StageTag::XStretch.is_fastwrite(false, true));
    }
}
