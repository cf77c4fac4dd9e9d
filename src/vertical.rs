// Copyright 2002 Andrea Mazzoleni (AdvanceMAME)
// Copyright 2020 Evgeniy Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The vertical driver: per output row, consumes zero or more input rows and
//! invokes the horizontal pipeline (whole, or split at the pivot) with the
//! combine semantics the assembled `combine_y` calls for.

use crate::combine::CombineY;
use crate::context::BlitContext;
use crate::kernels::{reduce, scale2x, triad};
use crate::pipeline::HorizontalPipeline;
use crate::rgb::RgbDef;
use crate::surface::Surface;

/// Vertical-axis geometry and combine mode, cached after pivot selection.
pub struct VerticalStage {
    pub combine_y: CombineY,
    pub sdy: u32,
    pub ddy: u32,
    /// Source row stride in bytes.
    pub sdw: usize,
    pub pivot: usize,
    /// Whether the assembled horizontal pipeline carries a `ScanDoubleVert`/
    /// `ScanTripleVert` decoration. The horizontal stage for these is a
    /// pass-through (there's no per-column phase to apply); the driver dims
    /// whole output rows by destination-row parity instead.
    pub scan_double_vert: bool,
    pub scan_triple_vert: bool,
    /// Set when the assembled pipeline is a single unchained-VGA stage
    /// (`COMBINE_Y::None` only): 4 for the 4-plane driver, 2 for the
    /// mask-addressed 2-plane driver. `None` for every other pipeline.
    pub planar: Option<u8>,
}

unsafe fn dst_row<'a>(dst: &mut dyn Surface, y: u32, x: u32, len: usize) -> &'a mut [u8] {
    let base = dst.write_line(y);
    let p = base.add(dst.offset(x));
    std::slice::from_raw_parts_mut(p, len)
}

impl VerticalStage {
    /// Drives the whole frame. `src` is the full source region (`sdy` rows
    /// of `sdw` bytes each), `x`/`y` the destination origin.
    pub fn put(&self, ctx: &mut BlitContext, pipeline: &HorizontalPipeline, src: &[u8], dst: &mut dyn Surface, x: u32, y: u32, dst_rgb_def: Option<RgbDef>, dst_bpp: u8) {
        if let Some(plane_num) = self.planar {
            self.put_planar(plane_num, pipeline, src, dst, x, y, dst_rgb_def, dst_bpp);
            ctx.run_teardown();
            return;
        }
        match self.combine_y {
            CombineY::None => {
                if self.sdy == self.ddy {
                    self.stretchy_11(pipeline, src, dst, x, y, dst_rgb_def, dst_bpp);
                } else if self.sdy > self.ddy {
                    self.stretchy_x1(pipeline, src, dst, x, y, dst_rgb_def, dst_bpp);
                } else {
                    self.stretchy_1x(pipeline, src, dst, x, y, dst_rgb_def, dst_bpp);
                }
            }
            CombineY::Mean => {
                if self.sdy > self.ddy {
                    self.stretchy_mean_x1(pipeline, src, dst, x, y, dst_rgb_def, dst_bpp);
                } else {
                    self.stretchy_mean_1x(pipeline, src, dst, x, y, dst_rgb_def, dst_bpp);
                }
            }
            CombineY::Filter => {
                if self.sdy > self.ddy {
                    self.stretchy_filter_x1(pipeline, src, dst, x, y, dst_rgb_def, dst_bpp);
                } else {
                    self.stretchy_filter_1x(pipeline, src, dst, x, y, dst_rgb_def, dst_bpp);
                }
            }
            CombineY::Max => self.stretchy_max_x1(pipeline, src, dst, x, y, dst_rgb_def, dst_bpp),
            CombineY::Scale2x => self.stretchy_scale2x(pipeline, src, dst, x, y, dst_rgb_def, dst_bpp),
        }
        ctx.run_teardown();
    }

    fn row(&self, src: &[u8], i: usize) -> &[u8] {
        &src[i * self.sdw..i * self.sdw + self.sdw]
    }

    /// Dims `out` in place when this pipeline carries a vertical scanline
    /// decoration and `relative_row` (the 0-based output row within this
    /// blit) falls on a dimmed phase: every other row for `ScanDoubleVert`,
    /// two rows out of three for `ScanTripleVert`.
    fn dim_if_scanning(&self, out: &mut [u8], relative_row: u32, dst_rgb_def: Option<RgbDef>, dst_bpp: u8) {
        let dim = if self.scan_double_vert {
            relative_row % 2 == 1
        } else if self.scan_triple_vert {
            relative_row % 3 != 0
        } else {
            return;
        };
        if !dim {
            return;
        }
        let rgb = dst_rgb_def.unwrap_or(RgbDef::RGB_8888);
        triad::dim_row(rgb, out, dst_bpp);
    }

    /// `video_stage_planey4`/`video_stage_planey2`: wraps the whole-frame
    /// put in a loop over planes, selecting the destination plane (or write
    /// mask) before each pass and reading that plane's data from `p * sdp`
    /// bytes into each source row (4-plane) or `{0, sdp}` (2-plane).
    fn put_planar(&self, plane_num: u8, pipeline: &HorizontalPipeline, src: &[u8], dst: &mut dyn Surface, x: u32, y0: u32, dst_rgb_def: Option<RgbDef>, dst_bpp: u8) {
        let sdp = pipeline.stages()[0].sdp as usize;
        if plane_num == 4 {
            for p in 0..4u8 {
                dst.set_unchained_plane(p);
                self.put_plane_offset(pipeline, src, dst, x, y0, p as usize * sdp, dst_rgb_def, dst_bpp);
            }
        } else {
            dst.set_unchained_plane_mask(0x3);
            self.put_plane_offset(pipeline, src, dst, x, y0, 0, dst_rgb_def, dst_bpp);
            dst.set_unchained_plane_mask(0xC);
            self.put_plane_offset(pipeline, src, dst, x, y0, sdp, dst_rgb_def, dst_bpp);
        }
    }

    /// One plane's worth of the `COMBINE_Y::None` identity/reduction/
    /// expansion row drivers, reading each source row from `offset` bytes in.
    fn put_plane_offset(&self, pipeline: &HorizontalPipeline, src: &[u8], dst: &mut dyn Surface, x: u32, y0: u32, offset: usize, dst_rgb_def: Option<RgbDef>, dst_bpp: u8) {
        if self.sdy == self.ddy {
            for row in 0..self.sdy {
                let row_src = &self.row(src, row as usize)[offset..];
                let mut out = pipeline.run(row_src);
                self.dim_if_scanning(&mut out, row, dst_rgb_def, dst_bpp);
                let buf = unsafe { dst_row(dst, y0 + row, x, out.len()) };
                buf.copy_from_slice(&out);
            }
        } else if self.sdy > self.ddy {
            let mut s = 0usize;
            for (row, run) in crate::slice::Slice::new(self.sdy, self.ddy).enumerate() {
                let row_src = &self.row(src, s)[offset..];
                let mut out = pipeline.run(row_src);
                self.dim_if_scanning(&mut out, row as u32, dst_rgb_def, dst_bpp);
                let buf = unsafe { dst_row(dst, y0 + row as u32, x, out.len()) };
                buf.copy_from_slice(&out);
                s += run as usize;
            }
        } else {
            let mut y = y0;
            for i in 0..self.sdy {
                let row_src = &self.row(src, i as usize)[offset..];
                let out = pipeline.run(row_src);
                let run = crate::slice::Slice::new(self.sdy, self.ddy).nth(i as usize).unwrap_or(0);
                for _ in 0..run {
                    let mut copy = out.clone();
                    self.dim_if_scanning(&mut copy, y - y0, dst_rgb_def, dst_bpp);
                    let buf = unsafe { dst_row(dst, y, x, copy.len()) };
                    buf.copy_from_slice(&copy);
                    y += 1;
                }
            }
        }
    }

    fn stretchy_11(&self, pipeline: &HorizontalPipeline, src: &[u8], dst: &mut dyn Surface, x: u32, y0: u32, dst_rgb_def: Option<RgbDef>, dst_bpp: u8) {
        for row in 0..self.sdy {
            let mut out = pipeline.run(self.row(src, row as usize));
            self.dim_if_scanning(&mut out, row, dst_rgb_def, dst_bpp);
            let buf = unsafe { dst_row(dst, y0 + row, x, out.len()) };
            buf.copy_from_slice(&out);
        }
    }

    fn stretchy_x1(&self, pipeline: &HorizontalPipeline, src: &[u8], dst: &mut dyn Surface, x: u32, y0: u32, dst_rgb_def: Option<RgbDef>, dst_bpp: u8) {
        let mut s = 0usize;
        for (row, run) in crate::slice::Slice::new(self.sdy, self.ddy).enumerate() {
            let row_src = &src[s * self.sdw..s * self.sdw + self.sdw];
            let mut out = pipeline.run(row_src);
            self.dim_if_scanning(&mut out, row as u32, dst_rgb_def, dst_bpp);
            let buf = unsafe { dst_row(dst, y0 + row as u32, x, out.len()) };
            buf.copy_from_slice(&out);
            s += run as usize;
        }
    }

    fn stretchy_1x(&self, pipeline: &HorizontalPipeline, src: &[u8], dst: &mut dyn Surface, x: u32, y0: u32, dst_rgb_def: Option<RgbDef>, dst_bpp: u8) {
        let mut y = y0;
        for i in 0..self.sdy {
            let row_src = self.row(src, i as usize);
            let pre = pipeline.run_partial(0, pipeline.pivot(), row_src);
            let run = crate::slice::Slice::new(self.sdy, self.ddy).nth(i as usize).unwrap_or(0);
            for _ in 0..run {
                let len_stage = pipeline.stages().len();
                let mut out = vec![0u8; estimate_row_bytes(pipeline, len_stage)];
                pipeline.run_partial_on_buffer_plain(pipeline.pivot(), len_stage, &pre, &mut out);
                self.dim_if_scanning(&mut out, y - y0, dst_rgb_def, dst_bpp);
                let buf = unsafe { dst_row(dst, y, x, out.len()) };
                buf.copy_from_slice(&out);
                y += 1;
            }
        }
    }

    fn stretchy_max_x1(&self, pipeline: &HorizontalPipeline, src: &[u8], dst: &mut dyn Surface, x: u32, y0: u32, dst_rgb_def: Option<RgbDef>, dst_bpp: u8) {
        let mut s = 0usize;
        for (row, run) in crate::slice::Slice::new(self.sdy, self.ddy).enumerate() {
            if run == 1 {
                let mut out = pipeline.run(&src[s * self.sdw..s * self.sdw + self.sdw]);
                self.dim_if_scanning(&mut out, row as u32, dst_rgb_def, dst_bpp);
                let buf = unsafe { dst_row(dst, y0 + row as u32, x, out.len()) };
                buf.copy_from_slice(&out);
            } else {
                let mut acc = pipeline.run_partial(0, pipeline.pivot(), &src[s * self.sdw..s * self.sdw + self.sdw]);
                for k in 1..run {
                    let next_row = s + k as usize;
                    let pre = pipeline.run_partial(0, pipeline.pivot(), &src[next_row * self.sdw..next_row * self.sdw + self.sdw]);
                    if let Some(rgb_def) = dst_rgb_def {
                        reduce::max_rgb_vert_self(&mut acc, &pre, rgb_def, dst_bpp);
                    } else {
                        reduce::max_vert_self(&mut acc, &pre);
                    }
                }
                let len_stage = pipeline.stages().len();
                let mut out = vec![0u8; estimate_row_bytes(pipeline, len_stage)];
                pipeline.run_partial_on_buffer_plain(pipeline.pivot(), len_stage, &acc, &mut out);
                self.dim_if_scanning(&mut out, row as u32, dst_rgb_def, dst_bpp);
                let buf = unsafe { dst_row(dst, y0 + row as u32, x, out.len()) };
                buf.copy_from_slice(&out);
            }
            s += run as usize;
        }
    }

    fn stretchy_mean_x1(&self, pipeline: &HorizontalPipeline, src: &[u8], dst: &mut dyn Surface, x: u32, y0: u32, dst_rgb_def: Option<RgbDef>, dst_bpp: u8) {
        let mut s = 0usize;
        for (row, run) in crate::slice::Slice::new(self.sdy, self.ddy).enumerate() {
            if run == 1 {
                let mut out = pipeline.run(&src[s * self.sdw..s * self.sdw + self.sdw]);
                self.dim_if_scanning(&mut out, row as u32, dst_rgb_def, dst_bpp);
                let buf = unsafe { dst_row(dst, y0 + row as u32, x, out.len()) };
                buf.copy_from_slice(&out);
            } else {
                let mut acc = pipeline.run_partial(0, pipeline.pivot(), &src[s * self.sdw..s * self.sdw + self.sdw]);
                for k in 1..run {
                    let next_row = s + k as usize;
                    let pre = pipeline.run_partial(0, pipeline.pivot(), &src[next_row * self.sdw..next_row * self.sdw + self.sdw]);
                    reduce::mean_vert_self(&mut acc, &pre);
                }
                let len_stage = pipeline.stages().len();
                let mut out = vec![0u8; estimate_row_bytes(pipeline, len_stage)];
                pipeline.run_partial_on_buffer_plain(pipeline.pivot(), len_stage, &acc, &mut out);
                self.dim_if_scanning(&mut out, row as u32, dst_rgb_def, dst_bpp);
                let buf = unsafe { dst_row(dst, y0 + row as u32, x, out.len()) };
                buf.copy_from_slice(&out);
            }
            s += run as usize;
        }
    }

    /// Reduction with a low-pass filter between adjacent rows. Maintains a
    /// carry buffer: each output row means the current row's pre-pivot
    /// output against the previous carry before running post-pivot.
    fn stretchy_filter_x1(&self, pipeline: &HorizontalPipeline, src: &[u8], dst: &mut dyn Surface, x: u32, y0: u32, dst_rgb_def: Option<RgbDef>, dst_bpp: u8) {
        let mut s = 0usize;
        let mut carry: Option<Vec<u8>> = None;
        for (row, run) in crate::slice::Slice::new(self.sdy, self.ddy).enumerate() {
            let mut current = pipeline.run_partial(0, pipeline.pivot(), &src[s * self.sdw..s * self.sdw + self.sdw]);
            if let Some(prev) = carry.take() {
                reduce::mean_vert_self(&mut current, &prev);
            }
            let len_stage = pipeline.stages().len();
            let mut out = vec![0u8; estimate_row_bytes(pipeline, len_stage)];
            pipeline.run_partial_on_buffer_plain(pipeline.pivot(), len_stage, &current, &mut out);
            self.dim_if_scanning(&mut out, row as u32, dst_rgb_def, dst_bpp);
            let buf = unsafe { dst_row(dst, y0 + row as u32, x, out.len()) };
            buf.copy_from_slice(&out);

            if run > 1 {
                let last_row = s + run as usize - 1;
                carry = Some(pipeline.run_partial(0, pipeline.pivot(), &src[last_row * self.sdw..last_row * self.sdw + self.sdw]));
            } else {
                carry = Some(current);
            }
            s += run as usize;
        }
    }

    /// Expansion with mean-on-boundary: the first post-boundary row means
    /// against the previous input row's pre-pivot output, the rest of the
    /// run are plain copies.
    fn stretchy_mean_1x(&self, pipeline: &HorizontalPipeline, src: &[u8], dst: &mut dyn Surface, x: u32, y0: u32, dst_rgb_def: Option<RgbDef>, dst_bpp: u8) {
        self.stretchy_expansion_combined(pipeline, src, dst, x, y0, false, dst_rgb_def, dst_bpp);
    }

    /// Same structure as [`Self::stretchy_mean_1x`], but combines on every
    /// iteration rather than only at boundaries.
    fn stretchy_filter_1x(&self, pipeline: &HorizontalPipeline, src: &[u8], dst: &mut dyn Surface, x: u32, y0: u32, dst_rgb_def: Option<RgbDef>, dst_bpp: u8) {
        self.stretchy_expansion_combined(pipeline, src, dst, x, y0, true, dst_rgb_def, dst_bpp);
    }

    #[allow(clippy::too_many_arguments)]
    fn stretchy_expansion_combined(&self, pipeline: &HorizontalPipeline, src: &[u8], dst: &mut dyn Surface, x: u32, y0: u32, always_combine: bool, dst_rgb_def: Option<RgbDef>, dst_bpp: u8) {
        let mut y = y0;
        let mut previous: Option<Vec<u8>> = None;
        for i in 0..self.sdy {
            let partial = pipeline.run_partial(0, pipeline.pivot(), self.row(src, i as usize));
            let run = crate::slice::Slice::new(self.sdy, self.ddy).nth(i as usize).unwrap_or(0);
            let len_stage = pipeline.stages().len();

            let first = if let Some(prev) = &previous {
                let mut combined = partial.clone();
                reduce::mean_vert_self(&mut combined, prev);
                combined
            } else {
                partial.clone()
            };
            let mut out = vec![0u8; estimate_row_bytes(pipeline, len_stage)];
            pipeline.run_partial_on_buffer_plain(pipeline.pivot(), len_stage, &first, &mut out);
            if run > 0 {
                self.dim_if_scanning(&mut out, y - y0, dst_rgb_def, dst_bpp);
                let buf = unsafe { dst_row(dst, y, x, out.len()) };
                buf.copy_from_slice(&out);
                y += 1;
            }

            if run > 1 {
                let mut plain_out = vec![0u8; estimate_row_bytes(pipeline, len_stage)];
                pipeline.run_partial_on_buffer_plain(pipeline.pivot(), len_stage, &partial, &mut plain_out);
                for _ in 1..run {
                    self.dim_if_scanning(&mut plain_out, y - y0, dst_rgb_def, dst_bpp);
                    let buf = unsafe { dst_row(dst, y, x, plain_out.len()) };
                    buf.copy_from_slice(&plain_out);
                    y += 1;
                }
            }

            previous = if always_combine || run >= 2 { Some(partial) } else { None };
        }
    }

    /// Scale2x: a 3-slot ring of pre-pivot outputs representing three
    /// consecutive source rows, duplicating the edge row at top/bottom.
    fn stretchy_scale2x(&self, pipeline: &HorizontalPipeline, src: &[u8], dst: &mut dyn Surface, x: u32, y0: u32, dst_rgb_def: Option<RgbDef>, dst_bpp: u8) {
        let pivot = pipeline.pivot();
        let len_stage = pipeline.stages().len();
        let sdx_pivot = pipeline.pivot_geometry((0, 1, 1)).0;
        let bpp_pivot = pipeline.pivot_geometry((0, 1, 1)).2;

        let pre = |i: u32| -> Vec<u8> { pipeline.run_partial(0, pivot, self.row(src, i as usize)) };

        for i in 0..self.sdy {
            let prev = if i == 0 { pre(0) } else { pre(i - 1) };
            let cur = pre(i);
            let next = if i + 1 == self.sdy { pre(i) } else { pre(i + 1) };

            let mut dst0 = vec![0u8; sdx_pivot as usize * 2 * bpp_pivot as usize];
            let mut dst1 = vec![0u8; sdx_pivot as usize * 2 * bpp_pivot as usize];
            scale2x::scale2x_row(&mut dst0, &mut dst1, &prev, &cur, &next, sdx_pivot, bpp_pivot);

            let y_top = y0 + 2 * i;
            let y_bot = y0 + 2 * i + 1;
            if pivot == len_stage {
                self.dim_if_scanning(&mut dst0, y_top - y0, dst_rgb_def, dst_bpp);
                self.dim_if_scanning(&mut dst1, y_bot - y0, dst_rgb_def, dst_bpp);
                let buf = unsafe { dst_row(dst, y_top, x, dst0.len()) };
                buf.copy_from_slice(&dst0);
                let buf = unsafe { dst_row(dst, y_bot, x, dst1.len()) };
                buf.copy_from_slice(&dst1);
            } else {
                let mut out0 = vec![0u8; estimate_row_bytes(pipeline, len_stage)];
                let mut out1 = vec![0u8; estimate_row_bytes(pipeline, len_stage)];
                pipeline.run_partial_on_buffer_plain(pivot, len_stage, &dst0, &mut out0);
                pipeline.run_partial_on_buffer_plain(pivot, len_stage, &dst1, &mut out1);
                self.dim_if_scanning(&mut out0, y_top - y0, dst_rgb_def, dst_bpp);
                self.dim_if_scanning(&mut out1, y_bot - y0, dst_rgb_def, dst_bpp);
                let buf = unsafe { dst_row(dst, y_top, x, out0.len()) };
                buf.copy_from_slice(&out0);
                let buf = unsafe { dst_row(dst, y_bot, x, out1.len()) };
                buf.copy_from_slice(&out1);
            }
        }
    }
}

/// Size, in bytes, of the row the stages `[from, end)` would produce — the
/// terminal stage's destination width times the destination bytes-per-pixel
/// it was assembled for, or the pivot geometry when the range is empty.
fn estimate_row_bytes(pipeline: &HorizontalPipeline, end: usize) -> usize {
    match pipeline.stages().get(end.wrapping_sub(1)) {
        Some(stage) if end > 0 => stage.ddx as usize * effective_bpp(stage.kernel.buffer_size(stage.ddx), stage.ddx),
        _ => 0,
    }
}

fn effective_bpp(buffer_size: usize, ddx: u32) -> usize {
    if ddx == 0 {
        0
    } else {
        buffer_size / ddx as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{HorzStage, StageKernel, StageTag};
    use crate::surface::test_support::LinearSurface;

    fn copy_pipeline(sdx: u32, bpp: u8) -> HorizontalPipeline {
        let mut pipeline = HorizontalPipeline::new();
        pipeline.insert(HorzStage::new(StageTag::XCopy, sdx, bpp, bpp, sdx, StageKernel::Copy { bpp }));
        pipeline.set_pivot(1);
        pipeline
    }

    /// A 4-plane surface that keeps each plane's rows in its own buffer, so
    /// a test can check every plane got its own bytes instead of one
    /// composited stream.
    struct PlanarSurface {
        width: usize,
        current_plane: u8,
        planes: [Vec<u8>; 4],
    }

    impl PlanarSurface {
        fn new(width: usize, rows: usize) -> Self {
            let blank = vec![0u8; width * rows];
            PlanarSurface { width, current_plane: 0, planes: [blank.clone(), blank.clone(), blank.clone(), blank] }
        }
    }

    impl Surface for PlanarSurface {
        unsafe fn write_line(&mut self, y: u32) -> *mut u8 {
            self.planes[self.current_plane as usize].as_mut_ptr().add(y as usize * self.width)
        }

        fn offset(&self, x: u32) -> usize {
            x as usize
        }

        fn bytes_per_pixel(&self) -> u8 {
            1
        }

        fn rgb_def(&self) -> RgbDef {
            RgbDef::RGB_8888
        }

        fn color_index(&self) -> crate::rgb::ColorIndex {
            crate::rgb::ColorIndex::Palette
        }

        fn is_unchained(&self) -> bool {
            true
        }

        fn set_unchained_plane(&mut self, plane: u8) {
            self.current_plane = plane;
        }
    }

    #[test]
    fn identity_copy_reproduces_source_byte_exact() {
        let mut ctx = BlitContext::new(true).unwrap();
        let pipeline = copy_pipeline(4, 4);
        let vstage = VerticalStage { combine_y: CombineY::None, sdy: 2, ddy: 2, sdw: 16, pivot: 1, scan_double_vert: false, scan_triple_vert: false, planar: None };
        let src: Vec<u8> = (0..32u8).collect();
        let mut dst = LinearSurface::new(4, 2, 4, RgbDef::RGB_8888, crate::rgb::ColorIndex::Rgb);
        vstage.put(&mut ctx, &pipeline, &src, &mut dst, 0, 0, Some(RgbDef::RGB_8888), 4);
        assert_eq!(dst.data, src);
    }

    #[test]
    fn expansion_2x2_to_4x4_replicates_pixels() {
        // scenario 2: A B / C D -> A A B B / A A B B / C C D D / C C D D
        let mut ctx = BlitContext::new(true).unwrap();
        let mut pipeline = HorizontalPipeline::new();
        pipeline.insert(HorzStage::new(StageTag::XDouble, 2, 4, 4, 4, StageKernel::Stretch { bpp: 4 }));
        pipeline.insert(HorzStage::new(StageTag::XCopy, 4, 4, 4, 4, StageKernel::Copy { bpp: 4 }));
        pipeline.set_pivot(2);
        let vstage = VerticalStage { combine_y: CombineY::None, sdy: 2, ddy: 4, sdw: 8, pivot: 2, scan_double_vert: false, scan_triple_vert: false, planar: None };

        let a = 1u32.to_le_bytes();
        let b = 2u32.to_le_bytes();
        let c = 3u32.to_le_bytes();
        let d = 4u32.to_le_bytes();
        let mut src = Vec::new();
        src.extend_from_slice(&a);
        src.extend_from_slice(&b);
        src.extend_from_slice(&c);
        src.extend_from_slice(&d);

        let mut dst = LinearSurface::new(4, 4, 4, RgbDef::RGB_8888, crate::rgb::ColorIndex::Rgb);
        vstage.put(&mut ctx, &pipeline, &src, &mut dst, 0, 0, Some(RgbDef::RGB_8888), 4);

        let px = |row: usize, col: usize| -> u32 {
            let o = row * 16 + col * 4;
            u32::from_le_bytes(dst.data[o..o + 4].try_into().unwrap())
        };
        assert_eq!(px(0, 0), 1);
        assert_eq!(px(0, 1), 1);
        assert_eq!(px(0, 2), 2);
        assert_eq!(px(0, 3), 2);
        assert_eq!(px(2, 0), 3);
        assert_eq!(px(3, 3), 4);
    }

    #[test]
    fn planar_4plane_wrapping_routes_each_byte_to_its_own_plane() {
        // One pixel per plane per row: row bytes [p0, p1, p2, p3], read back
        // through `set_unchained_plane` into four separate plane buffers.
        let mut ctx = BlitContext::new(true).unwrap();
        let mut pipeline = HorizontalPipeline::new();
        pipeline.insert(HorzStage::new(StageTag::Unchained, 1, 1, 1, 1, StageKernel::Unchained { plane_num: 4 }));
        let vstage = VerticalStage { combine_y: CombineY::None, sdy: 2, ddy: 2, sdw: 4, pivot: 1, scan_double_vert: false, scan_triple_vert: false, planar: Some(4) };

        let src: Vec<u8> = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let mut dst = PlanarSurface::new(1, 2);
        vstage.put(&mut ctx, &pipeline, &src, &mut dst, 0, 0, None, 1);

        assert_eq!(dst.planes[0], vec![1, 5]);
        assert_eq!(dst.planes[1], vec![2, 6]);
        assert_eq!(dst.planes[2], vec![3, 7]);
        assert_eq!(dst.planes[3], vec![4, 8]);
    }
}
