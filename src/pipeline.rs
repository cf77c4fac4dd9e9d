// Copyright 2002 Andrea Mazzoleni (AdvanceMAME)
// Copyright 2020 Evgeniy Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The horizontal pipeline: an ordered sequence of stage descriptors, with
//! scratch sized and lent out in strict LIFO order and a *pivot* index the
//! vertical driver splits on.
//!
//! Execution itself passes data between stages as owned `Vec<u8>` row
//! buffers rather than handing out raw pointers into the arena's backing
//! store: the arena (`BlitContext::alloc`/`free`) still enforces the
//! original's LIFO-capacity contract (so `BlitError::ArenaExhausted` and
//! misuse panics remain observable), but nothing here aliases that memory,
//! sidestepping the pointer-pair aliasing the original's `stage_begin`/
//! `stage_end`/`stage_pivot` triple requires (see the design notes).

use crate::context::BlitContext;
use crate::error::BlitError;
use crate::stage::HorzStage;

#[derive(Default)]
pub struct HorizontalPipeline {
    stages: Vec<HorzStage>,
    pivot: usize,
}

impl HorizontalPipeline {
    pub fn new() -> Self {
        HorizontalPipeline { stages: Vec::new(), pivot: 0 }
    }

    /// Appends a stage to the tail, returning its index.
    pub fn insert(&mut self, stage: HorzStage) -> usize {
        self.stages.push(stage);
        self.stages.len() - 1
    }

    /// Replaces `[begin, end)` with a single stage (peephole fusion).
    pub fn substitute(&mut self, begin: usize, end: usize, stage: HorzStage) {
        self.stages.splice(begin..end, std::iter::once(stage));
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[HorzStage] {
        &self.stages
    }

    pub fn set_pivot(&mut self, pivot: usize) {
        self.pivot = pivot;
    }

    pub fn pivot(&self) -> usize {
        self.pivot
    }

    /// Geometry of the pivot seam: `(sdx, sdp, sbpp)` of the stage the pivot
    /// sits before, or the caller-supplied destination geometry if the pivot
    /// is at the end of the pipeline.
    pub fn pivot_geometry(&self, fallback: (u32, u8, u8)) -> (u32, u8, u8) {
        match self.stages.get(self.pivot) {
            Some(stage) => (stage.sdx, stage.sdp, stage.sbpp),
            None => fallback,
        }
    }

    /// Allocates each stage's scratch buffer from the context's arena, in
    /// ascending index order; the terminal stage gets none (it writes
    /// straight to the caller's destination).
    pub fn realize(&mut self, ctx: &mut BlitContext) -> Result<(), BlitError> {
        let last = self.stages.len().saturating_sub(1);
        for (i, stage) in self.stages.iter_mut().enumerate() {
            if i == last {
                stage.buffer = None;
                stage.buffer_len = 0;
                continue;
            }
            let size = stage.kernel.buffer_size(stage.ddx).max(1);
            let (handle, _) = ctx.alloc(size)?;
            stage.buffer = Some(handle);
            stage.buffer_len = size;
        }
        Ok(())
    }

    /// Frees scratch in exact reverse order of `realize`'s allocations, as
    /// the arena's LIFO discipline requires.
    pub fn done(&mut self, ctx: &mut BlitContext) {
        for stage in self.stages.iter_mut().rev() {
            if let Some(handle) = stage.buffer.take() {
                ctx.free(handle);
            }
        }
    }

    /// Runs stages `[a, b)` in chained mode: stage 0 reads `src`, stage
    /// `k>0` reads stage `k-1`'s output. Returns the last stage's output
    /// (or `src` verbatim for an empty range).
    pub fn run_partial(&self, a: usize, b: usize, src: &[u8]) -> Vec<u8> {
        if a == b {
            return src.to_vec();
        }
        let mut current = src.to_vec();
        for stage in &self.stages[a..b] {
            let mut out = vec![0u8; stage.kernel.buffer_size(stage.ddx).max(1)];
            stage.kernel.put(&mut out, &current, stage.sdx, stage.sbpp, stage.sdp);
            current = out;
        }
        current
    }

    /// Same as [`Self::run_partial`], but the final stage writes directly
    /// into `dst` instead of a freshly allocated buffer.
    pub fn run_partial_on_buffer(&self, a: usize, b: usize, src: &[u8], dst: &mut [u8]) {
        if a == b {
            dst.copy_from_slice(&src[..dst.len()]);
            return;
        }
        if b - a == 1 {
            let stage = &self.stages[a];
            stage.kernel.put(dst, src, stage.sdx, stage.sbpp, stage.sdp);
            return;
        }
        let intermediate = self.run_partial(a, b - 1, src);
        let stage = &self.stages[b - 1];
        stage.kernel.put(dst, &intermediate, stage.sdx, stage.sbpp, stage.sdp);
    }

    /// Runs the whole pipeline in chained mode.
    pub fn run(&self, src: &[u8]) -> Vec<u8> {
        self.run_partial(0, self.stages.len(), src)
    }

    /// Combines [`Self::run_partial_on_buffer`] and the plain first-stage
    /// optimization of [`Self::run_plain`]: `src` is known to be plain (it
    /// came from a same-pipeline buffer), and the final stage writes
    /// directly into `dst`.
    pub fn run_partial_on_buffer_plain(&self, a: usize, b: usize, src: &[u8], dst: &mut [u8]) {
        if a == b {
            dst.copy_from_slice(&src[..dst.len()]);
            return;
        }
        if b - a == 1 {
            let stage = &self.stages[a];
            stage.kernel.put_plain(dst, src, stage.sdx, stage.sbpp);
            return;
        }
        let intermediate = self.run_plain(a, b - 1, src);
        let stage = &self.stages[b - 1];
        stage.kernel.put(dst, &intermediate, stage.sdx, stage.sbpp, stage.sdp);
    }

    /// Like [`Self::run_partial`], but the first stage uses `put_plain`
    /// since its input is guaranteed plain (it came from a same-pipeline
    /// buffer, not the original strided source).
    pub fn run_plain(&self, a: usize, b: usize, src: &[u8]) -> Vec<u8> {
        if a == b {
            return src.to_vec();
        }
        let first = &self.stages[a];
        let mut out = vec![0u8; first.kernel.buffer_size(first.ddx).max(1)];
        first.kernel.put_plain(&mut out, src, first.sdx, first.sbpp);
        let mut current = out;
        for stage in &self.stages[a + 1..b] {
            let mut out = vec![0u8; stage.kernel.buffer_size(stage.ddx).max(1)];
            stage.kernel.put(&mut out, &current, stage.sdx, stage.sbpp, stage.sdp);
            current = out;
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::{StageKernel, StageTag};

    fn copy_stage(sdx: u32, bpp: u8, ddx: u32) -> HorzStage {
        HorzStage::new(StageTag::XCopy, sdx, bpp, bpp, ddx, StageKernel::Copy { bpp })
    }

    #[test]
    fn empty_range_passes_through() {
        let pipeline = HorizontalPipeline::new();
        let src = [1u8, 2, 3];
        assert_eq!(pipeline.run_partial(0, 0, &src), vec![1, 2, 3]);
    }

    #[test]
    fn chained_copy_stages_propagate() {
        let mut pipeline = HorizontalPipeline::new();
        pipeline.insert(copy_stage(2, 1, 2));
        pipeline.insert(copy_stage(2, 1, 2));
        let src = [7u8, 8];
        assert_eq!(pipeline.run(&src), vec![7, 8]);
    }

    #[test]
    fn realize_and_done_balance_the_arena() {
        let mut ctx = BlitContext::new(true).unwrap();
        let mut pipeline = HorizontalPipeline::new();
        pipeline.insert(copy_stage(4, 4, 4));
        pipeline.insert(copy_stage(4, 4, 4));
        pipeline.realize(&mut ctx).unwrap();
        pipeline.done(&mut ctx);
        ctx.shutdown();
    }

    #[test]
    fn substitute_replaces_a_range() {
        let mut pipeline = HorizontalPipeline::new();
        pipeline.insert(copy_stage(2, 1, 2));
        pipeline.insert(copy_stage(2, 1, 2));
        pipeline.insert(copy_stage(2, 1, 2));
        pipeline.substitute(0, 2, copy_stage(2, 1, 2));
        assert_eq!(pipeline.len(), 2);
    }
}
