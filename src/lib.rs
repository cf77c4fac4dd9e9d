// Copyright 2002 Andrea Mazzoleni (AdvanceMAME)
// Copyright 2020 Evgeniy Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

/*!
`tiny-blit` is a hardware-agnostic software video blit pipeline: per-scanline
color conversion, Bresenham-sliced stretching and reduction, low-pass
filtering, Scale2x pixel-art magnification, and CRT-style chroma/scanline
decoration, assembled once per shape and re-run every frame.

The pipeline is built from small closed-variant stages (see [`stage`]) chained
by a [`pipeline::HorizontalPipeline`] and driven row-by-row by a
[`vertical::VerticalStage`]. Callers reach the pipeline through the four
[`blit::Pipeline`] initializers and its `blit` method; everything else in this
crate is the machinery those entry points assemble.
*/

#![doc(html_root_url = "https://docs.rs/tiny-blit/0.1.0")]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]
#![allow(clippy::too_many_arguments)]

mod arena;
mod assembler;
mod blit;
mod combine;
mod context;
mod error;
mod kernels;
mod pipeline;
mod rgb;
mod slice;
mod stage;
mod surface;
mod vertical;

pub use assembler::SourceGeometry;
pub use blit::Pipeline;
pub use combine::{Combine, CombineY};
pub use context::BlitContext;
pub use error::BlitError;
pub use rgb::{ColorIndex, RgbConversion, RgbDef};
pub use surface::Surface;
