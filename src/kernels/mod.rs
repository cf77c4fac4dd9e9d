// Copyright 2002 Andrea Mazzoleni (AdvanceMAME)
// Copyright 2020 Evgeniy Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Concrete per-row kernels. Each module here is grounded on one collaborator
//! header from the original `blit.c` (noted per module) and is free-standing:
//! the pipeline/assembler/driver only ever see these through [`crate::stage::StageKernel`].

pub mod copy;
pub mod filter;
pub mod palette;
pub mod reduce;
pub mod rgbconv;
pub mod scale2x;
pub mod stretch;
pub mod triad;
pub mod unchained;
