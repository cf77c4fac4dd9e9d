// Copyright 2002 Andrea Mazzoleni (AdvanceMAME)
// Copyright 2020 Evgeniy Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Errors the pipeline can report while being assembled or run.

use crate::rgb::RgbDef;

/// Everything that can go wrong building or driving a [`crate::blit::Pipeline`].
#[derive(Copy, Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum BlitError {
    /// The requested combine mode needs a capability the context doesn't have
    /// (e.g. `Y_SCALE2X` without `ddx == 2*sdx && ddy == 2*sdy`).
    #[error("requested capability is unavailable for this geometry")]
    CapabilityUnavailable,

    /// No stage knows how to convert between these two RGB layouts.
    #[error("no conversion from {src:?} to {dst:?}")]
    UnsupportedConversion { src: RgbDef, dst: RgbDef },

    /// The scratch arena ran out of slots or bytes for this frame.
    #[error("scratch arena exhausted")]
    ArenaExhausted,
}
