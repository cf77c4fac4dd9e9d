// Copyright 2002 Andrea Mazzoleni (AdvanceMAME)
// Copyright 2020 Evgeniy Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The `combine` directive: which vertical combine mode to use and which
//! decorations to stack on top of it.

use bitflags::bitflags;

/// Vertical combine mode. Occupies the low bits of a [`Combine`] mask.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum CombineY {
    /// Straight copy/stretch, no inter-row blending.
    None,
    /// Average of the contributing rows.
    Mean,
    /// Low-pass filter between the current and previous row.
    Filter,
    /// Per-channel (or per-byte, in palette mode) max of the contributing rows.
    Max,
    /// Scale2x pixel-art doubling. Only valid when `ddy == 2*sdy` and `ddx == 2*sdx`.
    Scale2x,
}

bitflags! {
    /// Bitwise-combinable directive describing the horizontal decorations and
    /// the vertical combine mode requested for a pipeline.
    pub struct Combine: u32 {
        const Y_NONE             = 0b0000_0000_0000;
        const Y_MEAN             = 0b0000_0000_0001;
        const Y_FILTER           = 0b0000_0000_0010;
        const Y_MAX              = 0b0000_0000_0011;
        const Y_SCALE2X          = 0b0000_0000_0100;
        const Y_MASK             = 0b0000_0000_0111;

        const X_FILTER                  = 0b0000_0000_1000;
        const X_RGB_TRIAD3PIX           = 0b0000_0001_0000;
        const X_RGB_TRIAD6PIX           = 0b0000_0010_0000;
        const X_RGB_TRIAD16PIX          = 0b0000_0100_0000;
        const X_RGB_TRIADSTRONG3PIX     = 0b0000_1000_0000;
        const X_RGB_TRIADSTRONG6PIX     = 0b0001_0000_0000;
        const X_RGB_TRIADSTRONG16PIX    = 0b0010_0000_0000;
        const X_RGB_SCANDOUBLEHORZ      = 0b0100_0000_0000;
        const X_RGB_SCANTRIPLEHORZ      = 0b1000_0000_0000;
        const X_RGB_SCANDOUBLEVERT      = 0b0001_0000_0000_0000;
        const X_RGB_SCANTRIPLEVERT      = 0b0010_0000_0000_0000;
    }
}

impl Combine {
    /// Extracts the vertical combine sub-mask as a typed enum.
    pub fn combine_y(self) -> CombineY {
        match (self & Combine::Y_MASK).bits() {
            0b0001 => CombineY::Mean,
            0b0010 => CombineY::Filter,
            0b0011 => CombineY::Max,
            0b0100 => CombineY::Scale2x,
            _ => CombineY::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_y_extraction() {
        assert_eq!(Combine::Y_NONE.combine_y(), CombineY::None);
        assert_eq!(Combine::Y_MEAN.combine_y(), CombineY::Mean);
        assert_eq!(Combine::Y_FILTER.combine_y(), CombineY::Filter);
        assert_eq!(Combine::Y_MAX.combine_y(), CombineY::Max);
        assert_eq!(Combine::Y_SCALE2X.combine_y(), CombineY::Scale2x);
    }

    #[test]
    fn combine_is_combinable() {
        let c = Combine::Y_MEAN | Combine::X_FILTER | Combine::X_RGB_TRIAD3PIX;
        assert_eq!(c.combine_y(), CombineY::Mean);
        assert!(c.contains(Combine::X_FILTER));
        assert!(c.contains(Combine::X_RGB_TRIAD3PIX));
        assert!(!c.contains(Combine::X_RGB_TRIAD6PIX));
    }
}
