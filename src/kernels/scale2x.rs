// Copyright 2002 Andrea Mazzoleni (AdvanceMAME)
// Copyright 2020 Evgeniy Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! The AdvanceMAME/Scale2x pixel-art magnification rule, grounded on
//! `iscale.h`. Doubles both axes: each source pixel becomes a 2x2 block.
//!
//! For a source pixel `E` with its 4-neighborhood
//! ```text
//!   B
//! D E F
//!   H
//! ```
//! (`B`=row above, `H`=row below, `D`/`F`=left/right neighbors, edge columns
//! clamp to `E`): if `B != H` and `D != F`, the four output sub-pixels take
//! the value of whichever orthogonal neighbor agrees with their corner and
//! disagrees with the center; otherwise all four sub-pixels equal `E`.

/// Produces two destination rows (`2*sdx` pixels of `bpp` bytes each) from
/// three consecutive source rows of `sdx` pixels. `prev`/`next` may equal
/// `cur` at image edges (the vertical driver duplicates the edge row).
pub fn scale2x_row(dst0: &mut [u8], dst1: &mut [u8], prev: &[u8], cur: &[u8], next: &[u8], sdx: u32, bpp: u8) {
    let bpp = bpp as usize;
    let sdx = sdx as usize;

    let at = |row: &[u8], x: usize| -> &[u8] {
        let x = x.min(sdx - 1);
        &row[x * bpp..x * bpp + bpp]
    };

    for x in 0..sdx {
        let e = at(cur, x);
        let b = at(prev, x);
        let h = at(next, x);
        let d = at(cur, x.wrapping_sub(1).min(x));
        let f = at(cur, x + 1);

        let (e0, e1) = if b != h && d != f {
            let e0 = if d == b { d } else { e };
            let e1 = if f == b { f } else { e };
            (e0, e1)
        } else {
            (e, e)
        };
        let (e2, e3) = if b != h && d != f {
            let e2 = if d == h { d } else { e };
            let e3 = if f == h { f } else { e };
            (e2, e3)
        } else {
            (e, e)
        };

        let o = x * 2 * bpp;
        dst0[o..o + bpp].copy_from_slice(e0);
        dst0[o + bpp..o + 2 * bpp].copy_from_slice(e1);
        dst1[o..o + bpp].copy_from_slice(e2);
        dst1[o + bpp..o + 2 * bpp].copy_from_slice(e3);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_image_stays_flat() {
        let row = [5u8; 3];
        let mut dst0 = [0u8; 6];
        let mut dst1 = [0u8; 6];
        scale2x_row(&mut dst0, &mut dst1, &row, &row, &row, 3, 1);
        assert_eq!(dst0, [5u8; 6]);
        assert_eq!(dst1, [5u8; 6]);
    }

    #[test]
    fn corner_takes_agreeing_neighbor() {
        // center column: above=1, below=2, left=1, right=2, center=9.
        // B=1 != H=2, D=1 != F=2 -> corners resolve to the agreeing side.
        let prev = [1u8, 1, 1];
        let cur = [1u8, 9, 2];
        let next = [2u8, 2, 2];
        let mut dst0 = [0u8; 6];
        let mut dst1 = [0u8; 6];
        scale2x_row(&mut dst0, &mut dst1, &prev, &cur, &next, 3, 1);
        // center pixel (index 1) expands to columns 2,3 in dst0/dst1
        assert_eq!(dst0[2], 1); // e0: d==b(1==1) -> d
        assert_eq!(dst0[3], 9); // e1: f==b(2==1)? no -> e
        assert_eq!(dst1[2], 9); // e2: d==h(1==2)? no -> e
        assert_eq!(dst1[3], 2); // e3: f==h(2==2) -> f
    }

    #[test]
    fn disagreeing_neighborhood_falls_back_to_center() {
        let prev = [1u8, 2, 3];
        let cur = [4u8, 5, 6];
        let next = [1u8, 2, 3]; // B == H, so no resolution even with D != F
        let mut dst0 = [0u8; 6];
        let mut dst1 = [0u8; 6];
        scale2x_row(&mut dst0, &mut dst1, &prev, &cur, &next, 3, 1);
        assert_eq!(&dst0[2..4], &[5, 5]);
        assert_eq!(&dst1[2..4], &[5, 5]);
    }
}
