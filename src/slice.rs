// Copyright 2002 Andrea Mazzoleni (AdvanceMAME)
// Copyright 2020 Evgeniy Reizner
//
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Integer run-length slicing, a.k.a. the "good, the bad, and the run-sliced"
//! Bresenham variant (Michael Abrash, Dr. Dobb's Journal, Nov 1992), adapted
//! here for bitmap resizing rather than line drawing.

/// Partitions one axis of length `sd` into `dd` runs whose lengths sum to `sd`.
///
/// Implements [`Iterator`] directly: each call to `next()` advances the
/// internal Bresenham error term and yields the next run length. This is the
/// form the vertical drivers and the tests actually want to consume — a lazy
/// sequence of run lengths, not a step function manually re-invoked.
#[derive(Copy, Clone, Debug)]
pub struct Slice {
    whole: i32,
    up: i32,
    down: i32,
    error: i32,
    count: u32,
}

impl Slice {
    /// Builds a slicer for resizing a `sd`-long source axis to a `dd`-long
    /// destination axis (or vice versa, depending on which driver calls it —
    /// the slicer itself is symmetric in naming, see the three branches below).
    pub fn new(sd: u32, dd: u32) -> Self {
        if sd < dd {
            // expansion
            Slice {
                whole: (dd / sd) as i32,
                up: ((dd % sd) * 2) as i32,
                down: (sd * 2) as i32,
                error: 0,
                count: sd,
            }
        } else if sd == dd {
            Slice {
                whole: 1,
                up: 0,
                down: 0,
                error: 0,
                count: sd,
            }
        } else {
            // reduction
            let sd1 = sd - 1;
            let dd1 = dd - 1;
            Slice {
                whole: (sd1 / dd1) as i32,
                up: ((sd1 % dd1) * 2) as i32,
                down: (dd1 * 2) as i32,
                error: 0,
                count: dd1 + 1,
            }
        }
    }

    /// Number of runs left to produce, including the one `next()` would yield.
    pub fn remaining(&self) -> u32 {
        self.count
    }

    /// Advances the slicer by one run, returning its length. Panics if the
    /// slicer is already terminal (`remaining() == 0`) — callers drive this
    /// through the `Iterator` impl, which checks that for them.
    fn step(&mut self) -> u32 {
        let mut run = self.whole;
        self.error += self.up;
        if self.error > 0 {
            run += 1;
            self.error -= self.down;
        }
        self.count -= 1;
        run as u32
    }
}

impl Iterator for Slice {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.count == 0 {
            None
        } else {
            Some(self.step())
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.count as usize, Some(self.count as usize))
    }
}

impl ExactSizeIterator for Slice {
    fn len(&self) -> usize {
        self.count as usize
    }
}
