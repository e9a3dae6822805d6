//! Box geometry and reorientation.
//!
//! [`BoxItem`] is the leaf value type of the optimizer: a rectangular prism
//! whose three dimensions can be relabeled in place by orientation operations.
//! The fit test ([`BoxItem::can_fit`]) is where all stacking geometry lives —
//! stacks and the GA never inspect dimensions directly beyond it.
//!
//! Orientation is deliberately mutable-in-place: a box committed to a stack
//! keeps whichever orientation satisfied the fit. Every box placed anywhere is
//! an owned clone, so no two stacks ever observe the same mutation.

use rand::Rng;
use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A rectangular box with a mutable orientation.
///
/// The `width × length` face is the footprint the box rests on; `height` is
/// the contribution to stack height. Structural equality (`PartialEq`) is
/// orientation-sensitive; use [`same_physical`](BoxItem::same_physical) to ask
/// whether two boxes are the same physical box regardless of orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoxItem {
    /// Footprint dimension along the first axis.
    pub width: u32,
    /// Vertical dimension in the current orientation.
    pub height: u32,
    /// Footprint dimension along the second axis.
    pub length: u32,
}

impl BoxItem {
    /// Creates a box from `width height length` (the input-file order).
    pub fn new(width: u32, height: u32, length: u32) -> Self {
        Self {
            width,
            height,
            length,
        }
    }

    /// Area of the face the box rests on (`width × length`).
    ///
    /// Widened to `u64` so two `u32` dimensions can never overflow.
    pub fn footprint_area(&self) -> u64 {
        self.width as u64 * self.length as u64
    }

    /// Volume of the box; invariant under every orientation operation.
    pub fn volume(&self) -> u64 {
        self.width as u64 * self.length as u64 * self.height as u64
    }

    /// Rolls the box onto its side: width and height swap roles.
    ///
    /// Changes the footprint, so any cached fit decision is stale after this.
    pub fn roll_over(&mut self) {
        std::mem::swap(&mut self.width, &mut self.height);
    }

    /// Turns the box sideways: width and length swap roles.
    ///
    /// The footprint area is invariant (`w×l == l×w`), but the axis labeling
    /// changes, which matters for subsequent fit checks.
    pub fn turn_sideways(&mut self) {
        std::mem::swap(&mut self.width, &mut self.length);
    }

    /// Randomizes orientation: roll-over and sideways-turn are each applied
    /// independently with probability 1/2, giving four equally likely shapes.
    pub fn randomly_orientate<R: Rng>(&mut self, rng: &mut R) {
        if rng.random_bool(0.5) {
            self.roll_over();
        }
        if rng.random_bool(0.5) {
            self.turn_sideways();
        }
    }

    /// Whether this box's current footprint fits strictly inside `onto`'s.
    ///
    /// Both axes must be strictly smaller — equal faces are a violation of
    /// the no-touching-faces rule.
    pub fn fits_directly(&self, onto: &BoxItem) -> bool {
        self.width < onto.width && self.length < onto.length
    }

    /// Tries to fit this box onto `onto`'s face, committing to whichever
    /// orientation succeeds.
    ///
    /// Order of attempts:
    /// 1. the current orientation as-is;
    /// 2. if `try_rotate`, turned sideways (committed on success);
    /// 3. if `try_roll_over`, rolled over once, then step 1 and 2 again.
    ///
    /// Roll-over recurses with `try_roll_over = false`, so it is attempted at
    /// most once per call and cannot oscillate.
    ///
    /// Side effect: on success the box keeps the fitting orientation; on
    /// failure it is left in its last-tried (possibly rolled) orientation.
    /// Callers must not assume failure leaves the box unmodified — work on an
    /// owned copy when the original must survive.
    pub fn can_fit(&mut self, onto: &BoxItem, try_roll_over: bool, try_rotate: bool) -> bool {
        if self.fits_directly(onto) {
            return true;
        }
        if try_rotate && self.length < onto.width && self.width < onto.length {
            self.turn_sideways();
            return true;
        }
        if try_roll_over {
            self.roll_over();
            return self.can_fit(onto, false, true);
        }
        false
    }

    /// Whether `self` and `other` are the same physical box: their dimension
    /// triples match as unordered sets, all three values compared.
    pub fn same_physical(&self, other: &BoxItem) -> bool {
        self.sorted_dims() == other.sorted_dims()
    }

    fn sorted_dims(&self) -> [u32; 3] {
        let mut dims = [self.width, self.length, self.height];
        dims.sort_unstable();
        dims
    }

    /// Comparator for sorting by descending footprint area (the better stack
    /// base first).
    ///
    /// Provided as a free comparator rather than an `Ord` impl: area ordering
    /// would be inconsistent with `same_physical`, and orientation changes
    /// the area anyway.
    pub fn cmp_area_desc(a: &BoxItem, b: &BoxItem) -> Ordering {
        b.footprint_area().cmp(&a.footprint_area())
    }
}

impl fmt::Display for BoxItem {
    /// Formats as `width length height`, the order the stack printout uses.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.width, self.length, self.height)
    }
}
