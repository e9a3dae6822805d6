//! Stack construction and the genetic operators that act on stacks.
//!
//! A [`BoxStack`] is an ordered sequence of boxes, bottom to top, in which
//! every box's footprint lies strictly inside the footprint of the box
//! beneath it. All four ways a stack comes into existence — greedy
//! construction, crossover, gap-insertion mutation, duplicate removal — are
//! defined here; [`BoxStack::audit`] is the independent check that none of
//! them ever broke the invariant.

use crate::boxes::BoxItem;
use crate::error::NpStackError;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::fmt;

/// An ordered stack of boxes satisfying the strict-shrink invariant.
///
/// The stack exclusively owns its boxes; crossover and mutation always move
/// or copy boxes in, never share them, so reorienting a box in one stack can
/// never be observed by another.
#[derive(Debug, Clone)]
pub struct BoxStack {
    boxes: Vec<BoxItem>,
    height: u64,
}

impl BoxStack {
    /// Greedily builds a stack from `candidates`.
    ///
    /// Candidates are sorted by descending footprint area; the largest
    /// becomes the base, and each remaining box in that order is tried with
    /// [`BoxItem::can_fit`] against the current top (`try_rotate` always on,
    /// roll-over per `allow_rollover`). A box that fails is skipped for good —
    /// this is a single pass with no backtracking, and the GA's fitness
    /// landscape depends on it staying that way.
    ///
    /// An empty candidate list yields an empty stack of height 0.
    pub fn construct(mut candidates: Vec<BoxItem>, allow_rollover: bool) -> Self {
        candidates.sort_by(BoxItem::cmp_area_desc);

        let mut stack = Self {
            boxes: Vec::with_capacity(candidates.len()),
            height: 0,
        };

        let mut iter = candidates.into_iter();
        let Some(base) = iter.next() else {
            return stack;
        };
        stack.height += base.height as u64;
        stack.boxes.push(base);

        for mut b in iter {
            let top = stack.boxes.last().expect("stack has a base");
            if b.can_fit(top, allow_rollover, true) {
                stack.height += b.height as u64;
                stack.boxes.push(b);
            }
        }

        stack
    }

    /// Crossover: combines a prefix of the shorter parent with a suffix of
    /// the longer one, then rebuilds from scratch.
    ///
    /// The split index is uniform in `[1, short_len - 1]` (degenerate parents
    /// with fewer than two boxes contribute their whole sequence). The
    /// combined candidates go back through [`construct`](Self::construct)
    /// with roll-over enabled, so the child is always structurally valid —
    /// this is never a direct splice.
    pub fn breed<R: Rng>(&self, partner: &BoxStack, rng: &mut R) -> BoxStack {
        let (short, long) = if self.len() <= partner.len() {
            (self, partner)
        } else {
            (partner, self)
        };

        let short_len = short.len();
        let split = if short_len >= 2 {
            rng.random_range(1..short_len)
        } else {
            short_len
        };

        let mut combined = Vec::with_capacity(short_len.max(long.len()));
        combined.extend_from_slice(&short.boxes[..split]);
        combined.extend_from_slice(&long.boxes[split..]);

        BoxStack::construct(combined, true)
    }

    /// Gap-insertion mutation: tries to slot pool boxes into gaps between
    /// adjacent stack boxes.
    ///
    /// A gap exists where both footprint dimensions shrink by more than one
    /// unit. A pool box is inserted when it fits under the lower box (with
    /// full reorientation allowed) while the upper box still fits on it
    /// without any further reorientation. The inserted box is moved out of
    /// the pool and becomes the lower side of the next gap examined.
    ///
    /// Pool boxes whose footprint area is at least the area of the box they
    /// were tested against can never fit anywhere smaller later and are
    /// permanently dropped, so the pool shrinks monotonically across calls.
    pub fn mutate(&mut self, pool: &mut Vec<BoxItem>) {
        let mut i = 1;
        while i < self.boxes.len() {
            let prev = self.boxes[i - 1];
            let curr = self.boxes[i];

            // No room for an intermediate box in this gap.
            if prev.width.saturating_sub(curr.width) <= 1
                || prev.length.saturating_sub(curr.length) <= 1
            {
                i += 1;
                continue;
            }

            let prev_area = prev.footprint_area();
            let mut j = 0;
            while j < pool.len() {
                if pool[j].footprint_area() >= prev_area {
                    // Gaps only get narrower further up; this box is dead weight.
                    pool.remove(j);
                    continue;
                }

                let candidate = &mut pool[j];
                if candidate.can_fit(&prev, true, true) && curr.fits_directly(candidate) {
                    let b = pool.remove(j);
                    self.height += b.height as u64;
                    self.boxes.insert(i, b);
                    break;
                }
                j += 1;
            }

            i += 1;
        }
    }

    /// Removes duplicate uses of the same physical box, keeping the instance
    /// oriented to contribute more height.
    ///
    /// Pairs are compared by volume first (cheap filter), then by the full
    /// sorted-dimension equality. All removals are marked during the scan and
    /// applied afterwards; running twice yields the same stack as running
    /// once.
    pub fn remove_duplicates(&mut self) {
        let n = self.boxes.len();
        let mut doomed = vec![false; n];

        for i in 0..n {
            for j in 0..i {
                if self.boxes[i].volume() != self.boxes[j].volume() {
                    continue;
                }
                if self.boxes[i].same_physical(&self.boxes[j]) {
                    if self.boxes[i].height > self.boxes[j].height {
                        doomed[j] = true;
                    } else {
                        doomed[i] = true;
                    }
                }
            }
        }

        let removed_height: u64 = self
            .boxes
            .iter()
            .enumerate()
            .filter(|(i, _)| doomed[*i])
            .map(|(_, b)| b.height as u64)
            .sum();

        let mut idx = 0;
        self.boxes.retain(|_| {
            let keep = !doomed[idx];
            idx += 1;
            keep
        });
        self.height -= removed_height;
    }

    /// Verifies the strict-shrink invariant over every adjacent pair.
    ///
    /// A failure here means a bug in construction, crossover, or mutation —
    /// callers treat it as fatal, not recoverable. Run on the winning stack
    /// only; it is too expensive to run every generation.
    pub fn audit(&self) -> Result<(), NpStackError> {
        for (i, pair) in self.boxes.windows(2).enumerate() {
            let (lower, upper) = (pair[0], pair[1]);
            if upper.width >= lower.width || upper.length >= lower.length {
                return Err(NpStackError::AuditViolation {
                    position: i + 1,
                    lower,
                    upper,
                });
            }
        }
        Ok(())
    }

    /// Total height of the stack (sum of box heights).
    pub fn height(&self) -> u64 {
        self.height
    }

    /// Number of boxes in the stack.
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether the stack holds no boxes.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// The boxes, bottom to top.
    pub fn boxes(&self) -> &[BoxItem] {
        &self.boxes
    }

    /// Fitness comparator: taller stacks first; among equal heights, more
    /// boxes first (a finer-grained solution). Sorting a generation with this
    /// puts the fittest stack at index 0.
    pub fn cmp_fitness(a: &BoxStack, b: &BoxStack) -> Ordering {
        b.height
            .cmp(&a.height)
            .then_with(|| b.boxes.len().cmp(&a.boxes.len()))
    }
}

impl fmt::Display for BoxStack {
    /// Renders the stack top to bottom, one `width length height total` line
    /// per box, where `total` is the running height from the top down.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut total = 0u64;
        for b in self.boxes.iter().rev() {
            total += b.height as u64;
            writeln!(f, "{} {} {} {}", b.width, b.length, b.height, total)?;
        }
        Ok(())
    }
}

/// Clones the master box list, randomizes every box's orientation, and
/// shuffles the order. Each population member starts from one of these so the
/// search explores multiple shapes per physical box.
pub fn randomise_boxes<R: Rng>(boxes: &[BoxItem], rng: &mut R) -> Vec<BoxItem> {
    let mut randomised = boxes.to_vec();
    for b in &mut randomised {
        b.randomly_orientate(rng);
    }
    randomised.shuffle(rng);
    randomised
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn flat(side: u32) -> BoxItem {
        BoxItem::new(side, 1, side)
    }

    #[test]
    fn test_construct_nested_boxes() {
        let stack = BoxStack::construct(vec![flat(2), flat(5), flat(3), flat(4)], false);
        assert_eq!(stack.len(), 4);
        assert_eq!(stack.height(), 4);
        assert!(stack.audit().is_ok());
        // Base is the largest footprint.
        assert_eq!(stack.boxes()[0], flat(5));
    }

    #[test]
    fn test_construct_skips_unfittable() {
        // Two equal footprints: only one can be used (touching faces).
        let stack = BoxStack::construct(vec![flat(4), flat(4), flat(2)], false);
        assert_eq!(stack.len(), 2);
        assert!(stack.audit().is_ok());
    }

    #[test]
    fn test_construct_is_single_pass() {
        // Area order is 6x6 (36), 4x4 (16), 5x1 (5). Once 4x4 is placed the
        // 5x1 box can no longer fit and is skipped; a skipped box is never
        // reconsidered.
        let stack = BoxStack::construct(
            vec![BoxItem::new(5, 1, 1), flat(6), flat(4)],
            false,
        );
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.boxes()[1], flat(4));
    }

    #[test]
    fn test_construct_empty_candidates() {
        let stack = BoxStack::construct(Vec::new(), true);
        assert!(stack.is_empty());
        assert_eq!(stack.height(), 0);
        assert!(stack.audit().is_ok());
    }

    #[test]
    fn test_construct_rollover_recovers_unfittable_boxes() {
        // 12x2x3 cannot fit onto 10x10 as-is or rotated (one axis is 12),
        // but rolled over it becomes 2x12x3 and fits, standing 12 tall.
        let candidates = vec![flat(10), BoxItem::new(12, 2, 3)];
        let without = BoxStack::construct(candidates.clone(), false);
        let with = BoxStack::construct(candidates, true);
        assert_eq!(without.len(), 1);
        assert_eq!(with.len(), 2);
        assert_eq!(with.height(), 13);
        assert!(with.audit().is_ok());
    }

    #[test]
    fn test_breed_child_is_valid() {
        let mut rng = StdRng::seed_from_u64(42);
        let a = BoxStack::construct(vec![flat(8), flat(6), flat(4), flat(2)], false);
        let b = BoxStack::construct(vec![flat(7), flat(5), flat(3)], false);
        for _ in 0..50 {
            let child = a.breed(&b, &mut rng);
            assert!(child.audit().is_ok());
            assert!(!child.is_empty());
        }
    }

    #[test]
    fn test_breed_deterministic_with_seed() {
        let a = BoxStack::construct(vec![flat(8), flat(6), flat(4), flat(2)], false);
        let b = BoxStack::construct(vec![flat(7), flat(5), flat(3)], false);

        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        let c1 = a.breed(&b, &mut rng1);
        let c2 = a.breed(&b, &mut rng2);
        assert_eq!(c1.boxes(), c2.boxes());
        assert_eq!(c1.height(), c2.height());
    }

    #[test]
    fn test_breed_single_box_parent() {
        // Degenerate split: the shorter parent has one box.
        let mut rng = StdRng::seed_from_u64(1);
        let a = BoxStack::construct(vec![flat(9)], false);
        let b = BoxStack::construct(vec![flat(8), flat(6), flat(4)], false);
        let child = a.breed(&b, &mut rng);
        assert!(child.audit().is_ok());
        assert!(!child.is_empty());
    }

    #[test]
    fn test_mutate_inserts_into_gap() {
        // Gap between 9x9 and 3x3 has room; a 5x5 box slots in.
        let mut stack = BoxStack::construct(vec![flat(9), flat(3)], false);
        assert_eq!(stack.len(), 2);
        let mut pool = vec![flat(5)];
        stack.mutate(&mut pool);
        assert_eq!(stack.len(), 3);
        assert_eq!(stack.height(), 3);
        assert!(pool.is_empty(), "inserted box must leave the pool");
        assert!(stack.audit().is_ok());
    }

    #[test]
    fn test_mutate_respects_tight_gap() {
        // 4x4 over 5x5 leaves no room (difference of 1 on both axes).
        let mut stack = BoxStack::construct(vec![flat(5), flat(4)], false);
        let mut pool = vec![flat(3)];
        stack.mutate(&mut pool);
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_mutate_prunes_oversized_pool_boxes() {
        let mut stack = BoxStack::construct(vec![flat(6), flat(2)], false);
        // Area 49 >= the lower box's 36: unusable anywhere, dropped for good.
        let mut pool = vec![flat(7)];
        stack.mutate(&mut pool);
        assert!(pool.is_empty());
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_mutate_chains_from_inserted_box() {
        // Gap 9x9 -> 2x2 takes a 6x6; the next gap examined is 6x6 -> 2x2,
        // which takes the 4x4 in the same call.
        let mut stack = BoxStack::construct(vec![flat(9), flat(2)], false);
        let mut pool = vec![flat(6), flat(4)];
        stack.mutate(&mut pool);
        assert_eq!(stack.len(), 4);
        assert!(stack.audit().is_ok());
    }

    #[test]
    fn test_mutate_upper_box_is_not_reoriented() {
        let mut stack = BoxStack::construct(
            vec![BoxItem::new(10, 1, 20), BoxItem::new(2, 1, 8)],
            false,
        );
        assert_eq!(stack.len(), 2);
        // 9x3 fits under 10x20 as-is, but the 2x8 above it only sits on 9x3
        // if the upper box were rotated — which insertion must not do.
        let mut pool = vec![BoxItem::new(9, 1, 3)];
        stack.mutate(&mut pool);
        assert_eq!(stack.len(), 2);
        assert!(stack.audit().is_ok());
    }

    #[test]
    fn test_remove_duplicates_keeps_taller_instance() {
        // 5x2x3 and 3x5x2 are the same physical 2x3x5 box in two
        // orientations; both end up in the stack, standing 2 and 5 tall.
        let mut stack = BoxStack::construct(
            vec![flat(9), BoxItem::new(5, 2, 3), BoxItem::new(3, 5, 2)],
            false,
        );
        assert_eq!(stack.len(), 3);
        stack.remove_duplicates();
        assert_eq!(stack.len(), 2);
        // The instance contributing 5 height survives.
        assert_eq!(stack.boxes()[1], BoxItem::new(3, 5, 2));
        assert_eq!(stack.height(), 6);
        assert!(stack.audit().is_ok());
    }

    #[test]
    fn test_remove_duplicates_is_idempotent() {
        let mut stack = BoxStack::construct(
            vec![
                flat(9),
                flat(7),
                BoxItem::new(5, 2, 3),
                BoxItem::new(3, 5, 2),
            ],
            false,
        );
        assert_eq!(stack.len(), 4);
        stack.remove_duplicates();
        assert_eq!(stack.len(), 3);
        let once: Vec<BoxItem> = stack.boxes().to_vec();
        let height_once = stack.height();
        stack.remove_duplicates();
        assert_eq!(stack.boxes(), once.as_slice());
        assert_eq!(stack.height(), height_once);
    }

    #[test]
    fn test_remove_duplicates_updates_height() {
        let mut stack = BoxStack::construct(
            vec![flat(9), BoxItem::new(5, 2, 3), BoxItem::new(3, 5, 2)],
            false,
        );
        stack.remove_duplicates();
        let recomputed: u64 = stack.boxes().iter().map(|b| b.height as u64).sum();
        assert_eq!(stack.height(), recomputed);
    }

    #[test]
    fn test_audit_reports_offending_pair() {
        let mut stack = BoxStack::construct(vec![flat(5), flat(3)], false);
        // Corrupt the stack directly to exercise the failure path.
        stack.boxes.push(flat(7));
        let err = stack.audit().unwrap_err();
        match err {
            NpStackError::AuditViolation {
                position,
                lower,
                upper,
            } => {
                assert_eq!(position, 2);
                assert_eq!(lower, flat(3));
                assert_eq!(upper, flat(7));
            }
            other => panic!("expected AuditViolation, got {other}"),
        }
    }

    #[test]
    fn test_fitness_prefers_height_then_box_count() {
        let tall_sparse = BoxStack::construct(
            vec![BoxItem::new(9, 20, 9), BoxItem::new(5, 20, 5)],
            false,
        );
        let short_dense =
            BoxStack::construct(vec![flat(9), flat(7), flat(5), flat(3), flat(2), flat(1)], false);
        assert_eq!(tall_sparse.height(), 40);
        assert_eq!(short_dense.height(), 6);
        // Height dominates.
        assert_eq!(
            BoxStack::cmp_fitness(&tall_sparse, &short_dense),
            Ordering::Less
        );

        // Equal height: more boxes ranks first.
        let four = BoxStack::construct(
            vec![
                BoxItem::new(9, 15, 9),
                BoxItem::new(7, 10, 7),
                BoxItem::new(5, 3, 5),
                BoxItem::new(3, 2, 3),
            ],
            false,
        );
        let two = BoxStack::construct(
            vec![BoxItem::new(9, 20, 9), BoxItem::new(5, 10, 5)],
            false,
        );
        assert_eq!(four.height(), 30);
        assert_eq!(two.height(), 30);
        assert_eq!(BoxStack::cmp_fitness(&four, &two), Ordering::Less);
    }

    #[test]
    fn test_display_prints_top_down_with_running_total() {
        let stack = BoxStack::construct(
            vec![BoxItem::new(5, 2, 5), BoxItem::new(3, 4, 3)],
            false,
        );
        let rendered = stack.to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines, vec!["3 3 4 4", "5 5 2 6"]);
    }

    #[test]
    fn test_randomise_boxes_preserves_physical_boxes() {
        let mut rng = StdRng::seed_from_u64(3);
        let master = vec![BoxItem::new(2, 3, 4), BoxItem::new(5, 6, 7)];
        let randomised = randomise_boxes(&master, &mut rng);
        assert_eq!(randomised.len(), 2);
        for b in &randomised {
            assert!(master.iter().any(|m| m.same_physical(b)));
        }
        // The master list is untouched.
        assert_eq!(master[0], BoxItem::new(2, 3, 4));
    }

    proptest! {
        /// Any candidate list, with or without roll-over, constructs a stack
        /// the audit accepts.
        #[test]
        fn prop_construct_always_audits(
            dims in proptest::collection::vec((1u32..50, 1u32..50, 1u32..50), 0..40),
            allow_rollover in any::<bool>(),
        ) {
            let candidates: Vec<BoxItem> = dims
                .into_iter()
                .map(|(w, h, l)| BoxItem::new(w, h, l))
                .collect();
            let stack = BoxStack::construct(candidates, allow_rollover);
            prop_assert!(stack.audit().is_ok());
        }

        /// Crossover of two constructed stacks always audits.
        #[test]
        fn prop_breed_always_audits(
            dims_a in proptest::collection::vec((1u32..30, 1u32..30, 1u32..30), 1..20),
            dims_b in proptest::collection::vec((1u32..30, 1u32..30, 1u32..30), 1..20),
            seed in any::<u64>(),
        ) {
            let a = BoxStack::construct(
                dims_a.into_iter().map(|(w, h, l)| BoxItem::new(w, h, l)).collect(),
                false,
            );
            let b = BoxStack::construct(
                dims_b.into_iter().map(|(w, h, l)| BoxItem::new(w, h, l)).collect(),
                false,
            );
            let mut rng = StdRng::seed_from_u64(seed);
            let child = a.breed(&b, &mut rng);
            prop_assert!(child.audit().is_ok());
        }
    }
}
