//! Sphere-overlap collision detection and pair codes.

use orbis_core::{Body, BodyKind};

use crate::partition::PartitionRange;

/// Whether two spheres overlap: the distance between centres is strictly
/// less than the sum of the radii.
pub fn collides(a: &Body, b: &Body) -> bool {
    (a.position - b.position).norm() < a.radius + b.radius
}

/// Moons never collide with planets.
pub fn is_exempt(a: &Body, b: &Body) -> bool {
    matches!(
        (a.kind, b.kind),
        (BodyKind::Moon, BodyKind::Planet) | (BodyKind::Planet, BodyKind::Moon)
    )
}

/// Whether a pair should be tested at all.
pub fn is_candidate(a: &Body, b: &Body) -> bool {
    a.active && b.active && !is_exempt(a, b)
}

/// A colliding pair `(i, j)` encoded as `i * max_body_size + j`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PairCode(pub u64);

impl PairCode {
    /// Encode `(i, j)`. Lossless while `j < max_body_size`.
    pub fn encode(i: usize, j: usize, max_body_size: usize) -> Self {
        debug_assert!(j < max_body_size, "slot {j} outside capacity {max_body_size}");
        Self(i as u64 * max_body_size as u64 + j as u64)
    }

    /// Decode back to `(i, j)`.
    pub fn decode(self, max_body_size: usize) -> (usize, usize) {
        let max = max_body_size as u64;
        let j = self.0 % max;
        let i = (self.0 - j) / max;
        (i as usize, j as usize)
    }
}

/// Resumable scan over the pairs `(i, j)` with `i` in a range and
/// `i < j < limit`.
///
/// The scanner takes the body array afresh on every call, so the caller
/// may mutate bodies between hits. Pairs are visited in ascending `i`,
/// then ascending `j`, and each pair's candidacy is re-evaluated at the
/// moment it is visited.
#[derive(Clone, Debug)]
pub struct PairScanner {
    i: usize,
    j: usize,
    end: usize,
    limit: usize,
}

impl PairScanner {
    /// Scan outer slots in `range` against partners below `limit`.
    pub fn new(range: PartitionRange, limit: usize) -> Self {
        Self {
            i: range.start,
            j: range.start + 1,
            end: range.end.min(limit),
            limit,
        }
    }

    /// Advance to the next overlapping candidate pair.
    pub fn next_hit(&mut self, bodies: &[Body]) -> Option<(usize, usize)> {
        while self.i < self.end {
            while self.j < self.limit {
                let (i, j) = (self.i, self.j);
                self.j += 1;
                let (a, b) = (&bodies[i], &bodies[j]);
                if is_candidate(a, b) && collides(a, b) {
                    return Some((i, j));
                }
            }
            self.i += 1;
            self.j = self.i + 1;
        }
        None
    }
}

/// Every overlapping candidate pair with `i` in `range`, against a
/// snapshot of `bodies`.
pub fn scan_pairs(bodies: &[Body], range: PartitionRange) -> Vec<(usize, usize)> {
    let mut scanner = PairScanner::new(range, bodies.len());
    std::iter::from_fn(|| scanner.next_hit(bodies)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbis_core::Vec3;
    use orbis_test_utils::{asteroid, moon, planet};
    use proptest::prelude::*;

    #[test]
    fn overlap_at_distance_five_but_not_seven() {
        let a = asteroid("A", Vec3::ZERO, 3.0);
        let near = asteroid("B", Vec3::new(5.0, 0.0, 0.0), 3.0);
        let far = asteroid("C", Vec3::new(7.0, 0.0, 0.0), 3.0);
        assert!(collides(&a, &near));
        assert!(!collides(&a, &far));
    }

    #[test]
    fn touching_spheres_do_not_collide() {
        let a = asteroid("A", Vec3::ZERO, 3.0);
        let b = asteroid("B", Vec3::new(0.0, 6.0, 0.0), 3.0);
        assert!(!collides(&a, &b));
    }

    #[test]
    fn moons_are_exempt_from_planets() {
        let p = planet("EARTH", Vec3::ZERO, 10.0);
        let m = moon("MOON", Vec3::new(1.0, 0.0, 0.0), 1.0);
        assert!(collides(&p, &m));
        assert!(!is_candidate(&p, &m));
        assert!(!is_candidate(&m, &p));
    }

    #[test]
    fn inactive_bodies_are_not_candidates() {
        let a = asteroid("A", Vec3::ZERO, 3.0);
        let mut b = asteroid("B", Vec3::ZERO, 3.0);
        b.active = false;
        assert!(!is_candidate(&a, &b));
    }

    #[test]
    fn scan_only_looks_forward_from_the_range() {
        let bodies = vec![
            asteroid("A", Vec3::ZERO, 1.0),
            asteroid("B", Vec3::new(0.5, 0.0, 0.0), 1.0),
            asteroid("C", Vec3::new(1.0, 0.0, 0.0), 1.0),
        ];
        assert_eq!(scan_pairs(&bodies, PartitionRange::new(0, 3)), vec![(0, 1), (0, 2), (1, 2)]);
        assert_eq!(scan_pairs(&bodies, PartitionRange::new(1, 3)), vec![(1, 2)]);
        assert!(scan_pairs(&bodies, PartitionRange::new(2, 3)).is_empty());
    }

    #[test]
    fn scanner_sees_mutations_between_hits() {
        let mut bodies = vec![
            asteroid("A", Vec3::ZERO, 1.0),
            asteroid("B", Vec3::new(0.5, 0.0, 0.0), 1.0),
            asteroid("C", Vec3::new(1.0, 0.0, 0.0), 1.0),
        ];
        let mut scanner = PairScanner::new(PartitionRange::new(0, 3), 3);
        assert_eq!(scanner.next_hit(&bodies), Some((0, 1)));
        bodies[0].active = false;
        assert_eq!(scanner.next_hit(&bodies), Some((1, 2)));
        assert_eq!(scanner.next_hit(&bodies), None);
    }

    #[test]
    fn pair_code_matches_formula() {
        assert_eq!(PairCode::encode(3, 7, 100), PairCode(307));
        assert_eq!(PairCode(307).decode(100), (3, 7));
    }

    fn arb_body() -> impl Strategy<Value = Body> {
        (
            prop::array::uniform3(-100.0f64..100.0),
            0.1f64..50.0,
        )
            .prop_map(|(p, r)| asteroid("X", Vec3::from(p), r))
    }

    proptest! {
        #[test]
        fn collision_test_is_symmetric(a in arb_body(), b in arb_body()) {
            prop_assert_eq!(collides(&a, &b), collides(&b, &a));
        }

        #[test]
        fn pair_code_round_trips(max in 1usize..10_000, i in 0usize..10_000, j_frac in 0.0f64..1.0) {
            let j = ((max as f64 * j_frac) as usize).min(max - 1);
            prop_assert_eq!(PairCode::encode(i, j, max).decode(max), (i, j));
        }
    }
}
