use glam::{Vec2, Vec3};

use crate::layout::{WorldLayout, confine_to_radius};
use crate::solid::Solid;

/// Planar distances below this are treated as zero when picking a push direction.
pub const DEGENERATE_EPSILON: f32 = 1e-6;

/// Overlap tolerance. A point left on a boundary counts as clear, so resolving
/// an already-resolved point never moves it again.
pub const CONTACT_SLOP: f32 = 1e-4;

/// Default number of sequential passes over the solid list.
pub const DEFAULT_MAX_PASSES: usize = 4;

/// How far the fallback search looks for a clear point once the passes give up.
pub const SEARCH_REACH: f32 = 64.0;
const MIN_SEARCH_STEP: f32 = 0.25;
const SEARCH_DIRECTIONS: usize = 16;

/// Read-only depenetration view over a layout's static solids.
///
/// Each pass tests the solids in list order and applies every correction to a
/// running candidate. This is not a simultaneous solve: a push out of one
/// solid can land inside an earlier one, which the next pass then corrects,
/// up to `max_passes`. With `max_passes == 1` this is the single-pass form.
/// When the passes do not settle, [`CollisionIndex::resolve`] falls back to
/// a ring search for the nearest clear point.
#[derive(Debug, Clone, Copy)]
pub struct CollisionIndex<'a> {
    solids: &'a [Solid],
    bounds_radius: Option<f32>,
    max_passes: usize,
}

impl<'a> CollisionIndex<'a> {
    pub fn new(solids: &'a [Solid]) -> Self {
        Self {
            solids,
            bounds_radius: None,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    /// Index over a layout's solids, confined to its town boundary.
    pub fn for_layout(layout: &'a WorldLayout) -> Self {
        Self::new(layout.solids()).with_bounds(layout.bounds_radius())
    }

    pub fn with_bounds(mut self, radius: f32) -> Self {
        self.bounds_radius = Some(radius);
        self
    }

    pub fn with_max_passes(mut self, passes: usize) -> Self {
        self.max_passes = passes.max(1);
        self
    }

    pub fn solids(&self) -> &'a [Solid] {
        self.solids
    }

    pub fn len(&self) -> usize {
        self.solids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solids.is_empty()
    }

    /// Project `p` inside the town boundary, if this index has one.
    pub fn confine(&self, p: Vec3) -> Vec3 {
        match self.bounds_radius {
            Some(r) => confine_to_radius(p, r),
            None => p,
        }
    }

    /// Push a circle of `radius` at `candidate` out of every solid.
    ///
    /// Only x and z change, and the output stays inside the boundary when the
    /// index has one. For finite input the output is finite. The output
    /// is clear whenever a clear point exists within [`SEARCH_REACH`] of the
    /// relaxed candidate, and a clear point is returned unchanged, so
    /// `resolve(resolve(p)) == resolve(p)`.
    pub fn resolve(&self, candidate: Vec3, radius: f32) -> Vec3 {
        let relaxed = self.confine(self.relax(candidate, radius));
        if self.is_clear(relaxed, radius) {
            return relaxed;
        }
        match self.nearest_clear(relaxed, radius) {
            Some(p) => p,
            None => {
                tracing::debug!(x = relaxed.x, z = relaxed.z, "no clear point near unconverged candidate");
                relaxed
            }
        }
    }

    /// The sequential passes alone.
    ///
    /// Between overlapping solids or gaps narrower than `2 * radius` the
    /// passes can cycle, so the result may still overlap a solid.
    pub fn relax(&self, candidate: Vec3, radius: f32) -> Vec3 {
        let mut p = candidate;
        for _ in 0..self.max_passes {
            let mut corrected = false;
            for solid in self.solids {
                if let Some(out) = depenetrate(solid, p, radius) {
                    p = out;
                    corrected = true;
                }
            }
            if !corrected {
                break;
            }
        }
        p
    }

    /// First clear point on rings of growing radius around `origin`.
    fn nearest_clear(&self, origin: Vec3, radius: f32) -> Option<Vec3> {
        let step = radius.max(MIN_SEARCH_STEP);
        let rings = (SEARCH_REACH / step).ceil() as usize;
        (1..=rings).find_map(|ring| {
            let dist = ring as f32 * step;
            (0..SEARCH_DIRECTIONS).find_map(|k| {
                let angle = k as f32 * std::f32::consts::TAU / SEARCH_DIRECTIONS as f32;
                let sample = self.confine(Vec3::new(
                    origin.x + angle.cos() * dist,
                    origin.y,
                    origin.z + angle.sin() * dist,
                ));
                self.is_clear(sample, radius).then_some(sample)
            })
        })
    }

    /// Whether `p` overlaps no solid.
    pub fn is_clear(&self, p: Vec3, radius: f32) -> bool {
        self.solids
            .iter()
            .all(|s| depenetrate(s, p, radius).is_none())
    }

    /// Indices of solids overlapping a circle at `p`, in list order.
    pub fn overlapping(&self, p: Vec3, radius: f32) -> Vec<usize> {
        self.solids
            .iter()
            .enumerate()
            .filter(|(_, s)| depenetrate(s, p, radius).is_some())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Corrected point if the circle at `p` overlaps `solid`, otherwise `None`.
fn depenetrate(solid: &Solid, p: Vec3, radius: f32) -> Option<Vec3> {
    match *solid {
        Solid::Cylinder {
            center,
            radius: solid_radius,
            ..
        } => {
            let min_dist = radius + solid_radius;
            let offset = Vec2::new(p.x - center.x, p.z - center.z);
            let d = offset.length();
            if d >= min_dist - CONTACT_SLOP {
                return None;
            }
            let dir = if d > DEGENERATE_EPSILON {
                offset / d
            } else {
                Vec2::X
            };
            let pushed = Vec2::new(center.x, center.z) + dir * min_dist;
            Some(Vec3::new(pushed.x, p.y, pushed.y))
        }
        Solid::Box {
            center,
            half_extents,
            ..
        } => {
            let rot = solid.rotation();
            let world_offset = Vec3::new(p.x - center.x, 0.0, p.z - center.z);
            let mut local = rot.inverse() * world_offset;

            let reach_x = half_extents.x + radius;
            let reach_z = half_extents.z + radius;
            let pen_x = reach_x - local.x.abs();
            let pen_z = reach_z - local.z.abs();
            if pen_x <= CONTACT_SLOP || pen_z <= CONTACT_SLOP {
                return None;
            }

            if pen_x < pen_z {
                local.x = side(local.x) * reach_x;
            } else {
                local.z = side(local.z) * reach_z;
            }
            let back = rot * Vec3::new(local.x, 0.0, local.z);
            Some(Vec3::new(center.x + back.x, p.y, center.z + back.z))
        }
    }
}

fn side(v: f32) -> f32 {
    if v < 0.0 { -1.0 } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cylinder(x: f32, z: f32, r: f32) -> Solid {
        Solid::Cylinder {
            center: Vec3::new(x, 0.0, z),
            radius: r,
            height: 3.0,
        }
    }

    fn building(x: f32, z: f32, hx: f32, hz: f32, yaw: f32) -> Solid {
        Solid::Box {
            center: Vec3::new(x, 2.0, z),
            half_extents: Vec3::new(hx, 2.0, hz),
            yaw,
        }
    }

    #[test]
    fn exact_cylinder_center_pushes_to_contact_distance() {
        let solids = [cylinder(0.0, 0.0, 1.0)];
        let index = CollisionIndex::new(&solids);
        let out = index.resolve(Vec3::ZERO, 0.5);
        assert!(out.is_finite());
        let d = Vec2::new(out.x, out.z).length();
        assert!((d - 1.5).abs() < 1e-5, "distance was {d}");
    }

    #[test]
    fn cylinder_push_is_radial() {
        let solids = [cylinder(10.0, 10.0, 1.0)];
        let index = CollisionIndex::new(&solids);
        let out = index.resolve(Vec3::new(10.5, 1.7, 10.0), 0.4);
        assert!((out.x - 11.4).abs() < 1e-5);
        assert!((out.z - 10.0).abs() < 1e-5);
        assert_eq!(out.y, 1.7);
    }

    #[test]
    fn clear_point_is_untouched() {
        let solids = [cylinder(0.0, 0.0, 1.0), building(10.0, 0.0, 2.0, 2.0, 0.3)];
        let index = CollisionIndex::new(&solids);
        let p = Vec3::new(-5.0, 1.7, 5.0);
        assert_eq!(index.resolve(p, 0.5), p);
        assert!(index.is_clear(p, 0.5));
    }

    #[test]
    fn box_pushes_along_shallower_axis() {
        let solids = [building(0.0, 0.0, 4.0, 2.0, 0.0)];
        let index = CollisionIndex::new(&solids);
        // Deep in x (pen 4.5 - 1 = 3.5), shallow in z (pen 2.5 - 1.5 = 1.0).
        let out = index.resolve(Vec3::new(1.0, 0.0, 1.5), 0.5);
        assert!((out.x - 1.0).abs() < 1e-5);
        assert!((out.z - 2.5).abs() < 1e-5);
    }

    #[test]
    fn box_push_sign_follows_candidate_side() {
        let solids = [building(0.0, 0.0, 2.0, 2.0, 0.0)];
        let index = CollisionIndex::new(&solids);
        let out = index.resolve(Vec3::new(-1.8, 0.0, 0.1), 0.2);
        assert!((out.x + 2.2).abs() < 1e-5);
    }

    #[test]
    fn rotated_box_push_lands_on_rotated_face() {
        let yaw = std::f32::consts::FRAC_PI_2;
        let solids = [building(0.0, 0.0, 4.0, 1.0, yaw)];
        let index = CollisionIndex::new(&solids);
        // Rotated 90°, the thin axis lies along world x.
        let out = index.resolve(Vec3::new(0.5, 0.0, 0.0), 0.5);
        assert!((out.x.abs() - 1.5).abs() < 1e-4, "got {out:?}");
        assert!(out.z.abs() < 1e-4);
        assert!(index.is_clear(out, 0.5));
    }

    #[test]
    fn box_center_is_finite() {
        let solids = [building(3.0, -2.0, 1.0, 1.0, 0.7)];
        let index = CollisionIndex::new(&solids);
        let out = index.resolve(Vec3::new(3.0, 0.0, -2.0), 0.3);
        assert!(out.is_finite());
        assert!(index.is_clear(out, 0.3));
    }

    #[test]
    fn single_pass_can_leave_overlap_that_relaxation_fixes() {
        // Pushing out of the cylinder lands inside the box listed before it.
        let solids = [building(2.05, 0.35, 0.95, 0.3, 0.0), cylinder(0.0, 0.0, 1.0)];
        let start = Vec3::new(0.1, 0.0, 0.0);

        let single = CollisionIndex::new(&solids).with_max_passes(1);
        let out = single.relax(start, 0.2);
        assert!(!single.is_clear(out, 0.2));

        let relaxed = CollisionIndex::new(&solids);
        let out = relaxed.relax(start, 0.2);
        assert!(relaxed.is_clear(out, 0.2), "still overlapping at {out:?}");
    }

    #[test]
    fn unsettled_passes_fall_back_to_a_clear_point() {
        // A gap narrower than the circle: the passes bounce between the walls.
        let solids = [building(-1.5, 0.0, 1.0, 4.0, 0.0), building(1.5, 0.0, 1.0, 4.0, 0.0)];
        let index = CollisionIndex::new(&solids).with_max_passes(1);
        let start = Vec3::new(0.0, 1.7, 0.0);
        assert!(!index.is_clear(index.relax(start, 0.6), 0.6));

        let out = index.resolve(start, 0.6);
        assert!(index.is_clear(out, 0.6), "still overlapping at {out:?}");
        assert_eq!(index.resolve(out, 0.6), out);
        assert_eq!(out.y, 1.7);
    }

    #[test]
    fn confine_requires_bounds() {
        let solids: [Solid; 0] = [];
        let p = Vec3::new(500.0, 0.0, 0.0);
        assert_eq!(CollisionIndex::new(&solids).confine(p), p);
        let c = CollisionIndex::new(&solids).with_bounds(100.0).confine(p);
        assert!((c.x - 100.0).abs() < 1e-4);
    }

    #[test]
    fn overlapping_lists_indices_in_order() {
        let solids = [
            cylinder(0.0, 0.0, 1.0),
            cylinder(50.0, 0.0, 1.0),
            building(0.0, 0.0, 2.0, 2.0, 0.0),
        ];
        let index = CollisionIndex::new(&solids);
        assert_eq!(index.overlapping(Vec3::ZERO, 0.5), vec![0, 2]);
    }

    /// Solids laid out on a coarse grid so none of them overlap.
    fn disjoint_solids() -> impl Strategy<Value = Vec<Solid>> {
        proptest::collection::vec(
            (any::<bool>(), 0.5f32..3.0, 0.5f32..3.0, -3.2f32..3.2),
            1..12,
        )
        .prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (is_box, a, b, yaw))| {
                    let x = (i % 4) as f32 * 20.0;
                    let z = (i / 4) as f32 * 20.0;
                    if is_box {
                        building(x, z, a, b, yaw)
                    } else {
                        cylinder(x, z, a)
                    }
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn resolve_is_total(
            solids in disjoint_solids(),
            x in -100.0f32..100.0,
            z in -100.0f32..100.0,
            r in 0.01f32..2.0,
        ) {
            let index = CollisionIndex::new(&solids);
            let out = index.resolve(Vec3::new(x, 1.7, z), r);
            prop_assert!(out.is_finite());
            prop_assert_eq!(out.y, 1.7);
        }

        #[test]
        fn resolve_at_any_solid_center_is_finite(solids in disjoint_solids(), r in 0.01f32..2.0) {
            let index = CollisionIndex::new(&solids);
            for s in &solids {
                let out = index.resolve(s.center(), r);
                prop_assert!(out.is_finite());
            }
        }

        #[test]
        fn resolve_is_idempotent(
            solids in disjoint_solids(),
            x in -10.0f32..80.0,
            z in -10.0f32..60.0,
            r in 0.05f32..2.0,
        ) {
            let index = CollisionIndex::new(&solids);
            let once = index.resolve(Vec3::new(x, 0.0, z), r);
            let twice = index.resolve(once, r);
            prop_assert!((once - twice).length() <= 1e-6, "{:?} vs {:?}", once, twice);
        }

        #[test]
        fn resolve_is_idempotent_on_generated_towns(
            seed in any::<u32>(),
            angle in 0.0f32..std::f32::consts::TAU,
            t in 0.0f32..1.0,
        ) {
            let layout = WorldLayout::generate(seed, "text");
            let index = CollisionIndex::for_layout(&layout);
            let d = t.sqrt() * layout.bounds_radius();
            let p = Vec3::new(angle.cos() * d, 1.7, angle.sin() * d);
            let once = index.resolve(p, 0.4);
            prop_assert!(index.is_clear(once, 0.4), "overlapping at {:?}", once);
            let twice = index.resolve(once, 0.4);
            prop_assert!((once - twice).length() <= 1e-6, "{:?} vs {:?}", once, twice);
        }

        #[test]
        fn resolve_settles_inside_building_clusters(seed in any::<u32>(), pick in any::<prop::sample::Index>()) {
            let layout = WorldLayout::generate(seed, "text");
            let index = CollisionIndex::for_layout(&layout);
            let center = pick.get(layout.buildings()).footprint.center();
            let once = index.resolve(Vec3::new(center.x, 1.7, center.z), 0.4);
            prop_assert!(index.is_clear(once, 0.4));
            prop_assert_eq!(index.resolve(once, 0.4), once);
        }
    }
}
