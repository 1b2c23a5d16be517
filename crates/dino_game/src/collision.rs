//! Axis-aligned overlap tests between sprites.
//!
//! Boxes are anchored at the sprite's top-left corner (Y grows downward) and
//! extend by `size * scale * shrink`. Shrink factors below one trim the right
//! and bottom edges so near misses on the transparent corners of the art do
//! not count as hits.
//!
//! All comparisons are strict: boxes that only share an edge do not overlap.

use glam::Vec2;

/// Anything with a placed, scaled rectangle.
pub trait Bounds {
    fn position(&self) -> Vec2;
    fn size(&self) -> Vec2;
    fn scale(&self) -> Vec2;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn of(bounds: &impl Bounds, shrink: Vec2) -> Self {
        let min = bounds.position();
        Self {
            min,
            max: min + bounds.size() * bounds.scale() * shrink,
        }
    }

    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}

/// A touch or click treated as a 1x1 entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointBounds(pub Vec2);

impl Bounds for PointBounds {
    fn position(&self) -> Vec2 {
        self.0
    }

    fn size(&self) -> Vec2 {
        Vec2::ONE
    }

    fn scale(&self) -> Vec2 {
        Vec2::ONE
    }
}

pub fn overlaps(a: &impl Bounds, b: &impl Bounds, shrink_a: Vec2, shrink_b: Vec2) -> bool {
    Aabb::of(a, shrink_a).intersects(&Aabb::of(b, shrink_b))
}

pub fn point_hits(point: Vec2, target: &impl Bounds) -> bool {
    overlaps(&PointBounds(point), target, Vec2::ONE, Vec2::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Boxed {
        position: Vec2,
        size: Vec2,
        scale: Vec2,
    }

    impl Bounds for Boxed {
        fn position(&self) -> Vec2 {
            self.position
        }
        fn size(&self) -> Vec2 {
            self.size
        }
        fn scale(&self) -> Vec2 {
            self.scale
        }
    }

    fn boxed(x: f32, y: f32, w: f32, h: f32) -> Boxed {
        Boxed {
            position: Vec2::new(x, y),
            size: Vec2::new(w, h),
            scale: Vec2::ONE,
        }
    }

    #[test]
    fn overlapping_boxes_collide_both_ways() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        let b = boxed(5.0, 5.0, 10.0, 10.0);
        assert!(overlaps(&a, &b, Vec2::ONE, Vec2::ONE));
        assert!(overlaps(&b, &a, Vec2::ONE, Vec2::ONE));
    }

    #[test]
    fn swapping_arguments_with_their_shrinks_gives_the_same_answer() {
        let shrink_a = Vec2::new(0.9, 0.5);
        let shrink_b = Vec2::new(0.3, 1.0);
        let a = Boxed {
            position: Vec2::new(50.0, 40.0),
            size: Vec2::new(44.0, 47.0),
            scale: Vec2::splat(2.0),
        };
        let mut hits = 0;
        let mut misses = 0;
        for step_x in 0..20 {
            for step_y in 0..10 {
                let b = boxed(
                    -20.0 + step_x as f32 * 9.0,
                    10.0 + step_y as f32 * 11.0,
                    25.0,
                    50.0,
                );
                let forward = overlaps(&a, &b, shrink_a, shrink_b);
                assert_eq!(
                    forward,
                    overlaps(&b, &a, shrink_b, shrink_a),
                    "asymmetric at {:?}",
                    b.position
                );
                if forward {
                    hits += 1;
                } else {
                    misses += 1;
                }
            }
        }
        assert!(hits > 0 && misses > 0);
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        let right = boxed(10.0, 0.0, 10.0, 10.0);
        let below = boxed(0.0, 10.0, 10.0, 10.0);
        assert!(!overlaps(&a, &right, Vec2::ONE, Vec2::ONE));
        assert!(!overlaps(&a, &below, Vec2::ONE, Vec2::ONE));
    }

    #[test]
    fn scale_extends_the_box() {
        let mut a = boxed(0.0, 0.0, 10.0, 10.0);
        let b = boxed(15.0, 0.0, 10.0, 10.0);
        assert!(!overlaps(&a, &b, Vec2::ONE, Vec2::ONE));
        a.scale = Vec2::splat(2.0);
        assert!(overlaps(&a, &b, Vec2::ONE, Vec2::ONE));
    }

    #[test]
    fn shrink_turns_near_miss_into_miss() {
        let a = boxed(0.0, 0.0, 10.0, 10.0);
        let b = boxed(9.0, 0.0, 10.0, 10.0);
        assert!(overlaps(&a, &b, Vec2::ONE, Vec2::ONE));
        assert!(!overlaps(&a, &b, Vec2::new(0.9, 1.0), Vec2::ONE));
    }

    #[test]
    fn point_inside_hits_and_outside_misses() {
        let button = boxed(100.0, 100.0, 36.0, 32.0);
        assert!(point_hits(Vec2::new(110.0, 110.0), &button));
        assert!(point_hits(Vec2::new(99.5, 99.5), &button));
        assert!(!point_hits(Vec2::new(99.0, 110.0), &button));
        assert!(!point_hits(Vec2::new(136.0, 110.0), &button));
    }
}
