use glam::{Mat4, Vec3};

/// Axis-aligned bounding box in world space.
///
/// An empty box has `min > max` on every axis and never intersects anything,
/// which is how the player box starts out before the first movement tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    pub fn from_center_and_size(center: Vec3, size: Vec3) -> Self {
        let half = size * 0.5;
        Self { min: center - half, max: center + half }
    }

    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.expand_by_point(p);
        }
        aabb
    }

    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        if self.is_empty() { Vec3::ZERO } else { self.max - self.min }
    }

    pub fn expand_by_point(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb { min: self.min.min(other.min), max: self.max.max(other.max) }
    }

    /// Touching faces count as an intersection.
    pub fn intersects(&self, other: &Aabb) -> bool {
        !(other.max.x < self.min.x || other.min.x > self.max.x
            || other.max.y < self.min.y || other.min.y > self.max.y
            || other.max.z < self.min.z || other.min.z > self.max.z)
    }

    fn corners(&self) -> [Vec3; 8] {
        let (a, b) = (self.min, self.max);
        [
            Vec3::new(a.x, a.y, a.z),
            Vec3::new(b.x, a.y, a.z),
            Vec3::new(a.x, b.y, a.z),
            Vec3::new(b.x, b.y, a.z),
            Vec3::new(a.x, a.y, b.z),
            Vec3::new(b.x, a.y, b.z),
            Vec3::new(a.x, b.y, b.z),
            Vec3::new(b.x, b.y, b.z),
        ]
    }

    /// Re-box the eight transformed corners. The result stays axis-aligned,
    /// so a rotated box grows to enclose its rotated corners.
    pub fn transformed(&self, m: &Mat4) -> Aabb {
        if self.is_empty() {
            return *self;
        }
        Aabb::from_points(self.corners().iter().map(|c| m.transform_point3(*c)))
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_never_intersects() {
        let unit = Aabb::from_center_and_size(Vec3::ZERO, Vec3::ONE);
        assert!(Aabb::EMPTY.is_empty());
        assert!(!Aabb::EMPTY.intersects(&unit));
        assert!(!unit.intersects(&Aabb::EMPTY));
    }

    #[test]
    fn touching_faces_intersect() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let c = Aabb::new(Vec3::new(1.01, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn center_and_size_round_trip() {
        let b = Aabb::from_center_and_size(Vec3::new(1.0, 2.0, 3.0), Vec3::new(5.0, 15.0, 5.0));
        assert_eq!(b.center(), Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.size(), Vec3::new(5.0, 15.0, 5.0));
        assert_eq!(b.min.y, 2.0 - 7.5);
    }

    #[test]
    fn rotation_grows_box() {
        let b = Aabb::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 0.1));
        let rotated = b.transformed(&Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2));
        // width along x moves onto -z
        assert!((rotated.min.z + 2.0).abs() < 1e-5);
        assert!((rotated.max.x - 0.1).abs() < 1e-5);
        assert!(rotated.intersects(&Aabb::new(Vec3::new(0.05, 0.5, -1.0), Vec3::new(0.05, 0.5, -1.0))));
    }
}
