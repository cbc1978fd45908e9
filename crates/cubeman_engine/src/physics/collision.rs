//! Query types shared by box and ray tests

use crate::foundation::collections::ComponentId;
use crate::foundation::math::Vec3;
use crate::scene::AABB;

use super::collision_layers::CollisionType;

/// A ray for point probes
///
/// The direction is kept as given; its length decides how far ahead
/// [`Ray::probe_point`] lands.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub origin: Vec3,
    /// The direction of the ray, not normalized
    pub direction: Vec3,
}

impl Ray {
    /// Creates a new ray with the given origin and direction
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Get a point along the ray at parameter t
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// The single point tested by ray queries: `origin + direction`
    pub fn probe_point(&self) -> Vec3 {
        self.point_at(1.0)
    }
}

/// The collidable that satisfied a query
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionHit {
    /// Component owning the collidable
    pub owner: ComponentId,
    /// Owner name
    pub name: String,
    /// Tag of the collidable
    pub kind: CollisionType,
    /// World box of the collidable at query time
    pub bounds: AABB,
}

/// Outcome of a box or ray query
#[derive(Debug, Clone, PartialEq)]
pub struct HitResult {
    /// Whether any candidate matched
    pub hit: bool,
    /// First matching candidate
    pub object: Option<CollisionHit>,
    /// Single-axis translation suggested to separate the query box; zero on a miss
    pub correction: Vec3,
}

impl HitResult {
    /// Result of a query that matched nothing
    pub fn miss() -> Self {
        Self {
            hit: false,
            object: None,
            correction: Vec3::zeros(),
        }
    }

    /// Result of a query that matched `object`
    pub fn with_hit(object: CollisionHit, correction: Vec3) -> Self {
        Self {
            hit: true,
            object: Some(object),
            correction,
        }
    }
}

impl Default for HitResult {
    fn default() -> Self {
        Self::miss()
    }
}

/// Single-axis correction separating `query` from `candidate`
///
/// Per axis the gap is measured on the side of the candidate the query
/// center lies on: `candidate.min - query.max` when the query center is below
/// the candidate center, else `candidate.max - query.min`. The reported axis
/// is the one whose gap is smallest in magnitude, which for overlapping boxes
/// is the axis of shallowest penetration. Ties go to X, then Y, then Z.
pub fn correction_vector(query: &AABB, candidate: &AABB) -> Vec3 {
    let query_center = query.center();
    let candidate_center = candidate.center();

    let mut gaps = Vec3::zeros();
    for axis in 0..3 {
        gaps[axis] = if query_center[axis] < candidate_center[axis] {
            candidate.min[axis] - query.max[axis]
        } else {
            candidate.max[axis] - query.min[axis]
        };
    }

    let mut best = 0;
    for axis in 1..3 {
        if gaps[axis].abs() < gaps[best].abs() {
            best = axis;
        }
    }

    let mut correction = Vec3::zeros();
    correction[best] = gaps[best];
    correction
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_shallow_x_overlap_corrects_along_x() {
        let query = AABB::new(Vec3::zeros(), Vec3::repeat(10.0));
        let candidate = AABB::new(Vec3::new(9.0, 1.0, 1.0), Vec3::new(15.0, 9.0, 9.0));
        let correction = correction_vector(&query, &candidate);
        assert_relative_eq!(correction.x, -1.0);
        assert_relative_eq!(correction.y, 0.0);
        assert_relative_eq!(correction.z, 0.0);
    }

    #[test]
    fn test_query_above_candidate_pushes_up() {
        let query = AABB::new(Vec3::new(0.0, 8.0, 0.0), Vec3::new(10.0, 12.0, 10.0));
        let candidate = AABB::new(Vec3::new(-20.0, 0.0, -20.0), Vec3::new(20.0, 10.0, 20.0));
        let correction = correction_vector(&query, &candidate);
        assert_relative_eq!(correction.y, 2.0);
        assert_relative_eq!(correction.x, 0.0);
    }

    #[test]
    fn test_tie_prefers_x() {
        let query = AABB::new(Vec3::zeros(), Vec3::repeat(2.0));
        let candidate = AABB::new(Vec3::repeat(1.0), Vec3::repeat(3.0));
        let correction = correction_vector(&query, &candidate);
        assert_relative_eq!(correction.x, -1.0);
        assert_relative_eq!(correction.y, 0.0);
    }

    #[test]
    fn test_probe_point_uses_raw_direction() {
        let ray = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 4.0));
        assert_relative_eq!(ray.probe_point(), Vec3::new(1.0, 0.0, 4.0));
    }
}
