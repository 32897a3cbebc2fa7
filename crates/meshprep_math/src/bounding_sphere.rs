//! Bounding spheres
//!
//! A [`BoundingSphere`] is the optional bounding volume carried by a
//! geometry. Filters that move or combine vertices keep it in step.

use serde::{Serialize, Deserialize};

use crate::mat4::{self, Mat4};
use crate::Vec3;

/// A sphere enclosing a set of points
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingSphere {
    /// Center of the sphere
    pub center: Vec3,
    /// Radius of the sphere
    pub radius: f64,
}

impl BoundingSphere {
    /// Create a new bounding sphere
    pub const fn new(center: Vec3, radius: f64) -> Self {
        Self { center, radius }
    }

    /// Compute a sphere enclosing every point.
    ///
    /// Uses the center of the axis-aligned bounds and the farthest point from
    /// it. Not minimal, but tight enough for culling. Returns `None` for an
    /// empty point set.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
        I::IntoIter: Clone,
    {
        let iter = points.into_iter();
        let mut bounds: Option<(Vec3, Vec3)> = None;
        for p in iter.clone() {
            bounds = Some(match bounds {
                Some((min, max)) => (min.min_components(p), max.max_components(p)),
                None => (p, p),
            });
        }
        let (min, max) = bounds?;
        let center = (min + max) * 0.5;
        let radius = iter.map(|p| p.distance(center)).fold(0.0, f64::max);
        Some(Self::new(center, radius))
    }

    /// Smallest sphere enclosing both spheres
    pub fn union(&self, other: &Self) -> Self {
        let to_other = other.center - self.center;
        let separation = to_other.length();

        if self.radius >= separation + other.radius {
            return *self;
        }
        if other.radius >= separation + self.radius {
            return *other;
        }

        // Tangent points lie on the far side of each sphere along the center line
        let half_span = (self.radius + separation + other.radius) * 0.5;
        let center = self.center + to_other * ((half_span - self.radius) / separation);
        Self::new(center, half_span)
    }

    /// Move the sphere's center through `m`.
    ///
    /// The radius is left untouched, which is only exact for rigid and
    /// uniform-scale transforms.
    pub fn transform_center(&self, m: &Mat4) -> Self {
        Self::new(mat4::transform_point(m, self.center), self.radius)
    }

    /// Whether a point lies inside (or on) the sphere, with tolerance
    pub fn contains(&self, p: Vec3, epsilon: f64) -> bool {
        p.distance(self.center) <= self.radius + epsilon
    }
}
