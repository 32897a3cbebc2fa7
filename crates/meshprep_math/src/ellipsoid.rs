//! Reference ellipsoid and geodetic coordinates

use serde::{Serialize, Deserialize};

use crate::Vec3;

/// Convergence threshold for the surface projection iteration
const SURFACE_EPSILON: f64 = 1e-12;

/// Newton steps before the surface projection gives up
const MAXIMUM_ITERATIONS: usize = 100;

/// Squared-normalized distance from the center below which points are not
/// projected onto the surface by iteration
const CENTER_TOLERANCE_SQUARED: f64 = 0.1;

/// Geodetic position: longitude and latitude in radians, height in meters
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Cartographic {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
}

impl Cartographic {
    pub const fn new(longitude: f64, latitude: f64, height: f64) -> Self {
        Self { longitude, latitude, height }
    }
}

/// An axis-aligned ellipsoid centered at the origin
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    radii: Vec3,
}

impl Ellipsoid {
    /// The WGS84 reference ellipsoid
    pub const WGS84: Self = Self {
        radii: Vec3::new(6378137.0, 6378137.0, 6356752.314245179),
    };

    /// A unit sphere
    pub const UNIT_SPHERE: Self = Self {
        radii: Vec3::new(1.0, 1.0, 1.0),
    };

    /// Create an ellipsoid from its radii
    pub const fn new(radii: Vec3) -> Self {
        Self { radii }
    }

    pub fn radii(&self) -> Vec3 {
        self.radii
    }

    /// Largest radius
    pub fn maximum_radius(&self) -> f64 {
        self.radii.x.max(self.radii.y).max(self.radii.z)
    }

    fn one_over_radii(&self) -> Vec3 {
        Vec3::new(1.0 / self.radii.x, 1.0 / self.radii.y, 1.0 / self.radii.z)
    }

    fn one_over_radii_squared(&self) -> Vec3 {
        let r = self.one_over_radii();
        r.component_mul(r)
    }

    /// Surface normal at a point on (or near) the surface
    pub fn geodetic_surface_normal(&self, p: Vec3) -> Vec3 {
        p.component_mul(self.one_over_radii_squared()).normalized()
    }

    /// Project a point along the geodetic normal onto the surface.
    ///
    /// Newton iteration on the ellipsoid equation. Returns `None` when the
    /// point sits at the center, where the normal is undefined, when a
    /// coordinate is not finite, or when the iteration does not converge.
    pub fn scale_to_geodetic_surface(&self, p: Vec3) -> Option<Vec3> {
        if !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()) {
            return None;
        }

        let inv = self.one_over_radii();
        let inv_sq = self.one_over_radii_squared();

        let x2 = p.x * p.x * inv.x * inv.x;
        let y2 = p.y * p.y * inv.y * inv.y;
        let z2 = p.z * p.z * inv.z * inv.z;

        let squared_norm = x2 + y2 + z2;
        if !squared_norm.is_finite() {
            return None;
        }
        let ratio = (1.0 / squared_norm).sqrt();

        // Radial intersection: a good initial guess
        let intersection = p * ratio;

        if squared_norm < CENTER_TOLERANCE_SQUARED {
            return if ratio.is_finite() { Some(intersection) } else { None };
        }

        let gradient = intersection.component_mul(inv_sq) * 2.0;
        let mut lambda = ((1.0 - ratio) * p.length()) / (0.5 * gradient.length());
        let mut correction = 0.0;

        let (mut xm, mut ym, mut zm);
        let mut iterations = 0;
        loop {
            if iterations == MAXIMUM_ITERATIONS {
                return None;
            }
            iterations += 1;

            lambda -= correction;

            xm = 1.0 / (1.0 + lambda * inv_sq.x);
            ym = 1.0 / (1.0 + lambda * inv_sq.y);
            zm = 1.0 / (1.0 + lambda * inv_sq.z);

            let (xm2, ym2, zm2) = (xm * xm, ym * ym, zm * zm);
            let (xm3, ym3, zm3) = (xm2 * xm, ym2 * ym, zm2 * zm);

            let func = x2 * xm2 + y2 * ym2 + z2 * zm2 - 1.0;
            let denominator = x2 * xm3 * inv_sq.x + y2 * ym3 * inv_sq.y + z2 * zm3 * inv_sq.z;
            let derivative = -2.0 * denominator;
            correction = func / derivative;

            if !func.is_finite() {
                return None;
            }
            if func.abs() <= SURFACE_EPSILON {
                break;
            }
        }

        Some(Vec3::new(p.x * xm, p.y * ym, p.z * zm))
    }

    /// Convert a Cartesian position to geodetic coordinates.
    ///
    /// Returns `None` for points at the center of the ellipsoid.
    pub fn cartesian_to_cartographic(&self, p: Vec3) -> Option<Cartographic> {
        let surface = self.scale_to_geodetic_surface(p)?;
        let n = self.geodetic_surface_normal(surface);
        let h = p - surface;

        let longitude = n.y.atan2(n.x);
        let latitude = n.z.asin();
        let height = h.dot(p).signum() * h.length();

        Some(Cartographic::new(longitude, latitude, height))
    }

    /// Convert geodetic coordinates to a Cartesian position
    pub fn cartographic_to_cartesian(&self, c: &Cartographic) -> Vec3 {
        let cos_lat = c.latitude.cos();
        let n = Vec3::new(
            cos_lat * c.longitude.cos(),
            cos_lat * c.longitude.sin(),
            c.latitude.sin(),
        )
        .normalized();

        let radii_squared = self.radii.component_mul(self.radii);
        let k = radii_squared.component_mul(n);
        let gamma = n.dot(k).sqrt();
        k / gamma + n * c.height
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::WGS84
    }
}
