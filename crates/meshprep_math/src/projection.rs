//! Map projections from geodetic coordinates to a flat 2D map

use crate::{Cartographic, Ellipsoid, Vec3};

/// Latitude beyond which Web Mercator is clamped (≈85.05°)
const MAXIMUM_MERCATOR_LATITUDE: f64 = 1.4844222297453324;

/// A projection from geodetic coordinates to map coordinates.
///
/// `project` returns map x/y in meters with the height passed through in z.
pub trait MapProjection {
    /// Ellipsoid the projection is defined on
    fn ellipsoid(&self) -> &Ellipsoid;

    /// Project geodetic coordinates to map coordinates
    fn project(&self, cartographic: &Cartographic) -> Vec3;
}

/// Equirectangular projection: longitude and latitude scaled by the
/// semimajor axis
#[derive(Clone, Copy, Debug, Default)]
pub struct GeographicProjection {
    ellipsoid: Ellipsoid,
}

impl GeographicProjection {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }
}

impl MapProjection for GeographicProjection {
    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    fn project(&self, c: &Cartographic) -> Vec3 {
        let semimajor = self.ellipsoid.maximum_radius();
        Vec3::new(c.longitude * semimajor, c.latitude * semimajor, c.height)
    }
}

/// Spherical (Web) Mercator projection
#[derive(Clone, Copy, Debug, Default)]
pub struct WebMercatorProjection {
    ellipsoid: Ellipsoid,
}

impl WebMercatorProjection {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }

    /// Mercator angle for a geodetic latitude, clamped to the valid range
    pub fn latitude_to_mercator_angle(latitude: f64) -> f64 {
        let lat = latitude.clamp(-MAXIMUM_MERCATOR_LATITUDE, MAXIMUM_MERCATOR_LATITUDE);
        let sin_lat = lat.sin();
        0.5 * ((1.0 + sin_lat) / (1.0 - sin_lat)).ln()
    }
}

impl MapProjection for WebMercatorProjection {
    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    fn project(&self, c: &Cartographic) -> Vec3 {
        let semimajor = self.ellipsoid.maximum_radius();
        Vec3::new(
            c.longitude * semimajor,
            Self::latitude_to_mercator_angle(c.latitude) * semimajor,
            c.height,
        )
    }
}
