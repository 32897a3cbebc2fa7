//! Flattening geodetic positions onto a 2D map

use meshprep_core::{names, Attribute, ComponentDatatype, Geometry, GeometryError, Vec3};
use meshprep_math::{GeographicProjection, MapProjection};

/// Project `position` to 2D with the default geographic projection on WGS84.
///
/// See [`project_to_2d_with`].
pub fn project_to_2d(geometry: Geometry) -> Result<Geometry, GeometryError> {
    project_to_2d_with(geometry, &GeographicProjection::default())
}

/// Project Cartesian `position` values onto a 2D map.
///
/// Each position is converted to longitude, latitude and height on the
/// projection's ellipsoid and projected. The result is stored as a
/// 2-component DOUBLE `position2D` attribute and the original positions are
/// kept under `position3D`. Geometries without a `position` are returned
/// unchanged.
///
/// # Errors
/// [`GeometryError::ComponentMismatch`] if `position` is not 3-component and
/// [`GeometryError::ProjectionFailed`] for a point at the ellipsoid center or
/// with a non-finite coordinate.
pub fn project_to_2d_with<P>(mut geometry: Geometry, projection: &P) -> Result<Geometry, GeometryError>
where
    P: MapProjection + ?Sized,
{
    let Some(positions) = geometry.attribute(names::POSITION) else {
        return Ok(geometry);
    };
    positions.expect_components(names::POSITION, 3)?;

    let ellipsoid = projection.ellipsoid();
    let mut projected = Vec::with_capacity(positions.vertex_count() * 2);
    for p in positions.values.chunks_exact(3) {
        let cartesian = Vec3::from_slice(p, 0);
        let cartographic = ellipsoid
            .cartesian_to_cartographic(cartesian)
            .ok_or(GeometryError::ProjectionFailed(cartesian.to_array()))?;
        let map = projection.project(&cartographic);
        projected.extend_from_slice(&[map.x, map.y]);
    }

    if let Some(positions) = geometry.attributes.shift_remove(names::POSITION) {
        geometry.attributes.insert(names::POSITION_3D.to_string(), positions);
    }
    geometry.attributes.insert(
        names::POSITION_2D.to_string(),
        Attribute::new(ComponentDatatype::Double, 2, projected),
    );
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshprep_core::PrimitiveType;
    use meshprep_math::{Cartographic, Ellipsoid, WebMercatorProjection};

    // Millimeters; geodetic conversion iterates to a finite tolerance
    const TOLERANCE: f64 = 1e-3;

    fn points(cartographics: &[Cartographic]) -> Geometry {
        let values = cartographics
            .iter()
            .flat_map(|c| Ellipsoid::WGS84.cartographic_to_cartesian(c).to_array())
            .collect();
        Geometry::new(PrimitiveType::Points).with_attribute(names::POSITION, Attribute::double3(values))
    }

    #[test]
    fn test_geographic_projection() {
        let g = points(&[
            Cartographic::new(0.0, 0.0, 0.0),
            Cartographic::new(0.5, -0.25, 100.0),
        ]);
        let g = project_to_2d(g).unwrap();

        assert!(g.attribute(names::POSITION).is_none());
        assert_eq!(g.attributes[names::POSITION_3D].components_per_attribute, 3);

        let projected = &g.attributes[names::POSITION_2D];
        assert_eq!(projected.component_datatype, ComponentDatatype::Double);
        assert_eq!(projected.components_per_attribute, 2);
        assert_eq!(projected.vertex_count(), 2);

        let a = Ellipsoid::WGS84.maximum_radius();
        let v = &projected.values;
        assert!(v[0].abs() < TOLERANCE && v[1].abs() < TOLERANCE);
        assert!((v[2] - 0.5 * a).abs() < TOLERANCE);
        assert!((v[3] + 0.25 * a).abs() < TOLERANCE);
    }

    #[test]
    fn test_custom_projection() {
        let g = points(&[Cartographic::new(0.1, 0.6, 0.0)]);
        let projection = WebMercatorProjection::default();
        let g = project_to_2d_with(g, &projection).unwrap();

        let a = Ellipsoid::WGS84.maximum_radius();
        let expected_y = WebMercatorProjection::latitude_to_mercator_angle(0.6) * a;
        let v = &g.attributes[names::POSITION_2D].values;
        assert!((v[0] - 0.1 * a).abs() < TOLERANCE);
        assert!((v[1] - expected_y).abs() < TOLERANCE);
    }

    #[test]
    fn test_center_fails() {
        let g = Geometry::new(PrimitiveType::Points)
            .with_attribute(names::POSITION, Attribute::double3(vec![0.0, 0.0, 0.0]));
        assert_eq!(
            project_to_2d(g).unwrap_err(),
            GeometryError::ProjectionFailed([0.0, 0.0, 0.0])
        );
    }

    #[test]
    fn test_non_finite_positions_fail() {
        for point in [[f64::NAN, 6378137.0, 0.0], [f64::INFINITY, 0.0, 0.0]] {
            let g = Geometry::new(PrimitiveType::Points)
                .with_attribute(names::POSITION, Attribute::double3(point.to_vec()));
            match project_to_2d(g).unwrap_err() {
                GeometryError::ProjectionFailed(p) => {
                    assert_eq!(p[1], point[1]);
                    assert_eq!(p[0].is_nan(), point[0].is_nan());
                }
                other => panic!("unexpected error: {}", other),
            }
        }
    }

    #[test]
    fn test_without_position_unchanged() {
        let g = Geometry::new(PrimitiveType::Points)
            .with_attribute(names::ST, Attribute::float2(vec![0.0, 1.0]));
        assert_eq!(project_to_2d(g.clone()).unwrap(), g);
    }
}
