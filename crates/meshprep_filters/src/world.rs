//! Baking the model matrix into vertex data

use meshprep_core::{names, GeometryError, GeometryInstance, Vec3};
use meshprep_math::mat4;

/// Attributes transformed as points (full affine transform)
const POINT_ATTRIBUTES: [&str; 3] = [names::POSITION, names::PREV_POSITION, names::NEXT_POSITION];

/// Attributes transformed as directions (normal matrix, then renormalized)
const DIRECTION_ATTRIBUTES: [&str; 4] = [names::NORMAL, names::TANGENT, names::BINORMAL, names::BITANGENT];

/// Transform an instance's geometry into world space.
///
/// Point attributes get the full model matrix. Direction attributes get the
/// transpose of the inverse of its linear part, which keeps normals
/// perpendicular under non-uniform scale, and are renormalized. The bounding
/// sphere center moves with the geometry; its radius is left as is, which
/// only holds for uniform scale. The model matrix is reset to the identity.
///
/// An identity model matrix is a no-op.
///
/// # Errors
/// [`GeometryError::ComponentMismatch`] if a transformed attribute is not
/// 3-component, [`GeometryError::SingularModelMatrix`] if direction
/// attributes are present and the matrix cannot be inverted.
pub fn transform_to_world_coordinates(mut instance: GeometryInstance) -> Result<GeometryInstance, GeometryError> {
    let model = instance.model_matrix;
    if mat4::is_identity(&model) {
        return Ok(instance);
    }

    let geometry = &mut instance.geometry;

    for name in POINT_ATTRIBUTES {
        if let Some(attribute) = geometry.attributes.get_mut(name) {
            attribute.expect_components(name, 3)?;
            for p in attribute.values.chunks_exact_mut(3) {
                let world = mat4::transform_point(&model, Vec3::from_slice(p, 0));
                world.write_to(p, 0);
            }
        }
    }

    if DIRECTION_ATTRIBUTES.iter().any(|name| geometry.attributes.contains_key(*name)) {
        let normal_matrix = mat4::normal_matrix(model).ok_or(GeometryError::SingularModelMatrix)?;
        for name in DIRECTION_ATTRIBUTES {
            if let Some(attribute) = geometry.attributes.get_mut(name) {
                attribute.expect_components(name, 3)?;
                for v in attribute.values.chunks_exact_mut(3) {
                    let world = mat4::transform_vector(&normal_matrix, Vec3::from_slice(v, 0)).normalized();
                    world.write_to(v, 0);
                }
            }
        }
    }

    if let Some(sphere) = geometry.bounding_sphere.as_mut() {
        *sphere = sphere.transform_center(&model);
    }

    instance.model_matrix = mat4::IDENTITY;
    Ok(instance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{approx_eq, grid};
    use meshprep_core::{Attribute, BoundingSphere, Geometry, PrimitiveType};
    use std::f64::consts::FRAC_PI_2;

    fn triangle_with_normals() -> Geometry {
        Geometry::new(PrimitiveType::Triangles)
            .with_attribute(
                names::POSITION,
                Attribute::double3(vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]),
            )
            .with_attribute(
                names::NORMAL,
                Attribute::float3(vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0]),
            )
            .with_indices(vec![0u16, 1, 2])
            .with_bounding_sphere(BoundingSphere::new(Vec3::new(0.5, 0.5, 0.0), 1.0))
    }

    #[test]
    fn test_identity_is_noop() {
        let instance = GeometryInstance::new(grid(3, 3));
        let out = transform_to_world_coordinates(instance.clone()).unwrap();
        assert_eq!(out, instance);
    }

    #[test]
    fn test_translation_moves_points_only() {
        let m = mat4::from_translation(Vec3::new(10.0, -2.0, 5.0));
        let instance = GeometryInstance::new(triangle_with_normals()).with_model_matrix(m);
        let out = transform_to_world_coordinates(instance).unwrap();

        assert!(mat4::is_identity(&out.model_matrix));
        let positions = &out.geometry.attributes[names::POSITION].values;
        assert_eq!(&positions[3..6], &[11.0, -2.0, 5.0]);
        let normals = &out.geometry.attributes[names::NORMAL].values;
        assert_eq!(&normals[0..3], &[0.0, 0.0, 1.0]);

        let sphere = out.geometry.bounding_sphere.unwrap();
        assert!(sphere.center.abs_diff_eq(Vec3::new(10.5, -1.5, 5.0), 1e-12));
        assert_eq!(sphere.radius, 1.0);
    }

    #[test]
    fn test_rotation_turns_normals() {
        // Rotate XZ plane by 90 degrees: +Z goes to +/-X
        let m = mat4::plane_rotation(FRAC_PI_2, 0, 2);
        let instance = GeometryInstance::new(triangle_with_normals()).with_model_matrix(m);
        let out = transform_to_world_coordinates(instance).unwrap();

        let normal = Vec3::from_slice(&out.geometry.attributes[names::NORMAL].values, 0);
        assert!(approx_eq(normal.length(), 1.0));
        assert!(approx_eq(normal.x.abs(), 1.0));
        assert!(approx_eq(normal.z, 0.0));
    }

    #[test]
    fn test_non_uniform_scale_keeps_normals_perpendicular() {
        // Sloped triangle; surface normal must stay perpendicular to its edges
        let positions = vec![0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let n = Vec3::new(-1.0, 0.0, 1.0).normalized();
        let normals: Vec<f64> = (0..3).flat_map(|_| n.to_array()).collect();
        let geometry = Geometry::new(PrimitiveType::Triangles)
            .with_attribute(names::POSITION, Attribute::double3(positions))
            .with_attribute(names::NORMAL, Attribute::float3(normals));

        let m = mat4::from_scale(Vec3::new(4.0, 1.0, 0.5));
        let out = transform_to_world_coordinates(GeometryInstance::new(geometry).with_model_matrix(m)).unwrap();

        let p = &out.geometry.attributes[names::POSITION].values;
        let edge = Vec3::from_slice(p, 3) - Vec3::from_slice(p, 0);
        let normal = Vec3::from_slice(&out.geometry.attributes[names::NORMAL].values, 0);
        assert!(approx_eq(normal.length(), 1.0));
        assert!(approx_eq(edge.dot(normal), 0.0));
    }

    #[test]
    fn test_inverse_restores_positions() {
        let m = mat4::mul(
            mat4::from_translation(Vec3::new(3.0, 4.0, -1.0)),
            mat4::mul(mat4::plane_rotation(0.7, 0, 1), mat4::from_scale(Vec3::new(2.0, 2.0, 2.0))),
        );
        let inv = mat4::inverse(m).unwrap();
        let original = grid(4, 4);

        let world = transform_to_world_coordinates(GeometryInstance::new(original.clone()).with_model_matrix(m)).unwrap();
        let back = transform_to_world_coordinates(world.with_model_matrix(inv)).unwrap();

        let before = &original.attributes[names::POSITION].values;
        let after = &back.geometry.attributes[names::POSITION].values;
        assert_eq!(before.len(), after.len());
        for (a, b) in before.iter().zip(after) {
            assert!(approx_eq(*a, *b), "{} != {}", a, b);
        }
    }

    #[test]
    fn test_singular_matrix_with_normals_fails() {
        let m = mat4::from_scale(Vec3::new(1.0, 1.0, 0.0));
        let instance = GeometryInstance::new(triangle_with_normals()).with_model_matrix(m);
        assert_eq!(
            transform_to_world_coordinates(instance).unwrap_err(),
            GeometryError::SingularModelMatrix
        );
    }

    #[test]
    fn test_singular_matrix_without_directions_flattens() {
        let m = mat4::from_scale(Vec3::new(1.0, 1.0, 0.0));
        let geometry = Geometry::new(PrimitiveType::Points)
            .with_attribute(names::POSITION, Attribute::double3(vec![1.0, 2.0, 3.0]));
        let out = transform_to_world_coordinates(GeometryInstance::new(geometry).with_model_matrix(m)).unwrap();
        assert_eq!(out.geometry.attributes[names::POSITION].values, vec![1.0, 2.0, 0.0]);
    }

    #[test]
    fn test_two_component_position_rejected() {
        let geometry = Geometry::new(PrimitiveType::Points)
            .with_attribute(names::POSITION, Attribute::float2(vec![1.0, 2.0]));
        let m = mat4::from_translation(Vec3::X);
        assert!(matches!(
            transform_to_world_coordinates(GeometryInstance::new(geometry).with_model_matrix(m)).unwrap_err(),
            GeometryError::ComponentMismatch { expected: 3, actual: 2, .. }
        ));
    }
}
