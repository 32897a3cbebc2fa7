//! Merging instances into a single geometry

use meshprep_core::{AttributeMap, Geometry, GeometryError, GeometryInstance, Indices};

/// Index count from which merged buffers use 32-bit indices
const MAXIMUM_SHORT_INDEX_COUNT: usize = 61_440;

/// Merge instances that share a model matrix into one geometry.
///
/// Only attributes present in every instance with the same datatype,
/// component count and normalization survive; their values are concatenated
/// in input order. Indices are concatenated with each instance's indices
/// offset by the vertices of the instances before it. The bounding sphere is
/// the union of all instance spheres, or absent if any instance has none.
///
/// A single instance returns its geometry unchanged.
///
/// # Errors
/// [`GeometryError::EmptyInstanceList`] for no input, and
/// [`GeometryError::MismatchedModelMatrix`],
/// [`GeometryError::MismatchedPrimitiveType`] or
/// [`GeometryError::MismatchedIndices`] naming the first instance that
/// disagrees with instance 0. Invalid input geometries fail validation.
pub fn combine_instances(mut instances: Vec<GeometryInstance>) -> Result<Geometry, GeometryError> {
    let Some(first) = instances.first() else {
        return Err(GeometryError::EmptyInstanceList);
    };
    let primitive_type = first.geometry.primitive_type;

    for (i, instance) in instances.iter().enumerate().skip(1) {
        if instance.model_matrix != first.model_matrix {
            return Err(GeometryError::MismatchedModelMatrix { instance: i });
        }
        if instance.geometry.primitive_type != primitive_type {
            return Err(GeometryError::MismatchedPrimitiveType { instance: i });
        }
        if instance.geometry.indices.is_some() != first.geometry.indices.is_some() {
            return Err(GeometryError::MismatchedIndices { instance: i });
        }
    }

    if instances.len() == 1 {
        return Ok(instances.remove(0).geometry);
    }

    let vertex_counts = instances
        .iter()
        .map(|instance| instance.geometry.validate())
        .collect::<Result<Vec<_>, _>>()?;
    let total_vertices: usize = vertex_counts.iter().sum();

    let attributes = combine_attributes(&instances, total_vertices);
    let indices = combine_indices(&instances, &vertex_counts, total_vertices);

    let bounding_sphere = instances
        .iter()
        .map(|instance| instance.geometry.bounding_sphere)
        .reduce(|a, b| Some(a?.union(&b?)))
        .flatten();

    log::debug!(
        "Combined {} instances into {} vertices, {} attributes kept",
        instances.len(),
        total_vertices,
        attributes.len()
    );

    Ok(Geometry {
        attributes,
        indices,
        primitive_type,
        bounding_sphere,
    })
}

/// Attributes shared by every instance with a compatible layout, concatenated
fn combine_attributes(instances: &[GeometryInstance], total_vertices: usize) -> AttributeMap {
    let (first, rest) = match instances.split_first() {
        Some(split) => split,
        None => return AttributeMap::new(),
    };

    let mut attributes = AttributeMap::new();
    for (name, attribute) in &first.geometry.attributes {
        let compatible = rest.iter().all(|instance| {
            instance
                .geometry
                .attribute(name)
                .is_some_and(|other| other.layout_matches(attribute))
        });
        if !compatible {
            log::debug!("Dropping attribute '{}' not shared by every instance", name);
            continue;
        }

        let mut merged = attribute.empty_like(total_vertices);
        for instance in instances {
            if let Some(source) = instance.geometry.attribute(name) {
                merged.values.extend_from_slice(&source.values);
            }
        }
        attributes.insert(name.clone(), merged);
    }
    attributes
}

/// Concatenated, offset indices, or `None` for non-indexed input
fn combine_indices(instances: &[GeometryInstance], vertex_counts: &[usize], total_vertices: usize) -> Option<Indices> {
    let total_indices: usize = instances.iter().map(|instance| instance.geometry.index_count()).sum();
    let mut merged = Vec::with_capacity(total_indices);
    let mut offset = 0u32;
    for (instance, &vertex_count) in instances.iter().zip(vertex_counts) {
        let indices = instance.geometry.indices.as_ref()?;
        merged.extend(indices.iter().map(|i| i + offset));
        offset += vertex_count as u32;
    }

    if total_indices < MAXIMUM_SHORT_INDEX_COUNT && total_vertices <= Indices::SIXTY_FOUR_KILOBYTES {
        Some(Indices::U16(merged.into_iter().map(|i| i as u16).collect()))
    } else {
        Some(Indices::U32(merged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{approx_eq, grid};
    use meshprep_core::{names, Attribute, BoundingSphere, ComponentDatatype, PrimitiveType, Vec3};
    use meshprep_math::mat4;

    fn triangle(offset: f64) -> Geometry {
        Geometry::new(PrimitiveType::Triangles)
            .with_attribute(
                names::POSITION,
                Attribute::double3(vec![offset, 0.0, 0.0, offset + 1.0, 0.0, 0.0, offset, 1.0, 0.0]),
            )
            .with_indices(vec![0u16, 1, 2])
    }

    #[test]
    fn test_empty_list_fails() {
        assert_eq!(combine_instances(Vec::new()).unwrap_err(), GeometryError::EmptyInstanceList);
    }

    #[test]
    fn test_single_instance_unchanged() {
        let g = grid(2, 2);
        assert_eq!(combine_instances(vec![GeometryInstance::new(g.clone())]).unwrap(), g);
    }

    #[test]
    fn test_offsets_indices() {
        let a = grid(2, 1); // 6 vertices
        let b = grid(1, 1); // 4 vertices
        let merged = combine_instances(vec![a.clone().into(), b.clone().into()]).unwrap();

        assert_eq!(merged.validate().unwrap(), 10);
        assert_eq!(merged.attributes[names::POSITION].values.len(), 30);
        assert_eq!(merged.attributes[names::ST].values.len(), 20);

        let indices = merged.indices.unwrap().to_u32_vec();
        let a_count = a.index_count();
        assert_eq!(&indices[..a_count], a.indices.unwrap().to_u32_vec().as_slice());
        let shifted: Vec<u32> = b.indices.unwrap().iter().map(|i| i + 6).collect();
        assert_eq!(&indices[a_count..], shifted.as_slice());
        assert!(indices[a_count..].iter().all(|&i| i >= 6));
    }

    #[test]
    fn test_drops_unshared_attributes() {
        let a = triangle(0.0)
            .with_attribute(names::NORMAL, Attribute::float3(vec![0.0; 9]))
            .with_attribute(names::COLOR, Attribute::new(ComponentDatatype::UnsignedByte, 4, vec![255.0; 12]));
        let b = triangle(5.0)
            .with_attribute(names::COLOR, Attribute::new(ComponentDatatype::UnsignedByte, 4, vec![0.0; 12]).normalized());

        let merged = combine_instances(vec![a.into(), b.into()]).unwrap();
        let kept: Vec<&str> = merged.attributes.keys().map(String::as_str).collect();
        assert_eq!(kept, vec![names::POSITION]);
        assert_eq!(merged.validate().unwrap(), 6);
    }

    #[test]
    fn test_mismatched_model_matrix() {
        let a = GeometryInstance::new(triangle(0.0));
        let b = GeometryInstance::new(triangle(1.0)).with_model_matrix(mat4::from_translation(Vec3::X));
        assert_eq!(
            combine_instances(vec![a, b]).unwrap_err(),
            GeometryError::MismatchedModelMatrix { instance: 1 }
        );
    }

    #[test]
    fn test_mismatched_primitive_type() {
        let mut lines = triangle(1.0);
        lines.primitive_type = PrimitiveType::Lines;
        assert_eq!(
            combine_instances(vec![triangle(0.0).into(), lines.into()]).unwrap_err(),
            GeometryError::MismatchedPrimitiveType { instance: 1 }
        );
    }

    #[test]
    fn test_mismatched_indices() {
        let mut unindexed = triangle(1.0);
        unindexed.indices = None;
        assert_eq!(
            combine_instances(vec![triangle(0.0).into(), triangle(2.0).into(), unindexed.into()]).unwrap_err(),
            GeometryError::MismatchedIndices { instance: 2 }
        );
    }

    #[test]
    fn test_bounding_spheres() {
        let a = triangle(0.0).with_bounding_sphere(BoundingSphere::new(Vec3::ZERO, 1.0));
        let b = triangle(4.0).with_bounding_sphere(BoundingSphere::new(Vec3::new(4.0, 0.0, 0.0), 1.0));
        let merged = combine_instances(vec![a.clone().into(), b.into()]).unwrap();
        let sphere = merged.bounding_sphere.unwrap();
        assert!(approx_eq(sphere.radius, 3.0));
        assert!(sphere.center.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-12));

        let merged = combine_instances(vec![a.into(), triangle(4.0).into()]).unwrap();
        assert!(merged.bounding_sphere.is_none());
    }

    #[test]
    fn test_wide_merge_uses_u32() {
        // 21600 indices each; three of them cross 61440
        let parts: Vec<GeometryInstance> = (0..3).map(|_| grid(60, 60).into()).collect();
        let merged = combine_instances(parts).unwrap();
        assert!(matches!(merged.indices, Some(Indices::U32(_))));
        assert_eq!(merged.index_count(), 3 * 6 * 60 * 60);
        merged.validate().unwrap();
    }

    #[test]
    fn test_narrow_merge_uses_u16() {
        let merged = combine_instances(vec![grid(3, 3).into(), grid(3, 3).into()]).unwrap();
        assert!(matches!(merged.indices, Some(Indices::U16(_))));
    }

    #[test]
    fn test_unindexed_merge() {
        let g = Geometry::new(PrimitiveType::Points)
            .with_attribute(names::POSITION, Attribute::double3(vec![1.0, 2.0, 3.0]));
        let merged = combine_instances(vec![g.clone().into(), g.into()]).unwrap();
        assert!(merged.indices.is_none());
        assert_eq!(merged.attributes[names::POSITION].values, vec![1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
    }
}
