//! Extended-precision attribute encoding

use meshprep_core::{Attribute, ComponentDatatype, Geometry, GeometryError};
use meshprep_math::encode_double;

/// Split a floating-point attribute into `<name>High` and `<name>Low`.
///
/// See [`encode_attribute_with_names`].
pub fn encode_attribute(geometry: Geometry, name: &str) -> Result<Geometry, GeometryError> {
    let high = format!("{}High", name);
    let low = format!("{}Low", name);
    encode_attribute_with_names(geometry, name, &high, &low)
}

/// Split a floating-point attribute into high and low single-precision parts.
///
/// Every component is split with [`encode_double`]: the high part lies on a
/// 65536 grid and the low part holds the remainder, both stored as FLOAT.
/// The original attribute is removed and the two parts are appended under
/// `high_name` and `low_name`.
///
/// # Errors
/// [`GeometryError::MissingAttribute`] if `name` is absent,
/// [`GeometryError::NotFloatingPoint`] if it holds integers.
pub fn encode_attribute_with_names(
    mut geometry: Geometry,
    name: &str,
    high_name: &str,
    low_name: &str,
) -> Result<Geometry, GeometryError> {
    let attribute = geometry.require_attribute(name)?;
    if !attribute.component_datatype.is_floating_point() {
        return Err(GeometryError::NotFloatingPoint {
            name: name.to_string(),
            datatype: attribute.component_datatype,
        });
    }
    attribute.validate(name)?;

    let Some(attribute) = geometry.attributes.shift_remove(name) else {
        return Err(GeometryError::MissingAttribute(name.to_string()));
    };

    let components = attribute.components_per_attribute;
    let mut high = Vec::with_capacity(attribute.values.len());
    let mut low = Vec::with_capacity(attribute.values.len());
    for value in attribute.values {
        let encoded = encode_double(value);
        high.push(f64::from(encoded.high));
        low.push(f64::from(encoded.low));
    }

    geometry
        .attributes
        .insert(high_name.to_string(), Attribute::new(ComponentDatatype::Float, components, high));
    geometry
        .attributes
        .insert(low_name.to_string(), Attribute::new(ComponentDatatype::Float, components, low));
    Ok(geometry)
}
