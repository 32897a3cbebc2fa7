//! Vertex attributes
//!
//! An [`Attribute`] is one named per-vertex channel stored as a flat value
//! buffer. Values are held as `f64` regardless of the declared
//! [`ComponentDatatype`]; the datatype describes how the channel is encoded
//! when it reaches a GPU buffer.

use indexmap::IndexMap;
use serde::{Serialize, Deserialize};

use crate::error::GeometryError;

/// Well-known attribute names
pub mod names {
    pub const POSITION: &str = "position";
    pub const PREV_POSITION: &str = "prevPosition";
    pub const NEXT_POSITION: &str = "nextPosition";
    pub const POSITION_3D: &str = "position3D";
    pub const POSITION_2D: &str = "position2D";
    pub const NORMAL: &str = "normal";
    pub const TANGENT: &str = "tangent";
    pub const BINORMAL: &str = "binormal";
    pub const BITANGENT: &str = "bitangent";
    pub const ST: &str = "st";
    pub const COLOR: &str = "color";
    pub const PICK_COLOR: &str = "pickColor";
}

/// Attributes keyed by name, iterated in insertion order
pub type AttributeMap = IndexMap<String, Attribute>;

/// Numeric type of an attribute's components
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComponentDatatype {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    Int,
    UnsignedInt,
    Float,
    Double,
}

impl ComponentDatatype {
    /// Size of one component in bytes
    pub fn size_in_bytes(&self) -> usize {
        match self {
            Self::Byte | Self::UnsignedByte => 1,
            Self::Short | Self::UnsignedShort => 2,
            Self::Int | Self::UnsignedInt | Self::Float => 4,
            Self::Double => 8,
        }
    }

    /// Whether the datatype holds floating-point values
    pub fn is_floating_point(&self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }
}

/// One named per-vertex data channel
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// How each component is encoded
    pub component_datatype: ComponentDatatype,
    /// Components per vertex (1 to 4)
    pub components_per_attribute: usize,
    /// Whether integer components are normalized to [0, 1] / [-1, 1] on read
    #[serde(default)]
    pub normalize: bool,
    /// Flat values, `components_per_attribute` per vertex
    pub values: Vec<f64>,
}

impl Attribute {
    /// Create a new attribute
    pub fn new(component_datatype: ComponentDatatype, components_per_attribute: usize, values: Vec<f64>) -> Self {
        Self {
            component_datatype,
            components_per_attribute,
            normalize: false,
            values,
        }
    }

    /// 3-component double attribute (positions)
    pub fn double3(values: Vec<f64>) -> Self {
        Self::new(ComponentDatatype::Double, 3, values)
    }

    /// 3-component float attribute (normals, tangents)
    pub fn float3(values: Vec<f64>) -> Self {
        Self::new(ComponentDatatype::Float, 3, values)
    }

    /// 2-component float attribute (texture coordinates)
    pub fn float2(values: Vec<f64>) -> Self {
        Self::new(ComponentDatatype::Float, 2, values)
    }

    /// Mark integer components as normalized
    pub fn normalized(mut self) -> Self {
        self.normalize = true;
        self
    }

    /// Empty attribute with the same layout, sized for `vertex_capacity` vertices
    pub fn empty_like(&self, vertex_capacity: usize) -> Self {
        Self {
            component_datatype: self.component_datatype,
            components_per_attribute: self.components_per_attribute,
            normalize: self.normalize,
            values: Vec::with_capacity(vertex_capacity * self.components_per_attribute),
        }
    }

    /// Number of vertices described by the values
    #[inline]
    pub fn vertex_count(&self) -> usize {
        if self.components_per_attribute == 0 {
            0
        } else {
            self.values.len() / self.components_per_attribute
        }
    }

    /// Components of one vertex
    #[inline]
    pub fn vertex(&self, index: usize) -> &[f64] {
        let n = self.components_per_attribute;
        &self.values[index * n..(index + 1) * n]
    }

    /// Append one vertex's components copied from another attribute
    #[inline]
    pub fn push_vertex_from(&mut self, source: &Attribute, index: usize) {
        self.values.extend_from_slice(source.vertex(index));
    }

    /// Whether two attributes can share one buffer
    pub fn layout_matches(&self, other: &Attribute) -> bool {
        self.component_datatype == other.component_datatype
            && self.components_per_attribute == other.components_per_attribute
            && self.normalize == other.normalize
    }

    /// Check the length invariant: values hold whole vertices
    pub fn validate(&self, name: &str) -> Result<(), GeometryError> {
        if self.components_per_attribute == 0 || self.values.len() % self.components_per_attribute != 0 {
            return Err(GeometryError::InvalidValueLength {
                name: name.to_string(),
                length: self.values.len(),
                components: self.components_per_attribute,
            });
        }
        Ok(())
    }

    /// Check that this attribute has `expected` components and whole vertices
    pub fn expect_components(&self, name: &str, expected: usize) -> Result<(), GeometryError> {
        if self.components_per_attribute != expected {
            return Err(GeometryError::ComponentMismatch {
                name: name.to_string(),
                expected,
                actual: self.components_per_attribute,
            });
        }
        self.validate(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_access() {
        let a = Attribute::float2(vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(a.vertex_count(), 3);
        assert_eq!(a.vertex(1), &[2.0, 3.0]);
    }

    #[test]
    fn test_push_vertex_from() {
        let source = Attribute::double3(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let mut target = source.empty_like(1);
        target.push_vertex_from(&source, 1);
        assert_eq!(target.values, vec![4.0, 5.0, 6.0]);
        assert!(target.layout_matches(&source));
    }

    #[test]
    fn test_layout_matches() {
        let a = Attribute::float3(vec![]);
        assert!(!a.layout_matches(&Attribute::double3(vec![])));
        assert!(!a.layout_matches(&Attribute::float2(vec![])));
        assert!(!a.layout_matches(&Attribute::float3(vec![]).normalized()));
        assert!(a.layout_matches(&Attribute::float3(vec![1.0, 2.0, 3.0])));
    }

    #[test]
    fn test_validate_length() {
        assert!(Attribute::float3(vec![0.0; 6]).validate("normal").is_ok());
        let err = Attribute::float3(vec![0.0; 5]).validate("normal").unwrap_err();
        assert_eq!(
            err,
            GeometryError::InvalidValueLength {
                name: "normal".to_string(),
                length: 5,
                components: 3
            }
        );
    }

    #[test]
    fn test_expect_components() {
        let err = Attribute::float2(vec![0.0; 4]).expect_components("position", 3).unwrap_err();
        assert!(matches!(err, GeometryError::ComponentMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn test_datatype() {
        assert!(ComponentDatatype::Float.is_floating_point());
        assert!(ComponentDatatype::Double.is_floating_point());
        assert!(!ComponentDatatype::UnsignedShort.is_floating_point());
        assert_eq!(ComponentDatatype::Double.size_in_bytes(), 8);
    }
}
