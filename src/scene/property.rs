//! Property model for the node inspector
//!
//! The inspector form asks a node which fields it has, reads their current
//! values and writes edits back. Every variant exposes only its own fields;
//! an edit for a field the variant does not have is rejected and the node
//! is left unchanged.

use std::fmt;

use thiserror::Error;

use crate::world::{Color, Shape, Vec3};

/// Errors from editing operations
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("node no longer exists")]
    StaleHandle,
    #[error("only groups can contain other nodes")]
    NotAGroup,
    #[error("`{key}` does not apply to {node} nodes")]
    PropertyNotApplicable { key: PropertyKey, node: &'static str },
    #[error("`{key}` expects {expected}")]
    WrongValueType { key: PropertyKey, expected: &'static str },
    #[error("nothing is selected")]
    NoSelection,
}

/// An editable field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    DisplayId,
    Position,
    Rotation,
    Scale,
    Shape,
    Material,
    Color,
    Color1,
    Radius,
    Text,
    Mode,
    StableTime,
    RespawnTime,
}

impl PropertyKey {
    pub const ALL: [PropertyKey; 13] = [
        PropertyKey::DisplayId,
        PropertyKey::Position,
        PropertyKey::Rotation,
        PropertyKey::Scale,
        PropertyKey::Shape,
        PropertyKey::Material,
        PropertyKey::Color,
        PropertyKey::Color1,
        PropertyKey::Radius,
        PropertyKey::Text,
        PropertyKey::Mode,
        PropertyKey::StableTime,
        PropertyKey::RespawnTime,
    ];

    /// Name as written in level files
    pub fn name(self) -> &'static str {
        match self {
            PropertyKey::DisplayId => "id",
            PropertyKey::Position => "position",
            PropertyKey::Rotation => "rotation",
            PropertyKey::Scale => "scale",
            PropertyKey::Shape => "shape",
            PropertyKey::Material => "material",
            PropertyKey::Color => "color",
            PropertyKey::Color1 => "color1",
            PropertyKey::Radius => "radius",
            PropertyKey::Text => "text",
            PropertyKey::Mode => "mode",
            PropertyKey::StableTime => "stableTime",
            PropertyKey::RespawnTime => "respawnTime",
        }
    }

    pub fn from_name(name: &str) -> Option<PropertyKey> {
        PropertyKey::ALL.into_iter().find(|k| k.name() == name)
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field value as the form sees it
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Text(String),
    Number(f64),
    Integer(i64),
    Vector(Vec3),
    Color(Color),
    Shape(Shape),
    /// Material code in the node's own schema table
    Material(i64),
}

impl PropertyValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            PropertyValue::Integer(i) => Some(*i),
            PropertyValue::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<Vec3> {
        match self {
            PropertyValue::Vector(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            PropertyValue::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_shape(&self) -> Option<Shape> {
        match self {
            PropertyValue::Shape(s) => Some(*s),
            PropertyValue::Integer(code) => Some(Shape::from_code(*code)),
            _ => None,
        }
    }

    pub fn as_material(&self) -> Option<i64> {
        match self {
            PropertyValue::Material(code) | PropertyValue::Integer(code) => Some(*code),
            _ => None,
        }
    }

    /// Parse user text into a value of the same variant as `self`.
    /// Vectors and colors are comma separated; a color's alpha may be omitted.
    pub fn parse_like(&self, text: &str) -> Option<PropertyValue> {
        let text = text.trim();
        let numbers = || -> Option<Vec<f64>> {
            text.split(',').map(|part| part.trim().parse::<f64>().ok()).collect()
        };
        let value = match self {
            PropertyValue::Text(_) => PropertyValue::Text(text.to_string()),
            PropertyValue::Number(_) => PropertyValue::Number(text.parse().ok()?),
            PropertyValue::Integer(_) => PropertyValue::Integer(text.parse().ok()?),
            PropertyValue::Vector(_) => match numbers()?.as_slice() {
                &[x, y, z] => PropertyValue::Vector(Vec3::new(x, y, z)),
                _ => return None,
            },
            PropertyValue::Color(_) => match numbers()?.as_slice() {
                &[r, g, b] => PropertyValue::Color(Color::rgb(r, g, b)),
                &[r, g, b, a] => PropertyValue::Color(Color::rgba(r, g, b, a)),
                _ => return None,
            },
            PropertyValue::Shape(_) => match text.parse::<i64>() {
                Ok(code) => PropertyValue::Shape(Shape::from_code(code)),
                Err(_) => PropertyValue::Shape(Shape::from_name(text)?),
            },
            PropertyValue::Material(_) => PropertyValue::Material(text.parse().ok()?),
        };
        Some(value)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Text(s) => write!(f, "{:?}", s),
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::Integer(i) => write!(f, "{}", i),
            PropertyValue::Vector(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            PropertyValue::Color(c) => write!(f, "rgba({}, {}, {}, {})", c.r, c.g, c.b, c.a),
            PropertyValue::Shape(s) => f.write_str(s.name()),
            PropertyValue::Material(code) => write!(f, "material {}", code),
        }
    }
}

/// Typed extraction for setters; wrong variants map to `WrongValueType`
pub fn expect_value<T>(
    key: PropertyKey,
    value: Option<T>,
    expected: &'static str,
) -> Result<T, EditError> {
    value.ok_or(EditError::WrongValueType { key, expected })
}

/// Field access for the inspector form
pub trait EditableNode {
    /// Display name of the node's variant, used in messages
    fn kind_name(&self) -> &'static str;

    /// Fields this variant shows, in form order
    fn properties(&self) -> Vec<PropertyKey>;

    /// Current value, or `None` if the field does not apply
    fn property(&self, key: PropertyKey) -> Option<PropertyValue>;

    /// Write a field. Keys outside [`EditableNode::properties`] are rejected
    /// with `PropertyNotApplicable` and leave the node unchanged.
    fn set_property(&mut self, key: PropertyKey, value: PropertyValue) -> Result<(), EditError>;

    fn has_property(&self, key: PropertyKey) -> bool {
        self.properties().contains(&key)
    }

    /// Error for a key the variant does not carry
    fn not_applicable(&self, key: PropertyKey) -> EditError {
        EditError::PropertyNotApplicable {
            key,
            node: self.kind_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_names_round_trip() {
        for key in PropertyKey::ALL {
            assert_eq!(PropertyKey::from_name(key.name()), Some(key));
        }
        assert_eq!(PropertyKey::from_name("stableTime"), Some(PropertyKey::StableTime));
        assert_eq!(PropertyKey::from_name("bogus"), None);
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(PropertyValue::Integer(3).as_number(), Some(3.0));
        assert_eq!(PropertyValue::Number(2.0).as_integer(), Some(2));
        assert_eq!(PropertyValue::Number(2.5).as_integer(), None);
        assert_eq!(PropertyValue::Integer(1001).as_shape(), Some(Shape::Sphere));
        assert_eq!(PropertyValue::Text("x".into()).as_number(), None);
    }

    #[test]
    fn test_parse_like_keeps_variant() {
        let vector = PropertyValue::Vector(Vec3::ZERO);
        assert_eq!(
            vector.parse_like("1, 2.5,-3"),
            Some(PropertyValue::Vector(Vec3::new(1.0, 2.5, -3.0)))
        );
        assert_eq!(vector.parse_like("1,2"), None);

        let color = PropertyValue::Color(Color::WHITE);
        assert_eq!(color.parse_like("1,0,0"), Some(PropertyValue::Color(Color::rgb(1.0, 0.0, 0.0))));

        let shape = PropertyValue::Shape(Shape::Cube);
        assert_eq!(shape.parse_like("sphere"), Some(PropertyValue::Shape(Shape::Sphere)));
        assert_eq!(shape.parse_like("1002"), Some(PropertyValue::Shape(Shape::Cylinder)));
        assert_eq!(shape.parse_like("blob"), None);

        assert_eq!(PropertyValue::Number(0.0).parse_like("x"), None);
        assert_eq!(
            PropertyValue::Text(String::new()).parse_like(" hi "),
            Some(PropertyValue::Text("hi".into()))
        );
    }

    #[test]
    fn test_error_messages_name_the_field() {
        let err = EditError::PropertyNotApplicable {
            key: PropertyKey::Text,
            node: "static",
        };
        assert_eq!(err.to_string(), "`text` does not apply to static nodes");
    }
}
