// SPDX-License-Identifier: MIT OR Apache-2.0
//! Value types and literals flowing through behavior graph sockets.

use serde::{Deserialize, Serialize};

/// Weak by-name reference to an object in the host document.
///
/// The graph never owns the referenced object; resolution happens at export
/// time through the host's gatherer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef(String);

impl ObjectRef {
    /// Create a reference to the named host object
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The referenced object's name
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Data type that can flow through sockets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueType {
    /// Boolean value
    Boolean,
    /// Integer value
    Integer,
    /// Floating point value
    Float,
    /// String value
    String,
    /// 3D vector
    Vec3,
    /// Euler rotation (XYZ order)
    Euler,
    /// Color (RGBA)
    Color,
    /// Entity reference
    Entity,
    /// Material reference
    Material,
    /// Texture reference
    Texture,
    /// Animation action handle
    AnimationAction,
    /// Player handle
    Player,
    /// Execution flow (carries no value)
    Flow,
    /// String-valued choice from a fixed set; choices live on the socket
    Enum,
}

impl ValueType {
    /// Canonical wire tag for this type (`valueTypeName` in the document)
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::String => "string",
            Self::Vec3 => "vec3",
            Self::Euler => "euler",
            Self::Color => "color",
            Self::Entity => "entity",
            Self::Material => "material",
            Self::Texture => "texture",
            Self::AnimationAction => "animationAction",
            Self::Player => "player",
            Self::Flow => "flow",
            Self::Enum => "enum",
        }
    }

    /// Inverse of [`ValueType::type_name`]
    pub fn from_type_name(name: &str) -> Option<Self> {
        Some(match name {
            "boolean" => Self::Boolean,
            "integer" => Self::Integer,
            "float" => Self::Float,
            "string" => Self::String,
            "vec3" => Self::Vec3,
            "euler" => Self::Euler,
            "color" => Self::Color,
            "entity" => Self::Entity,
            "material" => Self::Material,
            "texture" => Self::Texture,
            "animationAction" => Self::AnimationAction,
            "player" => Self::Player,
            "flow" => Self::Flow,
            "enum" => Self::Enum,
            _ => return None,
        })
    }

    /// Canonical default literal for this type, `None` for flow
    pub fn default_value(&self) -> Option<Value> {
        Some(match self {
            Self::Boolean => Value::Boolean(false),
            Self::Integer => Value::Integer(0),
            Self::Float => Value::Float(0.0),
            Self::String => Value::String(String::new()),
            Self::Vec3 => Value::Vec3([0.0, 0.0, 0.0]),
            Self::Euler => Value::Euler([0.0, 0.0, 0.0]),
            Self::Color => Value::Color([1.0, 1.0, 1.0, 1.0]),
            Self::Entity => Value::Entity(None),
            Self::Material => Value::Material(None),
            Self::Texture => Value::Texture(None),
            Self::AnimationAction => Value::AnimationAction(String::new()),
            Self::Player => Value::Player,
            Self::Flow => return None,
            Self::Enum => Value::Enum(String::new()),
        })
    }

    /// Whether this is the control-flow pseudo-type
    pub fn is_flow(&self) -> bool {
        matches!(self, Self::Flow)
    }

    /// Types a scope variable may be declared with
    pub fn variable_types() -> &'static [ValueType] {
        &[
            Self::Boolean,
            Self::Float,
            Self::Integer,
            Self::String,
            Self::Vec3,
            Self::AnimationAction,
            Self::Entity,
            Self::Color,
            Self::Material,
        ]
    }

    /// Types a networked-behavior property may be declared with
    pub fn networked_types() -> &'static [ValueType] {
        &[
            Self::Boolean,
            Self::Float,
            Self::Integer,
            Self::String,
            Self::Vec3,
        ]
    }
}

/// A literal value held by an unlinked socket, a variable default, or an
/// event parameter default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean
    Boolean(bool),
    /// Integer
    Integer(i64),
    /// Float
    Float(f32),
    /// String
    String(String),
    /// 3D vector
    Vec3([f32; 3]),
    /// Euler rotation
    Euler([f32; 3]),
    /// Color (RGBA)
    Color([f32; 4]),
    /// Entity reference, empty when nothing is assigned
    Entity(Option<ObjectRef>),
    /// Material reference by name
    Material(Option<String>),
    /// Texture reference by name
    Texture(Option<String>),
    /// Animation action by clip name
    AnimationAction(String),
    /// Player handle; only produced by event sockets, no literal form
    Player,
    /// Selected enum choice (internal value, not display text)
    Enum(String),
}

impl Value {
    /// The [`ValueType`] of this literal
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Boolean(_) => ValueType::Boolean,
            Self::Integer(_) => ValueType::Integer,
            Self::Float(_) => ValueType::Float,
            Self::String(_) => ValueType::String,
            Self::Vec3(_) => ValueType::Vec3,
            Self::Euler(_) => ValueType::Euler,
            Self::Color(_) => ValueType::Color,
            Self::Entity(_) => ValueType::Entity,
            Self::Material(_) => ValueType::Material,
            Self::Texture(_) => ValueType::Texture,
            Self::AnimationAction(_) => ValueType::AnimationAction,
            Self::Player => ValueType::Player,
            Self::Enum(_) => ValueType::Enum,
        }
    }

    /// Parse a catalog `defaultValue` JSON fragment as a literal of the
    /// given type. Vectors use the `{"x", "y", "z"}` object form.
    pub fn from_catalog_json(value_type: ValueType, json: &serde_json::Value) -> Option<Self> {
        let value = match value_type {
            ValueType::Boolean => Self::Boolean(json.as_bool()?),
            ValueType::Integer => Self::Integer(json.as_i64()?),
            ValueType::Float => Self::Float(json.as_f64()? as f32),
            ValueType::String => Self::String(json.as_str()?.to_owned()),
            ValueType::Vec3 => Self::Vec3(xyz_components(json)?),
            ValueType::Euler => Self::Euler(xyz_components(json)?),
            ValueType::Color => {
                let parts = json.as_array()?;
                let mut color = [0.0f32; 4];
                for (slot, part) in color.iter_mut().zip(parts) {
                    *slot = part.as_f64()? as f32;
                }
                Self::Color(color)
            }
            ValueType::Enum => Self::Enum(json.as_str()?.to_owned()),
            ValueType::AnimationAction => Self::AnimationAction(json.as_str()?.to_owned()),
            // References and flow have no catalog literal form
            ValueType::Entity
            | ValueType::Material
            | ValueType::Texture
            | ValueType::Player
            | ValueType::Flow => return None,
        };
        Some(value)
    }
}

fn xyz_components(json: &serde_json::Value) -> Option<[f32; 3]> {
    Some([
        json.get("x")?.as_f64()? as f32,
        json.get("y")?.as_f64()? as f32,
        json.get("z")?.as_f64()? as f32,
    ])
}

/// Look up the adapter node kind converting `from` into `to`.
///
/// The table is a fixed directed lookup with no transitive chaining: a link
/// is only ever repaired through a single adapter hop.
pub fn auto_cast(from: ValueType, to: ValueType) -> Option<&'static str> {
    use ValueType::*;
    Some(match (from, to) {
        (Entity, String) => "entity/toString",

        (Float, String) => "math/toString/float",
        (Boolean, String) => "math/toString/boolean",
        (Integer, String) => "math/toString/integer",
        (Vec3, String) => "math/toString/vec3",

        (String, Float) => "math/toFloat/string",
        (Boolean, Float) => "math/toFloat/boolean",
        (Integer, Float) => "math/toFloat/integer",

        (Float, Integer) => "math/toInteger/float",
        (String, Integer) => "math/toInteger/string",
        (Boolean, Integer) => "math/toInteger/boolean",

        (String, Boolean) => "math/toBoolean/string",
        (Integer, Boolean) => "math/toBoolean/integer",

        (Vec3, Euler) => "math/vec3/toEuler",
        (Euler, Vec3) => "math/euler/toVec3",

        (Vec3, Float) => "math/toFloat/vec3",
        (Float, Vec3) => "math/toVec3/float",

        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_name_roundtrip() {
        let all = [
            ValueType::Boolean,
            ValueType::Integer,
            ValueType::Float,
            ValueType::String,
            ValueType::Vec3,
            ValueType::Euler,
            ValueType::Color,
            ValueType::Entity,
            ValueType::Material,
            ValueType::Texture,
            ValueType::AnimationAction,
            ValueType::Player,
            ValueType::Flow,
            ValueType::Enum,
        ];
        for value_type in all {
            assert_eq!(
                ValueType::from_type_name(value_type.type_name()),
                Some(value_type)
            );
        }
        assert_eq!(ValueType::from_type_name("quaternion"), None);
    }

    #[test]
    fn test_defaults_match_their_type() {
        for value_type in ValueType::variable_types() {
            let default = value_type.default_value().unwrap();
            assert_eq!(default.value_type(), *value_type);
        }
        assert!(ValueType::Flow.default_value().is_none());
    }

    #[test]
    fn test_auto_cast_table() {
        assert_eq!(
            auto_cast(ValueType::Float, ValueType::String),
            Some("math/toString/float")
        );
        assert_eq!(
            auto_cast(ValueType::Entity, ValueType::String),
            Some("entity/toString")
        );
        assert_eq!(
            auto_cast(ValueType::Vec3, ValueType::Euler),
            Some("math/vec3/toEuler")
        );
        // Directed: string -> vec3 has no adapter even though vec3 -> string does
        assert_eq!(auto_cast(ValueType::String, ValueType::Vec3), None);
        // No transitive chaining: entity -> float would need two hops
        assert_eq!(auto_cast(ValueType::Entity, ValueType::Float), None);
        assert_eq!(auto_cast(ValueType::Flow, ValueType::Boolean), None);
    }

    #[test]
    fn test_catalog_literal_parsing() {
        let vec = serde_json::json!({"x": 1.0, "y": 2.0, "z": 3.0});
        assert_eq!(
            Value::from_catalog_json(ValueType::Vec3, &vec),
            Some(Value::Vec3([1.0, 2.0, 3.0]))
        );
        let flag = serde_json::json!(true);
        assert_eq!(
            Value::from_catalog_json(ValueType::Boolean, &flag),
            Some(Value::Boolean(true))
        );
        // Type mismatch is a parse failure, not a coercion
        assert_eq!(Value::from_catalog_json(ValueType::Integer, &vec), None);
    }
}
