// SPDX-License-Identifier: MIT OR Apache-2.0
//! Collaborator interfaces and per-type value resolution.
//!
//! The export pipeline never owns host objects, materials, or textures; it
//! resolves them to document indices through the [`DocumentGatherer`] the
//! outer exporter supplies, and pushes replication requirements back through
//! the same seam.

use behavekit_graph::scope::Scope;
use behavekit_graph::socket::{EntityRole, Socket};
use behavekit_graph::value::{ObjectRef, Value, ValueType};
use serde::{Deserialize, Serialize};

/// Axis convention applied to authored vectors at export time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxisConvention {
    /// Swizzle authored Z-up values into the document's Y-up space
    #[default]
    YUp,
    /// Export components unchanged
    ZUp,
}

/// Settings for one export pass
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Vector axis convention
    pub axis_convention: AxisConvention,
}

/// What kind of scope is currently being serialized. Entity-role resolution
/// distinguishes scene-level from object-level graphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportPhase {
    /// No export running
    #[default]
    Idle,
    /// Serializing a scene-scope graph
    Scene,
    /// Serializing an object-scope graph
    Object,
}

/// Target of a replication requirement
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkTarget {
    /// An object must carry the replication component
    Object(ObjectRef),
    /// A material must carry the replication component
    Material(String),
}

/// Error while resolving a reference during export
#[derive(Debug, thiserror::Error)]
pub enum GatherError {
    /// Referenced object is gone from the document
    #[error("object `{0}` not found in the export document")]
    ObjectNotFound(String),

    /// Referenced material is gone from the document
    #[error("material `{0}` not found in the export document")]
    MaterialNotFound(String),

    /// Referenced texture is gone from the document
    #[error("texture `{0}` not found in the export document")]
    TextureNotFound(String),

    /// A required reference was left unassigned
    #[error("empty {0} reference")]
    EmptyReference(&'static str),

    /// `self` only resolves inside object-scope graphs
    #[error("self entity reference is not available in a scene graph")]
    SelfInSceneGraph,
}

/// The seam to the outer document exporter.
///
/// `gather_*` calls return document indices; `register_network_dependency`
/// is a one-way push that must land before the host finalizes its document.
pub trait DocumentGatherer {
    /// Resolve an object reference to its document node index
    fn gather_object_property(&mut self, object: &ObjectRef) -> Result<u32, GatherError>;

    /// Resolve a material name to its document material index
    fn gather_material_property(&mut self, material: &str) -> Result<u32, GatherError>;

    /// Resolve a texture name to its document texture index
    fn gather_texture_property(&mut self, texture: &str) -> Result<u32, GatherError>;

    /// Require a replication component on the target, merged with the given
    /// field patch
    fn register_network_dependency(
        &mut self,
        target: NetworkTarget,
        component: &str,
        patch: serde_json::Value,
    );
}

/// Context for resolving one socket during serialization
pub struct ValueContext<'a> {
    /// Export settings
    pub settings: &'a ExportSettings,
    /// Scene-or-object marker for the graph being serialized
    pub phase: ExportPhase,
    /// The scope owning the graph being serialized
    pub scope: &'a Scope,
    /// Name of the scene scope, for scene-role entity resolution
    pub scene_name: &'a str,
}

/// Apply the configured axis convention to an authored vector
pub fn apply_axis_convention(settings: &ExportSettings, [x, y, z]: [f32; 3]) -> [f32; 3] {
    match settings.axis_convention {
        AxisConvention::YUp => [x, z, -y],
        AxisConvention::ZUp => [x, y, z],
    }
}

fn vector_json(settings: &ExportSettings, components: [f32; 3]) -> serde_json::Value {
    let [x, y, z] = apply_axis_convention(settings, components);
    serde_json::json!({ "x": x, "y": y, "z": z })
}

/// Resolve a literal to its wire form. Reference values resolve through the
/// gatherer; an empty reference is an error at this level.
pub fn gather_value(
    value: &Value,
    settings: &ExportSettings,
    gatherer: &mut dyn DocumentGatherer,
) -> Result<serde_json::Value, GatherError> {
    let json = match value {
        Value::Boolean(v) => serde_json::json!(v),
        Value::Integer(v) => serde_json::json!(v),
        Value::Float(v) => serde_json::json!(v),
        Value::String(v) => serde_json::json!(v),
        Value::Enum(v) => serde_json::json!(v),
        Value::AnimationAction(v) => serde_json::json!(v),
        Value::Vec3(v) | Value::Euler(v) => vector_json(settings, *v),
        Value::Color(v) => serde_json::json!(v),
        Value::Entity(Some(object)) => {
            serde_json::json!(gatherer.gather_object_property(object)?)
        }
        Value::Entity(None) => return Err(GatherError::EmptyReference("entity")),
        Value::Material(Some(material)) => {
            serde_json::json!(gatherer.gather_material_property(material)?)
        }
        Value::Material(None) => return Err(GatherError::EmptyReference("material")),
        Value::Texture(Some(texture)) => {
            serde_json::json!(gatherer.gather_texture_property(texture)?)
        }
        Value::Texture(None) => return Err(GatherError::EmptyReference("texture")),
        Value::Player => serde_json::Value::Null,
    };
    Ok(json)
}

/// Resolve a variable or event-parameter default. Unlike socket values an
/// unassigned reference default is legal and exports as null; a dangling one
/// is still an error.
pub fn gather_variable_value(
    value: &Value,
    settings: &ExportSettings,
    gatherer: &mut dyn DocumentGatherer,
) -> Result<serde_json::Value, GatherError> {
    match value {
        Value::Entity(None) | Value::Material(None) | Value::Texture(None) => {
            Ok(serde_json::Value::Null)
        }
        other => gather_value(other, settings, gatherer),
    }
}

/// Resolve the object an entity socket refers to, honoring its role
pub fn resolve_entity_ref(socket: &Socket, ctx: &ValueContext) -> Result<ObjectRef, GatherError> {
    match socket.entity_role {
        EntityRole::SelfRef => match ctx.phase {
            ExportPhase::Object => ctx
                .scope
                .object_ref()
                .cloned()
                .ok_or(GatherError::SelfInSceneGraph),
            ExportPhase::Scene | ExportPhase::Idle => Err(GatherError::SelfInSceneGraph),
        },
        EntityRole::Scene => Ok(ObjectRef::new(ctx.scene_name)),
        EntityRole::GraphLocal => Ok(ctx
            .scope
            .object_ref()
            .cloned()
            .unwrap_or_else(|| ObjectRef::new(ctx.scene_name))),
        EntityRole::Other | EntityRole::Unset => socket
            .target
            .clone()
            .ok_or(GatherError::EmptyReference("entity")),
    }
}

/// Resolve an unlinked input socket to its wire value.
///
/// Returns `Ok(None)` for sockets with no literal form (players, animation
/// actions); those simply emit no parameter entry.
pub fn gather_socket_value(
    socket: &Socket,
    ctx: &ValueContext,
    gatherer: &mut dyn DocumentGatherer,
) -> Result<Option<serde_json::Value>, GatherError> {
    match socket.value_type {
        ValueType::Entity => {
            let object = resolve_entity_ref(socket, ctx)?;
            Ok(Some(serde_json::json!(
                gatherer.gather_object_property(&object)?
            )))
        }
        ValueType::Player | ValueType::AnimationAction | ValueType::Flow => Ok(None),
        _ => match &socket.default {
            Some(value) => gather_value(value, ctx.settings, gatherer).map(Some),
            None => Ok(None),
        },
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;

    /// Minimal host-exporter stand-in: documents are flat name lists and an
    /// index is a position in the list.
    pub(crate) struct StubGatherer {
        pub objects: Vec<String>,
        pub materials: Vec<String>,
        pub textures: Vec<String>,
        pub dependencies: Vec<(NetworkTarget, String, serde_json::Value)>,
    }

    impl StubGatherer {
        pub fn new(objects: &[&str]) -> Self {
            Self {
                objects: objects.iter().map(|s| (*s).to_string()).collect(),
                materials: Vec::new(),
                textures: Vec::new(),
                dependencies: Vec::new(),
            }
        }

        pub fn with_materials(mut self, materials: &[&str]) -> Self {
            self.materials = materials.iter().map(|s| (*s).to_string()).collect();
            self
        }
    }

    impl DocumentGatherer for StubGatherer {
        fn gather_object_property(&mut self, object: &ObjectRef) -> Result<u32, GatherError> {
            self.objects
                .iter()
                .position(|name| name == object.name())
                .map(|index| index as u32)
                .ok_or_else(|| GatherError::ObjectNotFound(object.name().to_string()))
        }

        fn gather_material_property(&mut self, material: &str) -> Result<u32, GatherError> {
            self.materials
                .iter()
                .position(|name| name == material)
                .map(|index| index as u32)
                .ok_or_else(|| GatherError::MaterialNotFound(material.to_string()))
        }

        fn gather_texture_property(&mut self, texture: &str) -> Result<u32, GatherError> {
            self.textures
                .iter()
                .position(|name| name == texture)
                .map(|index| index as u32)
                .ok_or_else(|| GatherError::TextureNotFound(texture.to_string()))
        }

        fn register_network_dependency(
            &mut self,
            target: NetworkTarget,
            component: &str,
            patch: serde_json::Value,
        ) {
            self.dependencies
                .push((target, component.to_string(), patch));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::stub::StubGatherer;
    use super::*;

    #[test]
    fn test_yup_swizzle() {
        let settings = ExportSettings::default();
        assert_eq!(
            apply_axis_convention(&settings, [1.0, 2.0, 3.0]),
            [1.0, 3.0, -2.0]
        );
        let zup = ExportSettings {
            axis_convention: AxisConvention::ZUp,
        };
        assert_eq!(apply_axis_convention(&zup, [1.0, 2.0, 3.0]), [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_vectors_serialize_as_xyz_objects() {
        let settings = ExportSettings::default();
        let mut gatherer = StubGatherer::new(&[]);
        let json = gather_value(&Value::Vec3([1.0, 2.0, 3.0]), &settings, &mut gatherer).unwrap();
        assert_eq!(json, serde_json::json!({"x": 1.0, "y": 3.0, "z": -2.0}));
    }

    #[test]
    fn test_variable_value_null_for_unassigned_reference() {
        let settings = ExportSettings::default();
        let mut gatherer = StubGatherer::new(&[]);
        let json =
            gather_variable_value(&Value::Entity(None), &settings, &mut gatherer).unwrap();
        assert_eq!(json, serde_json::Value::Null);
    }

    #[test]
    fn test_variable_value_dangling_reference_is_an_error() {
        let settings = ExportSettings::default();
        let mut gatherer = StubGatherer::new(&["Cube"]);
        let dangling = Value::Entity(Some(ObjectRef::new("Gone")));
        assert!(matches!(
            gather_variable_value(&dangling, &settings, &mut gatherer),
            Err(GatherError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn test_entity_role_resolution() {
        let settings = ExportSettings::default();
        let cube = Scope::object("Cube");
        let scene = Scope::scene("Scene");

        let object_ctx = ValueContext {
            settings: &settings,
            phase: ExportPhase::Object,
            scope: &cube,
            scene_name: "Scene",
        };
        let scene_ctx = ValueContext {
            settings: &settings,
            phase: ExportPhase::Scene,
            scope: &scene,
            scene_name: "Scene",
        };

        let selfish = Socket::input("entity", ValueType::Entity).with_role(EntityRole::SelfRef);
        assert_eq!(
            resolve_entity_ref(&selfish, &object_ctx).unwrap(),
            ObjectRef::new("Cube")
        );
        assert!(matches!(
            resolve_entity_ref(&selfish, &scene_ctx),
            Err(GatherError::SelfInSceneGraph)
        ));

        // Unset role falls back to the assigned target, and an empty target
        // is a reference error
        let unset = Socket::input("entity", ValueType::Entity);
        assert!(matches!(
            resolve_entity_ref(&unset, &object_ctx),
            Err(GatherError::EmptyReference("entity"))
        ));
    }
}
