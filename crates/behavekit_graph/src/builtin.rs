// SPDX-License-Identifier: MIT OR Apache-2.0
//! Hand-defined node kinds.
//!
//! These are the kinds that need serialization behavior beyond reflecting
//! their declared sockets: variable and event accessors, entity/component/
//! material property nodes, networked state, flow fan-out, and the adapter
//! kinds backing the auto-coercion table. Declarative catalog entries that
//! collide with any of these type ids are skipped at load time.

use crate::catalog::Catalog;
use crate::node::{NodeBehavior, NodeKind, SocketSpec, REROUTE_KIND};
use crate::value::{Value, ValueType};

/// Material property name and value type, in display order
pub const MATERIAL_PROPERTIES: &[(&str, ValueType)] = &[
    ("color", ValueType::Color),
    ("map", ValueType::Texture),
    ("transparent", ValueType::Boolean),
    ("opacity", ValueType::Float),
    ("alphaMap", ValueType::Texture),
    ("toneMapped", ValueType::Boolean),
    ("emissive", ValueType::Color),
    ("emissiveMap", ValueType::Texture),
    ("emissiveIntensity", ValueType::Float),
    ("roughness", ValueType::Float),
    ("roughnessMap", ValueType::Texture),
    ("metalness", ValueType::Float),
    ("metalnessMap", ValueType::Texture),
    ("lightMap", ValueType::Texture),
    ("lightMapIntensity", ValueType::Float),
    ("aoMap", ValueType::Texture),
    ("aoMapIntensity", ValueType::Float),
    ("normalMap", ValueType::Texture),
    ("wireframe", ValueType::Boolean),
    ("flatShading", ValueType::Boolean),
    ("fog", ValueType::Boolean),
    ("depthWrite", ValueType::Boolean),
    ("alphaTest", ValueType::Float),
];

/// Look up the value type of a material property
pub fn material_property_type(property: &str) -> Option<ValueType> {
    MATERIAL_PROPERTIES
        .iter()
        .find(|(name, _)| *name == property)
        .map(|(_, value_type)| *value_type)
}

/// Register every hand-defined kind into the catalog
pub fn register_builtins(catalog: &mut Catalog) {
    register_events(catalog);
    register_variables(catalog);
    register_flow(catalog);
    register_entity(catalog);
    register_components(catalog);
    register_networked(catalog);
    register_materials(catalog);
    register_animation(catalog);
    register_adapters(catalog);

    catalog.register(
        NodeKind::new(REROUTE_KIND, "Reroute", "Layout")
            .with_behavior(NodeBehavior::Reroute)
            .with_inputs(vec![SocketSpec::new("input", ValueType::Float)])
            .with_outputs(vec![SocketSpec::new("output", ValueType::Float)]),
    );
}

fn register_events(catalog: &mut Catalog) {
    catalog.register(
        NodeKind::new("lifecycle/onStart", "On Start", "Lifecycle Events")
            .with_outputs(vec![SocketSpec::flow()]),
    );
    catalog.register(
        NodeKind::new("lifecycle/onEnd", "On End", "Lifecycle Events")
            .with_outputs(vec![SocketSpec::flow()]),
    );
    catalog.register(
        NodeKind::new("lifecycle/onTick", "On Tick", "Lifecycle Events").with_outputs(vec![
            SocketSpec::flow(),
            SocketSpec::new("deltaSeconds", ValueType::Float),
        ]),
    );

    for (type_id, label) in [
        ("entity/onInteract", "On Interact"),
        ("entity/onCollisionEnter", "On Collision Enter"),
        ("entity/onCollisionStay", "On Collision Stay"),
        ("entity/onCollisionExit", "On Collision Exit"),
    ] {
        catalog.register(
            NodeKind::new(type_id, label, "Entity Events")
                .with_behavior(NodeBehavior::EventSource)
                .with_outputs(vec![
                    SocketSpec::flow(),
                    SocketSpec::new("entity", ValueType::Entity),
                ]),
        );
    }

    for (type_id, label) in [
        ("player/onCollisionEnter", "On Player Collision Enter"),
        ("player/onCollisionStay", "On Player Collision Stay"),
        ("player/onCollisionExit", "On Player Collision Exit"),
    ] {
        catalog.register(
            NodeKind::new(type_id, label, "Player Events")
                .with_behavior(NodeBehavior::EventSource)
                .with_outputs(vec![
                    SocketSpec::flow(),
                    SocketSpec::new("player", ValueType::Player),
                ]),
        );
    }

    catalog.register(
        NodeKind::new("customEvent/trigger", "Trigger", "Event")
            .with_behavior(NodeBehavior::EventTrigger)
            .with_inputs(vec![SocketSpec::flow()])
            .with_outputs(vec![SocketSpec::flow()]),
    );
    catalog.register(
        NodeKind::new("customEvent/onTriggered", "On Trigger", "Event")
            .with_behavior(NodeBehavior::EventReceive)
            .with_outputs(vec![SocketSpec::flow()]),
    );
}

fn register_variables(catalog: &mut Catalog) {
    catalog.register(
        NodeKind::new("variable/get", "Get Variable", "Variables")
            .with_behavior(NodeBehavior::VariableGet)
            .with_outputs(vec![SocketSpec::new("value", ValueType::Float)]),
    );
    catalog.register(
        NodeKind::new("variable/set", "Set Variable", "Variables")
            .with_behavior(NodeBehavior::VariableSet)
            .with_inputs(vec![
                SocketSpec::flow(),
                SocketSpec::new("value", ValueType::Float),
            ])
            .with_outputs(vec![SocketSpec::flow()]),
    );
}

fn register_flow(catalog: &mut Catalog) {
    catalog.register(
        NodeKind::new("flow/sequence", "Sequence", "Flow")
            .with_behavior(NodeBehavior::Sequence)
            .with_inputs(vec![SocketSpec::flow()])
            .with_outputs(vec![
                SocketSpec::new("1", ValueType::Flow),
                SocketSpec::new("2", ValueType::Flow),
            ]),
    );
}

fn register_entity(catalog: &mut Catalog) {
    // The value socket is materialized per selected property at
    // instantiation time; see Catalog::instantiate.
    catalog.register(
        NodeKind::new("entity/setProperty", "Set Entity Property", "Entity")
            .with_behavior(NodeBehavior::SetEntityProperty)
            .with_inputs(vec![
                SocketSpec::flow(),
                SocketSpec::new("entity", ValueType::Entity),
            ])
            .with_outputs(vec![SocketSpec::flow()]),
    );
    catalog.register(
        NodeKind::new("entity/getComponent", "Get Component", "Entity")
            .with_behavior(NodeBehavior::GetComponent)
            .with_inputs(vec![SocketSpec::new("entity", ValueType::Entity)])
            .with_outputs(vec![SocketSpec::new("component", ValueType::Entity)]),
    );
}

fn register_components(catalog: &mut Catalog) {
    catalog.register(
        NodeKind::new("components/setProperty", "Set Component Property", "Components")
            .with_behavior(NodeBehavior::SetComponentProperty)
            .with_inputs(vec![
                SocketSpec::flow(),
                SocketSpec::new("entity", ValueType::Entity),
            ])
            .with_outputs(vec![SocketSpec::flow()]),
    );
    catalog.register(
        NodeKind::new("components/getProperty", "Get Component Property", "Components")
            .with_behavior(NodeBehavior::GetComponentProperty)
            .with_inputs(vec![SocketSpec::new("entity", ValueType::Entity)]),
    );
}

fn register_networked(catalog: &mut Catalog) {
    let typed_sockets = || {
        ValueType::networked_types()
            .iter()
            .map(|vt| SocketSpec::new(vt.type_name(), *vt).hidden())
            .collect::<Vec<_>>()
    };

    let mut set_inputs = vec![SocketSpec::flow()];
    set_inputs.extend(typed_sockets());
    catalog.register(
        NodeKind::new("networkedVariable/set", "Networked Variable Set", "Networking")
            .with_behavior(NodeBehavior::NetworkedVariableSet)
            .with_inputs(set_inputs)
            .with_outputs(vec![SocketSpec::flow()]),
    );
    catalog.register(
        NodeKind::new("networkedVariable/get", "Networked Variable Get", "Networking")
            .with_behavior(NodeBehavior::NetworkedVariableGet)
            .with_outputs(typed_sockets()),
    );
}

fn register_materials(catalog: &mut Catalog) {
    catalog.register(
        NodeKind::new("material/set", "Set Material", "Materials")
            .with_behavior(NodeBehavior::SetMaterial)
            .with_inputs(vec![
                SocketSpec::flow(),
                SocketSpec::new("entity", ValueType::Entity),
                SocketSpec::new("material", ValueType::Material),
            ])
            .with_outputs(vec![SocketSpec::flow()]),
    );
    catalog.register(
        NodeKind::new("material/setProperty", "Set Material Property", "Materials")
            .with_behavior(NodeBehavior::SetMaterialProperty)
            .with_inputs(vec![
                SocketSpec::flow(),
                SocketSpec::new("material", ValueType::Material),
            ])
            .with_outputs(vec![SocketSpec::flow()]),
    );
    catalog.register(
        NodeKind::new("material/getProperty", "Get Material Property", "Materials")
            .with_behavior(NodeBehavior::GetMaterialProperty)
            .with_inputs(vec![SocketSpec::new("material", ValueType::Material)]),
    );
}

fn register_animation(catalog: &mut Catalog) {
    catalog.register(
        NodeKind::new("animation/createAction", "Create Animation Action", "Animation")
            .with_inputs(vec![
                SocketSpec::flow(),
                SocketSpec::new("entity", ValueType::Entity),
                SocketSpec::new("clipName", ValueType::String),
                SocketSpec::new("loop", ValueType::Boolean).with_default(Value::Boolean(true)),
            ])
            .with_outputs(vec![
                SocketSpec::flow(),
                SocketSpec::new("action", ValueType::AnimationAction),
            ]),
    );
    catalog.register(
        NodeKind::new("animation/play", "Play Animation", "Animation")
            .with_inputs(vec![
                SocketSpec::flow(),
                SocketSpec::new("action", ValueType::AnimationAction),
            ])
            .with_outputs(vec![SocketSpec::flow()]),
    );
    catalog.register(
        NodeKind::new("animation/stop", "Stop Animation", "Animation")
            .with_inputs(vec![
                SocketSpec::flow(),
                SocketSpec::new("action", ValueType::AnimationAction),
            ])
            .with_outputs(vec![SocketSpec::flow()]),
    );
    catalog.register(
        NodeKind::new("animation/crossfadeTo", "Crossfade To Animation", "Animation")
            .with_inputs(vec![
                SocketSpec::flow(),
                SocketSpec::new("action", ValueType::AnimationAction),
                SocketSpec::new("toAction", ValueType::AnimationAction),
                SocketSpec::new("duration", ValueType::Float).with_default(Value::Float(1.0)),
            ])
            .with_outputs(vec![SocketSpec::flow()]),
    );
}

fn register_adapters(catalog: &mut Catalog) {
    let adapters: &[(&str, &str, ValueType, ValueType)] = &[
        ("entity/toString", "Entity To String", ValueType::Entity, ValueType::String),
        ("math/toString/float", "Float To String", ValueType::Float, ValueType::String),
        ("math/toString/boolean", "Boolean To String", ValueType::Boolean, ValueType::String),
        ("math/toString/integer", "Integer To String", ValueType::Integer, ValueType::String),
        ("math/toString/vec3", "Vec3 To String", ValueType::Vec3, ValueType::String),
        ("math/toFloat/string", "String To Float", ValueType::String, ValueType::Float),
        ("math/toFloat/boolean", "Boolean To Float", ValueType::Boolean, ValueType::Float),
        ("math/toFloat/integer", "Integer To Float", ValueType::Integer, ValueType::Float),
        ("math/toFloat/vec3", "Vec3 To Float", ValueType::Vec3, ValueType::Float),
        ("math/toInteger/float", "Float To Integer", ValueType::Float, ValueType::Integer),
        ("math/toInteger/string", "String To Integer", ValueType::String, ValueType::Integer),
        ("math/toInteger/boolean", "Boolean To Integer", ValueType::Boolean, ValueType::Integer),
        ("math/toBoolean/string", "String To Boolean", ValueType::String, ValueType::Boolean),
        ("math/toBoolean/integer", "Integer To Boolean", ValueType::Integer, ValueType::Boolean),
        ("math/vec3/toEuler", "Vec3 To Euler", ValueType::Vec3, ValueType::Euler),
        ("math/euler/toVec3", "Euler To Vec3", ValueType::Euler, ValueType::Vec3),
        ("math/toVec3/float", "Float To Vec3", ValueType::Float, ValueType::Vec3),
    ];

    for (type_id, label, from, to) in adapters {
        let input_name = if *from == ValueType::Entity { "entity" } else { "a" };
        catalog.register(
            NodeKind::new(*type_id, *label, "Math")
                .with_inputs(vec![SocketSpec::new(input_name, *from)])
                .with_outputs(vec![SocketSpec::new("result", *to)]),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::auto_cast;

    const ALL_TYPES: &[ValueType] = &[
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

    #[test]
    fn test_every_coercion_has_a_matching_adapter_kind() {
        let catalog = Catalog::with_builtins();
        for from in ALL_TYPES {
            for to in ALL_TYPES {
                let Some(kind_id) = auto_cast(*from, *to) else {
                    continue;
                };
                let kind = catalog
                    .get(kind_id)
                    .unwrap_or_else(|| panic!("missing adapter kind {kind_id}"));
                assert_eq!(kind.inputs.len(), 1, "{kind_id}");
                assert_eq!(kind.inputs[0].value_type, *from, "{kind_id}");
                assert_eq!(kind.outputs.len(), 1, "{kind_id}");
                assert_eq!(kind.outputs[0].value_type, *to, "{kind_id}");
            }
        }
    }

    #[test]
    fn test_set_entity_property_instantiates_with_value_socket() {
        let catalog = Catalog::with_builtins();
        let node = catalog.instantiate("entity/setProperty").unwrap();
        assert_eq!(node.kind, "entity/set/visible");
        assert_eq!(node.inputs.len(), 3);
        assert_eq!(node.inputs[2].value_type, ValueType::Boolean);
    }

    #[test]
    fn test_networked_kinds_expose_one_socket_per_type() {
        let catalog = Catalog::with_builtins();
        let node = catalog.instantiate("networkedVariable/set").unwrap();
        let data_inputs: Vec<_> = node.inputs.iter().filter(|s| !s.is_flow()).collect();
        assert_eq!(data_inputs.len(), ValueType::networked_types().len());
        assert!(data_inputs.iter().all(|s| s.hidden));
    }

    #[test]
    fn test_material_property_table() {
        assert_eq!(material_property_type("color"), Some(ValueType::Color));
        assert_eq!(material_property_type("roughnessMap"), Some(ValueType::Texture));
        assert_eq!(material_property_type("alphaTest"), Some(ValueType::Float));
        assert_eq!(material_property_type("specular"), None);
    }
}
