// SPDX-License-Identifier: MIT OR Apache-2.0
//! Authoring scopes: where variables, custom events, and graphs live.
//!
//! A scope is either the scene itself or one object in it. Each scope owns
//! its own symbol declarations and any number of graph slots; slots may sit
//! empty between authoring sessions.

use crate::graph::Graph;
use crate::value::{ObjectRef, Value, ValueType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A declared scope variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    /// Name, unique within the owning scope
    pub name: String,
    /// Declared type
    pub value_type: ValueType,
    /// Initial value baked into the export
    pub default: Value,
    /// Replicated at runtime instead of statically indexed
    pub networked: bool,
}

impl Variable {
    /// Declare a variable with its type's canonical default. Flow is not a
    /// declarable variable type; callers pass types from
    /// [`ValueType::variable_types`].
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            default: value_type
                .default_value()
                .unwrap_or(Value::Boolean(false)),
            networked: false,
        }
    }

    /// Set the initial value
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }

    /// Mark the variable as runtime-replicated
    pub fn networked(mut self) -> Self {
        self.networked = true;
        self
    }
}

/// A typed parameter on a custom event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventParameter {
    /// Parameter name
    pub name: String,
    /// Declared type
    pub value_type: ValueType,
    /// Default carried by the event when the trigger leaves it unset
    pub default: Value,
}

impl EventParameter {
    /// Declare a parameter with its type's canonical default
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            default: value_type
                .default_value()
                .unwrap_or(Value::Boolean(false)),
        }
    }

    /// Set the default value
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }
}

/// A declared custom event: a symbolic trigger/listener pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomEvent {
    /// Name, unique within the owning scope
    pub name: String,
    /// Ordered typed parameters
    pub parameters: Vec<EventParameter>,
}

impl CustomEvent {
    /// Declare a parameterless event
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    /// Add a parameter
    pub fn with_parameter(mut self, parameter: EventParameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// One graph slot on a scope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphSlot {
    /// The authored graph, `None` for an empty slot
    pub graph: Option<Graph>,
}

/// What kind of scope this is
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScopeKind {
    /// The scene-level scope
    Scene,
    /// A per-object scope
    Object(ObjectRef),
}

/// An authoring scope owning variables, custom events, and graph slots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scope {
    /// Scope name, used in composite symbol keys and node record ids
    pub name: String,
    /// Scene or object scope
    pub kind: ScopeKind,
    variables: IndexMap<String, Variable>,
    custom_events: IndexMap<String, CustomEvent>,
    /// Graph slots, in authoring order
    pub slots: Vec<GraphSlot>,
}

impl Scope {
    /// Create the scene-level scope
    pub fn scene(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ScopeKind::Scene,
            variables: IndexMap::new(),
            custom_events: IndexMap::new(),
            slots: Vec::new(),
        }
    }

    /// Create a per-object scope; the scope name doubles as the object
    /// reference
    pub fn object(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: ScopeKind::Object(ObjectRef::new(name.clone())),
            name,
            variables: IndexMap::new(),
            custom_events: IndexMap::new(),
            slots: Vec::new(),
        }
    }

    /// The object this scope belongs to, `None` for the scene scope
    pub fn object_ref(&self) -> Option<&ObjectRef> {
        match &self.kind {
            ScopeKind::Scene => None,
            ScopeKind::Object(object) => Some(object),
        }
    }

    /// Declare a variable, replacing any previous declaration of the name
    pub fn add_variable(&mut self, variable: Variable) {
        self.variables.insert(variable.name.clone(), variable);
    }

    /// Remove a variable declaration
    pub fn remove_variable(&mut self, name: &str) -> Option<Variable> {
        self.variables.shift_remove(name)
    }

    /// Look up a variable by name
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.variables.get(name)
    }

    /// Iterate variables in declaration order
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values()
    }

    /// Declare a custom event, replacing any previous declaration
    pub fn add_event(&mut self, event: CustomEvent) {
        self.custom_events.insert(event.name.clone(), event);
    }

    /// Remove a custom event declaration
    pub fn remove_event(&mut self, name: &str) -> Option<CustomEvent> {
        self.custom_events.shift_remove(name)
    }

    /// Look up a custom event by name
    pub fn event(&self, name: &str) -> Option<&CustomEvent> {
        self.custom_events.get(name)
    }

    /// Iterate custom events in declaration order
    pub fn events(&self) -> impl Iterator<Item = &CustomEvent> {
        self.custom_events.values()
    }

    /// Add a graph in a new slot, returning the slot index
    pub fn add_graph(&mut self, graph: Graph) -> usize {
        self.slots.push(GraphSlot { graph: Some(graph) });
        self.slots.len() - 1
    }

    /// Add an empty slot
    pub fn add_empty_slot(&mut self) -> usize {
        self.slots.push(GraphSlot::default());
        self.slots.len() - 1
    }

    /// Iterate authored graphs with their slot indices, skipping empty slots
    pub fn graphs(&self) -> impl Iterator<Item = (usize, &Graph)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.graph.as_ref().map(|graph| (index, graph)))
    }

    /// Get a mutable graph by slot index
    pub fn graph_mut(&mut self, slot: usize) -> Option<&mut Graph> {
        self.slots.get_mut(slot)?.graph.as_mut()
    }
}

/// The authoring document: the scene scope plus every object scope, in the
/// order the host document lists them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// The scene-level scope
    pub scene: Scope,
    /// Per-object scopes in stable document order
    pub objects: Vec<Scope>,
}

impl Project {
    /// Create a project with an empty scene scope
    pub fn new(scene_name: impl Into<String>) -> Self {
        Self {
            scene: Scope::scene(scene_name),
            objects: Vec::new(),
        }
    }

    /// Add an object scope
    pub fn add_object(&mut self, scope: Scope) -> &mut Scope {
        self.objects.push(scope);
        self.objects.last_mut().expect("just pushed")
    }

    /// Iterate every scope: scene first, then objects in document order
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        std::iter::once(&self.scene).chain(self.objects.iter())
    }

    /// Look up an object scope by name
    pub fn object(&self, name: &str) -> Option<&Scope> {
        self.objects.iter().find(|scope| scope.name == name)
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new("Scene")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_iteration_order_is_stable() {
        let mut project = Project::new("Scene");
        project.add_object(Scope::object("Cube"));
        project.add_object(Scope::object("Lamp"));
        let names: Vec<_> = project.scopes().map(|s| s.name.clone()).collect();
        assert_eq!(names, vec!["Scene", "Cube", "Lamp"]);
    }

    #[test]
    fn test_empty_slots_are_skipped() {
        let mut scope = Scope::object("Cube");
        scope.add_empty_slot();
        scope.add_graph(Graph::new("Behavior"));
        scope.add_empty_slot();
        let graphs: Vec<_> = scope.graphs().collect();
        assert_eq!(graphs.len(), 1);
        // Slot indices are preserved, not re-numbered around empty slots
        assert_eq!(graphs[0].0, 1);
    }

    #[test]
    fn test_variable_redeclaration_replaces() {
        let mut scope = Scope::scene("Scene");
        scope.add_variable(Variable::new("speed", ValueType::Float));
        scope.add_variable(
            Variable::new("speed", ValueType::Float).with_default(Value::Float(2.5)),
        );
        assert_eq!(scope.variables().count(), 1);
        assert_eq!(
            scope.variable("speed").unwrap().default,
            Value::Float(2.5)
        );
    }
}
