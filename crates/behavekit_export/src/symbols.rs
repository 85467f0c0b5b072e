// SPDX-License-Identifier: MIT OR Apache-2.0
//! Symbol table construction: stable integer ids for variables and events.
//!
//! Every exportable scope is visited in a fixed order (scene first, then
//! objects in document order) and each declaration gets the next sequential
//! id in its table. Names are disambiguated across scopes with a
//! `{scope}_{name}` composite key. Networked variables live outside the
//! static id space entirely; nodes referring to them report id `-1` and the
//! runtime resolves them by name.

use crate::document::{CustomEventRecord, EventParameterRecord, VariableRecord};
use crate::gather::{gather_variable_value, DocumentGatherer, ExportSettings, GatherError};
use behavekit_graph::scope::{Project, Scope};
use behavekit_graph::value::ValueType;
use indexmap::IndexMap;

/// One entry in the variable table
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSymbol {
    /// Sequential id within the variable table
    pub id: u32,
    /// Declared type
    pub value_type: ValueType,
    /// Resolved initial value in wire form
    pub initial_value: serde_json::Value,
    /// Always false: networked variables never enter the table
    pub networked: bool,
}

/// One entry in the custom event table
#[derive(Debug, Clone, PartialEq)]
pub struct EventSymbol {
    /// Sequential id within the event table
    pub id: u32,
    /// Resolved parameter records, `None` for parameterless events
    pub parameters: Option<Vec<EventParameterRecord>>,
}

/// The global symbol tables for one export pass
#[derive(Debug, Clone, Default)]
pub struct SymbolTables {
    /// Variables by composite key, in id order
    pub variables: IndexMap<String, VariableSymbol>,
    /// Custom events by composite key, in id order
    pub custom_events: IndexMap<String, EventSymbol>,
}

impl SymbolTables {
    /// The `{scope}_{name}` key disambiguating symbols across scopes
    pub fn composite_key(scope_name: &str, local_name: &str) -> String {
        format!("{scope_name}_{local_name}")
    }

    /// Look up a variable id by its owning scope and local name
    pub fn variable_id(&self, scope_name: &str, local_name: &str) -> Option<u32> {
        self.variables
            .get(&Self::composite_key(scope_name, local_name))
            .map(|symbol| symbol.id)
    }

    /// Look up an event id by its owning scope and local name
    pub fn event_id(&self, scope_name: &str, local_name: &str) -> Option<u32> {
        self.custom_events
            .get(&Self::composite_key(scope_name, local_name))
            .map(|symbol| symbol.id)
    }

    /// The variable table as wire records, in id order
    pub fn variable_records(&self) -> Vec<VariableRecord> {
        self.variables
            .iter()
            .map(|(name, symbol)| VariableRecord {
                name: name.clone(),
                id: symbol.id,
                value_type_name: symbol.value_type.type_name().to_string(),
                initial_value: symbol.initial_value.clone(),
            })
            .collect()
    }

    /// The event table as wire records, in id order
    pub fn event_records(&self) -> Vec<CustomEventRecord> {
        self.custom_events
            .iter()
            .map(|(name, symbol)| CustomEventRecord {
                name: name.clone(),
                id: symbol.id,
                parameters: symbol.parameters.clone(),
            })
            .collect()
    }
}

/// Error attributing a bad symbol declaration to its scope
#[derive(Debug, thiserror::Error)]
pub enum SymbolError {
    /// A variable default failed to resolve
    #[error("{scope}/{name}: {source}")]
    Variable {
        /// Owning scope
        scope: String,
        /// Variable name
        name: String,
        /// Underlying resolution failure
        source: GatherError,
    },

    /// An event parameter default failed to resolve
    #[error("{scope}/{event}/{name}: {source}")]
    EventParameter {
        /// Owning scope
        scope: String,
        /// Event name
        event: String,
        /// Parameter name
        name: String,
        /// Underlying resolution failure
        source: GatherError,
    },
}

/// Build the symbol tables for every scope in the project
pub fn build_symbol_tables(
    project: &Project,
    settings: &ExportSettings,
    gatherer: &mut dyn DocumentGatherer,
) -> Result<SymbolTables, SymbolError> {
    let mut tables = SymbolTables::default();

    for scope in project.scopes() {
        collect_variables(scope, settings, gatherer, &mut tables)?;
    }
    for scope in project.scopes() {
        collect_events(scope, settings, gatherer, &mut tables)?;
    }

    tracing::debug!(
        variables = tables.variables.len(),
        custom_events = tables.custom_events.len(),
        "built symbol tables"
    );
    Ok(tables)
}

fn collect_variables(
    scope: &Scope,
    settings: &ExportSettings,
    gatherer: &mut dyn DocumentGatherer,
    tables: &mut SymbolTables,
) -> Result<(), SymbolError> {
    for variable in scope.variables() {
        if variable.networked {
            continue;
        }
        let initial_value = gather_variable_value(&variable.default, settings, gatherer)
            .map_err(|source| SymbolError::Variable {
                scope: scope.name.clone(),
                name: variable.name.clone(),
                source,
            })?;
        let id = tables.variables.len() as u32;
        tables.variables.insert(
            SymbolTables::composite_key(&scope.name, &variable.name),
            VariableSymbol {
                id,
                value_type: variable.value_type,
                initial_value,
                networked: false,
            },
        );
    }
    Ok(())
}

fn collect_events(
    scope: &Scope,
    settings: &ExportSettings,
    gatherer: &mut dyn DocumentGatherer,
    tables: &mut SymbolTables,
) -> Result<(), SymbolError> {
    for event in scope.events() {
        let parameters = if event.parameters.is_empty() {
            None
        } else {
            let mut records = Vec::with_capacity(event.parameters.len());
            for parameter in &event.parameters {
                let default_value = gather_variable_value(&parameter.default, settings, gatherer)
                    .map_err(|source| SymbolError::EventParameter {
                        scope: scope.name.clone(),
                        event: event.name.clone(),
                        name: parameter.name.clone(),
                        source,
                    })?;
                records.push(EventParameterRecord {
                    name: parameter.name.clone(),
                    value_type_name: parameter.value_type.type_name().to_string(),
                    default_value,
                });
            }
            Some(records)
        };
        let id = tables.custom_events.len() as u32;
        tables.custom_events.insert(
            SymbolTables::composite_key(&scope.name, &event.name),
            EventSymbol { id, parameters },
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gather::stub::StubGatherer;
    use behavekit_graph::scope::{CustomEvent, EventParameter, Scope, Variable};
    use behavekit_graph::value::{ObjectRef, Value};

    fn sample_project() -> Project {
        let mut project = Project::new("Scene");
        project
            .scene
            .add_variable(Variable::new("score", ValueType::Integer));
        let cube = project.add_object(Scope::object("Cube"));
        cube.add_variable(
            Variable::new("speed", ValueType::Float).with_default(Value::Float(2.5)),
        );
        cube.add_variable(Variable::new("health", ValueType::Integer).networked());
        cube.add_event(
            CustomEvent::new("onHit").with_parameter(
                EventParameter::new("damage", ValueType::Float).with_default(Value::Float(10.0)),
            ),
        );
        project.scene.add_event(CustomEvent::new("onReset"));
        project
    }

    #[test]
    fn test_composite_keys_and_sequential_ids() {
        let project = sample_project();
        let settings = ExportSettings::default();
        let mut gatherer = StubGatherer::new(&["Cube"]);
        let tables = build_symbol_tables(&project, &settings, &mut gatherer).unwrap();

        // Scene scope first, then objects in document order
        let keys: Vec<_> = tables.variables.keys().cloned().collect();
        assert_eq!(keys, vec!["Scene_score", "Cube_speed"]);
        let speed = &tables.variables["Cube_speed"];
        assert_eq!(speed.id, 1);
        assert_eq!(speed.value_type, ValueType::Float);
        assert_eq!(speed.initial_value, serde_json::json!(2.5));
    }

    #[test]
    fn test_networked_variables_are_excluded() {
        let project = sample_project();
        let settings = ExportSettings::default();
        let mut gatherer = StubGatherer::new(&["Cube"]);
        let tables = build_symbol_tables(&project, &settings, &mut gatherer).unwrap();
        assert!(tables.variable_id("Cube", "health").is_none());
    }

    #[test]
    fn test_event_parameters_resolve() {
        let project = sample_project();
        let settings = ExportSettings::default();
        let mut gatherer = StubGatherer::new(&["Cube"]);
        let tables = build_symbol_tables(&project, &settings, &mut gatherer).unwrap();

        assert_eq!(tables.event_id("Scene", "onReset"), Some(0));
        let on_hit = &tables.custom_events["Cube_onHit"];
        assert_eq!(on_hit.id, 1);
        let parameters = on_hit.parameters.as_ref().unwrap();
        assert_eq!(parameters[0].name, "damage");
        assert_eq!(parameters[0].value_type_name, "float");
        assert_eq!(parameters[0].default_value, serde_json::json!(10.0));
    }

    #[test]
    fn test_ids_are_stable_across_runs() {
        let project = sample_project();
        let settings = ExportSettings::default();
        let mut gatherer = StubGatherer::new(&["Cube"]);
        let first = build_symbol_tables(&project, &settings, &mut gatherer).unwrap();
        let second = build_symbol_tables(&project, &settings, &mut gatherer).unwrap();
        assert_eq!(first.variables, second.variables);
        assert_eq!(first.custom_events, second.custom_events);
    }

    #[test]
    fn test_dangling_entity_default_names_scope_and_variable() {
        let mut project = Project::new("Scene");
        let lamp = project.add_object(Scope::object("Lamp"));
        lamp.add_variable(
            Variable::new("anchor", ValueType::Entity)
                .with_default(Value::Entity(Some(ObjectRef::new("Deleted")))),
        );
        let settings = ExportSettings::default();
        let mut gatherer = StubGatherer::new(&["Lamp"]);
        let error = build_symbol_tables(&project, &settings, &mut gatherer).unwrap_err();
        let message = error.to_string();
        assert!(message.contains("Lamp"));
        assert!(message.contains("anchor"));
    }
}
