use std::collections::BTreeMap;

use crate::types::{FieldSpec, Operation};

/// Recorded shape of one entity: its fields in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityShape {
    pub fields: Vec<(String, FieldSpec)>,
}

impl EntityShape {
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, spec)| spec)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("entity {0} does not exist")]
    UnknownEntity(String),
    #[error("entity {0} already exists")]
    EntityExists(String),
    #[error("field {entity}.{field} does not exist")]
    UnknownField { entity: String, field: String },
    #[error("field {entity}.{field} already exists")]
    FieldExists { entity: String, field: String },
}

/// Schema shape obtained by replaying migration operations in order.
///
/// The ledger keeps no schema snapshot in storage: the shape is always
/// derived from the applied migrations, which makes it replayable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaState {
    entities: BTreeMap<String, EntityShape>,
}

impl SchemaState {
    pub fn entity(&self, name: &str) -> Option<&EntityShape> {
        self.entities.get(name)
    }

    pub fn entities(&self) -> impl Iterator<Item = (&str, &EntityShape)> {
        self.entities.iter().map(|(name, shape)| (name.as_str(), shape))
    }

    /// Project one operation onto the shape. Leaves `self` untouched on error.
    pub fn apply(&mut self, op: &Operation) -> Result<(), StateError> {
        match op {
            Operation::CreateEntity { name, fields } => {
                if self.entities.contains_key(name) {
                    return Err(StateError::EntityExists(name.clone()));
                }
                let mut shape = EntityShape::default();
                for (field, spec) in fields {
                    if shape.field(field).is_some() {
                        return Err(StateError::FieldExists {
                            entity: name.clone(),
                            field: field.clone(),
                        });
                    }
                    shape.fields.push((field.clone(), spec.clone()));
                }
                self.entities.insert(name.clone(), shape);
            }
            Operation::AddField {
                entity,
                field,
                spec,
            } => {
                let shape = self
                    .entities
                    .get_mut(entity)
                    .ok_or_else(|| StateError::UnknownEntity(entity.clone()))?;
                if shape.field(field).is_some() {
                    return Err(StateError::FieldExists {
                        entity: entity.clone(),
                        field: field.clone(),
                    });
                }
                shape.fields.push((field.clone(), spec.clone()));
            }
            Operation::AlterField {
                entity,
                field,
                spec,
            } => {
                let shape = self
                    .entities
                    .get_mut(entity)
                    .ok_or_else(|| StateError::UnknownEntity(entity.clone()))?;
                let slot = shape
                    .fields
                    .iter_mut()
                    .find(|(name, _)| name == field)
                    .ok_or_else(|| StateError::UnknownField {
                        entity: entity.clone(),
                        field: field.clone(),
                    })?;
                slot.1 = spec.clone();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldDefault;

    fn wallets() -> Operation {
        Operation::create_entity(
            "validator_wallets",
            vec![
                ("id", FieldSpec::auto_id()),
                (
                    "status",
                    FieldSpec::char(20)
                        .default_str("active")
                        .choices(&["active", "banned", "permabanned"]),
                ),
            ],
        )
    }

    #[test]
    fn should_widen_choices_in_place() {
        let mut state = SchemaState::default();
        state.apply(&wallets()).unwrap();
        state
            .apply(&Operation::alter_field(
                "validator_wallets",
                "status",
                FieldSpec::char(20)
                    .default_str("active")
                    .choices(&["active", "banned", "permabanned", "inactive"]),
            ))
            .unwrap();

        let status = state.entity("validator_wallets").unwrap().field("status").unwrap();
        assert!(status.allows("inactive"));
        assert_eq!(status.default, Some(FieldDefault::Str("active".to_owned())));
        let columns: Vec<_> = state.entity("validator_wallets").unwrap().column_names().collect();
        assert_eq!(columns, vec!["id", "status"]);
    }

    #[test]
    fn should_append_added_field() {
        let mut state = SchemaState::default();
        state.apply(&wallets()).unwrap();
        state
            .apply(&Operation::add_field(
                "validator_wallets",
                "moniker",
                FieldSpec::char(255).default_str(""),
            ))
            .unwrap();
        let columns: Vec<_> = state.entity("validator_wallets").unwrap().column_names().collect();
        assert_eq!(columns, vec!["id", "status", "moniker"]);
    }

    #[test]
    fn should_reject_duplicate_entity_and_field() {
        let mut state = SchemaState::default();
        state.apply(&wallets()).unwrap();
        assert!(matches!(
            state.apply(&wallets()),
            Err(StateError::EntityExists(_))
        ));
        assert!(matches!(
            state.apply(&Operation::add_field(
                "validator_wallets",
                "status",
                FieldSpec::text()
            )),
            Err(StateError::FieldExists { .. })
        ));
    }

    #[test]
    fn should_reject_operations_on_unknown_targets() {
        let mut state = SchemaState::default();
        assert!(matches!(
            state.apply(&Operation::add_field("nonces", "used", FieldSpec::boolean())),
            Err(StateError::UnknownEntity(_))
        ));
        state.apply(&wallets()).unwrap();
        assert!(matches!(
            state.apply(&Operation::alter_field(
                "validator_wallets",
                "missing",
                FieldSpec::text()
            )),
            Err(StateError::UnknownField { .. })
        ));
    }
}
