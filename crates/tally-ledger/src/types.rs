use std::fmt;

use serde::Serialize;

/// Identity of a migration: the owning app plus the migration name
/// (e.g. `contributions.0002_add_highlight_icon_and_examples`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MigrationId {
    pub app: String,
    pub name: String,
}

impl MigrationId {
    pub fn new(app: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.app, self.name)
    }
}

/// One versioned schema mutation: dependencies that must be applied first and
/// the forward operations, executed in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Migration {
    pub id: MigrationId,
    pub dependencies: Vec<MigrationId>,
    pub operations: Vec<Operation>,
}

impl Migration {
    pub fn new(app: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: MigrationId::new(app, name),
            dependencies: Vec::new(),
            operations: Vec::new(),
        }
    }

    pub fn depends_on(mut self, app: impl Into<String>, name: impl Into<String>) -> Self {
        self.dependencies.push(MigrationId::new(app, name));
        self
    }

    pub fn operation(mut self, op: Operation) -> Self {
        self.operations.push(op);
        self
    }
}

/// Structural primitives a migration may perform. The set is closed.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    AddField {
        entity: String,
        field: String,
        spec: FieldSpec,
    },
    AlterField {
        entity: String,
        field: String,
        spec: FieldSpec,
    },
    CreateEntity {
        name: String,
        fields: Vec<(String, FieldSpec)>,
    },
}

impl Operation {
    pub fn add_field(entity: &str, field: &str, spec: FieldSpec) -> Self {
        Self::AddField {
            entity: entity.to_owned(),
            field: field.to_owned(),
            spec,
        }
    }

    pub fn alter_field(entity: &str, field: &str, spec: FieldSpec) -> Self {
        Self::AlterField {
            entity: entity.to_owned(),
            field: field.to_owned(),
            spec,
        }
    }

    pub fn create_entity(name: &str, fields: Vec<(&str, FieldSpec)>) -> Self {
        Self::CreateEntity {
            name: name.to_owned(),
            fields: fields
                .into_iter()
                .map(|(field, spec)| (field.to_owned(), spec))
                .collect(),
        }
    }

    /// Entity (table) the operation targets.
    pub fn entity(&self) -> &str {
        match self {
            Self::AddField { entity, .. } | Self::AlterField { entity, .. } => entity,
            Self::CreateEntity { name, .. } => name,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AddField { entity, field, .. } => write!(f, "add field {entity}.{field}"),
            Self::AlterField { entity, field, .. } => write!(f, "alter field {entity}.{field}"),
            Self::CreateEntity { name, .. } => write!(f, "create entity {name}"),
        }
    }
}

/// Semantic column type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Auto-incrementing 64-bit primary key.
    AutoId,
    Char { max_length: u32 },
    Text,
    Boolean,
    Integer,
    DateTime,
    Json,
}

/// Column default applied by storage to rows that do not provide a value,
/// including rows that existed before the column was added.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldDefault {
    Bool(bool),
    Int(i64),
    Str(String),
    /// Empty JSON array.
    EmptyList,
    /// Current timestamp at insert time.
    Now,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub kind: FieldType,
    pub null: bool,
    pub unique: bool,
    pub default: Option<FieldDefault>,
    /// Closed set of permitted values. Enforced by writers, not by storage.
    pub choices: Option<Vec<String>>,
}

impl FieldSpec {
    fn of(kind: FieldType) -> Self {
        Self {
            kind,
            null: false,
            unique: false,
            default: None,
            choices: None,
        }
    }

    pub fn auto_id() -> Self {
        Self::of(FieldType::AutoId)
    }

    pub fn char(max_length: u32) -> Self {
        Self::of(FieldType::Char { max_length })
    }

    pub fn text() -> Self {
        Self::of(FieldType::Text)
    }

    pub fn boolean() -> Self {
        Self::of(FieldType::Boolean)
    }

    pub fn integer() -> Self {
        Self::of(FieldType::Integer)
    }

    pub fn datetime() -> Self {
        Self::of(FieldType::DateTime)
    }

    pub fn json() -> Self {
        Self::of(FieldType::Json)
    }

    pub fn nullable(mut self) -> Self {
        self.null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }

    pub fn default_str(self, value: &str) -> Self {
        self.default(FieldDefault::Str(value.to_owned()))
    }

    pub fn default_bool(self, value: bool) -> Self {
        self.default(FieldDefault::Bool(value))
    }

    pub fn default_int(self, value: i64) -> Self {
        self.default(FieldDefault::Int(value))
    }

    pub fn choices(mut self, values: &[&str]) -> Self {
        self.choices = Some(values.iter().map(|v| (*v).to_owned()).collect());
        self
    }

    /// Whether two specs produce the same column in storage. `choices` is an
    /// application-level constraint and does not take part.
    pub fn storage_eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.null == other.null
            && self.unique == other.unique
            && self.default == other.default
    }

    /// Whether `value` is permitted by the `choices` constraint, if any.
    pub fn allows(&self, value: &str) -> bool {
        self.choices
            .as_ref()
            .is_none_or(|choices| choices.iter().any(|c| c == value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_migration_id_as_app_dot_name() {
        let id = MigrationId::new("validators", "0002_alter_validatorwallet_status");
        assert_eq!(id.to_string(), "validators.0002_alter_validatorwallet_status");
    }

    #[test]
    fn should_ignore_choices_when_comparing_storage() {
        let narrow = FieldSpec::char(20)
            .default_str("active")
            .choices(&["active", "banned"]);
        let wide = FieldSpec::char(20)
            .default_str("active")
            .choices(&["active", "banned", "inactive"]);
        assert!(narrow.storage_eq(&wide));
        assert_ne!(narrow, wide);
    }

    #[test]
    fn should_detect_storage_change_on_length_or_nullability() {
        let before = FieldSpec::char(255);
        assert!(!before.storage_eq(&FieldSpec::char(42)));
        assert!(!before.storage_eq(&FieldSpec::char(255).nullable()));
    }

    #[test]
    fn should_check_choices_membership() {
        let spec = FieldSpec::char(20).choices(&["active", "inactive"]);
        assert!(spec.allows("inactive"));
        assert!(!spec.allows("deleted"));
        assert!(FieldSpec::text().allows("anything"));
    }

    #[test]
    fn should_build_migration_with_dependencies_and_operations() {
        let m = Migration::new("contributions", "0002_add_icon")
            .depends_on("contributions", "0001_initial")
            .operation(Operation::add_field(
                "contribution_types",
                "icon",
                FieldSpec::char(100).default_str(""),
            ));
        assert_eq!(m.dependencies, vec![MigrationId::new("contributions", "0001_initial")]);
        assert_eq!(m.operations.len(), 1);
        assert_eq!(m.operations[0].entity(), "contribution_types");
        assert_eq!(m.operations[0].to_string(), "add field contribution_types.icon");
    }
}
