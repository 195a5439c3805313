//! Registered record types: resolved columns, special-field metadata, registry.

pub mod meta;
pub mod naming;
pub mod registry;

pub use meta::{
    resolve as resolve_meta, FieldDescriptor, ModelDescriptor, ModelField, ModelMeta, Record, CREATE_TIME_FIELD_TAG,
    SOFT_DELETE_FIELD_TAG, UPDATE_TIME_FIELD_TAG,
};
pub use naming::{to_snake_case, NamingStrategy, SchemaLookup, StaticColumns};
pub use registry::ModelRegistry;

use crate::error::ModelError;
use regex::Regex;
use std::sync::LazyLock;

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

/// Postgres type names as written after `::`: multi-word names, `(p,s)` modifiers, array suffixes.
static TYPE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*( [A-Za-z_][A-Za-z0-9_]*)*(\( ?[0-9]+ ?(, ?[0-9]+ ?)?\))?( [A-Za-z_][A-Za-z0-9_]*)*(\[\])*$")
        .expect("type name pattern is valid")
});

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelColumn {
    pub member: String,
    pub column: String,
    pub pg_type: Option<String>,
}

/// A record type ready to serve: every member mapped to a column, metadata resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Model {
    pub name: String,
    pub schema: Option<String>,
    pub table: String,
    pub columns: Vec<ModelColumn>,
    pub meta: ModelMeta,
    pk_index: usize,
}

impl Model {
    /// Resolve a descriptor. Any lookup failure or bad identifier fails the whole model.
    pub fn resolve(descriptor: &ModelDescriptor, lookup: &dyn SchemaLookup) -> Result<Model, ModelError> {
        let check_with = |pattern: &Regex, identifier: &str| {
            if pattern.is_match(identifier) {
                Ok(())
            } else {
                Err(ModelError::InvalidIdentifier {
                    model: descriptor.name.clone(),
                    identifier: identifier.to_string(),
                })
            }
        };
        let check = |identifier: &str| check_with(&*IDENTIFIER, identifier);
        check(&descriptor.table)?;
        if let Some(schema) = &descriptor.schema {
            check(schema)?;
        }

        let mut columns: Vec<ModelColumn> = Vec::with_capacity(descriptor.fields.len());
        for field in &descriptor.fields {
            let column = lookup
                .column_name(&field.member)
                .map_err(|reason| ModelError::SchemaResolution {
                    model: descriptor.name.clone(),
                    member: field.member.clone(),
                    reason,
                })?;
            check(&column)?;
            if let Some(pg_type) = &field.pg_type {
                check_with(&*TYPE_NAME, pg_type)?;
            }
            columns.push(ModelColumn {
                member: field.member.clone(),
                column,
                pg_type: field.pg_type.clone(),
            });
        }

        let pk_index = columns
            .iter()
            .position(|c| c.column == descriptor.primary_key)
            .ok_or_else(|| ModelError::MissingPrimaryKey {
                model: descriptor.name.clone(),
                column: descriptor.primary_key.clone(),
            })?;
        let meta = meta::resolve(descriptor, lookup)?;

        Ok(Model {
            name: descriptor.name.clone(),
            schema: descriptor.schema.clone(),
            table: descriptor.table.clone(),
            columns,
            meta,
            pk_index,
        })
    }

    /// Find a column by column name, falling back to member name.
    pub fn column(&self, name: &str) -> Option<&ModelColumn> {
        self.columns
            .iter()
            .find(|c| c.column == name)
            .or_else(|| self.columns.iter().find(|c| c.member == name))
    }

    pub fn primary_key(&self) -> &ModelColumn {
        &self.columns[self.pk_index]
    }

    /// True for columns the server stamps itself (timestamps, soft delete).
    pub fn is_managed(&self, column: &str) -> bool {
        [&self.meta.soft_deleted, &self.meta.created_at, &self.meta.updated_at]
            .into_iter()
            .flatten()
            .any(|f| f.column == column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> ModelDescriptor {
        ModelDescriptor::new("User", "users")
            .field(FieldDescriptor::new("ID").pg_type("bigint"))
            .field(FieldDescriptor::new("FullName"))
            .field(FieldDescriptor::new("DeletedAt").tags("soft_delete_field").pg_type("timestamptz"))
    }

    #[test]
    fn test_resolve_maps_every_field() {
        let model = Model::resolve(&descriptor(), &NamingStrategy).unwrap();
        let cols: Vec<_> = model.columns.iter().map(|c| c.column.as_str()).collect();
        assert_eq!(cols, ["id", "full_name", "deleted_at"]);
        assert_eq!(model.primary_key().member, "ID");
        assert_eq!(model.column("FullName").unwrap().column, "full_name");
        assert_eq!(model.column("full_name").unwrap().member, "FullName");
        assert!(model.column("missing").is_none());
        assert!(model.is_managed("deleted_at"));
        assert!(!model.is_managed("full_name"));
    }

    #[test]
    fn test_missing_primary_key() {
        let err = Model::resolve(&descriptor().primary_key("uuid"), &NamingStrategy).unwrap_err();
        assert!(matches!(err, ModelError::MissingPrimaryKey { ref column, .. } if column == "uuid"));
    }

    #[test]
    fn test_invalid_identifiers() {
        let bad_table = ModelDescriptor::new("User", "users; drop").field(FieldDescriptor::new("ID"));
        assert!(matches!(
            Model::resolve(&bad_table, &NamingStrategy),
            Err(ModelError::InvalidIdentifier { .. })
        ));
        let lookup = StaticColumns::new().column("ID", "id\"x");
        let desc = ModelDescriptor::new("User", "users").field(FieldDescriptor::new("ID"));
        assert!(matches!(Model::resolve(&desc, &lookup), Err(ModelError::InvalidIdentifier { .. })));
    }

    #[test]
    fn test_multi_word_and_modified_types() {
        for pg_type in [
            "double precision",
            "timestamp with time zone",
            "numeric(10,2)",
            "character varying(64)",
            "timestamp(3) with time zone",
            "integer[]",
            "text[][]",
        ] {
            let desc = ModelDescriptor::new("Score", "scores")
                .field(FieldDescriptor::new("ID"))
                .field(FieldDescriptor::new("Score").pg_type(pg_type));
            let model = Model::resolve(&desc, &NamingStrategy).unwrap();
            assert_eq!(model.column("score").unwrap().pg_type.as_deref(), Some(pg_type));
        }
        for pg_type in ["integer; drop table x", "text)--", "int'", " integer", "numeric(a)"] {
            let desc = ModelDescriptor::new("Score", "scores")
                .field(FieldDescriptor::new("ID"))
                .field(FieldDescriptor::new("Score").pg_type(pg_type));
            assert!(
                matches!(Model::resolve(&desc, &NamingStrategy), Err(ModelError::InvalidIdentifier { .. })),
                "{}",
                pg_type
            );
        }
    }

    #[test]
    fn test_lookup_failure_on_untagged_field() {
        let lookup = StaticColumns::new().column("ID", "id");
        let err = Model::resolve(&descriptor(), &lookup).unwrap_err();
        assert!(matches!(err, ModelError::SchemaResolution { ref member, .. } if member == "FullName"));
    }
}
