//! Record descriptors and special-field metadata (soft delete, created/updated timestamps).

use crate::error::ModelError;
use crate::model::naming::SchemaLookup;

/// Tag marking the soft-delete column (a nullable deletion timestamp).
pub const SOFT_DELETE_FIELD_TAG: &str = "soft_delete_field";
/// Tag marking the column stamped on insert.
pub const CREATE_TIME_FIELD_TAG: &str = "create_time_field";
/// Tag marking the column stamped on insert and update.
pub const UPDATE_TIME_FIELD_TAG: &str = "update_time_field";
/// Separator between tags in a field's tag string.
pub const TAG_SEPARATOR: char = ',';

/// One declared member of a record type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub member: String,
    /// Comma-separated marker tags, e.g. `"soft_delete_field"`.
    pub tags: Option<String>,
    /// PostgreSQL type for parameter casts (e.g. `"bigint"`, `"timestamptz"`).
    pub pg_type: Option<String>,
}

impl FieldDescriptor {
    pub fn new(member: impl Into<String>) -> Self {
        FieldDescriptor {
            member: member.into(),
            tags: None,
            pg_type: None,
        }
    }

    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn pg_type(mut self, pg_type: impl Into<String>) -> Self {
        self.pg_type = Some(pg_type.into());
        self
    }

    fn tag_tokens(&self) -> impl Iterator<Item = &str> {
        self.tags
            .as_deref()
            .unwrap_or("")
            .split(TAG_SEPARATOR)
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Static description of a record type, declared once at registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Name used in routes (`/crud/{name}`).
    pub name: String,
    pub table: String,
    pub schema: Option<String>,
    /// Primary key column. Defaults to `id`.
    pub primary_key: String,
    pub fields: Vec<FieldDescriptor>,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        ModelDescriptor {
            name: name.into(),
            table: table.into(),
            schema: None,
            primary_key: "id".into(),
            fields: Vec::new(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }
}

/// Implemented by record types that describe themselves.
pub trait Record: 'static {
    fn descriptor() -> ModelDescriptor;
}

/// A special field: struct member and its column.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelField {
    pub name: String,
    pub column: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ModelMeta {
    pub soft_deleted: Option<ModelField>,
    pub created_at: Option<ModelField>,
    pub updated_at: Option<ModelField>,
}

/// Scan tagged fields. The first field claiming a marker wins; later claims are ignored.
pub fn resolve(descriptor: &ModelDescriptor, lookup: &dyn SchemaLookup) -> Result<ModelMeta, ModelError> {
    let mut meta = ModelMeta::default();
    for field in &descriptor.fields {
        for tag in field.tag_tokens() {
            let slot = match tag {
                SOFT_DELETE_FIELD_TAG => &mut meta.soft_deleted,
                CREATE_TIME_FIELD_TAG => &mut meta.created_at,
                UPDATE_TIME_FIELD_TAG => &mut meta.updated_at,
                other => {
                    tracing::warn!(model = %descriptor.name, field = %field.member, tag = %other, "ignoring unknown field tag");
                    continue;
                }
            };
            if let Some(existing) = slot.as_ref() {
                tracing::debug!(model = %descriptor.name, field = %field.member, tag, claimed_by = %existing.name, "tag already claimed");
                continue;
            }
            let column = lookup
                .column_name(&field.member)
                .map_err(|reason| ModelError::SchemaResolution {
                    model: descriptor.name.clone(),
                    member: field.member.clone(),
                    reason,
                })?;
            *slot = Some(ModelField {
                name: field.member.clone(),
                column,
            });
        }
    }
    Ok(meta)
}
