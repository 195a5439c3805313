//! Model registry. Filled during startup (`&mut self`), then shared read-only behind an `Arc`.
//! Registering the same name twice is rejected.

use crate::error::ModelError;
use crate::model::meta::{ModelDescriptor, Record};
use crate::model::naming::{NamingStrategy, SchemaLookup};
use crate::model::Model;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone, Debug, Default)]
pub struct ModelRegistry {
    models: Vec<Arc<Model>>,
    by_name: HashMap<String, usize>,
    by_type: HashMap<TypeId, usize>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        ModelRegistry::default()
    }

    /// Resolve and register a descriptor.
    pub fn register(
        &mut self,
        descriptor: &ModelDescriptor,
        lookup: &dyn SchemaLookup,
    ) -> Result<Arc<Model>, ModelError> {
        if self.by_name.contains_key(&descriptor.name) {
            return Err(ModelError::DuplicateModel(descriptor.name.clone()));
        }
        let model = Arc::new(Model::resolve(descriptor, lookup)?);
        tracing::info!(
            model = %model.name,
            table = %model.table,
            soft_delete = model.meta.soft_deleted.is_some(),
            "registered model"
        );
        self.by_name.insert(model.name.clone(), self.models.len());
        self.models.push(model.clone());
        Ok(model)
    }

    /// Register a [`Record`] type with snake_case column naming.
    pub fn register_record<T: Record>(&mut self) -> Result<Arc<Model>, ModelError> {
        self.register_record_with::<T>(&NamingStrategy)
    }

    pub fn register_record_with<T: Record>(&mut self, lookup: &dyn SchemaLookup) -> Result<Arc<Model>, ModelError> {
        let descriptor = T::descriptor();
        if self.by_type.contains_key(&TypeId::of::<T>()) {
            return Err(ModelError::DuplicateModel(descriptor.name));
        }
        let model = self.register(&descriptor, lookup)?;
        self.by_type.insert(TypeId::of::<T>(), self.models.len() - 1);
        Ok(model)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Model>> {
        self.by_name.get(name).map(|&i| &self.models[i])
    }

    pub fn get_record<T: Record>(&self) -> Option<&Arc<Model>> {
        self.by_type.get(&TypeId::of::<T>()).map(|&i| &self.models[i])
    }

    /// Model names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.models.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::meta::FieldDescriptor;

    struct User;

    impl Record for User {
        fn descriptor() -> ModelDescriptor {
            ModelDescriptor::new("User", "users")
                .field(FieldDescriptor::new("ID"))
                .field(FieldDescriptor::new("DeletedAt").tags("soft_delete_field"))
        }
    }

    struct Post;

    impl Record for Post {
        fn descriptor() -> ModelDescriptor {
            ModelDescriptor::new("Post", "posts").field(FieldDescriptor::new("ID"))
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ModelRegistry::new();
        registry.register_record::<User>().unwrap();
        registry.register_record::<Post>().unwrap();
        assert_eq!(registry.names(), ["User", "Post"]);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("User").unwrap().table, "users");
        assert_eq!(registry.get_record::<Post>().unwrap().name, "Post");
        assert!(registry.get("Comment").is_none());
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = ModelRegistry::new();
        registry.register_record::<User>().unwrap();
        assert_eq!(
            registry.register_record::<User>().unwrap_err(),
            ModelError::DuplicateModel("User".into())
        );
        assert_eq!(
            registry.register(&User::descriptor(), &NamingStrategy).unwrap_err(),
            ModelError::DuplicateModel("User".into())
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_failed_registration_leaves_registry_unchanged() {
        let mut registry = ModelRegistry::new();
        let bad = ModelDescriptor::new("Bad", "bad").field(FieldDescriptor::new("Name"));
        assert!(registry.register(&bad, &NamingStrategy).is_err());
        assert!(registry.is_empty());
    }
}
