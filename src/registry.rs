//! Service registry holding all definitions.

use indexmap::IndexMap;

use crate::definition::ServiceDefinition;
use crate::error::{DiError, DiResult};
use crate::value::Value;

/// Mapping from service name to definition, in registration order.
///
/// The registry performs no resolution; it only owns the definitions.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    definitions: IndexMap<String, ServiceDefinition>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new definition, failing if the name is taken.
    pub fn add(&mut self, name: impl Into<String>) -> DiResult<&mut ServiceDefinition> {
        let name = name.into();
        if self.definitions.contains_key(&name) {
            return Err(DiError::DuplicateService(name));
        }
        Ok(self.definitions.entry(name).or_default())
    }

    /// Removes a definition; unknown names are ignored. Order of the rest is kept.
    pub fn remove(&mut self, name: &str) -> Option<ServiceDefinition> {
        self.definitions.shift_remove(name)
    }

    pub fn get(&self, name: &str) -> DiResult<&ServiceDefinition> {
        self.definitions
            .get(name)
            .ok_or_else(|| DiError::MissingService(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> DiResult<&mut ServiceDefinition> {
        self.definitions
            .get_mut(name)
            .ok_or_else(|| DiError::MissingService(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Service names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ServiceDefinition)> {
        self.definitions.iter().map(|(name, def)| (name.as_str(), def))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut ServiceDefinition)> {
        self.definitions.iter_mut().map(|(name, def)| (name.as_str(), def))
    }

    /// Services carrying `tag`, mapped to the tag's value.
    pub fn find_by_tag(&self, tag: &str) -> IndexMap<String, Value> {
        self.definitions
            .iter()
            .filter_map(|(name, def)| def.tags.get(tag).map(|value| (name.clone(), value.clone())))
            .collect()
    }
}
