use std::sync::Arc;

use indexmap::IndexMap;

use crate::client::{ListSource, ResourceClient};

/// The fixed set of resource clients and named list alternatives known to
/// the application. Names match case-insensitively.
#[derive(Clone, Default)]
pub struct ClientRegistry {
    clients: IndexMap<String, Arc<dyn ResourceClient>>,
    alternatives: IndexMap<String, Arc<dyn ListSource>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the client for a resource, replacing any client whose
    /// name differs only in case.
    pub fn register(&mut self, name: impl Into<String>, client: Arc<dyn ResourceClient>) {
        let name = name.into();
        if let Some(existing) = find_key(&self.clients, &name).map(str::to_string) {
            log::warn!("client `{existing}` replaced by `{name}`");
            self.clients.shift_remove(&existing);
        }
        self.clients.insert(name, client);
    }

    /// Register a named alternative list call for use in fallback policies.
    pub fn register_alternative(&mut self, name: impl Into<String>, source: Arc<dyn ListSource>) {
        let name = name.into();
        if let Some(existing) = find_key(&self.alternatives, &name).map(str::to_string) {
            self.alternatives.shift_remove(&existing);
        }
        self.alternatives.insert(name, source);
    }

    pub fn with_client(mut self, name: impl Into<String>, client: Arc<dyn ResourceClient>) -> Self {
        self.register(name, client);
        self
    }

    pub fn with_alternative(
        mut self,
        name: impl Into<String>,
        source: Arc<dyn ListSource>,
    ) -> Self {
        self.register_alternative(name, source);
        self
    }

    /// Case-insensitive exact match. Returns the registered name with the client.
    pub fn lookup(&self, name: &str) -> Option<(&str, &Arc<dyn ResourceClient>)> {
        let key = find_key(&self.clients, name)?;
        self.clients.get_key_value(key).map(|(k, v)| (k.as_str(), v))
    }

    pub fn alternative(&self, name: &str) -> Option<&Arc<dyn ListSource>> {
        find_key(&self.alternatives, name).and_then(|key| self.alternatives.get(key))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clients.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

fn find_key<'a, V>(map: &'a IndexMap<String, V>, name: &str) -> Option<&'a str> {
    let wanted = name.to_lowercase();
    map.keys()
        .find(|k| k.to_lowercase() == wanted)
        .map(String::as_str)
}
