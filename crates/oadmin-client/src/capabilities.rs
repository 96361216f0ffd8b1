use std::fmt;
use std::sync::Arc;

use oadmin_core::Verb;
use serde::Serialize;
use serde_json::Value;

use crate::client::{ListQuery, ListSource, ResourceClient};
use crate::error::CallError;

/// What one verb of a resource is bound to, for auditing and for
/// deciding which UI actions to enable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "source", rename_all = "snake_case")]
pub enum Binding {
    Native,
    Fallback(String),
    Empty,
    Unsupported,
}

impl Binding {
    pub fn is_callable(&self) -> bool {
        !matches!(self, Binding::Unsupported)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Native => f.write_str("native"),
            Binding::Fallback(name) => write!(f, "fallback({name})"),
            Binding::Empty => f.write_str("empty"),
            Binding::Unsupported => f.write_str("unsupported"),
        }
    }
}

/// One row of a capability audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditRow {
    pub resource: String,
    pub verb: Verb,
    pub binding: Binding,
}

impl fmt::Display for AuditRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.resource, self.verb, self.binding)
    }
}

#[derive(Clone)]
pub(crate) enum ListCall {
    Native,
    Fallback(String, Arc<dyn ListSource>),
    Empty,
}

/// The uniform list/get/create/update/delete surface of one resource.
///
/// Native verbs call straight through to the underlying client. `list`
/// always resolves to something; other verbs without a binding fail
/// with [`CallError::Unsupported`] before any call is made.
#[derive(Clone)]
pub struct ResourceClientCapabilities {
    resource: String,
    client: Arc<dyn ResourceClient>,
    list: ListCall,
    get: bool,
    create: bool,
    update: bool,
    delete: bool,
}

impl fmt::Debug for ResourceClientCapabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("ResourceClientCapabilities");
        s.field("resource", &self.resource);
        for verb in Verb::ALL {
            s.field(verb.as_str(), &self.binding(verb));
        }
        s.finish()
    }
}

impl ResourceClientCapabilities {
    pub(crate) fn new(
        resource: String,
        client: Arc<dyn ResourceClient>,
        list: ListCall,
        enabled: impl Fn(Verb) -> bool,
    ) -> Self {
        Self {
            resource,
            client,
            list,
            get: enabled(Verb::Get),
            create: enabled(Verb::Create),
            update: enabled(Verb::Update),
            delete: enabled(Verb::Delete),
        }
    }

    /// Registered name of the resource.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn binding(&self, verb: Verb) -> Binding {
        let native = |on: bool| {
            if on {
                Binding::Native
            } else {
                Binding::Unsupported
            }
        };
        match verb {
            Verb::List => match &self.list {
                ListCall::Native => Binding::Native,
                ListCall::Fallback(name, _) => Binding::Fallback(name.clone()),
                ListCall::Empty => Binding::Empty,
            },
            Verb::Get => native(self.get),
            Verb::Create => native(self.create),
            Verb::Update => native(self.update),
            Verb::Delete => native(self.delete),
        }
    }

    pub fn supports(&self, verb: Verb) -> bool {
        self.binding(verb).is_callable()
    }

    pub fn audit(&self) -> Vec<AuditRow> {
        Verb::ALL
            .into_iter()
            .map(|verb| AuditRow {
                resource: self.resource.clone(),
                verb,
                binding: self.binding(verb),
            })
            .collect()
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, CallError> {
        match &self.list {
            ListCall::Native => Ok(self.client.list(query).await?),
            ListCall::Fallback(_, source) => Ok(source.list(query).await?),
            ListCall::Empty => Ok(Vec::new()),
        }
    }

    pub async fn get(&self, id: &str) -> Result<Value, CallError> {
        self.ensure(Verb::Get)?;
        Ok(self.client.get(id).await?)
    }

    pub async fn create(&self, payload: Value) -> Result<Value, CallError> {
        self.ensure(Verb::Create)?;
        Ok(self.client.create(payload).await?)
    }

    pub async fn update(&self, id: &str, payload: Value) -> Result<Value, CallError> {
        self.ensure(Verb::Update)?;
        Ok(self.client.update(id, payload).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), CallError> {
        self.ensure(Verb::Delete)?;
        Ok(self.client.delete(id).await?)
    }

    fn ensure(&self, verb: Verb) -> Result<(), CallError> {
        if self.supports(verb) {
            Ok(())
        } else {
            Err(CallError::Unsupported {
                resource: self.resource.clone(),
                verb,
            })
        }
    }
}
