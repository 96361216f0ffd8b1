use std::sync::Arc;

use indexmap::IndexMap;
use oadmin_core::Verb;
use oadmin_core::config::{OadminConfig, ResourcePolicy, VerbPolicy};

use crate::capabilities::{AuditRow, ListCall, ResourceClientCapabilities};
use crate::client::ResourceClient;
use crate::error::CapabilityError;
use crate::registry::ClientRegistry;

/// Maps resource names to uniform capability surfaces, applying the
/// declared per-resource policy. The policy is checked against the
/// registry once, at construction.
pub struct CapabilityNormalizer {
    registry: ClientRegistry,
    /// Keyed by registered client name.
    policies: IndexMap<String, ResourcePolicy>,
}

impl CapabilityNormalizer {
    /// Normalizer with the default rule for every resource.
    pub fn with_defaults(registry: ClientRegistry) -> Self {
        Self {
            registry,
            policies: IndexMap::new(),
        }
    }

    /// Validate `policies` against `registry`. Every problem found is
    /// reported, not just the first.
    pub fn new(
        registry: ClientRegistry,
        policies: &IndexMap<String, ResourcePolicy>,
    ) -> Result<Self, CapabilityError> {
        let mut problems = Vec::new();
        let mut resolved = IndexMap::new();
        // Registered name to the key that first declared a policy for it.
        let mut declared_as: IndexMap<&str, &str> = IndexMap::new();

        for (name, policy) in policies {
            problems.extend(policy.problems(name));
            let Some((registered, client)) = registry.lookup(name) else {
                problems.push(format!("{name}: no client is registered under this name"));
                continue;
            };
            if let Some(first) = declared_as.get(registered) {
                problems.push(format!(
                    "{name}: duplicates the policy already declared as `{first}`"
                ));
                continue;
            }
            declared_as.insert(registered, name.as_str());
            problems.extend(check_against_client(name, policy, client, &registry));
            resolved.insert(registered.to_string(), policy.clone());
        }

        if !problems.is_empty() {
            return Err(CapabilityError::ConfigInvalid(problems));
        }

        log::debug!(
            "capability policy accepted for {} of {} resources",
            resolved.len(),
            registry.len()
        );
        Ok(Self {
            registry,
            policies: resolved,
        })
    }

    pub fn from_config(
        registry: ClientRegistry,
        config: &OadminConfig,
    ) -> Result<Self, CapabilityError> {
        Self::new(registry, &config.resources)
    }

    pub fn registry(&self) -> &ClientRegistry {
        &self.registry
    }

    /// Build the capability surface for a resource name.
    pub fn normalize(&self, name: &str) -> Result<ResourceClientCapabilities, CapabilityError> {
        let (registered, client) = self
            .registry
            .lookup(name)
            .ok_or_else(|| CapabilityError::UnknownResource(name.to_string()))?;
        let policy = self.policies.get(registered).cloned().unwrap_or_default();
        let native = client.verbs();

        let list = match policy.list {
            Some(VerbPolicy::Native) => ListCall::Native,
            Some(VerbPolicy::Fallback(ref alt)) => match self.registry.alternative(alt) {
                Some(source) => ListCall::Fallback(alt.clone(), Arc::clone(source)),
                None => ListCall::Empty,
            },
            Some(VerbPolicy::Empty | VerbPolicy::Disabled) => ListCall::Empty,
            None if native.contains(Verb::List) => ListCall::Native,
            None => ListCall::Empty,
        };

        let enabled = |verb: Verb| match policy.verb(verb) {
            Some(VerbPolicy::Native) => true,
            Some(_) => false,
            None => native.contains(verb),
        };

        let caps = ResourceClientCapabilities::new(
            registered.to_string(),
            Arc::clone(client),
            list,
            enabled,
        );
        log::debug!("normalized `{name}`: {caps:?}");
        Ok(caps)
    }

    /// Bindings of every registered resource, in registration order.
    pub fn audit(&self) -> Vec<AuditRow> {
        self.registry
            .names()
            .filter_map(|name| self.normalize(name).ok())
            .flat_map(|caps| caps.audit())
            .collect()
    }
}

fn check_against_client(
    name: &str,
    policy: &ResourcePolicy,
    client: &Arc<dyn ResourceClient>,
    registry: &ClientRegistry,
) -> Vec<String> {
    let native = client.verbs();
    let mut problems = Vec::new();

    for verb in Verb::ALL {
        match policy.verb(verb) {
            Some(VerbPolicy::Native) if !native.contains(verb) => {
                problems.push(format!(
                    "{name}.{verb}: `native` but the client does not implement it"
                ));
            }
            Some(policy @ (VerbPolicy::Fallback(_) | VerbPolicy::Empty))
                if verb == Verb::List && native.contains(Verb::List) =>
            {
                problems.push(format!(
                    "{name}.list: `{policy}` declared but the client lists natively"
                ));
            }
            Some(VerbPolicy::Fallback(alt)) if registry.alternative(alt).is_none() => {
                problems.push(format!(
                    "{name}.{verb}: fallback `{alt}` is not a registered alternative"
                ));
            }
            _ => {}
        }
    }

    problems
}
