use std::fmt;
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::verb::Verb;
use crate::{DEFAULT_SCHEMA_PREFIX, DEFAULT_TAG};

/// Top-level project configuration loaded from `.oadmin.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OadminConfig {
    pub input: String,
    pub catalog: CatalogConfig,
    pub ui: UiConfig,
    /// Capability policy per resource name.
    pub resources: IndexMap<String, ResourcePolicy>,
}

impl Default for OadminConfig {
    fn default() -> Self {
        Self {
            input: "openapi.json".to_string(),
            catalog: CatalogConfig::default(),
            ui: UiConfig::default(),
            resources: IndexMap::new(),
        }
    }
}

/// How the catalog groups operations and finds schemas.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub schema_prefix: String,
    pub default_tag: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            schema_prefix: DEFAULT_SCHEMA_PREFIX.to_string(),
            default_tag: DEFAULT_TAG.to_string(),
        }
    }
}

/// Resource screen options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Record field holding the identifier passed to get/update/delete.
    pub id_field: String,
    /// Number of notifications kept for diagnostics.
    pub notification_history: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            id_field: "id".to_string(),
            notification_history: 50,
        }
    }
}

/// What a verb of a resource is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbPolicy {
    /// The client's own implementation.
    Native,
    /// A named alternative list call registered by the integrator.
    Fallback(String),
    /// An always-empty list.
    Empty,
    /// Explicitly unsupported, even when the client implements it.
    #[serde(rename = "none")]
    Disabled,
}

impl fmt::Display for VerbPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerbPolicy::Native => f.write_str("native"),
            VerbPolicy::Fallback(name) => write!(f, "fallback({name})"),
            VerbPolicy::Empty => f.write_str("empty"),
            VerbPolicy::Disabled => f.write_str("none"),
        }
    }
}

/// Declared policy for the five verbs of one resource. Unset verbs use
/// the default rule: native when the client has it, otherwise an empty
/// list for `list` and unsupported for the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResourcePolicy {
    pub list: Option<VerbPolicy>,
    pub get: Option<VerbPolicy>,
    pub create: Option<VerbPolicy>,
    pub update: Option<VerbPolicy>,
    pub delete: Option<VerbPolicy>,
}

impl ResourcePolicy {
    pub fn verb(&self, verb: Verb) -> Option<&VerbPolicy> {
        match verb {
            Verb::List => self.list.as_ref(),
            Verb::Get => self.get.as_ref(),
            Verb::Create => self.create.as_ref(),
            Verb::Update => self.update.as_ref(),
            Verb::Delete => self.delete.as_ref(),
        }
    }

    /// Problems detectable without knowing the clients: only `list` may
    /// use a fallback or the empty list.
    pub fn problems(&self, resource: &str) -> Vec<String> {
        Verb::ALL
            .into_iter()
            .filter(|v| *v != Verb::List)
            .filter_map(|verb| match self.verb(verb) {
                Some(policy @ (VerbPolicy::Fallback(_) | VerbPolicy::Empty)) => Some(format!(
                    "{resource}.{verb}: `{policy}` is only allowed for `list`"
                )),
                _ => None,
            })
            .collect()
    }
}

impl OadminConfig {
    /// Check every resource policy for verb-level problems.
    pub fn check_policies(&self) -> Result<(), ConfigError> {
        let problems: Vec<String> = self
            .resources
            .iter()
            .flat_map(|(name, policy)| policy.problems(name))
            .collect();
        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::InvalidPolicy(problems))
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oadmin.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OadminConfig>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: OadminConfig =
        serde_yaml_ng::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oadmin configuration
input: openapi.json

catalog:
  schema_prefix: "models."   # resource schema = <prefix><tag>, e.g. models.books
  default_tag: Other         # resource for operations without tags

ui:
  id_field: id
  notification_history: 50

# Capability policy per resource. Each verb (list, get, create, update,
# delete) is one of: native | none | empty (list only) |
# { fallback: <alternative> } (list only).
resources: {}
  # collections:
  #   list: { fallback: my_collections }
  # subscriptions:
  #   delete: none
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OadminConfig::default();
        assert_eq!(config.input, "openapi.json");
        assert_eq!(config.catalog.schema_prefix, "models.");
        assert_eq!(config.catalog.default_tag, "Other");
        assert_eq!(config.ui.id_field, "id");
        assert!(config.resources.is_empty());
    }

    #[test]
    fn test_default_content_parses() {
        let config: OadminConfig = serde_yaml_ng::from_str(default_config_content()).unwrap();
        assert_eq!(config.catalog.schema_prefix, "models.");
        assert!(config.check_policies().is_ok());
    }

    #[test]
    fn test_parse_resource_policies() {
        let yaml = r#"
input: api.json
resources:
  collections:
    list:
      fallback: my_collections
    delete: none
  users:
    list: native
    get: empty
"#;
        let config: OadminConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.input, "api.json");
        let collections = &config.resources["collections"];
        assert_eq!(
            collections.list,
            Some(VerbPolicy::Fallback("my_collections".to_string()))
        );
        assert_eq!(collections.delete, Some(VerbPolicy::Disabled));
        assert_eq!(collections.get, None);

        match config.check_policies() {
            Err(ConfigError::InvalidPolicy(problems)) => {
                assert_eq!(problems, vec!["users.get: `empty` is only allowed for `list`"]);
            }
            other => panic!("expected policy error, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_verb_rejected() {
        let yaml = "resources:\n  books:\n    purge: none\n";
        assert!(serde_yaml_ng::from_str::<OadminConfig>(yaml).is_err());
    }
}
