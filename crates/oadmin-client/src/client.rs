use async_trait::async_trait;
use indexmap::IndexMap;
use oadmin_core::{Verb, VerbSet};
use serde::Serialize;
use serde_json::Value;

use crate::error::ClientError;

/// Paging and filtering for list calls. Clients are free to ignore it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub filters: IndexMap<String, String>,
}

impl ListQuery {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
            ..Default::default()
        }
    }
}

/// A possibly partial client for one backend resource, supplied by the
/// transport layer. Implement the verbs the backend has and declare them
/// in `verbs`; the rest keep their default bodies and are never called
/// through the capability surface.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Verbs this client implements.
    fn verbs(&self) -> VerbSet;

    async fn list(&self, _query: &ListQuery) -> Result<Vec<Value>, ClientError> {
        Err(ClientError::not_implemented(Verb::List))
    }

    async fn get(&self, _id: &str) -> Result<Value, ClientError> {
        Err(ClientError::not_implemented(Verb::Get))
    }

    async fn create(&self, _payload: Value) -> Result<Value, ClientError> {
        Err(ClientError::not_implemented(Verb::Create))
    }

    async fn update(&self, _id: &str, _payload: Value) -> Result<Value, ClientError> {
        Err(ClientError::not_implemented(Verb::Update))
    }

    async fn delete(&self, _id: &str) -> Result<(), ClientError> {
        Err(ClientError::not_implemented(Verb::Delete))
    }
}

/// A named stand-in list call, such as "my collections" for a
/// user-scoped resource with no global listing.
#[async_trait]
pub trait ListSource: Send + Sync {
    async fn list(&self, query: &ListQuery) -> Result<Vec<Value>, ClientError>;
}
