use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use indexmap::IndexMap;
use oadmin_client::{
    Binding, CallError, CapabilityError, CapabilityNormalizer, ClientError, ClientRegistry,
    ListQuery, ListSource, ResourceClient,
};
use oadmin_core::config::{OadminConfig, ResourcePolicy, VerbPolicy};
use oadmin_core::{Verb, VerbSet};
use serde_json::{Value, json};

/// Full CRUD client that counts calls.
#[derive(Default)]
struct BooksClient {
    calls: AtomicUsize,
}

#[async_trait]
impl ResourceClient for BooksClient {
    fn verbs(&self) -> VerbSet {
        VerbSet::all()
    }

    async fn list(&self, _query: &ListQuery) -> Result<Vec<Value>, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![json!({"id": 1, "title": "Dune"})])
    }

    async fn get(&self, id: &str) -> Result<Value, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({"id": id}))
    }

    async fn create(&self, payload: Value) -> Result<Value, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(payload)
    }

    async fn update(&self, _id: &str, payload: Value) -> Result<Value, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(payload)
    }

    async fn delete(&self, _id: &str) -> Result<(), ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// User-scoped resource: can create, cannot list everything.
#[derive(Default)]
struct CollectionsClient {
    calls: AtomicUsize,
}

#[async_trait]
impl ResourceClient for CollectionsClient {
    fn verbs(&self) -> VerbSet {
        VerbSet::from([Verb::Create])
    }

    async fn create(&self, payload: Value) -> Result<Value, ClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(payload)
    }
}

struct MyCollections;

#[async_trait]
impl ListSource for MyCollections {
    async fn list(&self, _query: &ListQuery) -> Result<Vec<Value>, ClientError> {
        Ok(vec![json!({"id": "c1"}), json!({"id": "c2"})])
    }
}

/// Lists natively, but the backend is down.
struct FailingReviews;

#[async_trait]
impl ResourceClient for FailingReviews {
    fn verbs(&self) -> VerbSet {
        VerbSet::from([Verb::List])
    }

    async fn list(&self, _query: &ListQuery) -> Result<Vec<Value>, ClientError> {
        Err(ClientError::new("service unavailable").with_status(503))
    }
}

fn registry() -> (ClientRegistry, Arc<BooksClient>, Arc<CollectionsClient>) {
    let books = Arc::new(BooksClient::default());
    let collections = Arc::new(CollectionsClient::default());
    let registry = ClientRegistry::new()
        .with_client("books", books.clone())
        .with_client("collections", collections.clone())
        .with_client("reviews", Arc::new(FailingReviews))
        .with_alternative("my_collections", Arc::new(MyCollections));
    (registry, books, collections)
}

fn policies(yaml: &str) -> IndexMap<String, ResourcePolicy> {
    let config: OadminConfig = serde_yaml_ng::from_str(yaml).unwrap();
    config.resources
}

#[tokio::test]
async fn native_verbs_call_through() {
    let (registry, books, _) = registry();
    let normalizer = CapabilityNormalizer::with_defaults(registry);
    let caps = normalizer.normalize("books").unwrap();

    for verb in Verb::ALL {
        assert_eq!(caps.binding(verb), Binding::Native, "{verb}");
    }
    let listed = caps.list(&ListQuery::default()).await.unwrap();
    assert_eq!(listed.len(), 1);
    let created = caps.create(json!({"title": "Emma"})).await.unwrap();
    assert_eq!(created, json!({"title": "Emma"}));
    caps.delete("1").await.unwrap();
    assert_eq!(books.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn declared_list_fallback_is_used() {
    let (registry, _, _) = registry();
    let normalizer = CapabilityNormalizer::new(
        registry,
        &policies("resources:\n  collections:\n    list: { fallback: my_collections }\n"),
    )
    .unwrap();

    let caps = normalizer.normalize("collections").unwrap();
    assert_eq!(
        caps.binding(Verb::List),
        Binding::Fallback("my_collections".to_string())
    );
    let listed = caps.list(&ListQuery::default()).await.unwrap();
    assert_eq!(listed, vec![json!({"id": "c1"}), json!({"id": "c2"})]);
}

#[tokio::test]
async fn missing_list_without_fallback_is_empty() {
    let (registry, _, collections) = registry();
    let caps = CapabilityNormalizer::with_defaults(registry)
        .normalize("collections")
        .unwrap();

    assert_eq!(caps.binding(Verb::List), Binding::Empty);
    assert!(caps.supports(Verb::List));
    let listed = caps.list(&ListQuery::page(1, 20)).await.unwrap();
    assert!(listed.is_empty());
    assert_eq!(collections.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_verbs_are_unsupported_not_substituted() {
    let (registry, _, collections) = registry();
    let caps = CapabilityNormalizer::with_defaults(registry)
        .normalize("collections")
        .unwrap();

    assert_eq!(caps.binding(Verb::Get), Binding::Unsupported);
    assert!(!caps.supports(Verb::Update));
    let err = caps.get("c1").await.unwrap_err();
    assert_eq!(
        err,
        CallError::Unsupported {
            resource: "collections".to_string(),
            verb: Verb::Get,
        }
    );
    assert!(matches!(
        caps.delete("c1").await,
        Err(CallError::Unsupported { .. })
    ));
    assert_eq!(collections.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn native_list_failure_is_reported() {
    let (registry, _, _) = registry();
    let caps = CapabilityNormalizer::with_defaults(registry)
        .normalize("reviews")
        .unwrap();
    let err = caps.list(&ListQuery::default()).await.unwrap_err();
    assert_eq!(err.user_message().as_deref(), Some("service unavailable"));
    match err {
        CallError::Failed(e) => assert_eq!(e.status, Some(503)),
        other => panic!("expected Failed, got {other:?}"),
    }
}

#[test]
fn lookup_is_case_insensitive() {
    let (registry, _, _) = registry();
    let normalizer = CapabilityNormalizer::with_defaults(registry);
    assert_eq!(normalizer.normalize("Books").unwrap().resource(), "books");
    assert_eq!(
        normalizer.normalize("COLLECTIONS").unwrap().resource(),
        "collections"
    );
}

#[test]
fn unknown_resource_is_reported() {
    let (registry, _, _) = registry();
    let normalizer = CapabilityNormalizer::with_defaults(registry);
    assert_eq!(
        normalizer.normalize("magazines").unwrap_err(),
        CapabilityError::UnknownResource("magazines".to_string())
    );
}

#[tokio::test]
async fn disabled_native_verb() {
    let (registry, books, _) = registry();
    let normalizer =
        CapabilityNormalizer::new(registry, &policies("resources:\n  Books:\n    delete: none\n"))
            .unwrap();
    let caps = normalizer.normalize("books").unwrap();
    assert_eq!(caps.binding(Verb::Delete), Binding::Unsupported);
    assert_eq!(caps.binding(Verb::Update), Binding::Native);
    assert!(caps.delete("1").await.is_err());
    assert_eq!(books.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn invalid_policy_reports_every_problem() {
    let (registry, _, _) = registry();
    let yaml = r#"
resources:
  magazines:
    list: native
  collections:
    list: { fallback: all_collections }
    get: native
  books:
    list: empty
    create: empty
"#;
    let err = CapabilityNormalizer::new(registry, &policies(yaml))
        .err()
        .expect("policy should be rejected");
    match err {
        CapabilityError::ConfigInvalid(problems) => {
            assert_eq!(
                problems,
                vec![
                    "magazines: no client is registered under this name",
                    "collections.list: fallback `all_collections` is not a registered alternative",
                    "collections.get: `native` but the client does not implement it",
                    "books.create: `empty` is only allowed for `list`",
                    "books.list: `empty` declared but the client lists natively",
                ]
            );
        }
        other => panic!("expected ConfigInvalid, got {other:?}"),
    }
}

#[test]
fn case_variant_policies_are_reported_as_duplicates() {
    let (registry, _, _) = registry();
    let yaml = r#"
resources:
  books:
    list: native
  Books:
    delete: none
"#;
    let err = CapabilityNormalizer::new(registry, &policies(yaml))
        .err()
        .expect("duplicate policy should be rejected");
    match err {
        CapabilityError::ConfigInvalid(problems) => assert_eq!(
            problems,
            vec!["Books: duplicates the policy already declared as `books`"]
        ),
        other => panic!("expected ConfigInvalid, got {other:?}"),
    }
}

#[test]
fn audit_lists_every_binding() {
    let (registry, _, _) = registry();
    let normalizer = CapabilityNormalizer::new(
        registry,
        &policies("resources:\n  collections:\n    list: { fallback: my_collections }\n"),
    )
    .unwrap();

    let rows: Vec<String> = normalizer
        .audit()
        .iter()
        .filter(|r| r.resource == "collections")
        .map(|r| r.to_string())
        .collect();
    assert_eq!(
        rows,
        vec![
            "collections.list: fallback(my_collections)",
            "collections.get: unsupported",
            "collections.create: native",
            "collections.update: unsupported",
            "collections.delete: unsupported",
        ]
    );
    assert_eq!(normalizer.audit().len(), 15);
}

#[test]
fn policy_values_round_trip_from_config() {
    let p = policies("resources:\n  books:\n    get: native\n");
    assert_eq!(p["books"].get, Some(VerbPolicy::Native));
}
