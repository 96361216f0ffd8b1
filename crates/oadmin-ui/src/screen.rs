use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use log::{debug, warn};
use oadmin_client::{CapabilityNormalizer, ListQuery, ResourceClientCapabilities};
use oadmin_core::config::UiConfig;
use oadmin_core::{Catalog, ResourceDescriptor, Verb};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ScreenError, SubmitError};
use crate::form::{Form, SubmitHandler, SubmitOutcome};
use crate::notify::{Notification, NotificationBus, Topic};
use crate::value::FormRecord;

#[derive(Clone, Default)]
pub struct ScreenOptions {
    /// Record field holding the identifier passed to get/update/delete.
    pub id_field: Option<String>,
    pub bus: Option<Arc<NotificationBus>>,
}

impl ScreenOptions {
    pub fn from_config(config: &UiConfig, bus: Option<Arc<NotificationBus>>) -> Self {
        Self {
            id_field: Some(config.id_field.clone()),
            bus,
        }
    }
}

/// Result of opening a screen by resource name.
pub enum ScreenView {
    /// No client is registered under the name. Informational, not an error.
    NotFound { name: String },
    Ready(ResourceScreen),
}

impl ScreenView {
    pub fn screen(&self) -> Option<&ResourceScreen> {
        match self {
            ScreenView::Ready(screen) => Some(screen),
            ScreenView::NotFound { .. } => None,
        }
    }

    pub fn into_screen(self) -> Option<ResourceScreen> {
        match self {
            ScreenView::Ready(screen) => Some(screen),
            ScreenView::NotFound { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListState {
    NotLoaded,
    Loading,
    Loaded(Vec<Value>),
    /// The list call failed; the message is shown in place of rows.
    Failed(String),
}

/// Which actions the screen offers. Unsupported verbs are disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Actions {
    pub create: bool,
    pub view: bool,
    pub edit: bool,
    pub delete: bool,
}

struct CreateHandler<'a> {
    caps: &'a ResourceClientCapabilities,
}

#[async_trait]
impl<'a> SubmitHandler for CreateHandler<'a> {
    async fn submit(&self, record: FormRecord) -> Result<(), SubmitError> {
        self.caps.create(record.to_json()).await?;
        Ok(())
    }
}

struct UpdateHandler<'a> {
    caps: &'a ResourceClientCapabilities,
    id: &'a str,
}

#[async_trait]
impl<'a> SubmitHandler for UpdateHandler<'a> {
    async fn submit(&self, record: FormRecord) -> Result<(), SubmitError> {
        self.caps.update(self.id, record.to_json()).await?;
        Ok(())
    }
}

/// List plus create/edit UI state for one resource, composed from the
/// catalog entry and the capability surface.
///
/// Every asynchronous call captures the screen generation when it starts;
/// results that arrive after [`ResourceScreen::unmount`] are dropped
/// without touching list state, edit state or notifications.
pub struct ResourceScreen {
    resource: ResourceDescriptor,
    caps: ResourceClientCapabilities,
    form: Form,
    id_field: String,
    bus: Option<Arc<NotificationBus>>,
    list: Mutex<ListState>,
    editing: Mutex<Option<String>>,
    mounted: AtomicBool,
    generation: AtomicU64,
    list_seq: AtomicU64,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ResourceScreen {
    pub fn open(catalog: &Catalog, normalizer: &CapabilityNormalizer, name: &str) -> ScreenView {
        Self::open_with(catalog, normalizer, name, ScreenOptions::default())
    }

    pub fn open_with(
        catalog: &Catalog,
        normalizer: &CapabilityNormalizer,
        name: &str,
        options: ScreenOptions,
    ) -> ScreenView {
        let caps = match normalizer.normalize(name) {
            Ok(caps) => caps,
            Err(err) => {
                debug!("screen not found: {err}");
                return ScreenView::NotFound {
                    name: name.to_string(),
                };
            }
        };

        let resource = catalog
            .find(caps.resource())
            .cloned()
            .unwrap_or_else(|| {
                debug!("`{}` has a client but no catalog entry", caps.resource());
                ResourceDescriptor::new(caps.resource(), None)
            });
        let form = Form::new(resource.editable_fields());

        ScreenView::Ready(Self {
            resource,
            caps,
            form,
            id_field: options.id_field.unwrap_or_else(|| "id".to_string()),
            bus: options.bus,
            list: Mutex::new(ListState::NotLoaded),
            editing: Mutex::new(None),
            mounted: AtomicBool::new(true),
            generation: AtomicU64::new(0),
            list_seq: AtomicU64::new(0),
        })
    }

    pub fn name(&self) -> &str {
        self.caps.resource()
    }

    pub fn resource(&self) -> &ResourceDescriptor {
        &self.resource
    }

    pub fn capabilities(&self) -> &ResourceClientCapabilities {
        &self.caps
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn list_state(&self) -> ListState {
        lock(&self.list).clone()
    }

    /// Identifier of the record currently loaded for editing.
    pub fn editing(&self) -> Option<String> {
        lock(&self.editing).clone()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }

    pub fn actions(&self) -> Actions {
        let can = |verb| self.caps.supports(verb);
        Actions {
            create: can(Verb::Create),
            view: can(Verb::Get),
            edit: can(Verb::Get) && can(Verb::Update),
            delete: can(Verb::Delete),
        }
    }

    /// Identifier of a list row, read from the configured id field.
    pub fn record_id(&self, record: &Value) -> Option<String> {
        match record.get(&self.id_field)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Stop applying results. Calls still in flight complete but are ignored.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
        self.generation.fetch_add(1, Ordering::SeqCst);
        debug!("unmounted screen for `{}`", self.name());
    }

    fn ticket(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    fn is_current(&self, ticket: u64) -> bool {
        self.is_mounted() && self.generation.load(Ordering::SeqCst) == ticket
    }

    fn notify(&self, topic: Topic, message: impl Into<String>) {
        if let Some(bus) = &self.bus {
            bus.publish(Notification::new(topic, self.name(), message));
        }
    }

    pub async fn refresh(&self) -> bool {
        self.refresh_with(&ListQuery::default()).await
    }

    /// Load the list. Returns `false` if the result was discarded because
    /// the screen was unmounted or a newer refresh started meanwhile.
    pub async fn refresh_with(&self, query: &ListQuery) -> bool {
        if !self.is_mounted() {
            return false;
        }
        let ticket = self.ticket();
        let seq = self.list_seq.fetch_add(1, Ordering::SeqCst) + 1;
        *lock(&self.list) = ListState::Loading;

        let result = self.caps.list(query).await;

        if !self.is_current(ticket) || self.list_seq.load(Ordering::SeqCst) != seq {
            warn!("discarding stale list response for `{}`", self.name());
            return false;
        }
        let state = match result {
            Ok(rows) => {
                debug!("loaded {} `{}` record(s)", rows.len(), self.name());
                ListState::Loaded(rows)
            }
            Err(err) => {
                let message = err
                    .user_message()
                    .unwrap_or_else(|| format!("Could not load {}", self.name()));
                self.notify(Topic::Failed, message.clone());
                ListState::Failed(message)
            }
        };
        *lock(&self.list) = state;
        true
    }

    /// Submit the form as a new record. Ignored once the screen is
    /// unmounted.
    pub async fn submit_create(&self) -> SubmitOutcome {
        if !self.is_mounted() {
            debug!("create ignored: `{}` screen is unmounted", self.name());
            return SubmitOutcome::Ignored;
        }
        let ticket = self.ticket();
        let handler = CreateHandler { caps: &self.caps };
        let outcome = self.form.submit(&handler).await;
        if self.is_current(ticket) {
            match &outcome {
                SubmitOutcome::Submitted => {
                    *lock(&self.editing) = None;
                    self.notify(Topic::Created, format!("Created {}", self.name()));
                }
                SubmitOutcome::Failed(message) => self.notify(Topic::Failed, message.clone()),
                SubmitOutcome::Ignored | SubmitOutcome::Invalid(_) => {}
            }
        } else {
            warn!("discarding stale create result for `{}`", self.name());
        }
        outcome
    }

    /// Fetch a record and load it into the form for editing. Returns
    /// `Ok(false)` if the screen is unmounted, before or while the record
    /// is fetched.
    pub async fn begin_edit(&self, id: &str) -> Result<bool, ScreenError> {
        if !self.is_mounted() {
            return Ok(false);
        }
        let ticket = self.ticket();
        let result = self.caps.get(id).await;
        if !self.is_current(ticket) {
            warn!("discarding stale record `{id}` for `{}`", self.name());
            return Ok(false);
        }
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                if let Some(message) = err.user_message() {
                    self.notify(Topic::Failed, message);
                }
                return Err(err.into());
            }
        };
        self.form.load(&record)?;
        *lock(&self.editing) = Some(id.to_string());
        Ok(true)
    }

    /// Drop the record under edit and clear the form.
    pub fn cancel_edit(&self) {
        *lock(&self.editing) = None;
        self.form.clear();
    }

    /// Submit the form as an update of the record under edit. Ignored when
    /// nothing is being edited or the screen is unmounted.
    pub async fn submit_update(&self) -> SubmitOutcome {
        if !self.is_mounted() {
            debug!("update ignored: `{}` screen is unmounted", self.name());
            return SubmitOutcome::Ignored;
        }
        let Some(id) = self.editing() else {
            debug!("update ignored: no `{}` record is being edited", self.name());
            return SubmitOutcome::Ignored;
        };
        let ticket = self.ticket();
        let handler = UpdateHandler {
            caps: &self.caps,
            id: &id,
        };
        let outcome = self.form.submit(&handler).await;
        if self.is_current(ticket) {
            match &outcome {
                SubmitOutcome::Submitted => {
                    *lock(&self.editing) = None;
                    self.notify(Topic::Updated, format!("Updated {} {id}", self.name()));
                }
                SubmitOutcome::Failed(message) => self.notify(Topic::Failed, message.clone()),
                SubmitOutcome::Ignored | SubmitOutcome::Invalid(_) => {}
            }
        } else {
            warn!("discarding stale update result for `{}`", self.name());
        }
        outcome
    }

    /// Delete a record and drop it from the loaded list. Returns
    /// `Ok(false)` without calling the backend once unmounted, and also
    /// when the result arrives after unmount.
    pub async fn delete(&self, id: &str) -> Result<bool, ScreenError> {
        if !self.is_mounted() {
            debug!("delete of `{id}` ignored: `{}` screen is unmounted", self.name());
            return Ok(false);
        }
        let ticket = self.ticket();
        let result = self.caps.delete(id).await;
        if !self.is_current(ticket) {
            warn!("discarding stale delete result for `{}`", self.name());
            return result.map(|()| false).map_err(Into::into);
        }
        if let Err(err) = result {
            if let Some(message) = err.user_message() {
                self.notify(Topic::Failed, message);
            }
            return Err(err.into());
        }

        {
            let mut list = lock(&self.list);
            if let ListState::Loaded(rows) = &mut *list {
                rows.retain(|row| self.record_id(row).as_deref() != Some(id));
            }
        }
        let was_editing = self.editing().as_deref() == Some(id);
        if was_editing {
            self.cancel_edit();
        }
        self.notify(Topic::Deleted, format!("Deleted {} {id}", self.name()));
        Ok(true)
    }
}
