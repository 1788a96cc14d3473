//! State holders the engine reads snapshots from and writes results through.

use crate::body::{sync_content_type, BodyType, FormRow, FormRowKind, FormValue};
use crate::headers::{toggle_global_auth, HeaderEntry};
use crate::http_method::HttpMethod;
use crate::request::{RequestDefinition, RequestId, Settlement};
use crate::variables::Variable;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Deleting the only remaining request definition.
    LastRequest,
    Empty,
    RequestNotFound(RequestId),
    IndexOutOfRange { index: usize, len: usize },
    Poisoned,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::LastRequest => write!(f, "At least one request is required"),
            StoreError::Empty => write!(f, "A request store needs at least one request"),
            StoreError::RequestNotFound(id) => write!(f, "Request not found: {id}"),
            StoreError::IndexOutOfRange { index, len } => {
                write!(f, "Index {index} is out of range for {len} entries")
            }
            StoreError::Poisoned => write!(f, "Workspace lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Which half of a key/value row an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    Key,
    Value,
}

macro_rules! key_value_store {
    ($name:ident, $entry:ty) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq)]
        pub struct $name {
            entries: Vec<$entry>,
        }

        impl $name {
            pub fn new(entries: Vec<$entry>) -> Self {
                Self { entries }
            }

            /// Appends an empty row.
            pub fn add(&mut self) {
                self.entries.push(<$entry>::default());
            }

            pub fn push(&mut self, entry: $entry) {
                self.entries.push(entry);
            }

            pub fn update(
                &mut self,
                index: usize,
                field: EntryField,
                value: impl Into<String>,
            ) -> Result<(), StoreError> {
                let len = self.entries.len();
                let entry = self
                    .entries
                    .get_mut(index)
                    .ok_or(StoreError::IndexOutOfRange { index, len })?;
                match field {
                    EntryField::Key => entry.key = value.into(),
                    EntryField::Value => entry.value = value.into(),
                }
                Ok(())
            }

            pub fn remove(&mut self, index: usize) -> Result<$entry, StoreError> {
                if index >= self.entries.len() {
                    return Err(StoreError::IndexOutOfRange {
                        index,
                        len: self.entries.len(),
                    });
                }
                Ok(self.entries.remove(index))
            }

            pub fn snapshot(&self) -> &[$entry] {
                &self.entries
            }

            pub fn len(&self) -> usize {
                self.entries.len()
            }

            pub fn is_empty(&self) -> bool {
                self.entries.is_empty()
            }
        }
    };
}

key_value_store!(VariableStore, Variable);
key_value_store!(GlobalHeaderStore, HeaderEntry);

/// Partial update of the user-editable request fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestPatch {
    pub name: Option<String>,
    pub endpoint: Option<String>,
    pub method: Option<HttpMethod>,
    pub body_type: Option<BodyType>,
    pub headers: Option<String>,
    pub use_global_auth: Option<bool>,
    pub body_json: Option<String>,
    pub body_form_data: Option<Vec<FormRow>>,
}

impl RequestPatch {
    fn apply(self, req: &mut RequestDefinition) {
        if let Some(name) = self.name {
            req.name = name;
        }
        if let Some(endpoint) = self.endpoint {
            req.endpoint = endpoint;
        }
        if let Some(method) = self.method {
            req.method = method;
        }
        if let Some(body_type) = self.body_type {
            req.body_type = body_type;
        }
        if let Some(headers) = self.headers {
            req.headers = headers;
        }
        if let Some(use_global_auth) = self.use_global_auth {
            req.use_global_auth = use_global_auth;
        }
        if let Some(body_json) = self.body_json {
            req.body_json = body_json;
        }
        if let Some(rows) = self.body_form_data {
            req.body_form_data = rows;
        }
    }
}

/// Identifies one execution of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionTicket {
    pub id: RequestId,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ExecutionState {
    generation: u64,
    loading: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestStore {
    requests: Vec<RequestDefinition>,
    active: usize,
    executions: HashMap<RequestId, ExecutionState>,
}

impl RequestStore {
    pub fn new(requests: Vec<RequestDefinition>) -> Result<Self, StoreError> {
        if requests.is_empty() {
            return Err(StoreError::Empty);
        }
        Ok(Self {
            requests,
            active: 0,
            executions: HashMap::new(),
        })
    }

    pub fn with_default() -> Self {
        Self {
            requests: vec![RequestDefinition::new_default()],
            active: 0,
            executions: HashMap::new(),
        }
    }

    pub fn requests(&self) -> &[RequestDefinition] {
        &self.requests
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Falls back to the first request if the index ever points past the end.
    pub fn active(&self) -> &RequestDefinition {
        self.requests.get(self.active).unwrap_or(&self.requests[0])
    }

    pub fn select(&mut self, index: usize) -> Result<(), StoreError> {
        if index >= self.requests.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: self.requests.len(),
            });
        }
        self.active = index;
        Ok(())
    }

    pub fn get(&self, id: RequestId) -> Option<&RequestDefinition> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&RequestDefinition> {
        self.requests.iter().find(|r| r.name == name)
    }

    fn get_mut(&mut self, id: RequestId) -> Result<&mut RequestDefinition, StoreError> {
        self.requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::RequestNotFound(id))
    }

    /// Appends a default request and makes it active.
    pub fn add_request(&mut self) -> RequestId {
        let req = RequestDefinition::new_default();
        let id = req.id;
        self.requests.push(req);
        self.active = self.requests.len() - 1;
        id
    }

    pub fn push(&mut self, req: RequestDefinition) -> RequestId {
        let id = req.id;
        self.requests.push(req);
        id
    }

    /// Refuses to remove the last request; the store is left untouched in that case.
    pub fn delete(&mut self, id: RequestId) -> Result<RequestDefinition, StoreError> {
        let index = self
            .requests
            .iter()
            .position(|r| r.id == id)
            .ok_or(StoreError::RequestNotFound(id))?;
        if self.requests.len() == 1 {
            return Err(StoreError::LastRequest);
        }
        let removed = self.requests.remove(index);
        self.executions.remove(&id);
        if index <= self.active && self.active > 0 {
            self.active -= 1;
        }
        Ok(removed)
    }

    pub fn update_request(&mut self, id: RequestId, patch: RequestPatch) -> Result<(), StoreError> {
        let req = self.get_mut(id)?;
        patch.apply(req);
        Ok(())
    }

    /// Changes the body type and keeps the stored `Content-Type` consistent with it.
    pub fn set_body_type(&mut self, id: RequestId, body_type: BodyType) -> Result<(), StoreError> {
        let req = self.get_mut(id)?;
        req.headers = sync_content_type(&req.headers, body_type);
        req.body_type = body_type;
        Ok(())
    }

    pub fn set_global_auth(
        &mut self,
        id: RequestId,
        enabled: bool,
        globals: &[HeaderEntry],
    ) -> Result<(), StoreError> {
        let req = self.get_mut(id)?;
        req.headers = toggle_global_auth(&req.headers, enabled, globals);
        req.use_global_auth = enabled;
        Ok(())
    }

    pub fn add_form_row(&mut self, id: RequestId) -> Result<(), StoreError> {
        self.get_mut(id)?.body_form_data.push(FormRow::default());
        Ok(())
    }

    fn form_row_mut(&mut self, id: RequestId, index: usize) -> Result<&mut FormRow, StoreError> {
        let rows = &mut self.get_mut(id)?.body_form_data;
        let len = rows.len();
        rows.get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })
    }

    pub fn update_form_row(
        &mut self,
        id: RequestId,
        index: usize,
        key: Option<String>,
        value: Option<FormValue>,
    ) -> Result<(), StoreError> {
        let row = self.form_row_mut(id, index)?;
        if let Some(key) = key {
            row.key = key;
        }
        if let Some(value) = value {
            row.value = value;
        }
        Ok(())
    }

    pub fn set_form_row_kind(
        &mut self,
        id: RequestId,
        index: usize,
        kind: FormRowKind,
    ) -> Result<(), StoreError> {
        self.form_row_mut(id, index)?.set_kind(kind);
        Ok(())
    }

    pub fn remove_form_row(&mut self, id: RequestId, index: usize) -> Result<FormRow, StoreError> {
        let rows = &mut self.get_mut(id)?.body_form_data;
        if index >= rows.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: rows.len(),
            });
        }
        Ok(rows.remove(index))
    }

    pub fn is_loading(&self, id: RequestId) -> bool {
        self.executions.get(&id).map(|s| s.loading).unwrap_or(false)
    }

    pub fn generation(&self, id: RequestId) -> u64 {
        self.executions.get(&id).map(|s| s.generation).unwrap_or(0)
    }

    /// Moves the request to Sending: previous result cleared, a fresh generation issued.
    pub fn begin_execution(&mut self, id: RequestId) -> Result<ExecutionTicket, StoreError> {
        let req = self.get_mut(id)?;
        req.response = None;
        req.status = None;
        let state = self.executions.entry(id).or_default();
        state.generation += 1;
        state.loading = true;
        Ok(ExecutionTicket {
            id,
            generation: state.generation,
        })
    }

    /// Writes the result only when `ticket` is still the latest execution of its request.
    pub fn settle(&mut self, ticket: ExecutionTicket, settlement: Settlement) -> bool {
        let current = self.generation(ticket.id);
        if current != ticket.generation {
            return false;
        }
        let Ok(req) = self.get_mut(ticket.id) else {
            return false;
        };
        req.status = Some(settlement.status);
        req.response = Some(settlement.response);
        if let Some(state) = self.executions.get_mut(&ticket.id) {
            state.loading = false;
        }
        true
    }
}

impl Default for RequestStore {
    fn default() -> Self {
        Self::with_default()
    }
}

/// The three collaborator stores a front-end owns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workspace {
    pub variables: VariableStore,
    pub global_headers: GlobalHeaderStore,
    pub requests: RequestStore,
}

impl Workspace {
    pub fn new(
        variables: Vec<Variable>,
        global_headers: Vec<HeaderEntry>,
        requests: Vec<RequestDefinition>,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            variables: VariableStore::new(variables),
            global_headers: GlobalHeaderStore::new(global_headers),
            requests: RequestStore::new(requests)?,
        })
    }

    /// Toggles global auth on a request using the current global header set.
    pub fn set_global_auth(&mut self, id: RequestId, enabled: bool) -> Result<(), StoreError> {
        self.requests
            .set_global_auth(id, enabled, self.global_headers.snapshot())
    }
}
