//! Structural validation of inbound JSON payloads.
//!
//! Every action declares its required and optional fields. A payload is
//! rejected when a required field is absent, `null`, or an empty string, and
//! when it carries any field outside the declared set.

use super::{
    error::{LifecycleResult, TaskLifecycleError},
    lifecycle::{CreateTaskRequest, Credentials, ListTasksRequest, PromoteTaskRequest},
};
use serde_json::{Map, Value};

struct FieldSet {
    required: &'static [&'static str],
    optional: &'static [&'static str],
}

impl FieldSet {
    fn declares(&self, name: &str) -> bool {
        self.required.contains(&name) || self.optional.contains(&name)
    }
}

const CREATE_TASK_FIELDS: FieldSet = FieldSet {
    required: &["username", "password", "app_acronym", "task_name"],
    optional: &["task_description"],
};

const LIST_TASKS_FIELDS: FieldSet = FieldSet {
    required: &["username", "password", "task_state"],
    optional: &[],
};

const PROMOTE_TASK_FIELDS: FieldSet = FieldSet {
    required: &["username", "password", "task_id"],
    optional: &["note"],
};

fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(_) => false,
    }
}

fn check_fields<'a>(payload: &'a Value, fields: &FieldSet) -> LifecycleResult<&'a Map<String, Value>> {
    let Value::Object(map) = payload else {
        return Err(TaskLifecycleError::InvalidInput(
            "payload must be a JSON object".to_owned(),
        ));
    };

    let missing: Vec<String> = fields
        .required
        .iter()
        .filter(|name| is_absent(map.get(**name)))
        .map(|name| (*name).to_owned())
        .collect();
    if !missing.is_empty() {
        return Err(TaskLifecycleError::MissingFields(missing));
    }

    let mut unexpected: Vec<String> = map
        .keys()
        .filter(|key| !fields.declares(key))
        .cloned()
        .collect();
    if !unexpected.is_empty() {
        unexpected.sort();
        return Err(TaskLifecycleError::UnexpectedFields(unexpected));
    }

    Ok(map)
}

fn optional_string(map: &Map<String, Value>, name: &str) -> LifecycleResult<Option<String>> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(TaskLifecycleError::InvalidInput(format!(
            "{name} must be a string"
        ))),
    }
}

fn required_string(map: &Map<String, Value>, name: &str) -> LifecycleResult<String> {
    optional_string(map, name)?
        .ok_or_else(|| TaskLifecycleError::MissingFields(vec![name.to_owned()]))
}

fn credentials(map: &Map<String, Value>) -> LifecycleResult<Credentials> {
    Ok(Credentials::new(
        required_string(map, "username")?,
        required_string(map, "password")?,
    ))
}

impl CreateTaskRequest {
    /// Builds a create request from a raw JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::MissingFields`],
    /// [`TaskLifecycleError::UnexpectedFields`], or
    /// [`TaskLifecycleError::InvalidInput`] for structurally invalid payloads.
    pub fn from_payload(payload: &Value) -> LifecycleResult<Self> {
        let map = check_fields(payload, &CREATE_TASK_FIELDS)?;
        let mut request = Self::from_credentials(
            credentials(map)?,
            required_string(map, "app_acronym")?,
            required_string(map, "task_name")?,
        );
        if let Some(description) = optional_string(map, "task_description")? {
            request = request.with_description(description);
        }
        Ok(request)
    }
}

impl ListTasksRequest {
    /// Builds a list request from a raw JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::MissingFields`],
    /// [`TaskLifecycleError::UnexpectedFields`], or
    /// [`TaskLifecycleError::InvalidInput`] for structurally invalid payloads.
    pub fn from_payload(payload: &Value) -> LifecycleResult<Self> {
        let map = check_fields(payload, &LIST_TASKS_FIELDS)?;
        Ok(Self::from_credentials(
            credentials(map)?,
            required_string(map, "task_state")?,
        ))
    }
}

impl PromoteTaskRequest {
    /// Builds a promote request from a raw JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::MissingFields`],
    /// [`TaskLifecycleError::UnexpectedFields`], or
    /// [`TaskLifecycleError::InvalidInput`] for structurally invalid payloads.
    pub fn from_payload(payload: &Value) -> LifecycleResult<Self> {
        let map = check_fields(payload, &PROMOTE_TASK_FIELDS)?;
        let mut request =
            Self::from_credentials(credentials(map)?, required_string(map, "task_id")?);
        if let Some(note) = optional_string(map, "note")? {
            request = request.with_note(note);
        }
        Ok(request)
    }
}
