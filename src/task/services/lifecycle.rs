//! Service layer for task creation, listing, and promotion.
//!
//! Each action normalizes its identifiers once, authenticates the caller,
//! authorizes against the application's permit groups, and performs every
//! mutation inside a single store transaction. Notification of a promotion
//! is dispatched only after its transaction has committed.

use super::{
    allocator::allocate_running_number,
    error::{LifecycleResult, TaskLifecycleError},
    notification::{NotificationDispatcher, NotificationHandle, NotificationSettings, TaskDoneNotice},
    permissions::{PermissionResolver, authorize_in},
};
use crate::task::{
    domain::{
        AppAcronym, AuditEntry, NoteDraft, PermitAction, Task, TaskAction, TaskId, TaskName,
        TaskState, UserAccount, Username, stamp_entries,
    },
    ports::{CredentialVerifier, Notifier, StoreError, TaskStore},
};
use mockable::Clock;
use std::fmt;
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span};

/// Username and password supplied with every action.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates credentials from raw input.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    credentials: Credentials,
    app_acronym: String,
    task_name: String,
    description: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        app_acronym: impl Into<String>,
        task_name: impl Into<String>,
    ) -> Self {
        Self::from_credentials(Credentials::new(username, password), app_acronym, task_name)
    }

    /// Creates a request from already-collected credentials.
    #[must_use]
    pub fn from_credentials(
        credentials: Credentials,
        app_acronym: impl Into<String>,
        task_name: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            app_acronym: app_acronym.into(),
            task_name: task_name.into(),
            description: None,
        }
    }

    /// Sets the task description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Request payload for listing tasks in one state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTasksRequest {
    credentials: Credentials,
    state: String,
}

impl ListTasksRequest {
    /// Creates a request for tasks in `state`.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self::from_credentials(Credentials::new(username, password), state)
    }

    /// Creates a request from already-collected credentials.
    #[must_use]
    pub fn from_credentials(credentials: Credentials, state: impl Into<String>) -> Self {
        Self {
            credentials,
            state: state.into(),
        }
    }
}

/// Request payload for promoting a task from `doing` to `done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromoteTaskRequest {
    credentials: Credentials,
    task_id: String,
    note: Option<String>,
}

impl PromoteTaskRequest {
    /// Creates a request for the given task.
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        task_id: impl Into<String>,
    ) -> Self {
        Self::from_credentials(Credentials::new(username, password), task_id)
    }

    /// Creates a request from already-collected credentials.
    #[must_use]
    pub fn from_credentials(credentials: Credentials, task_id: impl Into<String>) -> Self {
        Self {
            credentials,
            task_id: task_id.into(),
            note: None,
        }
    }

    /// Attaches a free-text note recorded after the transition entry.
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Result of a committed promotion.
#[derive(Debug)]
pub struct PromotedTask {
    /// Task as committed.
    pub task: Task,
    /// Handle on the notification batch dispatched after commit.
    pub notification: NotificationHandle,
}

/// Task lifecycle orchestration service.
pub struct TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    verifier: Arc<dyn CredentialVerifier>,
    permissions: PermissionResolver<S>,
    dispatcher: NotificationDispatcher<S>,
}

impl<S, C> Clone for TaskLifecycleService<S, C>
where
    S: TaskStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            verifier: Arc::clone(&self.verifier),
            permissions: self.permissions.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<S, C> TaskLifecycleService<S, C>
where
    S: TaskStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new task lifecycle service.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        clock: Arc<C>,
        verifier: Arc<dyn CredentialVerifier>,
        notifier: Arc<dyn Notifier>,
        settings: NotificationSettings,
    ) -> Self {
        Self {
            permissions: PermissionResolver::new(Arc::clone(&store)),
            dispatcher: NotificationDispatcher::new(Arc::clone(&store), notifier, settings),
            store,
            clock,
            verifier,
        }
    }

    /// Creates a task in state `open` under the requested application.
    ///
    /// Allocates the next running number, inserts the task, and records the
    /// creation entry in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when input validation, authentication,
    /// authorization, or persistence fails. Nothing is persisted on error.
    pub async fn create_task(&self, request: CreateTaskRequest) -> LifecycleResult<Task> {
        let CreateTaskRequest {
            credentials,
            app_acronym,
            task_name,
            description,
        } = request;
        let username = Username::new(&credentials.username)?;
        let acronym = AppAcronym::new(&app_acronym)?;
        let name = TaskName::new(&task_name)?;
        let description = description.filter(|text| !text.trim().is_empty());

        let span = info_span!("create_task", %username, app_acronym = %acronym);
        async move {
            self.authenticate(&username, credentials.password).await?;
            self.permissions
                .authorize(&username, &acronym, PermitAction::Create)
                .await?;

            let clock = Arc::clone(&self.clock);
            let creator = username.clone();
            let task = self
                .store
                .transaction(move |tx| {
                    let number = allocate_running_number(tx, &acronym)?;
                    let task = Task::create(
                        TaskId::new(acronym, number),
                        name,
                        description,
                        creator.clone(),
                        &*clock,
                    );
                    tx.insert_task(&task)?;
                    let message = format!("User {creator} has created the task.");
                    let entries = stamp_entries(
                        vec![NoteDraft::system(creator, task.state(), message)],
                        clock.utc(),
                        None,
                    );
                    tx.append_notes(task.id(), &entries)?;
                    Ok::<_, TaskLifecycleError>(task)
                })
                .await?;

            info!(task_id = %task.id(), "task created");
            Ok(task)
        }
        .instrument(span)
        .await
    }

    /// Lists all tasks currently in the requested state.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError`] when authentication fails, the state is
    /// not one of the workflow states, or the store lookup fails.
    pub async fn list_by_state(&self, request: ListTasksRequest) -> LifecycleResult<Vec<Task>> {
        let ListTasksRequest { credentials, state } = request;
        let username = Username::new(&credentials.username)?;

        let span = info_span!("list_tasks_by_state", %username);
        async move {
            self.authenticate(&username, credentials.password).await?;
            let state = TaskState::try_from(state.as_str())?;
            Ok(self.store.find_by_state(state).await?)
        }
        .instrument(span)
        .await
    }

    /// Promotes a task from `doing` to `done`.
    ///
    /// The task row is locked before its state is read, so concurrent
    /// promotions of one task serialize and all but the first observe
    /// `done`. The members of the application's done group are notified after
    /// commit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] for unknown tasks,
    /// [`crate::task::domain::TaskDomainError::InvalidTransition`] when the
    /// task is not in `doing`, [`TaskLifecycleError::Forbidden`] when the user
    /// lacks the done permit, and other variants for authentication or
    /// persistence failures. Nothing is persisted and nobody is notified on
    /// error.
    pub async fn promote_to_done(&self, request: PromoteTaskRequest) -> LifecycleResult<PromotedTask> {
        let PromoteTaskRequest {
            credentials,
            task_id,
            note,
        } = request;
        let username = Username::new(&credentials.username)?;
        let task_id = TaskId::parse(&task_id)?;
        let note = note.filter(|text| !text.trim().is_empty());

        let span = info_span!("promote_task_to_done", %username, %task_id);
        async move {
            self.authenticate(&username, credentials.password).await?;
            if self.store.find_task(&task_id).await?.is_none() {
                return Err(TaskLifecycleError::TaskNotFound(task_id));
            }

            let clock = Arc::clone(&self.clock);
            let actor = username.clone();
            let (task, group) = self
                .store
                .transaction(move |tx| {
                    let mut task = tx
                        .lock_task(&task_id)?
                        .ok_or_else(|| TaskLifecycleError::TaskNotFound(task_id.clone()))?;
                    let state = task.apply(TaskAction::PromoteToDone)?;
                    let group = authorize_in(tx, &actor, task.application(), PermitAction::Done)?;
                    tx.update_task_state(task.id(), state)?;

                    let mut drafts = vec![NoteDraft::system(
                        actor.clone(),
                        state,
                        format!("Task submitted by {actor}."),
                    )];
                    if let Some(note) = note {
                        drafts.push(NoteDraft::user(actor, state, note));
                    }
                    let floor = tx.latest_note_timestamp(task.id())?;
                    tx.append_notes(task.id(), &stamp_entries(drafts, clock.utc(), floor))?;
                    Ok::<_, TaskLifecycleError>((task, group))
                })
                .await?;

            info!(task_id = %task.id(), "task promoted to done");
            let notification = self.dispatcher.dispatch(TaskDoneNotice {
                task_id: task.id().clone(),
                task_name: task.name().clone(),
                promoted_by: username,
                group,
            });
            Ok(PromotedTask { task, notification })
        }
        .instrument(span)
        .await
    }

    /// Returns the audit trail of a task in timestamp order.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::TaskNotFound`] for unknown tasks or the
    /// store error of a failed lookup.
    pub async fn audit_trail(&self, task_id: &TaskId) -> LifecycleResult<Vec<AuditEntry>> {
        if self.store.find_task(task_id).await?.is_none() {
            return Err(TaskLifecycleError::TaskNotFound(task_id.clone()));
        }
        Ok(self.store.audit_trail(task_id).await?)
    }

    async fn authenticate(&self, username: &Username, password: String) -> LifecycleResult<UserAccount> {
        let Some(account) = self.store.find_user(username).await? else {
            debug!("authentication rejected: unknown user");
            return Err(TaskLifecycleError::AuthUnknownUser);
        };

        let verifier = Arc::clone(&self.verifier);
        let hash = account.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || verifier.verify(&password, &hash))
            .await
            .map_err(|err| {
                error!(error = %err, "credential verification did not complete");
                StoreError::unavailable(format!("credential verification join error: {err}"))
            })?;
        if !verified {
            debug!("authentication rejected: bad credential");
            return Err(TaskLifecycleError::AuthBadCredential);
        }
        if account.disabled {
            debug!("authentication rejected: account disabled");
            return Err(TaskLifecycleError::AuthDisabled);
        }
        Ok(account)
    }
}
