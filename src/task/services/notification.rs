//! Post-commit notification of tasks reaching `done`.
//!
//! Dispatch happens on a spawned task after the promoting transaction has
//! committed and released its connection. Nothing here can fail the
//! promotion: lookup and delivery failures are logged and skipped.

use crate::task::{
    domain::{GroupName, TaskId, TaskName, UserAccount, Username},
    ports::{EmailMessage, Notifier, NotifyError, TaskStore},
};
use minijinja::{Environment, context};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const SUBJECT_TEMPLATE: &str = "Task {{ task_id }} ({{ task_name }}) is done";

const BODY_TEMPLATE: &str = "\
Task {{ task_id }} ({{ task_name }}) was submitted as done by {{ promoted_by }}.

Review it at {{ link }}
";

/// Settings controlling who is notified and how tasks are referenced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    /// Base URL that task identifiers are appended to.
    pub link_base: String,
    /// Group member value meaning "unassigned"; never notified.
    pub unassigned_member: String,
}

impl NotificationSettings {
    /// Returns the reference link for a task.
    #[must_use]
    pub fn task_link(&self, task_id: &TaskId) -> String {
        format!("{}/{task_id}", self.link_base.trim_end_matches('/'))
    }

    fn is_placeholder(&self, member: &Username) -> bool {
        member
            .as_str()
            .eq_ignore_ascii_case(self.unassigned_member.trim())
    }
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            link_base: "http://localhost:5173/tasks".to_owned(),
            unassigned_member: "-".to_owned(),
        }
    }
}

/// Facts about a promotion needed to notify the done group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDoneNotice {
    /// Promoted task.
    pub task_id: TaskId,
    /// Name of the promoted task.
    pub task_name: TaskName,
    /// User who promoted the task.
    pub promoted_by: Username,
    /// Group holding the application's done permit.
    pub group: GroupName,
}

/// Outcome of one notification batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Addresses the message was addressed to.
    pub recipients: Vec<String>,
    /// Members skipped because their account or address could not be found.
    pub skipped: Vec<Username>,
    /// Whether the notifier accepted the message.
    pub delivered: bool,
}

/// Handle on a spawned notification batch.
///
/// Dropping the handle detaches the batch; it still runs to completion.
#[derive(Debug)]
pub struct NotificationHandle(JoinHandle<DeliveryReport>);

impl NotificationHandle {
    /// Waits for the batch to finish.
    ///
    /// Returns `None` when the batch task panicked or was cancelled.
    pub async fn wait(self) -> Option<DeliveryReport> {
        self.0.await.ok()
    }
}

/// Notifies the members of a done group.
pub struct NotificationDispatcher<S> {
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,
    settings: Arc<NotificationSettings>,
    templates: Arc<Environment<'static>>,
}

impl<S> Clone for NotificationDispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            notifier: Arc::clone(&self.notifier),
            settings: Arc::clone(&self.settings),
            templates: Arc::clone(&self.templates),
        }
    }
}

impl<S> NotificationDispatcher<S>
where
    S: TaskStore + 'static,
{
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(store: Arc<S>, notifier: Arc<dyn Notifier>, settings: NotificationSettings) -> Self {
        Self {
            store,
            notifier,
            settings: Arc::new(settings),
            templates: Arc::new(Environment::new()),
        }
    }

    /// Spawns delivery of `notice` and returns immediately.
    #[must_use]
    pub fn dispatch(&self, notice: TaskDoneNotice) -> NotificationHandle {
        let dispatcher = self.clone();
        NotificationHandle(tokio::spawn(async move { dispatcher.deliver(&notice).await }))
    }

    /// Delivers `notice` to every reachable member of its group.
    pub async fn deliver(&self, notice: &TaskDoneNotice) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let members = match self.store.group_members(&notice.group).await {
            Ok(members) => members,
            Err(err) => {
                warn!(group = %notice.group, error = %err, "could not list done group members");
                return report;
            }
        };

        for member in members {
            if self.settings.is_placeholder(&member) {
                continue;
            }
            match self.store.find_user(&member).await {
                Ok(Some(UserAccount {
                    email: Some(email), ..
                })) if !email.trim().is_empty() => report.recipients.push(email.trim().to_owned()),
                Ok(_) => {
                    warn!(username = %member, "group member has no email address; skipping");
                    report.skipped.push(member);
                }
                Err(err) => {
                    warn!(username = %member, error = %err, "group member lookup failed; skipping");
                    report.skipped.push(member);
                }
            }
        }

        if report.recipients.is_empty() {
            debug!(task_id = %notice.task_id, "no recipients for done notification");
            return report;
        }

        let message = match self.render(notice, report.recipients.clone()) {
            Ok(message) => message,
            Err(err) => {
                warn!(task_id = %notice.task_id, error = %err, "could not render done notification");
                return report;
            }
        };

        match self.notifier.notify(&message).await {
            Ok(()) => report.delivered = true,
            Err(err) => {
                warn!(task_id = %notice.task_id, error = %err, "done notification failed");
            }
        }
        report
    }

    fn render(
        &self,
        notice: &TaskDoneNotice,
        recipients: Vec<String>,
    ) -> Result<EmailMessage, NotifyError> {
        let ctx = context! {
            task_id => notice.task_id.to_string(),
            task_name => notice.task_name.as_str(),
            promoted_by => notice.promoted_by.as_str(),
            link => self.settings.task_link(&notice.task_id),
        };
        let render = |source: &str| {
            self.templates
                .render_str(source, &ctx)
                .map_err(|err| NotifyError::Template(err.to_string()))
        };
        Ok(EmailMessage {
            recipients,
            subject: render(SUBJECT_TEMPLATE)?,
            body: render(BODY_TEMPLATE)?,
        })
    }
}
