//! Data-driven permission resolution.
//!
//! Each application names the group that may perform each permitted action.
//! Authorization is a membership lookup against that group; there is no
//! built-in role list.

use super::error::{LifecycleResult, TaskLifecycleError};
use crate::task::{
    domain::{AppAcronym, Application, GroupName, PermitAction, Username},
    ports::{TaskStore, TaskTransaction},
};
use std::sync::Arc;
use tracing::debug;

/// Resolves permit groups and checks membership through the store.
pub struct PermissionResolver<S> {
    store: Arc<S>,
}

impl<S> Clone for PermissionResolver<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: TaskStore> PermissionResolver<S> {
    /// Creates a resolver over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns the group authorized for `action` on the application.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::UnknownApplication`] when the acronym
    /// does not resolve.
    pub async fn resolve_group(
        &self,
        acronym: &AppAcronym,
        action: PermitAction,
    ) -> LifecycleResult<GroupName> {
        let application = self.application(acronym).await?;
        Ok(application.permitted_group(action).clone())
    }

    /// Returns whether `username` belongs to `group`.
    ///
    /// # Errors
    ///
    /// Returns the store error of a failed lookup.
    pub async fn is_member(&self, username: &Username, group: &GroupName) -> LifecycleResult<bool> {
        Ok(self.store.is_member(username, group).await?)
    }

    /// Checks that `username` holds the `action` permit of the application.
    ///
    /// Returns the permitted group on success.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::UnknownApplication`] when the acronym
    /// does not resolve and [`TaskLifecycleError::Forbidden`] when the user
    /// is not a member of the permitted group.
    pub async fn authorize(
        &self,
        username: &Username,
        acronym: &AppAcronym,
        action: PermitAction,
    ) -> LifecycleResult<GroupName> {
        let group = self.resolve_group(acronym, action).await?;
        if !self.is_member(username, &group).await? {
            return Err(forbidden(username, &group, action));
        }
        Ok(group)
    }

    async fn application(&self, acronym: &AppAcronym) -> LifecycleResult<Application> {
        self.store
            .find_application(acronym)
            .await?
            .ok_or_else(|| TaskLifecycleError::UnknownApplication(acronym.clone()))
    }
}

/// Transactional variant of [`PermissionResolver::authorize`].
///
/// Returns the permitted group on success.
///
/// # Errors
///
/// Returns [`TaskLifecycleError::UnknownApplication`] or
/// [`TaskLifecycleError::Forbidden`] as the store-backed variant does.
pub fn authorize_in(
    tx: &mut dyn TaskTransaction,
    username: &Username,
    acronym: &AppAcronym,
    action: PermitAction,
) -> LifecycleResult<GroupName> {
    let application = tx
        .find_application(acronym)?
        .ok_or_else(|| TaskLifecycleError::UnknownApplication(acronym.clone()))?;
    let group = application.permitted_group(action).clone();
    if !tx.is_member(username, &group)? {
        return Err(forbidden(username, &group, action));
    }
    Ok(group)
}

fn forbidden(username: &Username, group: &GroupName, action: PermitAction) -> TaskLifecycleError {
    debug!(%username, %group, permit = action.as_str(), "permit check failed");
    TaskLifecycleError::Forbidden {
        username: username.clone(),
        group: group.clone(),
    }
}
