//! Mutating commands as data.
//!
//! Every resource mutation on the platform shares one lifecycle: submit,
//! receive a notification handle, wait. Instead of a command-class hierarchy,
//! each verb is a small data struct implementing [`MutatingCommand`]; the
//! [`Dispatcher`](crate::app::Dispatcher) runs them all identically.

use async_trait::async_trait;

use crate::domain::{ApiError, NotificationHandle};
use crate::ports::CloudApi;

/// Capability interface for a mutate-then-wait command.
#[async_trait]
pub trait MutatingCommand: Send + Sync {
    /// Operator-facing announce line, printed before submitting.
    fn describe(&self) -> String;

    /// Perform the mutation and return the backend's notification handle.
    async fn submit(&self, api: &dyn CloudApi) -> Result<NotificationHandle, ApiError>;
}

/// `tag create <uuid> <name> <color>`
#[derive(Debug, Clone)]
pub struct CreateTag {
    pub app_uuid: String,
    pub name: String,
    pub color: String,
}

#[async_trait]
impl MutatingCommand for CreateTag {
    fn describe(&self) -> String {
        format!("Creating application tag {}:{}", self.name, self.color)
    }

    async fn submit(&self, api: &dyn CloudApi) -> Result<NotificationHandle, ApiError> {
        api.create_tag(&self.app_uuid, &self.name, &self.color).await
    }
}

/// `tag delete <uuid> <name>`
#[derive(Debug, Clone)]
pub struct DeleteTag {
    pub app_uuid: String,
    pub name: String,
}

#[async_trait]
impl MutatingCommand for DeleteTag {
    fn describe(&self) -> String {
        format!("Deleting application tag {}", self.name)
    }

    async fn submit(&self, api: &dyn CloudApi) -> Result<NotificationHandle, ApiError> {
        api.delete_tag(&self.app_uuid, &self.name).await
    }
}
