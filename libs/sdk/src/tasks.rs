//! Task fetch seam.
//!
//! The polling layer in the CLI only needs these two calls, so they live
//! behind a trait; tests drive the poller with a scripted implementation.

use async_trait::async_trait;
use photon_api::Task;

use crate::client::Client;
use crate::error::ApiClientError;

/// Task status operations against the controller.
#[async_trait]
pub trait Tasks {
    /// Fetch the current state of a task.
    async fn get_task(&self, id: &str) -> Result<Task, ApiClientError>;

    /// Block server-side until the task reaches a terminal state.
    async fn wait_task(&self, id: &str) -> Result<Task, ApiClientError>;
}

#[async_trait]
impl Tasks for Client {
    async fn get_task(&self, id: &str) -> Result<Task, ApiClientError> {
        Client::get_task(self, id).await
    }

    async fn wait_task(&self, id: &str) -> Result<Task, ApiClientError> {
        Client::wait_task(self, id).await
    }
}

#[async_trait]
impl<T> Tasks for &T
where
    T: Tasks + Sync,
{
    async fn get_task(&self, id: &str) -> Result<Task, ApiClientError> {
        (**self).get_task(id).await
    }

    async fn wait_task(&self, id: &str) -> Result<Task, ApiClientError> {
        (**self).wait_task(id).await
    }
}
