//! Reporting-service API: one operation per endpoint.

mod client;
pub mod error;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::CloudClient;

use crate::cloud::error::CloudError;
use crate::cloud::types::{
    CreateInstancePayload, CreateInstanceResponse, CreateRunPayload, CreateRunResponse,
    SetInstanceTestsPayload, UpdateInstanceResultsPayload, UpdateInstanceResultsResponse,
};
use reqwest::StatusCode;

#[async_trait::async_trait]
pub trait Reporter: Send + Sync {
    /// `POST /runs`
    async fn create_run(&self, payload: &CreateRunPayload)
        -> Result<CreateRunResponse, CloudError>;

    /// `POST /runs/{runId}/instances`. A response without a spec means no work is left.
    async fn create_instance(
        &self,
        payload: &CreateInstancePayload,
    ) -> Result<CreateInstanceResponse, CloudError>;

    /// `POST /instances/{instanceId}/tests`. The acknowledgement is opaque.
    async fn set_instance_tests(
        &self,
        instance_id: &str,
        payload: &SetInstanceTestsPayload,
    ) -> Result<serde_json::Value, CloudError>;

    /// `POST /instances/{instanceId}/results`
    async fn update_instance_results(
        &self,
        instance_id: &str,
        payload: &UpdateInstanceResultsPayload,
    ) -> Result<UpdateInstanceResultsResponse, CloudError>;

    /// `PUT /instances/{instanceId}/stdout`
    async fn update_instance_stdout(
        &self,
        instance_id: &str,
        stdout: &str,
    ) -> Result<StatusCode, CloudError>;
}
