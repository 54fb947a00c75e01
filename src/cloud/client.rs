//! Reporting Service Client
//!
//! A JSON-over-HTTP client for the reporting service. Every operation is a
//! single round trip; sequencing is left to the caller.

use crate::cloud::Reporter;
use crate::cloud::error::CloudError;
use crate::cloud::types::{
    CreateInstancePayload, CreateInstanceResponse, CreateRunPayload, CreateRunResponse,
    SetInstanceTestsPayload, StdoutPayload, UpdateInstanceResultsPayload,
    UpdateInstanceResultsResponse,
};
use crate::consts::api;
use crate::environment::Environment;
use log::{debug, warn};
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct CloudClient {
    client: Client,
    environment: Environment,
}

impl CloudClient {
    /// Create a new client with the default request timeout.
    #[allow(dead_code)]
    pub fn new(environment: Environment) -> Result<Self, CloudError> {
        Self::with_timeout(environment, Duration::from_secs(api::DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(environment: Environment, timeout: Duration) -> Result<Self, CloudError> {
        let client = ClientBuilder::new().timeout(timeout).build()?;
        Ok(Self { client, environment })
    }

    fn build_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.environment.api_base_url(),
            endpoint.trim_start_matches('/')
        )
    }

    /// Percent-encode a server-assigned id for use as a path segment.
    fn path_segment(id: &str, name: &'static str) -> Result<String, CloudError> {
        if id.is_empty() {
            return Err(CloudError::MissingIdentifier(name));
        }
        Ok(urlencoding::encode(id).into_owned())
    }

    async fn handle_response_status(response: Response) -> Result<Response, CloudError> {
        if !response.status().is_success() {
            let err = CloudError::from_response(response).await;
            warn!("Request failed: {}", err);
            return Err(err);
        }
        Ok(response)
    }

    async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, CloudError> {
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|source| CloudError::Decode { source, body })
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        body: &B,
    ) -> Result<Response, CloudError> {
        let url = self.build_url(endpoint);
        debug!("{} {}", method, url);

        let response = self.client.request(method, &url).json(body).send().await?;
        Self::handle_response_status(response).await
    }
}

#[async_trait::async_trait]
impl Reporter for CloudClient {
    async fn create_run(
        &self,
        payload: &CreateRunPayload,
    ) -> Result<CreateRunResponse, CloudError> {
        let response = self.send_json(Method::POST, api::RUNS, payload).await?;
        let run: CreateRunResponse = Self::decode_response(response).await?;
        debug!("Created run {} (new: {})", run.run_id, run.is_new_run);
        Ok(run)
    }

    async fn create_instance(
        &self,
        payload: &CreateInstancePayload,
    ) -> Result<CreateInstanceResponse, CloudError> {
        let run_id = Self::path_segment(&payload.run_id, "runId")?;
        let endpoint = format!("{}/{}/instances", api::RUNS, run_id);

        let response = self.send_json(Method::POST, &endpoint, payload).await?;
        Self::decode_response(response).await
    }

    async fn set_instance_tests(
        &self,
        instance_id: &str,
        payload: &SetInstanceTestsPayload,
    ) -> Result<serde_json::Value, CloudError> {
        let instance_id = Self::path_segment(instance_id, "instanceId")?;
        let endpoint = format!("{}/{}/tests", api::INSTANCES, instance_id);

        let response = self.send_json(Method::POST, &endpoint, payload).await?;
        let body = response.text().await?;
        // Some deployments acknowledge with an empty body.
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Object(Default::default()));
        }
        serde_json::from_str(&body).map_err(|source| CloudError::Decode { source, body })
    }

    async fn update_instance_results(
        &self,
        instance_id: &str,
        payload: &UpdateInstanceResultsPayload,
    ) -> Result<UpdateInstanceResultsResponse, CloudError> {
        let instance_id = Self::path_segment(instance_id, "instanceId")?;
        let endpoint = format!("{}/{}/results", api::INSTANCES, instance_id);

        let response = self.send_json(Method::POST, &endpoint, payload).await?;
        Self::decode_response(response).await
    }

    async fn update_instance_stdout(
        &self,
        instance_id: &str,
        stdout: &str,
    ) -> Result<StatusCode, CloudError> {
        let instance_id = Self::path_segment(instance_id, "instanceId")?;
        let endpoint = format!("{}/{}/stdout", api::INSTANCES, instance_id);
        let payload = StdoutPayload { stdout: stdout.to_string() };

        let response = self.send_json(Method::PUT, &endpoint, &payload).await?;
        Ok(response.status())
    }
}
