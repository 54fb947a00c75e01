//! Run Session
//!
//! Drives the call sequence for one machine taking part in a run:
//! create the run, claim instances until the service runs out of specs,
//! and report each claimed spec. Identifiers returned by the service are
//! passed back verbatim.

use crate::cloud::Reporter;
use crate::cloud::error::CloudError;
use crate::cloud::types::{
    CreateInstancePayload, CreateRunPayload, CreateRunResponse, Platform,
    SetInstanceTestsPayload, UpdateInstanceResultsPayload, UpdateInstanceResultsResponse,
};
use crate::consts::record::MAX_CLAIMS;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A spec assigned to this machine by `createInstance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimedSpec {
    pub spec: String,
    pub instance_id: String,
    pub claimed_instances: u32,
    pub total_instances: u32,
}

/// Everything reported for one spec.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct SpecReport {
    #[serde(default)]
    pub tests: SetInstanceTestsPayload,
    #[serde(default)]
    pub results: UpdateInstanceResultsPayload,
    #[serde(default)]
    pub stdout: String,
}

/// Reports keyed by spec path, as produced by a local test run.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ReportBundle {
    #[serde(default)]
    pub specs: HashMap<String, SpecReport>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReportedSpec {
    pub spec: String,
    pub instance_id: String,
    pub uploads: UpdateInstanceResultsResponse,
}

pub struct RunSession {
    reporter: Box<dyn Reporter>,
    run: CreateRunResponse,
}

impl RunSession {
    /// Create (or join) the run described by `payload`.
    pub async fn start(
        reporter: Box<dyn Reporter>,
        payload: &CreateRunPayload,
    ) -> Result<Self, CloudError> {
        let run = reporter.create_run(payload).await?;
        info!("Run {} ({})", run.run_id, run.run_url);
        for warning in &run.warnings {
            warn!("Service warning: {}", warning);
        }
        Ok(Self { reporter, run })
    }

    pub fn run(&self) -> &CreateRunResponse {
        &self.run
    }

    /// Ask the service for the next spec. `None` once every spec has been claimed.
    pub async fn claim_next(&self, platform: &Platform) -> Result<Option<ClaimedSpec>, CloudError> {
        let payload = CreateInstancePayload {
            run_id: self.run.run_id.clone(),
            group_id: self.run.group_id.clone(),
            machine_id: self.run.machine_id.clone(),
            platform: platform.clone(),
        };
        let response = self.reporter.create_instance(&payload).await?;

        let Some(spec) = response.spec else {
            return Ok(None);
        };
        let instance_id = response
            .instance_id
            .filter(|id| !id.is_empty())
            .ok_or(CloudError::MissingIdentifier("instanceId"))?;

        info!(
            "Claimed {} ({}/{})",
            spec, response.claimed_instances, response.total_instances
        );
        Ok(Some(ClaimedSpec {
            spec,
            instance_id,
            claimed_instances: response.claimed_instances,
            total_instances: response.total_instances,
        }))
    }

    /// Send tests, results and stdout for a claimed instance, in that order.
    pub async fn report(
        &self,
        claimed: &ClaimedSpec,
        tests: &SetInstanceTestsPayload,
        results: &UpdateInstanceResultsPayload,
        stdout: &str,
    ) -> Result<UpdateInstanceResultsResponse, CloudError> {
        let id = &claimed.instance_id;
        self.reporter.set_instance_tests(id, tests).await?;
        let uploads = self.reporter.update_instance_results(id, results).await?;
        self.reporter.update_instance_stdout(id, stdout).await?;
        Ok(uploads)
    }

    /// Claim and report specs until the service has none left.
    pub async fn record(
        &self,
        platform: &Platform,
        bundle: &ReportBundle,
    ) -> Result<Vec<ReportedSpec>, CloudError> {
        let mut reported = Vec::new();
        for _ in 0..MAX_CLAIMS {
            let Some(claimed) = self.claim_next(platform).await? else {
                return Ok(reported);
            };

            let report = match bundle.specs.get(&claimed.spec) {
                Some(report) => report.clone(),
                None => {
                    warn!("No results for {}, reporting it empty", claimed.spec);
                    SpecReport::default()
                }
            };
            let uploads = self
                .report(&claimed, &report.tests, &report.results, &report.stdout)
                .await?;
            reported.push(ReportedSpec {
                spec: claimed.spec,
                instance_id: claimed.instance_id,
                uploads,
            });
        }
        warn!("Stopped after {} claims", MAX_CLAIMS);
        Ok(reported)
    }
}
