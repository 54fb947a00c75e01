//! Records for the `/runs/{id}/instances` and `/instances/{id}/...` endpoints.

use super::run::Platform;
use super::test::{HookDefinition, TestDefinition, TestResult};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstancePayload {
    pub run_id: String,
    pub group_id: String,
    pub machine_id: String,
    pub platform: Platform,
}

/// Work assignment for a machine. A null `spec` means the run has nothing left to claim.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateInstanceResponse {
    pub spec: Option<String>,
    pub instance_id: Option<String>,
    pub claimed_instances: u32,
    pub total_instances: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InstanceConfig {
    pub video: bool,
    pub video_upload_on_passes: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct SetInstanceTestsPayload {
    pub config: InstanceConfig,
    pub tests: Vec<TestDefinition>,
    pub hooks: Vec<HookDefinition>,
}

/// Aggregate counters computed by the runner for one spec.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct InstanceStats {
    pub suites: u32,
    pub tests: u32,
    pub passes: u32,
    pub pending: u32,
    pub skipped: u32,
    pub failures: u32,
    pub wall_clock_started_at: Option<String>,
    pub wall_clock_ended_at: Option<String>,
    pub wall_clock_duration: Option<u64>,
}

/// Counters as seen by the mocha reporter; slightly different from [`InstanceStats`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ReporterStats {
    pub suites: u32,
    pub tests: u32,
    pub passes: u32,
    pub pending: u32,
    pub failures: u32,
    pub start: Option<String>,
    pub end: Option<String>,
    pub duration: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Screenshot {
    pub screenshot_id: String,
    pub name: Option<String>,
    pub test_id: String,
    pub test_attempt_index: u32,
    pub taken_at: String,
    pub height: u32,
    pub width: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInstanceResultsPayload {
    pub stats: InstanceStats,
    pub tests: Vec<TestResult>,
    pub exception: Option<String>,
    pub video: bool,
    pub screenshots: Vec<Screenshot>,
    pub reporter_stats: Option<ReporterStats>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScreenshotUploadUrl {
    pub screenshot_id: String,
    pub upload_url: String,
}

/// Pre-signed locations for the artifacts of an instance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInstanceResultsResponse {
    pub screenshot_upload_urls: Vec<ScreenshotUploadUrl>,
    pub video_upload_url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct StdoutPayload {
    pub stdout: String,
}
