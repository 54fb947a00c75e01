//! Records for `POST /runs`.

use serde::{Deserialize, Serialize};

/// Operating system and browser the specs execute on.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub os_name: String,
    pub os_version: String,
    pub browser_name: String,
    pub browser_version: String,
}

/// CI provider detected by the runner. `params` is provider-specific.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CiInfo {
    pub params: serde_json::Value,
    pub provider: Option<String>,
}

/// Git metadata of the checkout under test. Any field may be unknown.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CommitInfo {
    pub sha: Option<String>,
    pub branch: Option<String>,
    pub author_name: Option<String>,
    pub author_email: Option<String>,
    pub message: Option<String>,
    pub remote_origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_branch: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TestingType {
    #[default]
    E2e,
    Component,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRunPayload {
    pub ci: CiInfo,
    pub ci_build_id: Option<String>,
    pub project_id: String,
    pub record_key: String,
    pub commit: CommitInfo,
    pub specs: Vec<String>,
    pub group: Option<String>,
    pub platform: Platform,
    pub parallel: bool,
    #[serde(default)]
    pub spec_pattern: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub testing_type: TestingType,
    /// Number of specs claimed per instance; the service default applies when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateRunResponse {
    pub warnings: Vec<serde_json::Value>,
    pub group_id: String,
    pub machine_id: String,
    pub run_id: String,
    pub run_url: String,
    pub is_new_run: bool,
    /// Fields the service sent beyond the ones above, kept so they survive a re-serialize.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
