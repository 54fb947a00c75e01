//! Request and response bodies exchanged with the reporting service.

pub mod instance;
pub mod run;

pub use instance::{
    CreateInstancePayload, CreateInstanceResponse, InstanceConfig, InstanceStats, ReporterStats,
    Screenshot, ScreenshotUploadUrl, SetInstanceTestsPayload, StdoutPayload,
    UpdateInstanceResultsPayload, UpdateInstanceResultsResponse,
};
pub use run::{CiInfo, CommitInfo, CreateRunPayload, CreateRunResponse, Platform, TestingType};
pub use test::{HookDefinition, TestAttempt, TestDefinition, TestError, TestResult, TestState};
