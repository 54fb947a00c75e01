use log::{debug, warn};
use once_cell::sync::OnceCell;
use std::fmt::{Display, Formatter};

/// Environment variable that overrides the API base URL.
pub const BASE_URL_ENV: &str = "CURRENTS_API_BASE_URL";

/// Base URL used when neither config nor environment name one.
pub const DEFAULT_API_BASE_URL: &str = "https://cy.currents.dev";

static GLOBAL_ENVIRONMENT: OnceCell<Environment> = OnceCell::new();

/// Where the reporting service lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Environment {
    api_base_url: String,
}

impl Environment {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self { api_base_url: api_base_url.into() }
    }

    /// Base URL without a trailing slash.
    pub fn api_base_url(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    /// Resolve the base URL from an explicit override, then `CURRENTS_API_BASE_URL`,
    /// then the default.
    pub fn resolve(override_url: Option<&str>) -> Self {
        Self::resolve_from(override_url, std::env::var(BASE_URL_ENV).ok())
    }

    fn resolve_from(override_url: Option<&str>, env_value: Option<String>) -> Self {
        let non_empty = |s: &str| !s.trim().is_empty();
        if let Some(url) = override_url.filter(|s| non_empty(s)) {
            return Self::new(url.trim());
        }
        if let Some(url) = env_value.as_deref().filter(|s| non_empty(s)) {
            return Self::new(url.trim());
        }
        Self::new(DEFAULT_API_BASE_URL)
    }

    /// Install the process-wide environment. Only the first call takes effect.
    pub fn install(environment: Environment) {
        let installed = GLOBAL_ENVIRONMENT.get_or_init(|| environment.clone());
        if *installed != environment {
            warn!(
                "API base URL already set to {}, ignoring {}",
                installed, environment
            );
        } else {
            debug!("Using API base URL {}", installed);
        }
    }

    /// The process-wide environment. Resolved from `CURRENTS_API_BASE_URL` if nothing was installed.
    pub fn current() -> &'static Environment {
        GLOBAL_ENVIRONMENT.get_or_init(|| Self::resolve(None))
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.api_base_url())
    }
}
