//! Panel configuration
//!
//! Settings are layered the same way everywhere: built-in defaults, then an
//! optional TOML file, then `PM_PANEL_*` environment variables.

use crate::PanelResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Fallback API origin used when no base URL has been stored
pub const DEFAULT_API_BASE: &str = "http://localhost:5000";

/// Origin serving the panel's static pages
pub const DEFAULT_FRONTEND_ROOT: &str = "http://localhost:8000";

/// Delay before following a `data-redirect` after a successful save
pub const REDIRECT_DELAY_MS: u64 = 600;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "PM_PANEL";

/// Main panel configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSettings {
    /// API base used when the session store holds none
    pub api_base: String,

    /// Origin + directory of the panel's HTML pages
    pub frontend_root: String,

    /// Delay applied to post-save redirects, in milliseconds
    pub redirect_delay_ms: u64,

    /// Transport timeout in seconds (0 = none)
    pub timeout_secs: u64,

    /// User agent sent by the HTTP transport
    pub user_agent: String,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            frontend_root: DEFAULT_FRONTEND_ROOT.to_string(),
            redirect_delay_ms: REDIRECT_DELAY_MS,
            timeout_secs: 0,
            user_agent: format!("pm-panel/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl PanelSettings {
    /// Load settings from defaults, an optional file and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a value has the wrong type
    pub fn load(path: Option<&Path>) -> PanelResult<Self> {
        let defaults = Self::default();

        let mut builder = config::Config::builder()
            .set_default("api_base", defaults.api_base)?
            .set_default("frontend_root", defaults.frontend_root)?
            .set_default("redirect_delay_ms", defaults.redirect_delay_ms)?
            .set_default("timeout_secs", defaults.timeout_secs)?
            .set_default("user_agent", defaults.user_agent)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Frontend routes derived from `frontend_root`
    #[must_use]
    pub fn routes(&self) -> FrontendRoutes {
        FrontendRoutes::new(&self.frontend_root)
    }

    #[must_use]
    pub const fn redirect_delay(&self) -> Duration {
        Duration::from_millis(self.redirect_delay_ms)
    }

    /// Transport timeout, `None` when disabled
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }
}

/// Locations of the panel's own pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontendRoutes {
    root: String,
}

impl FrontendRoutes {
    /// Routes rooted at `root` (trailing slashes are dropped)
    pub fn new(root: impl AsRef<str>) -> Self {
        Self {
            root: root.as_ref().trim_end_matches('/').to_string(),
        }
    }

    /// Derive the root from the URL of the script hosting the panel
    ///
    /// The script lives one directory below the pages, so the root is the
    /// parent of the script's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if `script_url` is not an absolute URL
    pub fn from_script_url(script_url: &str) -> PanelResult<Self> {
        let parent = Url::parse(script_url)?.join("..")?;
        let root = format!(
            "{}{}",
            parent.origin().ascii_serialization(),
            parent.path().trim_end_matches('/')
        );
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Page hosting the login form
    #[must_use]
    pub fn login_page(&self) -> String {
        format!("{}/index.html", self.root)
    }

    /// Page shown right after a successful login
    #[must_use]
    pub fn landing_page(&self) -> String {
        format!("{}/users/list.html", self.root)
    }
}

impl Default for FrontendRoutes {
    fn default() -> Self {
        Self::new(DEFAULT_FRONTEND_ROOT)
    }
}
