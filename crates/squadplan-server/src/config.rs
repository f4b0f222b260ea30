//! Server configuration.
//!
//! Every option can be given as a flag or an environment variable. The
//! parsed [`ServerConfig`] is turned into an immutable [`Settings`] once at
//! startup and shared by all requests.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{ArgAction, Parser, builder::BoolishValueParser};
use squadplan_auth::{AuthConfig, Credentials};
use squadplan_core::{CategoryPolicy, WeekendDays};

/// Secret shipped as the default; sessions signed with it can be forged.
pub const DEFAULT_SECRET: &str = "CHANGE_ME";

/// Default width of one day in the planning chart, in pixels.
pub const DEFAULT_DAY_PX: u32 = 32;

/// SquadPlan server - browser editor for squad resource plans
#[derive(Parser, Debug, Clone)]
#[command(name = "squadplan")]
#[command(about = "Browser editor for squad resource-planning configurations", long_about = None)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long = "bind", env = "BIND_ADDR", default_value = "0.0.0.0:8000")]
    pub bind: SocketAddr,

    /// Path of the XML planning file
    #[arg(long, env = "CONFIG_PATH", default_value = "data/resource_config.xml")]
    pub config_path: PathBuf,

    /// Administrator username
    #[arg(long, env = "ADMIN_USER", default_value = "admin")]
    pub admin_user: String,

    /// Administrator password
    #[arg(long, env = "ADMIN_PW", default_value = "admin123", hide_env_values = true)]
    pub admin_password: String,

    /// Viewer username
    #[arg(long, env = "VIEWER_USER", default_value = "viewer")]
    pub viewer_user: String,

    /// Viewer password
    #[arg(long, env = "VIEWER_PW", default_value = "viewer123", hide_env_values = true)]
    pub viewer_password: String,

    /// Secret used to sign session cookies
    #[arg(long, env = "SECRET_KEY", default_value = DEFAULT_SECRET, hide_env_values = true)]
    pub secret_key: String,

    /// Treat every request as the administrator
    #[arg(
        long,
        env = "DISABLE_AUTH",
        default_value_t = true,
        action = ArgAction::Set,
        value_parser = BoolishValueParser::new()
    )]
    pub disable_auth: bool,

    /// Weekend weekdays, Monday = 0 … Sunday = 6
    #[arg(long, env = "WEEKEND_DAYS", default_value = "3,4")]
    pub weekend_days: String,

    /// Comma-separated category labels to accept (default: any)
    #[arg(long, env = "ALLOWED_CATEGORIES")]
    pub allowed_categories: Option<String>,

    /// Width of one day in the planning chart, in pixels
    #[arg(long, env = "DAY_PX", default_value_t = DEFAULT_DAY_PX)]
    pub day_px: u32,
}

impl ServerConfig {
    /// Validate and freeze the configuration.
    ///
    /// A weekend covering all seven days is rejected: no work day could
    /// ever be reached.
    pub fn settings(&self) -> squadplan_core::Result<Settings> {
        let weekend: WeekendDays = self.weekend_days.parse()?;
        if weekend.covers_whole_week() {
            return Err(squadplan_core::Error::invalid_configuration(format!(
                "WEEKEND_DAYS {:?} covers the whole week",
                self.weekend_days
            )));
        }
        Ok(Settings {
            config_path: self.config_path.clone(),
            auth: AuthConfig {
                bypass: self.disable_auth,
                admin: Credentials::new(&self.admin_user, &self.admin_password),
                viewer: Credentials::new(&self.viewer_user, &self.viewer_password),
            },
            secret_key: self.secret_key.clone(),
            weekend,
            categories: CategoryPolicy::from_list(self.allowed_categories.as_deref()),
            day_px: self.day_px,
        })
    }
}

/// Immutable process-wide settings.
#[derive(Clone, Debug)]
pub struct Settings {
    /// Path of the XML planning file.
    pub config_path: PathBuf,
    /// Credentials and bypass flag.
    pub auth: AuthConfig,
    /// Secret the session cookie key is derived from.
    pub secret_key: String,
    /// Non-working weekdays.
    pub weekend: WeekendDays,
    /// Which category labels load/save accept.
    pub categories: CategoryPolicy,
    /// Width of one day in the planning chart.
    pub day_px: u32,
}

impl Settings {
    /// Default settings for a planning file at `config_path`.
    pub fn for_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            auth: AuthConfig::default(),
            secret_key: DEFAULT_SECRET.to_string(),
            weekend: WeekendDays::default(),
            categories: CategoryPolicy::Any,
            day_px: DEFAULT_DAY_PX,
        }
    }
}
