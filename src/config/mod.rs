use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::Result;
use crate::dedup::Scope;
use crate::error::Error as WatchError;
use crate::report::RenderOptions;
use crate::types::Delivery;

mod defaults;
mod env;
mod raw;
mod serde;

pub(crate) use self::serde::HumantimeDuration;

const TICKET_ID_PLACEHOLDER: &str = "{ticket_id}";

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: Url,
    pub credentials: Credentials,
    pub support_unit: String,
    pub scope: Scope,
    pub reverse: bool,
    pub store_path: PathBuf,
    pub link_template: String,
    pub subject_label: String,
    pub delivery: Delivery,
    pub mail: MailSettings,
    pub http_connect_timeout: Duration,
    pub http_request_timeout: Duration,
}

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    pub from: Option<String>,
    pub to: Vec<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub timeout: Duration,
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub support_unit: Option<String>,
    pub site: Option<String>,
    pub site_pattern: Option<String>,
    pub status: Option<String>,
    pub reverse: bool,
    pub store_path: Option<PathBuf>,
    pub delivery: Option<Delivery>,
}

impl Config {
    /// Load configuration from a file, the environment and command-line
    /// overrides, in increasing order of precedence.
    ///
    /// # Errors
    ///
    /// Returns an error when the configuration file cannot be parsed, when
    /// environment overrides are invalid, or when the resulting values fail
    /// validation.
    pub fn load(path: impl AsRef<Path>, overrides: Overrides) -> Result<Self> {
        let mut raw = raw::load(path).map_err(WatchError::from)?;
        raw.apply_env_overrides().map_err(WatchError::from)?;
        raw.apply_overrides(overrides);
        raw.validate_and_build()
    }

    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            support_unit: self.support_unit.clone(),
            link_template: self.link_template.clone(),
            subject_label: self.subject_label.clone(),
        }
    }

    /// Title of status reports: the site filter if any, else the support unit.
    #[must_use]
    pub fn report_title(&self) -> &str {
        self.scope
            .site
            .as_ref()
            .map_or(self.support_unit.as_str(), |site| site.label())
    }
}

#[cfg(test)]
mod tests {
    use super::raw::RawConfig;
    use super::{Config, Overrides};
    use crate::dedup::SiteFilter;
    use crate::error::{ConfigError, Error};
    use crate::types::{Delivery, TicketStatus};
    use secrecy::{ExposeSecret, SecretString};

    fn with_credentials() -> Overrides {
        Overrides {
            username: Some("operator".to_string()),
            password: Some(SecretString::from("hunter2")),
            ..Overrides::default()
        }
    }

    fn build(overrides: Overrides) -> crate::Result<Config> {
        let mut raw = RawConfig::default();
        raw.apply_overrides(overrides);
        raw.validate_and_build()
    }

    #[test]
    fn defaults_follow_the_ngi_deployment() {
        let config = build(with_credentials()).unwrap();
        assert_eq!(config.base_url.as_str(), "https://ggus.eu/");
        assert_eq!(config.support_unit, "NGI_NL");
        assert_eq!(config.scope.tracked_status, TicketStatus::Assigned);
        assert!(config.scope.include_unsited);
        assert_eq!(config.delivery, Delivery::Stdout);
        assert_eq!(config.credentials.password.expose_secret(), "hunter2");
        assert_eq!(config.report_title(), "NGI_NL");
    }

    #[test]
    fn credentials_are_required() {
        let err = build(Overrides::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField { field: "ggus.username" })
        ));
    }

    #[test]
    fn command_line_site_and_status_apply() {
        let config = build(Overrides {
            site: Some("SARA-MATRIX".to_string()),
            status: Some("In Progress".to_string()),
            reverse: true,
            ..with_credentials()
        })
        .unwrap();
        assert!(matches!(&config.scope.site, Some(SiteFilter::Exact(site)) if site == "SARA-MATRIX"));
        assert_eq!(config.scope.tracked_status, TicketStatus::InProgress);
        assert!(config.reverse);
        assert_eq!(config.report_title(), "SARA-MATRIX");
    }

    #[test]
    fn site_and_pattern_are_exclusive() {
        let err = build(Overrides {
            site: Some("SARA-MATRIX".to_string()),
            site_pattern: Some("^SARA-".to_string()),
            ..with_credentials()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidField { field: "ggus.site_pattern", .. })
        ));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let err = build(Overrides {
            site_pattern: Some("SARA-(".to_string()),
            ..with_credentials()
        })
        .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::InvalidField { .. })));
    }

    #[test]
    fn mail_delivery_needs_recipients() {
        let err = build(Overrides {
            delivery: Some(Delivery::Mail),
            ..with_credentials()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField { field: "notify.from" })
        ));
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let config = build(with_credentials()).unwrap();
        let rendered = format!("{:?}", config.credentials);
        assert!(!rendered.contains("hunter2"));
    }
}
