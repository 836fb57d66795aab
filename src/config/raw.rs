use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_with::serde_as;
use url::Url;

use crate::Result;
use crate::dedup::{Scope, SiteFilter};
use crate::error::ConfigError;
use crate::types::{Delivery, TicketStatus};

use super::defaults::{
    default_base_url, default_connect_timeout, default_delivery, default_http_timeout,
    default_include_unsited, default_link_template, default_smtp_host, default_smtp_port,
    default_smtp_timeout, default_status, default_store_path, default_subject_label,
    default_support_unit,
};
use super::env::{env_bool, env_duration, env_list, env_parse, env_string};
use super::{
    Config, Credentials, HumantimeDuration, MailSettings, Overrides, TICKET_ID_PLACEHOLDER,
};

pub(super) fn load(path: impl AsRef<Path>) -> std::result::Result<RawConfig, ConfigError> {
    let mut builder = ::config::Config::builder();
    let path = path.as_ref();
    builder = builder.add_source(::config::File::from(path).required(false));
    builder = builder.add_source(
        ::config::Environment::with_prefix("GGUS_WATCH")
            .separator("__")
            .try_parsing(true),
    );

    builder
        .build()
        .map_err(|err| ConfigError::Other(err.to_string()))?
        .try_deserialize()
        .map_err(|err| ConfigError::Parse(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub(super) ggus: RawGgus,
    #[serde(default)]
    pub(super) store: RawStore,
    #[serde(default)]
    pub(super) report: RawReport,
    #[serde(default)]
    pub(super) notify: RawNotify,
    #[serde(default)]
    pub(super) http: RawHttp,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawGgus {
    #[serde(default = "default_base_url")]
    pub(super) url: String,
    pub(super) username: Option<String>,
    pub(super) password: Option<String>,
    #[serde(default = "default_support_unit")]
    pub(super) support_unit: String,
    #[serde(default)]
    pub(super) site: Option<String>,
    #[serde(default)]
    pub(super) site_pattern: Option<String>,
    #[serde(default = "default_status")]
    pub(super) status: String,
    #[serde(default = "default_include_unsited")]
    pub(super) include_unsited: bool,
    #[serde(default)]
    pub(super) reverse: bool,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawStore {
    #[serde(default = "default_store_path")]
    pub(super) path: PathBuf,
}

#[derive(Debug, Deserialize)]
pub(super) struct RawReport {
    #[serde(default = "default_link_template")]
    pub(super) link_template: String,
    #[serde(default = "default_subject_label")]
    pub(super) subject_label: String,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawNotify {
    #[serde(default = "default_delivery")]
    pub(super) delivery: String,
    #[serde(default)]
    pub(super) from: Option<String>,
    #[serde(default)]
    pub(super) to: Vec<String>,
    #[serde(default = "default_smtp_host")]
    pub(super) smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub(super) smtp_port: u16,
    #[serde(default = "default_smtp_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) timeout: Duration,
}

#[serde_as]
#[derive(Debug, Deserialize)]
pub(super) struct RawHttp {
    #[serde(default = "default_http_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) timeout: Duration,
    #[serde(default = "default_connect_timeout")]
    #[serde_as(as = "HumantimeDuration")]
    pub(super) connect_timeout: Duration,
}

impl RawConfig {
    pub(super) fn apply_env_overrides(&mut self) -> std::result::Result<(), ConfigError> {
        if let Some(url) = env_string("GGUS_URL")? {
            self.ggus.url = url;
        }
        if let Some(username) = env_string("GGUS_USER")? {
            self.ggus.username = Some(username);
        }
        if let Some(password) = env_string("GGUS_PASSWORD")? {
            self.ggus.password = Some(password);
        }
        if let Some(support_unit) = env_string("GGUS_SUPPORT_UNIT")? {
            self.ggus.support_unit = support_unit;
        }
        if let Some(site) = env_string("GGUS_SITE")? {
            self.ggus.site = Some(site);
        }
        if let Some(status) = env_string("GGUS_STATUS")? {
            self.ggus.status = status;
        }
        if let Some(reverse) = env_bool("GGUS_REVERSE")? {
            self.ggus.reverse = reverse;
        }
        if let Some(path) = env_string("GGUS_DB")? {
            self.store.path = PathBuf::from(path);
        }
        if let Some(delivery) = env_string("GGUS_DELIVERY")? {
            self.notify.delivery = delivery;
        }
        if let Some(from) = env_string("MAIL_FROM")? {
            self.notify.from = Some(from);
        }
        if let Some(to) = env_list("MAIL_TO")? {
            self.notify.to = to;
        }
        if let Some(host) = env_string("SMTP_HOST")? {
            self.notify.smtp_host = host;
        }
        if let Some(port) = env_parse::<u16>("SMTP_PORT")? {
            self.notify.smtp_port = port;
        }
        if let Some(timeout) = env_duration("HTTP_TIMEOUT")? {
            self.http.timeout = timeout;
        }
        Ok(())
    }

    pub(super) fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(username) = overrides.username {
            self.ggus.username = Some(username);
        }
        if let Some(password) = overrides.password {
            self.ggus.password = Some(password.expose_secret().to_string());
        }
        if let Some(support_unit) = overrides.support_unit {
            self.ggus.support_unit = support_unit;
        }
        if let Some(site) = overrides.site {
            self.ggus.site = Some(site);
        }
        if let Some(pattern) = overrides.site_pattern {
            self.ggus.site_pattern = Some(pattern);
        }
        if let Some(status) = overrides.status {
            self.ggus.status = status;
        }
        if overrides.reverse {
            self.ggus.reverse = true;
        }
        if let Some(path) = overrides.store_path {
            self.store.path = path;
        }
        if let Some(delivery) = overrides.delivery {
            self.notify.delivery = match delivery {
                Delivery::Mail => "mail",
                Delivery::Stdout => "stdout",
            }
            .to_string();
        }
    }

    pub(super) fn validate_and_build(self) -> Result<Config> {
        let base_url = Url::parse(&self.ggus.url).map_err(|err| ConfigError::InvalidField {
            field: "ggus.url",
            message: err.to_string(),
        })?;

        let username = self
            .ggus
            .username
            .filter(|name| !name.trim().is_empty())
            .ok_or(ConfigError::MissingField {
                field: "ggus.username",
            })?;
        let password = self.ggus.password.ok_or(ConfigError::MissingField {
            field: "ggus.password",
        })?;

        if self.ggus.support_unit.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "ggus.support_unit",
                message: "support unit cannot be empty".to_string(),
            }
            .into());
        }
        if self.ggus.status.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "ggus.status",
                message: "tracked status cannot be empty".to_string(),
            }
            .into());
        }

        let site = match (non_empty(self.ggus.site), non_empty(self.ggus.site_pattern)) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::InvalidField {
                    field: "ggus.site_pattern",
                    message: "set either a site or a site pattern, not both".to_string(),
                }
                .into());
            }
            (Some(site), None) => Some(SiteFilter::Exact(site)),
            (None, Some(pattern)) => {
                let regex = Regex::new(&pattern).map_err(|err| ConfigError::InvalidField {
                    field: "ggus.site_pattern",
                    message: err.to_string(),
                })?;
                Some(SiteFilter::Pattern(regex))
            }
            (None, None) => None,
        };

        if !self.report.link_template.contains(TICKET_ID_PLACEHOLDER) {
            return Err(ConfigError::InvalidField {
                field: "report.link_template",
                message: format!("template must contain {TICKET_ID_PLACEHOLDER}"),
            }
            .into());
        }

        let delivery = Delivery::from_str(&self.notify.delivery).map_err(|err| {
            ConfigError::InvalidField {
                field: "notify.delivery",
                message: err,
            }
        })?;
        let to: Vec<String> = self
            .notify
            .to
            .into_iter()
            .map(|addr| addr.trim().to_string())
            .filter(|addr| !addr.is_empty())
            .collect();
        if delivery == Delivery::Mail {
            if self.notify.from.is_none() {
                return Err(ConfigError::MissingField {
                    field: "notify.from",
                }
                .into());
            }
            if to.is_empty() {
                return Err(ConfigError::MissingField { field: "notify.to" }.into());
            }
        }

        for (field, value) in [
            ("http.timeout", self.http.timeout),
            ("http.connect_timeout", self.http.connect_timeout),
            ("notify.timeout", self.notify.timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidField {
                    field,
                    message: "duration must be greater than zero".to_string(),
                }
                .into());
            }
        }

        Ok(Config {
            base_url,
            credentials: Credentials {
                username,
                password: SecretString::from(password),
            },
            support_unit: self.ggus.support_unit,
            scope: Scope {
                tracked_status: TicketStatus::from(self.ggus.status.as_str()),
                site,
                include_unsited: self.ggus.include_unsited,
            },
            reverse: self.ggus.reverse,
            store_path: self.store.path,
            link_template: self.report.link_template,
            subject_label: self.report.subject_label,
            delivery,
            mail: MailSettings {
                from: self.notify.from,
                to,
                smtp_host: self.notify.smtp_host,
                smtp_port: self.notify.smtp_port,
                timeout: self.notify.timeout,
            },
            http_connect_timeout: self.http.connect_timeout,
            http_request_timeout: self.http.timeout,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Default for RawGgus {
    fn default() -> Self {
        Self {
            url: default_base_url(),
            username: None,
            password: None,
            support_unit: default_support_unit(),
            site: None,
            site_pattern: None,
            status: default_status(),
            include_unsited: default_include_unsited(),
            reverse: false,
        }
    }
}

impl Default for RawStore {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

impl Default for RawReport {
    fn default() -> Self {
        Self {
            link_template: default_link_template(),
            subject_label: default_subject_label(),
        }
    }
}

impl Default for RawNotify {
    fn default() -> Self {
        Self {
            delivery: default_delivery(),
            from: None,
            to: Vec::new(),
            smtp_host: default_smtp_host(),
            smtp_port: default_smtp_port(),
            timeout: default_smtp_timeout(),
        }
    }
}

impl Default for RawHttp {
    fn default() -> Self {
        Self {
            timeout: default_http_timeout(),
            connect_timeout: default_connect_timeout(),
        }
    }
}
