use std::path::PathBuf;

use clap::{ArgAction, Parser};
use ggus_watch::config::Overrides;
use ggus_watch::types::{Delivery, QueryStatus};
use secrecy::SecretString;

#[allow(clippy::struct_excessive_bools)]
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Report new GGUS tickets for a support unit",
    long_about = None
)]
pub struct Cli {
    /// GGUS account name.
    pub username: String,

    /// GGUS account password.
    pub password: String,

    /// Support unit whose tickets are watched (e.g. "NGI_NL").
    #[arg(short = 's', long, value_name = "UNIT")]
    pub support_unit: Option<String>,

    /// Only report tickets affecting this site.
    #[arg(short = 'l', long, value_name = "SITE", conflicts_with = "site_pattern")]
    pub site: Option<String>,

    /// Only report tickets whose site matches this regular expression.
    #[arg(long, value_name = "REGEX")]
    pub site_pattern: Option<String>,

    /// Ticket status that counts as new (default "assigned").
    #[arg(long, value_name = "STATUS")]
    pub status: Option<String>,

    /// Reverse the order of the open ticket search.
    #[arg(short = 'r', long, action = ArgAction::SetTrue)]
    pub reverse: bool,

    /// Print a full status report of open or terminal tickets and exit.
    #[arg(long, value_name = "CLASS")]
    pub report: Option<QueryStatus>,

    /// Path of the TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Path of the seen-set database.
    #[arg(long, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Print the digest on stdout instead of mailing it.
    #[arg(long, action = ArgAction::SetTrue)]
    pub stdout: bool,

    /// Do not deliver anything, only log what would be sent.
    #[arg(long, action = ArgAction::SetTrue)]
    pub dry_run: bool,

    /// Accept plain HTTP GGUS URLs.
    #[arg(long, action = ArgAction::SetTrue)]
    pub insecure: bool,

    /// Emit logs as JSON (`--features json-logs`).
    #[arg(long, action = ArgAction::SetTrue)]
    pub json_logs: bool,

    /// Explicit log filter (e.g. "ggus_watch=debug").
    #[arg(long, value_name = "FILTER")]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            username: Some(self.username.clone()),
            password: Some(SecretString::from(self.password.clone())),
            support_unit: self.support_unit.clone(),
            site: self.site.clone(),
            site_pattern: self.site_pattern.clone(),
            status: self.status.clone(),
            reverse: self.reverse,
            store_path: self.db.clone(),
            delivery: self.stdout.then_some(Delivery::Stdout),
        }
    }
}
