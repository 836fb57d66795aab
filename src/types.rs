use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Status class understood by the GGUS ticket search form.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    Open,
    Terminal,
}

impl QueryStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Terminal => "terminal",
        }
    }

    /// Open tickets are searched over their whole lifetime, closed ones only
    /// over the last month.
    #[must_use]
    pub const fn default_timeframe(self) -> Timeframe {
        match self {
            Self::Open => Timeframe::Any,
            Self::Terminal => Timeframe::LastMonth,
        }
    }
}

impl Display for QueryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "terminal" | "closed" => Ok(Self::Terminal),
            other => Err(format!("unknown status class: {other}")),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Timeframe {
    Any,
    LastMonth,
}

impl Timeframe {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::LastMonth => "lastmonth",
        }
    }
}

/// Where a digest ends up once rendered.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Delivery {
    Mail,
    Stdout,
}

impl FromStr for Delivery {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mail" | "smtp" => Ok(Self::Mail),
            "stdout" | "print" => Ok(Self::Stdout),
            other => Err(format!("unknown delivery: {other}")),
        }
    }
}

/// Workflow state of a GGUS ticket.
///
/// Unrecognised states are kept verbatim in [`TicketStatus::Other`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TicketStatus {
    Assigned,
    InProgress,
    WaitingForReply,
    OnHold,
    Reopened,
    Solved,
    Unsolved,
    Verified,
    Closed,
    Other(String),
}

impl TicketStatus {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Assigned => "assigned",
            Self::InProgress => "in progress",
            Self::WaitingForReply => "waiting for reply",
            Self::OnHold => "on hold",
            Self::Reopened => "reopened",
            Self::Solved => "solved",
            Self::Unsolved => "unsolved",
            Self::Verified => "verified",
            Self::Closed => "closed",
            Self::Other(raw) => raw,
        }
    }

    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Solved | Self::Unsolved | Self::Verified | Self::Closed
        )
    }
}

impl Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for TicketStatus {
    fn from(raw: &str) -> Self {
        let normalized = raw.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "assigned" => Self::Assigned,
            "in progress" => Self::InProgress,
            "waiting for reply" => Self::WaitingForReply,
            "on hold" => Self::OnHold,
            "reopened" => Self::Reopened,
            "solved" => Self::Solved,
            "unsolved" => Self::Unsolved,
            "verified" => Self::Verified,
            "closed" => Self::Closed,
            _ => Self::Other(raw.trim().to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Delivery, QueryStatus, TicketStatus, Timeframe};
    use std::str::FromStr;

    #[test]
    fn query_status_from_str_accepts_variants() {
        assert_eq!(QueryStatus::from_str("OPEN"), Ok(QueryStatus::Open));
        assert_eq!(QueryStatus::from_str("closed"), Ok(QueryStatus::Terminal));
        assert!(QueryStatus::from_str("pending").is_err());
    }

    #[test]
    fn terminal_queries_default_to_last_month() {
        assert_eq!(QueryStatus::Open.default_timeframe(), Timeframe::Any);
        assert_eq!(
            QueryStatus::Terminal.default_timeframe().as_str(),
            "lastmonth"
        );
    }

    #[test]
    fn ticket_status_is_case_insensitive() {
        assert_eq!(TicketStatus::from("ASSIGNED"), TicketStatus::Assigned);
        assert_eq!(TicketStatus::from("In Progress"), TicketStatus::InProgress);
        assert_eq!(
            TicketStatus::from("waiting_for_reply"),
            TicketStatus::WaitingForReply
        );
        assert_eq!(
            TicketStatus::from(" escalated "),
            TicketStatus::Other("escalated".to_string())
        );
    }

    #[test]
    fn only_closing_states_are_terminal() {
        assert!(TicketStatus::Verified.is_terminal());
        assert!(TicketStatus::Unsolved.is_terminal());
        assert!(!TicketStatus::Assigned.is_terminal());
        assert!(!TicketStatus::Other("closed?".to_string()).is_terminal());
    }

    #[test]
    fn delivery_accepts_aliases() {
        assert_eq!(Delivery::from_str("smtp"), Ok(Delivery::Mail));
        assert_eq!(Delivery::from_str("Print"), Ok(Delivery::Stdout));
    }
}
