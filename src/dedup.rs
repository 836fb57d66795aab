//! Decides which fetched tickets are new to the operator and which
//! already-notified ids must be forgotten.

use std::collections::{BTreeSet, HashSet};

use regex::Regex;
use tracing::debug;

use crate::ggus::Ticket;
use crate::types::TicketStatus;

#[derive(Clone, Debug)]
pub enum SiteFilter {
    Exact(String),
    Pattern(Regex),
}

impl SiteFilter {
    #[must_use]
    pub fn matches(&self, site: &str) -> bool {
        match self {
            Self::Exact(name) => name == site,
            Self::Pattern(pattern) => pattern.is_match(site),
        }
    }

    /// Human-readable name of the filter, used in report headers.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Exact(name) => name,
            Self::Pattern(pattern) => pattern.as_str(),
        }
    }
}

/// The slice of GGUS an operator is responsible for.
#[derive(Clone, Debug)]
pub struct Scope {
    /// Status a ticket must carry to be reported and kept in the seen-set.
    pub tracked_status: TicketStatus,
    pub site: Option<SiteFilter>,
    /// Report tickets addressed to the support unit rather than a site.
    pub include_unsited: bool,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            tracked_status: TicketStatus::Assigned,
            site: None,
            include_unsited: true,
        }
    }
}

impl Scope {
    #[must_use]
    pub fn tracks(&self, ticket: &Ticket) -> bool {
        ticket.status_is(&self.tracked_status)
    }

    /// Site-level half of the scope check, independent of status.
    #[must_use]
    pub fn covers_site(&self, ticket: &Ticket) -> bool {
        match (ticket.site(), &self.site) {
            (None, _) => self.include_unsited,
            (Some(_), None) => true,
            (Some(site), Some(filter)) => filter.matches(site),
        }
    }

    #[must_use]
    pub fn contains(&self, ticket: &Ticket) -> bool {
        self.tracks(ticket) && self.covers_site(ticket)
    }
}

/// Seen-set mutations for one run.
#[derive(Clone, Debug, Default)]
pub struct Reconciliation {
    /// In-scope tickets not reported before, in fetched order.
    pub newly_seen: Vec<Ticket>,
    /// Ids to forget: open tickets that left the tracked status or are closed,
    /// and every ticket of the terminal search.
    pub to_drop: BTreeSet<String>,
}

impl Reconciliation {
    pub fn new_ids(&self) -> impl Iterator<Item = &str> {
        self.newly_seen.iter().map(|ticket| ticket.id.as_str())
    }
}

/// Compare one run's searches with the seen-set.
///
/// A ticket seen in the terminal search is dropped even when the open search
/// still shows it in scope; it is then neither recorded nor reported. A
/// ticket in a terminal state is never recorded, whatever status is tracked.
#[must_use]
pub fn reconcile(
    open: &[Ticket],
    terminal: &[Ticket],
    seen: &HashSet<String>,
    scope: &Scope,
) -> Reconciliation {
    let mut to_drop: BTreeSet<String> = open
        .iter()
        .filter(|ticket| {
            let closed = ticket.status.present().is_some_and(TicketStatus::is_terminal);
            if closed {
                debug!(
                    id = %ticket.id,
                    status = ticket.status_label(),
                    "open search returned a closed ticket"
                );
            }
            closed || !scope.tracks(ticket)
        })
        .map(|ticket| ticket.id.clone())
        .collect();
    to_drop.extend(terminal.iter().map(|ticket| ticket.id.clone()));

    let mut queued = HashSet::new();
    let newly_seen = open
        .iter()
        .filter(|ticket| scope.contains(ticket))
        .filter(|ticket| !seen.contains(&ticket.id) && !to_drop.contains(&ticket.id))
        .filter(|ticket| queued.insert(ticket.id.as_str()))
        .cloned()
        .collect();

    Reconciliation {
        newly_seen,
        to_drop,
    }
}
