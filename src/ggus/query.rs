use crate::types::{QueryStatus, Timeframe};

/// Parameters of one GGUS ticket search.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TicketQuery {
    support_unit: String,
    status: QueryStatus,
    site: Option<String>,
    timeframe: Timeframe,
}

impl TicketQuery {
    pub fn new(support_unit: impl Into<String>, status: QueryStatus) -> Self {
        Self {
            support_unit: support_unit.into(),
            status,
            site: None,
            timeframe: status.default_timeframe(),
        }
    }

    #[must_use]
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.site = Some(site.into());
        self
    }

    #[must_use]
    pub const fn status(&self) -> QueryStatus {
        self.status
    }

    /// Query pairs of the search form, in form order. Values are encoded by
    /// the HTTP client, never spliced into the URL by hand.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("mode", "ticket_search"),
            ("ticket_id", ""),
            ("supportunit", self.support_unit.as_str()),
            ("su_hierarchy", "0"),
            ("vo", "all"),
            ("user", ""),
            ("keyword", ""),
            ("involvedsupporter", ""),
            ("assignedto", ""),
            ("affectedsite", self.site.as_deref().unwrap_or_default()),
            ("specattrib", "none"),
            ("status", self.status.as_str()),
            ("priority", ""),
            ("typeofproblem", "all"),
            ("ticket_category", "all"),
            ("mouarea", ""),
            ("date_type", "creation date"),
            ("tf_radio", "1"),
            ("timeframe", self.timeframe.as_str()),
            ("from_date", ""),
            ("to_date", ""),
            ("untouched_date", ""),
            ("orderticketsby", "REQUEST_ID"),
            ("orderhow", "desc"),
            ("search_submit", "GO!"),
            ("writeFormat", "XML"),
        ]
    }
}
