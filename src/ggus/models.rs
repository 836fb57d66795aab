use crate::types::TicketStatus;

/// Value of a tag looked up in a ticket record.
///
/// `Absent` means the tag was missing; a tag with no text is
/// `Present(String::new())`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum Field<T> {
    Present(T),
    #[default]
    Absent,
}

impl<T> Field<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Self::Present(value) => Field::Present(f(value)),
            Self::Absent => Field::Absent,
        }
    }

    pub const fn present(&self) -> Option<&T> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }

    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl<T> From<Option<T>> for Field<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Self::Present)
    }
}

impl Field<String> {
    /// Text for display; absent values render blank.
    pub fn display(&self) -> &str {
        self.present().map_or("", String::as_str)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Ticket {
    pub id: String,
    pub status: Field<TicketStatus>,
    pub affected_site: Field<String>,
    pub created: Field<String>,
    pub last_update: Field<String>,
    pub subject: Field<String>,
    pub ticket_type: Field<String>,
    pub scope: Field<String>,
    pub vo: Field<String>,
}

impl Ticket {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: Field::Absent,
            affected_site: Field::Absent,
            created: Field::Absent,
            last_update: Field::Absent,
            subject: Field::Absent,
            ticket_type: Field::Absent,
            scope: Field::Absent,
            vo: Field::Absent,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = Field::Present(status);
        self
    }

    #[must_use]
    pub fn with_site(mut self, site: impl Into<String>) -> Self {
        self.affected_site = Field::Present(site.into());
        self
    }

    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Field::Present(subject.into());
        self
    }

    /// The affected site, if the ticket names one. Empty and absent sites
    /// both mean the ticket is addressed to the support unit as a whole.
    pub fn site(&self) -> Option<&str> {
        self.affected_site
            .present()
            .map(|site| site.trim())
            .filter(|site| !site.is_empty())
    }

    pub fn status_is(&self, status: &TicketStatus) -> bool {
        self.status.present() == Some(status)
    }

    pub fn status_label(&self) -> &str {
        self.status.present().map_or("", TicketStatus::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::{Field, Ticket};
    use crate::types::TicketStatus;

    #[test]
    fn empty_and_absent_sites_are_distinct_but_both_unsited() {
        let empty = Ticket::new("1").with_site("");
        let absent = Ticket::new("1");
        assert_ne!(empty.affected_site, absent.affected_site);
        assert!(empty.site().is_none());
        assert!(absent.site().is_none());
        assert_eq!(Ticket::new("2").with_site(" NIKHEF ").site(), Some("NIKHEF"));
    }

    #[test]
    fn absent_status_matches_nothing() {
        let ticket = Ticket::new("3");
        assert!(!ticket.status_is(&TicketStatus::Assigned));
        assert_eq!(ticket.status_label(), "");
    }

    #[test]
    fn field_converts_from_option() {
        assert_eq!(Field::from(Some(4)), Field::Present(4));
        assert!(Field::<i32>::from(None).is_absent());
        assert_eq!(Field::Present(2).map(|v| v * 2), Field::Present(4));
    }
}
