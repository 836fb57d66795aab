pub(crate) mod client;
pub(crate) mod models;
pub(crate) mod ops;
pub(crate) mod parse;
pub(crate) mod query;

pub use client::GgusClient;
pub use models::{Field, Ticket};
pub use parse::parse_tickets;
pub use query::TicketQuery;
