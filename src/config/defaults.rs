use std::path::PathBuf;
use std::time::Duration;

pub(super) fn default_base_url() -> String {
    "https://ggus.eu/".to_string()
}

pub(super) fn default_support_unit() -> String {
    "NGI_NL".to_string()
}

pub(super) fn default_status() -> String {
    "assigned".to_string()
}

pub(super) const fn default_include_unsited() -> bool {
    true
}

pub(super) fn default_store_path() -> PathBuf {
    PathBuf::from("ggus.db")
}

pub(super) fn default_link_template() -> String {
    "https://ggus.eu/ws/ticket_info.php?ticket={ticket_id}".to_string()
}

pub(super) fn default_subject_label() -> String {
    "GRID: New GGUS tickets".to_string()
}

pub(super) fn default_delivery() -> String {
    "stdout".to_string()
}

pub(super) fn default_smtp_host() -> String {
    "localhost".to_string()
}

pub(super) const fn default_smtp_port() -> u16 {
    25
}

pub(super) const fn default_smtp_timeout() -> Duration {
    Duration::from_secs(30)
}

pub(super) const fn default_http_timeout() -> Duration {
    Duration::from_secs(30)
}

pub(super) const fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}
