use std::time::Duration;

use humantime::{format_duration, parse_duration};
use serde::Deserialize;
use serde_with::{DeserializeAs, SerializeAs};

/// `serde_with` adapter reading durations such as `"30s"` or `"2m"`.
pub(crate) struct HumantimeDuration;

impl<'de> DeserializeAs<'de, Duration> for HumantimeDuration {
    fn deserialize_as<D>(deserializer: D) -> std::result::Result<Duration, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}

impl SerializeAs<Duration> for HumantimeDuration {
    fn serialize_as<S>(value: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format_duration(*value).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::HumantimeDuration;
    use serde::Deserialize;
    use serde_with::serde_as;
    use std::time::Duration;

    #[serde_as]
    #[derive(Deserialize)]
    struct Timeouts {
        #[serde_as(as = "HumantimeDuration")]
        request: Duration,
        #[serde_as(as = "Option<HumantimeDuration>")]
        smtp: Option<Duration>,
    }

    #[test]
    fn humantime_duration_parses_strings() {
        let parsed: Timeouts =
            match serde_json::from_str(r#"{"request":" 2m ","smtp":"30s"}"#) {
                Ok(value) => value,
                Err(err) => panic!("failed to parse sample json: {err}"),
            };
        assert_eq!(parsed.request, Duration::from_secs(120));
        assert_eq!(parsed.smtp, Some(Duration::from_secs(30)));
    }

    #[test]
    fn humantime_duration_rejects_garbage() {
        let parsed = serde_json::from_str::<Timeouts>(r#"{"request":"soon","smtp":null}"#);
        assert!(parsed.is_err());
    }
}
