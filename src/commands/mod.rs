mod api_cmd;
mod cache_cmd;
mod config_cmd;
mod queue_cmd;
mod status;
mod sync_cmd;

pub use api_cmd::ApiCommand;
pub use cache_cmd::CacheCommand;
pub use config_cmd::{ConfigCommand, OutputFormat};
pub use queue_cmd::QueueCommand;
pub use status::StatusCommand;
pub use sync_cmd::SyncCommand;

/// Parses a `--data` argument as JSON.
pub(crate) fn parse_data(data: Option<&str>) -> Result<serde_json::Value, serde_json::Error> {
    match data {
        Some(raw) => serde_json::from_str(raw),
        None => Ok(serde_json::Value::Null),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_data() {
        assert_eq!(parse_data(None).unwrap(), serde_json::Value::Null);
        assert_eq!(
            parse_data(Some(r#"{"food":"rice"}"#)).unwrap(),
            json!({"food": "rice"})
        );
        assert!(parse_data(Some("{not json")).is_err());
    }
}
