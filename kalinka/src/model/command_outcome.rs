use serde::Deserialize;

/// Decoded reply to a single remote command
///
/// Only seek fills `position_ms`; its absence means the seek had no visible
/// effect on the server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommandOutcome {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "positionMs", alias = "position_ms")]
    pub position_ms: Option<u64>,
}

impl CommandOutcome {
    pub fn is_confirmed_seek(&self) -> bool {
        self.position_ms.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_seek_outcome() {
        let outcome: CommandOutcome =
            serde_json::from_str(r#"{"message":"ok","positionMs":5000}"#).unwrap();
        assert_eq!(outcome.message.as_deref(), Some("ok"));
        assert_eq!(outcome.position_ms, Some(5000));
        assert!(outcome.is_confirmed_seek());
    }

    #[test]
    fn test_decode_empty_object() {
        let outcome: CommandOutcome = serde_json::from_str("{}").unwrap();
        assert_eq!(outcome, CommandOutcome::default());
        assert!(!outcome.is_confirmed_seek());
    }
}
