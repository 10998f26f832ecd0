pub mod format;
pub mod pagination;

use serde::{Deserialize, Deserializer};

/// Deserialize a field that distinguishes "absent" from "present but null".
///
/// `Option<Option<T>>` with this helper: `None` means the key was omitted,
/// `Some(None)` means the client sent an explicit null (clear the column).
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, serde::Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "double_option")]
        comment: Option<Option<String>>,
    }

    #[test]
    fn absent_null_and_value_are_distinct() {
        let absent: Patch = serde_json::from_str("{}").unwrap();
        assert!(absent.comment.is_none());

        let null: Patch = serde_json::from_str(r#"{"comment": null}"#).unwrap();
        assert_eq!(null.comment, Some(None));

        let set: Patch = serde_json::from_str(r#"{"comment": "nice"}"#).unwrap();
        assert_eq!(set.comment, Some(Some("nice".to_string())));
    }
}
