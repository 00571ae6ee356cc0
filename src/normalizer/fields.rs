//! Lenient accessors over model-produced JSON.
//!
//! Models drift on field names and types; these helpers accept the common
//! variants so that the typed result always comes out complete.

use serde_json::{Map, Value};

pub(super) type Object = Map<String, Value>;

const PLACEHOLDERS: &[&str] = &[
    "", "-", "n/a", "na", "none", "null", "tbd", "unknown", "unassigned", "no_deadline",
    "no deadline", "not specified",
];

/// First non-null value among `keys`.
pub(super) fn pick<'a>(obj: &'a Object, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

pub(super) fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Text that is not one of the "nobody"/"never" placeholders models emit.
pub(super) fn meaningful_text(value: Option<&Value>) -> Option<String> {
    text(value).filter(|s| !PLACEHOLDERS.contains(&s.to_ascii_lowercase().as_str()))
}

/// A list of strings. A lone string becomes a one-element list; objects
/// inside the list contribute their `name`/`text`-like field.
pub(super) fn text_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(list_entry).collect(),
        Some(other) => text(Some(other)).into_iter().collect(),
        None => Vec::new(),
    }
}

fn list_entry(value: &Value) -> Option<String> {
    match value {
        Value::Object(obj) => text(pick(
            obj,
            &["name", "text", "description", "point", "item", "value"],
        )),
        other => text(Some(other)),
    }
}

pub(super) fn flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        _ => None,
    }
}

/// The objects of an array value; non-object entries are skipped.
pub(super) fn objects(value: Option<&Value>) -> Vec<&Object> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(Value::as_object).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Object {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_pick_skips_null_and_missing() {
        let o = obj(json!({"owner": null, "assignee": "Sarah"}));
        assert_eq!(pick(&o, &["owner", "assignee"]), Some(&json!("Sarah")));
        assert_eq!(pick(&o, &["missing"]), None);
    }

    #[test]
    fn test_text_variants() {
        assert_eq!(text(Some(&json!("  Friday "))), Some("Friday".to_string()));
        assert_eq!(text(Some(&json!(""))), None);
        assert_eq!(text(Some(&json!(3))), Some("3".to_string()));
        assert_eq!(text(Some(&json!(["x"]))), None);
    }

    #[test]
    fn test_meaningful_text_rejects_placeholders() {
        assert_eq!(meaningful_text(Some(&json!("TBD"))), None);
        assert_eq!(meaningful_text(Some(&json!("Unassigned"))), None);
        assert_eq!(meaningful_text(Some(&json!("NO_DEADLINE"))), None);
        assert_eq!(
            meaningful_text(Some(&json!("Monday"))),
            Some("Monday".to_string())
        );
    }

    #[test]
    fn test_text_list_variants() {
        assert_eq!(
            text_list(Some(&json!(["David", {"name": "Sarah"}, 4, null, ""]))),
            vec!["David", "Sarah", "4"]
        );
        assert_eq!(text_list(Some(&json!("Only one"))), vec!["Only one"]);
        assert!(text_list(Some(&json!({"a": 1}))).is_empty());
        assert!(text_list(None).is_empty());
    }

    #[test]
    fn test_flag_variants() {
        assert_eq!(flag(Some(&json!(true))), Some(true));
        assert_eq!(flag(Some(&json!("No"))), Some(false));
        assert_eq!(flag(Some(&json!(1))), Some(true));
        assert_eq!(flag(Some(&json!("maybe"))), None);
    }
}
