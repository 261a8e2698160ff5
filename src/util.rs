//! Small collection helpers used alongside actions.

use serde_json::{Map, Value};

/// Whether two argument lists are structurally equal.
///
/// Used to decide whether a call may reuse an in-flight result.
pub fn same_args(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

/// Index objects by their `key` field.
///
/// Items that are not objects, or lack the field, are skipped. String ids
/// are used as is, other ids by their JSON rendering. Later items win.
pub fn key_by_id(items: &[Value], key: &str) -> Map<String, Value> {
    let mut keyed = Map::new();
    for item in items {
        let Some(id) = item.get(key) else { continue };
        let id = match id {
            Value::String(id) => id.clone(),
            other => other.to_string(),
        };
        keyed.insert(id, item.clone());
    }
    keyed
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_same_args() {
        assert!(same_args(&[json!(1), json!({"a": [1]})], &[json!(1), json!({"a": [1]})]));
        assert!(!same_args(&[json!(1)], &[json!(1), json!(2)]));
        assert!(!same_args(&[json!("1")], &[json!(1)]));
        assert!(same_args(&[], &[]));
    }

    #[test]
    fn test_key_by_id() {
        let items = vec![
            json!({"id": "a", "n": 1}),
            json!({"id": 7, "n": 2}),
            json!({"n": 3}),
            json!("loose"),
            json!({"id": "a", "n": 4}),
        ];
        let keyed = key_by_id(&items, "id");
        assert_eq!(keyed.len(), 2);
        assert_eq!(keyed["a"], json!({"id": "a", "n": 4}));
        assert_eq!(keyed["7"], json!({"id": 7, "n": 2}));
    }
}
