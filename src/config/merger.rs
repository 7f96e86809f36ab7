//! Deep merge for layered YAML configuration.
//!
//! # Merge Rules
//!
//! - Mappings are merged recursively
//! - Arrays are replaced entirely (not merged)
//! - Null values in overlay delete the corresponding key from base
//! - Scalars in overlay replace scalars in base

use serde_yaml::Value;

/// Deep merge two YAML values.
///
/// `overlay` takes precedence at every point of conflict.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    result.remove(key);
                } else if let Some(base_value) = base_map.get(key) {
                    result.insert(key.clone(), deep_merge(base_value, overlay_value));
                } else {
                    result.insert(key.clone(), overlay_value.clone());
                }
            }

            Value::Mapping(result)
        }

        (_, overlay) => overlay.clone(),
    }
}

/// Merge multiple configs in order (later overrides earlier).
pub fn merge_configs(configs: &[Value]) -> Value {
    configs
        .iter()
        .fold(Value::Mapping(Default::default()), |acc, config| {
            deep_merge(&acc, config)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn groups_are_replaced_not_merged() {
        let base = yaml("groups: [dev, docs, test]");
        let overlay = yaml("groups: [dev]");

        let result = deep_merge(&base, &overlay);
        let groups = result["groups"].as_sequence().unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], "dev");
    }

    #[test]
    fn null_removes_inherited_value() {
        let base = yaml("tool: pdm\ntimeout: 600");
        let overlay = yaml("timeout: null");

        let result = deep_merge(&base, &overlay);

        assert!(result.get("timeout").is_none());
        assert_eq!(result["tool"], "pdm");
    }

    #[test]
    fn scalars_are_overridden() {
        let base = yaml("locked: false\npreflight: true");
        let overlay = yaml("locked: true");

        let result = deep_merge(&base, &overlay);

        assert_eq!(result["locked"], true);
        assert_eq!(result["preflight"], true);
    }

    #[test]
    fn merge_configs_merges_multiple_in_order() {
        let configs = vec![yaml("a: 1\nb: 2"), yaml("b: 3\nc: 4"), yaml("c: 5")];

        let result = merge_configs(&configs);

        assert_eq!(result["a"], 1);
        assert_eq!(result["b"], 3);
        assert_eq!(result["c"], 5);
    }
}
