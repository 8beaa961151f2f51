use std::collections::BTreeMap;

/// Merge string maps in precedence order: every layer overwrites the keys of the layers before
/// it, keys only present in earlier layers are kept untouched.
///
/// ```ignore
/// let labels = merge_layers([existing, &component_labels, &CONTROLLER_LABELS]);
/// ```
pub fn merge_layers<'a, I>(layers: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = &'a BTreeMap<String, String>>,
{
    layers
        .into_iter()
        .flat_map(|layer| layer.iter())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Same as [`merge_layers`] but accepts optional layers, as found in `ObjectMeta`.
pub fn merge_optional_layers<'a, I>(layers: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = Option<&'a BTreeMap<String, String>>>,
{
    merge_layers(layers.into_iter().flatten())
}

#[cfg(test)]
mod tests {
    use super::{merge_layers, merge_optional_layers};

    use std::collections::BTreeMap;

    fn map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_rightmost_layer_wins() {
        let existing = map(&[("app", "old"), ("team", "blue")]);
        let component = map(&[("app", "wordpress"), ("tier", "web")]);
        let controller = map(&[("tier", "managed")]);

        let merged = merge_layers([&existing, &component, &controller]);
        assert_eq!(
            merged,
            map(&[("app", "wordpress"), ("team", "blue"), ("tier", "managed")])
        );
    }

    #[test]
    fn test_unknown_keys_survive() {
        let existing = map(&[("custom.example.com/owner", "alice")]);
        let merged = merge_layers([&existing, &map(&[("app", "wordpress")])]);
        assert_eq!(
            merged.get("custom.example.com/owner"),
            Some(&"alice".to_string())
        );
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_missing_layers_are_skipped() {
        let component = map(&[("app", "wordpress")]);
        let merged = merge_optional_layers([None, Some(&component), None]);
        assert_eq!(merged, component);
        assert!(merge_optional_layers([None, None]).is_empty());
    }
}
