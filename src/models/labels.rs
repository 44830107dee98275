use std::collections::BTreeMap;

/// Label and selector maps. BTreeMap keeps iteration deterministic, which
/// matters everywhere the simulation derives ordering from labels.
pub type Labels = BTreeMap<String, String>;

/// Selector semantics: AND across every required key, exact value match,
/// extra labels on the object are ignored. An empty selector matches nothing.
pub fn selector_matches(selector: &Labels, labels: &Labels) -> bool {
    if selector.is_empty() {
        return false;
    }
    selector.iter().all(|(k, v)| labels.get(k) == Some(v))
}

/// Convenience constructor for literal label sets.
pub fn labels(pairs: &[(&str, &str)]) -> Labels {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
