//! Header collections shared by gateway and log-sink configs

use std::collections::BTreeMap;

/// Header name → values. Names are ordered by the map itself.
pub type Headers = BTreeMap<String, Vec<String>>;

/// Drop headers without a name and sort every value list in place.
pub fn normalize_headers(headers: &mut Headers) {
    headers.remove("");
    for values in headers.values_mut() {
        values.sort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_drops_unnamed_headers() {
        let mut headers = Headers::from([
            (String::new(), vec!["orphan".to_string()]),
            ("x-a".to_string(), vec!["1".to_string()]),
        ]);
        normalize_headers(&mut headers);
        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key("x-a"));
    }

    #[test]
    fn normalize_sorts_values_only() {
        let mut headers = Headers::from([
            ("x-b".to_string(), vec!["2".to_string(), "1".to_string()]),
            ("x-a".to_string(), vec!["z".to_string()]),
        ]);
        normalize_headers(&mut headers);
        assert_eq!(headers["x-b"], vec!["1", "2"]);
        assert_eq!(headers.keys().collect::<Vec<_>>(), vec!["x-a", "x-b"]);
    }
}
