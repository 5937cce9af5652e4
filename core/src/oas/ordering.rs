#![deny(missing_docs)]

//! # Ordering Policy
//!
//! Chooses between declaration order and name order for sibling entries whose display
//! order is cosmetic (components, responses, headers, paths, webhooks).
//!
//! Object properties and content maps never pass through here: their order is part of
//! what consumers see.

use indexmap::IndexMap;

/// Returns the entries of `map` in declaration order, or sorted by key when `alphabetize`
/// is set. The sort is a stable byte-wise comparison, so output is identical across runs.
pub fn ordered<V>(map: &IndexMap<String, V>, alphabetize: bool) -> Vec<(&String, &V)> {
    let mut entries: Vec<(&String, &V)> = map.iter().collect();
    if alphabetize {
        entries.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IndexMap<String, u8> {
        let mut map = IndexMap::new();
        map.insert("b".to_string(), 1);
        map.insert("B".to_string(), 2);
        map.insert("a".to_string(), 3);
        map
    }

    #[test]
    fn test_declaration_order_when_disabled() {
        let map = sample();
        let keys: Vec<&str> = ordered(&map, false).iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["b", "B", "a"]);
    }

    #[test]
    fn test_byte_order_when_enabled() {
        let map = sample();
        let keys: Vec<&str> = ordered(&map, true).iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["B", "a", "b"]);
    }
}
