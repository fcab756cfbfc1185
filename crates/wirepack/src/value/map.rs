//! Map payload: wire-ordered pairs plus a lazily built lookup index.
//!
//! Duplicate keys are legal on the wire. The pair sequence keeps every pair
//! exactly as decoded; the lookup index resolves a key to its last
//! occurrence.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::sync::OnceLock;

use crate::value::{dismantle, RawString, Value};

#[derive(Clone, Default)]
pub struct Map {
    pairs: Vec<(Value, Value)>,
    index: OnceLock<HashMap<Value, usize>>,
}

impl Map {
    pub fn new(pairs: Vec<(Value, Value)>) -> Self {
        Map {
            pairs,
            index: OnceLock::new(),
        }
    }

    /// Number of pairs in wire order, duplicates included.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs exactly as they appear on the wire.
    pub fn pairs(&self) -> &[(Value, Value)] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> + '_ {
        self.pairs.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Value> + '_ {
        self.pairs.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.pairs.iter().map(|(_, v)| v)
    }

    fn index(&self) -> &HashMap<Value, usize> {
        self.index.get_or_init(|| {
            let mut index = HashMap::with_capacity(self.pairs.len());
            for (i, (key, _)) in self.pairs.iter().enumerate() {
                index.insert(key.clone(), i);
            }
            index
        })
    }

    /// Looks up a key; the last occurrence wins.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.index().get(key).map(|&i| &self.pairs[i].1)
    }

    pub fn get_str(&self, key: &str) -> Option<&Value> {
        self.get(&Value::String(RawString::from(key)))
    }

    pub fn contains_key(&self, key: &Value) -> bool {
        self.index().contains_key(key)
    }

    /// Number of distinct keys.
    pub fn unique_len(&self) -> usize {
        self.index().len()
    }

    pub fn has_duplicate_keys(&self) -> bool {
        self.unique_len() < self.len()
    }

    /// Flattened `[k1, v1, k2, v2, ...]` in wire order.
    pub fn to_key_value_vec(&self) -> Vec<Value> {
        let mut out = Vec::with_capacity(self.pairs.len() * 2);
        for (k, v) in &self.pairs {
            out.push(k.clone());
            out.push(v.clone());
        }
        out
    }

    pub fn into_pairs(mut self) -> Vec<(Value, Value)> {
        self.take_pairs()
    }

    pub(super) fn take_pairs(&mut self) -> Vec<(Value, Value)> {
        self.index.take();
        mem::take(&mut self.pairs)
    }
}

impl Drop for Map {
    fn drop(&mut self) {
        let nested = self
            .pairs
            .iter()
            .any(|(k, v)| k.is_container() || v.is_container());
        if nested {
            let mut values = Vec::with_capacity(self.pairs.len() * 2);
            for (k, v) in self.take_pairs() {
                values.push(k);
                values.push(v);
            }
            dismantle(values);
        }
    }
}

impl From<Vec<(Value, Value)>> for Map {
    fn from(pairs: Vec<(Value, Value)>) -> Self {
        Map::new(pairs)
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Map::new(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = &'a (Value, Value);
    type IntoIter = std::slice::Iter<'a, (Value, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

// Equality is over the multiset of pairs; order does not matter.
impl PartialEq for Map {
    fn eq(&self, other: &Self) -> bool {
        if self.pairs.len() != other.pairs.len() {
            return false;
        }
        if self.pairs == other.pairs {
            return true;
        }
        let mut counts: HashMap<&(Value, Value), isize> = HashMap::new();
        for pair in &self.pairs {
            *counts.entry(pair).or_default() += 1;
        }
        for pair in &other.pairs {
            match counts.get_mut(pair) {
                Some(n) if *n > 0 => *n -= 1,
                _ => return false,
            }
        }
        true
    }
}

impl Eq for Map {}

impl Hash for Map {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut sum = 0u64;
        for pair in &self.pairs {
            let mut h = DefaultHasher::new();
            pair.hash(&mut h);
            sum = sum.wrapping_add(h.finish());
        }
        state.write_usize(self.pairs.len());
        state.write_u64(sum);
    }
}

impl fmt::Debug for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(k: &str, v: i64) -> (Value, Value) {
        (Value::from(k), Value::from(v))
    }

    #[test]
    fn duplicate_keys_keep_both_pairs() {
        let map = Map::new(vec![pair("a", 1), pair("b", 2), pair("a", 3)]);
        assert_eq!(map.len(), 3);
        assert_eq!(map.unique_len(), 2);
        assert!(map.has_duplicate_keys());
        assert_eq!(map.get_str("a"), Some(&Value::from(3)));
        assert_eq!(map.get_str("b"), Some(&Value::from(2)));
        assert_eq!(map.get_str("c"), None);
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec![Value::from("a"), Value::from("b"), Value::from("a")]);
    }

    #[test]
    fn equality_ignores_order() {
        let a = Map::new(vec![pair("x", 1), pair("y", 2)]);
        let b = Map::new(vec![pair("y", 2), pair("x", 1)]);
        assert_eq!(a, b);

        let mut ha = DefaultHasher::new();
        let mut hb = DefaultHasher::new();
        a.hash(&mut ha);
        b.hash(&mut hb);
        assert_eq!(ha.finish(), hb.finish());
    }

    #[test]
    fn equality_counts_duplicates() {
        let a = Map::new(vec![pair("x", 1), pair("x", 1), pair("y", 2)]);
        let b = Map::new(vec![pair("x", 1), pair("y", 2), pair("y", 2)]);
        assert_ne!(a, b);
    }

    #[test]
    fn key_value_vec_is_flat() {
        let map = Map::new(vec![pair("k1", 1), pair("k2", 2)]);
        assert_eq!(
            map.to_key_value_vec(),
            vec![
                Value::from("k1"),
                Value::from(1),
                Value::from("k2"),
                Value::from(2)
            ]
        );
    }

    #[test]
    fn non_string_keys_are_looked_up_structurally() {
        let map = Map::new(vec![
            (Value::from(1), Value::from("one")),
            (Value::Nil, Value::from("nil")),
        ]);
        assert_eq!(map.get(&Value::from(1u8)), Some(&Value::from("one")));
        assert!(map.contains_key(&Value::Nil));
        assert!(!map.contains_key(&Value::from(2)));
    }
}
