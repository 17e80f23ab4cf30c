use std::collections::btree_map::{self, BTreeMap, Entry};

use serde::{Deserialize, Serialize};

use crate::node::{Node, SpecNode};

/// Name-unique container of spec nodes.
///
/// Iteration is ordered by name, which keeps every traversal of a merged tree deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping<V> {
    entries: BTreeMap<String, V>,
}

impl<V> Default for Mapping<V> {
    fn default() -> Self {
        Self { entries: BTreeMap::new() }
    }
}

impl<V> Mapping<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> btree_map::Values<'_, String, V> {
        self.entries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<V: SpecNode> Mapping<V> {
    /// Inserts `node` unless an entry with the same name exists.
    ///
    /// Returns the stored entry and whether `node` was the one inserted.
    pub fn add_if_new(&mut self, node: V) -> (&V, bool) {
        match self.entries.entry(node.name().to_owned()) {
            Entry::Occupied(slot) => (slot.into_mut(), false),
            Entry::Vacant(slot) => (slot.insert(node), true),
        }
    }

    /// Inserts `node`, merging it into an existing same-named entry with [`Node::merge`].
    ///
    /// Kinds without a merge rule are replaced; use [`Mapping::add_if_new`] where a
    /// replacement must never happen.
    pub fn add(&mut self, node: V) -> &V {
        let name = node.name().to_owned();
        let stored = match self.entries.remove(&name) {
            None => node,
            Some(existing) => match V::try_from(Node::merge(existing.into(), node.into())) {
                Ok(merged) => merged,
                Err(_) => unreachable!("merge yields the kind of the incoming node"),
            },
        };
        self.entries.entry(name).or_insert(stored)
    }
}

impl<V: SpecNode> FromIterator<V> for Mapping<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        let mut mapping = Mapping::new();
        for node in iter {
            mapping.add(node);
        }
        mapping
    }
}

impl<V> IntoIterator for Mapping<V> {
    type Item = V;
    type IntoIter = btree_map::IntoValues<String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

impl<'a, V> IntoIterator for &'a Mapping<V> {
    type Item = &'a V;
    type IntoIter = btree_map::Values<'a, String, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Enum, Rpc, TypeRef};

    #[test]
    fn add_if_new_keeps_first() {
        let mut rpcs = Mapping::new();
        let (_, is_new) = rpcs.add_if_new(Rpc::new("Ping", vec![], TypeRef::new("string")));
        assert!(is_new);

        let (kept, is_new) = rpcs.add_if_new(Rpc::new("Ping", vec![], TypeRef::new("int")));
        assert!(!is_new);
        assert_eq!(kept.output_types[0].name, "string");
        assert_eq!(rpcs.len(), 1);
    }

    #[test]
    fn add_replaces_rpcs() {
        let mut rpcs = Mapping::new();
        rpcs.add(Rpc::new("Ping", vec![], TypeRef::new("string")));
        rpcs.add(Rpc::new("Ping", vec![], TypeRef::new("int")));
        assert_eq!(rpcs.get("Ping").unwrap().output_types[0].name, "int");
    }

    #[test]
    fn add_merges_enums() {
        let enums: Mapping<Enum> = [Enum::new("Color", ["red", "green"]), Enum::new("Color", ["green", "blue"])]
            .into_iter()
            .collect();
        assert_eq!(enums.len(), 1);
        assert_eq!(enums.get("Color").unwrap().members, ["red", "green", "blue"]);
    }

    #[test]
    fn iterates_by_name() {
        let enums: Mapping<Enum> = ["zeta", "alpha", "mid"].into_iter().map(|n| Enum::new(n, ["x"])).collect();
        assert_eq!(enums.names().collect::<Vec<_>>(), ["alpha", "mid", "zeta"]);
    }
}
