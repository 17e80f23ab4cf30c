use std::collections::BTreeMap;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::{mapping::Mapping, Enum, Rpc, Type};

/// Name given to the implicit namespace that holds a file's top-level definitions.
pub const ROOT_NAMESPACE: &str = "root";

/// A named scope of child namespaces, types, enums and RPCs.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Namespace {
    pub name:     String,
    #[serde(default)]
    pub children: Mapping<Namespace>,
    #[serde(default)]
    pub options:  BTreeMap<String, String>,
    #[serde(default)]
    pub types:    Mapping<Type>,
    #[serde(default)]
    pub enums:    Mapping<Enum>,
    #[serde(default)]
    pub rpcs:     Mapping<Rpc>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    pub fn root() -> Self {
        Self::new(ROOT_NAMESPACE)
    }

    /// True for the implicit root, whether freshly parsed or an empty accumulator.
    pub fn is_root(&self) -> bool {
        self.name.is_empty() || self.name == ROOT_NAMESPACE
    }

    /// Option set on this scope only.
    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    /// Folds `other` into `self`.
    ///
    /// Children, types and enums merge by name. RPCs keep the first definition: a name already
    /// present in `self` is logged and the incoming RPC dropped. Options are unioned with `other`
    /// winning on key collisions.
    pub fn merge(mut self, other: Namespace) -> Namespace {
        if self.name.is_empty() {
            self.name = other.name;
        }

        for child in other.children {
            self.children.add(child);
        }
        for ty in other.types {
            self.types.add(ty);
        }
        for en in other.enums {
            self.enums.add(en);
        }
        for rpc in other.rpcs {
            let name = rpc.name.clone();
            if !self.rpcs.add_if_new(rpc).1 {
                warn!(
                    "rpc `{}` in namespace `{}` is already defined, keeping the first definition",
                    name, self.name
                );
            }
        }
        self.options.extend(other.options);

        self
    }
}
