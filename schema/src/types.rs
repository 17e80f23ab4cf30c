use std::fmt;

use serde::{Deserialize, Serialize};

use crate::mapping::Mapping;

/// A possibly generic mention of a type, e.g. `list<string>` or `map<string, int>`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeRef {
    pub name:      String,
    #[serde(default)]
    pub arguments: Vec<TypeRef>,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), arguments: Vec::new() }
    }

    pub fn generic(name: impl Into<String>, arguments: Vec<TypeRef>) -> Self {
        Self { name: name.into(), arguments }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.arguments.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name:  String,
    #[serde(rename = "type")]
    pub type_: TypeRef,
}

impl Property {
    pub fn new(name: impl Into<String>, type_: TypeRef) -> Self {
        Self { name: name.into(), type_ }
    }
}

/// A record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Type {
    pub name:       String,
    #[serde(default)]
    pub properties: Mapping<Property>,
}

impl Type {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), properties: Mapping::new() }
    }

    /// Unions the property maps; a property defined on both sides takes `other`'s definition.
    pub fn merge(mut self, other: Type) -> Type {
        for prop in other.properties {
            self.properties.add(prop);
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enum {
    pub name:    String,
    #[serde(default)]
    pub members: Vec<String>,
}

impl Enum {
    pub fn new<I, S>(name: impl Into<String>, members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut en = Self { name: name.into(), members: Vec::new() };
        for member in members {
            en.push_member(member);
        }
        en
    }

    /// Appends `member` unless it is already present. Returns whether it was appended.
    pub fn push_member(&mut self, member: impl Into<String>) -> bool {
        let member = member.into();
        if self.members.contains(&member) {
            return false;
        }
        self.members.push(member);
        true
    }

    /// Unions the member lists, keeping first-seen order.
    pub fn merge(mut self, other: Enum) -> Enum {
        for member in other.members {
            self.push_member(member);
        }
        self
    }
}

/// An RPC signature. `output_types` holds exactly one element when produced by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rpc {
    pub name:         String,
    #[serde(rename = "input", default)]
    pub input_types:  Vec<TypeRef>,
    #[serde(rename = "output", default)]
    pub output_types: Vec<TypeRef>,
}

impl Rpc {
    pub fn new(name: impl Into<String>, input_types: Vec<TypeRef>, output: TypeRef) -> Self {
        Self { name: name.into(), input_types, output_types: vec![output] }
    }

    /// Input types followed by output types.
    pub fn type_refs(&self) -> impl Iterator<Item = &TypeRef> {
        self.input_types.iter().chain(self.output_types.iter())
    }
}
