//! The spec model of the Brine IDL.
//!
//! A parsed `.idl` file becomes one [`Namespace`] tree. Trees parsed from several files are
//! combined with [`Namespace::merge`], which applies the per-node rules implemented by
//! [`Node::merge`] and [`Mapping::add`].
//!
//! ```
//! use brine_idl_schema::*;
//!
//! let mut first = Namespace::root();
//! first.enums.add(Enum::new("Color", ["red", "green"]));
//!
//! let mut second = Namespace::root();
//! second.enums.add(Enum::new("Color", ["green", "blue"]));
//!
//! let merged = Namespace::default().merge(first).merge(second);
//! assert_eq!(merged.enums.get("Color").unwrap().members, ["red", "green", "blue"]);
//! ```

pub mod mapping;
pub mod namespace;
pub mod node;
pub mod types;

pub use mapping::*;
pub use namespace::*;
pub use node::*;
pub use types::*;

/// Builtin type names. They resolve the same way in every scope.
pub const BUILTIN_TYPES: [&str; 11] = [
    "unit", "string", "bool", "int", "long", "float", "double", "time", "data", "list", "map",
];
