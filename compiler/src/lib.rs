//! brine-idl-compiler
//!
//! This crate implements:
//!  1) A state-machine tokenizer and a recursive-descent parser for IDL files,
//!  2) Multi-file merging into one namespace tree (`Compilation`),
//!  3) Package construction with deterministic numbering, import paths and mangled ids,
//!  4) A scoped type registry that resolves every `TypeRef` into a `ResolvedType`,
//!  5) The `Generator` boundary and the built-in JSON outline generator,
//!  6) Error types (`IdlError`) and build settings (`BuildConfig`).

pub mod error;
pub mod utils;
pub mod tokenizer;
pub mod parser;
pub mod compiler;
pub mod config;
pub mod resolved;
pub mod registry;
pub mod package;
pub mod traits;
pub mod gen_outline;

pub use compiler::{compile_sources, parse_source, to_json, Compilation};
pub use config::BuildConfig;
pub use error::IdlError;
pub use gen_outline::OutlineGenerator;
pub use package::{build_packages, Package, PackageTree, UnresolvedRef};
pub use resolved::{PackageId, ResolvedType};
pub use tokenizer::{tokenize_schema, Pos, Token, TokenKind, TokenMask, PARSER_IGNORES};
pub use traits::Generator;
