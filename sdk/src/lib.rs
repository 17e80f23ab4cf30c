//! brine-idl
//!
//! Facade over the Brine IDL toolchain.
//!
//! - Spec model types (re-exported from `brine-idl-schema`)
//! - Lexer, parser, package builder and generators (re-exported from `brine-idl-compiler`)
//! - One-call helpers that go from source text straight to JSON

pub use brine_idl_compiler::{
    build_packages,
    compile_sources,
    parse_source,
    BuildConfig,
    Compilation,
    Generator,
    IdlError,
    OutlineGenerator,
    Package,
    PackageId,
    PackageTree,
    ResolvedType,
};
pub use brine_idl_schema::{Enum, Mapping, Namespace, Node, Property, Rpc, Type, TypeRef};

/// Merge `(origin, text)` sources in order and pretty-print the merged tree as JSON.
pub fn compile_to_json<I, O, T>(sources: I) -> Result<String, IdlError>
where
    I: IntoIterator<Item = (O, T)>,
    O: AsRef<str>,
    T: AsRef<str>,
{
    let root = compile_sources(sources)?;
    brine_idl_compiler::to_json(&root)
}

/// Merge `(origin, text)` sources, build packages with `config` and return the JSON outline.
pub fn outline_to_json<I, O, T>(sources: I, config: &BuildConfig) -> Result<String, IdlError>
where
    I: IntoIterator<Item = (O, T)>,
    O: AsRef<str>,
    T: AsRef<str>,
{
    let root = compile_sources(sources)?;
    let tree = build_packages(&root, config);
    OutlineGenerator.generate(&tree)
}

pub mod error {
    pub use brine_idl_compiler::error::IdlError;
}

pub mod schema {
    pub use brine_idl_schema::*;
}
