use brine_idl_schema::Namespace;
use log::debug;

use crate::{
    error::IdlError,
    parser::parse_schema,
    tokenizer::{tokenize_schema, PARSER_IGNORES},
};

/// Lex and parse one source text into its root namespace.
pub fn parse_source(text: &str) -> Result<Namespace, IdlError> {
    let tokens = tokenize_schema(text, PARSER_IGNORES)?;
    parse_schema(&tokens)
}

/// Accumulates parsed inputs into one merged root namespace, in the order they are added.
#[derive(Debug, Default)]
pub struct Compilation {
    root:    Namespace,
    sources: Vec<String>,
}

impl Compilation {
    pub fn new() -> Self {
        Self {
            root:    Namespace::root(),
            sources: Vec::new(),
        }
    }

    /// Parses `text` and merges it into the accumulated root.
    ///
    /// On failure the error is wrapped with `origin` and nothing is merged.
    pub fn add_source(&mut self, origin: &str, text: &str) -> Result<(), IdlError> {
        let parsed = parse_source(text).map_err(|e| e.in_source(origin))?;
        debug!(
            "parsed {}: {} types, {} enums, {} rpcs, {} namespaces",
            origin,
            parsed.types.len(),
            parsed.enums.len(),
            parsed.rpcs.len(),
            parsed.children.len()
        );

        let root = std::mem::take(&mut self.root);
        self.root = root.merge(parsed);
        self.sources.push(origin.to_owned());
        Ok(())
    }

    /// Origins merged so far.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn root(&self) -> &Namespace {
        &self.root
    }

    pub fn finish(self) -> Namespace {
        self.root
    }
}

/// Parses and merges `(origin, text)` pairs in order, stopping at the first failure.
pub fn compile_sources<I, O, T>(sources: I) -> Result<Namespace, IdlError>
where
    I: IntoIterator<Item = (O, T)>,
    O: AsRef<str>,
    T: AsRef<str>,
{
    let mut compilation = Compilation::new();
    for (origin, text) in sources {
        compilation.add_source(origin.as_ref(), text.as_ref())?;
    }
    Ok(compilation.finish())
}

/// Pretty-printed JSON of a merged namespace tree.
pub fn to_json(root: &Namespace) -> Result<String, IdlError> {
    Ok(serde_json::to_string_pretty(root)?)
}
