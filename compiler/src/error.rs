use thiserror::Error;

use crate::tokenizer::Pos;

#[derive(Debug, Error)]
pub enum IdlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lex error at {pos}: {msg}")]
    LexError {
        msg: String,
        pos: Pos,
    },

    #[error("Parse error at {pos}, near {near}: {msg}")]
    ParseError {
        msg:  String,
        near: String,
        pos:  Pos,
    },

    #[error("{origin}: {source}")]
    InSource {
        origin: String,
        #[source]
        source: Box<IdlError>,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IdlError {
    /// Attributes the error to the named input (a file path or `<stdin>`).
    pub fn in_source(self, origin: impl Into<String>) -> IdlError {
        IdlError::InSource {
            origin: origin.into(),
            source: Box::new(self),
        }
    }

    /// Source position of a lex or parse error, looking through `InSource`.
    pub fn pos(&self) -> Option<Pos> {
        match self {
            IdlError::LexError { pos, .. } | IdlError::ParseError { pos, .. } => Some(*pos),
            IdlError::InSource { source, .. } => source.pos(),
            _ => None,
        }
    }
}
