use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Regex = Regex::new(r"[^A-Za-z0-9]+").unwrap();
}

pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

/// Lower-cased identifier with every run of non-alphanumeric characters collapsed to `_`.
///
/// `go.example.com/rpc/todo-items` becomes `go_example_com_rpc_todo_items`.
pub fn snake_ident(text: &str) -> String {
    NON_WORD.replace_all(text, "_").trim_matches('_').to_lowercase()
}

/// Joins two `/`-separated path fragments, skipping empty ones.
pub fn join_path(base: &str, segment: &str) -> String {
    match (base.is_empty(), segment.is_empty()) {
        (true, _) => segment.to_owned(),
        (false, true) => base.to_owned(),
        (false, false) => format!("{}/{}", base.trim_end_matches('/'), segment),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_ident() {
        assert_eq!(snake_ident("go.example.com/rpc/todo-items"), "go_example_com_rpc_todo_items");
        assert_eq!(snake_ident("/Todo//Items/"), "todo_items");
        assert_eq!(snake_ident(""), "");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "todo"), "todo");
        assert_eq!(join_path("todo", "items"), "todo/items");
        assert_eq!(join_path("example.com/rpc/", "todo"), "example.com/rpc/todo");
        assert_eq!(join_path("todo", ""), "todo");
    }

    #[test]
    fn test_quote() {
        assert_eq!(quote("a\"b"), r#""a\"b""#);
    }
}
