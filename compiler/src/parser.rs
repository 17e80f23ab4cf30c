use std::borrow::Cow;

use brine_idl_schema::{Enum, Namespace, Property, Rpc, Type, TypeRef};
use log::debug;

use crate::{
    error::IdlError,
    tokenizer::{Token, TokenKind},
    utils::quote,
};

/// Parses a token stream (usually lexed with [`PARSER_IGNORES`](crate::tokenizer::PARSER_IGNORES))
/// into the root namespace of one file.
///
/// Fails on the first malformed construct; the error names the offending token and its position.
pub fn parse_schema(tokens: &[Token]) -> Result<Namespace, IdlError> {
    let tokens = terminated(tokens);
    let mut parser = Parser { tokens: &tokens, index: 0, depth: 0 };

    let mut root = Namespace::root();
    parser.parse_namespace_body(&mut root)?;
    if parser.peek().kind != TokenKind::EndOfFile {
        return Err(parser.fail("unexpected `}` outside of any block"));
    }

    Ok(root)
}

/// Guarantees the stream ends with an end-of-file token so lookahead never runs dry.
fn terminated(tokens: &[Token]) -> Cow<'_, [Token]> {
    match tokens.last() {
        Some(last) if last.kind == TokenKind::EndOfFile => Cow::Borrowed(tokens),
        last => {
            let mut owned = tokens.to_vec();
            let mut pos = last.map(|t| t.pos).unwrap_or_default();
            if let Some(last) = last {
                pos.byte += last.len;
                pos.col += last.len;
            }
            owned.push(Token {
                kind: TokenKind::EndOfFile,
                value: String::new(),
                pos,
                len: 0,
            });
            Cow::Owned(owned)
        }
    }
}

/// Deepest allowed nesting of namespaces, and separately of type arguments.
const MAX_NESTING: usize = 256;

fn is_name(kind: TokenKind) -> bool {
    matches!(kind, TokenKind::Identifier | TokenKind::Keyword)
}

struct Parser<'t> {
    tokens: &'t [Token],
    index:  usize,
    depth:  usize,
}

impl<'t> Parser<'t> {
    fn peek(&self) -> &'t Token {
        self.lookahead(0)
    }

    fn lookahead(&self, n: usize) -> &'t Token {
        let tokens: &'t [Token] = self.tokens;
        &tokens[(self.index + n).min(tokens.len() - 1)]
    }

    fn consume(&mut self) -> &'t Token {
        let token = self.peek();
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind, msg: &str) -> Result<&'t Token, IdlError> {
        if self.peek().kind != kind {
            return Err(self.fail(msg));
        }
        Ok(self.consume())
    }

    fn fail(&self, msg: impl Into<String>) -> IdlError {
        fail_at(self.peek(), msg)
    }

    fn parse_namespace_body(&mut self, ns: &mut Namespace) -> Result<(), IdlError> {
        loop {
            let token = self.peek();
            match token.kind {
                TokenKind::Keyword => {}
                TokenKind::BlockEnd | TokenKind::EndOfFile => return Ok(()),
                _ => return Err(self.fail("valid definition keyword expected")),
            }

            match token.value.as_str() {
                "namespace" => {
                    let child = self.parse_namespace()?;
                    ns.children.add(child);
                }
                "option" => {
                    let (key, value) = self.parse_option()?;
                    ns.options.insert(key, value);
                }
                "type" => {
                    let ty = self.parse_type()?;
                    ns.types.add(ty);
                }
                "enum" => {
                    let en = self.parse_enum()?;
                    ns.enums.add(en);
                }
                "rpc" => {
                    let name = self.lookahead(1);
                    let rpc = self.parse_rpc()?;
                    if !ns.rpcs.add_if_new(rpc).1 {
                        return Err(fail_at(
                            name,
                            format!("duplicate definition for rpc `{}`", name.value),
                        ));
                    }
                }
                other => return Err(self.fail(format!("unrecognized keyword `{}`", other))),
            }
        }
    }

    /// Consumes `<keyword> NAME {` and returns the name.
    fn parse_block_start(&mut self, keyword: &str) -> Result<String, IdlError> {
        self.consume();
        let name = self.expect(TokenKind::Identifier, &format!("{} name expected", keyword))?;
        self.expect(
            TokenKind::BlockStart,
            &format!("opening brace `{{` for {} expected", keyword),
        )?;
        Ok(name.value.clone())
    }

    fn parse_namespace(&mut self) -> Result<Namespace, IdlError> {
        if self.depth == MAX_NESTING {
            return Err(self.fail("namespaces nested too deeply"));
        }
        let name = self.parse_block_start("namespace")?;
        let mut ns = Namespace::new(name);

        self.depth += 1;
        let body = self.parse_namespace_body(&mut ns);
        self.depth -= 1;
        body?;

        self.expect(TokenKind::BlockEnd, "missing closing brace `}` for namespace")?;
        Ok(ns)
    }

    fn parse_option(&mut self) -> Result<(String, String), IdlError> {
        self.consume();
        let key = self.expect(TokenKind::Identifier, "option name expected")?;
        let value = self.peek();
        if !matches!(value.kind, TokenKind::StringValue | TokenKind::NumberValue) {
            return Err(self.fail("option value literal expected"));
        }
        self.consume();
        Ok((key.value.clone(), value.value.clone()))
    }

    fn parse_type(&mut self) -> Result<Type, IdlError> {
        let name = self.parse_block_start("type")?;
        let mut ty = Type::new(name);

        loop {
            let token = self.peek();
            match token.kind {
                kind if is_name(kind) => {}
                TokenKind::BlockEnd => {
                    self.consume();
                    return Ok(ty);
                }
                TokenKind::EndOfFile => return Err(self.fail("missing closing brace `}` for type")),
                _ => return Err(self.fail("property definition expected")),
            }

            let type_ref = self.parse_type_ref()?;
            let name = self.peek();
            if !is_name(name.kind) {
                return Err(self.fail("property name expected"));
            }
            if !ty.properties.add_if_new(Property::new(name.value.clone(), type_ref)).1 {
                return Err(self.fail(format!(
                    "duplicate declaration for property `{}`",
                    name.value
                )));
            }
            self.consume();
        }
    }

    fn parse_enum(&mut self) -> Result<Enum, IdlError> {
        let name = self.parse_block_start("enum")?;
        let mut en = Enum::new(name, Vec::<String>::new());

        loop {
            let token = self.peek();
            match token.kind {
                kind if is_name(kind) => {
                    if !en.push_member(token.value.clone()) {
                        debug!("enum `{}` lists member `{}` twice", en.name, token.value);
                    }
                    self.consume();
                }
                TokenKind::BlockEnd => {
                    self.consume();
                    return Ok(en);
                }
                TokenKind::EndOfFile => return Err(self.fail("missing closing brace `}` for enum")),
                _ => return Err(self.fail("enum member expected")),
            }
        }
    }

    fn parse_rpc(&mut self) -> Result<Rpc, IdlError> {
        self.consume();
        let name = self.expect(TokenKind::Identifier, "rpc name expected")?;
        self.expect(TokenKind::ArgListStart, "start of argument list `(` expected")?;

        let mut input_types = Vec::new();
        loop {
            let token = self.peek();
            match token.kind {
                kind if is_name(kind) => {}
                TokenKind::ArgListEnd => {
                    self.consume();
                    break;
                }
                _ => return Err(self.fail("argument types expected")),
            }

            input_types.push(self.parse_type_ref()?);

            match self.peek().kind {
                TokenKind::ArgListSep => {
                    self.consume();
                }
                TokenKind::ArgListEnd => {
                    self.consume();
                    break;
                }
                _ => return Err(self.fail("more input types with `,` or closing bracket `)` expected")),
            }
        }

        if !is_name(self.peek().kind) {
            return Err(self.fail("return type expected"));
        }
        let output = self.parse_type_ref()?;

        Ok(Rpc::new(name.value.clone(), input_types, output))
    }

    /// `NAME` or `NAME<typeRef, ...>`.
    fn parse_type_ref(&mut self) -> Result<TypeRef, IdlError> {
        let name = self.peek();
        if !is_name(name.kind) {
            return Err(self.fail("type name expected"));
        }
        self.consume();

        let mut type_ref = TypeRef::new(name.value.clone());
        if self.peek().kind != TokenKind::TypeArgListStart {
            return Ok(type_ref);
        }
        if self.depth == MAX_NESTING {
            return Err(self.fail("type arguments nested too deeply"));
        }
        self.consume();

        self.depth += 1;
        let arguments = self.parse_type_arguments();
        self.depth -= 1;
        type_ref.arguments = arguments?;
        Ok(type_ref)
    }

    /// Arguments after `<`, up to and including the closing `>`.
    fn parse_type_arguments(&mut self) -> Result<Vec<TypeRef>, IdlError> {
        let mut arguments = Vec::new();
        loop {
            if !is_name(self.peek().kind) {
                return Err(self.fail("type argument expected"));
            }
            arguments.push(self.parse_type_ref()?);

            match self.peek().kind {
                TokenKind::ArgListSep => {
                    self.consume();
                }
                TokenKind::TypeArgListEnd => {
                    self.consume();
                    return Ok(arguments);
                }
                _ => {
                    return Err(self.fail(
                        "more type arguments with `,` or closing angle bracket `>` expected",
                    ))
                }
            }
        }
    }
}

fn fail_at(token: &Token, msg: impl Into<String>) -> IdlError {
    let near = match token.kind {
        TokenKind::EndOfFile => "end of file".to_owned(),
        _ => quote(&token.value),
    };
    IdlError::ParseError {
        msg: msg.into(),
        near,
        pos: token.pos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::{tokenize_schema, Pos, PARSER_IGNORES};

    fn parse(input: &str) -> Result<Namespace, IdlError> {
        let tokens = tokenize_schema(input, PARSER_IGNORES)?;
        parse_schema(&tokens)
    }

    fn parse_error(input: &str) -> (String, String, Pos) {
        match parse(input) {
            Err(IdlError::ParseError { msg, near, pos }) => (msg, near, pos),
            other => panic!("expected a ParseError but got {:?}", other),
        }
    }

    #[test]
    fn test_parse_todo() {
        let ns = parse("namespace todo { type Item { string name int id } rpc List() list<Item> }").unwrap();
        assert_eq!(ns.name, "root");
        assert_eq!(ns.children.len(), 1);

        let todo = ns.children.get("todo").unwrap();
        let item = todo.types.get("Item").unwrap();
        assert_eq!(item.properties.len(), 2);
        assert_eq!(item.properties.get("name").unwrap().type_, TypeRef::new("string"));
        assert_eq!(item.properties.get("id").unwrap().type_, TypeRef::new("int"));

        let list = todo.rpcs.get("List").unwrap();
        assert!(list.input_types.is_empty());
        assert_eq!(
            list.output_types,
            vec![TypeRef::generic("list", vec![TypeRef::new("Item")])]
        );
    }

    #[test]
    fn test_parse_options_enums_and_nesting() {
        let input = r#"
            option package "api"
            namespace shop {
                option version 2
                enum State { open closed open }
                namespace cart {
                    rpc Add(string, map<string, list<int>>) unit
                }
            }
        "#;
        let ns = parse(input).unwrap();
        assert_eq!(ns.option("package"), Some("api"));

        let shop = ns.children.get("shop").unwrap();
        assert_eq!(shop.option("version"), Some("2"));
        assert_eq!(shop.enums.get("State").unwrap().members, ["open", "closed"]);

        let add = shop.children.get("cart").unwrap().rpcs.get("Add").unwrap();
        assert_eq!(add.input_types.len(), 2);
        assert_eq!(add.input_types[1].to_string(), "map<string,list<int>>");
        assert_eq!(add.output_types[0].name, "unit");
    }

    #[test]
    fn test_parse_merges_repeated_blocks() {
        let input = "
            namespace a { type T { int x } }
            namespace a { type T { int y } enum E { one } }
            enum E { one } enum E { two }
        ";
        let ns = parse(input).unwrap();
        let a = ns.children.get("a").unwrap();
        assert_eq!(a.types.get("T").unwrap().properties.len(), 2);
        assert!(a.enums.contains("E"));
        assert_eq!(ns.enums.get("E").unwrap().members, ["one", "two"]);
    }

    #[test]
    fn test_parse_duplicate_rpc() {
        let (msg, near, pos) = parse_error("rpc Ping() string\nrpc Ping() int");
        assert!(msg.contains("duplicate definition for rpc `Ping`"), "{}", msg);
        assert_eq!(near, "\"Ping\"");
        assert_eq!(pos, Pos::new(22, 1, 4));
    }

    #[test]
    fn test_parse_duplicate_rpc_in_other_scope_is_fine() {
        let ns = parse("rpc Ping() string namespace a { rpc Ping() string }").unwrap();
        assert!(ns.rpcs.contains("Ping"));
        assert!(ns.children.get("a").unwrap().rpcs.contains("Ping"));
    }

    #[test]
    fn test_parse_duplicate_property() {
        let (msg, _, _) = parse_error("type T { int x string x }");
        assert!(msg.contains("duplicate declaration for property `x`"), "{}", msg);
    }

    #[test]
    fn test_parse_rpc_arguments() {
        let ns = parse("rpc Sum(int, int,) long").unwrap();
        assert_eq!(ns.rpcs.get("Sum").unwrap().input_types.len(), 2);

        let (msg, near, _) = parse_error("rpc Sum(int int) long");
        assert!(msg.contains("closing bracket `)`"), "{}", msg);
        assert_eq!(near, "\"int\"");
    }

    #[test]
    fn test_parse_errors() {
        let (msg, near, _) = parse_error("namespace a { type T { int x }");
        assert!(msg.contains("namespace"), "{}", msg);
        assert_eq!(near, "end of file");

        let (msg, _, _) = parse_error("include \"other.idl\"");
        assert!(msg.contains("unrecognized keyword `include`"), "{}", msg);

        let (msg, _, _) = parse_error("Item");
        assert!(msg.contains("valid definition keyword expected"), "{}", msg);

        let (msg, _, _) = parse_error("option name value");
        assert!(msg.contains("option value literal expected"), "{}", msg);

        let (msg, _, _) = parse_error("type T { list<> x }");
        assert!(msg.contains("type argument expected"), "{}", msg);

        let (msg, _, _) = parse_error("rpc Ping()");
        assert!(msg.contains("return type expected"), "{}", msg);

        let (msg, _, pos) = parse_error("type T {}\n}");
        assert!(msg.contains("outside of any block"), "{}", msg);
        assert_eq!(pos, Pos::new(10, 1, 0));
    }

    #[test]
    fn test_parse_without_end_of_file_token() {
        let mut tokens = tokenize_schema("enum E { a b }", PARSER_IGNORES).unwrap();
        tokens.pop();
        let ns = parse_schema(&tokens).unwrap();
        assert_eq!(ns.enums.get("E").unwrap().members, ["a", "b"]);

        let ns = parse_schema(&[]).unwrap();
        assert!(ns.types.is_empty());
    }

    #[test]
    fn test_end_of_file_after_escaped_string() {
        let input = "namespace n { option note \"a\\tb\"";
        let ignore = PARSER_IGNORES | TokenKind::EndOfFile;
        let tokens = tokenize_schema(input, ignore).unwrap();
        let (msg, near, pos) = match parse_schema(&tokens) {
            Err(IdlError::ParseError { msg, near, pos }) => (msg, near, pos),
            other => panic!("expected a ParseError but got {:?}", other),
        };
        assert!(msg.contains("missing closing brace"), "{}", msg);
        assert_eq!(near, "end of file");
        assert_eq!(pos, Pos::new(32, 0, 32));
    }

    fn nested_list(depth: usize) -> String {
        format!("type T {{ {}int{} x }}", "list<".repeat(depth), ">".repeat(depth))
    }

    fn nested_namespaces(depth: usize) -> String {
        format!("{}type T {{}}{}", "namespace n { ".repeat(depth), " }".repeat(depth))
    }

    #[test]
    fn test_parse_nesting_limit() {
        let ns = parse(&nested_list(MAX_NESTING)).unwrap();
        let mut ty = &ns.types.get("T").unwrap().properties.get("x").unwrap().type_;
        let mut depth = 0;
        while let Some(inner) = ty.arguments.first() {
            ty = inner;
            depth += 1;
        }
        assert_eq!((depth, ty.name.as_str()), (MAX_NESTING, "int"));

        let (msg, near, pos) = parse_error(&nested_list(MAX_NESTING + 1));
        assert_eq!(msg, "type arguments nested too deeply");
        assert_eq!(near, "\"<\"");
        assert_eq!(pos.byte, 9 + 5 * MAX_NESTING + 4);

        assert!(parse(&nested_namespaces(MAX_NESTING)).is_ok());
        let (msg, _, pos) = parse_error(&nested_namespaces(MAX_NESTING + 1));
        assert_eq!(msg, "namespaces nested too deeply");
        assert_eq!(pos.byte, 14 * MAX_NESTING);
    }

    #[test]
    fn test_parse_deep_nesting_fails_without_overflow() {
        let err = parse(&nested_list(5000)).unwrap_err();
        assert!(matches!(err, IdlError::ParseError { .. }));
        let err = parse(&nested_namespaces(5000)).unwrap_err();
        assert!(matches!(err, IdlError::ParseError { .. }));
    }
}
