use anyhow::Result;
use std::path::Path;
use tree_sitter::{Language, Node as TSNode, Parser, Tree};

/// Parser bank for the JS-family grammars.
///
/// `.ts` files are tried against the strict TypeScript grammar first and
/// retried once with the markup-tolerant TSX grammar, mirroring how the
/// grammars split: angle-bracket markup inside a `.ts` file is a strict
/// parse error but valid TSX.
pub struct SourceParser {
    typescript: Parser,
    tsx: Parser,
    javascript: Parser,
}

impl SourceParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            typescript: make_parser(tree_sitter_typescript::language_typescript())?,
            tsx: make_parser(tree_sitter_typescript::language_tsx())?,
            javascript: make_parser(tree_sitter_javascript::language())?,
        })
    }

    /// Parses `content` with the grammar(s) matching the path's extension.
    /// Returns `None` when no strategy yields an error-free tree; a parse
    /// failure never aborts the surrounding run.
    pub fn parse(&mut self, path: &str, content: &str) -> Option<Tree> {
        match extension(path) {
            "ts" => try_parse(&mut self.typescript, content)
                .or_else(|| try_parse(&mut self.tsx, content)),
            "tsx" => try_parse(&mut self.tsx, content),
            "js" | "jsx" | "mjs" => try_parse(&mut self.javascript, content),
            _ => None,
        }
    }
}

fn make_parser(language: Language) -> Result<Parser> {
    let mut parser = Parser::new();
    parser.set_language(language)?;
    Ok(parser)
}

fn try_parse(parser: &mut Parser, content: &str) -> Option<Tree> {
    parser
        .parse(content, None)
        .filter(|tree| !tree.root_node().has_error())
}

pub fn extension(path: &str) -> &str {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
}

pub fn extract_text<'a>(node: &TSNode, source: &'a [u8]) -> &'a str {
    std::str::from_utf8(&source[node.byte_range()]).unwrap_or("")
}

pub fn find_child_by_kind<'a>(node: &'a TSNode, kind: &str) -> Option<TSNode<'a>> {
    let mut cursor = node.walk();
    let result = node.children(&mut cursor).find(|child| child.kind() == kind);
    result
}

/// Recursively collect descendants by kind for robust traversal.
pub fn collect_descendants_by_kind<'a>(node: &'a TSNode<'a>, kind: &str) -> Vec<TSNode<'a>> {
    let mut results = Vec::new();
    let mut stack: Vec<TSNode<'a>> = vec![*node];

    while let Some(n) = stack.pop() {
        let mut cursor = n.walk();
        for child in n.children(&mut cursor) {
            if child.kind() == kind {
                results.push(child);
            }
            stack.push(child);
        }
    }
    results
}
