// Parser utilities shared by the extractor, the resolver and the checks

use crate::model::{FieldDecl, FileId, Import, Location, MethodDecl, TypeDecl};
use miette::Result;
use std::path::Path;
use tree_sitter::{Node, Tree};

/// Declarations extracted from one source file
#[derive(Debug, Default)]
pub struct ParsedUnit {
    /// Package of the file
    pub package: Option<String>,

    /// Import statements
    pub imports: Vec<Import>,

    /// Type declarations in source order, including local and anonymous classes
    pub types: Vec<TypeDecl>,

    pub methods: Vec<MethodDecl>,

    pub fields: Vec<FieldDecl>,
}

impl ParsedUnit {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Trait for language-specific parsers
pub trait Parser {
    /// Build the syntax tree of a source file
    fn parse_tree(&self, path: &Path, contents: &str) -> Result<Tree>;

    /// Extract declarations from a parsed tree
    fn extract(&self, file: FileId, path: &Path, tree: &Tree, contents: &str) -> ParsedUnit;
}

/// Helper to convert a tree-sitter node position to a Location
pub fn point_to_location(file: &Path, node: Node) -> Location {
    let start = node.start_position();
    Location::new(
        file.to_path_buf(),
        start.row + 1,    // tree-sitter uses 0-indexed lines
        start.column + 1, // tree-sitter uses 0-indexed columns
        node.start_byte(),
        node.end_byte(),
    )
}

/// Extract text from a node
pub fn node_text<'a>(node: Node<'_>, source: &'a str) -> &'a str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// Find all children of a specific kind
pub fn children_of_kind<'a>(node: Node<'a>, kind: &str) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|child| child.kind() == kind)
        .collect()
}

/// All children, named and anonymous, in order
pub fn all_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Named children that are not comments
pub fn code_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|child| !is_comment(*child))
        .collect()
}

pub fn is_comment(node: Node) -> bool {
    matches!(node.kind(), "line_comment" | "block_comment" | "comment")
}

/// A `/** ... */` comment
pub fn is_doc_comment(node: Node, source: &str) -> bool {
    node.kind() == "block_comment" && node_text(node, source).starts_with("/**")
}

/// Unwrap any number of enclosing parentheses
pub fn strip_parens(mut node: Node<'_>) -> Node<'_> {
    while node.kind() == "parenthesized_expression" {
        match code_children(node).into_iter().next() {
            Some(inner) => node = inner,
            None => break,
        }
    }
    node
}

/// Collapse runs of whitespace to a single space
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Iterator over all descendant nodes, the node itself included
pub fn descendants(node: Node) -> impl Iterator<Item = Node> {
    DescendantIterator::new(node)
}

struct DescendantIterator<'a> {
    cursor: tree_sitter::TreeCursor<'a>,
    done: bool,
}

impl<'a> DescendantIterator<'a> {
    fn new(node: Node<'a>) -> Self {
        Self {
            cursor: node.walk(),
            done: false,
        }
    }
}

impl<'a> Iterator for DescendantIterator<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let node = self.cursor.node();

        // Try to go to first child
        if self.cursor.goto_first_child() {
            return Some(node);
        }

        // Try to go to next sibling, climbing up as needed
        loop {
            if self.cursor.goto_next_sibling() {
                return Some(node);
            }

            // The cursor is rooted at the starting node, so this stops there
            if !self.cursor.goto_parent() {
                self.done = true;
                return Some(node);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Tree {
        let mut parser = tree_sitter::Parser::new();
        parser.set_language(&tree_sitter_java::language()).unwrap();
        parser.parse(source, None).unwrap()
    }

    #[test]
    fn test_descendants_visits_every_node_once() {
        let source = "class A { void m() { int x = 1; } }";
        let tree = parse(source);
        let kinds: Vec<&str> = descendants(tree.root_node()).map(|n| n.kind()).collect();

        assert_eq!(kinds[0], "program");
        assert_eq!(kinds.iter().filter(|k| **k == "method_declaration").count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == "local_variable_declaration").count(), 1);
    }

    #[test]
    fn test_strip_parens() {
        let source = "class A { int m() { return ((foo())); } }";
        let tree = parse(source);
        let paren = descendants(tree.root_node())
            .find(|n| n.kind() == "parenthesized_expression")
            .unwrap();

        assert_eq!(strip_parens(paren).kind(), "method_invocation");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("@Foo(  a =\n 1 )"), "@Foo( a = 1 )");
    }
}
