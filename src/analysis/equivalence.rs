//! Structural equivalence of method bodies
//!
//! [`TreeEquivalence`] walks two syntax trees in parallel and tracks which
//! declarations on the left stand for which on the right. What counts as
//! "the same" for names, `this` and implicitly qualified members is decided
//! by an [`EquivalenceRules`] implementation; [`OverrideEquivalence`] is the
//! one used to compare an override with its super method.

use crate::model::{DeclarationId, FileId, MethodDecl, Project, Resolver, SourceOrigin, Symbol};
use crate::parser::{all_children, code_children, descendants, is_comment, is_doc_comment, node_text, normalize_whitespace};
use std::collections::{HashMap, HashSet};
use tracing::trace;
use tree_sitter::Node;

/// Closed classification of syntax nodes driving the comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    Comment,
    Identifier,
    TypeName,
    This,
    MethodCall,
    FieldAccess,
    /// Syntax errors and missing nodes never compare equal
    Error,
    Leaf,
    Composite,
}

impl NodeClass {
    pub fn of(node: Node) -> Self {
        if node.is_error() || node.is_missing() {
            return NodeClass::Error;
        }
        if is_comment(node) {
            return NodeClass::Comment;
        }
        match node.kind() {
            "identifier" => NodeClass::Identifier,
            "type_identifier" => NodeClass::TypeName,
            "this" => NodeClass::This,
            "method_invocation" => NodeClass::MethodCall,
            "field_access" => NodeClass::FieldAccess,
            _ if node.child_count() == 0 => NodeClass::Leaf,
            _ => NodeClass::Composite,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method { arity: usize },
    Field,
}

/// A member reached through an implicit or explicit `this`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplicitMember {
    pub name: String,
    pub kind: MemberKind,
}

/// Hooks customizing [`TreeEquivalence`]
pub trait EquivalenceRules {
    /// Two different resolved symbols that should still match
    fn symbols_equivalent(&self, _left: &Symbol, _right: &Symbol) -> bool {
        false
    }

    /// `this` expressions denoting the given classes
    fn this_expressions_equivalent(&self, left: Option<DeclarationId>, right: Option<DeclarationId>) -> bool {
        left.is_some() && left == right
    }

    /// A member reference without a qualifier (or qualified by `this`) that
    /// resolved differently on each side
    fn implicit_qualifier_equivalent(&self, _member: &ImplicitMember, _left: &Symbol, _right: &Symbol) -> bool {
        false
    }
}

/// Plain structural rules
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralRules;

impl EquivalenceRules for StructuralRules {}

pub struct TreeEquivalence<'p, R> {
    project: &'p Project,
    resolver: Resolver<'p>,
    rules: R,
    left: FileId,
    right: FileId,
    declarations: HashMap<Symbol, Symbol>,
}

impl<'p, R: EquivalenceRules> TreeEquivalence<'p, R> {
    pub fn new(project: &'p Project, rules: R, left: FileId, right: FileId) -> Self {
        Self {
            project,
            resolver: Resolver::new(project),
            rules,
            left,
            right,
            declarations: HashMap::new(),
        }
    }

    /// Treat `left` and `right` as the same declaration
    pub fn declare(&mut self, left: Symbol, right: Symbol) {
        self.declarations.insert(left, right);
    }

    fn left_text(&self, node: Node) -> &'p str {
        self.project
            .file(self.left)
            .map(|f| node_text(node, &f.source))
            .unwrap_or("")
    }

    fn right_text(&self, node: Node) -> &'p str {
        self.project
            .file(self.right)
            .map(|f| node_text(node, &f.source))
            .unwrap_or("")
    }

    pub fn nodes_equivalent(&mut self, left: Node, right: Node) -> bool {
        let class = NodeClass::of(left);
        if class != NodeClass::of(right) {
            return false;
        }

        match class {
            NodeClass::Error => false,
            NodeClass::Comment => true,
            NodeClass::Identifier => self.identifiers_equivalent(left, right),
            NodeClass::TypeName => self.type_names_equivalent(left, right),
            NodeClass::This => {
                let left_type = self.resolver.this_type(self.left, left);
                let right_type = self.resolver.this_type(self.right, right);
                self.rules.this_expressions_equivalent(left_type, right_type)
            }
            NodeClass::MethodCall => self.calls_equivalent(left, right),
            NodeClass::FieldAccess => self.field_accesses_equivalent(left, right),
            NodeClass::Leaf => left.kind() == right.kind() && self.left_text(left) == self.right_text(right),
            NodeClass::Composite => left.kind() == right.kind() && self.children_equivalent(left, right, None),
        }
    }

    /// Pairwise comparison of non-comment children; the `name` pair, when
    /// given, only has to match textually
    fn children_equivalent(&mut self, left: Node, right: Node, name: Option<(Node, Node)>) -> bool {
        let left_children: Vec<Node> = all_children(left).into_iter().filter(|c| !is_comment(*c)).collect();
        let right_children: Vec<Node> = all_children(right).into_iter().filter(|c| !is_comment(*c)).collect();
        if left_children.len() != right_children.len() {
            return false;
        }

        left_children.iter().zip(&right_children).all(|(l, r)| match name {
            Some((left_name, right_name)) if l.id() == left_name.id() || r.id() == right_name.id() => {
                l.id() == left_name.id() && r.id() == right_name.id() && self.left_text(*l) == self.right_text(*r)
            }
            _ => self.nodes_equivalent(*l, *r),
        })
    }

    fn identifiers_equivalent(&mut self, left: Node, right: Node) -> bool {
        let declared_left = self.resolver.declared_symbol(self.left, left);
        let declared_right = self.resolver.declared_symbol(self.right, right);
        match (declared_left, declared_right) {
            (Some(l), Some(r)) => {
                self.declare(l, r);
                return true;
            }
            (None, None) => {}
            _ => return false,
        }

        let left_symbol = self.resolver.resolve_identifier(self.left, left);
        let right_symbol = self.resolver.resolve_identifier(self.right, right);
        if self.symbols_match(&left_symbol, &right_symbol, left, right) {
            return true;
        }

        let member = ImplicitMember {
            name: self.left_text(left).to_string(),
            kind: MemberKind::Field,
        };
        matches!(left_symbol, Symbol::Field(_))
            && self.rules.implicit_qualifier_equivalent(&member, &left_symbol, &right_symbol)
    }

    fn symbols_match(&self, left: &Symbol, right: &Symbol, left_node: Node, right_node: Node) -> bool {
        if let Some(mapped) = self.declarations.get(left) {
            return mapped == right;
        }
        match (left, right) {
            (Symbol::Unresolved, Symbol::Unresolved) => self.left_text(left_node) == self.right_text(right_node),
            (Symbol::Unresolved, _) | (_, Symbol::Unresolved) => false,
            _ => left == right || self.rules.symbols_equivalent(left, right),
        }
    }

    fn type_names_equivalent(&self, left: Node, right: Node) -> bool {
        let left_owner = self.resolver.enclosing_type(self.left, left);
        let right_owner = self.resolver.enclosing_type(self.right, right);
        self.project.resolve_class_name(self.left, left_owner, self.left_text(left))
            == self.project.resolve_class_name(self.right, right_owner, self.right_text(right))
    }

    fn calls_equivalent(&mut self, left: Node, right: Node) -> bool {
        let (Some(left_name), Some(right_name)) = (left.child_by_field_name("name"), right.child_by_field_name("name"))
        else {
            return false;
        };
        if !self.children_equivalent(left, right, Some((left_name, right_name))) {
            return false;
        }

        let left_symbol = self.resolver.resolve_call(self.left, left);
        let right_symbol = self.resolver.resolve_call(self.right, right);
        if self.symbols_match(&left_symbol, &right_symbol, left_name, right_name) {
            return true;
        }

        if !through_this(left) {
            return false;
        }
        let arity = left
            .child_by_field_name("arguments")
            .map(|a| code_children(a).len())
            .unwrap_or(0);
        let member = ImplicitMember {
            name: self.left_text(left_name).to_string(),
            kind: MemberKind::Method { arity },
        };
        self.rules.implicit_qualifier_equivalent(&member, &left_symbol, &right_symbol)
    }

    fn field_accesses_equivalent(&mut self, left: Node, right: Node) -> bool {
        let (Some(left_field), Some(right_field)) = (left.child_by_field_name("field"), right.child_by_field_name("field"))
        else {
            return false;
        };

        // `Outer.this`
        if left_field.kind() == "this" || right_field.kind() == "this" {
            if left_field.kind() != right_field.kind() {
                return false;
            }
            let left_type = self.resolver.this_type(self.left, left);
            let right_type = self.resolver.this_type(self.right, right);
            return self.rules.this_expressions_equivalent(left_type, right_type);
        }

        if !self.children_equivalent(left, right, Some((left_field, right_field))) {
            return false;
        }

        let left_symbol = self.resolver.resolve_field_access(self.left, left);
        let right_symbol = self.resolver.resolve_field_access(self.right, right);
        if self.symbols_match(&left_symbol, &right_symbol, left_field, right_field) {
            return true;
        }

        let member = ImplicitMember {
            name: self.left_text(left_field).to_string(),
            kind: MemberKind::Field,
        };
        through_this(left) && self.rules.implicit_qualifier_equivalent(&member, &left_symbol, &right_symbol)
    }
}

/// No qualifier, or a plain `this` qualifier
fn through_this(node: Node) -> bool {
    match node.child_by_field_name("object") {
        None => true,
        Some(object) => object.kind() == "this",
    }
}

/// Rules for comparing an override with the source of its super method
pub struct OverrideEquivalence<'a> {
    project: &'a Project,
    method: &'a MethodDecl,
    super_source: &'a MethodDecl,
}

impl<'a> OverrideEquivalence<'a> {
    pub fn new(project: &'a Project, method: &'a MethodDecl, super_source: &'a MethodDecl) -> Self {
        Self {
            project,
            method,
            super_source,
        }
    }

    fn is_compiled(&self, id: &DeclarationId) -> bool {
        self.project.origin(id) == SourceOrigin::Compiled
    }

    fn same_element(&self, left: &DeclarationId, right: &DeclarationId) -> bool {
        left == right || self.project.navigation_element(left) == self.project.navigation_element(right)
    }
}

impl EquivalenceRules for OverrideEquivalence<'_> {
    fn symbols_equivalent(&self, left: &Symbol, right: &Symbol) -> bool {
        match (left, right) {
            (Symbol::Method(l), Symbol::Method(r)) | (Symbol::Field(l), Symbol::Field(r)) => {
                (self.is_compiled(l) || self.is_compiled(r)) && self.same_element(l, r)
            }
            _ => false,
        }
    }

    fn this_expressions_equivalent(&self, left: Option<DeclarationId>, right: Option<DeclarationId>) -> bool {
        let Some(left) = left else {
            return false;
        };
        Some(left) == right || (left == self.method.owner && right == Some(self.super_source.owner))
    }

    fn implicit_qualifier_equivalent(&self, member: &ImplicitMember, left: &Symbol, right: &Symbol) -> bool {
        // Fields are not virtual. An implicit field matches only when both sides
        // resolved to the same field, so one declared in the override's class shadows
        let MemberKind::Method { arity } = member.kind else {
            return false;
        };
        let (Symbol::Method(left), Symbol::Method(right)) = (left, right) else {
            return false;
        };

        // Re-resolve from the super method's class; it must land where the right side did
        let from_super = self
            .project
            .find_methods(&self.super_source.owner, &member.name, arity)
            .iter()
            .any(|m| self.same_element(&m.id, right));
        if !from_super {
            return false;
        }

        let Some(target) = self.project.method(left) else {
            return false;
        };
        if target.is_private() || target.is_static() {
            return false;
        }
        if !self.project.is_same_or_inheritor(&self.method.owner, &target.owner) {
            return false;
        }

        // A virtual call on the same receiver dispatches identically
        self.project
            .find_super_methods(target)
            .iter()
            .any(|s| self.same_element(&s.id, right))
    }
}

/// Non-doc comment texts of `super_body` include every one of `method_body`'s
pub fn comments_superset(method_body: Node, method_source: &str, super_body: Node, super_source: &str) -> bool {
    let inherited: HashSet<String> = comment_texts(super_body, super_source).collect();
    comment_texts(method_body, method_source).all(|c| inherited.contains(&c))
}

fn comment_texts<'a>(node: Node<'a>, source: &'a str) -> impl Iterator<Item = String> + 'a {
    descendants(node)
        .filter(move |n| is_comment(*n) && !is_doc_comment(*n, source))
        .map(move |n| normalize_whitespace(node_text(n, source)))
}

/// Whole-body comparison of an override with its super method
pub struct FullBodyEquivalence<'p> {
    project: &'p Project,
    check_library: bool,
}

impl<'p> FullBodyEquivalence<'p> {
    pub fn new(project: &'p Project) -> Self {
        Self {
            project,
            check_library: false,
        }
    }

    /// Also compare against super methods declared in library code
    pub fn with_check_library(mut self, check_library: bool) -> Self {
        self.check_library = check_library;
        self
    }

    pub fn is_equivalent(&self, method: &MethodDecl, super_method: &MethodDecl) -> bool {
        let Some(body) = self.project.body_node(method) else {
            return false;
        };
        if self.project.origin(&super_method.id).is_library() && !self.check_library {
            return false;
        }

        let Some(super_source) = self.project.source_method(super_method) else {
            return false;
        };
        let Some(super_body) = self.project.body_node(super_source) else {
            trace!("No source body for {}", super_method.name);
            return false;
        };
        let (Some(left_unit), Some(right_unit)) = (
            self.project.file(method.id.file),
            self.project.file(super_source.id.file),
        ) else {
            return false;
        };

        let rules = OverrideEquivalence::new(self.project, method, super_source);
        let mut equivalence = TreeEquivalence::new(self.project, rules, method.id.file, super_source.id.file);
        equivalence.declare(Symbol::Method(method.id), Symbol::Method(super_source.id));
        for index in 0..method.params.len() {
            equivalence.declare(
                Symbol::Parameter {
                    method: method.id,
                    index,
                },
                Symbol::Parameter {
                    method: super_source.id,
                    index,
                },
            );
        }

        equivalence.nodes_equivalent(body, super_body)
            && comments_superset(body, &left_unit.source, super_body, &right_unit.source)
    }
}
