//! Lexical name resolution over syntax nodes
//!
//! Resolution is best effort: it follows Java's scoping for locals,
//! parameters, fields and methods, and uses declared types only. Anything it
//! cannot decide comes back as [`Symbol::Unresolved`].

use super::types::TypeScope;
use super::{DeclarationId, FileId, JavaType, MethodDecl, Project};
use crate::parser::{code_children, node_text, strip_parens, type_ref};
use tree_sitter::Node;

/// What a name in the source refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    /// Local variable, identified by its declaring name identifier
    Local { file: FileId, start: usize },
    /// Formal parameter of a method
    Parameter { method: DeclarationId, index: usize },
    Field(DeclarationId),
    Method(DeclarationId),
    Type(DeclarationId),
    Unresolved,
}

impl Symbol {
    pub fn is_resolved(&self) -> bool {
        !matches!(self, Symbol::Unresolved)
    }

    /// The member declaration behind a field or method symbol
    pub fn member(&self) -> Option<DeclarationId> {
        match self {
            Symbol::Field(id) | Symbol::Method(id) => Some(*id),
            _ => None,
        }
    }
}

const TYPE_DECLARATIONS: &[&str] = &[
    "class_declaration",
    "interface_declaration",
    "enum_declaration",
    "record_declaration",
    "annotation_type_declaration",
];

/// Resolves names inside the files of a [`Project`]
#[derive(Clone, Copy)]
pub struct Resolver<'p> {
    project: &'p Project,
}

impl<'p> Resolver<'p> {
    pub fn new(project: &'p Project) -> Self {
        Self { project }
    }

    fn source(&self, file: FileId) -> &'p str {
        self.project.file(file).map(|f| f.source.as_str()).unwrap_or("")
    }

    fn text(&self, file: FileId, node: Node) -> &'p str {
        node_text(node, self.source(file))
    }

    /// The type declaration a node belongs to, if the node itself declares one
    fn type_at(&self, file: FileId, node: Node) -> Option<DeclarationId> {
        let is_type = TYPE_DECLARATIONS.contains(&node.kind())
            || (node.kind() == "object_creation_expression" && has_class_body(node))
            || (node.kind() == "enum_constant" && node.child_by_field_name("body").is_some());
        if !is_type {
            return None;
        }
        let id = DeclarationId::new(file, node.start_byte(), node.end_byte());
        self.project.type_decl(&id).map(|t| t.id)
    }

    /// Innermost type whose body contains `node`
    pub fn enclosing_type(&self, file: FileId, node: Node) -> Option<DeclarationId> {
        let mut child = node;
        let mut current = node.parent();
        while let Some(parent) = current {
            if let Some(id) = self.type_at(file, parent) {
                // Arguments of `new T(...) { }` are evaluated outside the anonymous class
                let inside_body = match parent.kind() {
                    "object_creation_expression" | "enum_constant" => child.kind() == "class_body",
                    _ => true,
                };
                if inside_body {
                    return Some(id);
                }
            }
            child = parent;
            current = parent.parent();
        }
        None
    }

    /// Enclosing types, innermost first
    pub fn enclosing_types(&self, file: FileId, node: Node) -> Vec<DeclarationId> {
        let mut types = Vec::new();
        let mut current = self.enclosing_type(file, node);
        while let Some(id) = current {
            types.push(id);
            current = self
                .project
                .type_decl(&id)
                .and_then(|t| self.project.type_node(t))
                .and_then(|n| self.enclosing_type(file, n));
        }
        types
    }

    /// The method whose declaration contains `node`, stopping at class boundaries
    pub fn enclosing_method(&self, file: FileId, node: Node) -> Option<DeclarationId> {
        let mut current = node.parent();
        while let Some(parent) = current {
            if parent.kind() == "method_declaration" {
                let id = DeclarationId::new(file, parent.start_byte(), parent.end_byte());
                return self.project.method(&id).map(|m| m.id);
            }
            if parent.kind() == "class_body" || self.type_at(file, parent).is_some() {
                return None;
            }
            current = parent.parent();
        }
        None
    }

    fn scope_of(&self, file: FileId, node: Node) -> TypeScope {
        TypeScope {
            file,
            owner: self.enclosing_type(file, node),
            method: self.enclosing_method(file, node),
        }
    }

    /// Symbol introduced by a declaring identifier, e.g. the name of a local
    pub fn declared_symbol(&self, file: FileId, name: Node) -> Option<Symbol> {
        let parent = name.parent()?;
        let is_name = parent
            .child_by_field_name("name")
            .map(|n| n.id() == name.id())
            .unwrap_or(false);

        match parent.kind() {
            "variable_declarator" if is_name => {
                let declaration = parent.parent()?;
                if matches!(declaration.kind(), "field_declaration" | "constant_declaration") {
                    Some(Symbol::Field(DeclarationId::new(file, parent.start_byte(), parent.end_byte())))
                } else if declaration.kind() == "spread_parameter" {
                    self.parameter_symbol(file, declaration)
                } else {
                    Some(local(file, name))
                }
            }
            "formal_parameter" if is_name => self.parameter_symbol(file, parent),
            "catch_formal_parameter" | "enhanced_for_statement" | "resource" if is_name => Some(local(file, name)),
            "lambda_expression" => parent
                .child_by_field_name("parameters")
                .filter(|p| p.id() == name.id())
                .map(|_| local(file, name)),
            "inferred_parameters" => Some(local(file, name)),
            "method_declaration" if is_name => {
                Some(Symbol::Method(DeclarationId::new(file, parent.start_byte(), parent.end_byte())))
            }
            _ => None,
        }
    }

    /// Parameters of methods are indexed; parameters of anything else are locals
    fn parameter_symbol(&self, file: FileId, parameter: Node) -> Option<Symbol> {
        let list = parameter.parent()?;
        let owner = list.parent()?;
        let name = parameter
            .child_by_field_name("name")
            .or_else(|| {
                code_children(parameter)
                    .into_iter()
                    .find(|c| c.kind() == "variable_declarator")
                    .and_then(|d| d.child_by_field_name("name"))
            })?;

        if owner.kind() == "method_declaration" {
            let index = code_children(list)
                .into_iter()
                .filter(|c| matches!(c.kind(), "formal_parameter" | "spread_parameter"))
                .position(|c| c.id() == parameter.id())?;
            return Some(Symbol::Parameter {
                method: DeclarationId::new(file, owner.start_byte(), owner.end_byte()),
                index,
            });
        }
        Some(local(file, name))
    }

    /// Resolve a simple name used as an expression
    pub fn resolve_identifier(&self, file: FileId, node: Node) -> Symbol {
        let name = self.text(file, node);
        let mut child = node;
        let mut current = node.parent();

        while let Some(scope) = current {
            if let Some(found) = self.find_in_scope(file, scope, child, name) {
                return found;
            }

            if let Some(type_id) = self.type_at(file, scope) {
                let inside_body = match scope.kind() {
                    "object_creation_expression" | "enum_constant" => child.kind() == "class_body",
                    _ => true,
                };
                if inside_body {
                    if let Some(field) = self.project.find_field(&type_id, name) {
                        return Symbol::Field(field.id);
                    }
                }
            }

            child = scope;
            current = scope.parent();
        }

        Symbol::Unresolved
    }

    /// Declarations of `name` that `scope` makes visible to `child`
    fn find_in_scope(&self, file: FileId, scope: Node, child: Node, name: &str) -> Option<Symbol> {
        match scope.kind() {
            "block" | "switch_block_statement_group" | "constructor_body" | "switch_rule" => {
                for statement in code_children(scope) {
                    if statement.start_byte() >= child.start_byte() {
                        break;
                    }
                    if statement.kind() == "local_variable_declaration" {
                        if let Some(symbol) = self.declarator_named(file, statement, name) {
                            return Some(symbol);
                        }
                    }
                }
                None
            }
            "for_statement" => {
                let init = scope.child_by_field_name("init")?;
                if init.id() == child.id() {
                    return None;
                }
                if init.kind() == "local_variable_declaration" {
                    return self.declarator_named(file, init, name);
                }
                None
            }
            "enhanced_for_statement" | "catch_formal_parameter" | "resource" => {
                let declared = scope.child_by_field_name("name")?;
                (self.text(file, declared) == name && declared.id() != child.id())
                    .then(|| local(file, declared))
            }
            "catch_clause" => code_children(scope)
                .into_iter()
                .find(|c| c.kind() == "catch_formal_parameter")
                .and_then(|p| p.child_by_field_name("name"))
                .filter(|n| self.text(file, *n) == name)
                .map(|n| local(file, n)),
            "try_with_resources_statement" => {
                let resources = scope.child_by_field_name("resources")?;
                code_children(resources)
                    .into_iter()
                    .filter(|r| r.end_byte() <= child.start_byte() || child.kind() == "block")
                    .filter_map(|r| r.child_by_field_name("name"))
                    .find(|n| self.text(file, *n) == name)
                    .map(|n| local(file, n))
            }
            "lambda_expression" => {
                let params = scope.child_by_field_name("parameters")?;
                if params.kind() == "identifier" {
                    return (self.text(file, params) == name).then(|| local(file, params));
                }
                for param in code_children(params) {
                    let declared = match param.kind() {
                        "identifier" => Some(param),
                        _ => param.child_by_field_name("name"),
                    };
                    if let Some(declared) = declared.filter(|n| self.text(file, *n) == name) {
                        return Some(local(file, declared));
                    }
                }
                None
            }
            "method_declaration" | "constructor_declaration" => {
                let params = scope.child_by_field_name("parameters")?;
                for param in code_children(params) {
                    let declared = match param.kind() {
                        "formal_parameter" => param.child_by_field_name("name"),
                        "spread_parameter" => code_children(param)
                            .into_iter()
                            .find(|c| c.kind() == "variable_declarator")
                            .and_then(|d| d.child_by_field_name("name")),
                        _ => None,
                    };
                    if declared.map(|n| self.text(file, n) == name).unwrap_or(false) {
                        return self.parameter_symbol(file, param);
                    }
                }
                None
            }
            _ => None,
        }
    }

    fn declarator_named(&self, file: FileId, declaration: Node, name: &str) -> Option<Symbol> {
        code_children(declaration)
            .into_iter()
            .filter(|c| c.kind() == "variable_declarator")
            .filter_map(|d| d.child_by_field_name("name"))
            .find(|n| self.text(file, *n) == name)
            .map(|n| local(file, n))
    }

    /// Resolve the method a `method_invocation` calls
    pub fn resolve_call(&self, file: FileId, call: Node) -> Symbol {
        let Some(name_node) = call.child_by_field_name("name") else {
            return Symbol::Unresolved;
        };
        let name = self.text(file, name_node);
        let args: Vec<Node> = call
            .child_by_field_name("arguments")
            .map(code_children)
            .unwrap_or_default();

        let candidates: Vec<&MethodDecl> = match self.receiver_types(file, call) {
            Receiver::Outward(types) => types
                .iter()
                .map(|t| self.project.find_methods(t, name, args.len()))
                .find(|c| !c.is_empty())
                .unwrap_or_default(),
            Receiver::Type(ty) => self.project.find_methods(&ty, name, args.len()),
            Receiver::Unknown => Vec::new(),
        };

        match self.pick_overload(file, &candidates, &args) {
            Some(method) => Symbol::Method(method.id),
            None => Symbol::Unresolved,
        }
    }

    /// Where lookup for a call's name starts
    fn receiver_types(&self, file: FileId, call: Node) -> Receiver {
        let object = call.child_by_field_name("object");
        let qualified_super = {
            let mut cursor = call.walk();
            let has_super = call
                .children(&mut cursor)
                .any(|c| c.kind() == "super" && Some(c.id()) != object.map(|o| o.id()));
            has_super
        };

        let Some(object) = object else {
            return Receiver::Outward(self.enclosing_types(file, call));
        };

        // `Iface.super.m()`
        if qualified_super {
            let owner = self.enclosing_type(file, call);
            let fqn = self
                .project
                .resolve_class_name(file, owner, self.text(file, object));
            return match self.project.type_by_fqn(&fqn) {
                Some(t) => Receiver::Type(t.id),
                None => Receiver::Unknown,
            };
        }

        match object.kind() {
            "super" => {
                let Some(owner) = self.enclosing_type(file, call) else {
                    return Receiver::Unknown;
                };
                match self.project.hierarchy().super_class(&owner).and_then(|s| s.decl) {
                    Some(sup) => Receiver::Type(sup),
                    None => Receiver::Unknown,
                }
            }
            "this" => match self.enclosing_type(file, call) {
                Some(t) => Receiver::Type(t),
                None => Receiver::Unknown,
            },
            _ => match self.static_type(file, object).as_ref().and_then(|t| self.declaration_of(t)) {
                Some(t) => Receiver::Type(t),
                None => Receiver::Unknown,
            },
        }
    }

    fn declaration_of(&self, ty: &JavaType) -> Option<DeclarationId> {
        ty.fqn().and_then(|fqn| self.project.type_by_fqn(fqn)).map(|t| t.id)
    }

    /// Choose among same-name candidates using the argument types that are known
    fn pick_overload<'m>(&self, file: FileId, candidates: &[&'m MethodDecl], args: &[Node]) -> Option<&'m MethodDecl> {
        if candidates.len() <= 1 {
            return candidates.first().copied();
        }

        let arg_types: Vec<Option<JavaType>> = args
            .iter()
            .map(|a| self.static_type(file, *a).map(|t| t.erasure()))
            .collect();

        candidates
            .iter()
            .find(|candidate| {
                let params = self.project.parameter_types(candidate);
                params.len() == arg_types.len()
                    && params.iter().zip(&arg_types).all(|(param, arg)| match arg {
                        Some(arg) => param.erasure() == *arg || (!is_primitive(arg) && param.erasure() == JavaType::object()),
                        None => true,
                    })
            })
            .or_else(|| candidates.first())
            .copied()
    }

    /// Resolve the field a `field_access` reads
    pub fn resolve_field_access(&self, file: FileId, access: Node) -> Symbol {
        let (Some(object), Some(field)) = (access.child_by_field_name("object"), access.child_by_field_name("field")) else {
            return Symbol::Unresolved;
        };
        let name = self.text(file, field);

        let owner = match object.kind() {
            "this" => self.enclosing_type(file, access),
            "super" => self
                .enclosing_type(file, access)
                .and_then(|t| self.project.hierarchy().super_class(&t))
                .and_then(|s| s.decl),
            _ => self
                .static_type(file, object)
                .as_ref()
                .and_then(|t| self.declaration_of(t)),
        };

        owner
            .and_then(|t| self.project.find_field(&t, name))
            .map(|f| Symbol::Field(f.id))
            .unwrap_or(Symbol::Unresolved)
    }

    /// The class a `this` expression (or a qualified `Outer.this`) denotes
    pub fn this_type(&self, file: FileId, node: Node) -> Option<DeclarationId> {
        if node.kind() == "field_access" {
            let object = node.child_by_field_name("object")?;
            let owner = self.enclosing_type(file, node);
            let fqn = self.project.resolve_class_name(file, owner, self.text(file, object));
            return self.project.type_by_fqn(&fqn).map(|t| t.id);
        }

        if let Some(parent) = node.parent() {
            let is_qualified = parent.kind() == "field_access"
                && parent
                    .child_by_field_name("field")
                    .map(|f| f.id() == node.id())
                    .unwrap_or(false);
            if is_qualified {
                return self.this_type(file, parent);
            }
        }

        self.enclosing_type(file, node)
    }

    /// Declared type of an expression, when it follows from declarations alone
    pub fn static_type(&self, file: FileId, expr: Node) -> Option<JavaType> {
        let expr = strip_parens(expr);
        match expr.kind() {
            "identifier" => match self.resolve_identifier(file, expr) {
                Symbol::Unresolved => {
                    // A class name used as a static receiver
                    let owner = self.enclosing_type(file, expr);
                    let fqn = self.project.resolve_class_name(file, owner, self.text(file, expr));
                    self.project.type_by_fqn(&fqn).map(|t| JavaType::Class {
                        fqn: t.fully_qualified_name.clone(),
                        args: Vec::new(),
                    })
                }
                symbol => self.symbol_type(file, symbol),
            },
            "this" => self.this_type(file, expr).and_then(|t| self.class_type(&t)),
            "field_access" => {
                if expr.child_by_field_name("field").map(|f| f.kind()) == Some("this") {
                    return self.this_type(file, expr).and_then(|t| self.class_type(&t));
                }
                match self.resolve_field_access(file, expr) {
                    Symbol::Unresolved => {
                        let owner = self.enclosing_type(file, expr);
                        let fqn = self.project.resolve_class_name(file, owner, self.text(file, expr));
                        self.project.type_by_fqn(&fqn).map(|t| JavaType::Class {
                            fqn: t.fully_qualified_name.clone(),
                            args: Vec::new(),
                        })
                    }
                    symbol => self.symbol_type(file, symbol),
                }
            }
            "method_invocation" => match self.resolve_call(file, expr) {
                Symbol::Method(id) => self.project.method(&id).map(|m| self.project.return_type(m)),
                _ => None,
            },
            "object_creation_expression" | "cast_expression" => {
                let ty = expr.child_by_field_name("type")?;
                Some(self.project.resolve_type(self.scope_of(file, expr), &type_ref(ty, self.source(file))))
            }
            "array_access" => match self.static_type(file, expr.child_by_field_name("array")?)? {
                JavaType::Array(inner) => Some(*inner),
                _ => None,
            },
            "string_literal" | "text_block" => Some(JavaType::Class {
                fqn: "java.lang.String".to_string(),
                args: Vec::new(),
            }),
            "decimal_integer_literal" | "hex_integer_literal" | "octal_integer_literal" | "binary_integer_literal" => {
                let text = self.text(file, expr);
                let kind = if text.ends_with('l') || text.ends_with('L') { "long" } else { "int" };
                Some(JavaType::Primitive(kind.to_string()))
            }
            "decimal_floating_point_literal" | "hex_floating_point_literal" => {
                let text = self.text(file, expr);
                let kind = if text.ends_with('f') || text.ends_with('F') { "float" } else { "double" };
                Some(JavaType::Primitive(kind.to_string()))
            }
            "true" | "false" => Some(JavaType::Primitive("boolean".to_string())),
            "character_literal" => Some(JavaType::Primitive("char".to_string())),
            _ => None,
        }
    }

    fn class_type(&self, id: &DeclarationId) -> Option<JavaType> {
        let decl = self.project.type_decl(id)?;
        Some(JavaType::Class {
            fqn: decl.fully_qualified_name.clone(),
            args: decl
                .type_params
                .iter()
                .map(|p| JavaType::TypeVar {
                    name: p.clone(),
                    owner: decl.id,
                })
                .collect(),
        })
    }

    fn symbol_type(&self, file: FileId, symbol: Symbol) -> Option<JavaType> {
        match symbol {
            Symbol::Parameter { method, index } => {
                let method = self.project.method(&method)?;
                self.project.parameter_types(method).into_iter().nth(index)
            }
            Symbol::Field(id) => {
                let field = self.project.field(&id)?;
                let scope = TypeScope::of_type(field.id.file, field.owner);
                Some(self.project.resolve_type(scope, &field.ty))
            }
            Symbol::Local { start, .. } => {
                let unit = self.project.file(file)?;
                let name = unit.tree.root_node().descendant_for_byte_range(start, start + 1)?;
                let mut declaration = name.parent()?;
                if declaration.kind() == "variable_declarator" {
                    declaration = declaration.parent()?;
                }
                let ty = declaration.child_by_field_name("type")?;
                if self.text(file, ty) == "var" {
                    return None;
                }
                Some(self.project.resolve_type(self.scope_of(file, name), &type_ref(ty, &unit.source)))
            }
            _ => None,
        }
    }
}

enum Receiver {
    /// Unqualified call: enclosing types, innermost first
    Outward(Vec<DeclarationId>),
    Type(DeclarationId),
    Unknown,
}

fn local(file: FileId, name: Node) -> Symbol {
    Symbol::Local {
        file,
        start: name.start_byte(),
    }
}

fn has_class_body(node: Node) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == "class_body");
    found
}

fn is_primitive(ty: &JavaType) -> bool {
    matches!(ty, JavaType::Primitive(_))
}
