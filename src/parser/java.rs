use super::common::{children_of_kind, code_children, is_doc_comment, node_text, point_to_location, ParsedUnit, Parser};
use crate::model::{
    DeclarationId, FieldDecl, FileId, Import, MethodDecl, Parameter, TypeDecl, TypeKind, TypeRef,
};
use miette::{IntoDiagnostic, Result};
use std::path::Path;
use tree_sitter::{Node, Parser as TsParser, Tree};
use tracing::debug;

/// Java source code parser using tree-sitter
#[derive(Debug, Default, Clone, Copy)]
pub struct JavaParser;

/// Enclosing type while walking a file
#[derive(Clone)]
struct Scope {
    id: DeclarationId,
    fqn: String,
    kind: TypeKind,
}

struct Extraction<'a> {
    file: FileId,
    path: &'a Path,
    source: &'a str,
    package: Option<String>,
    unit: ParsedUnit,
    anonymous_counter: usize,
}

impl JavaParser {
    pub fn new() -> Self {
        Self
    }

    fn extract_package(&self, root: Node, source: &str) -> Option<String> {
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == "package_declaration" {
                let mut pkg_cursor = child.walk();
                for pkg_child in child.children(&mut pkg_cursor) {
                    if pkg_child.kind() == "scoped_identifier" || pkg_child.kind() == "identifier" {
                        return Some(node_text(pkg_child, source).to_string());
                    }
                }
            }
        }
        None
    }

    fn extract_imports(&self, root: Node, source: &str) -> Vec<Import> {
        let mut imports = Vec::new();
        let mut cursor = root.walk();

        for child in root.children(&mut cursor) {
            if child.kind() != "import_declaration" {
                continue;
            }
            let mut import_cursor = child.walk();
            let parts: Vec<Node> = child.children(&mut import_cursor).collect();
            let path = parts
                .iter()
                .find(|n| n.kind() == "scoped_identifier" || n.kind() == "identifier")
                .map(|n| node_text(*n, source).to_string());

            if let Some(path) = path {
                imports.push(Import {
                    path,
                    is_static: parts.iter().any(|n| n.kind() == "static"),
                    is_wildcard: parts.iter().any(|n| n.kind() == "asterisk"),
                });
            }
        }

        imports
    }
}

impl Parser for JavaParser {
    fn parse_tree(&self, path: &Path, contents: &str) -> Result<Tree> {
        let mut parser = TsParser::new();
        parser
            .set_language(&tree_sitter_java::language())
            .into_diagnostic()?;

        parser
            .parse(contents, None)
            .ok_or_else(|| miette::miette!("Failed to parse Java file {}", path.display()))
    }

    fn extract(&self, file: FileId, path: &Path, tree: &Tree, contents: &str) -> ParsedUnit {
        let root = tree.root_node();
        let package = self.extract_package(root, contents);

        let mut extraction = Extraction {
            file,
            path,
            source: contents,
            package: package.clone(),
            unit: ParsedUnit::new(),
            anonymous_counter: 0,
        };
        extraction.unit.package = package;
        extraction.unit.imports = self.extract_imports(root, contents);
        extraction.visit(root, None);

        debug!(
            "Parsed {}: {} types, {} methods, {} fields",
            path.display(),
            extraction.unit.types.len(),
            extraction.unit.methods.len(),
            extraction.unit.fields.len()
        );

        extraction.unit
    }
}

impl<'a> Extraction<'a> {
    fn id_of(&self, node: Node) -> DeclarationId {
        DeclarationId::new(self.file, node.start_byte(), node.end_byte())
    }

    fn text(&self, node: Node) -> &'a str {
        node_text(node, self.source)
    }

    /// Walk the tree, recording declarations with their enclosing type
    fn visit(&mut self, node: Node, scope: Option<&Scope>) {
        let kind = match node.kind() {
            "class_declaration" => Some(TypeKind::Class),
            "interface_declaration" => Some(TypeKind::Interface),
            "enum_declaration" => Some(TypeKind::Enum),
            "record_declaration" => Some(TypeKind::Record),
            "annotation_type_declaration" => Some(TypeKind::Annotation),
            _ => None,
        };

        if let Some(kind) = kind {
            let inner = self.extract_type(node, kind, scope);
            self.visit_children(node, Some(&inner));
            return;
        }

        match node.kind() {
            "object_creation_expression" => {
                // Arguments belong to the outer scope, the body to the anonymous class
                let body = children_of_kind(node, "class_body").into_iter().next();
                match (body, scope) {
                    (Some(body), Some(outer)) => {
                        let mut cursor = node.walk();
                        for child in node.children(&mut cursor) {
                            if child.id() != body.id() {
                                self.visit(child, scope);
                            }
                        }
                        let anonymous = self.extract_anonymous(node, node.child_by_field_name("type"), outer);
                        self.visit_children(body, Some(&anonymous));
                    }
                    _ => self.visit_children(node, scope),
                }
            }
            "enum_constant" => {
                if let Some(outer) = scope {
                    self.extract_enum_constant(node, outer);
                }
                match (node.child_by_field_name("body"), scope) {
                    (Some(body), Some(outer)) => {
                        let anonymous = self.extract_anonymous(node, None, outer);
                        self.visit_children(body, Some(&anonymous));
                    }
                    _ => self.visit_children(node, scope),
                }
            }
            "method_declaration" => {
                if let Some(outer) = scope {
                    self.extract_method(node, outer);
                }
                self.visit_children(node, scope);
            }
            "field_declaration" | "constant_declaration" => {
                if let Some(outer) = scope {
                    self.extract_field(node, outer);
                }
                self.visit_children(node, scope);
            }
            _ => self.visit_children(node, scope),
        }
    }

    fn visit_children(&mut self, node: Node, scope: Option<&Scope>) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.visit(child, scope);
        }
    }

    fn extract_type(&mut self, node: Node, kind: TypeKind, scope: Option<&Scope>) -> Scope {
        let id = self.id_of(node);
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_else(|| "<anonymous>".to_string());

        let fully_qualified_name = match scope {
            None => build_fqn(&self.package, &name),
            Some(outer) if is_member(node) => format!("{}.{}", outer.fqn, name),
            // Local classes
            Some(outer) => format!("{}${}", outer.fqn, name),
        };

        let super_class = node
            .child_by_field_name("superclass")
            .and_then(|sc| code_children(sc).into_iter().next())
            .map(|t| type_ref(t, self.source));

        let mut interfaces = Vec::new();
        let interface_clause = node
            .child_by_field_name("interfaces")
            .or_else(|| children_of_kind(node, "extends_interfaces").into_iter().next());
        if let Some(clause) = interface_clause {
            for list in children_of_kind(clause, "type_list") {
                interfaces.extend(code_children(list).into_iter().map(|t| type_ref(t, self.source)));
            }
        }

        let type_params = node
            .child_by_field_name("type_parameters")
            .map(|tp| type_parameter_names(tp, self.source))
            .unwrap_or_default();

        let (modifiers, _) = modifiers_of(node, self.source);

        let decl = TypeDecl {
            id,
            name,
            fully_qualified_name: fully_qualified_name.clone(),
            kind,
            type_params,
            super_class,
            interfaces,
            enclosing: scope.map(|s| s.id),
            modifiers,
            node_kind: node.kind().to_string(),
            methods: Vec::new(),
            fields: Vec::new(),
            location: point_to_location(self.path, node),
        };
        self.unit.types.push(decl);

        // Record components are fields of the record
        if kind == TypeKind::Record {
            if let Some(params) = node.child_by_field_name("parameters") {
                let scope = Scope {
                    id,
                    fqn: fully_qualified_name.clone(),
                    kind,
                };
                for component in children_of_kind(params, "formal_parameter") {
                    self.extract_record_component(component, &scope);
                }
            }
        }

        Scope {
            id,
            fqn: fully_qualified_name,
            kind,
        }
    }

    /// Anonymous class bodies: `new T() { ... }` and enum constants with a body
    fn extract_anonymous(&mut self, node: Node, instantiated: Option<Node>, outer: &Scope) -> Scope {
        self.anonymous_counter += 1;
        let name = self.anonymous_counter.to_string();
        let fully_qualified_name = format!("{}${}", outer.fqn, name);

        let super_class = match instantiated {
            Some(t) => Some(type_ref(t, self.source)),
            // Enum constant bodies extend the enum itself
            None => Some(TypeRef::named(outer.fqn.clone())),
        };

        let id = self.id_of(node);
        self.unit.types.push(TypeDecl {
            id,
            name,
            fully_qualified_name: fully_qualified_name.clone(),
            kind: TypeKind::Anonymous,
            type_params: Vec::new(),
            super_class,
            interfaces: Vec::new(),
            enclosing: Some(outer.id),
            modifiers: Vec::new(),
            node_kind: node.kind().to_string(),
            methods: Vec::new(),
            fields: Vec::new(),
            location: point_to_location(self.path, node),
        });

        Scope {
            id,
            fqn: fully_qualified_name,
            kind: TypeKind::Anonymous,
        }
    }

    fn extract_method(&mut self, node: Node, owner: &Scope) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        let id = self.id_of(node);

        let (modifiers, annotations) = modifiers_of(node, self.source);

        let mut return_type = node
            .child_by_field_name("type")
            .map(|t| type_ref(t, self.source))
            .unwrap_or(TypeRef::Void);
        if let Some(dims) = node.child_by_field_name("dimensions") {
            return_type = wrap_dimensions(return_type, self.text(dims));
        }

        let params = node
            .child_by_field_name("parameters")
            .map(|p| self.extract_parameters(p))
            .unwrap_or_default();

        let throws = children_of_kind(node, "throws")
            .into_iter()
            .flat_map(code_children)
            .map(|t| type_ref(t, self.source))
            .collect();

        let type_params = node
            .child_by_field_name("type_parameters")
            .map(|tp| type_parameter_names(tp, self.source))
            .unwrap_or_default();

        let doc = node
            .prev_sibling()
            .filter(|prev| is_doc_comment(*prev, self.source));

        let body = node
            .child_by_field_name("body")
            .map(|b| b.start_byte()..b.end_byte());

        let method = MethodDecl {
            id,
            owner: owner.id,
            name: self.text(name_node).to_string(),
            type_params,
            params,
            return_type,
            throws,
            modifiers,
            annotations,
            doc_comment: doc.map(|d| self.text(d).to_string()),
            doc_range: doc.map(|d| d.start_byte()..d.end_byte()),
            body,
            location: point_to_location(self.path, node),
            name_location: point_to_location(self.path, name_node),
        };

        if let Some(decl) = self.unit.types.iter_mut().rev().find(|t| t.id == owner.id) {
            decl.methods.push(id);
        }
        self.unit.methods.push(method);
    }

    fn extract_parameters(&self, node: Node) -> Vec<Parameter> {
        let mut params = Vec::new();
        let mut cursor = node.walk();

        for child in node.children(&mut cursor) {
            match child.kind() {
                "formal_parameter" => {
                    let (Some(type_node), Some(name_node)) =
                        (child.child_by_field_name("type"), child.child_by_field_name("name"))
                    else {
                        continue;
                    };
                    let mut ty = type_ref(type_node, self.source);
                    if let Some(dims) = child.child_by_field_name("dimensions") {
                        ty = wrap_dimensions(ty, self.text(dims));
                    }
                    let (_, annotations) = modifiers_of(child, self.source);
                    params.push(Parameter {
                        name: self.text(name_node).to_string(),
                        ty,
                        annotations,
                        is_varargs: false,
                        type_range: type_node.start_byte()..type_node.end_byte(),
                    });
                }
                "spread_parameter" => {
                    // `T... name`: the element type is the first non-modifier child
                    let type_node = code_children(child)
                        .into_iter()
                        .find(|n| n.kind() != "modifiers" && n.kind() != "variable_declarator");
                    let name_node = children_of_kind(child, "variable_declarator")
                        .into_iter()
                        .next()
                        .and_then(|d| d.child_by_field_name("name"));
                    let (Some(type_node), Some(name_node)) = (type_node, name_node) else {
                        continue;
                    };
                    let (_, annotations) = modifiers_of(child, self.source);
                    params.push(Parameter {
                        name: self.text(name_node).to_string(),
                        ty: type_ref(type_node, self.source),
                        annotations,
                        is_varargs: true,
                        type_range: type_node.start_byte()..type_node.end_byte(),
                    });
                }
                _ => {}
            }
        }

        params
    }

    fn extract_field(&mut self, node: Node, owner: &Scope) {
        let Some(type_node) = node.child_by_field_name("type") else {
            return;
        };
        let (mut modifiers, _) = modifiers_of(node, self.source);
        if owner.kind.is_interface() {
            for implicit in ["public", "static", "final"] {
                if !modifiers.iter().any(|m| m == implicit) {
                    modifiers.push(implicit.to_string());
                }
            }
        }

        // A field declaration can have multiple declarators
        for declarator in children_of_kind(node, "variable_declarator") {
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            let mut ty = type_ref(type_node, self.source);
            if let Some(dims) = declarator.child_by_field_name("dimensions") {
                ty = wrap_dimensions(ty, self.text(dims));
            }
            self.push_field(FieldDecl {
                id: self.id_of(declarator),
                owner: owner.id,
                name: self.text(name_node).to_string(),
                ty,
                modifiers: modifiers.clone(),
                location: point_to_location(self.path, declarator),
            });
        }
    }

    fn extract_enum_constant(&mut self, node: Node, owner: &Scope) {
        let Some(name_node) = node.child_by_field_name("name") else {
            return;
        };
        self.push_field(FieldDecl {
            id: self.id_of(node),
            owner: owner.id,
            name: self.text(name_node).to_string(),
            ty: TypeRef::named(owner.fqn.clone()),
            modifiers: vec!["public".into(), "static".into(), "final".into()],
            location: point_to_location(self.path, node),
        });
    }

    fn extract_record_component(&mut self, node: Node, owner: &Scope) {
        let (Some(type_node), Some(name_node)) =
            (node.child_by_field_name("type"), node.child_by_field_name("name"))
        else {
            return;
        };
        self.push_field(FieldDecl {
            id: self.id_of(node),
            owner: owner.id,
            name: self.text(name_node).to_string(),
            ty: type_ref(type_node, self.source),
            modifiers: vec!["private".into(), "final".into()],
            location: point_to_location(self.path, node),
        });
    }

    fn push_field(&mut self, field: FieldDecl) {
        if let Some(decl) = self.unit.types.iter_mut().rev().find(|t| t.id == field.owner) {
            decl.fields.push(field.id);
        }
        self.unit.fields.push(field);
    }
}

/// Whether a type declaration is a member of its enclosing type (not local)
fn is_member(node: Node) -> bool {
    node.parent()
        .map(|p| {
            matches!(
                p.kind(),
                "class_body" | "interface_body" | "enum_body_declarations" | "annotation_type_body" | "program"
            )
        })
        .unwrap_or(true)
}

/// Keyword modifiers and annotation texts of a declaration
fn modifiers_of(node: Node, source: &str) -> (Vec<String>, Vec<String>) {
    let mut modifiers = Vec::new();
    let mut annotations = Vec::new();

    for mods in children_of_kind(node, "modifiers") {
        let mut cursor = mods.walk();
        for modifier in mods.children(&mut cursor) {
            match modifier.kind() {
                "marker_annotation" | "annotation" => {
                    annotations.push(node_text(modifier, source).to_string());
                }
                "line_comment" | "block_comment" => {}
                _ => modifiers.push(node_text(modifier, source).to_string()),
            }
        }
    }

    (modifiers, annotations)
}

fn type_parameter_names(node: Node, source: &str) -> Vec<String> {
    children_of_kind(node, "type_parameter")
        .into_iter()
        .filter_map(|tp| {
            children_of_kind(tp, "type_identifier")
                .into_iter()
                .next()
                .or_else(|| children_of_kind(tp, "identifier").into_iter().next())
        })
        .map(|n| node_text(n, source).to_string())
        .collect()
}

fn wrap_dimensions(mut ty: TypeRef, dims: &str) -> TypeRef {
    for _ in 0..dims.matches('[').count() {
        ty = TypeRef::Array(Box::new(ty));
    }
    ty
}

/// Convert a type node into a [`TypeRef`] as written
pub fn type_ref(node: Node, source: &str) -> TypeRef {
    match node.kind() {
        "integral_type" | "floating_point_type" | "boolean_type" => {
            TypeRef::Primitive(node_text(node, source).to_string())
        }
        "void_type" => TypeRef::Void,
        "type_identifier" | "identifier" => TypeRef::named(node_text(node, source)),
        "scoped_type_identifier" | "scoped_identifier" => TypeRef::named(
            node_text(node, source)
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>(),
        ),
        "generic_type" => {
            let children = code_children(node);
            let name = children
                .iter()
                .find(|n| n.kind() == "type_identifier" || n.kind() == "scoped_type_identifier")
                .map(|n| node_text(*n, source).chars().filter(|c| !c.is_whitespace()).collect())
                .unwrap_or_default();
            let args = children
                .iter()
                .find(|n| n.kind() == "type_arguments")
                .map(|ta| {
                    code_children(*ta)
                        .into_iter()
                        .filter(|a| !matches!(a.kind(), "annotation" | "marker_annotation"))
                        .map(|a| type_ref(a, source))
                        .collect()
                })
                .unwrap_or_default();
            TypeRef::Named { name, args }
        }
        "array_type" => {
            let element = node
                .child_by_field_name("element")
                .map(|e| type_ref(e, source))
                .unwrap_or_else(|| TypeRef::named(node_text(node, source)));
            let dims = node
                .child_by_field_name("dimensions")
                .map(|d| node_text(d, source))
                .unwrap_or("[]");
            wrap_dimensions(element, dims)
        }
        "wildcard" => {
            let mut cursor = node.walk();
            let children: Vec<Node> = node.children(&mut cursor).collect();
            let is_lower = children.iter().any(|c| c.kind() == "super");
            let bound = children
                .iter()
                .filter(|c| c.is_named() && !matches!(c.kind(), "super" | "annotation" | "marker_annotation"))
                .last()
                .map(|b| Box::new(type_ref(*b, source)));
            if is_lower {
                TypeRef::Wildcard { upper: None, lower: bound }
            } else {
                TypeRef::Wildcard { upper: bound, lower: None }
            }
        }
        "annotated_type" => code_children(node)
            .into_iter()
            .filter(|c| !matches!(c.kind(), "annotation" | "marker_annotation"))
            .last()
            .map(|t| type_ref(t, source))
            .unwrap_or_else(|| TypeRef::named(node_text(node, source))),
        _ => TypeRef::named(node_text(node, source)),
    }
}

fn build_fqn(package: &Option<String>, name: &str) -> String {
    match package {
        Some(pkg) => format!("{}.{}", pkg, name),
        None => name.to_string(),
    }
}
