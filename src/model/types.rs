//! Resolved Java types, type-name resolution and generic substitution

use super::{DeclarationId, FileId, Project, TypeRef};
use std::collections::HashMap;

pub const JAVA_LANG_OBJECT: &str = "java.lang.Object";

/// Names importable from `java.lang` without an import statement
const JAVA_LANG_TYPES: &[&str] = &[
    "Object", "String", "Class", "Integer", "Long", "Short", "Byte", "Character", "Boolean",
    "Float", "Double", "Number", "Void", "Math", "System", "Thread", "Runnable", "Iterable",
    "Comparable", "CharSequence", "StringBuilder", "StringBuffer", "Enum", "Record", "Cloneable",
    "AutoCloseable", "Throwable", "Exception", "Error", "RuntimeException",
    "IllegalArgumentException", "IllegalStateException", "NullPointerException",
    "UnsupportedOperationException", "IndexOutOfBoundsException", "ClassCastException",
    "ArithmeticException", "CloneNotSupportedException", "InterruptedException",
    "ReflectiveOperationException", "ClassNotFoundException", "SecurityException",
    "Override", "Deprecated", "SuppressWarnings", "FunctionalInterface", "SafeVarargs",
];

/// A Java type after name resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JavaType {
    Primitive(String),
    Void,
    Class { fqn: String, args: Vec<JavaType> },
    /// Type parameter, identified by its name and declaring type or method
    TypeVar { name: String, owner: DeclarationId },
    Array(Box<JavaType>),
    Wildcard { upper: Option<Box<JavaType>>, lower: Option<Box<JavaType>> },
}

impl JavaType {
    pub fn object() -> Self {
        JavaType::Class {
            fqn: JAVA_LANG_OBJECT.to_string(),
            args: Vec::new(),
        }
    }

    pub fn is_type_var(&self) -> bool {
        matches!(self, JavaType::TypeVar { .. })
    }

    /// Class types in the broad sense: declared classes and type variables
    pub fn is_class_type(&self) -> bool {
        matches!(self, JavaType::Class { .. } | JavaType::TypeVar { .. })
    }

    pub fn fqn(&self) -> Option<&str> {
        match self {
            JavaType::Class { fqn, .. } => Some(fqn),
            _ => None,
        }
    }

    /// Type erasure; type variables erase to `java.lang.Object`
    pub fn erasure(&self) -> JavaType {
        match self {
            JavaType::Class { fqn, .. } => JavaType::Class {
                fqn: fqn.clone(),
                args: Vec::new(),
            },
            JavaType::TypeVar { .. } | JavaType::Wildcard { .. } => JavaType::object(),
            JavaType::Array(inner) => JavaType::Array(Box::new(inner.erasure())),
            other => other.clone(),
        }
    }

    /// Render the type as source text with simple class names
    pub fn to_source(&self) -> String {
        match self {
            JavaType::Primitive(name) => name.clone(),
            JavaType::Void => "void".to_string(),
            JavaType::Class { fqn, args } => {
                let simple = fqn.rsplit(|c: char| c == '.' || c == '$').next().unwrap_or(fqn);
                if args.is_empty() {
                    simple.to_string()
                } else {
                    let args: Vec<String> = args.iter().map(|a| a.to_source()).collect();
                    format!("{}<{}>", simple, args.join(", "))
                }
            }
            JavaType::TypeVar { name, .. } => name.clone(),
            JavaType::Array(inner) => format!("{}[]", inner.to_source()),
            JavaType::Wildcard { upper, lower } => match (upper, lower) {
                (Some(u), _) => format!("? extends {}", u.to_source()),
                (None, Some(l)) => format!("? super {}", l.to_source()),
                (None, None) => "?".to_string(),
            },
        }
    }
}

impl std::fmt::Display for JavaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JavaType::Class { fqn, args } if !args.is_empty() => {
                let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}<{}>", fqn, args.join(", "))
            }
            JavaType::Class { fqn, .. } => write!(f, "{}", fqn),
            JavaType::Array(inner) => write!(f, "{}[]", inner),
            other => write!(f, "{}", other.to_source()),
        }
    }
}

/// Maps type variables of a super type to types in a subclass's terms
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Substitutor {
    map: HashMap<(String, DeclarationId), JavaType>,
}

impl Substitutor {
    pub fn identity() -> Self {
        Self::default()
    }

    pub fn put(&mut self, name: &str, owner: DeclarationId, ty: JavaType) {
        self.map.insert((name.to_string(), owner), ty);
    }

    pub fn get(&self, name: &str, owner: &DeclarationId) -> Option<&JavaType> {
        self.map.get(&(name.to_string(), *owner))
    }

    pub fn is_identity(&self) -> bool {
        self.map.is_empty()
    }

    pub fn substitute(&self, ty: &JavaType) -> JavaType {
        match ty {
            JavaType::TypeVar { name, owner } => self
                .map
                .get(&(name.clone(), *owner))
                .cloned()
                .unwrap_or_else(|| ty.clone()),
            JavaType::Class { fqn, args } => JavaType::Class {
                fqn: fqn.clone(),
                args: args.iter().map(|a| self.substitute(a)).collect(),
            },
            JavaType::Array(inner) => JavaType::Array(Box::new(self.substitute(inner))),
            JavaType::Wildcard { upper, lower } => JavaType::Wildcard {
                upper: upper.as_ref().map(|u| Box::new(self.substitute(u))),
                lower: lower.as_ref().map(|l| Box::new(self.substitute(l))),
            },
            other => other.clone(),
        }
    }
}

/// Scope in which a [`TypeRef`] is resolved
#[derive(Debug, Clone, Copy)]
pub struct TypeScope {
    pub file: FileId,
    pub owner: Option<DeclarationId>,
    pub method: Option<DeclarationId>,
}

impl TypeScope {
    pub fn file(file: FileId) -> Self {
        Self {
            file,
            owner: None,
            method: None,
        }
    }

    pub fn of_type(file: FileId, owner: DeclarationId) -> Self {
        Self {
            file,
            owner: Some(owner),
            method: None,
        }
    }

    pub fn of_method(file: FileId, owner: DeclarationId, method: DeclarationId) -> Self {
        Self {
            file,
            owner: Some(owner),
            method: Some(method),
        }
    }
}

impl Project {
    /// Resolve a type as written into a [`JavaType`]
    pub fn resolve_type(&self, scope: TypeScope, ty: &TypeRef) -> JavaType {
        match ty {
            TypeRef::Primitive(name) => JavaType::Primitive(name.clone()),
            TypeRef::Void => JavaType::Void,
            TypeRef::Array(inner) => JavaType::Array(Box::new(self.resolve_type(scope, inner))),
            TypeRef::Wildcard { upper, lower } => JavaType::Wildcard {
                upper: upper.as_ref().map(|u| Box::new(self.resolve_type(scope, u))),
                lower: lower.as_ref().map(|l| Box::new(self.resolve_type(scope, l))),
            },
            TypeRef::Named { name, args } => {
                if args.is_empty() && !name.contains('.') {
                    if let Some(var) = self.resolve_type_var(scope, name) {
                        return var;
                    }
                }
                JavaType::Class {
                    fqn: self.resolve_class_name(scope.file, scope.owner, name),
                    args: args.iter().map(|a| self.resolve_type(scope, a)).collect(),
                }
            }
        }
    }

    fn resolve_type_var(&self, scope: TypeScope, name: &str) -> Option<JavaType> {
        if let Some(method) = scope.method.and_then(|m| self.method(&m)) {
            if method.type_params.iter().any(|p| p == name) {
                return Some(JavaType::TypeVar {
                    name: name.to_string(),
                    owner: method.id,
                });
            }
        }

        let mut current = scope.owner;
        while let Some(id) = current {
            let decl = self.type_decl(&id)?;
            if decl.type_params.iter().any(|p| p == name) {
                return Some(JavaType::TypeVar {
                    name: name.to_string(),
                    owner: decl.id,
                });
            }
            // Type parameters of an outer class are not visible in a static nested class
            if decl.is_static() || decl.is_interface() {
                break;
            }
            current = decl.enclosing;
        }

        None
    }

    /// Resolve a simple or dotted class name to a fully qualified name
    ///
    /// Follows the Java lookup order: member types of enclosing types, types
    /// of the same file, single-type imports, the same package, on-demand
    /// imports, and finally `java.lang`. Unknown names are returned as written.
    pub fn resolve_class_name(&self, file: FileId, owner: Option<DeclarationId>, name: &str) -> String {
        if let Some((head, rest)) = name.split_once('.') {
            let resolved_head = self.resolve_simple_class_name(file, owner, head);
            return match resolved_head {
                Some(head_fqn) => format!("{}.{}", head_fqn, rest),
                None => name.to_string(),
            };
        }

        self.resolve_simple_class_name(file, owner, name)
            .unwrap_or_else(|| name.to_string())
    }

    fn resolve_simple_class_name(&self, file: FileId, owner: Option<DeclarationId>, name: &str) -> Option<String> {
        // Enclosing types and their member types
        let mut current = owner;
        while let Some(id) = current {
            let decl = self.type_decl(&id)?;
            if decl.name == name {
                return Some(decl.fully_qualified_name.clone());
            }
            for member in self.member_types(&id) {
                if member.name == name {
                    return Some(member.fully_qualified_name.clone());
                }
            }
            current = decl.enclosing;
        }

        let unit = self.file(file)?;

        // Top-level types of the same file
        if let Some(decl) = self
            .types_in_file(file)
            .find(|t| t.enclosing.is_none() && t.name == name)
        {
            return Some(decl.fully_qualified_name.clone());
        }

        // Single-type imports
        if let Some(import) = unit
            .imports
            .iter()
            .find(|i| !i.is_static && i.simple_name() == Some(name))
        {
            return Some(import.path.clone());
        }

        // Same package
        let same_package = match &unit.package {
            Some(pkg) => format!("{}.{}", pkg, name),
            None => name.to_string(),
        };
        if self.type_by_fqn(&same_package).is_some() {
            return Some(same_package);
        }

        // On-demand imports
        for import in unit.imports.iter().filter(|i| i.is_wildcard && !i.is_static) {
            let candidate = format!("{}.{}", import.path, name);
            if self.type_by_fqn(&candidate).is_some() {
                return Some(candidate);
            }
        }

        let java_lang = format!("java.lang.{}", name);
        if self.type_by_fqn(&java_lang).is_some() || JAVA_LANG_TYPES.contains(&name) {
            return Some(java_lang);
        }

        None
    }

    /// Resolved parameter types of a method, in its own scope
    pub fn parameter_types(&self, method: &super::MethodDecl) -> Vec<JavaType> {
        let scope = self.method_scope(method);
        method
            .params
            .iter()
            .map(|p| {
                let ty = self.resolve_type(scope, &p.ty);
                if p.is_varargs {
                    JavaType::Array(Box::new(ty))
                } else {
                    ty
                }
            })
            .collect()
    }

    pub fn return_type(&self, method: &super::MethodDecl) -> JavaType {
        self.resolve_type(self.method_scope(method), &method.return_type)
    }

    pub fn thrown_types(&self, method: &super::MethodDecl) -> Vec<JavaType> {
        let scope = self.method_scope(method);
        method
            .throws
            .iter()
            .map(|t| self.resolve_type(scope, t))
            .collect()
    }

    pub fn method_scope(&self, method: &super::MethodDecl) -> TypeScope {
        TypeScope::of_method(method.id.file, method.owner, method.id)
    }
}
