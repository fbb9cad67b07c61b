use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::PathBuf;

/// Index of a parsed source unit inside a [`Project`](super::Project)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileId(pub usize);

impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unique identifier for a declaration
///
/// A declaration is identified by the file it lives in and the byte range of
/// its syntax node, so ids are stable across repeated runs over the same input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DeclarationId {
    /// File the declaration lives in
    pub file: FileId,
    /// Starting byte offset in file
    pub start: usize,
    /// Ending byte offset in file
    pub end: usize,
}

impl DeclarationId {
    pub fn new(file: FileId, start: usize, end: usize) -> Self {
        Self { file, start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl std::fmt::Display for DeclarationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.start, self.end)
    }
}

/// Where a source unit comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceOrigin {
    /// Part of the analyzed project; inspected
    Project,
    /// Attached library sources; used for resolution and navigation only
    LibrarySource,
    /// Signature-only view of a library class (bodies are dropped)
    Compiled,
}

impl SourceOrigin {
    pub fn is_library(&self) -> bool {
        !matches!(self, SourceOrigin::Project)
    }
}

/// Kind of type declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Record,
    Annotation,
    Anonymous,
}

impl TypeKind {
    pub fn is_interface(&self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::Annotation)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Record => "record",
            TypeKind::Annotation => "annotation",
            TypeKind::Anonymous => "anonymous class",
        }
    }
}

/// Visibility modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Visibility {
    Private,
    #[default]
    PackagePrivate,
    Protected,
    Public,
}

impl Visibility {
    pub fn from_java_modifiers(modifiers: &[String]) -> Self {
        if modifiers.iter().any(|m| m == "private") {
            Visibility::Private
        } else if modifiers.iter().any(|m| m == "protected") {
            Visibility::Protected
        } else if modifiers.iter().any(|m| m == "public") {
            Visibility::Public
        } else {
            Visibility::PackagePrivate // Java default
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::PackagePrivate => "package-private",
            Visibility::Protected => "protected",
            Visibility::Public => "public",
        }
    }
}

/// Location in source code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// File path
    pub file: PathBuf,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Starting byte offset
    pub start_byte: usize,
    /// Ending byte offset
    pub end_byte: usize,
}

impl Location {
    pub fn new(file: PathBuf, line: usize, column: usize, start_byte: usize, end_byte: usize) -> Self {
        Self {
            file,
            line,
            column,
            start_byte,
            end_byte,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// A type as written in source, before name resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeRef {
    Primitive(String),
    Void,
    /// Class, interface or type variable name, possibly dotted
    Named { name: String, args: Vec<TypeRef> },
    Array(Box<TypeRef>),
    Wildcard {
        upper: Option<Box<TypeRef>>,
        lower: Option<Box<TypeRef>>,
    },
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }
}

/// A type declaration (class, interface, enum, record, anonymous class)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDecl {
    pub id: DeclarationId,
    /// Simple name; synthetic for anonymous classes
    pub name: String,
    pub fully_qualified_name: String,
    pub kind: TypeKind,
    pub type_params: Vec<String>,
    /// `extends` clause of a class, or the instantiated type of an anonymous class
    pub super_class: Option<TypeRef>,
    /// `implements` clause of a class, `extends` clause of an interface
    pub interfaces: Vec<TypeRef>,
    pub enclosing: Option<DeclarationId>,
    pub modifiers: Vec<String>,
    /// Syntax node kind, used to re-locate the node in the tree
    pub node_kind: String,
    pub methods: Vec<DeclarationId>,
    pub fields: Vec<DeclarationId>,
    pub location: Location,
}

impl TypeDecl {
    pub fn is_interface(&self) -> bool {
        self.kind.is_interface()
    }

    pub fn is_static(&self) -> bool {
        self.modifiers.iter().any(|m| m == "static")
    }
}

/// A formal parameter of a method
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeRef,
    pub annotations: Vec<String>,
    pub is_varargs: bool,
    /// Byte range of the parameter's type node
    pub type_range: Range<usize>,
}

/// A method declaration; immutable once built
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDecl {
    pub id: DeclarationId,
    pub owner: DeclarationId,
    pub name: String,
    pub type_params: Vec<String>,
    pub params: Vec<Parameter>,
    pub return_type: TypeRef,
    pub throws: Vec<TypeRef>,
    /// Keyword modifiers (`public`, `static`, `default`, ...)
    pub modifiers: Vec<String>,
    /// Annotation texts as written, e.g. `@Override`
    pub annotations: Vec<String>,
    pub doc_comment: Option<String>,
    pub doc_range: Option<Range<usize>>,
    /// Byte range of the `block` body; `None` for abstract, native and compiled methods
    pub body: Option<Range<usize>>,
    pub location: Location,
    /// Location of the name identifier, where findings are attached
    pub name_location: Location,
}

impl MethodDecl {
    pub fn has_modifier(&self, modifier: &str) -> bool {
        self.modifiers.iter().any(|m| m == modifier)
    }

    pub fn is_static(&self) -> bool {
        self.has_modifier("static")
    }

    pub fn is_private(&self) -> bool {
        self.has_modifier("private")
    }

    pub fn is_default(&self) -> bool {
        self.has_modifier("default")
    }

    pub fn is_varargs(&self) -> bool {
        self.params.last().map(|p| p.is_varargs).unwrap_or(false)
    }

    pub fn returns_void(&self) -> bool {
        self.return_type.is_void()
    }

    pub fn range(&self) -> Range<usize> {
        self.id.range()
    }
}

/// A field declaration (one per declarator)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDecl {
    pub id: DeclarationId,
    pub owner: DeclarationId,
    pub name: String,
    pub ty: TypeRef,
    pub modifiers: Vec<String>,
    pub location: Location,
}

impl FieldDecl {
    pub fn is_static(&self) -> bool {
        self.modifiers.iter().any(|m| m == "static")
    }
}

/// An import statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub path: String,
    pub is_static: bool,
    pub is_wildcard: bool,
}

impl Import {
    /// Last segment of a single-type import
    pub fn simple_name(&self) -> Option<&str> {
        if self.is_wildcard {
            return None;
        }
        self.path.rsplit('.').next()
    }
}
