//! Project context: the read-only model every inspection queries
//!
//! A [`Project`] owns the parsed syntax trees of all project, library-source
//! and compiled units, plus the declaration tables, the inheritance graph and
//! a cancellation flag. It is built once by [`ProjectBuilder`] and passed
//! explicitly to every check; nothing in it changes after construction.

mod builder;
mod declaration;
mod hierarchy;
pub mod library;
pub mod resolve;
pub mod types;

pub use builder::ProjectBuilder;
pub use declaration::{
    DeclarationId, FieldDecl, FileId, Import, Location, MethodDecl, Parameter, SourceOrigin,
    TypeDecl, TypeKind, TypeRef, Visibility,
};
pub use hierarchy::{Hierarchy, SuperKind, SuperRef};
pub use resolve::{Resolver, Symbol};
pub use types::{JavaType, Substitutor, TypeScope};

use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tree_sitter::{Node, Tree};

/// A parsed source file
pub struct SourceUnit {
    pub id: FileId,
    pub path: PathBuf,
    pub source: String,
    pub tree: Tree,
    pub origin: SourceOrigin,
    pub package: Option<String>,
    pub imports: Vec<Import>,
}

impl SourceUnit {
    pub fn text(&self, range: &Range<usize>) -> &str {
        &self.source[range.start..range.end]
    }
}

impl std::fmt::Debug for SourceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceUnit")
            .field("id", &self.id)
            .field("path", &self.path)
            .field("origin", &self.origin)
            .field("package", &self.package)
            .finish()
    }
}

/// Shared flag that aborts in-flight searches
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The project context
#[derive(Debug)]
pub struct Project {
    files: Vec<SourceUnit>,

    /// Declarations in source order
    types: Vec<TypeDecl>,
    methods: Vec<MethodDecl>,
    fields: Vec<FieldDecl>,

    type_index: HashMap<DeclarationId, usize>,
    method_index: HashMap<DeclarationId, usize>,
    field_index: HashMap<DeclarationId, usize>,

    /// Fully qualified name to declarations, best candidate first
    fqn_index: HashMap<String, Vec<DeclarationId>>,

    /// Enclosing type to member types
    member_index: HashMap<DeclarationId, Vec<DeclarationId>>,

    hierarchy: Hierarchy,
    cancellation: CancellationFlag,
}

impl Project {
    pub(crate) fn from_parts(
        files: Vec<SourceUnit>,
        types: Vec<TypeDecl>,
        methods: Vec<MethodDecl>,
        fields: Vec<FieldDecl>,
    ) -> Self {
        let type_index = types.iter().enumerate().map(|(i, t)| (t.id, i)).collect();
        let method_index = methods.iter().enumerate().map(|(i, m)| (m.id, i)).collect();
        let field_index = fields.iter().enumerate().map(|(i, f)| (f.id, i)).collect();

        let mut fqn_index: HashMap<String, Vec<DeclarationId>> = HashMap::new();
        let mut member_index: HashMap<DeclarationId, Vec<DeclarationId>> = HashMap::new();
        for decl in &types {
            fqn_index
                .entry(decl.fully_qualified_name.clone())
                .or_default()
                .push(decl.id);
            if let Some(parent) = decl.enclosing {
                member_index.entry(parent).or_default().push(decl.id);
            }
        }

        // Resolution prefers what the compiler would see: project sources,
        // then compiled classes, then attached library sources.
        for candidates in fqn_index.values_mut() {
            candidates.sort_by_key(|id| (origin_rank(files[id.file.0].origin), *id));
        }

        let mut project = Self {
            files,
            types,
            methods,
            fields,
            type_index,
            method_index,
            field_index,
            fqn_index,
            member_index,
            hierarchy: Hierarchy::default(),
            cancellation: CancellationFlag::new(),
        };

        project.hierarchy = Hierarchy::build(&project);
        project
    }

    pub fn files(&self) -> &[SourceUnit] {
        &self.files
    }

    pub fn file(&self, id: FileId) -> Option<&SourceUnit> {
        self.files.get(id.0)
    }

    pub fn file_by_path(&self, path: &Path) -> Option<&SourceUnit> {
        self.files.iter().find(|f| f.path == path)
    }

    pub fn origin(&self, id: &DeclarationId) -> SourceOrigin {
        self.file(id.file)
            .map(|f| f.origin)
            .unwrap_or(SourceOrigin::Compiled)
    }

    pub fn package_of(&self, file: FileId) -> Option<&str> {
        self.file(file).and_then(|f| f.package.as_deref())
    }

    pub fn types(&self) -> &[TypeDecl] {
        &self.types
    }

    pub fn methods(&self) -> &[MethodDecl] {
        &self.methods
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }

    /// Methods declared in project sources, in source order
    pub fn project_methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.methods
            .iter()
            .filter(|m| self.origin(&m.id) == SourceOrigin::Project)
    }

    pub fn type_decl(&self, id: &DeclarationId) -> Option<&TypeDecl> {
        self.type_index.get(id).map(|&i| &self.types[i])
    }

    pub fn method(&self, id: &DeclarationId) -> Option<&MethodDecl> {
        self.method_index.get(id).map(|&i| &self.methods[i])
    }

    pub fn field(&self, id: &DeclarationId) -> Option<&FieldDecl> {
        self.field_index.get(id).map(|&i| &self.fields[i])
    }

    pub fn type_by_fqn(&self, fqn: &str) -> Option<&TypeDecl> {
        self.fqn_index
            .get(fqn)
            .and_then(|ids| ids.first())
            .and_then(|id| self.type_decl(id))
    }

    /// All declarations sharing a fully qualified name, best candidate first
    pub fn types_by_fqn(&self, fqn: &str) -> impl Iterator<Item = &TypeDecl> {
        self.fqn_index
            .get(fqn)
            .into_iter()
            .flatten()
            .filter_map(|id| self.type_decl(id))
    }

    pub fn types_in_file(&self, file: FileId) -> impl Iterator<Item = &TypeDecl> {
        self.types.iter().filter(move |t| t.id.file == file)
    }

    pub fn member_types(&self, id: &DeclarationId) -> impl Iterator<Item = &TypeDecl> {
        self.member_index
            .get(id)
            .into_iter()
            .flatten()
            .filter_map(|m| self.type_decl(m))
    }

    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    pub fn cancellation(&self) -> &CancellationFlag {
        &self.cancellation
    }

    /// Effective visibility; interface members without `private` are public
    pub fn visibility(&self, method: &MethodDecl) -> Visibility {
        let declared = Visibility::from_java_modifiers(&method.modifiers);
        match self.type_decl(&method.owner) {
            Some(owner) if owner.is_interface() && declared != Visibility::Private => Visibility::Public,
            _ => declared,
        }
    }

    /// Whether the method is abstract, explicitly or implicitly
    pub fn is_abstract(&self, method: &MethodDecl) -> bool {
        if method.has_modifier("abstract") {
            return true;
        }
        let in_interface = self
            .type_decl(&method.owner)
            .map(|t| t.is_interface())
            .unwrap_or(false);
        in_interface && !method.is_default() && !method.is_static() && !method.is_private()
    }

    pub fn text(&self, file: FileId, range: &Range<usize>) -> Option<&str> {
        let unit = self.file(file)?;
        unit.source.get(range.start..range.end)
    }

    /// Re-locate a syntax node from its byte range and kind
    pub fn node_at(&self, file: FileId, range: &Range<usize>, kind: &str) -> Option<Node<'_>> {
        let unit = self.file(file)?;
        let mut node = unit
            .tree
            .root_node()
            .descendant_for_byte_range(range.start, range.end)?;
        loop {
            if node.kind() == kind && node.start_byte() == range.start && node.end_byte() == range.end {
                return Some(node);
            }
            node = node.parent()?;
        }
    }

    pub fn method_node(&self, method: &MethodDecl) -> Option<Node<'_>> {
        self.node_at(method.id.file, &method.range(), "method_declaration")
    }

    pub fn body_node(&self, method: &MethodDecl) -> Option<Node<'_>> {
        let body = method.body.as_ref()?;
        self.node_at(method.id.file, body, "block")
    }

    pub fn type_node(&self, decl: &TypeDecl) -> Option<Node<'_>> {
        self.node_at(decl.id.file, &decl.id.range(), &decl.node_kind)
    }
}

fn origin_rank(origin: SourceOrigin) -> u8 {
    match origin {
        SourceOrigin::Project => 0,
        SourceOrigin::Compiled => 1,
        SourceOrigin::LibrarySource => 2,
    }
}
