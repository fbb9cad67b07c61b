//! Inheritance graph, member lookup and override resolution

use super::types::{JavaType, Substitutor, TypeScope, JAVA_LANG_OBJECT};
use super::{DeclarationId, FieldDecl, MethodDecl, Project, SourceOrigin, TypeKind, Visibility};
use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::trace;

/// How a type refers to one of its direct super types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SuperKind {
    SuperClass,
    SuperInterface,
}

/// A direct super type reference, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuperRef {
    /// The super type in terms of the subtype's type variables
    pub ty: JavaType,
    /// The declaration, when the super type is known to the project
    pub decl: Option<DeclarationId>,
    pub kind: SuperKind,
}

/// Directed inheritance graph: edges point from a type to its direct super types
#[derive(Debug, Default)]
pub struct Hierarchy {
    graph: DiGraph<DeclarationId, SuperKind>,
    node_map: HashMap<DeclarationId, NodeIndex>,
    direct: HashMap<DeclarationId, Vec<SuperRef>>,
}

impl Hierarchy {
    pub(crate) fn build(project: &Project) -> Self {
        let mut hierarchy = Hierarchy::default();

        for decl in project.types() {
            let idx = hierarchy.graph.add_node(decl.id);
            hierarchy.node_map.insert(decl.id, idx);
        }

        let object = project.type_by_fqn(JAVA_LANG_OBJECT).map(|t| t.id);

        for decl in project.types() {
            let scope = TypeScope::of_type(decl.id.file, decl.id);
            let mut supers = Vec::new();

            if let Some(super_class) = &decl.super_class {
                let ty = project.resolve_type(scope, super_class);
                let target = ty.fqn().and_then(|fqn| project.type_by_fqn(fqn));
                let kind = match target {
                    Some(t) if t.is_interface() => SuperKind::SuperInterface,
                    _ => SuperKind::SuperClass,
                };
                supers.push(SuperRef {
                    ty,
                    decl: target.map(|t| t.id),
                    kind,
                });
            }

            let has_super_class = supers.iter().any(|s| s.kind == SuperKind::SuperClass);
            if !decl.is_interface() && !has_super_class && decl.fully_qualified_name != JAVA_LANG_OBJECT {
                supers.insert(
                    0,
                    SuperRef {
                        ty: JavaType::object(),
                        decl: object,
                        kind: SuperKind::SuperClass,
                    },
                );
            }

            for interface in &decl.interfaces {
                let ty = project.resolve_type(scope, interface);
                let target = ty.fqn().and_then(|fqn| project.type_by_fqn(fqn)).map(|t| t.id);
                supers.push(SuperRef {
                    ty,
                    decl: target,
                    kind: SuperKind::SuperInterface,
                });
            }

            for super_ref in &supers {
                if let Some(target) = super_ref.decl {
                    if let (Some(&from), Some(&to)) =
                        (hierarchy.node_map.get(&decl.id), hierarchy.node_map.get(&target))
                    {
                        hierarchy.graph.add_edge(from, to, super_ref.kind);
                    }
                }
            }

            trace!("{} has {} direct super types", decl.fully_qualified_name, supers.len());
            hierarchy.direct.insert(decl.id, supers);
        }

        hierarchy
    }

    /// Direct super types in declaration order, super class first
    pub fn supers(&self, id: &DeclarationId) -> &[SuperRef] {
        self.direct.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn super_class(&self, id: &DeclarationId) -> Option<&SuperRef> {
        self.supers(id).iter().find(|s| s.kind == SuperKind::SuperClass)
    }

    /// Whether `sub` inherits from `sup`, directly or transitively
    pub fn is_inheritor(&self, sub: &DeclarationId, sup: &DeclarationId) -> bool {
        if sub == sup {
            return false;
        }
        match (self.node_map.get(sub), self.node_map.get(sup)) {
            (Some(&from), Some(&to)) => has_path_connecting(&self.graph, from, to, None),
            _ => false,
        }
    }

    /// Types that directly extend or implement `id`
    pub fn direct_inheritors(&self, id: &DeclarationId) -> Vec<DeclarationId> {
        let Some(&idx) = self.node_map.get(id) else {
            return Vec::new();
        };
        let mut inheritors: Vec<DeclarationId> = self
            .graph
            .neighbors_directed(idx, petgraph::Direction::Incoming)
            .filter_map(|n| self.graph.node_weight(n).copied())
            .collect();
        inheritors.sort();
        inheritors
    }

    /// Member lookup order: the type, its super class chain, then interfaces breadth-first
    pub fn lookup_order(&self, id: &DeclarationId) -> Vec<DeclarationId> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();

        let mut current = Some(*id);
        while let Some(ty) = current {
            if !seen.insert(ty) {
                break;
            }
            order.push(ty);
            current = self.super_class(&ty).and_then(|s| s.decl);
        }

        let mut queue: VecDeque<DeclarationId> = order.iter().copied().collect();
        while let Some(ty) = queue.pop_front() {
            for super_ref in self.supers(&ty) {
                if super_ref.kind != SuperKind::SuperInterface {
                    continue;
                }
                if let Some(target) = super_ref.decl {
                    if seen.insert(target) {
                        order.push(target);
                        queue.push_back(target);
                    }
                }
            }
        }

        order
    }
}

impl Project {
    /// Substitutor expressing `sup`'s type variables in `sub`'s terms
    ///
    /// Returns `None` when `sub` does not inherit from `sup`. A raw
    /// inheritance step erases the type variables to `java.lang.Object`.
    pub fn super_class_substitutor(&self, sup: &DeclarationId, sub: &DeclarationId) -> Option<Substitutor> {
        let mut visited = HashSet::new();
        self.substitutor_path(sup, sub, &mut visited)
    }

    fn substitutor_path(
        &self,
        sup: &DeclarationId,
        current: &DeclarationId,
        visited: &mut HashSet<DeclarationId>,
    ) -> Option<Substitutor> {
        if sup == current {
            return Some(Substitutor::identity());
        }
        if !visited.insert(*current) {
            return None;
        }

        for super_ref in self.hierarchy().supers(current) {
            let Some(next) = super_ref.decl else {
                continue;
            };
            let Some(inner) = self.substitutor_path(sup, &next, visited) else {
                continue;
            };

            let step = self.direct_substitutor(&next, &super_ref.ty);
            let sup_decl = self.type_decl(sup)?;
            let mut composed = Substitutor::identity();
            for param in &sup_decl.type_params {
                let in_next = inner.get(param, sup).cloned().unwrap_or(JavaType::TypeVar {
                    name: param.clone(),
                    owner: *sup,
                });
                composed.put(param, *sup, step.substitute(&in_next));
            }
            return Some(composed);
        }

        None
    }

    /// Maps the type parameters of `decl` to the arguments of `ty`
    fn direct_substitutor(&self, decl: &DeclarationId, ty: &JavaType) -> Substitutor {
        let mut subst = Substitutor::identity();
        let Some(type_decl) = self.type_decl(decl) else {
            return subst;
        };
        let args: &[JavaType] = match ty {
            JavaType::Class { args, .. } => args,
            _ => &[],
        };

        for (i, param) in type_decl.type_params.iter().enumerate() {
            let value = if args.len() == type_decl.type_params.len() {
                args[i].clone()
            } else {
                JavaType::object() // raw type
            };
            subst.put(param, *decl, value);
        }
        subst
    }

    /// Methods `method` overrides: the nearest declaration on each inheritance
    /// branch, superclass branch first, with diamond duplicates removed
    pub fn find_super_methods(&self, method: &MethodDecl) -> Vec<&MethodDecl> {
        if method.is_static() || method.is_private() {
            return Vec::new();
        }
        if self.type_decl(&method.owner).is_none() {
            return Vec::new();
        }

        let erasures: Vec<JavaType> = self
            .parameter_types(method)
            .iter()
            .map(|t| t.erasure())
            .collect();

        let mut found = Vec::new();
        let mut visited = HashSet::new();
        visited.insert(method.owner);

        for super_ref in self.hierarchy().supers(&method.owner) {
            if let Some(next) = super_ref.decl {
                self.collect_super_methods(method, &erasures, &next, &mut visited, &mut found);
            }
        }

        let mut seen = HashSet::new();
        found.retain(|m: &&MethodDecl| seen.insert(m.id));
        found
    }

    fn collect_super_methods<'a>(
        &'a self,
        method: &MethodDecl,
        erasures: &[JavaType],
        current: &DeclarationId,
        visited: &mut HashSet<DeclarationId>,
        found: &mut Vec<&'a MethodDecl>,
    ) {
        if !visited.insert(*current) {
            return;
        }
        let Some(decl) = self.type_decl(current) else {
            return;
        };

        let subst = self
            .super_class_substitutor(current, &method.owner)
            .unwrap_or_default();

        for candidate_id in &decl.methods {
            let Some(candidate) = self.method(candidate_id) else {
                continue;
            };
            if self.is_overridden_by(candidate, method, &subst, erasures) {
                found.push(candidate);
                return;
            }
        }

        for super_ref in self.hierarchy().supers(current) {
            if let Some(next) = super_ref.decl {
                self.collect_super_methods(method, erasures, &next, visited, found);
            }
        }
    }

    fn is_overridden_by(
        &self,
        candidate: &MethodDecl,
        method: &MethodDecl,
        subst: &Substitutor,
        erasures: &[JavaType],
    ) -> bool {
        if candidate.name != method.name
            || candidate.params.len() != method.params.len()
            || candidate.is_static()
            || candidate.is_private()
        {
            return false;
        }

        // Package-private methods are only overridden from the same package
        if self.visibility(candidate) == Visibility::PackagePrivate
            && self.package_of(candidate.id.file) != self.package_of(method.id.file)
        {
            return false;
        }

        self.parameter_types(candidate)
            .iter()
            .zip(erasures)
            .all(|(ty, erased)| subst.substitute(ty).erasure() == *erased)
    }

    /// The super method the checks compare against: the first class
    /// (non-interface) method, otherwise the first one in the list
    pub fn representative_super_method<'a>(&self, supers: &[&'a MethodDecl]) -> Option<&'a MethodDecl> {
        supers
            .iter()
            .find(|m| {
                self.type_decl(&m.owner)
                    .map(|t| !t.is_interface())
                    .unwrap_or(false)
            })
            .or_else(|| supers.first())
            .copied()
    }

    /// Candidate methods for a call by name and arity, from the nearest type that declares any
    pub fn find_methods(&self, ty: &DeclarationId, name: &str, arity: usize) -> Vec<&MethodDecl> {
        for current in self.hierarchy().lookup_order(ty) {
            let Some(decl) = self.type_decl(&current) else {
                continue;
            };
            let candidates: Vec<&MethodDecl> = decl
                .methods
                .iter()
                .filter_map(|id| self.method(id))
                .filter(|m| m.name == name && accepts_arity(m, arity))
                .collect();
            if !candidates.is_empty() {
                return candidates;
            }
        }
        Vec::new()
    }

    pub fn find_method(&self, ty: &DeclarationId, name: &str, arity: usize) -> Option<&MethodDecl> {
        self.find_methods(ty, name, arity).into_iter().next()
    }

    pub fn find_field(&self, ty: &DeclarationId, name: &str) -> Option<&FieldDecl> {
        self.hierarchy()
            .lookup_order(ty)
            .into_iter()
            .filter_map(|t| self.type_decl(&t))
            .flat_map(|t| t.fields.iter())
            .filter_map(|id| self.field(id))
            .find(|f| f.name == name)
    }

    pub fn is_same_or_inheritor(&self, sub: &DeclarationId, sup: &DeclarationId) -> bool {
        sub == sup || self.hierarchy().is_inheritor(sub, sup)
    }

    /// "Navigate to source": map a compiled member to its attached library source
    pub fn navigation_element(&self, id: &DeclarationId) -> DeclarationId {
        if self.origin(id) != SourceOrigin::Compiled {
            return *id;
        }

        if let Some(method) = self.method(id) {
            let Some(owner) = self.type_decl(&method.owner) else {
                return *id;
            };
            let erasures: Vec<JavaType> = self.parameter_types(method).iter().map(|t| t.erasure()).collect();
            for source_type in self
                .types_by_fqn(&owner.fully_qualified_name)
                .filter(|t| self.origin(&t.id) == SourceOrigin::LibrarySource)
            {
                for candidate in source_type.methods.iter().filter_map(|m| self.method(m)) {
                    if candidate.name == method.name
                        && candidate.params.len() == method.params.len()
                        && self
                            .parameter_types(candidate)
                            .iter()
                            .map(|t| t.erasure())
                            .eq(erasures.iter().cloned())
                    {
                        return candidate.id;
                    }
                }
            }
        } else if let Some(field) = self.field(id) {
            let Some(owner) = self.type_decl(&field.owner) else {
                return *id;
            };
            for source_type in self
                .types_by_fqn(&owner.fully_qualified_name)
                .filter(|t| self.origin(&t.id) == SourceOrigin::LibrarySource)
            {
                if let Some(candidate) = source_type
                    .fields
                    .iter()
                    .filter_map(|f| self.field(f))
                    .find(|f| f.name == field.name)
                {
                    return candidate.id;
                }
            }
        }

        *id
    }

    /// The declaration whose body stands for `method`, after navigating to source
    pub fn source_method(&self, method: &MethodDecl) -> Option<&MethodDecl> {
        let target = self.navigation_element(&method.id);
        self.method(&target)
    }

    /// Body of the method's source declaration; `None` when it cannot be recovered
    pub fn method_body(&self, method: &MethodDecl) -> Option<tree_sitter::Node<'_>> {
        let source = self.source_method(method)?;
        self.body_node(source)
    }

    pub fn is_anonymous(&self, ty: &DeclarationId) -> bool {
        self.type_decl(ty)
            .map(|t| t.kind == TypeKind::Anonymous)
            .unwrap_or(false)
    }
}

fn accepts_arity(method: &MethodDecl, arity: usize) -> bool {
    if method.is_varargs() {
        arity + 1 >= method.params.len()
    } else {
        method.params.len() == arity
    }
}
