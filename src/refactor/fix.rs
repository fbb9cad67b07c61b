//! Quick fixes as edit scripts
//!
//! Computing the edits for a finding never touches the file system; the
//! edits are applied separately by [`apply_edits`](super::apply_edits) or
//! [`FixApplier`](super::FixApplier).

use crate::analysis::{Finding, QuickFix};
use crate::model::{FileId, JavaType, MethodDecl, Project, SourceUnit, SuperKind};
use miette::{miette, Result};
use std::ops::Range;
use std::path::PathBuf;

/// Replacement of a byte range in one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub file: FileId,
    pub path: PathBuf,
    pub range: Range<usize>,
    pub replacement: String,
}

impl TextEdit {
    fn replace(unit: &SourceUnit, range: Range<usize>, replacement: impl Into<String>) -> Self {
        Self {
            file: unit.id,
            path: unit.path.clone(),
            range,
            replacement: replacement.into(),
        }
    }

    fn delete(unit: &SourceUnit, range: Range<usize>) -> Self {
        Self::replace(unit, range, "")
    }
}

impl QuickFix {
    /// The edits carrying out this fix for `finding`
    pub fn edits(&self, project: &Project, finding: &Finding) -> Result<Vec<TextEdit>> {
        let method = project
            .method(&finding.method)
            .ok_or_else(|| miette!("Method '{}' is no longer part of the project", finding.method_name))?;
        let unit = project
            .file(method.id.file)
            .ok_or_else(|| miette!("No source file for '{}'", finding.method_name))?;

        match self {
            QuickFix::DeleteOverride => Ok(vec![deletion(project, unit, method)?]),
            QuickFix::ReplaceWithSuperDelegation => {
                let super_method = project
                    .method(&finding.super_method)
                    .ok_or_else(|| miette!("Super method of '{}' is not available", finding.method_name))?;
                delegation(project, unit, method, super_method)
            }
        }
    }
}

/// Remove the method with its doc comment and the lines it occupied
fn deletion(project: &Project, unit: &SourceUnit, method: &MethodDecl) -> Result<TextEdit> {
    let node = project
        .method_node(method)
        .ok_or_else(|| miette!("Cannot locate '{}' in {}", method.name, unit.path.display()))?;
    let start = method
        .doc_range
        .as_ref()
        .map(|d| d.start)
        .unwrap_or_else(|| node.start_byte());

    // Last member of the body: leave `{}`
    if let Some(body) = node.parent().filter(|p| matches!(p.kind(), "class_body" | "interface_body")) {
        let mut cursor = body.walk();
        let only_member = body
            .named_children(&mut cursor)
            .all(|child| child.id() == node.id() || child.start_byte() == start);
        if only_member {
            return Ok(TextEdit::replace(unit, body.start_byte()..body.end_byte(), "{}"));
        }
    }

    Ok(TextEdit::delete(unit, line_range(&unit.source, start, node.end_byte())))
}

/// Grow `start..end` to whole lines when nothing else shares them
fn line_range(source: &str, start: usize, end: usize) -> Range<usize> {
    let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line_end = source[end..].find('\n').map(|i| end + i + 1).unwrap_or(source.len());

    let alone = source[line_start..start].trim().is_empty() && source[end..line_end].trim().is_empty();
    if !alone {
        let trimmed = source[..start].trim_end_matches([' ', '\t']).len();
        return trimmed..end;
    }

    // Drop one blank separator so no double blank line is left behind
    let next_end = source[line_end..]
        .find('\n')
        .map(|i| line_end + i + 1)
        .unwrap_or(line_end);
    let next_blank = next_end > line_end && source[line_end..next_end].trim().is_empty();
    let previous = source[..line_start.saturating_sub(1)]
        .rsplit('\n')
        .next()
        .unwrap_or("")
        .trim();
    if next_blank && (previous.is_empty() || previous.ends_with('{')) {
        return line_start..next_end;
    }

    line_start..line_end
}

/// Rewrite the body to an explicit super call
fn delegation(project: &Project, unit: &SourceUnit, method: &MethodDecl, super_method: &MethodDecl) -> Result<Vec<TextEdit>> {
    let body = method
        .body
        .clone()
        .ok_or_else(|| miette!("Method '{}' has no body", method.name))?;

    let args: Vec<&str> = method.params.iter().map(|p| p.name.as_str()).collect();
    let call = format!(
        "{}{}.{}({});",
        if method.returns_void() { "" } else { "return " },
        super_qualifier(project, method, super_method),
        method.name,
        args.join(", ")
    );

    let multiline = unit.text(&body).contains('\n');
    let replacement = if multiline {
        let indent = line_indent(&unit.source, method.id.start);
        format!("{{\n{indent}    {call}\n{indent}}}")
    } else {
        format!("{{ {} }}", call)
    };

    let mut edits = vec![TextEdit::replace(unit, body, replacement)];
    edits.extend(parameter_type_edits(project, unit, method, super_method));
    Ok(edits)
}

/// `super`, or `Iface.super` naming the direct super interface that leads to
/// the method. A super class reaching it first keeps the plain `super`.
fn super_qualifier(project: &Project, method: &MethodDecl, super_method: &MethodDecl) -> String {
    let Some(owner) = project.type_decl(&super_method.owner) else {
        return "super".to_string();
    };
    if !owner.is_interface() {
        return "super".to_string();
    }

    let supers = project.hierarchy().supers(&method.owner);
    let through_class = supers.iter().any(|s| {
        s.kind == SuperKind::SuperClass
            && s.decl
                .map(|d| d != owner.id && project.is_same_or_inheritor(&d, &owner.id))
                .unwrap_or(false)
    });
    if through_class {
        return "super".to_string();
    }

    supers
        .iter()
        .filter(|s| s.kind == SuperKind::SuperInterface)
        .filter_map(|s| s.decl)
        .find(|d| project.is_same_or_inheritor(d, &owner.id))
        .and_then(|d| project.type_decl(&d))
        .map(|direct| format!("{}.super", direct.name))
        .unwrap_or_else(|| "super".to_string())
}

/// Parameter types taken from the super method, in the subclass's terms
fn parameter_type_edits(project: &Project, unit: &SourceUnit, method: &MethodDecl, super_method: &MethodDecl) -> Vec<TextEdit> {
    let Some(substitutor) = project.super_class_substitutor(&super_method.owner, &method.owner) else {
        return Vec::new();
    };
    let own = project.parameter_types(method);
    let inherited = project.parameter_types(super_method);

    method
        .params
        .iter()
        .zip(own.iter().zip(&inherited))
        .filter(|(param, _)| !param.is_varargs)
        .filter_map(|(param, (own, inherited))| {
            let expected = substitutor.substitute(inherited);
            (expected != *own && !mentions_type_var(&expected))
                .then(|| TextEdit::replace(unit, param.type_range.clone(), expected.to_source()))
        })
        .collect()
}

fn mentions_type_var(ty: &JavaType) -> bool {
    match ty {
        JavaType::TypeVar { .. } => true,
        JavaType::Class { args, .. } => args.iter().any(mentions_type_var),
        JavaType::Array(inner) => mentions_type_var(inner),
        JavaType::Wildcard { upper, lower } => {
            upper.as_deref().map(mentions_type_var).unwrap_or(false)
                || lower.as_deref().map(mentions_type_var).unwrap_or(false)
        }
        _ => false,
    }
}

fn line_indent(source: &str, offset: usize) -> &str {
    let line_start = source[..offset].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let line = &source[line_start..];
    let width = line.len() - line.trim_start_matches([' ', '\t']).len();
    &line[..width]
}
