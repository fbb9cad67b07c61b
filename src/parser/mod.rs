mod common;
mod java;

pub use common::{
    all_children, children_of_kind, code_children, descendants, is_comment, is_doc_comment, node_text,
    normalize_whitespace, point_to_location, strip_parens, ParsedUnit, Parser,
};
pub use java::{type_ref, JavaParser};
