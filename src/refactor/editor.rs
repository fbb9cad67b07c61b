use super::TextEdit;
use miette::{miette, Result};

/// Apply edits to a source text, back to front
///
/// Edits must lie on character boundaries and must not overlap.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> Result<String> {
    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by_key(|e| (e.range.start, e.range.end));

    for pair in ordered.windows(2) {
        if pair[0].range.end > pair[1].range.start {
            return Err(miette!(
                "Overlapping edits at bytes {:?} and {:?}",
                pair[0].range,
                pair[1].range
            ));
        }
    }

    let mut result = source.to_string();
    for edit in ordered.iter().rev() {
        let range = edit.range.clone();
        if range.start > range.end
            || range.end > result.len()
            || !result.is_char_boundary(range.start)
            || !result.is_char_boundary(range.end)
        {
            return Err(miette!("Invalid byte range {:?}", range));
        }
        result.replace_range(range, &edit.replacement);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileId;
    use std::path::PathBuf;

    fn edit(start: usize, end: usize, replacement: &str) -> TextEdit {
        TextEdit {
            file: FileId(0),
            path: PathBuf::from("A.java"),
            range: start..end,
            replacement: replacement.to_string(),
        }
    }

    #[test]
    fn test_apply_edits_in_any_order() {
        let source = "Hello, World!";
        let edits = [edit(7, 12, "Rust"), edit(0, 5, "Goodbye")];
        assert_eq!(apply_edits(source, &edits).unwrap(), "Goodbye, Rust!");
    }

    #[test]
    fn test_overlapping_edits_are_rejected() {
        let edits = [edit(0, 5, "a"), edit(3, 8, "b")];
        assert!(apply_edits("Hello, World!", &edits).is_err());
    }

    #[test]
    fn test_out_of_range() {
        assert!(apply_edits("short", &[edit(2, 10, "")]).is_err());
    }
}
