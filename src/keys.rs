//! Candidate source keys for a field.
//!
//! Each link of a field's lineage contributes one or more alternative names
//! for a namespace: the annotation for that namespace (comma separated
//! alternatives), or the structural field name when there is none. Embedded
//! links contribute nothing. The candidates are every combination of the
//! alternatives, joined with `.`, leftmost link varying slowest.

use crate::configurable::FieldDescriptor;
use crate::walker::FieldNode;

/// Key used when every link of the lineage was flattened away.
pub const ROOT_KEY: &str = "config";

const SEPARATOR: &str = ".";

/// Candidate keys for `node` under `namespace`, in lookup order.
///
/// An empty result means the field must not be looked up in this
/// namespace: it is opted out with `-`, or it lacks an annotation while
/// `ignore_missing_tag` is set. An empty `namespace` asks for structural
/// names only.
pub fn build_keys(namespace: &str, node: &FieldNode<'_, '_>, ignore_missing_tag: bool) -> Vec<String> {
    build_keys_for(namespace, &node.lineage(), ignore_missing_tag)
}

pub fn build_keys_for(
    namespace: &str,
    lineage: &[FieldDescriptor],
    ignore_missing_tag: bool,
) -> Vec<String> {
    let mut segments = Vec::with_capacity(lineage.len());
    for field in lineage {
        match link_names(namespace, field, ignore_missing_tag) {
            None => return Vec::new(),
            Some(names) if names.is_empty() => {}
            Some(names) => segments.push(names),
        }
    }
    if segments.is_empty() {
        return vec![ROOT_KEY.to_string()];
    }
    join_permutations(&segments)
}

/// Names a single link contributes, `None` when the whole field fails.
fn link_names(
    namespace: &str,
    field: &FieldDescriptor,
    ignore_missing_tag: bool,
) -> Option<Vec<&'static str>> {
    if namespace.is_empty() {
        return Some(vec![field.name]);
    }
    match field.tag(namespace) {
        Some("-") => None,
        Some(tag) if !tag.is_empty() => Some(
            tag.split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .collect(),
        ),
        _ if ignore_missing_tag => None,
        _ if field.is_embedded() => Some(Vec::new()),
        _ => Some(vec![field.name]),
    }
}

fn join_permutations(segments: &[Vec<&str>]) -> Vec<String> {
    segments.iter().fold(vec![String::new()], |prefixes, names| {
        prefixes
            .iter()
            .flat_map(|prefix| {
                names.iter().map(move |name| {
                    if prefix.is_empty() {
                        (*name).to_string()
                    } else {
                        format!("{prefix}{SEPARATOR}{name}")
                    }
                })
            })
            .collect()
    })
}
