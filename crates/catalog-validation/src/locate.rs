//! Resolving catalog paths inside a message document.
//!
//! Paths are relative to the document root element and may use either
//! separator. A final `@name` segment addresses an attribute of the
//! element reached by the preceding segments.

use catalog_model::path_segments;
use catalog_schema::XmlNode;

/// Prefix marking an attribute segment
pub const ATTRIBUTE_PREFIX: char = '@';

/// An element instance and the indexed path that reached it
#[derive(Debug, Clone)]
pub struct Located<'d> {
    pub node: &'d XmlNode,
    /// Instance path, with `[n]` (1-based) after segments that repeat
    pub path: String,
}

/// A leaf value found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedValue<'d> {
    pub path: String,
    pub value: &'d str,
}

/// Every element instance reached by `path`; an empty path yields the root
pub fn find_elements<'d>(root: &'d XmlNode, path: &str) -> Vec<Located<'d>> {
    let mut current = vec![Located {
        node: root,
        path: String::new(),
    }];

    for segment in path_segments(path) {
        let mut next = Vec::new();
        for located in &current {
            let matching: Vec<&XmlNode> = located.node.children_named(segment).collect();
            let repeated = matching.len() > 1;
            for (index, child) in matching.into_iter().enumerate() {
                let step = if repeated {
                    format!("{segment}[{}]", index + 1)
                } else {
                    segment.to_string()
                };
                next.push(Located {
                    node: child,
                    path: join(&located.path, &step),
                });
            }
        }
        if next.is_empty() {
            return next;
        }
        current = next;
    }

    current
}

/// Whether `leaf` (an element name or `@attribute`) exists directly under `parent`
pub fn has_member(parent: &XmlNode, leaf: &str) -> bool {
    match leaf.strip_prefix(ATTRIBUTE_PREFIX) {
        Some(attribute) => parent.attr(attribute).is_some(),
        None => parent.child(leaf).is_some(),
    }
}

/// Non-empty text values at `path`: attribute values, or the text of leaf elements
pub fn find_values<'d>(root: &'d XmlNode, path: &str) -> Vec<LocatedValue<'d>> {
    let segments: Vec<&str> = path_segments(path).collect();
    let Some((last, parents)) = segments.split_last() else {
        return Vec::new();
    };

    if let Some(attribute) = last.strip_prefix(ATTRIBUTE_PREFIX) {
        return find_elements(root, &parents.join("/"))
            .into_iter()
            .filter_map(|located| {
                located.node.attr(attribute).map(|value| LocatedValue {
                    path: join(&located.path, last),
                    value,
                })
            })
            .collect();
    }

    find_elements(root, path)
        .into_iter()
        .filter(|located| located.node.children.is_empty() && !located.node.text.is_empty())
        .map(|located| LocatedValue {
            path: located.path,
            value: located.node.text.as_str(),
        })
        .collect()
}

fn join(parent: &str, step: &str) -> String {
    if parent.is_empty() {
        step.to_string()
    } else {
        format!("{parent}/{step}")
    }
}
