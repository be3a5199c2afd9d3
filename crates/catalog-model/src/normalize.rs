//! Normalizers for type names, paths and leaf names

/// Separators accepted when splitting a path into segments.
const PATH_SEPARATORS: &[char] = &['/', '.', '\\'];

/// Separator used by canonical paths.
pub const CANONICAL_SEPARATOR: char = '.';

/// Reduce a qualified type name to its bare local name.
///
/// A leading `{namespace-uri}` wrapper is removed first, then a `prefix:`
/// qualifier. Input with neither form is returned unchanged.
///
/// ```
/// use catalog_model::normalize_type;
///
/// assert_eq!(normalize_type("xs:string"), "string");
/// assert_eq!(normalize_type("{http://www.w3.org/2001/XMLSchema}int"), "int");
/// assert_eq!(normalize_type("Max35Text"), "Max35Text");
/// ```
pub fn normalize_type(raw: &str) -> String {
    let mut local = raw.trim();

    if let Some(rest) = local.strip_prefix('{') {
        if let Some(end) = rest.find('}') {
            local = &rest[end + 1..];
        }
    }

    match local.rsplit_once(':') {
        Some((_, name)) => name.to_string(),
        None => local.to_string(),
    }
}

/// Iterate the non-empty segments of a path written with any supported separator.
pub fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(PATH_SEPARATORS).filter(|s| !s.is_empty())
}

/// Rewrite a path with the canonical separator.
pub fn canonical_path(path: &str) -> String {
    path_segments(path).collect::<Vec<_>>().join(".")
}

/// Case-fold a leaf name and drop underscores and hyphens.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Append a segment to a parent path.
pub fn join_path(parent: &str, name: &str, separator: char) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{separator}{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_type_forms() {
        assert_eq!(normalize_type("xs:decimal"), "decimal");
        assert_eq!(normalize_type("{urn:iso:std}ActiveCurrencyAndAmount"), "ActiveCurrencyAndAmount");
        assert_eq!(normalize_type("PartyIdentification135"), "PartyIdentification135");
        assert_eq!(normalize_type(""), "");
    }

    #[test]
    fn test_normalize_type_both_forms() {
        assert_eq!(
            normalize_type("{http://www.w3.org/2001/XMLSchema}xs:string"),
            "string"
        );
    }

    #[test]
    fn test_normalize_type_unclosed_bracket() {
        assert_eq!(normalize_type("{broken"), "{broken");
    }

    #[test]
    fn test_canonical_path() {
        assert_eq!(canonical_path("GrpHdr/MsgId"), "GrpHdr.MsgId");
        assert_eq!(canonical_path("GrpHdr.MsgId"), "GrpHdr.MsgId");
        assert_eq!(canonical_path("/GrpHdr\\MsgId/"), "GrpHdr.MsgId");
        assert_eq!(canonical_path(""), "");
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("Msg_Id"), "msgid");
        assert_eq!(normalize_name("msg-id"), "msgid");
        assert_eq!(normalize_name("MsgId"), "msgid");
    }

    #[test]
    fn test_join_path() {
        assert_eq!(join_path("", "GrpHdr", '/'), "GrpHdr");
        assert_eq!(join_path("GrpHdr", "MsgId", '.'), "GrpHdr.MsgId");
    }
}
