use crate::common::model::RawContent;

/// Produces a human-readable type label for raw content, in the style of
/// `file(1)` output. Classification matches registered format tokens as
/// case-insensitive substrings of this label.
pub fn type_label(raw: &RawContent) -> String {
    let text = raw.as_str();
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let trimmed = text.trim_start();

    if trimmed.starts_with("<?xml") {
        return "XML 1.0 document text".to_string();
    }

    let mut chars = trimmed.chars();
    if chars.next() == Some('<') {
        if matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '!' || c == '?') {
            return "XML document text".to_string();
        }
    }

    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        return "JSON text data".to_string();
    }

    "ASCII text".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_declaration_label() {
        let raw = RawContent::new("<?xml version='1.0' encoding='UTF-8'?><a/>");
        assert_eq!(type_label(&raw), "XML 1.0 document text");
    }

    #[test]
    fn test_bare_markup_label() {
        let raw = RawContent::new("<note><to>Smith</to></note>");
        assert_eq!(type_label(&raw), "XML document text");
    }

    #[test]
    fn test_leading_whitespace_and_bom_are_skipped() {
        let raw = RawContent::new("\u{feff}\n  <?xml version='1.0'?><a/>");
        assert_eq!(type_label(&raw), "XML 1.0 document text");
    }

    #[test]
    fn test_json_label() {
        let raw = RawContent::new(r#"{"key": "value"}"#);
        assert_eq!(type_label(&raw), "JSON text data");
    }

    #[test]
    fn test_plain_text_label() {
        let raw = RawContent::new("just some words");
        assert_eq!(type_label(&raw), "ASCII text");
    }
}
