//! Extraction of GraphQL documents embedded in host-language sources.
//!
//! Documents are found in template literals tagged with a marker such as
//! `gql`. Interpolations (`${...}`) are blanked out byte for byte, so the
//! extracted text keeps the offsets it had in the host file.

use gqlc_core::{diagnostics::codes, DiagnosticBag, FileId, Span};
use memchr::memmem;

/// A GraphQL document found inside a host file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedDocument {
    /// Template contents with interpolations replaced by spaces.
    pub text: String,
    /// Byte offset of `text` within the host file.
    pub base: u32,
}

/// Finds every template literal tagged with `tag` in `source`.
pub fn extract_documents(
    source: &str,
    file: FileId,
    tag: &str,
    diagnostics: &mut DiagnosticBag,
) -> Vec<EmbeddedDocument> {
    let bytes = source.as_bytes();
    let mut documents = Vec::new();
    if tag.is_empty() {
        return documents;
    }

    let finder = memmem::Finder::new(tag.as_bytes());
    let mut cursor = 0;

    while let Some(found) = finder.find(&bytes[cursor..]) {
        let tag_start = cursor + found;
        let mut pos = tag_start + tag.len();
        cursor = pos;

        if tag_start > 0 && is_ident_byte(bytes[tag_start - 1]) {
            continue;
        }
        while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if bytes.get(pos) != Some(&b'`') {
            continue;
        }

        let body_start = pos + 1;
        match scan_template(bytes, body_start) {
            Some((body_end, blanked)) => {
                let text = String::from_utf8_lossy(&blanked).into_owned();
                documents.push(EmbeddedDocument {
                    text,
                    base: body_start as u32,
                });
                cursor = body_end + 1;
            }
            None => {
                diagnostics.error(
                    codes::UNTERMINATED_TEMPLATE,
                    "unterminated template literal",
                    Span::new(file, tag_start as u32, (pos + 1) as u32),
                    format!("`{tag}` template is never closed"),
                );
                break;
            }
        }
    }

    documents
}

/// Scans a template body starting at `start`. Returns the offset of the
/// closing backtick and the body bytes with interpolations blanked.
/// Escapes are kept as written.
fn scan_template(bytes: &[u8], start: usize) -> Option<(usize, Vec<u8>)> {
    let mut out = Vec::new();
    let mut pos = start;
    let mut depth = 0usize;

    while pos < bytes.len() {
        let c = bytes[pos];
        if depth == 0 {
            match c {
                b'`' => return Some((pos, out)),
                b'\\' if pos + 1 < bytes.len() => {
                    out.extend_from_slice(&bytes[pos..pos + 2]);
                    pos += 2;
                    continue;
                }
                b'$' if bytes.get(pos + 1) == Some(&b'{') => {
                    depth = 1;
                    out.extend_from_slice(b"  ");
                    pos += 2;
                    continue;
                }
                _ => out.push(c),
            }
        } else {
            match c {
                b'{' => depth += 1,
                b'}' => depth -= 1,
                _ => {}
            }
            out.push(if c == b'\n' { b'\n' } else { b' ' });
        }
        pos += 1;
    }

    None
}

fn is_ident_byte(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn extract(source: &str) -> (Vec<EmbeddedDocument>, DiagnosticBag) {
        let mut diagnostics = DiagnosticBag::new();
        let docs = extract_documents(source, FileId::default(), "gql", &mut diagnostics);
        (docs, diagnostics)
    }

    #[test]
    fn test_extract_tagged_templates() {
        let source = indoc! {r#"
            const a = gql`query A { a }`;
            const b = gql `
              fragment B on Query { b }
            `;
        "#};
        let (docs, diagnostics) = extract(source);
        assert!(diagnostics.is_empty());
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text, "query A { a }");
        let base = docs[0].base as usize;
        assert_eq!(&source[base..base + docs[0].text.len()], "query A { a }");
        assert!(docs[1].text.contains("fragment B on Query"));
    }

    #[test]
    fn test_interpolations_are_blanked() {
        let (docs, _) = extract("gql`query A { ...F } ${fragments({ x: 1 })}`");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text.trim_end(), "query A { ...F }");
        assert_eq!(docs[0].text.len(), "query A { ...F } ${fragments({ x: 1 })}".len());
    }

    #[test]
    fn test_escapes_are_kept_as_written() {
        let (docs, _) = extract(r#"gql`query A { a(text: "say \"hi\"") }`"#);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].text, r#"query A { a(text: "say \"hi\"") }"#);

        let (docs, _) = extract(r"gql`{ a } \` b`");
        assert_eq!(docs[0].text, r"{ a } \` b");
    }

    #[test]
    fn test_tag_must_be_whole_word() {
        let (docs, _) = extract("const x = mygql`query A { a }`; gqlx`{ b }`");
        assert!(docs.is_empty());
    }

    #[test]
    fn test_unterminated_template() {
        let (docs, diagnostics) = extract("gql`query A { a }");
        assert!(docs.is_empty());
        assert!(diagnostics.has_errors());
    }
}
