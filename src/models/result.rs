use super::request::DocumentKind;

/// Outcome handed back to the caller. Either a complete byte buffer with its
/// delivery metadata, or an error message. Never both, never a partial buffer.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub success: bool,
    pub data: Option<Vec<u8>>,
    pub filename: Option<String>,
    pub mime_type: Option<String>,
    pub error: Option<String>,
}

impl GenerationResult {
    pub fn completed(data: Vec<u8>, filename: String, mime_type: &str) -> Self {
        GenerationResult {
            success: true,
            data: Some(data),
            filename: Some(filename),
            mime_type: Some(mime_type.to_string()),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        GenerationResult {
            success: false,
            data: None,
            filename: None,
            mime_type: None,
            error: Some(message.into()),
        }
    }
}

/// Filename for a generated document: the kind's stem plus the client slug.
pub fn filename_for(kind: DocumentKind, client_name: &str) -> String {
    format!("{}-{}.{}", kind.filename_stem(), client_slug(client_name), kind.extension())
}

/// ASCII-normalized, lower-cased client name with word runs joined by a
/// single hyphen. Same input always yields the same slug.
pub fn client_slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_separator = false;

    for ch in name.trim().chars() {
        let mapped = fold_ascii(ch);
        match mapped {
            Some(c) if c.is_ascii_alphanumeric() => {
                if pending_separator && !slug.is_empty() {
                    slug.push('-');
                }
                pending_separator = false;
                slug.push(c.to_ascii_lowercase());
            }
            Some(_) | None => pending_separator = true,
        }
    }

    if slug.is_empty() {
        slug.push_str("client");
    }
    slug
}

/// Folds the Latin-1 accents that show up in client names. Anything else
/// non-ASCII is treated as a separator.
fn fold_ascii(ch: char) -> Option<char> {
    if ch.is_ascii() {
        return Some(ch);
    }
    let folded = match ch {
        'á' | 'à' | 'â' | 'ä' | 'ã' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'ö' | 'õ' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ñ' => 'n',
        'ç' => 'c',
        'Á' | 'À' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'A',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'Ó' | 'Ò' | 'Ô' | 'Ö' | 'Õ' => 'O',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'Ñ' => 'N',
        'Ç' => 'C',
        _ => return None,
    };
    Some(folded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_lowercases_and_joins_with_single_hyphens() {
        assert_eq!(client_slug("Casa Flores"), "casa-flores");
        assert_eq!(client_slug("  Estudio   del  Valle "), "estudio-del-valle");
    }

    #[test]
    fn slug_folds_accents_to_ascii() {
        assert_eq!(client_slug("Ángela Núñez"), "angela-nunez");
        assert_eq!(client_slug("Façade & Co."), "facade-co");
    }

    #[test]
    fn slug_never_comes_back_empty() {
        assert_eq!(client_slug("   "), "client");
        assert_eq!(client_slug("株式会社"), "client");
    }

    #[test]
    fn slug_is_deterministic() {
        let a = client_slug("Müller–Haus Projekt");
        let b = client_slug("Müller–Haus Projekt");
        assert_eq!(a, b);
    }

    #[test]
    fn filename_is_stem_then_slug_then_extension() {
        assert_eq!(
            filename_for(DocumentKind::ShoppingList, "Casa Flores"),
            "shopping-list-casa-flores.xlsx"
        );
        assert_eq!(
            filename_for(DocumentKind::Proposal, "Atelier Ruiz"),
            "proposal-atelier-ruiz.pdf"
        );
    }

    #[test]
    fn failure_result_carries_no_buffer() {
        let result = GenerationResult::failed("boom");
        assert!(!result.success);
        assert!(result.data.is_none());
        assert_eq!(result.error.as_deref(), Some("boom"));
    }
}
