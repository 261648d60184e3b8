//! Extraction of the HTML document from a raw completion.
//!
//! Models are told to return bare HTML but often wrap it in a markdown
//! fence or add a sentence before or after it. [`extract_markup`] removes
//! that wrapping.

use crate::error::GatewayError;

const DOCUMENT_STARTS: &[&str] = &["<!doctype", "<html"];
const DOCUMENT_END: &str = "</html>";

/// Returns the HTML document contained in `completion`.
///
/// Removes markdown code fences, then drops prose before the first
/// `<!DOCTYPE` / `<html` and anything after the last `</html>` (both
/// matched case-insensitively). Completions without a document marker
/// are returned trimmed, fences removed.
///
/// # Errors
///
/// Returns [`GatewayError::Upstream`] if nothing is left after cleanup.
pub fn extract_markup(completion: &str) -> Result<String, GatewayError> {
    let unfenced = completion.replace("```html", "").replace("```", "");
    let mut markup = unfenced.trim();

    // ASCII lowercasing keeps byte offsets aligned with `markup`.
    let lower = markup.to_ascii_lowercase();
    if let Some(start) = DOCUMENT_STARTS.iter().filter_map(|m| lower.find(m)).min() {
        let end = lower
            .rfind(DOCUMENT_END)
            .filter(|end| *end >= start)
            .map_or(markup.len(), |end| end + DOCUMENT_END.len());
        markup = markup.get(start..end).unwrap_or(markup);
    }

    let markup = markup.trim();
    if markup.is_empty() {
        return Err(GatewayError::Upstream(
            "completion contained no markup".to_string(),
        ));
    }
    Ok(markup.to_string())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn extract(input: &str) -> String {
        let Ok(markup) = extract_markup(input) else {
            panic!("expected markup for {input:?}");
        };
        markup
    }

    #[test]
    fn bare_document_is_unchanged() {
        let doc = "<!DOCTYPE html><html><body>hi</body></html>";
        assert_eq!(extract(doc), doc);
    }

    #[test]
    fn code_fences_are_removed() {
        let raw = "```html\n<html><body>hi</body></html>\n```";
        assert_eq!(extract(raw), "<html><body>hi</body></html>");
    }

    #[test]
    fn surrounding_prose_is_dropped() {
        let raw = "Sure! Here is your page:\n<!doctype html>\n<HTML><body></body></HTML>\nEnjoy.";
        assert_eq!(extract(raw), "<!doctype html>\n<HTML><body></body></HTML>");
    }

    #[test]
    fn fragment_without_document_marker_is_kept() {
        assert_eq!(extract("  <div>card</div>  "), "<div>card</div>");
    }

    #[test]
    fn missing_closing_tag_keeps_tail() {
        let raw = "intro <html><body>cut off";
        assert_eq!(extract(raw), "<html><body>cut off");
    }

    #[test]
    fn empty_completion_is_an_error() {
        assert!(matches!(
            extract_markup("```html\n```"),
            Err(GatewayError::Upstream(_))
        ));
        assert!(extract_markup("   ").is_err());
    }

    #[test]
    fn non_ascii_prose_does_not_break_slicing() {
        let raw = "Voilà - la page 🙈 <html>ü</html> fin";
        assert_eq!(extract(raw), "<html>ü</html>");
    }
}
