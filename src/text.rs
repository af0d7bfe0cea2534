//! Summary cleanup before it is handed to the rewrite service or rendered.
//!
//! Tag stripping is a pattern match, not an HTML parser. Malformed markup
//! can leave stray text behind but never a complete `<...>` tag.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Decode HTML entities, strip markup, fold whitespace runs into single
/// spaces, and trim.
///
/// Entities are decoded first so escaped markup is stripped as well.
/// Stripping repeats until no tag remains, so input such as `<<b>i>` cannot
/// reassemble into a tag after one pass.
pub fn normalize(raw: &str) -> String {
    let mut text = html_escape::decode_html_entities(raw).into_owned();
    while TAG.is_match(&text) {
        text = TAG.replace_all(&text, "").into_owned();
    }
    WHITESPACE_RUN.replace_all(&text, " ").trim().to_string()
}

/// Pad `text` from `fillers` until it is at least `threshold` characters long.
///
/// Sentences are appended in order and only repeat once all of them have
/// been used, so a short summary gets distinct sentences before any
/// duplicate. Text already at or above the threshold is returned unchanged,
/// which makes the function idempotent. Blank fillers are ignored, and with
/// none left no padding happens.
pub fn ensure_minimum_length<S: AsRef<str>>(text: &str, threshold: usize, fillers: &[S]) -> String {
    let fillers: Vec<&str> = fillers
        .iter()
        .map(|f| f.as_ref().trim())
        .filter(|f| !f.is_empty())
        .collect();
    let mut padded = text.to_string();
    let mut len = padded.chars().count();
    for filler in fillers.iter().cycle() {
        if len >= threshold {
            break;
        }
        if !padded.is_empty() {
            padded.push(' ');
        }
        padded.push_str(filler);
        len = padded.chars().count();
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILLERS: [&str; 3] = [
        "Este hecho se produce en un contexto que continúa desarrollándose.",
        "Las partes implicadas no han detallado los próximos pasos.",
        "Se esperan nuevas informaciones en los próximos días.",
    ];

    #[test]
    fn test_normalize_strips_tags_and_newlines() {
        let raw = "<p>El Gobierno <b>aprueba</b>\nlos presupuestos.</p>\n";
        assert_eq!(normalize(raw), "El Gobierno aprueba los presupuestos.");
    }

    #[test]
    fn test_normalize_decodes_entities() {
        assert_eq!(normalize("Caf&eacute; &amp; pol&iacute;tica&nbsp;hoy"), "Café & política hoy");
        assert_eq!(normalize("&lt;b&gt;Urgente&lt;/b&gt; subida"), "Urgente subida");
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(normalize("  uno \r\n\t dos   tres  "), "uno dos tres");
    }

    #[test]
    fn test_normalize_nested_brackets_leave_no_tag() {
        let out = normalize("a <<b>i> c <<<x>y>z> d");
        assert!(!TAG.is_match(&out), "tag survived: {out}");
    }

    #[test]
    fn test_normalize_unclosed_bracket_is_residue() {
        assert_eq!(normalize("precio < 5 euros"), "precio < 5 euros");
    }

    #[test]
    fn test_normalize_random_markup_never_leaves_tags() {
        let samples = [
            "<img src=\"x.jpg\"/><br>",
            "<<<>>>",
            "<a href='<b>'>enlace</a>",
            "texto <a\nhref=x>multi\nlínea</a>",
            "<<p>p>>",
        ];
        for s in samples {
            let out = normalize(s);
            assert!(!TAG.is_match(&out), "{s:?} -> {out:?}");
        }
    }

    #[test]
    fn test_ensure_minimum_length_pads_to_threshold() {
        let out = ensure_minimum_length("Breve.", 500, &FILLERS);
        assert!(out.chars().count() >= 500);
        assert!(out.starts_with("Breve. Este hecho"));
    }

    #[test]
    fn test_ensure_minimum_length_uses_distinct_sentences_first() {
        let out = ensure_minimum_length("Breve.", 150, &FILLERS);
        assert_eq!(
            out,
            format!("Breve. {} {} {}", FILLERS[0], FILLERS[1], FILLERS[2])
        );
        assert_eq!(out.matches(FILLERS[0]).count(), 1);
    }

    #[test]
    fn test_ensure_minimum_length_cycles_when_exhausted() {
        let out = ensure_minimum_length("", 400, &FILLERS);
        assert!(out.chars().count() >= 400);
        assert!(out.matches(FILLERS[0]).count() >= 2);
    }

    #[test]
    fn test_ensure_minimum_length_empty_input() {
        let out = ensure_minimum_length("", 10, &FILLERS);
        assert_eq!(out, FILLERS[0]);
    }

    #[test]
    fn test_ensure_minimum_length_is_idempotent() {
        let once = ensure_minimum_length("Texto corto", 300, &FILLERS);
        let twice = ensure_minimum_length(&once, 300, &FILLERS);
        assert_eq!(once, twice);

        let long = "x".repeat(400);
        assert_eq!(ensure_minimum_length(&long, 300, &FILLERS), long);
    }

    #[test]
    fn test_ensure_minimum_length_counts_chars_not_bytes() {
        let text = "ñ".repeat(300);
        assert_eq!(ensure_minimum_length(&text, 300, &FILLERS), text);
    }

    #[test]
    fn test_ensure_minimum_length_without_filler() {
        let none: [&str; 0] = [];
        assert_eq!(ensure_minimum_length("corto", 500, &none), "corto");
        assert_eq!(ensure_minimum_length("corto", 500, &["  "]), "corto");
    }
}
