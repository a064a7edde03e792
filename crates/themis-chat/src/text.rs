// Text folding shared by the detectors and matchers

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Lowercase and strip diacritics, precomposed or decomposed
pub fn fold(text: &str) -> String {
    fold_indexed(text).0
}

/// Folded text plus, for each folded char, the index of the source char it came from
pub fn fold_indexed(text: &str) -> (String, Vec<usize>) {
    let mut folded = String::with_capacity(text.len());
    let mut origins = Vec::with_capacity(text.len());

    for (idx, c) in text.chars().enumerate() {
        for part in c.nfd() {
            for lower in part.to_lowercase().filter(|l| !is_combining_mark(*l)) {
                folded.push(lower);
                origins.push(idx);
            }
        }
    }
    (folded, origins)
}

/// Accent-stripped, lowercased, whitespace-collapsed form used for matching
pub fn normalize(text: &str) -> String {
    fold(text)
        .split(|c: char| c.is_whitespace() || c == '¿' || c == '¡')
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase word tokens of an already normalized string
pub fn words(normalized: &str) -> impl Iterator<Item = &str> {
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

/// Window of about `radius` chars on each side of char position `at`
pub fn snippet_around(text: &str, at: usize, radius: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    let start = at.saturating_sub(radius);
    let end = (at + radius).min(chars.len());
    let body: String = chars[start.min(end)..end].iter().collect();
    let body = body.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut out = String::new();
    if start > 0 {
        out.push('…');
    }
    out.push_str(&body);
    if end < chars.len() {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("  ¿Cuál es   el MAGISTRADO?\n"), "cual es el magistrado?");
        assert_eq!(normalize("Ação e Peña"), "acao e pena");
    }

    #[test]
    fn test_decomposed_accents_fold_like_precomposed() {
        let decomposed = "¿Que\u{301} arti\u{301}culos protegen la salud?";
        assert_eq!(normalize(decomposed), "que articulos protegen la salud?");
        assert_eq!(normalize(decomposed), normalize("¿Qué artículos protegen la salud?"));
        assert_eq!(words(&normalize(decomposed)).nth(1), Some("articulos"));
    }

    #[test]
    fn test_fold_indexed_points_back_to_source() {
        let raw = "Arti\u{301}culo ÚNICO";
        let (folded, origins) = fold_indexed(raw);
        assert_eq!(folded, "articulo unico");
        assert_eq!(folded.chars().count(), origins.len());
        // `c` follows the dropped combining mark in the source
        assert_eq!(origins[4], 5);
    }

    #[test]
    fn test_snippet_marks_cuts() {
        assert_eq!(snippet_around("abcdefghij", 5, 2), "…defg…");
        assert_eq!(snippet_around("abc", 1, 10), "abc");
    }
}
