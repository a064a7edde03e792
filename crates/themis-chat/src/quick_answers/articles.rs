// Constitutional articles ranked by keyword hits for the right being asked about

use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::lexicon::{
    contains_word, RightEntry, ARTICLE_WORDS, LONG_KEYWORD_CHARS, LONG_KEYWORD_WEIGHT, RIGHTS_LEXICON,
    SECONDARY_ARTICLES, SNIPPET_RADIUS, SUPPORT_VERBS, TOP_ARTICLES,
};
use super::Query;
use crate::language::Language;
use crate::text::{fold_indexed, snippet_around};

/// `Articulo 49.`, `**Artículo 49**`, `ARTÍCULO 49:` at line start
static HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^[ \t]*(?:\*\*)?[ \t]*art[ií]culo[ \t]+(\d+)[ \t]*[.:°º]?[ \t]*(?:\*\*)?[.:]?")
        .expect("valid article header pattern")
});

#[derive(Debug, Clone)]
struct Article<'a> {
    number: u32,
    body: &'a str,
}

#[derive(Debug)]
struct Scored {
    number: u32,
    score: usize,
    snippet: String,
}

pub fn triggers(query: &Query<'_>) -> bool {
    contains_word(&query.normalized, ARTICLE_WORDS) && contains_word(&query.normalized, SUPPORT_VERBS)
}

pub fn extract(query: &Query<'_>) -> Option<String> {
    let rights: Vec<&RightEntry> = RIGHTS_LEXICON
        .iter()
        .filter(|entry| entry.triggers.iter().any(|t| query.normalized.contains(t)))
        .collect();
    if rights.is_empty() {
        return None;
    }

    let mut keywords: Vec<&str> = Vec::new();
    for entry in &rights {
        for keyword in entry.keywords {
            if !keywords.contains(keyword) {
                keywords.push(keyword);
            }
        }
    }

    let mut ranked: Vec<Scored> = Vec::new();
    for text in query.documents.iter().filter_map(|d| d.constitution.as_deref()) {
        // Headers are matched on composed text
        let composed: String = text.nfc().collect();
        for article in index_articles(&composed) {
            if ranked.iter().any(|s| s.number == article.number) {
                continue;
            }
            if let Some(scored) = score(&article, &keywords) {
                ranked.push(scored);
            }
        }
    }
    if ranked.is_empty() {
        return None;
    }

    ranked.sort_by(|a, b| b.score.cmp(&a.score).then(a.number.cmp(&b.number)));

    let names: Vec<&str> = rights.iter().map(|r| r.right).collect();
    Some(render(&ranked, &names.join(", "), query.language))
}

fn index_articles(text: &str) -> Vec<Article<'_>> {
    let headers: Vec<(u32, usize, usize)> = HEADER
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let number = caps.get(1)?.as_str().parse().ok()?;
            Some((number, whole.start(), whole.end()))
        })
        .collect();

    headers
        .iter()
        .enumerate()
        .map(|(i, (number, _, body_start))| {
            let body_end = headers.get(i + 1).map(|h| h.1).unwrap_or(text.len());
            Article {
                number: *number,
                body: text[*body_start..body_end].trim(),
            }
        })
        .collect()
}

fn keyword_weight(keyword: &str) -> usize {
    if keyword.chars().count() >= LONG_KEYWORD_CHARS {
        LONG_KEYWORD_WEIGHT
    } else {
        1
    }
}

fn score(article: &Article<'_>, keywords: &[&str]) -> Option<Scored> {
    let (folded, origins) = fold_indexed(article.body);
    let mut total = 0;
    let mut first_hit: Option<usize> = None;

    for keyword in keywords {
        let hits = folded.matches(keyword).count();
        if hits == 0 {
            continue;
        }
        total += hits * keyword_weight(keyword);
        if let Some(byte_idx) = folded.find(keyword) {
            let folded_idx = folded[..byte_idx].chars().count();
            let char_idx = origins.get(folded_idx).copied().unwrap_or(0);
            first_hit = Some(first_hit.map_or(char_idx, |f| f.min(char_idx)));
        }
    }

    let at = first_hit?;
    Some(Scored {
        number: article.number,
        score: total,
        snippet: snippet_around(article.body, at, SNIPPET_RADIUS),
    })
}

fn render(ranked: &[Scored], rights: &str, language: Language) -> String {
    let (title, label, score_label, others) = match language {
        Language::Es => ("Artículos más relevantes", "Artículo", "puntaje", "Otros artículos relacionados"),
        Language::En => ("Most relevant articles", "Article", "score", "Other related articles"),
        Language::Pt => ("Artigos mais relevantes", "Artigo", "pontuação", "Outros artigos relacionados"),
    };

    let mut out = format!("{} ({}):", title, rights);
    for scored in ranked.iter().take(TOP_ARTICLES) {
        out.push_str(&format!(
            "\n\n**{} {}** ({} {})\n{}",
            label, scored.number, score_label, scored.score, scored.snippet
        ));
    }

    let secondary: Vec<String> = ranked
        .iter()
        .skip(TOP_ARTICLES)
        .take(SECONDARY_ARTICLES)
        .map(|s| s.number.to_string())
        .collect();
    if !secondary.is_empty() {
        out.push_str(&format!("\n\n{}: {}", others, secondary.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::normalize;
    use themis_persist::LegalDocument;

    const CONSTITUTION: &str = "\
**Artículo 11.** El derecho a la vida es inviolable. No habrá pena de muerte.
**Artículo 48.** La Seguridad Social es un servicio público de carácter obligatorio.
Artículo 49. La atención de la salud y el saneamiento ambiental son servicios públicos a cargo del Estado. \
Se garantiza a todas las personas el acceso a los servicios de promoción, protección y recuperación de la salud.
ARTÍCULO 67: La educación es un derecho de la persona y un servicio público que tiene una función social.
";

    fn docs() -> Vec<LegalDocument> {
        vec![LegalDocument { constitution: Some(CONSTITUTION.into()), ..Default::default() }]
    }

    fn query<'a>(q: &'a str, docs: &'a [LegalDocument]) -> Query<'a> {
        Query { raw: q, normalized: normalize(q), documents: docs, language: Language::Es }
    }

    #[test]
    fn test_headers_indexed_bold_and_plain() {
        let numbers: Vec<u32> = index_articles(CONSTITUTION).iter().map(|a| a.number).collect();
        assert_eq!(numbers, vec![11, 48, 49, 67]);
    }

    #[test]
    fn test_long_keywords_weigh_double() {
        assert_eq!(keyword_weight("saneamiento"), 2);
        assert_eq!(keyword_weight("salud"), 1);
    }

    #[test]
    fn test_health_ranks_article_49_first() {
        let d = docs();
        let q = query("¿Qué artículos protegen el derecho a la salud?", &d);
        assert!(triggers(&q));

        let answer = extract(&q).unwrap();
        assert!(answer.starts_with("Artículos más relevantes (salud):"));
        let first = answer.find("**Artículo 49**").unwrap();
        let second = answer.find("**Artículo 48**").unwrap();
        let third = answer.find("**Artículo 67**").unwrap();
        assert!(first < second && second < third);
        assert!(!answer.contains("**Artículo 11**"));
    }

    #[test]
    fn test_decomposed_text_still_ranks() {
        let decomposed: String = CONSTITUTION.nfd().collect();
        let d = vec![LegalDocument { constitution: Some(decomposed), ..Default::default() }];
        let q = query("¿Que\u{301} arti\u{301}culos protegen el derecho a la salud?", &d);
        assert!(triggers(&q));

        let answer = extract(&q).unwrap();
        let first = answer.find("**Artículo 49**").unwrap();
        let second = answer.find("**Artículo 48**").unwrap();
        assert!(first < second);
        assert!(answer.contains("salud"));
    }

    #[test]
    fn test_no_right_detected_declines() {
        let d = docs();
        assert!(extract(&query("¿Qué artículos protegen esto?", &d)).is_none());
    }
}
