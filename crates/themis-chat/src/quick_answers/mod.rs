// Heuristic extractors that answer factual questions straight from the user's documents

mod lexicon;
mod party;
mod ruling;
mod evidence;
mod articles;

use themis_persist::LegalDocument;

use crate::language::Language;
use crate::text::normalize;

pub use lexicon::{RightEntry, RIGHTS_LEXICON};

/// Question as seen by every matcher
pub struct Query<'a> {
    pub raw: &'a str,
    /// Accent-stripped, lowercased, whitespace-collapsed
    pub normalized: String,
    pub documents: &'a [LegalDocument],
    pub language: Language,
}

/// Guarded extractor; `triggers` must hold before `extract` runs
pub struct Matcher {
    pub name: &'static str,
    pub triggers: fn(&Query<'_>) -> bool,
    pub extract: fn(&Query<'_>) -> Option<String>,
}

/// Evaluated in order, first answer wins
pub const CHAIN: &[Matcher] = &[
    Matcher {
        name: "party_name",
        triggers: party::triggers,
        extract: party::extract,
    },
    Matcher {
        name: "ruling_lookup",
        triggers: ruling::triggers,
        extract: ruling::extract,
    },
    Matcher {
        name: "evidence_checklist",
        triggers: evidence::triggers,
        extract: evidence::extract,
    },
    Matcher {
        name: "constitutional_articles",
        triggers: articles::triggers,
        extract: articles::extract,
    },
];

#[derive(Debug, Clone, PartialEq)]
pub struct QuickAnswer {
    pub matcher: &'static str,
    pub text: String,
}

pub fn try_quick_answer(
    question: &str,
    documents: &[LegalDocument],
    language: Language,
) -> Option<QuickAnswer> {
    if documents.is_empty() || question.trim().is_empty() {
        return None;
    }

    let query = Query {
        raw: question,
        normalized: normalize(question),
        documents,
        language,
    };

    CHAIN.iter().find_map(|matcher| {
        if !(matcher.triggers)(&query) {
            return None;
        }
        let text = (matcher.extract)(&query)?;
        tracing::debug!(matcher = matcher.name, "Quick answer matched");
        Some(QuickAnswer {
            matcher: matcher.name,
            text,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use themis_persist::Ruling;

    fn docs() -> Vec<LegalDocument> {
        let mut doc = LegalDocument {
            id: "d1".into(),
            content: "DEMANDANTE: Ana María Pérez Gómez\nACCIONADO: EPS Salud Total".into(),
            ..Default::default()
        };
        doc.rulings.push(Ruling {
            providencia: "T-123-45".into(),
            magistrado: Some("Ana Pérez".into()),
            ..Default::default()
        });
        vec![doc]
    }

    #[test]
    fn test_chain_order_is_fixed() {
        let names: Vec<_> = CHAIN.iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            vec!["party_name", "ruling_lookup", "evidence_checklist", "constitutional_articles"]
        );
    }

    #[test]
    fn test_ruling_answer_short_circuits() {
        let answer = try_quick_answer("¿Cuál es el magistrado de T-123-45?", &docs(), Language::Es).unwrap();
        assert_eq!(answer.matcher, "ruling_lookup");
        assert!(answer.text.contains("Ana Pérez"));
    }

    #[test]
    fn test_unrelated_question_declines() {
        assert!(try_quick_answer("Explícame qué es una tutela", &docs(), Language::Es).is_none());
    }

    #[test]
    fn test_no_documents_declines() {
        assert!(try_quick_answer("¿Cuál es el magistrado de T-123-45?", &[], Language::Es).is_none());
    }
}
