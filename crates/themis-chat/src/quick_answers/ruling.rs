// Ruling lookup by citation, or a short listing of the user's rulings

use std::sync::LazyLock;

use regex::Regex;
use themis_persist::Ruling;

use super::lexicon::{
    contains_word, RulingField, MAX_RULING_ROWS, RULING_FIELDS, RULING_KEYWORDS, RULING_LIST_WORDS,
};
use super::Query;
use crate::language::Language;
use crate::text::normalize;

/// `T-123-45`, `SU-214/2016`, `C-355 de 2006` on normalized text
static CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(su|t|c|a)\s*-\s*(\d{1,4})\s*(?:-|/|\s+de\s+)\s*(\d{2,4})\b").expect("valid citation pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
struct Citation {
    prefix: String,
    number: u32,
    year: String,
}

impl Citation {
    fn parse_all(normalized: &str) -> Vec<Citation> {
        CITATION
            .captures_iter(normalized)
            .filter_map(|caps| {
                Some(Citation {
                    prefix: caps.get(1)?.as_str().to_string(),
                    number: caps.get(2)?.as_str().parse().ok()?,
                    year: caps.get(3)?.as_str().to_string(),
                })
            })
            .collect()
    }

    /// Two-digit and four-digit years of the same ruling match
    fn matches(&self, other: &Citation) -> bool {
        self.prefix == other.prefix
            && self.number == other.number
            && (self.year.ends_with(&other.year) || other.year.ends_with(&self.year))
    }
}

pub fn triggers(query: &Query<'_>) -> bool {
    CITATION.is_match(&query.normalized) || contains_word(&query.normalized, RULING_KEYWORDS)
}

pub fn extract(query: &Query<'_>) -> Option<String> {
    let rulings: Vec<&Ruling> = query.documents.iter().flat_map(|d| d.rulings.iter()).collect();
    if rulings.is_empty() {
        return None;
    }

    let cited = Citation::parse_all(&query.normalized);
    if !cited.is_empty() {
        let found: Vec<&Ruling> = rulings
            .iter()
            .copied()
            .filter(|r| {
                Citation::parse_all(&normalize(&r.providencia))
                    .iter()
                    .any(|own| cited.iter().any(|c| c.matches(own)))
            })
            .collect();
        if found.is_empty() {
            return None;
        }

        let requested: Vec<RulingField> = RULING_FIELDS
            .iter()
            .filter(|(_, words)| contains_word(&query.normalized, words))
            .map(|(field, _)| *field)
            .collect();

        let answers: Vec<String> = found
            .iter()
            .map(|r| describe(r, &requested, query.language))
            .collect();
        return Some(answers.join("\n\n"));
    }

    if contains_word(&query.normalized, RULING_KEYWORDS) && contains_word(&query.normalized, RULING_LIST_WORDS) {
        return Some(list(&rulings, query.language));
    }

    None
}

fn field_value(ruling: &Ruling, field: RulingField) -> Option<String> {
    match field {
        RulingField::Magistrado => ruling.magistrado.clone(),
        RulingField::Expediente => ruling.expediente.clone(),
        RulingField::Derechos if !ruling.derechos.is_empty() => Some(ruling.derechos.join(", ")),
        RulingField::Derechos => None,
        RulingField::Fecha => ruling.fecha.clone(),
        RulingField::Url => ruling.url.clone(),
        RulingField::Resumen => ruling.resumen.clone(),
    }
    .filter(|v| !v.trim().is_empty())
}

fn not_recorded(language: Language) -> &'static str {
    match language {
        Language::Es => "no registrado",
        Language::En => "not recorded",
        Language::Pt => "não registrado",
    }
}

fn describe(ruling: &Ruling, requested: &[RulingField], language: Language) -> String {
    let value = |field| field_value(ruling, field).unwrap_or_else(|| not_recorded(language).to_string());

    if let [field] = requested {
        return match (field, language) {
            (RulingField::Magistrado, Language::Es) => format!(
                "El magistrado ponente de la providencia {} es {}.",
                ruling.providencia,
                value(*field)
            ),
            (RulingField::Magistrado, Language::En) => format!(
                "The reporting justice of ruling {} is {}.",
                ruling.providencia,
                value(*field)
            ),
            (RulingField::Magistrado, Language::Pt) => format!(
                "O relator da decisão {} é {}.",
                ruling.providencia,
                value(*field)
            ),
            _ => format!("{} ({}): {}", field.label(language), ruling.providencia, value(*field)),
        };
    }

    let fields: Vec<RulingField> = if requested.is_empty() {
        RULING_FIELDS.iter().map(|(field, _)| *field).collect()
    } else {
        requested.to_vec()
    };

    let mut out = match language {
        Language::Es => format!("Providencia {}", ruling.providencia),
        Language::En => format!("Ruling {}", ruling.providencia),
        Language::Pt => format!("Decisão {}", ruling.providencia),
    };
    if requested.is_empty() {
        if let Some(tema) = ruling.tema.as_deref().filter(|t| !t.trim().is_empty()) {
            out.push_str(&format!(" ({})", tema));
        }
    }
    out.push(':');
    for field in fields {
        out.push_str(&format!("\n- {}: {}", field.label(language), value(field)));
    }
    out
}

fn list(rulings: &[&Ruling], language: Language) -> String {
    let mut out = match language {
        Language::Es => format!("Providencias registradas ({}):", rulings.len()),
        Language::En => format!("Recorded rulings ({}):", rulings.len()),
        Language::Pt => format!("Decisões registradas ({}):", rulings.len()),
    };

    for ruling in rulings.iter().take(MAX_RULING_ROWS) {
        let judge = ruling.magistrado.as_deref().unwrap_or("-");
        let about = ruling
            .tema
            .as_deref()
            .or(ruling.fecha.as_deref())
            .unwrap_or("-");
        out.push_str(&format!("\n- {} | {} | {}", ruling.providencia, judge, about));
    }

    if rulings.len() > MAX_RULING_ROWS {
        let rest = rulings.len() - MAX_RULING_ROWS;
        out.push_str(&match language {
            Language::Es => format!("\n… y {} más.", rest),
            Language::En => format!("\n… and {} more.", rest),
            Language::Pt => format!("\n… e mais {}.", rest),
        });
    }
    out
}
