// Evidence checklist lookup

use themis_persist::{EvidenceChecklist, EvidenceItem};

use super::lexicon::{contains_phrase, contains_word, COMPLY_WORDS, EVIDENCE_KEYWORDS, EVIDENCE_STOPWORDS, WHY_WORDS};
use super::Query;
use crate::language::Language;
use crate::text::{normalize, words};

pub fn triggers(query: &Query<'_>) -> bool {
    contains_word(&query.normalized, EVIDENCE_KEYWORDS)
}

pub fn extract(query: &Query<'_>) -> Option<String> {
    let checklist = merged_checklist(query)?;

    let asks_why = contains_phrase(&query.normalized, WHY_WORDS) && contains_word(&query.normalized, COMPLY_WORDS);
    if asks_why {
        if let Some(item) = best_satisfied_match(&query.normalized, &checklist.satisfied) {
            return Some(explain(item, query.language));
        }
    }

    Some(dump(&checklist, query.language))
}

fn merged_checklist(query: &Query<'_>) -> Option<EvidenceChecklist> {
    let mut merged: Option<EvidenceChecklist> = None;
    for checklist in query.documents.iter().filter_map(|d| d.evidence.as_ref()) {
        let target = merged.get_or_insert_with(EvidenceChecklist::default);
        target.satisfied.extend(checklist.satisfied.iter().cloned());
        target.missing.extend(checklist.missing.iter().cloned());
    }
    merged.filter(|c| !c.satisfied.is_empty() || !c.missing.is_empty())
}

/// Satisfied item sharing the most significant words with the question
fn best_satisfied_match<'a>(question: &str, satisfied: &'a [EvidenceItem]) -> Option<&'a EvidenceItem> {
    let asked: Vec<&str> = words(question)
        .filter(|w| w.chars().count() >= 4 && !EVIDENCE_STOPWORDS.contains(w))
        .collect();

    let mut best: Option<(usize, &EvidenceItem)> = None;
    for item in satisfied {
        let name = normalize(&item.name);
        let score = words(&name).filter(|w| asked.contains(w)).count();
        if score > 0 && best.map_or(true, |(top, _)| score > top) {
            best = Some((score, item));
        }
    }
    best.map(|(_, item)| item)
}

fn explain(item: &EvidenceItem, language: Language) -> String {
    let reason = item.reason.as_deref().filter(|r| !r.trim().is_empty());
    match (language, reason) {
        (Language::En, Some(r)) => format!("\"{}\" complies because {}", item.name, r),
        (Language::En, None) => format!("\"{}\" is marked as satisfied, with no recorded reason.", item.name),
        (Language::Pt, Some(r)) => format!("\"{}\" cumpre porque {}", item.name, r),
        (Language::Pt, None) => format!("\"{}\" está marcada como atendida, sem motivo registrado.", item.name),
        (Language::Es, Some(r)) => format!("\"{}\" cumple porque {}", item.name, r),
        (Language::Es, None) => format!("\"{}\" figura como cumplida, sin motivo registrado.", item.name),
    }
}

fn dump(checklist: &EvidenceChecklist, language: Language) -> String {
    let (title, ok, missing) = match language {
        Language::Es => ("Lista de pruebas", "Aportadas", "Faltantes"),
        Language::En => ("Evidence checklist", "Satisfied", "Missing"),
        Language::Pt => ("Lista de provas", "Atendidas", "Pendentes"),
    };

    let mut out = format!(
        "{}: {} {}, {} {}.",
        title,
        checklist.satisfied.len(),
        ok.to_lowercase(),
        checklist.missing.len(),
        missing.to_lowercase()
    );

    if !checklist.satisfied.is_empty() {
        out.push_str(&format!("\n\n{}:", ok));
        for item in &checklist.satisfied {
            out.push_str(&format!("\n✅ {}", line(item)));
        }
    }
    if !checklist.missing.is_empty() {
        out.push_str(&format!("\n\n{}:", missing));
        for item in &checklist.missing {
            out.push_str(&format!("\n❌ {}", line(item)));
        }
    }
    out
}

fn line(item: &EvidenceItem) -> String {
    match item.reason.as_deref().filter(|r| !r.trim().is_empty()) {
        Some(reason) => format!("{} ({})", item.name, reason),
        None => item.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use themis_persist::LegalDocument;

    fn item(name: &str, reason: &str) -> EvidenceItem {
        EvidenceItem { name: name.into(), reason: Some(reason.into()) }
    }

    fn docs() -> Vec<LegalDocument> {
        vec![LegalDocument {
            evidence: Some(EvidenceChecklist {
                satisfied: vec![
                    item("Historia clínica", "acredita el diagnóstico y la orden médica."),
                    item("Cédula de ciudadanía", "identifica al accionante."),
                ],
                missing: vec![EvidenceItem { name: "Negativa de la EPS".into(), reason: None }],
            }),
            ..Default::default()
        }]
    }

    fn query<'a>(q: &'a str, docs: &'a [LegalDocument]) -> Query<'a> {
        Query { raw: q, normalized: normalize(q), documents: docs, language: Language::Es }
    }

    #[test]
    fn test_why_complies_matches_item() {
        let d = docs();
        let answer = extract(&query("¿Por qué la historia clínica cumple como prueba?", &d)).unwrap();
        assert_eq!(answer, "\"Historia clínica\" cumple porque acredita el diagnóstico y la orden médica.");
    }

    #[test]
    fn test_checklist_dump_with_counts() {
        let d = docs();
        let answer = extract(&query("¿Qué pruebas tengo?", &d)).unwrap();
        assert!(answer.starts_with("Lista de pruebas: 2 aportadas, 1 faltantes."));
        assert!(answer.contains("✅ Cédula de ciudadanía (identifica al accionante.)"));
        assert!(answer.contains("❌ Negativa de la EPS"));
    }

    #[test]
    fn test_no_checklist_declines() {
        let d = vec![LegalDocument::default()];
        assert!(extract(&query("¿Qué pruebas tengo?", &d)).is_none());
    }
}
