// Plaintiff name lookup

use std::sync::LazyLock;

use regex::Regex;

use super::lexicon::{MAX_NAME_TOKENS, NAME_PLACEHOLDERS, PARTY_FIELD_KEYS};
use super::Query;
use crate::language::Language;
use crate::text::fold;

static TRIGGER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(apellidos?|nombres?|nombre completo|quien es|surname|last name|first name|full name|name|who is|sobrenome|nome|quem e)\b.*\b(del|de la|de|of the|of|do|da)?\s*(demandante|accionante|actor|actora|tutelante|peticionario|peticionaria|plaintiff|claimant|petitioner|requerente|autor)\b",
    )
    .expect("valid party trigger")
});

/// Labelled patterns scanned in document text, in priority order
static LABELLED: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"(?i)\bDEMANDANTE\s*:\s*([^\n,;]+)",
        r"(?i)\bYo\s*,\s*([^,\n]+),",
        r"(?i)\bACCIONANTE\s*:\s*([^\n,;]+)",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("valid party pattern"))
    .collect()
});

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[[^\]]*\]|<[^>]*>|\{[^}]*\}").expect("valid placeholder pattern"));

pub fn triggers(query: &Query<'_>) -> bool {
    TRIGGER.is_match(&query.normalized)
}

pub fn extract(query: &Query<'_>) -> Option<String> {
    let tokens = find_name(query)?;
    let name = PartyName::split(&tokens);

    let wants_surname = query.normalized.contains("apellido")
        || query.normalized.contains("surname")
        || query.normalized.contains("last name")
        || query.normalized.contains("sobrenome");
    let wants_given = !wants_surname
        && (query.normalized.contains("first name") || query.normalized.contains("nombres del"));

    let answer = match (query.language, wants_surname, wants_given) {
        (Language::En, true, _) => format!("The plaintiff's surname is {}.", name.surnames),
        (Language::En, _, true) => format!("The plaintiff's first name is {}.", name.given),
        (Language::En, _, _) => format!(
            "The plaintiff is {} (first name: {}; surname: {}).",
            name.full, name.given, name.surnames
        ),
        (Language::Pt, true, _) => format!("O sobrenome do autor é {}.", name.surnames),
        (Language::Pt, _, true) => format!("O nome do autor é {}.", name.given),
        (Language::Pt, _, _) => format!(
            "O autor é {} (nome: {}; sobrenome: {}).",
            name.full, name.given, name.surnames
        ),
        (Language::Es, true, _) => format!("El apellido del demandante es {}.", name.surnames),
        (Language::Es, _, true) => format!("Los nombres del demandante son {}.", name.given),
        (Language::Es, _, _) => format!(
            "El demandante es {} (nombres: {}; apellidos: {}).",
            name.full, name.given, name.surnames
        ),
    };
    Some(answer)
}

fn find_name(query: &Query<'_>) -> Option<Vec<String>> {
    for doc in query.documents {
        for (key, value) in &doc.fields {
            if PARTY_FIELD_KEYS.contains(&fold(key).as_str()) {
                if let Some(tokens) = clean_candidate(value) {
                    return Some(tokens);
                }
            }
        }
    }

    for pattern in LABELLED.iter() {
        for doc in query.documents {
            for source in doc.text_sources() {
                for caps in pattern.captures_iter(source) {
                    if let Some(tokens) = caps.get(1).and_then(|m| clean_candidate(m.as_str())) {
                        return Some(tokens);
                    }
                }
            }
        }
    }
    None
}

/// Strip placeholders and punctuation; keep plausible multi-token names only
fn clean_candidate(raw: &str) -> Option<Vec<String>> {
    let stripped = PLACEHOLDER.replace_all(raw, " ");
    let tokens: Vec<String> = stripped
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| !c.is_alphabetic()).to_string())
        .filter(|t| !t.is_empty() && t.chars().all(|c| c.is_alphabetic() || c == '-' || c == '\''))
        .collect();

    if tokens.len() < 2 || tokens.len() > MAX_NAME_TOKENS {
        return None;
    }
    if tokens.iter().any(|t| NAME_PLACEHOLDERS.contains(&fold(t).as_str())) {
        return None;
    }

    let shouting = tokens.iter().all(|t| !t.chars().any(char::is_lowercase));
    Some(if shouting { tokens.iter().map(|t| title_case(t)).collect() } else { tokens })
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

struct PartyName {
    full: String,
    given: String,
    surnames: String,
}

impl PartyName {
    /// Four or more tokens: two given names; three: one given name and two surnames
    fn split(tokens: &[String]) -> Self {
        let given_count = match tokens.len() {
            n if n >= 4 => 2,
            _ => 1,
        };
        Self {
            full: tokens.join(" "),
            given: tokens[..given_count].join(" "),
            surnames: tokens[given_count..].join(" "),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::normalize;
    use std::collections::BTreeMap;
    use themis_persist::LegalDocument;

    fn query<'a>(q: &'a str, docs: &'a [LegalDocument], language: Language) -> Query<'a> {
        Query { raw: q, normalized: normalize(q), documents: docs, language }
    }

    fn doc(content: &str) -> LegalDocument {
        LegalDocument { content: content.into(), ..Default::default() }
    }

    #[test]
    fn test_triggers() {
        let docs = [];
        assert!(triggers(&query("¿Cuál es el apellido del demandante?", &docs, Language::Es)));
        assert!(triggers(&query("What is the surname of the plaintiff?", &docs, Language::En)));
        assert!(!triggers(&query("¿Qué dice la sentencia?", &docs, Language::Es)));
    }

    #[test]
    fn test_labelled_field_split_by_position() {
        let docs = [doc("DEMANDANTE: ANA MARÍA PÉREZ GÓMEZ\nDEMANDADO: X")];
        let answer = extract(&query("apellido del demandante", &docs, Language::Es)).unwrap();
        assert_eq!(answer, "El apellido del demandante es Pérez Gómez.");
    }

    #[test]
    fn test_placeholders_are_skipped() {
        let docs = [doc("DEMANDANTE: [NOMBRE COMPLETO]\nYo, Luis Carlos Rojas, mayor de edad")];
        let answer = extract(&query("nombre completo del accionante", &docs, Language::Es)).unwrap();
        assert!(answer.contains("Luis Carlos Rojas"));
        assert!(answer.contains("apellidos: Carlos Rojas"));
    }

    #[test]
    fn test_structured_field_wins() {
        let mut fields = BTreeMap::new();
        fields.insert("Demandante".to_string(), "Marta Ruiz".to_string());
        let docs = [LegalDocument { fields, content: "DEMANDANTE: Otro Nombre Aqui".into(), ..Default::default() }];
        let answer = extract(&query("name of the plaintiff", &docs, Language::En)).unwrap();
        assert_eq!(answer, "The plaintiff is Marta Ruiz (first name: Marta; surname: Ruiz).");
    }

    #[test]
    fn test_single_token_declines() {
        let docs = [doc("DEMANDANTE: Ana")];
        assert!(extract(&query("apellido del demandante", &docs, Language::Es)).is_none());
    }
}
