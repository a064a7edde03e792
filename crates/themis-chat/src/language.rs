use serde::{Deserialize, Serialize};

use unicode_normalization::UnicodeNormalization;

use crate::text::words;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Es,
    En,
    Pt,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
            Language::Pt => "pt",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "es" => Some(Language::Es),
            "en" => Some(Language::En),
            "pt" => Some(Language::Pt),
            _ => None,
        }
    }

    /// Prepended to the system prompt of every relayed completion
    pub fn instruction(&self) -> &'static str {
        match self {
            Language::Es => "Responde siempre en español, con un tono profesional y claro.",
            Language::En => "Always answer in English, in a clear and professional tone.",
            Language::Pt => "Responda sempre em português, com um tom profissional e claro.",
        }
    }

    /// Shown to the user when the completion endpoint fails
    pub fn upstream_fallback(&self) -> &'static str {
        match self {
            Language::Es => "No fue posible generar una respuesta en este momento. Intenta de nuevo en unos minutos.",
            Language::En => "We could not generate a response right now. Please try again in a few minutes.",
            Language::Pt => "Não foi possível gerar uma resposta agora. Tente novamente em alguns minutos.",
        }
    }

    pub fn ownership_denied(&self) -> &'static str {
        match self {
            Language::Es => "Esta conversación pertenece a otro usuario.",
            Language::En => "This conversation belongs to another user.",
            Language::Pt => "Esta conversa pertence a outro usuário.",
        }
    }
}

const SPANISH_MARKS: &[char] = &['ñ', '¿', '¡'];
const PORTUGUESE_MARKS: &[char] = &['ã', 'õ', 'ç', 'â', 'ê', 'ô', 'à'];

const SPANISH_KEYWORDS: &[&str] = &[
    "el", "los", "las", "del", "que", "por", "una", "es", "cual", "cuál", "qué", "como", "cómo",
    "pero", "muy", "esta", "este", "hola", "gracias", "sentencia", "demandante", "derecho",
    "derechos", "usted", "puedes", "necesito", "sobre", "tiene", "hay", "según",
];
const ENGLISH_KEYWORDS: &[&str] = &[
    "the", "and", "what", "which", "is", "of", "for", "with", "please", "ruling", "plaintiff",
    "how", "who", "does", "this", "that", "are", "rights", "can", "you", "about", "have",
    "court", "law", "summary",
];
const PORTUGUESE_KEYWORDS: &[&str] = &[
    "não", "nao", "você", "voce", "obrigado", "obrigada", "olá", "uma", "um", "isso", "do", "da",
    "dos", "das", "em", "no", "na", "ação", "direito", "direitos", "qual", "quais", "sobre",
    "preciso", "pode", "tem", "autor",
];

fn keyword_score(tokens: &[&str], keywords: &[&str]) -> usize {
    tokens.iter().filter(|t| keywords.contains(t)).count()
}

/// Guess es, en or pt from raw text
pub fn detect(text: &str) -> Language {
    let lower = text.nfc().collect::<String>().to_lowercase();

    let has_es = lower.chars().any(|c| SPANISH_MARKS.contains(&c));
    let has_pt = lower.chars().any(|c| PORTUGUESE_MARKS.contains(&c));
    match (has_es, has_pt) {
        (true, false) => return Language::Es,
        (false, true) => return Language::Pt,
        _ => {}
    }

    let tokens: Vec<&str> = words(&lower).collect();
    let mut scores = [
        (Language::Es, keyword_score(&tokens, SPANISH_KEYWORDS)),
        (Language::En, keyword_score(&tokens, ENGLISH_KEYWORDS)),
        (Language::Pt, keyword_score(&tokens, PORTUGUESE_KEYWORDS)),
    ];
    scores.sort_by(|a, b| b.1.cmp(&a.1));
    if scores[0].1 > 0 && scores[0].1 > scores[1].1 {
        return scores[0].0;
    }

    if has_pt {
        Language::Pt
    } else if lower.chars().any(|c| c.is_alphabetic() && !c.is_ascii()) {
        Language::Es
    } else if lower.is_ascii() {
        Language::En
    } else {
        Language::Es
    }
}
