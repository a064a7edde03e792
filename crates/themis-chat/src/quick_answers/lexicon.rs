// Constant tables for the quick-answer matchers

use crate::language::Language;

/// Labelled fields checked before free text for the plaintiff's name
pub const PARTY_FIELD_KEYS: &[&str] = &["demandante", "accionante", "actor", "tutelante", "peticionario"];

/// Tokens that mark an unfilled template rather than a real name
pub const NAME_PLACEHOLDERS: &[&str] = &[
    "nombre", "nombres", "apellido", "apellidos", "name", "xxx", "xxxx", "completo", "demandante",
];

pub const MAX_NAME_TOKENS: usize = 6;

pub const RULING_KEYWORDS: &[&str] = &[
    "sentencia", "sentencias", "providencia", "providencias", "jurisprudencia", "fallo", "fallos",
    "precedente", "precedentes", "ruling", "rulings", "judgment", "judgments", "acordao", "decisao",
    "decisoes",
];

pub const RULING_LIST_WORDS: &[&str] = &[
    "lista", "listado", "listar", "enumera", "enumerar", "cuales", "cuantas", "todas", "muestrame",
    "list", "show", "all", "which", "quais", "liste",
];

pub const MAX_RULING_ROWS: usize = 8;

/// (field, trigger words) for ruling sub-intents, in output order
pub const RULING_FIELDS: &[(RulingField, &[&str])] = &[
    (RulingField::Magistrado, &["magistrado", "magistrada", "ponente", "magistrate", "judge", "juez", "relator"]),
    (RulingField::Expediente, &["expediente", "radicado", "radicacion", "docket", "processo"]),
    (RulingField::Derechos, &["derechos", "derecho", "rights", "right", "direitos", "direito"]),
    (RulingField::Fecha, &["fecha", "cuando", "date", "when", "data", "quando"]),
    (RulingField::Url, &["url", "enlace", "link", "vinculo"]),
    (RulingField::Resumen, &["resumen", "resume", "summary", "summarize", "resumo", "trata"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulingField {
    Magistrado,
    Expediente,
    Derechos,
    Fecha,
    Url,
    Resumen,
}

impl RulingField {
    pub fn label(&self, language: Language) -> &'static str {
        match (self, language) {
            (RulingField::Magistrado, Language::En) => "Reporting justice",
            (RulingField::Magistrado, Language::Pt) => "Relator",
            (RulingField::Magistrado, Language::Es) => "Magistrado ponente",
            (RulingField::Expediente, Language::En) => "File number",
            (RulingField::Expediente, Language::Pt) => "Processo",
            (RulingField::Expediente, Language::Es) => "Expediente",
            (RulingField::Derechos, Language::En) => "Rights",
            (RulingField::Derechos, Language::Pt) => "Direitos",
            (RulingField::Derechos, Language::Es) => "Derechos",
            (RulingField::Fecha, Language::En) => "Date",
            (RulingField::Fecha, Language::Pt) => "Data",
            (RulingField::Fecha, Language::Es) => "Fecha",
            (RulingField::Url, _) => "URL",
            (RulingField::Resumen, Language::En) => "Summary",
            (RulingField::Resumen, Language::Pt) => "Resumo",
            (RulingField::Resumen, Language::Es) => "Resumen",
        }
    }
}

pub const EVIDENCE_KEYWORDS: &[&str] = &[
    "prueba", "pruebas", "evidencia", "evidencias", "soporte", "soportes", "anexo", "anexos",
    "evidence", "proof", "proofs", "prova", "provas",
];

pub const WHY_WORDS: &[&str] = &["por que", "porque", "why", "por qu"];

pub const COMPLY_WORDS: &[&str] = &[
    "cumple", "cumplen", "satisface", "satisfacen", "valida", "sirve", "comply", "complies",
    "satisfies", "satisfy", "qualifies", "cumpre", "atende",
];

/// Words ignored when matching a question against evidence names
pub const EVIDENCE_STOPWORDS: &[&str] = &[
    "por", "que", "porque", "cumple", "prueba", "pruebas", "evidencia", "esta", "este", "como",
    "why", "does", "the", "comply", "evidence", "with", "para", "sobre", "cual",
];

pub const ARTICLE_WORDS: &[&str] = &["articulo", "articulos", "article", "articles", "artigo", "artigos"];

pub const SUPPORT_VERBS: &[&str] = &[
    "protege", "protegen", "ampara", "amparan", "respalda", "respaldan", "garantiza", "garantizan",
    "consagra", "consagran", "reconoce", "reconocen", "fundamenta", "fundamentan", "aplica", "aplican",
    "protect", "protects", "support", "supports", "guarantee", "guarantees", "cover", "covers",
    "protegem", "garantem", "amparam",
];

/// Score weight for keywords of at least `LONG_KEYWORD_CHARS` chars
pub const LONG_KEYWORD_WEIGHT: usize = 2;
pub const LONG_KEYWORD_CHARS: usize = 8;
pub const TOP_ARTICLES: usize = 3;
pub const SECONDARY_ARTICLES: usize = 5;
pub const SNIPPET_RADIUS: usize = 120;

pub struct RightEntry {
    pub right: &'static str,
    /// Folded phrases that name the right in a question
    pub triggers: &'static [&'static str],
    /// Folded synonyms searched in article bodies
    pub keywords: &'static [&'static str],
}

pub const RIGHTS_LEXICON: &[RightEntry] = &[
    RightEntry {
        right: "salud",
        triggers: &["salud", "health", "saude", "medic", "eps"],
        keywords: &["salud", "seguridad social", "atencion", "saneamiento", "enfermedad", "servicio publico"],
    },
    RightEntry {
        right: "educacion",
        triggers: &["educacion", "education", "educacao", "escuela", "colegio"],
        keywords: &["educacion", "ensenanza", "cultura", "escolar", "formacion"],
    },
    RightEntry {
        right: "trabajo",
        triggers: &["trabajo", "laboral", "empleo", "work", "labor", "employment", "trabalho"],
        keywords: &["trabajo", "trabajador", "trabajadores", "salario", "laboral", "empleo"],
    },
    RightEntry {
        right: "vivienda",
        triggers: &["vivienda", "housing", "moradia", "hogar"],
        keywords: &["vivienda", "digna", "habitacion"],
    },
    RightEntry {
        right: "debido proceso",
        triggers: &["debido proceso", "due process", "devido processo", "defensa"],
        keywords: &["debido proceso", "juzgado", "defensa", "juez", "tribunal competente", "presuncion"],
    },
    RightEntry {
        right: "igualdad",
        triggers: &["igualdad", "equality", "igualdade", "discrimin"],
        keywords: &["igualdad", "iguales", "discriminacion", "proteccion"],
    },
    RightEntry {
        right: "vida",
        triggers: &["vida", "life"],
        keywords: &["vida", "inviolable", "pena de muerte"],
    },
    RightEntry {
        right: "intimidad",
        triggers: &["intimidad", "privacidad", "privacy", "habeas data", "privacidade"],
        keywords: &["intimidad", "buen nombre", "habeas data", "correspondencia", "informaciones"],
    },
    RightEntry {
        right: "libertad de expresion",
        triggers: &["expresion", "expression", "expressao", "prensa", "opinion"],
        keywords: &["expresar", "difundir", "pensamiento", "opiniones", "informar", "censura"],
    },
    RightEntry {
        right: "peticion",
        triggers: &["peticion", "petition", "peticao"],
        keywords: &["peticiones", "respetuosas", "pronta resolucion", "autoridades"],
    },
];

/// Whole-word membership of any single word from `list` in a normalized text
pub fn contains_word(normalized: &str, list: &[&str]) -> bool {
    crate::text::words(normalized).any(|w| list.contains(&w))
}

/// Substring membership of any phrase from `list`
pub fn contains_phrase(normalized: &str, list: &[&str]) -> bool {
    list.iter().any(|p| normalized.contains(p))
}
