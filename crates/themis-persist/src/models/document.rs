use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Structured legal document as read by the quick-answer matchers
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LegalDocument {
    pub id: String,
    pub user_id: String,
    pub title: Option<String>,
    /// Free-text body
    pub content: String,
    /// Labelled values, e.g. `demandante`, `accionado`
    pub fields: BTreeMap<String, String>,
    pub rulings: Vec<Ruling>,
    pub evidence: Option<EvidenceChecklist>,
    /// Constitutional text with `Articulo N.` headers
    pub constitution: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ruling {
    pub providencia: String,
    pub magistrado: Option<String>,
    pub expediente: Option<String>,
    pub derechos: Vec<String>,
    pub fecha: Option<String>,
    pub url: Option<String>,
    pub resumen: Option<String>,
    pub tema: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceChecklist {
    pub satisfied: Vec<EvidenceItem>,
    pub missing: Vec<EvidenceItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvidenceItem {
    pub name: String,
    pub reason: Option<String>,
}

impl LegalDocument {
    /// Every free-text source of the document, labelled fields first
    pub fn text_sources(&self) -> impl Iterator<Item = &str> {
        self.fields
            .values()
            .map(String::as_str)
            .chain(std::iter::once(self.content.as_str()))
            .filter(|s| !s.trim().is_empty())
    }
}
