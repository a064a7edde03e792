// Builds the system and user prompts from persisted memory and cached turns

use themis_persist::{memory::tail_chars, Attachment, Sender, ThreadMeta, UserMemory};

use crate::cache::CachedMessage;
use crate::language::Language;
use crate::scenario::prompt_for;

pub const SUMMARY_TAIL_CHARS: usize = 4_000;
pub const OTHER_THREADS: usize = 10;
pub const ATTACHMENT_CHARS: usize = 20_000;

struct Labels {
    summary: &'static str,
    history: &'static str,
    others: &'static str,
    facts: &'static str,
    transcript: &'static str,
    attachments: &'static str,
    question: &'static str,
    user: &'static str,
    assistant: &'static str,
    untitled: &'static str,
}

fn labels(language: Language) -> Labels {
    match language {
        Language::Es => Labels {
            summary: "Resumen de esta conversación",
            history: "Intercambios recientes",
            others: "Otras conversaciones del usuario",
            facts: "Datos conocidos del usuario",
            transcript: "Conversación reciente",
            attachments: "Documentos adjuntos",
            question: "Pregunta actual",
            user: "Usuario",
            assistant: "Asistente",
            untitled: "Sin título",
        },
        Language::En => Labels {
            summary: "Summary of this conversation",
            history: "Recent exchanges",
            others: "Other conversations of the user",
            facts: "Known facts about the user",
            transcript: "Recent conversation",
            attachments: "Attached documents",
            question: "Current question",
            user: "User",
            assistant: "Assistant",
            untitled: "Untitled",
        },
        Language::Pt => Labels {
            summary: "Resumo desta conversa",
            history: "Trocas recentes",
            others: "Outras conversas do usuário",
            facts: "Fatos conhecidos do usuário",
            transcript: "Conversa recente",
            attachments: "Documentos anexados",
            question: "Pergunta atual",
            user: "Usuário",
            assistant: "Assistente",
            untitled: "Sem título",
        },
    }
}

/// Everything known about the turn being answered
pub struct PromptContext<'a> {
    pub scenario: &'a str,
    pub language: Language,
    pub thread_id: &'a str,
    pub thread: Option<&'a ThreadMeta>,
    pub user: Option<&'a UserMemory>,
    pub cached: &'a [CachedMessage],
    pub attachments: &'a [Attachment],
    pub question: &'a str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssembledPrompt {
    pub system: String,
    pub user: String,
}

#[derive(Debug, Clone)]
pub struct PromptAssembler {
    summary_tail_chars: usize,
    other_threads: usize,
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self {
            summary_tail_chars: SUMMARY_TAIL_CHARS,
            other_threads: OTHER_THREADS,
        }
    }
}

impl PromptAssembler {
    pub fn new(summary_tail_chars: usize, other_threads: usize) -> Self {
        Self {
            summary_tail_chars,
            other_threads,
        }
    }

    pub fn assemble(&self, ctx: &PromptContext<'_>) -> AssembledPrompt {
        AssembledPrompt {
            system: self.system_prompt(ctx),
            user: self.user_prompt(ctx),
        }
    }

    fn system_prompt(&self, ctx: &PromptContext<'_>) -> String {
        let l = labels(ctx.language);
        let mut sections = vec![prompt_for(ctx.scenario, ctx.language).to_string()];

        if let Some(thread) = ctx.thread {
            let summary = thread.summary.trim();
            if !summary.is_empty() {
                sections.push(format!(
                    "## {}\n{}",
                    l.summary,
                    tail_chars(summary, self.summary_tail_chars)
                ));
            }

            if !thread.short_history.is_empty() {
                let turns: Vec<String> = thread
                    .short_history
                    .iter()
                    .map(|t| format!("{}: {}", speaker(&l, t.sender), t.text.trim()))
                    .collect();
                sections.push(format!("## {}\n{}", l.history, turns.join("\n")));
            }
        }

        if let Some(user) = ctx.user {
            let others: Vec<String> = user
                .recent_threads
                .iter()
                .filter(|t| t.thread_id != ctx.thread_id)
                .take(self.other_threads)
                .map(|t| {
                    let title = t.title.as_deref().unwrap_or(l.untitled);
                    if t.summary.trim().is_empty() {
                        format!("- {} [{}]", title, t.scenario)
                    } else {
                        format!("- {} [{}]: {}", title, t.scenario, t.summary.trim().replace('\n', " "))
                    }
                })
                .collect();
            if !others.is_empty() {
                sections.push(format!("## {}\n{}", l.others, others.join("\n")));
            }

            if !user.facts.is_empty() {
                let facts: Vec<String> = user.facts.iter().map(|f| format!("- {}", f)).collect();
                sections.push(format!("## {}\n{}", l.facts, facts.join("\n")));
            }
        }

        sections.join("\n\n")
    }

    fn user_prompt(&self, ctx: &PromptContext<'_>) -> String {
        let l = labels(ctx.language);
        let mut sections = Vec::new();

        if !ctx.cached.is_empty() {
            let transcript: Vec<String> = ctx
                .cached
                .iter()
                .map(|m| format!("{}: {}", speaker(&l, m.sender), m.text.trim()))
                .collect();
            sections.push(format!("## {}\n{}", l.transcript, transcript.join("\n")));
        }

        let attached: Vec<String> = ctx
            .attachments
            .iter()
            .filter_map(|a| {
                let text = a.text.as_deref()?.trim();
                if text.is_empty() {
                    return None;
                }
                Some(format!(
                    "### {}\n{}",
                    a.name,
                    themis_persist::memory::truncate_chars(text, ATTACHMENT_CHARS)
                ))
            })
            .collect();
        if !attached.is_empty() {
            sections.push(format!("## {}\n{}", l.attachments, attached.join("\n\n")));
        }

        sections.push(format!("## {}\n{}", l.question, ctx.question.trim()));
        sections.join("\n\n")
    }
}

fn speaker(l: &Labels, sender: Sender) -> &'static str {
    match sender {
        Sender::User => l.user,
        Sender::Assistant => l.assistant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use themis_persist::{RecentThread, UserIdentity};

    fn recent(id: &str, title: &str) -> RecentThread {
        RecentThread {
            thread_id: id.into(),
            scenario: "general".into(),
            title: Some(title.into()),
            summary: format!("resumen de {}", title),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_system_prompt_sections_in_order() {
        let owner = UserIdentity::new("u1", "ana@firm.co");
        let mut thread = ThreadMeta::new("t1", "jurisprudence", &owner, None);
        thread.summary = "Usuario: hola\nAsistente: buenas".into();

        let mut user = UserMemory::new("ana@firm.co");
        user.recent_threads = vec![recent("t1", "Esta"), recent("t2", "Tutela salud")];
        user.facts = vec!["Litiga en Cali".into()];

        let ctx = PromptContext {
            scenario: "jurisprudence",
            language: Language::Es,
            thread_id: "t1",
            thread: Some(&thread),
            user: Some(&user),
            cached: &[],
            attachments: &[],
            question: "¿Qué dice la T-123-45?",
        };
        let prompt = PromptAssembler::default().assemble(&ctx);

        let summary = prompt.system.find("## Resumen de esta conversación").unwrap();
        let others = prompt.system.find("## Otras conversaciones del usuario").unwrap();
        let facts = prompt.system.find("## Datos conocidos del usuario").unwrap();
        assert!(prompt.system.starts_with("Eres un asistente experto en jurisprudencia"));
        assert!(summary < others && others < facts);
        assert!(prompt.system.contains("- Tutela salud [general]: resumen de Tutela salud"));
        assert!(!prompt.system.contains("- Esta [general]"));
    }

    #[test]
    fn test_user_prompt_transcript_attachments_question() {
        let cached = vec![
            CachedMessage::new(Sender::User, "hola"),
            CachedMessage::new(Sender::Assistant, "¿en qué te ayudo?"),
        ];
        let attachments = vec![
            Attachment { name: "hechos.txt".into(), mime_type: None, text: Some("El 3 de mayo...".into()) },
            Attachment { name: "vacío.pdf".into(), mime_type: None, text: None },
        ];
        let ctx = PromptContext {
            scenario: "general",
            language: Language::Es,
            thread_id: "t1",
            thread: None,
            user: None,
            cached: &cached,
            attachments: &attachments,
            question: "Redacta la tutela",
        };
        let user = PromptAssembler::default().assemble(&ctx).user;

        assert_eq!(
            user,
            "## Conversación reciente\nUsuario: hola\nAsistente: ¿en qué te ayudo?\n\n\
             ## Documentos adjuntos\n### hechos.txt\nEl 3 de mayo...\n\n\
             ## Pregunta actual\nRedacta la tutela"
        );
    }
}
