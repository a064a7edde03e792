pub mod error;
pub mod text;
pub mod language;
pub mod scenario;
pub mod cache;
pub mod ownership;
pub mod quick_answers;
pub mod relay;
pub mod reflow;
pub mod prompt;
pub mod orchestrator;

pub use error::{ChatError, Result};
pub use language::{detect, Language};
pub use scenario::{prompt_for, Scenario};
pub use cache::{CachedMessage, InProcessCache, KeyValueCache, MessageCache};
pub use ownership::{OwnerCheck, OwnershipRegistry};
pub use quick_answers::{try_quick_answer, QuickAnswer};
pub use relay::CompletionRelay;
pub use reflow::reflow;
pub use prompt::{AssembledPrompt, PromptAssembler};
pub use orchestrator::{ChatConfig, ChatEvent, ChatOrchestrator, MessageTurn};

// Re-export the storage types callers hand to the orchestrator
pub use themis_persist::{Attachment, DBMessage, ThreadMeta, UserIdentity, UserMemory};
