use serde::{Deserialize, Serialize};

/// Chat message sent to the completion endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// System prompt (instructions)
    System {
        content: String,
    },

    /// User/Human message
    #[serde(rename = "user")]
    Human {
        content: String,
    },

    /// Assistant message (replayed history)
    #[serde(rename = "assistant")]
    AI {
        content: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System { content: content.into() }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::Human { content: content.into() }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::AI { content: content.into() }
    }

    /// Get role as string
    pub fn role(&self) -> &str {
        match self {
            Self::System { .. } => "system",
            Self::Human { .. } => "user",
            Self::AI { .. } => "assistant",
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::System { content } | Self::Human { content } | Self::AI { content } => content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(Message::human("hola")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "user", "content": "hola"}));

        let json = serde_json::to_value(Message::system("sys")).unwrap();
        assert_eq!(json["role"], "system");
    }
}
