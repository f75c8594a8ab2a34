use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Assistant => "Assistant",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPostInput {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ConversationMessage>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default = "default_true")]
    pub include_knowledge_base: bool,
    #[serde(default = "default_true")]
    pub include_community_qa: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPostOutput {
    pub response: String,
    pub remaining: u32,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn chat_input_defaults_enable_both_sources() {
        let input: ChatPostInput =
            serde_json::from_str(r#"{"message":"What is a C&P exam?"}"#).unwrap();
        assert!(input.include_knowledge_base);
        assert!(input.include_community_qa);
        assert!(input.history.is_empty());
        assert!(input.user_id.is_none());
    }

    #[test]
    fn roles_are_lowercase_on_the_wire() {
        let msg: ConversationMessage =
            serde_json::from_str(r#"{"role":"assistant","content":"Hi"}"#).unwrap();
        assert_eq!(msg, ConversationMessage::assistant("Hi"));
        assert_eq!(
            serde_json::to_string(&ConversationMessage::user("x")).unwrap(),
            r#"{"role":"user","content":"x"}"#
        );
    }
}
