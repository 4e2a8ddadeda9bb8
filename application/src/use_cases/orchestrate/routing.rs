//! Routing engine: which agent handles an incoming user message.

use forge_domain::{AgentType, ConversationMessage, MessageRole, OrchestratorState};

/// Ordered (target, keywords) table. The first rule with a matching keyword wins.
pub const ROUTING_RULES: &[(AgentType, &[&str])] = &[
    (
        AgentType::Coder,
        &[
            "implement",
            "write code",
            "generate code",
            "fix the code",
            "refactor",
            "coding",
            "function",
            "endpoint",
        ],
    ),
    (AgentType::Test, &["test", "unit test", "coverage", "qa"]),
    (
        AgentType::Security,
        &[
            "security",
            "secure",
            "vulnerab",
            "exploit",
            "injection",
            "xss",
            "csrf",
            "audit",
        ],
    ),
    (
        AgentType::Product,
        &[
            "requirement",
            "user story",
            "user stories",
            "feature request",
            "acceptance criteria",
            "story",
        ],
    ),
];

/// Pick the agent for the newest message.
///
/// A session without a current agent, or one whose newest message is a
/// system message, always starts at Product. Otherwise a keyword in the
/// newest user message overrides session continuity.
pub fn route_user_message(state: &OrchestratorState, history: &[ConversationMessage]) -> AgentType {
    let Some(current) = state.current_agent else {
        return AgentType::Product;
    };
    if history
        .last()
        .is_some_and(|m| m.role == MessageRole::System)
    {
        return AgentType::Product;
    }

    history
        .iter()
        .rev()
        .find(|m| m.is_user())
        .and_then(|m| match_keywords(&m.content))
        .unwrap_or(current)
}

/// First rule whose keyword starts a word in `text`.
pub fn match_keywords(text: &str) -> Option<AgentType> {
    let lowered = text.to_lowercase();
    ROUTING_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| starts_word(&lowered, k)))
        .map(|(target, _)| *target)
}

fn starts_word(haystack: &str, keyword: &str) -> bool {
    haystack.match_indices(keyword).any(|(idx, _)| {
        haystack[..idx]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric())
    })
}
