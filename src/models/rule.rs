use serde::{Deserialize, Serialize};

/// Decision a policy rule applies when its pattern matches.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    #[default]
    Block,
    Allow,
}

impl std::fmt::Display for RuleAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuleAction::Block => write!(f, "block"),
            RuleAction::Allow => write!(f, "allow"),
        }
    }
}

impl std::str::FromStr for RuleAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(RuleAction::Block),
            "allow" => Ok(RuleAction::Allow),
            other => Err(format!("unknown rule action '{}' (expected block or allow)", other)),
        }
    }
}

/// Rule being composed by an admin, posted as-is to `POST /rules`.
///
/// `pattern` is a regular expression but is never compiled locally; the
/// gateway is the only judge of its validity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleDraft {
    pub pattern: String,
    pub action: RuleAction,
    pub description: String,
}

impl RuleDraft {
    pub fn new(pattern: impl Into<String>, action: RuleAction, description: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            action,
            description: description.into(),
        }
    }
}
