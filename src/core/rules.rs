//! Named matching rules used by the classifier.
//!
//! The user-agent rule is case-insensitive (the user-agent is lowercased
//! before searching) while the owner denylist is a case-sensitive literal
//! containment test. Both behaviours are intentional.

use regex::RegexSet;

use crate::utils::BotResult;

/// Searches a user-agent for any configured bot pattern.
#[derive(Debug, Clone)]
pub struct UserAgentRule {
    patterns: RegexSet,
}

impl UserAgentRule {
    /// Compile the patterns. They are matched against the lowercased
    /// user-agent, so they should be written in lower case.
    pub fn new<I, S>(patterns: I) -> BotResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            patterns: RegexSet::new(patterns)?,
        })
    }

    /// True when any pattern is found anywhere in the lowercased user-agent.
    pub fn matches(&self, user_agent: &str) -> bool {
        self.patterns.is_match(&user_agent.to_lowercase())
    }
}

/// Flags network owners whose name contains a denylisted operator.
#[derive(Debug, Clone, Default)]
pub struct OwnerDenylist {
    entries: Vec<String>,
}

impl OwnerDenylist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    /// True when `owner` contains any entry verbatim.
    pub fn is_flagged(&self, owner: &str) -> bool {
        self.entries.iter().any(|entry| owner.contains(entry.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
