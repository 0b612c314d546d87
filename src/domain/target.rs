use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier for one supported chat site.
///
/// The derive order defines the aggregation order used everywhere a
/// per-target listing is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetId {
    Chatgpt,
    Claude,
    Askme,
}

impl TargetId {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetId::Chatgpt => "chatgpt",
            TargetId::Claude => "claude",
            TargetId::Askme => "askme",
        }
    }

    /// All targets in registry order.
    pub fn all() -> [TargetId; 3] {
        [TargetId::Chatgpt, TargetId::Claude, TargetId::Askme]
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chatgpt" => Ok(TargetId::Chatgpt),
            "claude" => Ok(TargetId::Claude),
            "askme" => Ok(TargetId::Askme),
            other => Err(format!("unknown target: {}", other)),
        }
    }
}

/// Static descriptor for one chat site: where its tab lives and how it is
/// presented. Defined once at startup, never mutated.
#[derive(Debug, Clone)]
pub struct Target {
    pub id: TargetId,
    pub display_name: &'static str,
    /// Tab URL pattern in `https://host/*` form.
    pub url_pattern: &'static str,
}

impl Target {
    /// Check whether an open tab's URL falls under this target's pattern.
    ///
    /// Patterns use the trailing-`/*` convention of extension match
    /// patterns; anything else is an exact match.
    pub fn matches_url(&self, url: &str) -> bool {
        match self.url_pattern.strip_suffix("/*") {
            Some(prefix) => {
                url == prefix || url.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'))
            }
            None => url == self.url_pattern,
        }
    }
}

/// Look up the descriptor for a target id.
pub fn target(id: TargetId) -> &'static Target {
    REGISTRY
        .iter()
        .find(|t| t.id == id)
        .expect("registry covers every TargetId")
}

/// The full registry, in aggregation order.
pub fn registry() -> &'static [Target] {
    REGISTRY
}

static REGISTRY: &[Target] = &[
    Target {
        id: TargetId::Chatgpt,
        display_name: "ChatGPT",
        url_pattern: "https://chatgpt.com/*",
    },
    Target {
        id: TargetId::Claude,
        display_name: "Claude",
        url_pattern: "https://claude.ai/*",
    },
    Target {
        id: TargetId::Askme,
        display_name: "AskMe",
        url_pattern: "https://askme.mobileye.com/*",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_covers_all_ids() {
        for id in TargetId::all() {
            assert_eq!(target(id).id, id);
        }
        assert_eq!(registry().len(), TargetId::all().len());
    }

    #[test]
    fn test_parse_target_id() {
        assert_eq!("chatgpt".parse::<TargetId>(), Ok(TargetId::Chatgpt));
        assert_eq!(" Claude ".parse::<TargetId>(), Ok(TargetId::Claude));
        assert!("gemini".parse::<TargetId>().is_err());
    }

    #[test]
    fn test_pattern_matches_paths_under_host() {
        let t = target(TargetId::Chatgpt);
        assert!(t.matches_url("https://chatgpt.com/c/abc123"));
        assert!(t.matches_url("https://chatgpt.com"));
        assert!(!t.matches_url("https://claude.ai/new"));
        assert!(!t.matches_url("https://chatgpt.com.evil.example/"));
    }

    #[test]
    fn test_registry_order_is_aggregation_order() {
        let ids: Vec<TargetId> = registry().iter().map(|t| t.id).collect();
        assert_eq!(ids, TargetId::all().to_vec());
    }
}
