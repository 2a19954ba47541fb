//! Common types shared across models.

use serde::{Deserialize, Serialize};

/// Subscription plan for a user account
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Elite,
}

impl Default for Plan {
    fn default() -> Self {
        Self::Free
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Pro => write!(f, "pro"),
            Self::Elite => write!(f, "elite"),
        }
    }
}

impl std::str::FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            "elite" => Ok(Self::Elite),
            _ => Err(format!("Unknown plan: {}", s)),
        }
    }
}

impl From<String> for Plan {
    fn from(s: String) -> Self {
        s.parse().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_round_trip() {
        assert_eq!("free".parse::<Plan>().unwrap(), Plan::Free);
        assert_eq!("pro".parse::<Plan>().unwrap(), Plan::Pro);
        assert_eq!("Elite".parse::<Plan>().unwrap(), Plan::Elite);
        assert_eq!(Plan::Pro.to_string(), "pro");
    }

    #[test]
    fn test_unknown_plan_defaults_to_free() {
        assert_eq!(Plan::from("platinum".to_string()), Plan::Free);
    }
}
