//! Subscription plan enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Storage plan tiers. Each tier maps to a fixed byte ceiling in the quota
/// configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_plan", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Plan {
    /// Default tier.
    #[default]
    Normal,
    /// Paid tier.
    Pro,
}

impl Plan {
    /// Return the plan as an uppercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Pro => "PRO",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Plan {
    type Err = drivehub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "NORMAL" => Ok(Self::Normal),
            "PRO" => Ok(Self::Pro),
            _ => Err(drivehub_core::AppError::invalid_operation(format!(
                "Invalid plan: '{s}'. Expected NORMAL or PRO"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("pro".parse::<Plan>().unwrap(), Plan::Pro);
        assert_eq!("NORMAL".parse::<Plan>().unwrap(), Plan::Normal);
        assert!("gold".parse::<Plan>().is_err());
    }
}
