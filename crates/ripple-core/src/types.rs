use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::RippleError;

/// Algorithm used to restore a checksum table after one block is replaced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Re-hash only the replaced block, repair the rest from checksums and lengths
    Ripple,
    /// Re-hash every block from the replaced index onward
    Naive,
    /// Re-hash the full prefix for every affected index (reference oracle)
    Trivial,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 3] = [Self::Ripple, Self::Naive, Self::Trivial];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ripple => "ripple",
            Self::Naive => "naive",
            Self::Trivial => "trivial",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = RippleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ripple" => Ok(Self::Ripple),
            "naive" => Ok(Self::Naive),
            "trivial" => Ok(Self::Trivial),
            other => Err(RippleError::UnknownStrategy(other.to_string())),
        }
    }
}
