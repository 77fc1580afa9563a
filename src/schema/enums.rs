use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of lowercase string tokens.
///
/// Tokens are matched case-sensitively; anything outside `TOKENS` is rejected
/// at the parsing boundary so invalid values never reach a record.
pub trait Token: Sized + Copy + 'static {
    /// Declared tokens, in declaration order
    const TOKENS: &'static [&'static str];

    fn as_str(&self) -> &'static str;

    fn from_token(token: &str) -> Option<Self>;
}

/// Raised by `FromStr` when a token is not declared
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownToken(pub String);

impl fmt::Display for UnknownToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown token {:?}", self.0)
    }
}

impl std::error::Error for UnknownToken {}

macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $token:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
        }

        impl Token for $name {
            const TOKENS: &'static [&'static str] = &[$($token),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $token),+
                }
            }

            fn from_token(token: &str) -> Option<Self> {
                match token {
                    $($token => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownToken;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$name as Token>::from_token(s).ok_or_else(|| UnknownToken(s.to_string()))
            }
        }
    };
}

token_enum! {
    /// Investment objective of a user
    FlowType {
        Growth => "growth",
        Income => "income",
    }
}

token_enum! {
    /// Actual holdings snapshot vs. proposed target
    PortfolioType {
        Current => "current",
        Recommended => "recommended",
    }
}

token_enum! {
    /// Market conditions at prediction time
    MarketRegime {
        Bull => "bull",
        Bear => "bear",
        Sideways => "sideways",
        Volatile => "volatile",
    }
}

token_enum! {
    /// Lifecycle state of a batch execution
    ExecutionStatus {
        Running => "running",
        Completed => "completed",
        Failed => "failed",
    }
}

impl ExecutionStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ExecutionStatus::Running)
    }

    /// RUNNING may move to COMPLETED or FAILED; terminal states never move.
    pub fn can_transition_to(&self, next: ExecutionStatus) -> bool {
        matches!(
            (self, next),
            (ExecutionStatus::Running, ExecutionStatus::Completed)
                | (ExecutionStatus::Running, ExecutionStatus::Failed)
        )
    }
}
