// Enumerations stored as TEXT columns
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::query::FieldValue;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind} value '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }

        impl From<$name> for FieldValue {
            fn from(value: $name) -> Self {
                FieldValue::Text(Some(value.as_str().to_string()))
            }
        }
    };
}

text_enum!(Gender {
    Male => "male",
    Female => "female",
    Other => "other",
});

text_enum!(
    /// Whether an insurer pays first or tops up what the primary left
    CoverageKind {
        Primary => "primary",
        Supplementary => "supplementary",
    }
);

text_enum!(PlanTier {
    Basic => "basic",
    Standard => "standard",
    Premium => "premium",
});

text_enum!(ReceptionStatus {
    Registered => "registered",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl ReceptionStatus {
    /// Service lines may be added or removed only while the visit is open
    pub fn is_open(&self) -> bool {
        matches!(self, ReceptionStatus::Registered | ReceptionStatus::InProgress)
    }

    pub fn can_transition_to(&self, next: ReceptionStatus) -> bool {
        use ReceptionStatus::*;
        matches!(
            (self, next),
            (Registered, InProgress) | (InProgress, Completed) | (Registered | InProgress, Cancelled)
        )
    }
}

text_enum!(PaymentKind {
    Payment => "payment",
    Refund => "refund",
});

text_enum!(PaymentMethod {
    Cash => "cash",
    Card => "card",
    Pos => "pos",
    Transfer => "transfer",
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_round_trip_uses_snake_case() {
        assert_eq!(ReceptionStatus::InProgress.as_str(), "in_progress");
        assert_eq!("in_progress".parse::<ReceptionStatus>(), Ok(ReceptionStatus::InProgress));
        assert_eq!(
            serde_json::to_string(&ReceptionStatus::InProgress).ok().as_deref(),
            Some("\"in_progress\"")
        );
    }

    #[test]
    fn test_unknown_value_rejected() {
        let err = PaymentMethod::try_from("cheque".to_string()).unwrap_err();
        assert_eq!(err.kind, "PaymentMethod");
        assert_eq!(err.to_string(), "invalid PaymentMethod value 'cheque'");
    }

    #[test]
    fn test_status_transitions() {
        use ReceptionStatus::*;
        assert!(Registered.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Registered.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Cancelled));
        assert!(!Registered.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Registered));
        assert!(!InProgress.can_transition_to(Registered));
    }
}
