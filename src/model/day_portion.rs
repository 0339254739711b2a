use serde::{Deserialize, Serialize};
use strum_macros::EnumIter;
use utoipa::ToSchema;

/// How much of a boundary day a leave request covers.
///
/// Deserializes from the wire names as well as the `1`/`2`/`3` option codes
/// the leave form has always posted.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    ToSchema,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum DayPortion {
    #[default]
    #[serde(alias = "1")]
    FullDay,
    #[serde(alias = "2")]
    FirstHalf,
    #[serde(alias = "3")]
    SecondHalf,
}

impl DayPortion {
    /// Text of the option on the leave form.
    pub fn label(&self) -> &'static str {
        match self {
            DayPortion::FullDay => "Full Day",
            DayPortion::FirstHalf => "First Half",
            DayPortion::SecondHalf => "Second Half",
        }
    }
}

/// Which boundary selector a portion change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PortionRole {
    Start,
    End,
}
