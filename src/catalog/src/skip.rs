use std::error::Error;
use std::fmt;

/// Why a single feed record was left out of the catalog.
///
/// These never abort a run: the record is logged, counted and dropped.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    Unclassifiable,
    MissingAttribute(usize),
    MalformedNumber(String),
    MalformedPlanCode,
    UnknownFlavor(String),
    UnavailableDatabase(String),
    MissingPlanPrice,
    NoPrice,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SkipReason::Unclassifiable => write!(f, "No category matches the plan code"),
            SkipReason::MissingAttribute(index) => write!(f, "Missing attribute attr-{}", index),
            SkipReason::MalformedNumber(value) => write!(f, "Not a number: {:?}", value),
            SkipReason::MalformedPlanCode => {
                write!(f, "Plan code does not follow <engine>-<plan>-<flavor>")
            }
            SkipReason::UnknownFlavor(name) => write!(f, "Flavor not in the flavor feed: {}", name),
            SkipReason::UnavailableDatabase(triple) => {
                write!(f, "Not listed in the availability feed: {}", triple)
            }
            SkipReason::MissingPlanPrice => write!(f, "No regional nor plan price"),
            SkipReason::NoPrice => write!(f, "No admitted price"),
        }
    }
}

impl Error for SkipReason {}
