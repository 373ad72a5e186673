use std::collections::HashSet;
use std::str::FromStr;

use crate::session::vitals::VitalBank;

/// Pseudo-vital key for quiz score thresholds, e.g. `"score >= 3"`.
pub const SCORE_KEY: &str = "score";

/// One parsed prerequisite string.
///
/// Grammar: `"<key> <op> <int>"` with ops `>= <= > < == !=`, `"flag.<id>"`
/// (flag must be set) and `"!flag.<id>"` (flag must be clear). `<key>` is a
/// vital id or [`SCORE_KEY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Threshold {
        key: String,
        op: Comparison,
        value: i64,
    },
    FlagSet(String),
    FlagClear(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Ge,
    Le,
    Gt,
    Lt,
    Eq,
    Ne,
}

impl Comparison {
    pub fn compare(self, left: i64, right: i64) -> bool {
        match self {
            Comparison::Ge => left >= right,
            Comparison::Le => left <= right,
            Comparison::Gt => left > right,
            Comparison::Lt => left < right,
            Comparison::Eq => left == right,
            Comparison::Ne => left != right,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConditionParseError {
    pub raw: String,
}

impl std::fmt::Display for ConditionParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unparsable condition: {}", self.raw)
    }
}

impl std::error::Error for ConditionParseError {}

impl FromStr for Condition {
    type Err = ConditionParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let cond = raw.trim();
        if let Some(flag) = cond.strip_prefix("!flag.") {
            if flag.is_empty() {
                return Err(ConditionParseError {
                    raw: raw.to_string(),
                });
            }
            return Ok(Condition::FlagClear(flag.to_string()));
        }
        if let Some(flag) = cond.strip_prefix("flag.") {
            if flag.is_empty() {
                return Err(ConditionParseError {
                    raw: raw.to_string(),
                });
            }
            return Ok(Condition::FlagSet(flag.to_string()));
        }

        let parts: Vec<&str> = cond.split_whitespace().collect();
        if parts.len() != 3 {
            return Err(ConditionParseError {
                raw: raw.to_string(),
            });
        }
        let Some(op) = parse_op(parts[1]) else {
            return Err(ConditionParseError {
                raw: raw.to_string(),
            });
        };
        let Ok(value) = parts[2].parse::<i64>() else {
            return Err(ConditionParseError {
                raw: raw.to_string(),
            });
        };
        Ok(Condition::Threshold {
            key: parts[0].to_string(),
            op,
            value,
        })
    }
}

fn parse_op(op: &str) -> Option<Comparison> {
    match op {
        ">=" => Some(Comparison::Ge),
        "<=" => Some(Comparison::Le),
        ">" => Some(Comparison::Gt),
        "<" => Some(Comparison::Lt),
        "==" => Some(Comparison::Eq),
        "!=" => Some(Comparison::Ne),
        _ => None,
    }
}

impl Condition {
    pub fn holds(&self, vitals: &VitalBank, flags: &HashSet<String>, score: i64) -> bool {
        match self {
            Condition::Threshold { key, op, value } => {
                let current = if key == SCORE_KEY {
                    Some(score)
                } else {
                    vitals.value(key)
                };
                current
                    .map(|current| op.compare(current, *value))
                    .unwrap_or(false)
            }
            Condition::FlagSet(flag) => flags.contains(flag),
            Condition::FlagClear(flag) => !flags.contains(flag),
        }
    }

    /// Vital or score key gated by this condition, for authoring reports.
    pub fn threshold_key(&self) -> Option<&str> {
        match self {
            Condition::Threshold { key, .. } => Some(key),
            _ => None,
        }
    }
}

pub fn parse_conditions(raw: &[String]) -> Result<Vec<Condition>, ConditionParseError> {
    raw.iter().map(|cond| cond.parse::<Condition>()).collect()
}

/// All conditions hold against the given state. Unparsable strings never hold;
/// an empty list always holds.
pub fn conditions_hold(
    raw: &[String],
    vitals: &VitalBank,
    flags: &HashSet<String>,
    score: i64,
) -> bool {
    raw.iter().all(|cond| {
        cond.parse::<Condition>()
            .map(|cond| cond.holds(vitals, flags, score))
            .unwrap_or(false)
    })
}

/// First condition in the list that does not hold, for rejection messages.
pub fn first_unmet<'a>(
    raw: &'a [String],
    vitals: &VitalBank,
    flags: &HashSet<String>,
    score: i64,
) -> Option<&'a str> {
    raw.iter()
        .find(|cond| {
            !cond
                .parse::<Condition>()
                .map(|cond| cond.holds(vitals, flags, score))
                .unwrap_or(false)
        })
        .map(String::as_str)
}
