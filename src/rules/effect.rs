use std::collections::HashSet;
use std::str::FromStr;

use crate::rules::condition::SCORE_KEY;
use crate::session::vitals::VitalBank;

/// One parsed effect string.
///
/// Grammar: `"<vital>:<delta>"` (clamped vital delta), `"score:<delta>"`,
/// `"flag.<id>:set"`, `"flag.<id>:clear"`, and `"reveal:<id>|<id>|..."`,
/// which sets one flag from the pool picked with the session RNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    VitalDelta { id: String, delta: i64 },
    ScoreDelta(i64),
    SetFlag(String),
    ClearFlag(String),
    RevealOneOf(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct EffectParseError {
    pub raw: String,
}

impl std::fmt::Display for EffectParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unparsable effect: {}", self.raw)
    }
}

impl std::error::Error for EffectParseError {}

impl FromStr for Effect {
    type Err = EffectParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = raw.split(':').collect();
        if parts.len() != 2 {
            return Err(EffectParseError {
                raw: raw.to_string(),
            });
        }
        let key = parts[0].trim();
        let arg = parts[1].trim();
        if key.is_empty() || arg.is_empty() {
            return Err(EffectParseError {
                raw: raw.to_string(),
            });
        }

        if let Some(flag) = key.strip_prefix("flag.") {
            if flag.is_empty() {
                return Err(EffectParseError {
                    raw: raw.to_string(),
                });
            }
            return match arg {
                "set" => Ok(Effect::SetFlag(flag.to_string())),
                "clear" => Ok(Effect::ClearFlag(flag.to_string())),
                _ => Err(EffectParseError {
                    raw: raw.to_string(),
                }),
            };
        }

        if key == "reveal" {
            let pool: Vec<String> = arg
                .split('|')
                .map(|flag| flag.trim().to_string())
                .filter(|flag| !flag.is_empty())
                .collect();
            if pool.is_empty() {
                return Err(EffectParseError {
                    raw: raw.to_string(),
                });
            }
            return Ok(Effect::RevealOneOf(pool));
        }

        let Ok(delta) = arg.parse::<i64>() else {
            return Err(EffectParseError {
                raw: raw.to_string(),
            });
        };
        if key == SCORE_KEY {
            Ok(Effect::ScoreDelta(delta))
        } else {
            Ok(Effect::VitalDelta {
                id: key.to_string(),
                delta,
            })
        }
    }
}

pub fn parse_effects(raw: &[String]) -> Result<Vec<Effect>, EffectParseError> {
    raw.iter().map(|effect| effect.parse::<Effect>()).collect()
}

/// Apply a list of effect strings against session state, returning
/// human-readable lines for each applied effect. Unparsable strings are
/// skipped; catalog validation rejects them before play.
pub fn apply_effects(
    effects: &[String],
    vitals: &mut VitalBank,
    flags: &mut HashSet<String>,
    score: &mut i64,
    rng: &mut u64,
) -> Vec<String> {
    let mut applied = Vec::new();
    for raw in effects {
        let Ok(effect) = raw.parse::<Effect>() else {
            continue;
        };
        match effect {
            Effect::VitalDelta { id, delta } => {
                if let Some(value) = vitals.apply_delta(&id, delta) {
                    applied.push(format!("{} {:+} (now {})", id, delta, value));
                }
            }
            Effect::ScoreDelta(delta) => {
                *score += delta;
                applied.push(format!("score {:+} (now {})", delta, score));
            }
            Effect::SetFlag(flag) => {
                if flags.insert(flag.clone()) {
                    applied.push(format!("flag {} set", flag));
                }
            }
            Effect::ClearFlag(flag) => {
                if flags.remove(&flag) {
                    applied.push(format!("flag {} cleared", flag));
                }
            }
            Effect::RevealOneOf(pool) => {
                let idx = (next_u64(rng) % pool.len() as u64) as usize;
                let flag = pool[idx].clone();
                flags.insert(flag.clone());
                applied.push(format!("revealed {}", flag));
            }
        }
    }
    applied
}

fn next_u64(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1);
    *state
}
