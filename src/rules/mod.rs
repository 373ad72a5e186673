pub mod condition;
pub mod effect;
pub mod outcome;

pub use condition::{
    conditions_hold, first_unmet, parse_conditions, Comparison, Condition, ConditionParseError,
    SCORE_KEY,
};
pub use effect::{apply_effects, parse_effects, Effect, EffectParseError};
pub use outcome::{classify, QuestEnd};
