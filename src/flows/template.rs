use crate::flows::backend::{FlowError, FlowRequest, FlowResponse, GenerativeBackend};

/// Offline generator. Responses are assembled from fixed word tables keyed
/// off a seed and the request payload, so equal requests give equal text.
#[derive(Debug, Default)]
pub struct TemplateBackend {
    seed: u64,
}

static OUTLINE_ANGLES: &[&str] = &[
    "Key terms and moving parts",
    "Where it shows up in the real world",
    "Common mistakes and how to spot them",
    "How the pieces behave under pressure",
];

static OUTLINE_EXAMPLES: &[&str] = &[
    "a small system pushed past its limits",
    "a budget that has to stretch further than it should",
    "two goals that pull in opposite directions",
    "a warning sign that arrives almost too late",
];

static NAME_ROOTS: &[&str] = &[
    "Sun", "Mist", "Iron", "Moss", "Ember", "Salt", "Hollow", "Thorn",
];

static NAME_SUFFIXES: &[&str] = &[
    "weaver", "strider", "warden", "caller", "runner", "keeper", "singer", "shade",
];

impl TemplateBackend {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn outline(&self, topic: &str) -> Result<String, FlowError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(FlowError::Malformed("outline topic is empty".to_string()));
        }
        let mut rng = self.seed ^ hash_seed(topic);
        let angle = pick(&mut rng, OUTLINE_ANGLES);
        let example = pick(&mut rng, OUTLINE_EXAMPLES);
        Ok(format!(
            "Outline: {}\n  1. What {} is and why it matters\n  2. {}\n  3. A worked example: {}\n  4. Quick self-check questions",
            topic, topic, angle, example
        ))
    }

    fn name(&self, habitat: &str) -> Result<String, FlowError> {
        let habitat = habitat.trim();
        if habitat.is_empty() {
            return Err(FlowError::Malformed("name habitat is empty".to_string()));
        }
        let mut rng = self.seed ^ hash_seed(habitat);
        let mut names = Vec::with_capacity(3);
        while names.len() < 3 {
            let candidate = format!(
                "{}{}",
                pick(&mut rng, NAME_ROOTS),
                pick(&mut rng, NAME_SUFFIXES)
            );
            if !names.contains(&candidate) {
                names.push(candidate);
            }
        }
        Ok(format!(
            "Names for a creature of the {}: {}",
            habitat,
            names.join(", ")
        ))
    }

    fn summary(
        &self,
        quest_title: &str,
        turns: u64,
        victory: bool,
        highlights: &[String],
    ) -> String {
        let verdict = if victory { "victory" } else { "defeat" };
        let mut text = format!("{}: {} after {} turns.", quest_title, verdict, turns);
        if !highlights.is_empty() {
            text.push_str(&format!(" Turning points: {}.", highlights.join("; ")));
        }
        text
    }
}

impl GenerativeBackend for TemplateBackend {
    fn generate(&self, request: &FlowRequest) -> Result<FlowResponse, FlowError> {
        let text = match request {
            FlowRequest::Outline { topic } => self.outline(topic)?,
            FlowRequest::Name { habitat } => self.name(habitat)?,
            FlowRequest::Summary {
                quest_title,
                turns,
                victory,
                highlights,
            } => self.summary(quest_title, *turns, *victory, highlights),
        };
        Ok(FlowResponse { text })
    }
}

fn pick<'a>(rng: &mut u64, table: &[&'a str]) -> &'a str {
    table[(next_u64(rng) % table.len() as u64) as usize]
}

fn next_u64(state: &mut u64) -> u64 {
    *state = state
        .wrapping_mul(6364136223846793005)
        .wrapping_add(1);
    *state
}

fn hash_seed(value: &str) -> u64 {
    let mut hash = 1469598103934665603u64;
    for byte in value.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(1099511628211);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outline_is_deterministic() {
        let backend = TemplateBackend::new(11);
        let request = FlowRequest::Outline {
            topic: "groundwater".to_string(),
        };
        let a = backend.generate(&request).unwrap();
        let b = backend.generate(&request).unwrap();
        assert_eq!(a, b);
        assert!(a.text.starts_with("Outline: groundwater"));
    }

    #[test]
    fn test_outline_rejects_empty_topic() {
        let backend = TemplateBackend::new(11);
        let request = FlowRequest::Outline {
            topic: "   ".to_string(),
        };
        assert!(matches!(
            backend.generate(&request),
            Err(FlowError::Malformed(_))
        ));
    }

    #[test]
    fn test_name_gives_three_distinct_suggestions() {
        let backend = TemplateBackend::new(11);
        let request = FlowRequest::Name {
            habitat: "tidal flats".to_string(),
        };
        let response = backend.generate(&request).unwrap();
        let (_, names) = response.text.split_once(": ").unwrap();
        let names: Vec<&str> = names.split(", ").collect();
        assert_eq!(names.len(), 3);
        assert_ne!(names[0], names[1]);
        assert_ne!(names[1], names[2]);
    }

    #[test]
    fn test_summary_reports_verdict_and_highlights() {
        let backend = TemplateBackend::new(11);
        let request = FlowRequest::Summary {
            quest_title: "Verdant Biosphere".to_string(),
            turns: 9,
            victory: true,
            highlights: vec!["water hit its target".to_string()],
        };
        let response = backend.generate(&request).unwrap();
        assert!(response.text.contains("victory"));
        assert!(response.text.contains("9 turns"));
        assert!(response.text.contains("water hit its target"));
    }
}
