use bevy_utils::tracing::warn;
use serde::{Deserialize, Serialize};

/// A narrative assist request. Serialized form doubles as the wire format
/// an out-of-process generator would receive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowRequest {
    /// Short study outline for a subject topic.
    Outline { topic: String },
    /// Creature name suggestions for a habitat.
    Name { habitat: String },
    /// End-of-run recap assembled from session facts.
    Summary {
        quest_title: String,
        turns: u64,
        victory: bool,
        highlights: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowResponse {
    pub text: String,
}

#[derive(Debug)]
pub enum FlowError {
    /// The backing service could not be reached or refused the request.
    Unavailable(String),
    /// The request cannot be fulfilled as posed.
    Malformed(String),
}

impl std::fmt::Display for FlowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowError::Unavailable(message) => write!(f, "flow backend unavailable: {}", message),
            FlowError::Malformed(message) => write!(f, "bad flow request: {}", message),
        }
    }
}

impl std::error::Error for FlowError {}

pub trait GenerativeBackend {
    fn generate(&self, request: &FlowRequest) -> Result<FlowResponse, FlowError>;
}

/// Runs a request and degrades to the fallback text on any failure. Flow
/// output is garnish; a dead backend must never surface into a session.
pub fn generate_or_default(
    backend: &dyn GenerativeBackend,
    request: &FlowRequest,
    fallback: &str,
) -> FlowResponse {
    match backend.generate(request) {
        Ok(response) => response,
        Err(err) => {
            warn!("flow generation failed, using fallback: {}", err);
            FlowResponse {
                text: fallback.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DeadBackend;

    impl GenerativeBackend for DeadBackend {
        fn generate(&self, _request: &FlowRequest) -> Result<FlowResponse, FlowError> {
            Err(FlowError::Unavailable("socket closed".to_string()))
        }
    }

    #[test]
    fn test_generate_or_default_swallows_backend_failure() {
        let request = FlowRequest::Outline {
            topic: "water cycles".to_string(),
        };
        let response = generate_or_default(&DeadBackend, &request, "No outline available.");
        assert_eq!(response.text, "No outline available.");
    }

    #[test]
    fn test_request_wire_format() {
        let request = FlowRequest::Name {
            habitat: "tidal flats".to_string(),
        };
        let wire = serde_json::to_string(&request).unwrap();
        assert!(wire.contains("\"kind\":\"NAME\""));
        let back: FlowRequest = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, request);
    }
}
