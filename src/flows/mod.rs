pub mod backend;
pub mod template;

pub use backend::{generate_or_default, FlowError, FlowRequest, FlowResponse, GenerativeBackend};
pub use template::TemplateBackend;
