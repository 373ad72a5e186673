pub mod authoring;

pub use authoring::render_authoring_dashboard;
