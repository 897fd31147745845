pub mod draft_content_use_case;
pub mod ports;
pub mod resolver;
pub mod transform;
pub mod write_policy;
