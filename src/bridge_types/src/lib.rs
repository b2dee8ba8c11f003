pub mod cascade;
pub mod chat;
pub mod credentials;
pub mod error;
pub mod model;

pub mod prelude {
    pub use crate::cascade::{CascadeSession, PlannerResponseText};
    pub use crate::chat::{ChatMessage, Role, ToolCall, ToolCallPlan, ToolDef, ToolFunctionDef};
    pub use crate::credentials::{Credentials, MetadataFieldMap};
    pub use crate::error::{BridgeError, BridgeResult, ErrorSeverity};
    pub use crate::model::{ModelDescriptor, ResolvedModel, VariantSpec};
}
