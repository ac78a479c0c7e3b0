pub mod client;
pub mod error;
pub mod types;

pub use client::{WebhookClient, WebhookEndpoints};
pub use error::WebhookError;
pub use types::{
    ConditionDocument, CreateEntityRequest, FieldUpdate, RuleActionDocument, RuleControl,
    RuleDocument,
};
