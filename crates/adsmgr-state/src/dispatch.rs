use std::future::Future;

use adsmgr_webhook::{FieldUpdate, WebhookClient, WebhookError};

/// Sends one field change to the ad platform.
///
/// Implemented by [`WebhookClient`]; tests substitute an in-memory fake.
pub trait MutationDispatcher: Send + Sync {
    fn dispatch(&self, update: &FieldUpdate) -> impl Future<Output = Result<(), WebhookError>> + Send;
}

impl MutationDispatcher for WebhookClient {
    fn dispatch(&self, update: &FieldUpdate) -> impl Future<Output = Result<(), WebhookError>> + Send {
        self.update_field(update)
    }
}
