//! Client-side state for pending ad-platform mutations.
//!
//! [`OptimisticStore`] holds overlays for changes that were sent but are not
//! yet visible in the reporting view, [`merge`] lays them over freshly
//! aggregated entities, and [`MutationCoordinator`] runs the apply, dispatch,
//! and rollback sequence around each change.

pub mod coordinator;
pub mod dispatch;
pub mod store;
pub mod view;

pub use coordinator::{
    BulkFailure, BulkOutcome, CoordinatorSettings, MutationCoordinator, MutationError,
    MutationTarget,
};
pub use dispatch::MutationDispatcher;
pub use store::{Clock, ManualClock, OptimisticEntry, OptimisticStore, SystemClock};
pub use view::{merge, EntityView};
