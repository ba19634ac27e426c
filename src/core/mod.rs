pub mod broadcast;
pub mod clock;
pub mod comments;
pub mod coordinator;
pub mod error;
pub mod ids;
pub mod itinerary;
pub mod model;
pub mod registry;
pub mod state_sync;
pub mod store;
pub mod summary;
pub mod token;
pub mod votes;

pub use coordinator::Coordinator;
pub use error::{CoreError, CoreResult};
