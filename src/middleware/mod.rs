pub mod logging;
pub mod request_id;
pub mod security;

pub use logging::*;
pub use request_id::*;
pub use security::*;
