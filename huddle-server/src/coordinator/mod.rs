mod session_coordinator;

pub use session_coordinator::*;
