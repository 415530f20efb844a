mod outbound_queue;
mod transport_config;

pub use outbound_queue::*;
pub use transport_config::*;
