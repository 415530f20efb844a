mod broadcast;
mod coordinator;
mod error;
mod presence;
mod registry;
mod relay;
mod room;
mod signaling;
mod transport;

pub use broadcast::*;
pub use coordinator::*;
pub use error::*;
pub use presence::*;
pub use registry::*;
pub use relay::*;
pub use room::*;
pub use signaling::*;
pub use transport::*;
