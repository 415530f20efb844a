mod room_handle;
mod room_id;
mod room_registry;

pub use room_handle::*;
pub use room_id::*;
pub use room_registry::*;
