mod broadcast_channel;
mod room_event;

pub use broadcast_channel::*;
pub use room_event::*;
