mod room;
mod room_command;
mod room_policy;

pub use room::*;
pub use room_command::*;
pub use room_policy::*;
