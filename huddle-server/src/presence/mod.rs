mod participant;
mod presence_tracker;

pub use participant::*;
pub use presence_tracker::*;
