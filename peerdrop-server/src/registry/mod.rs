mod registry;
mod room;
mod room_command;

pub use registry::RoomRegistry;
pub use room::Room;
pub use room_command::RoomCommand;
