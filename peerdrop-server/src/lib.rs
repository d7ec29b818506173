mod http;
pub mod registry;
pub mod signaling;

pub use http::{AppState, router, serve};
pub use registry::{RoomCommand, RoomRegistry};
pub use signaling::{RoomNotifier, SignalingService, ws_handler};
