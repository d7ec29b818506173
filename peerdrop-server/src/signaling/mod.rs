mod notifier;
mod service;
mod ws_handler;

pub use notifier::RoomNotifier;
pub use service::SignalingService;
pub use ws_handler::ws_handler;
