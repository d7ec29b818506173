mod sender;

pub use sender::send_to_peer;
