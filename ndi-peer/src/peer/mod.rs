mod data_channel;
mod peer_connection;
mod tracker;

pub use data_channel::*;
pub use peer_connection::*;
pub use tracker::*;
