mod correlator;
mod launcher;
mod request_channel;

pub use correlator::*;
pub use launcher::*;
pub use request_channel::*;
