pub mod channels;
pub mod guard;

pub use channels::EventChannel;
pub use guard::{InFlight, InFlightGuard};
