pub mod collector;

pub use collector::{collect, run_poller, CollectError};
