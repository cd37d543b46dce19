pub mod process;

pub use process::{Monit, Pm2Env, Pm2Process, Versioning};
