mod atomic;
mod backoff;
mod config;
mod interface;
mod lock;
mod mutex;
mod poll;

pub use atomic::*;
pub(crate) use backoff::*;
pub use config::*;
pub use interface::*;
pub use lock::*;
pub(crate) use mutex::*;
pub use poll::*;
