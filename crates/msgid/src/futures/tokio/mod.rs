mod sleep;
mod snowflake;

pub use sleep::*;
pub use snowflake::*;
