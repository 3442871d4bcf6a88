pub mod time;
pub mod types;
pub mod utills;

pub use time::*;
pub use types::*;
pub use utills::*;
