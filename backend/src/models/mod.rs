pub mod attention;
pub mod macros;
pub mod record;
pub mod time;
pub mod window;

pub use attention::*;
pub use record::*;
pub use time::*;
pub use window::*;
