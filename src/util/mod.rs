pub mod utils;
pub use utils::*;
