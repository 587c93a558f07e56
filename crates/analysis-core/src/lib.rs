pub mod error;
pub mod parse;
pub mod traits;
pub mod types;

pub use error::*;
pub use parse::*;
pub use traits::*;
pub use types::*;
