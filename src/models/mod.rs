pub mod form;
pub mod generate;
pub mod portrait;
pub mod prediction;

pub use form::*;
pub use generate::*;
pub use portrait::*;
pub use prediction::*;
