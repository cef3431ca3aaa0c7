pub mod facility;
pub mod types;

pub use facility::*;
pub use types::*;
