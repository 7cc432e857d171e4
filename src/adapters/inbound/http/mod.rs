pub mod dto;
pub mod extract;
pub mod handlers;
pub mod router;

pub use dto::*;
pub use handlers::*;
pub use router::*;
