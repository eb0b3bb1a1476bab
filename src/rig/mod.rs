pub mod ids;
pub mod types;

pub use ids::IdentifierMap;
pub use types::*;
