pub mod address;
pub mod diff;
pub mod ids;
pub mod transaction;

pub use address::*;
pub use diff::*;
pub use ids::*;
pub use transaction::*;
