pub mod budget;
pub mod category;
pub mod objective;
pub mod recurring;
pub mod transaction;

pub use budget::*;
pub use category::*;
pub use objective::*;
pub use recurring::*;
pub use transaction::*;
