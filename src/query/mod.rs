pub mod circular;
pub mod dependents;
pub mod unused;
pub mod warnings;

pub use circular::find_cycles;
pub use dependents::{Dependents, find_dependents};
pub use unused::find_unused_files;
pub use warnings::find_warnings;
