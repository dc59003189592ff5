pub mod memory;
pub mod surreal;

pub use memory::*;
pub use surreal::*;
