pub mod macros;
pub mod structs;

pub use structs::Behaviour;
pub use structs::CarState;
pub use structs::Direction;
