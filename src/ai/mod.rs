pub mod random;

pub use random::{RandomMoveSelector, UniformMoveSelector};
