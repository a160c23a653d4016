pub mod generator;
mod tests;

pub use generator::{ArrivalGenerator, ArrivalSink};
