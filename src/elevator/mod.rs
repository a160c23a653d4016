pub mod animation;
pub mod car;
pub mod dispatcher;
pub mod plan;

pub use animation::{Animator, InstantAnimator, MoveHandle, TimedAnimator};
pub use car::{BoardingError, ElevatorCar};
pub use dispatcher::Dispatcher;
