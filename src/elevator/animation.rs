use crossbeam_channel as cbc;
use log::warn;
use std::thread::Builder;
use std::time::Duration;

use crate::building::Person;

/**
 * Completion signal for a timed effect (car travel, a passenger walking off).
 *
 * `done` fires once when the effect has finished. `cancel` asks the
 * collaborator to stop early, after which `done` may never fire.
 */
pub struct MoveHandle {
    done_rx: cbc::Receiver<()>,
    cancel_tx: cbc::Sender<()>,
}

impl MoveHandle {
    pub fn new(done_rx: cbc::Receiver<()>, cancel_tx: cbc::Sender<()>) -> MoveHandle {
        MoveHandle { done_rx, cancel_tx }
    }

    /// A handle that has already completed.
    pub fn finished() -> MoveHandle {
        let (done_tx, done_rx) = cbc::bounded::<()>(1);
        let (cancel_tx, _cancel_rx) = cbc::bounded::<()>(1);
        let _ = done_tx.send(());
        MoveHandle::new(done_rx, cancel_tx)
    }

    pub fn done(&self) -> &cbc::Receiver<()> {
        &self.done_rx
    }

    pub fn cancel(&self) {
        let _ = self.cancel_tx.try_send(());
    }
}

/// The view side of the simulation. The dispatcher waits on the returned
/// handles before it commits a new floor or continues serving a stop.
pub trait Animator: Send {
    fn move_car(&mut self, from: u32, to: u32, duration: Duration) -> MoveHandle;

    fn walk_off(&mut self, _person: &Person, _duration: Duration) -> MoveHandle {
        MoveHandle::finished()
    }
}

/// Lets the requested time pass on a helper thread. Used when there is no
/// renderer attached.
#[derive(Debug, Default)]
pub struct TimedAnimator;

impl TimedAnimator {
    pub fn new() -> TimedAnimator {
        TimedAnimator
    }

    fn timed(name: &str, duration: Duration) -> MoveHandle {
        let (done_tx, done_rx) = cbc::bounded::<()>(1);
        let (cancel_tx, cancel_rx) = cbc::bounded::<()>(1);

        let timer_thread = Builder::new().name(name.into());
        let spawned = timer_thread.spawn(move || {
            cbc::select! {
                recv(cancel_rx) -> _ => {}
                default(duration) => {
                    let _ = done_tx.send(());
                }
            }
        });

        match spawned {
            Ok(_) => MoveHandle::new(done_rx, cancel_tx),
            Err(e) => {
                warn!("Failed to spawn {} thread, completing at once: {}", name, e);
                MoveHandle::finished()
            }
        }
    }
}

impl Animator for TimedAnimator {
    fn move_car(&mut self, _from: u32, _to: u32, duration: Duration) -> MoveHandle {
        TimedAnimator::timed("car_travel", duration)
    }

    fn walk_off(&mut self, _person: &Person, duration: Duration) -> MoveHandle {
        if duration.is_zero() {
            return MoveHandle::finished();
        }
        TimedAnimator::timed("walk_off", duration)
    }
}

/// A movement request as seen by the animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarMove {
    pub from: u32,
    pub to: u32,
    pub duration: Duration,
}

/// Completes every effect immediately and reports car movements on a
/// channel. Runs the dispatcher as fast as the machine allows.
pub struct InstantAnimator {
    moves_tx: cbc::Sender<CarMove>,
}

impl InstantAnimator {
    pub fn new() -> (InstantAnimator, cbc::Receiver<CarMove>) {
        let (moves_tx, moves_rx) = cbc::unbounded::<CarMove>();
        (InstantAnimator { moves_tx }, moves_rx)
    }
}

impl Animator for InstantAnimator {
    fn move_car(&mut self, from: u32, to: u32, duration: Duration) -> MoveHandle {
        let _ = self.moves_tx.send(CarMove { from, to, duration });
        MoveHandle::finished()
    }
}
