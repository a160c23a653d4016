/*
 * Tests for the simulation facade
 *
 * The unit tests follows the Arrange, Act, Assert pattern. They drive the
 * whole simulation with an animator that completes at once.
 *
 * Tests:
 * - test_initialize_rejects_invalid_config
 * - test_spawn_person_outside_building
 * - test_run_is_idempotent
 * - test_stopped_simulation_cannot_restart
 * - test_everyone_spawned_is_delivered
 * - test_car_state_serializes_to_json
 * - test_enqueue_refuses_current_rider
 * - test_delivered_person_cannot_return
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod simulation_tests {
    use crate::config::{ConfigError, ElevatorConfig};
    use crate::{
        Animator, Behaviour, InstantAnimator, MoveHandle, PersonId, Simulation, TimedAnimator,
    };
    use crossbeam_channel::{unbounded, Sender};
    use std::collections::HashSet;
    use std::thread::sleep;
    use std::time::{Duration, Instant};

    /// Starts every move and never finishes one.
    struct HoldingAnimator {
        pending: Vec<Sender<()>>,
    }

    impl Animator for HoldingAnimator {
        fn move_car(&mut self, _from: u32, _to: u32, _duration: Duration) -> MoveHandle {
            let (done_tx, done_rx) = unbounded::<()>();
            let (cancel_tx, _cancel_rx) = unbounded::<()>();
            self.pending.push(done_tx);
            MoveHandle::new(done_rx, cancel_tx)
        }
    }

    fn fast_config(n_floors: u32, capacity: usize) -> ElevatorConfig {
        ElevatorConfig {
            n_floors,
            capacity,
            start_floor: 1,
            floor_travel_time: 10,
            dwell_time: 0,
            idle_poll_interval: 1,
            walk_time: 0,
        }
    }

    fn instant_simulation(config: ElevatorConfig) -> Simulation {
        let (animator, _moves_rx) = InstantAnimator::new();
        Simulation::initialize(config, Box::new(animator)).unwrap()
    }

    #[test]
    fn test_initialize_rejects_invalid_config() {
        let mut config = fast_config(5, 2);
        config.start_floor = 9;

        let result = Simulation::initialize(config, Box::new(TimedAnimator::new()));

        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_spawn_person_outside_building() {
        let simulation = instant_simulation(fast_config(4, 2));

        assert!(simulation.spawn_person(0).is_none());
        assert!(simulation.spawn_person(5).is_none());
        assert_eq!(simulation.total_waiting(), 0);
    }

    #[test]
    fn test_run_is_idempotent() {
        // Arrange
        let simulation = instant_simulation(fast_config(4, 2));

        // Act
        let first = simulation.run();
        let second = simulation.run();

        // Assert
        assert!(first);
        assert!(!second);
        assert!(simulation.is_running());
        simulation.stop();
        assert!(!simulation.is_running());
    }

    #[test]
    fn test_stopped_simulation_cannot_restart() {
        let simulation = instant_simulation(fast_config(4, 2));

        assert!(simulation.run());
        simulation.stop();

        assert!(!simulation.run());
        assert!(!simulation.is_running());
    }

    #[test]
    fn test_everyone_spawned_is_delivered() {
        // Arrange
        let simulation = instant_simulation(fast_config(6, 3)).with_seed(11);
        let deliveries = simulation.deliveries();

        let mut spawned = HashSet::new();
        for round in 0..3 {
            for floor in 1..=simulation.floor_count() {
                let person = simulation.spawn_person(floor).unwrap();
                assert_eq!(person.origin_floor(), floor);
                assert_ne!(person.target_floor(), floor);
                spawned.insert(person.id());
            }
            assert_eq!(simulation.total_waiting(), 6 * (round + 1));
        }

        // Act
        assert!(simulation.run());
        let mut delivered = HashSet::new();
        while delivered.len() < spawned.len() {
            let person = deliveries
                .recv_timeout(Duration::from_secs(5))
                .expect("Timed out waiting for deliveries");
            assert!(person.is_delivered());
            assert!(delivered.insert(person.id()));
        }
        simulation.stop();

        // Assert
        assert_eq!(delivered, spawned);
        assert_eq!(simulation.total_waiting(), 0);
        assert!(simulation.car_state().passengers.is_empty());
        assert_eq!(simulation.car_state().behaviour, Behaviour::Idle);
    }

    #[test]
    fn test_car_state_serializes_to_json() {
        // Arrange
        let simulation = instant_simulation(fast_config(4, 2));
        let waiting = simulation.spawn_person(1).unwrap();
        assert_eq!(waiting.id(), PersonId(0));
        assert_eq!(simulation.queue_len(1), 1);

        // Act
        let json = serde_json::to_value(simulation.car_state()).unwrap();

        // Assert
        assert_eq!(json["behaviour"], "idle");
        assert_eq!(json["direction"], "idle");
        assert_eq!(json["floor"], 1);
        assert_eq!(json["capacity"], 2);
        assert_eq!(json["passengers"].as_array().map(|p| p.len()), Some(0));
        let person = serde_json::to_value(&simulation.waiting(1)[0]).unwrap();
        assert_eq!(person["inElevator"], false);
        assert_eq!(person["direction"], "up");
    }

    #[test]
    fn test_enqueue_refuses_current_rider() {
        // Arrange
        let animator = HoldingAnimator { pending: Vec::new() };
        let simulation = Simulation::initialize(fast_config(4, 2), Box::new(animator)).unwrap();
        let rider = simulation.spawn_person(1).unwrap();
        assert!(simulation.run());

        let start = Instant::now();
        while simulation.car_state().passengers.is_empty() {
            assert!(start.elapsed() < Duration::from_secs(5), "rider never boarded");
            sleep(Duration::from_millis(1));
        }

        // Act
        let accepted = simulation.enqueue(rider);
        simulation.stop();

        // Assert
        assert!(!accepted);
        assert_eq!(simulation.total_waiting(), 0);
        assert_eq!(simulation.car_state().passengers.len(), 1);
    }

    #[test]
    fn test_delivered_person_cannot_return() {
        // Arrange
        let simulation = instant_simulation(fast_config(4, 2));
        let deliveries = simulation.deliveries();
        simulation.spawn_person(2).unwrap();
        assert!(simulation.run());
        let delivered = deliveries.recv_timeout(Duration::from_secs(5)).unwrap();

        // Act
        let accepted = simulation.enqueue(delivered);

        // Assert
        assert!(!accepted);
        assert_eq!(simulation.total_waiting(), 0);
        assert!(deliveries.recv_timeout(Duration::from_millis(100)).is_err());
        simulation.stop();
    }
}
