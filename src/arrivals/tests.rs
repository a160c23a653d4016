/*
 * Unit tests for the arrivals module
 *
 * The unit tests follows the Arrange, Act, Assert pattern.
 *
 * Tests:
 * - test_generator_spawns_on_every_floor
 * - test_generator_defers_when_line_is_full
 * - test_generator_stop_ends_arrivals
 * - test_zero_interval_does_not_spin
 */

/***************************************/
/*             Unit tests              */
/***************************************/
#[cfg(test)]
mod arrivals_tests {
    use crate::arrivals::{ArrivalGenerator, ArrivalSink};
    use crate::building::{FloorQueueStore, Person};
    use crate::config::ArrivalConfig;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::thread::sleep;
    use std::time::{Duration, Instant};

    struct MockSink {
        queues: Mutex<FloorQueueStore>,
        rng: Mutex<StdRng>,
        polls: AtomicUsize,
    }

    impl MockSink {
        fn new(n_floors: u32) -> MockSink {
            MockSink {
                queues: Mutex::new(FloorQueueStore::new(n_floors)),
                rng: Mutex::new(StdRng::seed_from_u64(11)),
                polls: AtomicUsize::new(0),
            }
        }

        fn total(&self) -> usize {
            self.queues.lock().unwrap().total_waiting()
        }
    }

    impl ArrivalSink for MockSink {
        fn floor_count(&self) -> u32 {
            self.queues.lock().unwrap().floor_count()
        }

        fn queue_len(&self, floor: u32) -> usize {
            self.polls.fetch_add(1, Ordering::SeqCst);
            self.queues.lock().unwrap().queue_len(floor)
        }

        fn spawn_person(&self, floor: u32) -> Option<Person> {
            let mut rng = self.rng.lock().unwrap();
            self.queues.lock().unwrap().spawn(floor, &mut *rng)
        }
    }

    fn fast_config(max_queue_len: usize) -> ArrivalConfig {
        ArrivalConfig {
            min_interval: 1,
            max_interval: 3,
            max_queue_len,
            seed: Some(5),
        }
    }

    fn wait_until(deadline: Duration, condition: impl Fn() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if condition() {
                return true;
            }
            sleep(Duration::from_millis(2));
        }
        condition()
    }

    #[test]
    fn test_generator_spawns_on_every_floor() {
        // Arrange
        let sink = Arc::new(MockSink::new(3));

        // Act
        let generator = ArrivalGenerator::start(sink.clone(), &fast_config(10));
        let filled = wait_until(Duration::from_secs(3), || {
            (1..=3).all(|floor| sink.queue_len(floor) > 0)
        });
        generator.stop();

        // Assert
        assert!(filled, "every floor should have received arrivals");
    }

    #[test]
    fn test_generator_defers_when_line_is_full() {
        // Arrange
        let sink = Arc::new(MockSink::new(2));

        // Act
        let generator = ArrivalGenerator::start(sink.clone(), &fast_config(2));
        let filled = wait_until(Duration::from_secs(3), || sink.total() == 4);
        sleep(Duration::from_millis(50));
        generator.stop();

        // Assert
        assert!(filled);
        assert_eq!(sink.queue_len(1), 2);
        assert_eq!(sink.queue_len(2), 2);
    }

    #[test]
    fn test_generator_stop_ends_arrivals() {
        // Arrange
        let sink = Arc::new(MockSink::new(4));
        let generator = ArrivalGenerator::start(sink.clone(), &fast_config(1000));
        sleep(Duration::from_millis(20));

        // Act
        generator.stop();
        let after_stop = sink.total();
        sleep(Duration::from_millis(50));

        // Assert
        assert_eq!(sink.total(), after_stop);
    }

    #[test]
    fn test_zero_interval_does_not_spin() {
        // Arrange: every line is full from the start
        let sink = Arc::new(MockSink::new(2));
        let config = ArrivalConfig {
            min_interval: 0,
            max_interval: 0,
            max_queue_len: 0,
            seed: Some(1),
        };

        // Act
        let generator = ArrivalGenerator::start(sink.clone(), &config);
        sleep(Duration::from_millis(50));
        generator.stop();

        // Assert: at most one check per floor and millisecond, with slack
        assert_eq!(sink.total(), 0);
        assert!(sink.polls.load(Ordering::SeqCst) < 500);
    }
}
