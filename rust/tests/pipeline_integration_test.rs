use slotpipe::clock::ManualClock;
use slotpipe::config::PipelineConfig;
use slotpipe::pipeline::{Monitor, Pipeline};
use slotpipe::producer::TickOutcome;
use slotpipe::timer::PeriodicTimer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Integration tests driving the producer and consumer through whole cycles,
/// single-threaded where exact counts matter and threaded where the handoff does.

fn assert_conserved(monitor: &Monitor) {
    // Outside of a tick or drain nothing is held transiently.
    assert_eq!(
        monitor.free_slots() + monitor.queued(),
        monitor.capacity(),
        "slots leaked or duplicated: {:?}",
        monitor
    );
    assert_eq!(monitor.pending(), monitor.queued());
}

#[test]
fn test_end_to_end_capacity_eight() {
    let clock = Arc::new(ManualClock::new());
    let pipeline = Pipeline::with_clock(8, Arc::clone(&clock)).unwrap();
    let monitor = pipeline.monitor();
    let (mut producer, mut consumer) = pipeline.split();

    // Step 1: four ticks, one second apart. Only the last one crosses half capacity.
    let mut outcomes = Vec::new();
    for _ in 0..4 {
        clock.advance(Duration::from_secs(1));
        outcomes.push(producer.tick());
        assert_conserved(&monitor);
    }
    assert_eq!(
        outcomes,
        vec![
            TickOutcome::Published { sequence: 1, crossed: false },
            TickOutcome::Published { sequence: 2, crossed: false },
            TickOutcome::Published { sequence: 3, crossed: false },
            TickOutcome::Published { sequence: 4, crossed: true },
        ]
    );
    assert_eq!(monitor.pending(), 4);
    assert_eq!(monitor.stats().wakeups, 1);

    // Step 2: the consumer wakes once and drains in production order.
    let mut seen = Vec::new();
    assert_eq!(consumer.try_drain(), Some(4));
    // try_drain took the signal; a second one finds nothing pending.
    assert_eq!(consumer.try_drain(), None);
    assert_eq!(monitor.free_slots(), 8);
    assert_eq!(monitor.pending(), 0);
    assert_conserved(&monitor);

    // Step 3: the next batch carries on from sequence 5 with fresh timestamps.
    for _ in 0..4 {
        clock.advance(Duration::from_secs(1));
        producer.tick();
    }
    assert!(monitor.signal_ready());
    consumer.drain_with(|r| seen.push((r.sequence, r.uptime_ms())));
    assert_eq!(seen, vec![(5, 5000), (6, 6000), (7, 7000), (8, 8000)]);
}

#[test]
fn test_threshold_fires_once_while_rising() {
    let (mut producer, _consumer) = Pipeline::new(8).unwrap().split();
    let monitor = producer.monitor();

    let mut raised_at = Vec::new();
    for _ in 0..8 {
        if let TickOutcome::Published { sequence, crossed: true } = producer.tick() {
            raised_at.push(sequence);
        }
    }
    // pending 3 -> 4 is the only crossing; 5..8 stay quiet
    assert_eq!(raised_at, vec![4]);
    assert_eq!(monitor.pending(), 8);
}

#[test]
fn test_exhaustion_keeps_pool_intact() {
    let (mut producer, mut consumer) = Pipeline::new(8).unwrap().split();
    let monitor = producer.monitor();

    for _ in 0..8 {
        producer.tick();
    }
    assert_eq!(monitor.free_slots(), 0);

    for _ in 0..5 {
        assert_eq!(producer.tick(), TickOutcome::Dropped);
        assert_eq!(monitor.pending(), 8);
        assert_conserved(&monitor);
    }
    assert_eq!(monitor.stats().dropped, 5);

    // Dropped ticks did not consume sequence numbers.
    let mut sequences = Vec::new();
    consumer.drain_with(|r| sequences.push(r.sequence));
    assert_eq!(sequences, (1..=8).collect::<Vec<u64>>());
    assert_eq!(producer.tick().sequence(), Some(9));
}

#[test]
fn test_sequences_gapless_across_drops() {
    let (mut producer, mut consumer) = Pipeline::new(4).unwrap().split();
    let mut produced = Vec::new();
    let mut consumed = Vec::new();

    for round in 0..20 {
        if let Some(seq) = producer.tick().sequence() {
            produced.push(seq);
        }
        // drain only every fifth tick so the pool regularly runs dry
        if round % 5 == 4 {
            consumer.drain_with(|r| consumed.push(r.sequence));
        }
    }
    consumer.drain_with(|r| consumed.push(r.sequence));

    let expected: Vec<u64> = (1..=produced.len() as u64).collect();
    assert_eq!(produced, expected);
    assert_eq!(consumed, expected);
    assert!(consumer.monitor().stats().dropped > 0);
}

#[test]
fn test_threaded_timer_pipeline() {
    let config = PipelineConfig::from_json_str(
        r#"{"capacity": 8, "period_ms": 1, "initial_delay_ms": 0}"#,
    )
    .unwrap();
    let pipeline = Pipeline::from_config(&config).unwrap();
    let monitor = pipeline.monitor();
    let (mut producer, mut consumer) = pipeline.split();

    let timer = PeriodicTimer::start(config.initial_delay(), config.period(), move || {
        producer.tick();
    })
    .unwrap();

    let consumed = Arc::new(Mutex::new(Vec::new()));
    let stop = Arc::new(AtomicBool::new(false));
    let consumer_thread = {
        let consumed = Arc::clone(&consumed);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            // poll rather than wait, so every record passes through the observer
            while !stop.load(Ordering::Acquire) {
                if consumer.drain_with(|r| consumed.lock().unwrap().push(r.sequence)) == 0 {
                    thread::sleep(Duration::from_micros(200));
                }
            }
            consumer.run_until(&stop, Duration::from_millis(1))
        })
    };

    let start = Instant::now();
    while monitor.last_sequence() < 50 && start.elapsed() < Duration::from_secs(10) {
        thread::sleep(Duration::from_millis(1));
    }
    timer.stop();
    stop.store(true, Ordering::Release);
    consumer_thread.join().unwrap();

    assert!(monitor.last_sequence() >= 50);
    assert_conserved(&monitor);
    assert_eq!(monitor.queued(), 0);

    let stats = monitor.stats();
    assert_eq!(stats.produced, monitor.last_sequence());
    assert_eq!(stats.drained, stats.produced);

    // whatever the observer saw arrived in order
    let seen = consumed.lock().unwrap();
    assert!(seen.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_blocking_consumer_wakes_on_crossing() {
    let (mut producer, mut consumer) = Pipeline::new(6).unwrap().split();
    let monitor = producer.monitor();

    let handle = thread::spawn(move || consumer.wait_and_drain());

    // two ticks stay below half = 3; the consumer must still be parked
    producer.tick();
    producer.tick();
    thread::sleep(Duration::from_millis(20));
    assert!(!handle.is_finished());
    assert_eq!(monitor.queued(), 2);

    producer.tick();
    assert_eq!(handle.join().unwrap(), 3);
    assert_eq!(monitor.free_slots(), 6);
}
