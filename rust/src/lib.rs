//! # SlotPipe - Batched Producer/Consumer Handoff over a Fixed Slot Pool
//!
//! A periodic single-producer/single-consumer pipeline built from three primitives:
//! a fixed-capacity pool of reusable record slots, a bounded FIFO transport queue,
//! and a binary batch-ready signal that is only raised when the number of queued
//! records first crosses half of the pool capacity.
//!
//! ## Features
//!
//! - **No runtime allocation**: every slot is created up front by `SlotPool`; the
//!   producer borrows one per tick and the consumer hands it back after draining
//! - **Ownership-checked reuse**: `Slot` is moved on acquire and release, so a
//!   released slot cannot be touched by its former owner
//! - **Never-blocking producer**: pool and queue are lock-free, counters are atomic;
//!   an empty pool drops the tick's record instead of stalling
//! - **Batched wakeups**: the consumer is woken once per threshold crossing and then
//!   drains the queue to empty
//!
//! ## Basic Usage
//!
//! ```rust
//! use slotpipe::pipeline::Pipeline;
//!
//! let (mut producer, mut consumer) = Pipeline::new(8).unwrap().split();
//! let monitor = producer.monitor();
//!
//! // Pending goes 0 -> 4; only the fourth tick crosses half capacity.
//! for _ in 0..3 {
//!     assert!(!producer.tick().crossed());
//! }
//! assert!(producer.tick().crossed());
//!
//! // The signal is up, so the consumer does not block; it drains everything.
//! assert!(monitor.signal_ready());
//! assert_eq!(consumer.wait_and_drain(), 4);
//!
//! assert_eq!(monitor.free_slots(), 8);
//! assert_eq!(monitor.pending(), 0);
//! ```
//!
//! ## Running Threaded
//!
//! The producer is usually driven by a [`timer::PeriodicTimer`] on its own thread while
//! the consumer blocks on the signal:
//!
//! ```rust
//! use std::sync::atomic::AtomicBool;
//! use std::time::Duration;
//! use slotpipe::pipeline::Pipeline;
//! use slotpipe::timer::PeriodicTimer;
//!
//! let (mut producer, mut consumer) = Pipeline::new(4).unwrap().split();
//! let monitor = consumer.monitor();
//! let timer = PeriodicTimer::start(Duration::ZERO, Duration::from_millis(1), move || {
//!     producer.tick();
//! })
//! .unwrap();
//!
//! while monitor.last_sequence() < 10 {
//!     consumer.wait_and_drain();
//! }
//! timer.stop();
//!
//! let stop = AtomicBool::new(true);
//! consumer.run_until(&stop, Duration::from_millis(1));
//! assert_eq!(monitor.queued(), 0);
//! ```
//!
//! ## Configuration
//!
//! [`config::PipelineConfig`] carries the capacity and timer period. It can be built
//! from inline JSON or from the `SLOTPIPE_*` environment variables:
//!
//! ```rust
//! use slotpipe::config::PipelineConfig;
//!
//! let config = PipelineConfig::from_json_str(r#"{"capacity": 16, "period_ms": 250}"#).unwrap();
//! assert_eq!(config.half(), 8);
//! ```
//!
//! ## Binaries
//!
//! ```bash
//! # Run the pipeline forever, one record per second
//! cargo run --bin slotpipe
//!
//! # Simulate stalled consumers and report drop rates
//! cargo run --bin overload_runner
//! ```

pub mod clock;
pub mod config;
pub mod consumer;
pub mod error;
pub mod pipeline;
pub mod producer;
pub mod record;
pub mod signal;
pub mod slotpool;
pub mod stats;
pub mod timer;
pub mod transport;
