/*!
 * Container Family
 * Unbounded FIFO containers over a shared sentinel-headed node list:
 * - ConcurrentQueue: multi-producer/multi-consumer, two-lock
 * - ConcurrentStream: single-producer/single-consumer, lock-free
 */

mod mpmc;
mod node;
mod spsc;

pub use mpmc::ConcurrentQueue;
pub use spsc::{stream, stream_with_policy, StreamConsumer, StreamProducer};
