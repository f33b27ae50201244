/*!
 * Barrier Family
 * Busy-spin rendezvous points: one-shot and reusable (cyclic)
 */

mod cyclic;
mod spin;

pub use cyclic::CyclicSpinBarrier;
pub use spin::SpinBarrier;
