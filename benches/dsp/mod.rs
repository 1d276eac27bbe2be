//! Benchmarks for the processing stages.

mod delay;
mod diffuser;
mod filter;
mod network;

pub use delay::bench_delay;
pub use diffuser::bench_diffuser;
pub use filter::bench_filter;
pub use network::bench_network;
