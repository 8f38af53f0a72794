pub mod barrier_parallel;
pub mod round_barrier;

pub use barrier_parallel::ParallelSolver;
pub use round_barrier::RoundBarrier;
