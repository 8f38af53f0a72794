pub mod config;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod implementations;
pub mod report;
pub mod result;
pub mod system;

pub use error::{JacobiError, Result};
pub use evaluator::{PerformanceEvaluator, SpeedupMeasurement};
pub use implementations::barrier::ParallelSolver;
pub use implementations::rayon::RayonSolver;
pub use implementations::single::SequentialSolver;
pub use implementations::JacobiSolver;
pub use result::JacobiResult;
pub use system::LinearSystem;
