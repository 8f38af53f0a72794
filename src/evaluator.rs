use log::info;

use crate::error::Result;
use crate::implementations::single::SequentialSolver;
use crate::implementations::JacobiSolver;
use crate::result::JacobiResult;
use crate::system::LinearSystem;

/// 1つの構成 (スレッド数) に対する計測結果
#[derive(Clone, Debug)]
pub struct SpeedupMeasurement {
    pub size: usize,
    pub thread_count: usize,
    /// 常にシングルスレッドの結果
    pub baseline: JacobiResult,
    pub measured: JacobiResult,
    /// baseline / measured。measured が 0 なら +∞
    pub speedup: f64,
}

/// `baseline_ms / measured_ms`。計測時間が 0 のときは +∞ を返す。
pub fn speedup_ratio(baseline: &JacobiResult, measured: &JacobiResult) -> f64 {
    let measured_ms = measured.elapsed_ms();
    if measured_ms == 0.0 {
        f64::INFINITY
    } else {
        baseline.elapsed_ms() / measured_ms
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct PerformanceEvaluator {
    baseline_solver: SequentialSolver,
}

impl PerformanceEvaluator {
    pub fn new() -> Self {
        PerformanceEvaluator::default()
    }

    /// シングルスレッド版を1回実行して基準とし、続けて各並列構成を1回ずつ実行する。
    ///
    /// 結果の先頭は常に基準 (スレッド数1, 高速化1.0)。構成は与えられた順に
    /// 1つずつ実行し、同時には走らせない。収束しなかった場合もそのまま結果に含める。
    pub fn evaluate<S: JacobiSolver>(
        &self,
        system: &LinearSystem,
        solvers: &[S],
        tolerance: f64,
        max_iterations: usize,
    ) -> Result<Vec<SpeedupMeasurement>> {
        let size = system.size();
        let baseline = self
            .baseline_solver
            .solve(system, tolerance, max_iterations, None)?;
        info!(
            "n={size} single: {:.2} ms, {} 回, 残差 {:.2e}",
            baseline.elapsed_ms(),
            baseline.iterations,
            baseline.residual_norm
        );

        let mut measurements = Vec::with_capacity(solvers.len() + 1);
        measurements.push(SpeedupMeasurement {
            size,
            thread_count: 1,
            baseline: baseline.clone(),
            measured: baseline.clone(),
            speedup: 1.0,
        });

        for solver in solvers {
            let measured = solver.solve(system, tolerance, max_iterations, None)?;
            let speedup = speedup_ratio(&baseline, &measured);
            info!(
                "n={size} {}({}): {:.2} ms, {} 回, 高速化 {speedup:.2}",
                solver.name(),
                solver.thread_count(),
                measured.elapsed_ms(),
                measured.iterations
            );

            measurements.push(SpeedupMeasurement {
                size,
                thread_count: solver.thread_count(),
                baseline: baseline.clone(),
                measured,
                speedup,
            });
        }

        Ok(measurements)
    }
}
