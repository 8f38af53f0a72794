use std::mem;
use std::time::Instant;

use log::{debug, warn};

use super::{prepare_solve, should_stop, sweep_rows, JacobiSolver};
use crate::error::Result;
use crate::result::JacobiResult;
use crate::system::LinearSystem;

/// シングルスレッド版 (基準実装)
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialSolver;

impl SequentialSolver {
    pub fn new() -> Self {
        SequentialSolver
    }
}

impl JacobiSolver for SequentialSolver {
    fn name(&self) -> &'static str {
        "single"
    }

    fn thread_count(&self) -> usize {
        1
    }

    fn solve(
        &self,
        system: &LinearSystem,
        tolerance: f64,
        max_iterations: usize,
        initial_guess: Option<&[f64]>,
    ) -> Result<JacobiResult> {
        let mut current = prepare_solve(system, tolerance, max_iterations, initial_guess)?;
        let n = system.size();
        let mut next = vec![0.0; n];

        let start = Instant::now();
        let mut iterations = 0;
        let mut max_delta;

        loop {
            max_delta = sweep_rows(system, &current, 0..n, &mut next);
            iterations += 1;

            // 同じラウンド内の更新は前ラウンドの値だけを使うので、丸ごと入れ替える
            mem::swap(&mut current, &mut next);

            if should_stop(iterations, max_iterations, max_delta, tolerance) {
                break;
            }
        }

        let elapsed = start.elapsed();
        let converged = max_delta <= tolerance;
        let residual_norm = system.residual_norm(&current)?;

        debug!("single: n={n}, iterations={iterations}, max_delta={max_delta:e}, converged={converged}");
        if !converged {
            warn!("single: {iterations} 回の反復で収束しませんでした (max_delta={max_delta:e})");
        }

        Ok(JacobiResult {
            solution: current,
            iterations,
            residual_norm,
            elapsed,
            converged,
        })
    }
}
