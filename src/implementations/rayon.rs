use std::time::Instant;

use log::{debug, warn};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

use super::partition::{partition_rows, split_rows_mut};
use super::{merge_delta, prepare_solve, should_stop, sweep_rows, JacobiSolver};
use crate::error::{JacobiError, Result};
use crate::result::JacobiResult;
use crate::system::LinearSystem;

/*
  Rayon版

  書き込み先 (next) をバリア版と同じ行区間で重ならないスライスに分割するので、
  ロックなしで並列に計算できる。ラウンドの終わりで next を current にコピーする。
  スレッドプールはソルブごとに作って捨てる (バリア版と条件を揃えるため)。
*/

#[derive(Clone, Copy, Debug)]
pub struct RayonSolver {
    threads: usize,
}

impl RayonSolver {
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(JacobiError::InvalidConfiguration(
                "スレッド数は1以上である必要があります".to_string(),
            ));
        }
        Ok(RayonSolver { threads })
    }
}

impl JacobiSolver for RayonSolver {
    fn name(&self) -> &'static str {
        "rayon"
    }

    fn thread_count(&self) -> usize {
        self.threads
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
        let workers = self.threads.min(n);
        let pool = ThreadPoolBuilder::new().num_threads(workers).build()?;

        let partitions = partition_rows(n, workers);
        debug!("rayon: n={n}, workers={workers}, partitions={partitions:?}");

        let mut next = vec![0.0; n];
        let start = Instant::now();
        let mut iterations = 0;
        let mut max_delta;

        loop {
            let blocks = split_rows_mut(&mut next, &partitions);
            max_delta = pool.install(|| {
                partitions
                    .par_iter()
                    .zip(blocks)
                    .map(|(range, dst)| sweep_rows(system, &current, range.rows(), dst))
                    .reduce(|| 0.0, merge_delta)
            });

            current.copy_from_slice(&next);
            iterations += 1;

            if should_stop(iterations, max_iterations, max_delta, tolerance) {
                break;
            }
        }

        let elapsed = start.elapsed();
        let converged = max_delta <= tolerance;
        let residual_norm = system.residual_norm(&current)?;

        if !converged {
            warn!("rayon({workers}): {iterations} 回の反復で収束しませんでした (max_delta={max_delta:e})");
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
