use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError, RwLock};
use std::thread;
use std::time::Instant;

use log::{debug, warn};

use super::round_barrier::RoundBarrier;
use crate::error::{JacobiError, Result};
use crate::implementations::partition::{partition_rows, split_rows_mut, RowRange};
use crate::implementations::{merge_delta, prepare_solve, should_stop, sweep_rows, JacobiSolver};
use crate::result::JacobiResult;
use crate::system::LinearSystem;

/*
  バリア同期による並列ヤコビ法

  行を連続区間に静的分割し、各ワーカーが自分の区間だけを計算する。

  各ラウンドの流れ：
  1. current (ラウンド中は読み取り専用) を読み、next の自分の区間にだけ書く
  2. 自分の区間の最大変化量を自分のスロットに保存
  3. バリアで全員を待つ。最後に到着したスレッドがコーディネーターとして
     - 全スロットの最大値を取る
     - next を current にコピー
     - 反復回数を進める
     - 停止条件を満たせば stop を立てる
  4. 解放後 stop を確認し、立っていれば終了

  next の各区間は互いに重ならないので、区間ごとの Mutex は
  コーディネーターのコピー時以外に競合しない。
*/

/// ラウンドをまたいで共有される状態
struct SharedRound<'a> {
    current: RwLock<Vec<f64>>,
    // next バッファをワーカーごとの書き込み区間に分割したもの
    next: Vec<Mutex<&'a mut [f64]>>,
    partitions: Vec<RowRange>,
    local_deltas: Vec<AtomicU64>,
    stop: AtomicBool,
    iteration: AtomicUsize,
    max_delta: AtomicU64,
}

impl<'a> SharedRound<'a> {
    fn new(current: Vec<f64>, next_buffer: &'a mut [f64], partitions: Vec<RowRange>) -> Self {
        let next = split_rows_mut(next_buffer, &partitions)
            .into_iter()
            .map(Mutex::new)
            .collect();

        let local_deltas = partitions.iter().map(|_| AtomicU64::new(0)).collect();

        SharedRound {
            current: RwLock::new(current),
            next,
            partitions,
            local_deltas,
            stop: AtomicBool::new(false),
            iteration: AtomicUsize::new(0),
            max_delta: AtomicU64::new(f64::INFINITY.to_bits()),
        }
    }

    /// バリアのコーディネーター処理。全員到着後、解放前に1回だけ呼ばれる。
    fn coordinate(&self, tolerance: f64, max_iterations: usize) {
        let max_delta = self
            .local_deltas
            .iter()
            .map(|slot| f64::from_bits(slot.load(Ordering::Acquire)))
            .fold(0.0, merge_delta);

        {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            for (range, slot) in self.partitions.iter().zip(&self.next) {
                let next = slot.lock().unwrap_or_else(PoisonError::into_inner);
                current[range.rows()].copy_from_slice(&**next);
            }
        }

        let iteration = self.iteration.fetch_add(1, Ordering::AcqRel) + 1;
        self.max_delta.store(max_delta.to_bits(), Ordering::Release);

        if should_stop(iteration, max_iterations, max_delta, tolerance) {
            self.stop.store(true, Ordering::Release);
        }
    }
}

fn run_worker<F>(
    system: &LinearSystem,
    shared: &SharedRound<'_>,
    barrier: &RoundBarrier<F>,
    worker: usize,
    range: RowRange,
) where
    F: Fn() + Sync,
{
    loop {
        if shared.stop.load(Ordering::Acquire) {
            break;
        }

        // ガードはバリアに入る前に必ず解放する (コーディネーターが書き込むため)
        let local_max = {
            let current = shared.current.read().unwrap_or_else(PoisonError::into_inner);
            let mut next = shared.next[worker]
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            sweep_rows(system, &current, range.rows(), &mut **next)
        };
        shared.local_deltas[worker].store(local_max.to_bits(), Ordering::Release);

        barrier.wait();
    }
}

/// スレッド + ラウンドバリアによる並列版
#[derive(Clone, Copy, Debug)]
pub struct ParallelSolver {
    threads: usize,
}

impl ParallelSolver {
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(JacobiError::InvalidConfiguration(
                "スレッド数は1以上である必要があります".to_string(),
            ));
        }
        Ok(ParallelSolver { threads })
    }

    /// 行数より多いワーカーは作らない
    pub fn effective_workers(&self, n: usize) -> usize {
        self.threads.min(n)
    }
}

impl JacobiSolver for ParallelSolver {
    fn name(&self) -> &'static str {
        "barrier"
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
        let current = prepare_solve(system, tolerance, max_iterations, initial_guess)?;
        let n = system.size();
        let workers = self.effective_workers(n);
        let partitions = partition_rows(n, workers);
        debug!("barrier: n={n}, requested={}, workers={workers}, partitions={partitions:?}", self.threads);

        let mut next_buffer = vec![0.0; n];
        let start = Instant::now();
        let shared = SharedRound::new(current, &mut next_buffer, partitions);

        {
            let barrier = RoundBarrier::new(workers, || shared.coordinate(tolerance, max_iterations));

            // スレッドの寿命はこのソルブ1回分だけ
            thread::scope(|scope| {
                for (worker, &range) in shared.partitions.iter().enumerate() {
                    let shared = &shared;
                    let barrier = &barrier;
                    scope.spawn(move || run_worker(system, shared, barrier, worker, range));
                }
            });
        }

        let elapsed = start.elapsed();
        let iterations = shared.iteration.load(Ordering::Acquire);
        let max_delta = f64::from_bits(shared.max_delta.load(Ordering::Acquire));
        let solution = shared
            .current
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        let converged = max_delta <= tolerance;
        let residual_norm = system.residual_norm(&solution)?;

        debug!("barrier: workers={workers}, iterations={iterations}, max_delta={max_delta:e}, converged={converged}");
        if !converged {
            warn!("barrier({workers}): {iterations} 回の反復で収束しませんでした (max_delta={max_delta:e})");
        }

        Ok(JacobiResult {
            solution,
            iterations,
            residual_norm,
            elapsed,
            converged,
        })
    }
}
