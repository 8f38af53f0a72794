pub mod barrier;
pub mod partition;
pub mod rayon;
pub mod single;

use std::ops::Range;

use crate::error::{JacobiError, Result};
use crate::result::JacobiResult;
use crate::system::LinearSystem;

/// 全てのヤコビ法ソルバーが満たす共通インターフェース。
pub trait JacobiSolver {
    /// レポート用の実装名
    fn name(&self) -> &'static str;

    /// 要求されたスレッド数 (実際に使う数は `min(threads, n)`)
    fn thread_count(&self) -> usize;

    fn solve(
        &self,
        system: &LinearSystem,
        tolerance: f64,
        max_iterations: usize,
        initial_guess: Option<&[f64]>,
    ) -> Result<JacobiResult>;
}

/// 反復を始める前の事前条件チェック。成功すれば初期推定値を返す。
pub(crate) fn prepare_solve(
    system: &LinearSystem,
    tolerance: f64,
    max_iterations: usize,
    initial_guess: Option<&[f64]>,
) -> Result<Vec<f64>> {
    // NaNもここで弾く
    if !(tolerance > 0.0) {
        return Err(JacobiError::InvalidConfiguration(format!(
            "許容誤差は正の値である必要があります: {tolerance}"
        )));
    }
    if max_iterations == 0 {
        return Err(JacobiError::InvalidConfiguration(
            "最大反復回数は1以上である必要があります".to_string(),
        ));
    }
    if let Some(row) = system.first_zero_pivot() {
        return Err(JacobiError::SingularPivot { row });
    }

    match initial_guess {
        Some(guess) => {
            system.check_vector(guess, "initial guess")?;
            Ok(guess.to_vec())
        }
        None => Ok(vec![0.0; system.size()]),
    }
}

/// `rows` の各行についてヤコビ更新を計算し `next` に書き込む。
///
/// `next` は `rows` と同じ長さのスライス (`next[0]` が `rows.start` 行目)。
/// `current` は前ラウンドの値で、このラウンド中は読み取り専用。
/// 戻り値はこの範囲内での最大変化量。
pub(crate) fn sweep_rows(
    system: &LinearSystem,
    current: &[f64],
    rows: Range<usize>,
    next: &mut [f64],
) -> f64 {
    let constants = system.constants();
    let mut local_max = 0.0;

    for (i, slot) in rows.zip(next.iter_mut()) {
        let row = system.row(i);
        let mut sum = 0.0;
        for (j, (a, x)) in row.iter().zip(current).enumerate() {
            if j != i {
                sum += a * x;
            }
        }

        let value = (constants[i] - sum) / row[i];
        *slot = value;
        local_max = merge_delta(local_max, (value - current[i]).abs());
    }

    local_max
}

/// 最大変化量の合成。NaNは伝播させる (NaNは許容誤差以下にならないので収束扱いにならない)。
pub(crate) fn merge_delta(acc: f64, delta: f64) -> f64 {
    if acc.is_nan() || delta.is_nan() {
        f64::NAN
    } else {
        acc.max(delta)
    }
}

/// 停止条件。収束したラウンドも反復回数に含める。
pub(crate) fn should_stop(iteration: usize, max_iterations: usize, max_delta: f64, tolerance: f64) -> bool {
    iteration >= max_iterations || max_delta <= tolerance
}
