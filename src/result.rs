use std::time::Duration;

/// 1回のソルブの結果。
#[derive(Clone, Debug)]
pub struct JacobiResult {
    pub solution: Vec<f64>,
    /// 実際に実行したラウンド数 (収束したラウンドも含む)
    pub iterations: usize,
    /// 返した解に対して独立に計算した `‖Ax − b‖₂`
    pub residual_norm: f64,
    pub elapsed: Duration,
    pub converged: bool,
}

impl JacobiResult {
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}
