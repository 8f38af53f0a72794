use crate::config::BenchConfig;
use crate::evaluator::SpeedupMeasurement;

/// 1つのサイズに対するベンチマークの最終結果。
/// 「スキップ」「収束せず」「収束」の3つを区別して表示する。
#[derive(Clone, Debug)]
pub enum SizeOutcome {
    /// 入力が不正 (対角優位でない等) で実行しなかった
    Skipped { size: usize, reason: String },
    Measured {
        size: usize,
        measurements: Vec<SpeedupMeasurement>,
    },
}

impl SizeOutcome {
    pub fn size(&self) -> usize {
        match self {
            SizeOutcome::Skipped { size, .. } | SizeOutcome::Measured { size, .. } => *size,
        }
    }
}

pub fn status_label(converged: bool) -> &'static str {
    if converged {
        "収束"
    } else {
        "未収束"
    }
}

/// 設定のヘッダー
pub fn render_header(config: &BenchConfig) -> String {
    let mut lines = vec![
        "=== ヤコビ法 連立一次方程式ベンチマーク ===".to_string(),
        format!(
            "許容誤差: {:e}, 最大反復回数: {}, 方式: {:?}",
            config.tolerance, config.max_iterations, config.strategy
        ),
        format!("行列サイズ: {}", join_values(&config.sizes)),
        format!("スレッド数: {}", join_values(&config.threads)),
    ];
    if let Some(seed) = config.seed {
        lines.push(format!("乱数シード: {seed}"));
    }
    finish(lines)
}

/// スレッド数の昇順に並べた結果表
pub fn render_outcome(outcome: &SizeOutcome) -> String {
    match outcome {
        SizeOutcome::Skipped { size, reason } => {
            finish(vec![format!("行列サイズ {size}: スキップ ({reason})")])
        }
        SizeOutcome::Measured { size, measurements } => {
            let mut rows: Vec<&SpeedupMeasurement> = measurements.iter().collect();
            rows.sort_by_key(|m| m.thread_count);

            let mut lines = vec![
                format!("行列サイズ: {size}"),
                format!(
                    "{:>7} | {:>10} | {:>6} | {:>9} | {:>7} | 状態",
                    "threads", "time (ms)", "iters", "residual", "speedup"
                ),
            ];
            lines.extend(rows.into_iter().map(|m| {
                format!(
                    "{:>7} | {:>10.2} | {:>6} | {:>9.2e} | {:>7.2} | {}",
                    m.thread_count,
                    m.measured.elapsed_ms(),
                    m.measured.iterations,
                    m.measured.residual_norm,
                    m.speedup,
                    status_label(m.measured.converged)
                )
            }));
            finish(lines)
        }
    }
}

// 各行末に改行を付けて連結する
fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn join_values(values: &[usize]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
