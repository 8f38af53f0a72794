use std::thread;

use clap::{Parser, ValueEnum};

use crate::error::{JacobiError, Result};

pub const DEFAULT_SIZES: [usize; 3] = [200, 500, 1000];
pub const DEFAULT_TOLERANCE: f64 = 1e-8;
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// 並列版の実装方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// スレッド + ラウンドバリア
    Barrier,
    /// Rayon スレッドプール
    Rayon,
}

#[derive(Parser, Debug)]
#[command(name = "jacobi-bench", about = "ヤコビ法 (密行列) の並列化ベンチマーク")]
pub struct Cli {
    /// 行列サイズ (カンマ区切り)
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SIZES)]
    pub sizes: Vec<usize>,

    /// スレッド数 (カンマ区切り, 省略時は 1 と論理CPU数)
    #[arg(long, value_delimiter = ',')]
    pub threads: Vec<usize>,

    /// 収束判定の許容誤差 (各成分の最大変化量)
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    pub tolerance: f64,

    /// 最大反復回数
    #[arg(long, alias = "maxiterations", default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,

    /// 乱数シード (サイズごとに seed + size を使う)
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, value_enum, default_value_t = Strategy::Barrier)]
    pub strategy: Strategy,
}

/// 検証済みのベンチマーク設定
#[derive(Clone, Debug, PartialEq)]
pub struct BenchConfig {
    /// 昇順・重複なし
    pub sizes: Vec<usize>,
    /// 昇順・重複なし・必ず 1 を含む
    pub threads: Vec<usize>,
    pub tolerance: f64,
    pub max_iterations: usize,
    pub seed: Option<u64>,
    pub strategy: Strategy,
}

impl BenchConfig {
    pub fn seed_for(&self, size: usize) -> Option<u64> {
        self.seed.map(|seed| seed.wrapping_add(size as u64))
    }

    /// 並列版で計測するスレッド数 (1 は基準として別に実行する)
    pub fn parallel_threads(&self) -> impl Iterator<Item = usize> + '_ {
        self.threads.iter().copied().filter(|&t| t > 1)
    }
}

impl Cli {
    pub fn into_config(self) -> Result<BenchConfig> {
        let sizes = normalize(self.sizes, "sizes")?;

        let threads = if self.threads.is_empty() {
            let cpus = thread::available_parallelism().map_or(1, |n| n.get());
            vec![1, cpus]
        } else {
            self.threads
        };
        let mut threads = normalize(threads, "threads")?;
        if threads.first() != Some(&1) {
            threads.insert(0, 1);
        }

        if !(self.tolerance > 0.0) || !self.tolerance.is_finite() {
            return Err(JacobiError::InvalidConfiguration(format!(
                "tolerance は正の有限値である必要があります: {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(JacobiError::InvalidConfiguration(
                "max-iterations は1以上である必要があります".to_string(),
            ));
        }

        Ok(BenchConfig {
            sizes,
            threads,
            tolerance: self.tolerance,
            max_iterations: self.max_iterations,
            seed: self.seed,
            strategy: self.strategy,
        })
    }
}

// 0 を拒否し、昇順に並べて重複を除く
fn normalize(mut values: Vec<usize>, option: &str) -> Result<Vec<usize>> {
    if values.is_empty() {
        return Err(JacobiError::InvalidConfiguration(format!(
            "{option} に少なくとも1つの値を指定してください"
        )));
    }
    if values.contains(&0) {
        return Err(JacobiError::InvalidConfiguration(format!(
            "{option} の値は正の整数である必要があります"
        )));
    }
    values.sort_unstable();
    values.dedup();
    Ok(values)
}
