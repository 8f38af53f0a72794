use clap::Parser;
use env_logger::Env;
use log::warn;
use rand::Rng;

use jacobi_linear::config::{BenchConfig, Cli, Strategy};
use jacobi_linear::generator::{seeded_rng, DiagonalDominantGenerator};
use jacobi_linear::report::{render_header, render_outcome, SizeOutcome};
use jacobi_linear::{PerformanceEvaluator, ParallelSolver, RayonSolver, Result};

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let config = match Cli::parse().into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("エラー: {e}");
            std::process::exit(1);
        }
    };

    println!("{}", render_header(&config));

    let evaluator = PerformanceEvaluator::new();
    let generator = DiagonalDominantGenerator::default();
    // シードなしのサイズはこの乱数源を共有する
    let mut rng = rand::thread_rng();

    for &size in &config.sizes {
        // 事前条件違反はそのサイズだけスキップして次へ進む
        let outcome = run_size(&config, &evaluator, &generator, &mut rng, size).unwrap_or_else(|e| {
            warn!("サイズ {size} をスキップ: {e}");
            SizeOutcome::Skipped {
                size,
                reason: e.to_string(),
            }
        });
        println!("{}", render_outcome(&outcome));
    }

    println!("=== ベンチマーク完了 ===");
}

fn run_size<R: Rng + ?Sized>(
    config: &BenchConfig,
    evaluator: &PerformanceEvaluator,
    generator: &DiagonalDominantGenerator,
    rng: &mut R,
    size: usize,
) -> Result<SizeOutcome> {
    let system = match config.seed_for(size) {
        Some(seed) => generator.generate(size, &mut seeded_rng(seed))?,
        None => generator.generate(size, rng)?,
    };

    if !system.is_diagonally_dominant() {
        warn!("サイズ {size} の生成行列が対角優位ではありません");
        return Ok(SizeOutcome::Skipped {
            size,
            reason: "対角優位ではありません".to_string(),
        });
    }

    let measurements = match config.strategy {
        Strategy::Barrier => {
            let solvers = config
                .parallel_threads()
                .map(ParallelSolver::new)
                .collect::<Result<Vec<_>>>()?;
            evaluator.evaluate(&system, &solvers, config.tolerance, config.max_iterations)?
        }
        Strategy::Rayon => {
            let solvers = config
                .parallel_threads()
                .map(RayonSolver::new)
                .collect::<Result<Vec<_>>>()?;
            evaluator.evaluate(&system, &solvers, config.tolerance, config.max_iterations)?
        }
    };

    Ok(SizeOutcome::Measured { size, measurements })
}
