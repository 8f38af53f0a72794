use clap::Parser;
use env_logger::Env;

use jacobi_linear::generator::{seeded_rng, DiagonalDominantGenerator};
use jacobi_linear::{JacobiResult, JacobiSolver, ParallelSolver, RayonSolver, Result, SequentialSolver};

/// 同じシステムを全ての実装で解き、シングルスレッド版との差を表示する
#[derive(Parser, Debug)]
#[command(name = "compare-solvers")]
struct Args {
    #[arg(long, default_value_t = 200)]
    size: usize,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 4)]
    threads: usize,

    #[arg(long, default_value_t = 1e-8)]
    tolerance: f64,

    #[arg(long, default_value_t = 10_000)]
    max_iterations: usize,
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("エラー: {e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let system = DiagonalDominantGenerator::default().generate(args.size, &mut seeded_rng(args.seed))?;

    println!("=== 実装ごとの結果比較 ===");
    println!("サイズ: {}, シード: {}, スレッド数: {}", args.size, args.seed, args.threads);
    println!();

    let solvers: Vec<Box<dyn JacobiSolver>> = vec![
        Box::new(SequentialSolver::new()),
        Box::new(ParallelSolver::new(args.threads)?),
        Box::new(RayonSolver::new(args.threads)?),
    ];

    let mut reference: Option<JacobiResult> = None;
    for solver in &solvers {
        let result = solver.solve(&system, args.tolerance, args.max_iterations, None)?;
        let diff = reference
            .as_ref()
            .map_or(0.0, |r| max_abs_diff(&r.solution, &result.solution));

        println!("{} ({} スレッド):", solver.name(), solver.thread_count());
        println!("  反復回数 = {}, 収束 = {}", result.iterations, result.converged);
        println!("  残差     = {:.3e}", result.residual_norm);
        println!("  時間     = {:.2} ms", result.elapsed_ms());
        println!("  single との最大差 = {diff:.3e}");
        println!();

        if reference.is_none() {
            reference = Some(result);
        }
    }

    Ok(())
}

fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).fold(0.0, f64::max)
}
