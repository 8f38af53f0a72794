use jacobi_linear::generator::{seeded_rng, DiagonalDominantGenerator};
use jacobi_linear::{
    JacobiError, JacobiResult, JacobiSolver, LinearSystem, ParallelSolver, RayonSolver,
    SequentialSolver,
};
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-8;
const MAX_ITERATIONS: usize = 10_000;

/// ベクトルの全要素が epsilon 以内で一致するかチェック
fn vectors_are_close(v1: &[f64], v2: &[f64], epsilon: f64) -> bool {
    if v1.len() != v2.len() {
        return false;
    }

    for i in 0..v1.len() {
        let diff = (v1[i] - v2[i]).abs();
        if diff > epsilon {
            eprintln!("Mismatch at index {}: {} vs {} (diff: {})", i, v1[i], v2[i], diff);
            return false;
        }
    }

    true
}

fn two_by_two() -> LinearSystem {
    LinearSystem::from_rows(vec![vec![10.0, 1.0], vec![1.0, 10.0]], vec![11.0, 11.0]).unwrap()
}

fn generated(size: usize, seed: u64) -> LinearSystem {
    DiagonalDominantGenerator::default()
        .generate(size, &mut seeded_rng(seed))
        .unwrap()
}

fn solve_all(system: &LinearSystem, threads: usize, tolerance: f64) -> Vec<JacobiResult> {
    let solvers: Vec<Box<dyn JacobiSolver>> = vec![
        Box::new(SequentialSolver::new()),
        Box::new(ParallelSolver::new(threads).unwrap()),
        Box::new(RayonSolver::new(threads).unwrap()),
    ];
    solvers
        .iter()
        .map(|s| s.solve(system, tolerance, MAX_ITERATIONS, None).unwrap())
        .collect()
}

#[test]
fn scenario_a_two_by_two_converges_to_ones() {
    let system = two_by_two();

    for result in solve_all(&system, 2, 1e-10) {
        assert!(result.converged);
        // 変化量は反復ごとに 1/10 になる: 1.1 * 0.1^(k-1) <= 1e-10 となるのは k = 12
        assert_eq!(result.iterations, 12);
        assert!(vectors_are_close(&result.solution, &[1.0, 1.0], 1e-10));
    }

    println!("✓ 2x2 system: converged to [1, 1] in 12 iterations");
}

#[test]
fn scenario_b_generated_system_converges_with_small_residual() {
    let system = generated(50, 42);

    let result = SequentialSolver::new()
        .solve(&system, TOLERANCE, MAX_ITERATIONS, None)
        .unwrap();
    assert!(result.converged);
    assert!(result.iterations < MAX_ITERATIONS);
    // StdRng(42) の行列では許容誤差 1e-8 で残差は約 2.1e-7 になる
    assert!(result.residual_norm < 1e-6, "residual = {}", result.residual_norm);

    let tight = SequentialSolver::new()
        .solve(&system, 1e-12, MAX_ITERATIONS, None)
        .unwrap();
    assert!(tight.converged);
    assert!(tight.residual_norm < 1e-7, "residual = {}", tight.residual_norm);
    assert!(tight.iterations > result.iterations);
}

#[test]
fn scenario_c_parallel_worker_counts_agree() {
    let system = generated(50, 42);
    let mut solutions = Vec::new();

    for threads in [1, 2, 4, 8] {
        let result = ParallelSolver::new(threads)
            .unwrap()
            .solve(&system, TOLERANCE, MAX_ITERATIONS, None)
            .unwrap();
        assert!(result.converged, "threads = {threads}");
        solutions.push(result.solution);
    }

    for a in &solutions {
        for b in &solutions {
            assert!(vectors_are_close(a, b, 1e-6));
        }
    }

    let single = SequentialSolver::new()
        .solve(&system, TOLERANCE, MAX_ITERATIONS, None)
        .unwrap();
    assert!(vectors_are_close(&single.solution, &solutions[0], 1e-6));

    println!("✓ Barrier 1/2/4/8 threads: Results match!");
}

#[test]
fn test_single_vs_barrier_vs_rayon() {
    let system = generated(120, 7);
    let results = solve_all(&system, 4, TOLERANCE);

    let single = &results[0];
    for other in &results[1..] {
        assert!(other.converged);
        assert!(vectors_are_close(&single.solution, &other.solution, 10.0 * TOLERANCE));
        // 同じ丸め誤差の範囲内で反復回数もほぼ一致する
        assert!(single.iterations.abs_diff(other.iterations) <= 1);
    }

    println!("✓ Single vs Barrier vs Rayon: Results match!");
}

#[test]
fn test_single_worker_matches_sequential() {
    let system = generated(64, 3);

    let single = SequentialSolver::new()
        .solve(&system, TOLERANCE, MAX_ITERATIONS, None)
        .unwrap();
    let barrier = ParallelSolver::new(1)
        .unwrap()
        .solve(&system, TOLERANCE, MAX_ITERATIONS, None)
        .unwrap();

    assert_eq!(single.iterations, barrier.iterations);
    assert!(vectors_are_close(&single.solution, &barrier.solution, 1e-12));
}

#[test]
fn test_single_thread_determinism() {
    let system = generated(80, 11);
    let guess = vec![0.5; 80];
    let solver = SequentialSolver::new();

    let first = solver.solve(&system, TOLERANCE, MAX_ITERATIONS, Some(guess.as_slice())).unwrap();
    let second = solver.solve(&system, TOLERANCE, MAX_ITERATIONS, Some(guess.as_slice())).unwrap();

    // ビット単位で一致する
    assert_eq!(first.solution, second.solution);
    assert_eq!(first.iterations, second.iterations);
    assert_eq!(first.residual_norm.to_bits(), second.residual_norm.to_bits());
}

#[test]
fn test_parallel_repeatability() {
    let system = generated(80, 11);
    let solver = ParallelSolver::new(3).unwrap();

    let first = solver.solve(&system, TOLERANCE, MAX_ITERATIONS, None).unwrap();
    let second = solver.solve(&system, TOLERANCE, MAX_ITERATIONS, None).unwrap();

    assert_eq!(first.iterations, second.iterations);
    assert!(vectors_are_close(&first.solution, &second.solution, 1e-14));
}

#[test]
fn test_more_workers_than_rows() {
    let system = LinearSystem::from_rows(
        vec![
            vec![4.0, 1.0, 0.0],
            vec![1.0, 4.0, 1.0],
            vec![0.0, 1.0, 4.0],
        ],
        vec![5.0, 6.0, 5.0],
    )
    .unwrap();

    let solver = ParallelSolver::new(16).unwrap();
    assert_eq!(solver.effective_workers(system.size()), 3);
    assert_eq!(solver.thread_count(), 16);

    let result = solver.solve(&system, 1e-12, MAX_ITERATIONS, None).unwrap();
    assert!(result.converged);
    assert!(vectors_are_close(&result.solution, &[1.0, 1.0, 1.0], 1e-10));

    let rayon = RayonSolver::new(16).unwrap().solve(&system, 1e-12, MAX_ITERATIONS, None).unwrap();
    assert!(vectors_are_close(&result.solution, &rayon.solution, 1e-12));
}

#[test]
fn test_rayon_uneven_split_matches_barrier() {
    // 10行を6ワーカーで分けると 2,2,2,2,1,1 になる
    let system = generated(10, 21);

    let barrier = ParallelSolver::new(6).unwrap().solve(&system, 1e-12, MAX_ITERATIONS, None).unwrap();
    let rayon = RayonSolver::new(6).unwrap().solve(&system, 1e-12, MAX_ITERATIONS, None).unwrap();

    assert!(rayon.converged);
    assert_eq!(rayon.iterations, barrier.iterations);
    assert_eq!(rayon.solution, barrier.solution);
}

#[test]
fn test_one_by_one_system() {
    let system = LinearSystem::new(1, vec![4.0], vec![2.0]).unwrap();

    for result in solve_all(&system, 8, TOLERANCE) {
        assert_eq!(result.solution, vec![0.5]);
        // 1回目で 0.5 に到達し、2回目で変化量 0 を確認する
        assert_eq!(result.iterations, 2);
        assert!(result.converged);
    }
}

#[test]
fn test_residual_matches_recomputation() {
    let system = generated(40, 5);

    for result in solve_all(&system, 3, 1e-6) {
        let recomputed = system.residual_norm(&result.solution).unwrap();
        assert_eq!(result.residual_norm.to_bits(), recomputed.to_bits());
    }
}

#[test]
fn test_exact_initial_guess_stops_after_one_round() {
    let system = two_by_two();
    let guess = [1.0, 1.0];

    let single = SequentialSolver::new().solve(&system, 1e-10, 100, Some(guess.as_slice())).unwrap();
    let barrier = ParallelSolver::new(2).unwrap().solve(&system, 1e-10, 100, Some(guess.as_slice())).unwrap();

    for result in [single, barrier] {
        assert_eq!(result.iterations, 1);
        assert!(result.converged);
        assert_eq!(result.solution, vec![1.0, 1.0]);
    }
}

#[test]
fn test_max_iterations_reached_without_convergence() {
    let system = generated(30, 9);

    for result in solve_all_with_cap(&system, 3) {
        assert_eq!(result.iterations, 3);
        assert!(!result.converged);
    }
}

fn solve_all_with_cap(system: &LinearSystem, max_iterations: usize) -> Vec<JacobiResult> {
    let solvers: Vec<Box<dyn JacobiSolver>> = vec![
        Box::new(SequentialSolver::new()),
        Box::new(ParallelSolver::new(4).unwrap()),
        Box::new(RayonSolver::new(4).unwrap()),
    ];
    solvers
        .iter()
        .map(|s| s.solve(system, 1e-14, max_iterations, None).unwrap())
        .collect()
}

#[test]
fn test_divergent_system_reports_non_convergence() {
    // 対角優位でないので発散する
    let system =
        LinearSystem::from_rows(vec![vec![1.0, 2.0], vec![2.0, 1.0]], vec![3.0, 3.0]).unwrap();

    for result in solve_all_with_cap(&system, 50) {
        assert_eq!(result.iterations, 50);
        assert!(!result.converged);
    }

    // 無限大まで発散しても収束扱いにはならない
    for result in solve_all_with_cap(&system, 5000) {
        assert_eq!(result.iterations, 5000);
        assert!(!result.converged);
    }
}

#[test]
fn scenario_d_zero_diagonal_is_rejected() {
    let system = LinearSystem::from_rows(
        vec![vec![4.0, 1.0, 0.0], vec![1.0, 0.0, 1.0], vec![0.0, 1.0, 4.0]],
        vec![1.0, 1.0, 1.0],
    )
    .unwrap();

    let single = SequentialSolver::new().solve(&system, TOLERANCE, MAX_ITERATIONS, None);
    assert!(matches!(single, Err(JacobiError::SingularPivot { row: 1 })));

    let barrier = ParallelSolver::new(2).unwrap().solve(&system, TOLERANCE, MAX_ITERATIONS, None);
    assert!(matches!(barrier, Err(JacobiError::SingularPivot { row: 1 })));

    let rayon = RayonSolver::new(2).unwrap().solve(&system, TOLERANCE, MAX_ITERATIONS, None);
    assert!(matches!(rayon, Err(JacobiError::SingularPivot { row: 1 })));
}

#[test]
fn scenario_e_zero_workers_is_rejected() {
    assert!(matches!(ParallelSolver::new(0), Err(JacobiError::InvalidConfiguration(_))));
    assert!(matches!(RayonSolver::new(0), Err(JacobiError::InvalidConfiguration(_))));
}

#[test]
fn test_invalid_solve_arguments() {
    let system = two_by_two();
    let solver = ParallelSolver::new(2).unwrap();

    assert!(matches!(
        solver.solve(&system, 0.0, 100, None),
        Err(JacobiError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        solver.solve(&system, f64::NAN, 100, None),
        Err(JacobiError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        SequentialSolver::new().solve(&system, 1e-8, 0, None),
        Err(JacobiError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        solver.solve(&system, 1e-8, 100, Some(&[1.0, 2.0, 3.0][..])),
        Err(JacobiError::DimensionMismatch { expected: 2, actual: 3, .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_parallel_agrees_with_sequential(
        size in 1usize..40,
        seed in any::<u64>(),
        threads in 1usize..9,
    ) {
        let system = generated(size, seed);

        let single = SequentialSolver::new().solve(&system, 1e-9, MAX_ITERATIONS, None).unwrap();
        let barrier = ParallelSolver::new(threads)
            .unwrap()
            .solve(&system, 1e-9, MAX_ITERATIONS, None)
            .unwrap();

        prop_assert!(single.converged);
        prop_assert!(barrier.converged);
        prop_assert!(vectors_are_close(&single.solution, &barrier.solution, 1e-8));
        prop_assert_eq!(
            barrier.residual_norm.to_bits(),
            system.residual_norm(&barrier.solution).unwrap().to_bits()
        );
    }
}
