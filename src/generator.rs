use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{JacobiError, Result};
use crate::system::{coefficient_count, LinearSystem};

pub const DEFAULT_DIAGONAL_GAP: f64 = 5.0;

const OFF_DIAGONAL_RANGE: (f64, f64) = (-10.0, 10.0);
const CONSTANT_RANGE: (f64, f64) = (-20.0, 20.0);

/// 狭義対角優位な乱数行列の生成器。
///
/// 非対角成分は `[-10, 10)` の一様乱数、対角成分は行の非対角成分の絶対値和に
/// `min_diagonal_gap` を足した値、定数ベクトルは `[-20, 20)` の一様乱数。
/// 乱数源は呼び出し側が明示的に渡す。
#[derive(Clone, Copy, Debug)]
pub struct DiagonalDominantGenerator {
    min_diagonal_gap: f64,
}

impl Default for DiagonalDominantGenerator {
    fn default() -> Self {
        DiagonalDominantGenerator {
            min_diagonal_gap: DEFAULT_DIAGONAL_GAP,
        }
    }
}

impl DiagonalDominantGenerator {
    pub fn new(min_diagonal_gap: f64) -> Result<Self> {
        if !(min_diagonal_gap > 0.0) {
            return Err(JacobiError::InvalidConfiguration(format!(
                "対角成分の余裕は正の値である必要があります: {min_diagonal_gap}"
            )));
        }
        Ok(DiagonalDominantGenerator { min_diagonal_gap })
    }

    pub fn generate<R: Rng + ?Sized>(&self, size: usize, rng: &mut R) -> Result<LinearSystem> {
        if size == 0 {
            return Err(JacobiError::InvalidConfiguration(
                "行列サイズは1以上である必要があります".to_string(),
            ));
        }

        let mut coefficients = vec![0.0; coefficient_count(size)?];
        let mut constants = Vec::with_capacity(size);

        for i in 0..size {
            let row = &mut coefficients[i * size..(i + 1) * size];
            let mut row_sum = 0.0;
            for (j, a) in row.iter_mut().enumerate() {
                if i == j {
                    continue;
                }
                let value = rng.gen_range(OFF_DIAGONAL_RANGE.0..OFF_DIAGONAL_RANGE.1);
                *a = value;
                row_sum += value.abs();
            }
            row[i] = row_sum + self.min_diagonal_gap;
            constants.push(rng.gen_range(CONSTANT_RANGE.0..CONSTANT_RANGE.1));
        }

        LinearSystem::new(size, coefficients, constants)
    }
}

/// 再現可能な生成用の乱数源
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}
