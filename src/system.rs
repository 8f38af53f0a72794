use crate::error::{JacobiError, Result};

/// 連立一次方程式 `Ax = b`。
///
/// 係数行列は行優先の連続バッファ `coefficients[i * n + j]` として保持する。
/// 構築後は変更不可で、「変更」系のメソッドは新しいインスタンスを返す。
#[derive(Clone, Debug, PartialEq)]
pub struct LinearSystem {
    n: usize,
    coefficients: Vec<f64>,
    constants: Vec<f64>,
}

impl LinearSystem {
    /// 行優先の係数データ (長さ `n * n`) と定数ベクトル (長さ `n`) から構築する。
    pub fn new(n: usize, coefficients: Vec<f64>, constants: Vec<f64>) -> Result<Self> {
        if n == 0 {
            return Err(JacobiError::DimensionMismatch {
                what: "system size",
                expected: 1,
                actual: 0,
            });
        }
        let expected = coefficient_count(n)?;
        if coefficients.len() != expected {
            return Err(JacobiError::DimensionMismatch {
                what: "coefficient count",
                expected,
                actual: coefficients.len(),
            });
        }
        if constants.len() != n {
            return Err(JacobiError::DimensionMismatch {
                what: "constants length",
                expected: n,
                actual: constants.len(),
            });
        }
        Ok(Self {
            n,
            coefficients,
            constants,
        })
    }

    /// 行ごとのベクトルから構築する。各行の長さは行数と一致しなければならない。
    pub fn from_rows(rows: Vec<Vec<f64>>, constants: Vec<f64>) -> Result<Self> {
        let n = rows.len();
        let mut coefficients = Vec::with_capacity(coefficient_count(n)?);
        for row in rows {
            if row.len() != n {
                return Err(JacobiError::DimensionMismatch {
                    what: "matrix row length",
                    expected: n,
                    actual: row.len(),
                });
            }
            coefficients.extend(row);
        }
        Self::new(n, coefficients, constants)
    }

    /// 定数ベクトルだけを差し替えた新しいシステムを返す。
    pub fn with_constants(&self, constants: Vec<f64>) -> Result<Self> {
        Self::new(self.n, self.coefficients.clone(), constants)
    }

    pub fn size(&self) -> usize {
        self.n
    }

    pub fn coefficient(&self, i: usize, j: usize) -> f64 {
        self.coefficients[i * self.n + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.coefficients[i * self.n..(i + 1) * self.n]
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn constants(&self) -> &[f64] {
        &self.constants
    }

    /// 対角成分が (数値的に) 0 である最初の行。
    pub fn first_zero_pivot(&self) -> Option<usize> {
        (0..self.n).find(|&i| self.coefficient(i, i).abs() < f64::MIN_POSITIVE)
    }

    pub fn has_zero_diagonal(&self) -> bool {
        self.first_zero_pivot().is_some()
    }

    /// 全ての行で `|a_ii| >= Σ_{j≠i} |a_ij|` が成り立つか。
    pub fn is_diagonally_dominant(&self) -> bool {
        (0..self.n).all(|i| {
            let row = self.row(i);
            let off_diagonal: f64 = row
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, a)| a.abs())
                .sum();
            row[i].abs() >= off_diagonal
        })
    }

    /// 行列とベクトルの積 `Ax`。
    pub fn multiply(&self, x: &[f64]) -> Result<Vec<f64>> {
        self.check_vector(x, "multiplied vector")?;
        Ok((0..self.n)
            .map(|i| self.row(i).iter().zip(x).map(|(a, v)| a * v).sum::<f64>())
            .collect())
    }

    /// 残差ノルム `‖Ax − b‖₂`。
    pub fn residual_norm(&self, x: &[f64]) -> Result<f64> {
        let ax = self.multiply(x)?;
        let sum_sq: f64 = ax
            .iter()
            .zip(&self.constants)
            .map(|(lhs, b)| {
                let diff = lhs - b;
                diff * diff
            })
            .sum();
        Ok(sum_sq.sqrt())
    }

    pub(crate) fn check_vector(&self, x: &[f64], what: &'static str) -> Result<()> {
        if x.len() != self.n {
            return Err(JacobiError::DimensionMismatch {
                what,
                expected: self.n,
                actual: x.len(),
            });
        }
        Ok(())
    }
}

/// `n × n` 行列の要素数。`usize` に収まらないサイズはエラー。
pub(crate) fn coefficient_count(n: usize) -> Result<usize> {
    n.checked_mul(n).ok_or_else(|| {
        JacobiError::InvalidConfiguration(format!("行列サイズ {n} は大きすぎます"))
    })
}
