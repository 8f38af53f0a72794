use thiserror::Error;

#[derive(Error, Debug)]
pub enum JacobiError {
    #[error("設定が不正です: {0}")]
    InvalidConfiguration(String),

    #[error("次元が一致しません ({what}): 期待値 {expected}, 実際 {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    // ヤコビ法は対角成分が0だと定義できない
    #[error("対角成分が0です (行 {row})")]
    SingularPivot { row: usize },

    #[error("スレッドプールの作成に失敗しました: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, JacobiError>;
