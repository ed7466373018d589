//! # Error モジュール
//!
//! シミュレーションコアが呼び出し側へ返すエラーを定義します。
//!
//! コアの失敗は「前提条件違反」の一種類のみです。退化した航路（始点と終点が一致）、
//! 正でない半径・幅・範囲、2未満のサンプリング点数などは試行開始前に検出され、
//! 実行全体を中断します。幾何計算上の数値的退化はこのエラーには含まれず、
//! 幾何カーネル内部で処理されます。

use thiserror::Error;

/// シミュレーション実行時のエラー
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    /// 航路の長さがゼロ（始点 == 終点）
    #[error("航路の長さがゼロです: ({x:.1}, {y:.1})")]
    DegenerateCorridor { x: f64, y: f64 },

    /// パラメータの前提条件違反
    #[error("無効なパラメータ {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// 確率分布の構築失敗
    #[error("確率分布の構築に失敗しました: {0}")]
    Distribution(String),

    /// 試行境界でキャンセルされた
    #[error("シミュレーションがキャンセルされました（{completed}試行完了時点）")]
    Cancelled { completed: u64 },
}

impl SimulationError {
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        SimulationError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type SimResult<T> = Result<T, SimulationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_message() {
        let err = SimulationError::invalid("mine_radius", "must be positive");
        assert_eq!(err.to_string(), "無効なパラメータ mine_radius: must be positive");
    }
}
