//! # minesim
//!
//! 機雷・防潜網が敷設された海域を通過する艦艇の被害確率を、
//! モンテカルロ法で推定するシミュレーションライブラリです。
//!
//! - [`field`]: 脅威レベルと主航路に基づく機雷原の確率的生成
//! - [`models`]: 幾何カーネル、機雷・防潜網の衝突判定、経路生成
//! - [`simulation`]: 試行の実行と艦種別・経路戦略別の集計
//! - [`statistics`]: 集計値と結果統計
//! - [`scenario`]: YAMLシナリオ設定
//! - [`report`]: 結果の表示とJSON出力

pub mod error;
pub mod field;
pub mod logging;
pub mod models;
pub mod report;
pub mod scenario;
pub mod simulation;
pub mod statistics;

pub use error::{SimResult, SimulationError};
pub use scenario::{ScenarioConfig, ThreatLevel, ThreatProfile};
pub use simulation::{ScenarioComparison, SimulationEngine, SimulationResults, VehicleClass};
pub use statistics::{Outcome, OutcomeStatistics, TrialTally};
