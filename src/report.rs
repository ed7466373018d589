//! # Report モジュール
//!
//! 集計済みの結果統計を表示・出力します。シミュレーションコアには影響しません。
//!
//! - コンソールへの結果表示（艦種別・経路戦略別）
//! - JSONファイルへの出力（`results_<脅威レベル>.json`）

use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::scenario::{AreaConfig, DeploymentConfig, MineConfig, NetConfig, ScenarioConfig};
use crate::simulation::{ScenarioComparison, SimulationResults};
use crate::statistics::{OutcomeStatistics, TrialTally};

/// 出力フォーマットのバージョン
pub const EXPORT_VERSION: &str = "3.0";

/// 結果出力エラー
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("出力先への書き込みに失敗しました {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("JSON変換エラー: {0}")]
    Json(#[from] serde_json::Error),
}

/// 艦種別の結果を表示
pub fn print_results(results: &SimulationResults, config: &ScenarioConfig) {
    println!("{}", "=".repeat(60));
    println!("{:^60}", "Results");
    println!("{}", "=".repeat(60));

    for (class, stats) in results.iter() {
        println!();
        println!("{}:", class.label());
        println!("  Total Risk:   {:6.2}%", stats.any_hit_prob * 100.0);
        println!("  Safe Transit: {:6.2}%", stats.safe_prob * 100.0);
        println!("  Mine Hits:    {:6.2}%", stats.mine_hit_prob * 100.0);
        println!("  Net Hits:     {:6.2}%", stats.net_hit_prob * 100.0);
        println!("  Both Hits:    {:6.2}%", stats.both_hit_prob * 100.0);
    }

    // 目標危険率は参考値としてのみ比較
    let target = config.threat.target_risk * 100.0;
    let actual = results.surface_vessel.any_hit_prob * 100.0;
    println!();
    println!("Target Risk:     {:.1}%", target);
    println!("Actual Risk:     {:.1}%", actual);
    println!("Difference:      {:+.1}%", actual - target);
    println!("{}", "=".repeat(60));
}

/// 経路戦略比較の結果を表示
pub fn print_scenario_comparison(comparison: &ScenarioComparison) {
    println!();
    println!("{}", "=".repeat(60));
    println!("{:^60}", "ROUTE SCENARIO COMPARISON");
    println!("{}", "=".repeat(60));

    for (strategy, stats) in comparison {
        println!(
            "  {:<14} Safe: {:5.1}%, Risk: {:5.1}%",
            strategy.label(),
            stats.safe_prob * 100.0,
            stats.any_hit_prob * 100.0
        );
    }
}

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    metadata: ExportMetadata<'a>,
    configuration: ExportConfiguration<'a>,
    results: BTreeMap<&'static str, ExportOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    route_scenarios: Option<BTreeMap<&'static str, ExportOutcome>>,
}

#[derive(Debug, Serialize)]
struct ExportMetadata<'a> {
    timestamp: String,
    threat_level: &'a str,
    simulation_count: u64,
    version: &'static str,
}

#[derive(Debug, Serialize)]
struct ExportConfiguration<'a> {
    area: &'a AreaConfig,
    total_mines: u32,
    target_risk: f64,
    deployment: &'a DeploymentConfig,
    mine_parameters: &'a MineConfig,
    nets: &'a NetConfig,
}

#[derive(Debug, Serialize)]
struct ExportProbabilities {
    mine_hit: f64,
    net_hit: f64,
    both_hit: f64,
    any_hit: f64,
    safe_passage: f64,
}

#[derive(Debug, Serialize)]
struct ExportOutcome {
    probabilities: ExportProbabilities,
    counts: TrialTally,
}

impl From<&OutcomeStatistics> for ExportOutcome {
    fn from(stats: &OutcomeStatistics) -> Self {
        Self {
            probabilities: ExportProbabilities {
                mine_hit: round4(stats.mine_hit_prob),
                net_hit: round4(stats.net_hit_prob),
                both_hit: round4(stats.both_hit_prob),
                any_hit: round4(stats.any_hit_prob),
                safe_passage: round4(stats.safe_prob),
            },
            counts: stats.counts,
        }
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// 結果をJSON文字列に変換
pub fn to_json(
    results: &SimulationResults,
    comparison: Option<&ScenarioComparison>,
    config: &ScenarioConfig,
) -> Result<String, ReportError> {
    let results_map = results
        .iter()
        .map(|(class, stats)| (class.key(), ExportOutcome::from(stats)))
        .collect();

    let route_scenarios = comparison.map(|c| {
        c.iter()
            .map(|(strategy, stats)| (strategy.label(), ExportOutcome::from(stats)))
            .collect()
    });

    let document = ExportDocument {
        metadata: ExportMetadata {
            timestamp: Utc::now().to_rfc3339(),
            threat_level: &config.threat.name,
            simulation_count: results.surface_vessel.trials(),
            version: EXPORT_VERSION,
        },
        configuration: ExportConfiguration {
            area: &config.area,
            total_mines: config.threat.total_mines,
            target_risk: config.threat.target_risk,
            deployment: &config.deployment,
            mine_parameters: &config.mines,
            nets: &config.nets,
        },
        results: results_map,
        route_scenarios,
    };

    Ok(serde_json::to_string_pretty(&document)?)
}

/// 結果をJSONファイルに出力し、書き込んだパスを返す
pub fn export_json<P: AsRef<Path>>(
    results: &SimulationResults,
    comparison: Option<&ScenarioComparison>,
    config: &ScenarioConfig,
    output_dir: P,
) -> Result<PathBuf, ReportError> {
    let output_dir = output_dir.as_ref();
    fs::create_dir_all(output_dir).map_err(|e| ReportError::Io(output_dir.to_path_buf(), e))?;

    let filename = format!("results_{}.json", config.threat.name.to_lowercase());
    let path = output_dir.join(filename);

    let json = to_json(results, comparison, config)?;
    fs::write(&path, json).map_err(|e| ReportError::Io(path.clone(), e))?;

    info!("結果を出力しました: {}", path.display());
    Ok(path)
}
