//! # Simulation モジュール
//!
//! 機雷原通過リスクを推定するモンテカルロエンジンを提供します。
//!
//! 各試行では、試行番号をシード値として機雷原を一から再生成し、水上艦と潜水艦
//! （または経路戦略ごとの潜航経路）を同じ機雷原に対して評価します。機雷原の基準航路は
//! 常に潜水艦航路の平面射影です。
//!
//! ## 試行ごとの処理順序
//!
//! 1. **機雷原生成**: シード値 = 試行番号
//! 2. **経路生成**: 艦種または戦略ごとのサンプリング経路
//! 3. **機雷判定**: 浮遊 → 係維 → 沈底 の順で最初の接触まで
//! 4. **防潜網判定**: 全ての網
//! 5. **分類**: 両方 / 機雷のみ / 網のみ / 安全 のいずれか1つを集計
//!
//! 試行は互いに独立なので、rayonで並列実行しても結果は逐次実行と一致します。
//! キャンセルは試行の境界でのみ確認されます。
//!
//! ## 使用例
//!
//! ```rust,no_run
//! use minesim::scenario::ScenarioConfig;
//! use minesim::simulation::SimulationEngine;
//!
//! let config = ScenarioConfig::from_file("scenarios/moderate.yaml")?;
//! let engine = SimulationEngine::new(config.clone(), 1)?;
//!
//! let results = engine.run(&config.routes.surface, &config.routes.submarine, config.sim.iterations)?;
//! println!("潜水艦の危険率: {:.1}%", results.submarine.any_hit_prob * 100.0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ops::Add;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{debug, info, trace};

use crate::error::{SimResult, SimulationError};
use crate::field::{Corridor, FieldGenerator, MineField};
use crate::models::{ICollision, ISurfaceCollision, Path, PathGenerator, Position3D, RouteStrategy};
use crate::scenario::{ScenarioConfig, SubmergedRoute, SurfaceRoute};
use crate::statistics::{Outcome, OutcomeStatistics, TrialTally};

/// 艦種
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleClass {
    SurfaceVessel,
    Submarine,
}

impl VehicleClass {
    /// 出力用のキー
    pub fn key(&self) -> &'static str {
        match self {
            VehicleClass::SurfaceVessel => "surface_vessel",
            VehicleClass::Submarine => "submarine",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VehicleClass::SurfaceVessel => "Surface Vessel",
            VehicleClass::Submarine => "Submarine",
        }
    }
}

/// 艦種ごとの結果統計
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationResults {
    pub surface_vessel: OutcomeStatistics,
    pub submarine: OutcomeStatistics,
}

impl SimulationResults {
    pub fn get(&self, class: VehicleClass) -> &OutcomeStatistics {
        match class {
            VehicleClass::SurfaceVessel => &self.surface_vessel,
            VehicleClass::Submarine => &self.submarine,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (VehicleClass, &OutcomeStatistics)> {
        [VehicleClass::SurfaceVessel, VehicleClass::Submarine]
            .into_iter()
            .map(move |class| (class, self.get(class)))
    }
}

/// 経路戦略ごとの結果統計
pub type ScenarioComparison = BTreeMap<RouteStrategy, OutcomeStatistics>;

/// 2艦種分の集計（試行単位で加算可能）
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct VehicleTallies {
    surface_vessel: TrialTally,
    submarine: TrialTally,
}

impl Add for VehicleTallies {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self {
            surface_vessel: self.surface_vessel + other.surface_vessel,
            submarine: self.submarine + other.submarine,
        }
    }
}

/// 進行状況の記録（5%刻みでログ出力）
struct Progress<'a> {
    label: &'a str,
    total: u64,
    interval: u64,
    completed: AtomicU64,
    enabled: bool,
}

impl<'a> Progress<'a> {
    fn new(label: &'a str, total: u64, enabled: bool) -> Self {
        Self {
            label,
            total,
            interval: (total / 20).max(1),
            completed: AtomicU64::new(0),
            enabled,
        }
    }

    fn tick(&self) {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        if self.enabled && done % self.interval == 0 {
            let progress = done as f64 / self.total as f64 * 100.0;
            info!("{} 進行状況: {:.1}% ({}/{})", self.label, progress, done, self.total);
        }
    }

    fn completed(&self) -> u64 {
        self.completed.load(Ordering::Relaxed)
    }
}

pub struct SimulationEngine {
    pub scenario_config: ScenarioConfig,
    pub verbose_level: u8,

    generator: FieldGenerator,
    paths: PathGenerator,
    cancel: Arc<AtomicBool>,
}

impl SimulationEngine {
    pub fn new(scenario: ScenarioConfig, verbose_level: u8) -> SimResult<Self> {
        let generator = FieldGenerator::new(&scenario)?;
        let paths = PathGenerator::new(scenario.sim.path_sampling_points, scenario.area.max_depth_m)?;

        Ok(Self {
            scenario_config: scenario,
            verbose_level,
            generator,
            paths,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// キャンセル用フラグ（trueにすると次の試行境界で中断）
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// 水上艦と潜水艦の通過リスクを推定
    pub fn run(
        &self,
        surface: &SurfaceRoute,
        submarine: &SubmergedRoute,
        iterations: u64,
    ) -> SimResult<SimulationResults> {
        require_iterations(iterations)?;
        let (field_start, field_end) = submarine.corridor();
        let corridor = Corridor::new(field_start, field_end)?;

        let surface_start = (surface.start[0], surface.start[1]);
        let surface_end = (surface.end[0], surface.end[1]);
        let sub_start = to_position(submarine.start);
        let sub_end = to_position(submarine.end);

        info!("=== シミュレーション実行開始 ({}試行) ===", iterations);

        let tallies = self.run_trials("艦種別評価", iterations, |seed| {
            let field = self.generator.generate(&corridor, seed)?;

            let surface_path = self.paths.surface_path(surface_start, surface_end);
            let (mine_hit, net_hit) = self.surface_vessel_hits(&field, &surface_path);
            let surface_outcome = Outcome::classify(mine_hit, net_hit);

            let sub_path = self.paths.direct_path(sub_start, sub_end);
            let (mine_hit, net_hit) = self.submarine_hits(&field, &sub_path);
            let sub_outcome = Outcome::classify(mine_hit, net_hit);

            trace!("試行 {}: 水上艦 {:?}, 潜水艦 {:?}", seed, surface_outcome, sub_outcome);

            Ok(VehicleTallies {
                surface_vessel: TrialTally::single(surface_outcome),
                submarine: TrialTally::single(sub_outcome),
            })
        })?;

        let results = SimulationResults {
            surface_vessel: OutcomeStatistics::from_tally(tallies.surface_vessel),
            submarine: OutcomeStatistics::from_tally(tallies.submarine),
        };

        info!("=== シミュレーション完了 ===");
        for (class, stats) in results.iter() {
            info!(
                "{}: 危険率 {:.1}%, 安全 {:.1}%",
                class.label(),
                stats.any_hit_prob * 100.0,
                stats.safe_prob * 100.0
            );
        }

        Ok(results)
    }

    /// 経路戦略ごとの潜水艦通過リスクを比較
    pub fn run_scenario_comparison(
        &self,
        submarine: &SubmergedRoute,
        iterations: u64,
    ) -> SimResult<ScenarioComparison> {
        require_iterations(iterations)?;
        let (field_start, field_end) = submarine.corridor();
        let corridor = Corridor::new(field_start, field_end)?;
        let start = to_position(submarine.start);
        let end = to_position(submarine.end);

        info!("=== 経路戦略比較 ({}試行) ===", iterations);

        let mut comparison = ScenarioComparison::new();
        for strategy in RouteStrategy::ALL {
            debug!("{} 戦略を評価中...", strategy.label());

            let tally = self.run_trials(strategy.label(), iterations, |seed| {
                let field = self.generator.generate(&corridor, seed)?;
                let path = self.paths.scenario_path(strategy, start, end);
                let (mine_hit, net_hit) = self.submarine_hits(&field, &path);
                Ok(TrialTally::single(Outcome::classify(mine_hit, net_hit)))
            })?;

            let stats = OutcomeStatistics::from_tally(tally);
            info!(
                "  {}: 安全 {:.1}%, 危険率 {:.1}%",
                strategy.label(),
                stats.safe_prob * 100.0,
                stats.any_hit_prob * 100.0
            );
            comparison.insert(strategy, stats);
        }

        Ok(comparison)
    }

    /// 水上艦: 浮遊機雷と防潜網の2次元判定
    fn surface_vessel_hits(&self, field: &MineField, path: &Path) -> (bool, bool) {
        let vessels = &self.scenario_config.vessels;
        let width = vessels.surface_width_m;
        let draft = vessels.surface_draft_m;

        let mine_hit = field.mines().any(|m| m.check_collision_2d(path, width, draft));
        let net_hit = field.nets().any(|n| n.check_collision_2d(path, width, draft));
        (mine_hit, net_hit)
    }

    /// 潜水艦: 全障害物の3次元判定（機雷は 浮遊 → 係維 → 沈底 の格納順で短絡）
    fn submarine_hits(&self, field: &MineField, path: &Path) -> (bool, bool) {
        let width = self.scenario_config.vessels.submarine_width_m;

        let mine_hit = field.mines().any(|m| m.check_collision_3d(path, width));
        let net_hit = field.nets().any(|n| n.check_collision_3d(path, width));
        (mine_hit, net_hit)
    }

    /// 試行を実行して集計を結合
    ///
    /// 試行ごとの集計は加算で結合されるため、並列・逐次のどちらでも同じ結果になります。
    fn run_trials<T, F>(&self, label: &str, iterations: u64, trial: F) -> SimResult<T>
    where
        T: Default + Add<Output = T> + Send,
        F: Fn(u64) -> SimResult<T> + Sync + Send,
    {
        let progress = Progress::new(label, iterations, self.verbose_level > 0);

        let guarded = |seed: u64| -> SimResult<T> {
            if self.cancel.load(Ordering::Relaxed) {
                return Err(SimulationError::Cancelled {
                    completed: progress.completed(),
                });
            }
            let tally = trial(seed)?;
            progress.tick();
            Ok(tally)
        };

        if self.scenario_config.sim.parallel {
            (0..iterations)
                .into_par_iter()
                .map(guarded)
                .try_reduce(T::default, |a, b| Ok(a + b))
        } else {
            (0..iterations)
                .map(guarded)
                .try_fold(T::default(), |acc, tally| tally.map(|t| acc + t))
        }
    }
}

fn require_iterations(iterations: u64) -> SimResult<()> {
    if iterations == 0 {
        return Err(SimulationError::invalid("iterations", "1以上が必要です"));
    }
    Ok(())
}

fn to_position(p: [f64; 3]) -> Position3D {
    Position3D::new(p[0], p[1], p[2])
}
