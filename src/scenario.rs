use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::warn;

use crate::error::{SimResult, SimulationError};
use crate::models::path::DEEP_DIVE_BOTTOM_CLEARANCE;

/// シナリオメタデータ
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioMeta {
    pub version: String,
    pub name: String,
    pub description: String,
}

impl Default for ScenarioMeta {
    fn default() -> Self {
        Self {
            version: "3.0".to_string(),
            name: "default".to_string(),
            description: "標準的な戦術機雷原".to_string(),
        }
    }
}

/// 作戦海域設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AreaConfig {
    pub width_m: f64,
    pub height_m: f64,
    pub max_depth_m: f64,
}

impl Default for AreaConfig {
    fn default() -> Self {
        Self {
            width_m: 10000.0,
            height_m: 10000.0,
            max_depth_m: 280.0,
        }
    }
}

/// 脅威プロファイル
///
/// `target_risk` は報告時の比較にのみ使用され、機雷原生成には影響しません。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ThreatProfile {
    pub name: String,
    pub total_mines: u32,
    pub target_risk: f64,
}

impl Default for ThreatProfile {
    fn default() -> Self {
        ThreatLevel::High.profile()
    }
}

/// 定義済みの脅威レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreatLevel {
    /// 機雷150個、目標危険率50%
    Moderate,
    /// 機雷300個、目標危険率75%
    High,
    /// 機雷450個、目標危険率90%
    Critical,
}

impl ThreatLevel {
    pub fn profile(&self) -> ThreatProfile {
        let (name, total_mines, target_risk) = match self {
            ThreatLevel::Moderate => ("MODERATE", 150, 0.50),
            ThreatLevel::High => ("HIGH", 300, 0.75),
            ThreatLevel::Critical => ("CRITICAL", 450, 0.90),
        };
        ThreatProfile {
            name: name.to_string(),
            total_mines,
            target_risk,
        }
    }
}

impl FromStr for ThreatLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "moderate" => Ok(ThreatLevel::Moderate),
            "high" => Ok(ThreatLevel::High),
            "critical" => Ok(ThreatLevel::Critical),
            _ => Err(format!("無効な脅威レベル: {}. 利用可能: moderate, high, critical", s)),
        }
    }
}

/// 敷設戦略設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// 主航路の幅（m）
    pub corridor_width_m: f64,
    /// 線状敷設の割合（0-1）
    pub linear_density: f64,
    /// 散布敷設の割合（0-1、生成器は 1 - linear_density を使用）
    pub random_density: f64,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            corridor_width_m: 1000.0,
            linear_density: 0.7,
            random_density: 0.3,
        }
    }
}

/// 機雷設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MineConfig {
    pub surface_depth_range_m: [f64; 2],
    pub surface_spacing_m: [f64; 2],
    /// 係維機雷の深度範囲（沈底機雷は最大水深固定）
    pub subsurface_depth_range_m: [f64; 2],
    /// 係維・沈底機雷の敷設間隔
    pub subsurface_spacing_m: [f64; 2],
    pub radius_m: f64,
}

impl Default for MineConfig {
    fn default() -> Self {
        Self {
            surface_depth_range_m: [3.0, 50.0],
            surface_spacing_m: [70.0, 150.0],
            subsurface_depth_range_m: [30.0, 55.0],
            subsurface_spacing_m: [30.0, 55.0],
            radius_m: 150.0,
        }
    }
}

/// 防潜網設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NetConfig {
    pub count: u32,
    pub width_m: f64,
    pub length_range_m: [f64; 2],
    pub depth_range_m: [f64; 2],
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            count: 30,
            width_m: 50.0,
            length_range_m: [300.0, 1000.0],
            depth_range_m: [50.0, 200.0],
        }
    }
}

/// 艦艇設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VesselConfig {
    pub surface_width_m: f64,
    pub surface_draft_m: f64,
    pub submarine_width_m: f64,
}

impl Default for VesselConfig {
    fn default() -> Self {
        Self {
            surface_width_m: 20.0,
            surface_draft_m: 8.0,
            submarine_width_m: 12.0,
        }
    }
}

/// シミュレーション設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub iterations: u64,
    pub path_sampling_points: usize,
    /// 試行をrayonで並列実行するか
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: 1000,
            path_sampling_points: 200,
            parallel: true,
        }
    }
}

/// 水上艦の航路
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SurfaceRoute {
    pub start: [f64; 2],
    pub end: [f64; 2],
}

/// 潜航体の航路
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SubmergedRoute {
    pub start: [f64; 3],
    pub end: [f64; 3],
}

impl SubmergedRoute {
    /// 機雷原生成の基準となる平面航路
    pub fn corridor(&self) -> ((f64, f64), (f64, f64)) {
        ((self.start[0], self.start[1]), (self.end[0], self.end[1]))
    }
}

/// 航路設定
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    pub surface: SurfaceRoute,
    pub submarine: SubmergedRoute,
    /// 経路戦略比較を実行するか
    pub compare_scenarios: bool,
    pub scenario_iterations: u64,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            surface: SurfaceRoute {
                start: [1000.0, 1000.0],
                end: [9000.0, 9000.0],
            },
            submarine: SubmergedRoute {
                start: [1000.0, 1000.0, 100.0],
                end: [9000.0, 9000.0, 200.0],
            },
            compare_scenarios: false,
            scenario_iterations: 100,
        }
    }
}

/// 完全なシナリオ設定
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub meta: ScenarioMeta,
    pub area: AreaConfig,
    pub threat: ThreatProfile,
    pub deployment: DeploymentConfig,
    pub mines: MineConfig,
    pub nets: NetConfig,
    pub vessels: VesselConfig,
    pub sim: SimulationConfig,
    pub routes: RoutesConfig,
}

impl ScenarioConfig {
    /// YAMLファイルからシナリオ設定を読み込み
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();

        // ファイル存在チェック
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| ScenarioError::Io(path.to_path_buf(), e))?;

        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .map_err(|e| ScenarioError::Parse(path.to_path_buf(), e))?;

        config.validate()?;

        Ok(config)
    }

    /// 設定の検証
    pub fn validate(&self) -> Result<(), ScenarioError> {
        self.check_preconditions()?;

        let density_sum = self.deployment.linear_density + self.deployment.random_density;
        if (density_sum - 1.0).abs() > 1e-9 {
            warn!(
                "linear_density + random_density = {:.3} (散布敷設には 1 - linear_density を使用します)",
                density_sum
            );
        }

        Ok(())
    }

    /// シミュレーションコアの前提条件
    ///
    /// エンジン生成時にも呼ばれ、違反は最初の試行を始める前に報告されます。
    pub fn check_preconditions(&self) -> SimResult<()> {
        positive("area.width_m", self.area.width_m)?;
        positive("area.height_m", self.area.height_m)?;
        positive("area.max_depth_m", self.area.max_depth_m)?;
        if self.area.max_depth_m < DEEP_DIVE_BOTTOM_CLEARANCE {
            return Err(SimulationError::invalid(
                "area.max_depth_m",
                format!("{}m以上が必要です（{}）", DEEP_DIVE_BOTTOM_CLEARANCE, self.area.max_depth_m),
            ));
        }
        route_depth("routes.submarine.start", self.routes.submarine.start[2], self.area.max_depth_m)?;
        route_depth("routes.submarine.end", self.routes.submarine.end[2], self.area.max_depth_m)?;

        unit_fraction("threat.target_risk", self.threat.target_risk)?;

        positive("deployment.corridor_width_m", self.deployment.corridor_width_m)?;
        unit_fraction("deployment.linear_density", self.deployment.linear_density)?;
        unit_fraction("deployment.random_density", self.deployment.random_density)?;

        depth_range("mines.surface_depth_range_m", self.mines.surface_depth_range_m)?;
        positive_range("mines.surface_spacing_m", self.mines.surface_spacing_m)?;
        depth_range("mines.subsurface_depth_range_m", self.mines.subsurface_depth_range_m)?;
        positive_range("mines.subsurface_spacing_m", self.mines.subsurface_spacing_m)?;
        positive("mines.radius_m", self.mines.radius_m)?;

        positive("nets.width_m", self.nets.width_m)?;
        positive_range("nets.length_range_m", self.nets.length_range_m)?;
        depth_range("nets.depth_range_m", self.nets.depth_range_m)?;

        positive("vessels.surface_width_m", self.vessels.surface_width_m)?;
        non_negative("vessels.surface_draft_m", self.vessels.surface_draft_m)?;
        positive("vessels.submarine_width_m", self.vessels.submarine_width_m)?;

        if self.sim.iterations == 0 {
            return Err(SimulationError::invalid("sim.iterations", "1以上が必要です"));
        }
        if self.sim.path_sampling_points < 2 {
            return Err(SimulationError::invalid(
                "sim.path_sampling_points",
                format!("少なくとも2点必要です（{}）", self.sim.path_sampling_points),
            ));
        }
        if self.routes.scenario_iterations == 0 {
            return Err(SimulationError::invalid("routes.scenario_iterations", "1以上が必要です"));
        }

        Ok(())
    }

    /// シナリオの概要を表示
    pub fn print_summary(&self) {
        println!("=== シナリオ情報 ===");
        println!("名前: {}", self.meta.name);
        println!("説明: {}", self.meta.description);
        println!("バージョン: {}", self.meta.version);
        println!();

        println!("=== 作戦海域 ===");
        println!(
            "範囲: {:.0}m × {:.0}m, 最大水深: {:.0}m",
            self.area.width_m, self.area.height_m, self.area.max_depth_m
        );
        println!();

        println!("=== 脅威 ===");
        println!("脅威レベル: {}", self.threat.name);
        println!("総機雷数: {}個", self.threat.total_mines);
        println!("目標危険率: {:.0}%", self.threat.target_risk * 100.0);
        println!(
            "敷設比率: 線状 {:.0}% / 散布 {:.0}% (航路幅 {:.0}m)",
            self.deployment.linear_density * 100.0,
            (1.0 - self.deployment.linear_density) * 100.0,
            self.deployment.corridor_width_m
        );
        println!("防潜網: {}張", self.nets.count);
        println!();

        println!("=== シミュレーション設定 ===");
        println!("試行回数: {}", self.sim.iterations);
        println!("経路サンプリング点数: {}", self.sim.path_sampling_points);
        println!("並列実行: {}", if self.sim.parallel { "有効" } else { "無効" });
        let s = &self.routes.surface;
        println!(
            "水上艦航路: ({:.0}, {:.0}) → ({:.0}, {:.0})",
            s.start[0], s.start[1], s.end[0], s.end[1]
        );
        let m = &self.routes.submarine;
        println!(
            "潜水艦航路: ({:.0}, {:.0}, {:.0}) → ({:.0}, {:.0}, {:.0})",
            m.start[0], m.start[1], m.start[2], m.end[0], m.end[1], m.end[2]
        );
    }
}

fn positive(name: &str, value: f64) -> SimResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SimulationError::invalid(name, format!("正の値が必要です（{}）", value)));
    }
    Ok(())
}

fn non_negative(name: &str, value: f64) -> SimResult<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(SimulationError::invalid(name, format!("0以上の値が必要です（{}）", value)));
    }
    Ok(())
}

fn unit_fraction(name: &str, value: f64) -> SimResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SimulationError::invalid(name, format!("0〜1の範囲が必要です（{}）", value)));
    }
    Ok(())
}

fn route_depth(name: &str, depth: f64, max_depth: f64) -> SimResult<()> {
    if !(0.0..=max_depth).contains(&depth) {
        return Err(SimulationError::invalid(
            name,
            format!("潜航深度は0〜{}mの範囲が必要です（{}）", max_depth, depth),
        ));
    }
    Ok(())
}

fn depth_range(name: &str, range: [f64; 2]) -> SimResult<()> {
    non_negative(name, range[0])?;
    ordered(name, range)
}

fn positive_range(name: &str, range: [f64; 2]) -> SimResult<()> {
    positive(name, range[0])?;
    ordered(name, range)
}

fn ordered(name: &str, range: [f64; 2]) -> SimResult<()> {
    if !range[1].is_finite() || range[0] > range[1] {
        return Err(SimulationError::invalid(
            name,
            format!("範囲が逆転しています（{} > {}）", range[0], range[1]),
        ));
    }
    Ok(())
}

/// シナリオ読み込みエラー
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("シナリオファイルが見つかりません: {}", .0.display())]
    FileNotFound(std::path::PathBuf),

    #[error("ファイル読み込みエラー {}: {}", .0.display(), .1)]
    Io(std::path::PathBuf, #[source] std::io::Error),

    #[error("YAML解析エラー {}: {}", .0.display(), .1)]
    Parse(std::path::PathBuf, #[source] serde_yaml::Error),

    #[error("設定検証エラー: {0}")]
    Validation(#[from] SimulationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScenarioConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.threat.total_mines, 300);
        assert_eq!(config.sim.path_sampling_points, 200);
    }

    #[test]
    fn test_threat_level_from_str() {
        assert_eq!(ThreatLevel::from_str("moderate"), Ok(ThreatLevel::Moderate));
        assert_eq!(ThreatLevel::from_str("CRITICAL"), Ok(ThreatLevel::Critical));
        assert!(ThreatLevel::from_str("extreme").is_err());
        assert_eq!(ThreatLevel::Moderate.profile().total_mines, 150);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = r#"
meta:
  name: "custom"
threat:
  name: "EXTREME"
  total_mines: 600
  target_risk: 0.95
sim:
  iterations: 50
"#;
        let config: ScenarioConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.meta.name, "custom");
        assert_eq!(config.threat.total_mines, 600);
        assert_eq!(config.sim.iterations, 50);
        assert_eq!(config.sim.path_sampling_points, 200);
        assert_eq!(config.mines.radius_m, 150.0);
        assert_eq!(config.routes.submarine.start, [1000.0, 1000.0, 100.0]);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ScenarioConfig::default();
        config.sim.path_sampling_points = 1;
        assert!(matches!(config.validate(), Err(ScenarioError::Validation(_))));

        let mut config = ScenarioConfig::default();
        config.mines.radius_m = 0.0;
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.nets.depth_range_m = [200.0, 50.0];
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.sim.iterations = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_shallow_sea_and_route_depths() {
        let mut config = ScenarioConfig::default();
        config.area.max_depth_m = 20.0;
        config.routes.submarine.start[2] = 10.0;
        config.routes.submarine.end[2] = 15.0;
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.routes.submarine.start[2] = -500.0;
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.routes.submarine.end[2] = 5000.0;
        assert!(config.validate().is_err());

        let mut config = ScenarioConfig::default();
        config.routes.submarine.end[2] = config.area.max_depth_m;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file() {
        let result = ScenarioConfig::from_file("scenarios/does_not_exist.yaml");
        assert!(matches!(result, Err(ScenarioError::FileNotFound(_))));
    }
}
