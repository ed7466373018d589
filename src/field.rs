//! # Field モジュール
//!
//! 脅威プロファイルと主航路から、試行ごとの機雷原（機雷3種と防潜網）を確率的に生成します。
//!
//! ## 生成手順
//!
//! 1. 総機雷数を 浮遊 : 係維 : 沈底 = 3 : 4 : 残り に分割
//! 2. 種類ごとに線状敷設（航路沿いに等間隔、横方向に揺らぎ）と散布敷設（航路中点周りの
//!    ガウス分布）へ振り分け
//! 3. 防潜網を海域内に一様配置
//!
//! 乱数は試行ごとのシード値から生成する `ChaCha8Rng` のみを使用し、引き出し順も固定です。
//! 同じシード・設定・航路からは常に同一の機雷原が得られます。

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::TAU;
use tracing::debug;

use crate::error::{SimResult, SimulationError};
use crate::models::{
    BottomMine, Hazard, MineKind, MooredMine, Net, OperatingArea, Placement, Point2D, Position3D,
    SurfaceMine,
};
use crate::scenario::ScenarioConfig;

/// 防潜網の上端から下端までの垂下量の範囲（m）
pub const NET_DROP_RANGE: [f64; 2] = [50.0, 150.0];

/// これ未満の航路長は退化とみなす
const MIN_CORRIDOR_LENGTH: f64 = 1e-9;

/// 機雷原生成の基準となる主航路
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corridor {
    pub start: Point2D,
    pub end: Point2D,
    pub length: f64,
    /// 進行方向に垂直な単位ベクトル
    pub perpendicular: Point2D,
}

impl Corridor {
    pub fn new(start: (f64, f64), end: (f64, f64)) -> SimResult<Self> {
        let start = Point2D::new(start.0, start.1);
        let end = Point2D::new(end.0, end.1);
        let delta = end - start;
        let length = delta.magnitude();

        if !length.is_finite() || length < MIN_CORRIDOR_LENGTH {
            return Err(SimulationError::DegenerateCorridor { x: start.x, y: start.y });
        }

        let direction = delta * (1.0 / length);
        Ok(Self {
            start,
            end,
            length,
            perpendicular: direction.perpendicular(),
        })
    }

    /// 航路上の点（t ∈ [0, 1]）
    pub fn point_at(&self, t: f64) -> Point2D {
        self.start + (self.end - self.start) * t
    }

    pub fn midpoint(&self) -> Point2D {
        self.point_at(0.5)
    }
}

/// 1試行分の機雷原
#[derive(Debug, Clone, PartialEq)]
pub struct MineField {
    pub seed: u64,
    /// 浮遊 → 係維 → 沈底 → 防潜網 の順に格納
    pub hazards: Vec<Hazard>,
}

impl MineField {
    pub fn mines(&self) -> impl Iterator<Item = &Hazard> {
        self.hazards.iter().filter(|h| h.is_mine())
    }

    pub fn nets(&self) -> impl Iterator<Item = &Hazard> {
        self.hazards.iter().filter(|h| h.is_net())
    }

    pub fn count(&self, kind: MineKind) -> usize {
        self.hazards.iter().filter(|h| h.mine_kind() == Some(kind)).count()
    }

    pub fn net_count(&self) -> usize {
        self.nets().count()
    }
}

/// 機雷の深度の決め方
#[derive(Debug, Clone, Copy)]
enum DepthSource {
    Range([f64; 2]),
    Fixed(f64),
}

/// 機雷種別ごとの敷設パラメータ
#[derive(Debug, Clone, Copy)]
struct KindPlan {
    kind: MineKind,
    count: usize,
    spacing: [f64; 2],
    /// 横方向揺らぎの半幅 = 航路幅 × この値
    lateral_fraction: f64,
    /// 散布の標準偏差 = 海域寸法 / この値
    scatter_divisor: f64,
    depth: DepthSource,
}

/// 機雷原生成器
#[derive(Debug, Clone)]
pub struct FieldGenerator {
    area: OperatingArea,
    total_mines: usize,
    corridor_width: f64,
    linear_density: f64,
    surface_depth: [f64; 2],
    surface_spacing: [f64; 2],
    subsurface_depth: [f64; 2],
    subsurface_spacing: [f64; 2],
    mine_radius: f64,
    net_count: usize,
    net_width: f64,
    net_length: [f64; 2],
    net_depth: [f64; 2],
}

impl FieldGenerator {
    pub fn new(config: &ScenarioConfig) -> SimResult<Self> {
        config.check_preconditions()?;

        Ok(Self {
            area: OperatingArea::new(config.area.width_m, config.area.height_m, config.area.max_depth_m),
            total_mines: config.threat.total_mines as usize,
            corridor_width: config.deployment.corridor_width_m,
            linear_density: config.deployment.linear_density,
            surface_depth: config.mines.surface_depth_range_m,
            surface_spacing: config.mines.surface_spacing_m,
            subsurface_depth: config.mines.subsurface_depth_range_m,
            subsurface_spacing: config.mines.subsurface_spacing_m,
            mine_radius: config.mines.radius_m,
            net_count: config.nets.count as usize,
            net_width: config.nets.width_m,
            net_length: config.nets.length_range_m,
            net_depth: config.nets.depth_range_m,
        })
    }

    /// 総機雷数を 浮遊 : 係維 : 沈底 に分割（端数は沈底機雷が吸収）
    pub fn partition(total: usize) -> (usize, usize, usize) {
        let surface = total * 3 / 10;
        let moored = total * 4 / 10;
        (surface, moored, total - surface - moored)
    }

    /// シード値から機雷原を生成
    pub fn generate(&self, corridor: &Corridor, seed: u64) -> SimResult<MineField> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let (surface, moored, bottom) = Self::partition(self.total_mines);

        let plans = [
            KindPlan {
                kind: MineKind::Surface,
                count: surface,
                spacing: self.surface_spacing,
                lateral_fraction: 1.0 / 3.0,
                scatter_divisor: 4.0,
                depth: DepthSource::Range(self.surface_depth),
            },
            KindPlan {
                kind: MineKind::Moored,
                count: moored,
                spacing: self.subsurface_spacing,
                lateral_fraction: 0.5,
                scatter_divisor: 3.0,
                depth: DepthSource::Range(self.subsurface_depth),
            },
            KindPlan {
                kind: MineKind::Bottom,
                count: bottom,
                spacing: self.subsurface_spacing,
                lateral_fraction: 0.5,
                scatter_divisor: 3.0,
                depth: DepthSource::Fixed(self.area.max_depth),
            },
        ];

        let mut hazards = Vec::with_capacity(self.total_mines + self.net_count);
        for plan in &plans {
            self.deploy_mines(&mut rng, corridor, plan, &mut hazards)?;
        }
        self.deploy_nets(&mut rng, &mut hazards);

        debug!(
            "機雷原生成 (seed={}): 浮遊{} 係維{} 沈底{} 網{}",
            seed, surface, moored, bottom, self.net_count
        );

        Ok(MineField { seed, hazards })
    }

    fn deploy_mines<R: Rng>(
        &self,
        rng: &mut R,
        corridor: &Corridor,
        plan: &KindPlan,
        hazards: &mut Vec<Hazard>,
    ) -> SimResult<()> {
        let linear_target = (plan.count as f64 * self.linear_density).floor() as usize;
        let spacing = uniform(rng, plan.spacing);
        let slots = (corridor.length / spacing).floor() as usize;
        let placed = linear_target.min(slots);
        let slot_divisor = slots.saturating_sub(1).max(1) as f64;
        let half_offset = self.corridor_width * plan.lateral_fraction;

        // 線状敷設
        for i in 0..placed {
            let t = i as f64 / slot_divisor;
            let offset = uniform(rng, [-half_offset, half_offset]);
            let point = corridor.point_at(t) + corridor.perpendicular * offset;
            let z = sample_depth(rng, plan.depth);
            hazards.push(self.make_mine(plan.kind, point, z, Placement::Linear));
        }

        // 散布敷設
        let mid = corridor.midpoint();
        let normal_x = normal(mid.x, self.area.width / plan.scatter_divisor)?;
        let normal_y = normal(mid.y, self.area.height / plan.scatter_divisor)?;
        for _ in placed..plan.count {
            let x = normal_x.sample(rng);
            let y = normal_y.sample(rng);
            let z = sample_depth(rng, plan.depth);
            hazards.push(self.make_mine(plan.kind, Point2D::new(x, y), z, Placement::Random));
        }

        Ok(())
    }

    fn make_mine(&self, kind: MineKind, point: Point2D, z: f64, placement: Placement) -> Hazard {
        let (x, y) = self.area.clamp_xy(point.x, point.y);
        let z = self.area.clamp_depth(z);
        match kind {
            MineKind::Surface => {
                Hazard::Surface(SurfaceMine::new(Position3D::new(x, y, z), self.mine_radius, placement))
            }
            MineKind::Moored => {
                Hazard::Moored(MooredMine::new(Position3D::new(x, y, z), self.mine_radius, placement))
            }
            MineKind::Bottom => Hazard::Bottom(BottomMine::new(x, y, z, self.mine_radius, placement)),
        }
    }

    fn deploy_nets<R: Rng>(&self, rng: &mut R, hazards: &mut Vec<Hazard>) {
        for _ in 0..self.net_count {
            let x1 = uniform(rng, [0.0, self.area.width]);
            let y1 = uniform(rng, [0.0, self.area.height]);

            let length = uniform(rng, self.net_length);
            let angle = uniform(rng, [0.0, TAU]);

            let (x2, y2) = self
                .area
                .clamp_xy(x1 + length * angle.cos(), y1 + length * angle.sin());

            let z_top = uniform(rng, self.net_depth);
            let z_bottom = z_top + uniform(rng, NET_DROP_RANGE);

            hazards.push(Hazard::Net(Net::new(
                Point2D::new(x1, y1),
                Point2D::new(x2, y2),
                z_top,
                z_bottom,
                self.net_width,
            )));
        }
    }
}

/// 一様分布 [lo, hi) から1回引く（lo == hi なら乱数を消費せず lo）
fn uniform<R: Rng>(rng: &mut R, range: [f64; 2]) -> f64 {
    if range[1] > range[0] {
        rng.random_range(range[0]..range[1])
    } else {
        range[0]
    }
}

fn sample_depth<R: Rng>(rng: &mut R, depth: DepthSource) -> f64 {
    match depth {
        DepthSource::Range(range) => uniform(rng, range),
        DepthSource::Fixed(z) => z,
    }
}

fn normal(mean: f64, std_dev: f64) -> SimResult<Normal<f64>> {
    Normal::new(mean, std_dev).map_err(|e| SimulationError::Distribution(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ThreatLevel;

    fn moderate_config() -> ScenarioConfig {
        let mut config = ScenarioConfig::default();
        config.threat = ThreatLevel::Moderate.profile();
        config
    }

    fn corridor() -> Corridor {
        Corridor::new((1000.0, 1000.0), (9000.0, 9000.0)).unwrap()
    }

    #[test]
    fn test_partition() {
        assert_eq!(FieldGenerator::partition(150), (45, 60, 45));
        assert_eq!(FieldGenerator::partition(300), (90, 120, 90));
        assert_eq!(FieldGenerator::partition(7), (2, 2, 3));
    }

    #[test]
    fn test_field_counts_follow_partition() {
        let generator = FieldGenerator::new(&moderate_config()).unwrap();
        let field = generator.generate(&corridor(), 0).unwrap();

        assert_eq!(field.count(MineKind::Surface), 45);
        assert_eq!(field.count(MineKind::Moored), 60);
        assert_eq!(field.count(MineKind::Bottom), 45);
        assert_eq!(field.net_count(), 30);
        assert_eq!(field.hazards.len(), 180);
    }

    #[test]
    fn test_same_seed_same_field() {
        let generator = FieldGenerator::new(&moderate_config()).unwrap();
        let a = generator.generate(&corridor(), 42).unwrap();
        let b = generator.generate(&corridor(), 42).unwrap();
        assert_eq!(a, b);

        let c = generator.generate(&corridor(), 43).unwrap();
        assert_ne!(a.hazards, c.hazards);
    }

    #[test]
    fn test_hazards_within_bounds() {
        let config = moderate_config();
        let generator = FieldGenerator::new(&config).unwrap();
        // 海域の隅に寄せた航路で、クリップが必要な配置を誘発する
        let edge = Corridor::new((0.0, 0.0), (10000.0, 200.0)).unwrap();

        for seed in 0..20 {
            let field = generator.generate(&edge, seed).unwrap();
            for hazard in &field.hazards {
                let points = match hazard {
                    Hazard::Surface(m) => vec![m.position.xy()],
                    Hazard::Moored(m) => vec![m.position.xy()],
                    Hazard::Bottom(m) => vec![m.position.xy()],
                    Hazard::Net(n) => vec![n.start, n.end],
                };
                for p in points {
                    assert!((0.0..=config.area.width_m).contains(&p.x), "x={} escaped", p.x);
                    assert!((0.0..=config.area.height_m).contains(&p.y), "y={} escaped", p.y);
                }
            }
        }
    }

    #[test]
    fn test_depths_and_bands() {
        let config = moderate_config();
        let generator = FieldGenerator::new(&config).unwrap();
        let field = generator.generate(&corridor(), 7).unwrap();

        for hazard in &field.hazards {
            match hazard {
                Hazard::Surface(m) => assert!((3.0..=50.0).contains(&m.position.z)),
                Hazard::Moored(m) => assert!((30.0..=55.0).contains(&m.position.z)),
                Hazard::Bottom(m) => assert_eq!(m.position.z, config.area.max_depth_m),
                Hazard::Net(n) => {
                    assert!(n.z_top < n.z_bottom);
                    assert!(n.z_bottom - n.z_top >= 50.0);
                    assert_eq!(n.width, 50.0);
                }
            }
        }
    }

    #[test]
    fn test_linear_subset_size() {
        let generator = FieldGenerator::new(&moderate_config()).unwrap();
        let field = generator.generate(&corridor(), 3).unwrap();

        let linear_surface = field
            .hazards
            .iter()
            .filter(|h| matches!(h, Hazard::Surface(m) if m.placement == Placement::Linear))
            .count();
        // 航路長 ≈ 11314m、間隔 <= 150m → 枠は十分、floor(45 × 0.7) = 31
        assert_eq!(linear_surface, 31);
    }

    #[test]
    fn test_short_corridor_limits_linear_slots() {
        let generator = FieldGenerator::new(&moderate_config()).unwrap();
        // 長さ100mの航路には間隔30〜55mの係維機雷が高々3個しか並ばない
        let short = Corridor::new((5000.0, 5000.0), (5100.0, 5000.0)).unwrap();
        let field = generator.generate(&short, 11).unwrap();

        let linear_moored = field
            .hazards
            .iter()
            .filter(|h| matches!(h, Hazard::Moored(m) if m.placement == Placement::Linear))
            .count();
        assert!(linear_moored <= 3);
        assert_eq!(field.count(MineKind::Moored), 60);
    }

    #[test]
    fn test_degenerate_corridor_rejected() {
        let result = Corridor::new((500.0, 500.0), (500.0, 500.0));
        assert!(matches!(result, Err(SimulationError::DegenerateCorridor { .. })));
    }
}
