//! 経路生成
//!
//! 始点・終点（と中間ウェイポイント）の間を一定数の点でサンプリングした折れ線を生成します。
//! 各区間は独立にN点でサンプリングされ、そのまま連結されます（区間境界の重複点は残します）。

use serde::{Deserialize, Serialize};

use crate::error::{SimResult, SimulationError};
use crate::models::common::Position3D;

/// ジグザグ経路の中間ウェイポイント数
pub const ZIGZAG_WAYPOINTS: usize = 5;
/// ジグザグ経路の横方向（y）振幅（m）
pub const ZIGZAG_AMPLITUDE: f64 = 800.0;
/// 深深度潜航の目標深度上限（m）
pub const DEEP_DIVE_DEPTH: f64 = 250.0;
/// 深深度潜航で海底から確保する余裕（m）
pub const DEEP_DIVE_BOTTOM_CLEARANCE: f64 = 30.0;
/// 沿岸経路のウェイポイントを始点・終点からずらす距離（m）
pub const COASTAL_OFFSET: f64 = 1000.0;
/// 沿岸経路の航行ライン（y、m）
pub const COASTAL_LANE_Y: f64 = 500.0;

/// 経路戦略
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStrategy {
    /// 直進
    Direct,
    /// ジグザグ
    Zigzag,
    /// 深深度潜航
    DeepDive,
    /// 沿岸経路
    Coastal,
}

impl RouteStrategy {
    pub const ALL: [RouteStrategy; 4] = [
        RouteStrategy::Direct,
        RouteStrategy::Zigzag,
        RouteStrategy::DeepDive,
        RouteStrategy::Coastal,
    ];

    /// 表示名
    pub fn label(&self) -> &'static str {
        match self {
            RouteStrategy::Direct => "Straight",
            RouteStrategy::Zigzag => "Zig-zag",
            RouteStrategy::DeepDive => "Deep Dive",
            RouteStrategy::Coastal => "Coastal Route",
        }
    }
}

/// サンプリングされた経路
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    points: Vec<Position3D>,
}

impl Path {
    /// 始点から終点までN点で線形補間（N >= 2）
    pub fn direct(start: Position3D, end: Position3D, samples: usize) -> Self {
        let mut points = Vec::with_capacity(samples);
        push_leg(&mut points, &start, &end, samples);
        Self { points }
    }

    /// 水上艦用の経路（全サンプルz = 0）
    pub fn surface(start: (f64, f64), end: (f64, f64), samples: usize) -> Self {
        Self::direct(
            Position3D::surface(start.0, start.1),
            Position3D::surface(end.0, end.1),
            samples,
        )
    }

    /// ウェイポイント列を区間ごとにN点でサンプリングして連結
    pub fn through(waypoints: &[Position3D], samples: usize) -> Self {
        let legs = waypoints.len().saturating_sub(1);
        let mut points = Vec::with_capacity(legs * samples);
        for leg in waypoints.windows(2) {
            push_leg(&mut points, &leg[0], &leg[1], samples);
        }
        Self { points }
    }

    pub fn points(&self) -> &[Position3D] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

fn push_leg(points: &mut Vec<Position3D>, start: &Position3D, end: &Position3D, samples: usize) {
    let divisor = (samples.max(2) - 1) as f64;
    for i in 0..samples {
        points.push(start.lerp(end, i as f64 / divisor));
    }
}

/// 経路生成器
#[derive(Debug, Clone, Copy)]
pub struct PathGenerator {
    /// 区間あたりのサンプル点数
    pub samples: usize,
    /// 海域の最大水深（深深度潜航の目標深度に使用）
    pub max_depth: f64,
}

impl PathGenerator {
    pub fn new(samples: usize, max_depth: f64) -> SimResult<Self> {
        if samples < 2 {
            return Err(SimulationError::invalid(
                "path_sampling_points",
                format!("少なくとも2点必要です（{}）", samples),
            ));
        }
        if max_depth.is_nan() || max_depth < DEEP_DIVE_BOTTOM_CLEARANCE {
            return Err(SimulationError::invalid(
                "max_depth",
                format!("{}m以上が必要です（{}）", DEEP_DIVE_BOTTOM_CLEARANCE, max_depth),
            ));
        }
        Ok(Self { samples, max_depth })
    }

    pub fn surface_path(&self, start: (f64, f64), end: (f64, f64)) -> Path {
        Path::surface(start, end, self.samples)
    }

    pub fn direct_path(&self, start: Position3D, end: Position3D) -> Path {
        Path::direct(start, end, self.samples)
    }

    /// 戦略に応じた潜航経路
    pub fn scenario_path(&self, strategy: RouteStrategy, start: Position3D, end: Position3D) -> Path {
        match strategy {
            RouteStrategy::Direct => self.direct_path(start, end),
            RouteStrategy::Zigzag => Path::through(&zigzag_waypoints(&start, &end), self.samples),
            RouteStrategy::DeepDive => {
                let mut mid = start.lerp(&end, 0.5);
                mid.z = DEEP_DIVE_DEPTH.min(self.max_depth - DEEP_DIVE_BOTTOM_CLEARANCE);
                Path::through(&[start, mid, end], self.samples)
            }
            RouteStrategy::Coastal => {
                let near_start = Position3D::new(start.x + COASTAL_OFFSET, COASTAL_LANE_Y, start.z);
                let near_end = Position3D::new(end.x - COASTAL_OFFSET, COASTAL_LANE_Y, end.z);
                Path::through(&[start, near_start, near_end, end], self.samples)
            }
        }
    }
}

fn zigzag_waypoints(start: &Position3D, end: &Position3D) -> Vec<Position3D> {
    let mut waypoints = Vec::with_capacity(ZIGZAG_WAYPOINTS + 2);
    waypoints.push(*start);
    for i in 0..ZIGZAG_WAYPOINTS {
        let t = (i + 1) as f64 / (ZIGZAG_WAYPOINTS + 1) as f64;
        let mut wp = start.lerp(end, t);
        wp.y += if i % 2 == 0 { -ZIGZAG_AMPLITUDE } else { ZIGZAG_AMPLITUDE };
        waypoints.push(wp);
    }
    waypoints.push(*end);
    waypoints
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> PathGenerator {
        PathGenerator::new(200, 280.0).unwrap()
    }

    fn endpoints() -> (Position3D, Position3D) {
        (
            Position3D::new(1000.0, 1000.0, 100.0),
            Position3D::new(9000.0, 9000.0, 200.0),
        )
    }

    #[test]
    fn test_new_rejects_invalid_parameters() {
        assert!(PathGenerator::new(1, 280.0).is_err());
        assert!(PathGenerator::new(2, 280.0).is_ok());
        // 深深度潜航の目標深度が水面より上になる海域は拒否
        assert!(PathGenerator::new(200, 20.0).is_err());
        assert!(PathGenerator::new(200, 30.0).is_ok());
    }

    #[test]
    fn test_direct_path_endpoints() {
        let (start, end) = endpoints();
        let path = generator().direct_path(start, end);
        assert_eq!(path.len(), 200);
        assert_eq!(path.points()[0], start);
        assert_eq!(path.points()[199], end);
    }

    #[test]
    fn test_surface_path_is_flat() {
        let path = generator().surface_path((1000.0, 1000.0), (9000.0, 9000.0));
        assert_eq!(path.len(), 200);
        assert!(path.points().iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn test_scenario_path_lengths() {
        let (start, end) = endpoints();
        let g = generator();
        assert_eq!(g.scenario_path(RouteStrategy::Direct, start, end).len(), 200);
        assert_eq!(g.scenario_path(RouteStrategy::Zigzag, start, end).len(), 6 * 200);
        assert_eq!(g.scenario_path(RouteStrategy::DeepDive, start, end).len(), 2 * 200);
        assert_eq!(g.scenario_path(RouteStrategy::Coastal, start, end).len(), 3 * 200);
    }

    #[test]
    fn test_zigzag_alternates() {
        let (start, end) = endpoints();
        let path = generator().scenario_path(RouteStrategy::Zigzag, start, end);
        let wp1 = path.points()[199];
        let wp2 = path.points()[399];
        let base1 = start.lerp(&end, 1.0 / 6.0);
        let base2 = start.lerp(&end, 2.0 / 6.0);
        assert!((wp1.y - (base1.y - ZIGZAG_AMPLITUDE)).abs() < 1e-6);
        assert!((wp2.y - (base2.y + ZIGZAG_AMPLITUDE)).abs() < 1e-6);
    }

    #[test]
    fn test_deep_dive_midpoint_depth() {
        let (start, end) = endpoints();
        let path = generator().scenario_path(RouteStrategy::DeepDive, start, end);
        let mid = path.points()[199];
        assert_eq!(mid.z, 250.0);
        assert!((mid.x - 5000.0).abs() < 1e-9);

        let shallow_sea = PathGenerator::new(200, 200.0).unwrap();
        let path = shallow_sea.scenario_path(RouteStrategy::DeepDive, start, end);
        assert_eq!(path.points()[199].z, 170.0);
    }

    #[test]
    fn test_coastal_waypoints() {
        let (start, end) = endpoints();
        let path = generator().scenario_path(RouteStrategy::Coastal, start, end);
        let wp1 = path.points()[199];
        let wp2 = path.points()[399];
        assert_eq!(wp1, Position3D::new(2000.0, 500.0, 100.0));
        assert_eq!(wp2, Position3D::new(8000.0, 500.0, 200.0));
    }
}
