use serde::Serialize;

use crate::models::{
    common::Position3D,
    path::Path,
    traits::{ICollision, ISurfaceCollision},
};

/// 浮遊機雷の影響帯（機雷深度から上方向、m）
pub const SURFACE_MINE_INFLUENCE_BAND: f64 = 20.0;

/// 機雷の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MineKind {
    /// 浮遊機雷
    Surface,
    /// 係維機雷
    Moored,
    /// 沈底機雷
    Bottom,
}

/// 敷設方式（どの敷設手順で配置されたか）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// 航路に沿った線状敷設
    Linear,
    /// 航路中点周りのガウス散布
    Random,
}

/// 浮遊機雷
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceMine {
    pub position: Position3D,
    pub radius: f64,
    pub placement: Placement,
}

impl SurfaceMine {
    pub fn new(position: Position3D, radius: f64, placement: Placement) -> Self {
        Self { position, radius, placement }
    }

    /// 平面距離で判定する（サンプル点のz は見ない）
    fn any_within_xy<'a>(&self, mut points: impl Iterator<Item = &'a Position3D>, vessel_width: f64) -> bool {
        let limit = self.radius + vessel_width / 2.0;
        points.any(|p| p.distance_xy(&self.position) <= limit)
    }
}

impl ISurfaceCollision for SurfaceMine {
    fn check_collision_2d(&self, path: &Path, vessel_width: f64, vessel_draft: f64) -> bool {
        if vessel_draft < self.position.z {
            return false;
        }
        self.any_within_xy(path.points().iter(), vessel_width)
    }
}

impl ICollision for SurfaceMine {
    fn check_collision_3d(&self, path: &Path, vehicle_width: f64) -> bool {
        let ceiling = self.position.z + SURFACE_MINE_INFLUENCE_BAND;
        let shallow = path.points().iter().filter(|p| p.z <= ceiling);
        self.any_within_xy(shallow, vehicle_width)
    }
}

/// 係維機雷
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MooredMine {
    pub position: Position3D,
    pub radius: f64,
    pub placement: Placement,
}

impl MooredMine {
    pub fn new(position: Position3D, radius: f64, placement: Placement) -> Self {
        Self { position, radius, placement }
    }
}

impl ICollision for MooredMine {
    fn check_collision_3d(&self, path: &Path, vehicle_width: f64) -> bool {
        any_within_3d(&self.position, self.radius, path, vehicle_width)
    }
}

/// 沈底機雷（zは常に最大水深）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BottomMine {
    pub position: Position3D,
    pub radius: f64,
    pub placement: Placement,
}

impl BottomMine {
    pub fn new(x: f64, y: f64, bottom_depth: f64, radius: f64, placement: Placement) -> Self {
        Self {
            position: Position3D::new(x, y, bottom_depth),
            radius,
            placement,
        }
    }
}

impl ICollision for BottomMine {
    fn check_collision_3d(&self, path: &Path, vehicle_width: f64) -> bool {
        any_within_3d(&self.position, self.radius, path, vehicle_width)
    }
}

fn any_within_3d(center: &Position3D, radius: f64, path: &Path, vehicle_width: f64) -> bool {
    let limit = radius + vehicle_width / 2.0;
    path.points().iter().any(|p| p.distance_3d(center) <= limit)
}
