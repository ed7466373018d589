use serde::Serialize;

use crate::models::{
    mine::{BottomMine, MineKind, MooredMine, SurfaceMine},
    net::Net,
    path::Path,
    traits::{ICollision, ISurfaceCollision},
};

/// 障害物（機雷3種と防潜網）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Hazard {
    Surface(SurfaceMine),
    Moored(MooredMine),
    Bottom(BottomMine),
    Net(Net),
}

impl Hazard {
    /// 機雷の種類（網ならNone）
    pub fn mine_kind(&self) -> Option<MineKind> {
        match self {
            Hazard::Surface(_) => Some(MineKind::Surface),
            Hazard::Moored(_) => Some(MineKind::Moored),
            Hazard::Bottom(_) => Some(MineKind::Bottom),
            Hazard::Net(_) => None,
        }
    }

    pub fn is_mine(&self) -> bool {
        self.mine_kind().is_some()
    }

    pub fn is_net(&self) -> bool {
        matches!(self, Hazard::Net(_))
    }
}

/// 係維・沈底機雷は水上艦の2次元判定では対象外
impl ISurfaceCollision for Hazard {
    fn check_collision_2d(&self, path: &Path, vessel_width: f64, vessel_draft: f64) -> bool {
        match self {
            Hazard::Surface(m) => m.check_collision_2d(path, vessel_width, vessel_draft),
            Hazard::Net(n) => n.check_collision_2d(path, vessel_width, vessel_draft),
            Hazard::Moored(_) | Hazard::Bottom(_) => false,
        }
    }
}

impl ICollision for Hazard {
    fn check_collision_3d(&self, path: &Path, vehicle_width: f64) -> bool {
        match self {
            Hazard::Surface(m) => m.check_collision_3d(path, vehicle_width),
            Hazard::Moored(m) => m.check_collision_3d(path, vehicle_width),
            Hazard::Bottom(m) => m.check_collision_3d(path, vehicle_width),
            Hazard::Net(n) => n.check_collision_3d(path, vehicle_width),
        }
    }
}
