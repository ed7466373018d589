use crate::models::path::Path;

/// 潜航体（3次元経路）に対する衝突判定のインターフェース
pub trait ICollision {
    /// 経路全体に対する衝突判定（最初の接触でtrue）
    fn check_collision_3d(&self, path: &Path, vehicle_width: f64) -> bool;
}

/// 水上艦（2次元経路＋喫水）に対する衝突判定のインターフェース
pub trait ISurfaceCollision {
    /// 経路全体に対する衝突判定（最初の接触でtrue）
    fn check_collision_2d(&self, path: &Path, vessel_width: f64, vessel_draft: f64) -> bool;
}
