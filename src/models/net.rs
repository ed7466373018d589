use serde::Serialize;

use crate::models::{
    common::{Point2D, segments_within_distance},
    path::Path,
    traits::{ICollision, ISurfaceCollision},
};

/// 防潜網
///
/// 水面上の2端点を結ぶ線分として平面に張られ、深度帯 [z_top, z_bottom] を塞ぎます。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Net {
    pub start: Point2D,
    pub end: Point2D,
    /// 網上端の深度（m）
    pub z_top: f64,
    /// 網下端の深度（m）。z_top + 垂下量のため最大水深を超えることがある
    pub z_bottom: f64,
    /// 網の物理的な幅（m）
    pub width: f64,
}

impl Net {
    pub fn new(start: Point2D, end: Point2D, z_top: f64, z_bottom: f64, width: f64) -> Self {
        Self { start, end, z_top, z_bottom, width }
    }

    /// 端点間の長さ
    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    pub fn covers_depth(&self, z: f64) -> bool {
        self.z_top <= z && z <= self.z_bottom
    }

    fn crosses_segment(&self, p1: Point2D, p2: Point2D, threshold: f64) -> bool {
        segments_within_distance(p1, p2, self.start, self.end, threshold)
    }
}

impl ISurfaceCollision for Net {
    fn check_collision_2d(&self, path: &Path, vessel_width: f64, vessel_draft: f64) -> bool {
        if vessel_draft < self.z_top {
            return false;
        }

        let threshold = (self.width + vessel_width) / 2.0;
        path.points()
            .windows(2)
            .any(|pair| self.crosses_segment(pair[0].xy(), pair[1].xy(), threshold))
    }
}

impl ICollision for Net {
    fn check_collision_3d(&self, path: &Path, vehicle_width: f64) -> bool {
        let threshold = (self.width + vehicle_width) / 2.0;
        path.points()
            .windows(2)
            .filter(|pair| self.covers_depth(pair[0].z) || self.covers_depth(pair[1].z))
            .any(|pair| self.crosses_segment(pair[0].xy(), pair[1].xy(), threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::common::Position3D;

    fn crossing_net(z_top: f64, z_bottom: f64) -> Net {
        Net::new(
            Point2D::new(500.0, -300.0),
            Point2D::new(500.0, 300.0),
            z_top,
            z_bottom,
            50.0,
        )
    }

    fn path_at(z: f64) -> Path {
        Path::direct(
            Position3D::new(0.0, 0.0, z),
            Position3D::new(1000.0, 0.0, z),
            101,
        )
    }

    #[test]
    fn test_length() {
        let net = Net::new(Point2D::new(0.0, 0.0), Point2D::new(300.0, 400.0), 50.0, 100.0, 50.0);
        assert!((net.length() - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_net_2d_blocked_by_draft() {
        let net = crossing_net(50.0, 150.0);
        // 網上端が喫水より深い → 水上艦は接触しない
        assert!(!net.check_collision_2d(&path_at(0.0), 20.0, 8.0));
        // 喫水が網上端に届けば接触
        assert!(net.check_collision_2d(&path_at(0.0), 20.0, 60.0));
    }

    #[test]
    fn test_net_3d_depth_band() {
        let net = crossing_net(50.0, 150.0);
        assert!(net.check_collision_3d(&path_at(100.0), 12.0));
        assert!(net.check_collision_3d(&path_at(150.0), 12.0));
        assert!(!net.check_collision_3d(&path_at(30.0), 12.0));
        assert!(!net.check_collision_3d(&path_at(200.0), 12.0));
    }

    fn pair(from: Position3D, to: Position3D) -> Path {
        Path::through(&[from, to], 2)
    }

    #[test]
    fn test_net_3d_pair_entering_band() {
        let net = crossing_net(50.0, 150.0);
        // 片方の端点だけが深度帯内でも判定対象
        let descending = pair(Position3D::new(490.0, 0.0, 140.0), Position3D::new(510.0, 0.0, 400.0));
        assert!(net.check_collision_3d(&descending, 12.0));
        let ascending = pair(Position3D::new(490.0, 0.0, 400.0), Position3D::new(510.0, 0.0, 100.0));
        assert!(net.check_collision_3d(&ascending, 12.0));
    }

    #[test]
    fn test_net_3d_pair_straddling_band_is_skipped() {
        let net = crossing_net(50.0, 150.0);
        // 両端点が深度帯の上下に外れている区間は対象外
        let straddling = pair(Position3D::new(490.0, 0.0, 30.0), Position3D::new(510.0, 0.0, 200.0));
        assert!(!net.check_collision_3d(&straddling, 12.0));
    }

    #[test]
    fn test_net_3d_planar_miss() {
        // 経路の横を通る網
        let net = Net::new(Point2D::new(0.0, 100.0), Point2D::new(1000.0, 100.0), 50.0, 150.0, 50.0);
        assert!(!net.check_collision_3d(&path_at(100.0), 12.0));
        // 閾値 (50 + 12) / 2 = 31 以内なら接触
        let close = Net::new(Point2D::new(0.0, 31.0), Point2D::new(1000.0, 31.0), 50.0, 150.0, 50.0);
        assert!(close.check_collision_3d(&path_at(100.0), 12.0));
    }
}
