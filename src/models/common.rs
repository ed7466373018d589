use std::ops::{Add, Mul, Sub};

use serde::Serialize;

/// 3次元位置を表す構造体
///
/// zは水深（下向き正、水面が0）です。
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position3D {
    pub x: f64, // m
    pub y: f64, // m
    pub z: f64, // m (depth)
}

impl Position3D {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 水面上（z = 0）の位置
    pub fn surface(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }

    /// XY平面での2次元距離を計算
    pub fn distance_xy(&self, other: &Position3D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    /// 3次元距離を計算
    pub fn distance_3d(&self, other: &Position3D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2) + (self.z - other.z).powi(2)).sqrt()
    }

    /// XY平面への射影
    pub fn xy(&self) -> Point2D {
        Point2D::new(self.x, self.y)
    }

    /// 2点間の線形補間（t = 0 で self、t = 1 で other）
    pub fn lerp(&self, other: &Position3D, t: f64) -> Self {
        Self::new(
            self.x + t * (other.x - self.x),
            self.y + t * (other.y - self.y),
            self.z + t * (other.z - self.z),
        )
    }
}

/// 平面（XY）上の点またはベクトル
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point2D {
    pub x: f64, // m
    pub y: f64, // m
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn dot(&self, other: &Point2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// ベクトルの長さ
    pub fn magnitude(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        (*self - *other).magnitude()
    }

    /// 左回り90度回転（垂直ベクトル）
    pub fn perpendicular(&self) -> Self {
        Self::new(-self.y, self.x)
    }
}

impl Add for Point2D {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Point2D {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f64> for Point2D {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self::Output {
        Self::new(self.x * scalar, self.y * scalar)
    }
}

/// 作戦海域 [0, width] × [0, height] × [0, max_depth]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingArea {
    pub width: f64,     // m
    pub height: f64,    // m
    pub max_depth: f64, // m
}

impl OperatingArea {
    pub fn new(width: f64, height: f64, max_depth: f64) -> Self {
        Self { width, height, max_depth }
    }

    /// 平面座標を海域内にクリップ
    pub fn clamp_xy(&self, x: f64, y: f64) -> (f64, f64) {
        (x.clamp(0.0, self.width), y.clamp(0.0, self.height))
    }

    /// 水深を海域内にクリップ
    pub fn clamp_depth(&self, z: f64) -> f64 {
        z.clamp(0.0, self.max_depth)
    }
}

/// これ未満の線分長²は点として扱う
const DEGENERATE_SEGMENT_SQ: f64 = 1e-6;

/// 点から線分までの最短距離
///
/// 点を線分上に射影し、射影パラメータを[0, 1]にクリップした位置との距離を返します。
/// 線分長²が1e-6未満の場合は始点との距離を返します。
pub fn point_to_segment_distance(point: Point2D, seg_start: Point2D, seg_end: Point2D) -> f64 {
    let segment = seg_end - seg_start;
    let point_vec = point - seg_start;

    let segment_length_sq = segment.dot(&segment);
    if segment_length_sq < DEGENERATE_SEGMENT_SQ {
        return point.distance(&seg_start);
    }

    let t = (point_vec.dot(&segment) / segment_length_sq).clamp(0.0, 1.0);
    let projection = seg_start + segment * t;

    point.distance(&projection)
}

/// 2線分が閾値以内に接近しているかを判定
///
/// 各端点から相手線分への4つの距離の最小値で近似します。
/// 交差する線分でも端点が離れていれば見逃す可能性がありますが、
/// 経路のサンプル間隔は障害物寸法より十分細かい前提です。
pub fn segments_within_distance(
    p1: Point2D,
    p2: Point2D,
    q1: Point2D,
    q2: Point2D,
    threshold: f64,
) -> bool {
    let min_distance = point_to_segment_distance(p1, q1, q2)
        .min(point_to_segment_distance(p2, q1, q2))
        .min(point_to_segment_distance(q1, p1, p2))
        .min(point_to_segment_distance(q2, p1, p2));

    min_distance <= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_point_on_segment_is_zero() {
        let d = point_to_segment_distance(
            Point2D::new(5.0, 0.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
        );
        assert!(d.abs() < EPS);

        let d = point_to_segment_distance(
            Point2D::new(2.0, 2.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(4.0, 4.0),
        );
        assert!(d.abs() < EPS);
    }

    #[test]
    fn test_projection_outside_uses_nearest_endpoint() {
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(10.0, 0.0);

        // t > 1
        let d = point_to_segment_distance(Point2D::new(13.0, 4.0), a, b);
        assert!((d - 5.0).abs() < EPS);

        // t < 0
        let d = point_to_segment_distance(Point2D::new(-3.0, -4.0), a, b);
        assert!((d - 5.0).abs() < EPS);
    }

    #[test]
    fn test_perpendicular_distance() {
        let d = point_to_segment_distance(
            Point2D::new(5.0, 7.0),
            Point2D::new(0.0, 0.0),
            Point2D::new(10.0, 0.0),
        );
        assert!((d - 7.0).abs() < EPS);
    }

    #[test]
    fn test_degenerate_segment_falls_back_to_point() {
        let p = Point2D::new(3.0, 4.0);
        let a = Point2D::new(0.0, 0.0);
        let b = Point2D::new(0.0001, 0.0);
        let d = point_to_segment_distance(p, a, b);
        assert!((d - 5.0).abs() < EPS);
        assert!(d.is_finite());
    }

    #[test]
    fn test_segments_within_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(10.0, 0.0);
        let q1 = Point2D::new(5.0, 3.0);
        let q2 = Point2D::new(5.0, 10.0);

        assert!(segments_within_distance(p1, p2, q1, q2, 3.0));
        assert!(!segments_within_distance(p1, p2, q1, q2, 2.9));
    }

    #[test]
    fn test_area_clamp() {
        let area = OperatingArea::new(100.0, 50.0, 20.0);
        assert_eq!(area.clamp_xy(-5.0, 60.0), (0.0, 50.0));
        assert_eq!(area.clamp_depth(25.0), 20.0);
    }

    #[test]
    fn test_lerp() {
        let a = Position3D::new(0.0, 0.0, 100.0);
        let b = Position3D::new(10.0, 20.0, 200.0);
        assert_eq!(a.lerp(&b, 0.5), Position3D::new(5.0, 10.0, 150.0));
    }
}
