//! 路网通用类型定义

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::Hash;

/// 节点键约束
///
/// 引擎对节点表示不做任何假设，只要求可哈希、可比较。
/// 坐标节点用 [`GeoNode`]，合成网络直接用整数即可。
pub trait NodeKey: Clone + Eq + Hash + Ord + fmt::Debug {}

impl<T: Clone + Eq + Hash + Ord + fmt::Debug> NodeKey for T {}

/// 坐标定点缩放因子（微度）
const COORD_SCALE: f64 = 1_000_000.0;

/// 地理节点（路段端点）
///
/// 坐标以微度定点存储，保证可哈希、可全序比较；
/// shapefile 中的浮点端点经 [`GeoNode::from_degrees`] 归一化后
/// 相同位置必然得到相同节点。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeoNode {
    /// 经度（微度）
    x: i64,
    /// 纬度（微度）
    y: i64,
}

impl GeoNode {
    /// 从微度坐标创建节点
    pub fn new(x_micro: i64, y_micro: i64) -> Self {
        Self {
            x: x_micro,
            y: y_micro,
        }
    }

    /// 从浮点度坐标创建节点
    pub fn from_degrees(x: f64, y: f64) -> Self {
        Self {
            x: (x * COORD_SCALE).round() as i64,
            y: (y * COORD_SCALE).round() as i64,
        }
    }

    /// 从 "x,y" 形式的字符串解析节点
    pub fn from_pair_str(s: &str) -> Result<Self, crate::Error> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 2 {
            return Err(crate::Error::InvalidCoordinate(format!(
                "应为 x,y, 实际为 {}",
                s
            )));
        }
        let x = parts[0]
            .trim()
            .parse::<f64>()
            .map_err(|e| crate::Error::InvalidCoordinate(format!("无法解析经度: {}", e)))?;
        let y = parts[1]
            .trim()
            .parse::<f64>()
            .map_err(|e| crate::Error::InvalidCoordinate(format!("无法解析纬度: {}", e)))?;
        Ok(Self::from_degrees(x, y))
    }

    /// 经度（度）
    pub fn x_degrees(&self) -> f64 {
        self.x as f64 / COORD_SCALE
    }

    /// 纬度（度）
    pub fn y_degrees(&self) -> f64 {
        self.y as f64 / COORD_SCALE
    }
}

impl fmt::Display for GeoNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.x_degrees(), self.y_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_node_normalization() {
        // 相同位置的浮点端点归一化到同一节点
        let a = GeoNode::from_degrees(116.3912757, 39.9067389);
        let b = GeoNode::from_degrees(116.39127570000001, 39.9067389);
        assert_eq!(a, b);
    }

    #[test]
    fn test_geo_node_roundtrip() {
        let n = GeoNode::from_degrees(-73.985656, 40.748433);
        assert!((n.x_degrees() - -73.985656).abs() < 1e-6);
        assert!((n.y_degrees() - 40.748433).abs() < 1e-6);
    }

    #[test]
    fn test_geo_node_from_pair_str() {
        let n = GeoNode::from_pair_str("116.39, 39.90").unwrap();
        assert_eq!(n, GeoNode::from_degrees(116.39, 39.90));

        assert!(GeoNode::from_pair_str("116.39").is_err());
        assert!(GeoNode::from_pair_str("abc,39.9").is_err());
    }

    #[test]
    fn test_geo_node_ordering() {
        let a = GeoNode::from_degrees(1.0, 2.0);
        let b = GeoNode::from_degrees(1.0, 3.0);
        let c = GeoNode::from_degrees(2.0, 0.0);
        assert!(a < b);
        assert!(b < c);
    }
}
