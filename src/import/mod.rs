//! 路段数据导入模块
//!
//! 支持从 CSV、JSON Lines 批量导入路段记录。
//! 矢量几何的解析在上游完成，这里只接收
//! 端点坐标、长度和可选容量。

use crate::error::Result;
use crate::graph::FlowNetwork;
use crate::types::GeoNode;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// 导入统计
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ImportStats {
    pub segments_imported: usize,
    pub errors: usize,
    pub duration_ms: u64,
}

/// 路段记录（JSON 格式）
#[derive(Debug, Serialize, Deserialize)]
struct SegmentRecord {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    length: f64,
    #[serde(default)]
    capacity: Option<f64>,
}

/// 从 CSV 导入路段
///
/// 行格式为 `x1,y1,x2,y2,length[,capacity]`，首行表头跳过。
/// 缺省容量记为 0，等待后续分配。格式错误的行计入错误数，不中断导入。
pub fn import_segments_csv<P: AsRef<Path>>(path: P) -> Result<(FlowNetwork<GeoNode>, ImportStats)> {
    let start = std::time::Instant::now();
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut network = FlowNetwork::new();
    let mut stats = ImportStats::default();

    for line in reader.lines().skip(1) {
        // 跳过表头
        let line = match line {
            Ok(line) => line,
            Err(_) => {
                stats.errors += 1;
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match parse_csv_segment(&line) {
            Some(record) => match add_segment(&mut network, &record) {
                Ok(()) => stats.segments_imported += 1,
                Err(_) => stats.errors += 1,
            },
            None => stats.errors += 1,
        }
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    debug!(
        segments = stats.segments_imported,
        errors = stats.errors,
        "CSV 路段导入完成"
    );
    Ok((network, stats))
}

/// 解析单行 CSV 路段
fn parse_csv_segment(line: &str) -> Option<SegmentRecord> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 5 {
        return None;
    }

    let x1 = parts[0].trim().parse::<f64>().ok()?;
    let y1 = parts[1].trim().parse::<f64>().ok()?;
    let x2 = parts[2].trim().parse::<f64>().ok()?;
    let y2 = parts[3].trim().parse::<f64>().ok()?;
    let length = parts[4].trim().parse::<f64>().ok()?;
    let capacity = match parts.get(5) {
        Some(raw) if !raw.trim().is_empty() => Some(raw.trim().parse::<f64>().ok()?),
        _ => None,
    };

    Some(SegmentRecord {
        x1,
        y1,
        x2,
        y2,
        length,
        capacity,
    })
}

/// 从 JSON Lines 导入路段
pub fn import_segments_jsonl<P: AsRef<Path>>(
    path: P,
) -> Result<(FlowNetwork<GeoNode>, ImportStats)> {
    let start = std::time::Instant::now();
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut network = FlowNetwork::new();
    let mut stats = ImportStats::default();

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => {
                stats.errors += 1;
                continue;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<SegmentRecord>(&line) {
            Ok(record) => match add_segment(&mut network, &record) {
                Ok(()) => stats.segments_imported += 1,
                Err(_) => stats.errors += 1,
            },
            Err(_) => stats.errors += 1,
        }
    }

    stats.duration_ms = start.elapsed().as_millis() as u64;
    debug!(
        segments = stats.segments_imported,
        errors = stats.errors,
        "JSONL 路段导入完成"
    );
    Ok((network, stats))
}

/// 把一条路段记录加入路网
fn add_segment(network: &mut FlowNetwork<GeoNode>, record: &SegmentRecord) -> Result<()> {
    let origin = GeoNode::from_degrees(record.x1, record.y1);
    let destination = GeoNode::from_degrees(record.x2, record.y2);
    network.add_edge(
        origin,
        destination,
        record.length,
        record.capacity.unwrap_or(0.0),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_import_csv() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "x1,y1,x2,y2,length,capacity").unwrap();
        writeln!(file, "0.0,0.0,1.0,0.0,120.5,30").unwrap();
        writeln!(file, "1.0,0.0,1.0,1.0,80.0,12").unwrap();

        let (network, stats) = import_segments_csv(file.path()).unwrap();
        assert_eq!(stats.segments_imported, 2);
        assert_eq!(stats.errors, 0);
        assert_eq!(network.edge_count(), 2);
        assert_eq!(network.node_count(), 3);

        let a = GeoNode::from_degrees(0.0, 0.0);
        let b = GeoNode::from_degrees(1.0, 0.0);
        let edge = network.edge(&a, &b).unwrap();
        assert_eq!(edge.weight(), 120.5);
        assert_eq!(edge.capacity(), 30.0);
    }

    #[test]
    fn test_import_csv_without_capacity_column() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "x1,y1,x2,y2,length").unwrap();
        writeln!(file, "0.0,0.0,1.0,0.0,50.0").unwrap();

        let (network, stats) = import_segments_csv(file.path()).unwrap();
        assert_eq!(stats.segments_imported, 1);

        let a = GeoNode::from_degrees(0.0, 0.0);
        let b = GeoNode::from_degrees(1.0, 0.0);
        assert_eq!(network.edge(&a, &b).unwrap().capacity(), 0.0);
    }

    #[test]
    fn test_import_csv_counts_bad_rows() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "x1,y1,x2,y2,length,capacity").unwrap();
        writeln!(file, "0.0,0.0,1.0,0.0,120.5,30").unwrap();
        writeln!(file, "not,a,valid,row").unwrap();
        writeln!(file, "0.0,0.0,2.0,0.0,90.0,-4").unwrap(); // 负容量被拒绝

        let (network, stats) = import_segments_csv(file.path()).unwrap();
        assert_eq!(stats.segments_imported, 1);
        assert_eq!(stats.errors, 2);
        assert_eq!(network.edge_count(), 1);
    }

    #[test]
    fn test_import_jsonl() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"x1":0.0,"y1":0.0,"x2":1.0,"y2":0.0,"length":120.5,"capacity":30.0}}"#
        )
        .unwrap();
        writeln!(
            file,
            r#"{{"x1":1.0,"y1":0.0,"x2":1.0,"y2":1.0,"length":80.0}}"#
        )
        .unwrap();

        let (network, stats) = import_segments_jsonl(file.path()).unwrap();
        assert_eq!(stats.segments_imported, 2);
        assert_eq!(stats.errors, 0);

        let b = GeoNode::from_degrees(1.0, 0.0);
        let c = GeoNode::from_degrees(1.0, 1.0);
        // 未给容量的路段记为 0
        assert_eq!(network.edge(&b, &c).unwrap().capacity(), 0.0);
    }
}
