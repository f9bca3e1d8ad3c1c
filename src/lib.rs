//! StreetFlow - 路网最大流 / 最小割分析引擎
//!
//! 面向空间网络分析的最大流求解库，支持：
//! - 从路段数据构建带容量的无向路网
//! - 按路段长度的最短增广路径迭代求解最大流
//! - 残量图与饱和割边集刻画最小割
//! - 随机容量分配、批量起终点并行求解

pub mod algorithm;
pub mod capacity;
pub mod error;
pub mod graph;
pub mod import;
pub mod metrics;
pub mod types;

// 重导出常用类型
pub use algorithm::{
    max_flow, solve_many, Augmentation, MaxFlowOutcome, MaxFlowSolver, MaxFlowSummary, PathFinder,
    PathResult,
};
pub use error::{Error, Result};
pub use graph::{EdgeData, EdgeKey, FlowNetwork};
pub use types::{GeoNode, NodeKey};

/// 库版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
