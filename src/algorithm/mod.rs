//! 图算法模块
//!
//! 包含路径选择和最大流求解

mod max_flow;
mod path_finding;

pub use max_flow::{
    max_flow, solve_many, Augmentation, MaxFlowOutcome, MaxFlowSolver, MaxFlowSummary,
};
pub use path_finding::{PathFinder, PathResult};
