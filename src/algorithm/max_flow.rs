//! 最大流算法
//!
//! 在无向容量路网上迭代寻找最短增广路径：
//! 每轮按长度选路、求瓶颈容量、扣减剩余容量，
//! 饱和的边从残量图中删除，直到起点终点不再连通。
//! 删掉的边集与残量图一起刻画最小割。

use super::path_finding::PathFinder;
use crate::error::{Error, Result};
use crate::graph::{EdgeKey, FlowNetwork};
use crate::metrics::global_metrics;
use crate::types::NodeKey;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, info, warn};

/// 单轮增广记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Augmentation<N: NodeKey> {
    /// 增广路径上的节点序列
    pub path: Vec<N>,
    /// 本轮瓶颈容量（流量增量）
    pub bottleneck: f64,
    /// 本轮饱和并被删除的边（瓶颈边，可能并列多条）
    pub saturated: Vec<EdgeKey<N>>,
}

/// 求解结果
///
/// 结果图保留全部边并累计流量；残量图只剩容量为正的边。
/// 二者在终止时一并返回，不丢弃部分结果。
#[derive(Debug, Clone)]
pub struct MaxFlowOutcome<N: NodeKey> {
    /// 结果图（全部边，带累计流量）
    pub flow_graph: FlowNetwork<N>,
    /// 耗尽的残量图
    pub residual: FlowNetwork<N>,
    /// 最大流量值
    pub max_flow: f64,
    /// 逐轮增广历史
    pub augmentations: Vec<Augmentation<N>>,
    /// 是否因迭代上限提前停止
    pub hit_iteration_limit: bool,
    /// 起点
    pub start: N,
    /// 终点
    pub end: N,
}

impl<N: NodeKey> MaxFlowOutcome<N> {
    /// 整个求解过程中饱和删除的边（割边集）
    pub fn cut_edges(&self) -> Vec<&EdgeKey<N>> {
        self.augmentations
            .iter()
            .flat_map(|a| a.saturated.iter())
            .collect()
    }

    /// 最小割的起点侧节点集
    ///
    /// 在耗尽的残量图上从起点做可达性扫描，能到达的节点属于起点侧。
    pub fn source_side(&self) -> HashSet<N> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();

        visited.insert(self.start.clone());
        queue.push_back(self.start.clone());

        while let Some(current) = queue.pop_front() {
            for neighbor in self.residual.neighbors(&current) {
                if !visited.contains(neighbor) {
                    visited.insert(neighbor.clone());
                    queue.push_back(neighbor.clone());
                }
            }
        }

        visited
    }

    /// 可序列化摘要
    pub fn summary(&self) -> MaxFlowSummary<N> {
        MaxFlowSummary {
            max_flow: self.max_flow,
            iterations: self.augmentations.len(),
            saturated_edges: self.cut_edges().into_iter().cloned().collect(),
            residual_edges: self.residual.edge_count(),
            hit_iteration_limit: self.hit_iteration_limit,
        }
    }
}

/// 求解摘要（用于 JSON 输出）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaxFlowSummary<N: NodeKey> {
    pub max_flow: f64,
    pub iterations: usize,
    pub saturated_edges: Vec<EdgeKey<N>>,
    pub residual_edges: usize,
    pub hit_iteration_limit: bool,
}

/// 最短增广路径最大流求解器
///
/// 构造时从输入路网派生两份相互独立的图：
/// 结果图保留全部边且流量清零，残量图只收容量为正的边。
/// 之后只有增广步骤改动这两份图。
pub struct MaxFlowSolver<N: NodeKey> {
    /// 结果图
    flow_graph: FlowNetwork<N>,
    /// 残量图
    residual: FlowNetwork<N>,
    start: N,
    end: N,
    /// 可选的迭代上限
    max_iterations: Option<usize>,
}

impl<N: NodeKey> MaxFlowSolver<N> {
    /// 创建求解器
    ///
    /// 起点或终点不在路网节点集中时直接拒绝。
    pub fn new(network: &FlowNetwork<N>, start: N, end: N) -> Result<Self> {
        if !network.contains_node(&start) {
            return Err(Error::DisconnectedStartEnd(format!("{:?}", start)));
        }
        if !network.contains_node(&end) {
            return Err(Error::DisconnectedStartEnd(format!("{:?}", end)));
        }

        let mut flow_graph = network.clone();
        flow_graph.reset_flows();

        // 残量图不变量：存在的边容量必为正
        let mut residual = FlowNetwork::new();
        for (key, data) in network.edges() {
            if data.capacity() > 0.0 {
                residual.add_edge(
                    key.u().clone(),
                    key.v().clone(),
                    data.weight(),
                    data.capacity(),
                )?;
            }
        }

        Ok(Self {
            flow_graph,
            residual,
            start,
            end,
            max_iterations: None,
        })
    }

    /// 设置迭代上限
    ///
    /// 上限耗尽时停止求解并返回已有结果，结果带 `hit_iteration_limit` 标记。
    pub fn with_max_iterations(mut self, limit: usize) -> Self {
        self.max_iterations = Some(limit);
        self
    }

    /// 求解最大流
    pub fn solve(mut self) -> Result<MaxFlowOutcome<N>> {
        let timer = global_metrics().record_solve_start();

        let mut max_flow = 0.0;
        let mut augmentations: Vec<Augmentation<N>> = Vec::new();
        let mut hit_iteration_limit = false;

        // 起点即终点：单节点路径没有可增广的边
        if self.start != self.end {
            loop {
                if let Some(limit) = self.max_iterations {
                    if augmentations.len() >= limit {
                        warn!(limit, "达到迭代上限，提前停止求解");
                        hit_iteration_limit = true;
                        break;
                    }
                }

                let path = match PathFinder::new(&self.residual)
                    .shortest_path(&self.start, &self.end)
                {
                    Some(path) => path,
                    // 不再连通，正常终止
                    None => break,
                };

                let (bottleneck, saturated) = self.augment(&path.nodes)?;
                max_flow += bottleneck;

                debug!(
                    iteration = augmentations.len() + 1,
                    bottleneck,
                    path_len = path.len(),
                    saturated = saturated.len(),
                    "应用增广路径"
                );

                augmentations.push(Augmentation {
                    path: path.nodes,
                    bottleneck,
                    saturated,
                });
            }
        }

        let saturated_total: usize = augmentations.iter().map(|a| a.saturated.len()).sum();
        global_metrics().record_solve_complete(timer, augmentations.len(), saturated_total);

        info!(
            max_flow,
            iterations = augmentations.len(),
            residual_edges = self.residual.edge_count(),
            "最大流求解完成"
        );

        Ok(MaxFlowOutcome {
            flow_graph: self.flow_graph,
            residual: self.residual,
            max_flow,
            augmentations,
            hit_iteration_limit,
            start: self.start,
            end: self.end,
        })
    }

    /// 沿路径增广一轮
    ///
    /// 求瓶颈容量并从路径上每条边扣减；恰好归零的边从残量图删除
    /// （并列最小的边在同一轮全部删除），流量增量记入结果图。
    fn augment(&mut self, path: &[N]) -> Result<(f64, Vec<EdgeKey<N>>)> {
        let mut keys = Vec::with_capacity(path.len().saturating_sub(1));
        let mut bottleneck = f64::INFINITY;

        for pair in path.windows(2) {
            let key = EdgeKey::new(pair[0].clone(), pair[1].clone());
            match self.residual.edge_by_key(&key) {
                Some(data) => bottleneck = bottleneck.min(data.capacity()),
                // 路径选择器只该用残量图里的边，缺边说明二者失步
                None => return Err(Error::MissingResidualEdge(key.to_string())),
            }
            keys.push(key);
        }

        let mut saturated = Vec::new();
        for key in &keys {
            let capacity = self
                .residual
                .edge_by_key(key)
                .map(|data| data.capacity())
                .ok_or_else(|| Error::MissingResidualEdge(key.to_string()))?;

            let remaining = capacity - bottleneck;
            if remaining == 0.0 {
                self.residual.remove_edge(key);
                saturated.push(key.clone());
            } else {
                self.residual.update_capacity(key, remaining)?;
            }
            self.flow_graph.add_flow(key, bottleneck)?;
        }

        Ok((bottleneck, saturated))
    }
}

/// 便捷入口：单组起终点求解
pub fn max_flow<N: NodeKey>(network: &FlowNetwork<N>, start: N, end: N) -> Result<MaxFlowOutcome<N>> {
    MaxFlowSolver::new(network, start, end)?.solve()
}

/// 多组起终点并行求解
///
/// 每组在自己的图拷贝上独立求解，互不共享可变状态；
/// 结果顺序与输入顺序一致。
pub fn solve_many<N>(network: &FlowNetwork<N>, pairs: &[(N, N)]) -> Vec<Result<MaxFlowOutcome<N>>>
where
    N: NodeKey + Send + Sync,
{
    pairs
        .par_iter()
        .map(|(start, end)| {
            MaxFlowSolver::new(network, start.clone(), end.clone())?.solve()
        })
        .collect()
}
