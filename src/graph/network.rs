//! 路网数据结构
//!
//! 边表加邻接表的内存结构，变更只通过窄接口进行，
//! 避免算法代码直接改动内部状态破坏不变量。

use super::edge::{EdgeData, EdgeKey};
use crate::error::{Error, Result};
use crate::types::NodeKey;
use indexmap::IndexMap;

/// 带容量的无向路网
///
/// 迭代顺序是插入顺序（`IndexMap`），同样的输入必然得到同样的遍历，
/// 求解过程因此可复现。
#[derive(Debug, Clone, Default)]
pub struct FlowNetwork<N: NodeKey> {
    /// 边表（规范化边键 -> 边属性）
    edges: IndexMap<EdgeKey<N>, EdgeData>,
    /// 邻接表
    adjacency: IndexMap<N, Vec<N>>,
}

impl<N: NodeKey> FlowNetwork<N> {
    /// 创建空路网
    pub fn new() -> Self {
        Self {
            edges: IndexMap::new(),
            adjacency: IndexMap::new(),
        }
    }

    /// 从 (端点对 -> (长度, 容量)) 映射构建路网
    pub fn from_edges<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = ((N, N), (f64, f64))>,
    {
        let mut network = Self::new();
        for ((a, b), (weight, capacity)) in entries {
            network.add_edge(a, b, weight, capacity)?;
        }
        Ok(network)
    }

    // ==================== 边操作 ====================

    /// 添加边
    ///
    /// 长度和容量必须是非负有限值。重复添加同一端点对会覆盖旧属性。
    pub fn add_edge(&mut self, a: N, b: N, weight: f64, capacity: f64) -> Result<EdgeKey<N>> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(Error::InvalidWeight(format!(
                "{:?} -- {:?} 长度为 {}",
                a, b, weight
            )));
        }
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(Error::InvalidCapacity(format!(
                "{:?} -- {:?} 容量为 {}",
                a, b, capacity
            )));
        }

        let key = EdgeKey::new(a, b);
        if !self.edges.contains_key(&key) {
            let (u, v) = key.endpoints();
            self.adjacency
                .entry(u.clone())
                .or_default()
                .push(v.clone());
            if !key.is_loop() {
                self.adjacency
                    .entry(v.clone())
                    .or_default()
                    .push(u.clone());
            }
        }
        self.edges.insert(key.clone(), EdgeData::new(weight, capacity));

        Ok(key)
    }

    /// 查询边属性（任意方向）
    pub fn edge(&self, a: &N, b: &N) -> Option<&EdgeData> {
        self.edges.get(&EdgeKey::new(a.clone(), b.clone()))
    }

    /// 按规范化边键查询
    pub fn edge_by_key(&self, key: &EdgeKey<N>) -> Option<&EdgeData> {
        self.edges.get(key)
    }

    /// 是否存在边（任意方向）
    pub fn contains_edge(&self, a: &N, b: &N) -> bool {
        self.edges.contains_key(&EdgeKey::new(a.clone(), b.clone()))
    }

    /// 更新剩余容量
    pub fn update_capacity(&mut self, key: &EdgeKey<N>, capacity: f64) -> Result<()> {
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(Error::InvalidCapacity(format!(
                "{} 容量为 {}",
                key, capacity
            )));
        }
        match self.edges.get_mut(key) {
            Some(data) => {
                data.set_capacity(capacity);
                Ok(())
            }
            None => Err(Error::EdgeNotFound(key.to_string())),
        }
    }

    /// 累加流量
    pub fn add_flow(&mut self, key: &EdgeKey<N>, amount: f64) -> Result<()> {
        match self.edges.get_mut(key) {
            Some(data) => {
                data.add_flow(amount);
                Ok(())
            }
            None => Err(Error::EdgeNotFound(key.to_string())),
        }
    }

    /// 删除边
    ///
    /// 端点保留在节点集中（与 NetworkX 删边语义一致）。
    pub fn remove_edge(&mut self, key: &EdgeKey<N>) -> Option<EdgeData> {
        let data = self.edges.shift_remove(key)?;
        let (u, v) = key.endpoints();
        if let Some(neighbors) = self.adjacency.get_mut(u) {
            neighbors.retain(|n| n != v);
        }
        if !key.is_loop() {
            if let Some(neighbors) = self.adjacency.get_mut(v) {
                neighbors.retain(|n| n != u);
            }
        }
        Some(data)
    }

    /// 清零所有边的累计流量
    pub fn reset_flows(&mut self) {
        for data in self.edges.values_mut() {
            data.reset_flow();
        }
    }

    // ==================== 节点与邻居查询 ====================

    /// 节点是否在路网中
    pub fn contains_node(&self, node: &N) -> bool {
        self.adjacency.contains_key(node)
    }

    /// 节点的邻居
    pub fn neighbors(&self, node: &N) -> &[N] {
        self.adjacency
            .get(node)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// 所有节点
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.adjacency.keys()
    }

    /// 所有边
    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey<N>, &EdgeData)> {
        self.edges.iter()
    }

    /// 节点数量
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// 边数量
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// 节点上所有关联边的累计流量之和
    ///
    /// 对起点/终点来说就是进出网络的总流量。
    pub fn total_flow_at(&self, node: &N) -> f64 {
        self.neighbors(node)
            .iter()
            .filter_map(|other| self.edge(node, other))
            .map(|data| data.flow())
            .sum()
    }
}
