//! 路径选择
//!
//! 在残量图上按路段长度找最短路径（Dijkstra），
//! 不是按跳数的 BFS：增广顺序由实际距离决定。

use crate::graph::FlowNetwork;
use crate::types::NodeKey;
use priority_queue::PriorityQueue;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{HashMap, HashSet};

/// 路径结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult<N: NodeKey> {
    /// 路径上的节点序列（含起点和终点）
    pub nodes: Vec<N>,
    /// 路径总长度
    pub total_weight: f64,
}

impl<N: NodeKey> PathResult<N> {
    fn trivial(start: N) -> Self {
        Self {
            nodes: vec![start],
            total_weight: 0.0,
        }
    }

    /// 路径边数
    pub fn len(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 路径距离，按 `total_cmp` 做全序比较
///
/// 路网构建时已拒绝 NaN 长度，这里的全序和数值序一致。
#[derive(Debug, Clone, Copy, PartialEq)]
struct Dist(f64);

impl Eq for Dist {}

impl PartialOrd for Dist {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Dist {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// 路径查找器
pub struct PathFinder<'a, N: NodeKey> {
    network: &'a FlowNetwork<N>,
}

impl<'a, N: NodeKey> PathFinder<'a, N> {
    /// 创建路径查找器
    pub fn new(network: &'a FlowNetwork<N>) -> Self {
        Self { network }
    }

    /// 按长度查找最短路径
    ///
    /// 起点终点不连通时返回 `None`。等长路径之间的决胜规则：
    /// 每次松弛时保留节点序较小的前驱，结果完全确定。
    /// `start == end` 返回只含起点的平凡路径。
    pub fn shortest_path(&self, start: &N, end: &N) -> Option<PathResult<N>> {
        if start == end {
            return Some(PathResult::trivial(start.clone()));
        }
        if !self.network.contains_node(start) || !self.network.contains_node(end) {
            return None;
        }

        let mut dist: HashMap<N, f64> = HashMap::new();
        let mut parent: HashMap<N, N> = HashMap::new();
        let mut settled: HashSet<N> = HashSet::new();
        let mut queue: PriorityQueue<N, Reverse<Dist>> = PriorityQueue::new();

        dist.insert(start.clone(), 0.0);
        queue.push(start.clone(), Reverse(Dist(0.0)));

        while let Some((current, Reverse(Dist(current_dist)))) = queue.pop() {
            if !settled.insert(current.clone()) {
                continue;
            }
            if current == *end {
                break;
            }

            for neighbor in self.network.neighbors(&current) {
                if settled.contains(neighbor) {
                    continue;
                }
                let weight = match self.network.edge(&current, neighbor) {
                    Some(data) => data.weight(),
                    None => continue,
                };
                let candidate = current_dist + weight;

                match dist.get(neighbor) {
                    None => {
                        dist.insert(neighbor.clone(), candidate);
                        parent.insert(neighbor.clone(), current.clone());
                        queue.push_increase(neighbor.clone(), Reverse(Dist(candidate)));
                    }
                    Some(&best) if candidate < best => {
                        dist.insert(neighbor.clone(), candidate);
                        parent.insert(neighbor.clone(), current.clone());
                        queue.push_increase(neighbor.clone(), Reverse(Dist(candidate)));
                    }
                    Some(&best) => {
                        // 等长路径决胜：保留较小的前驱
                        if candidate == best {
                            if let Some(prev) = parent.get_mut(neighbor) {
                                if current < *prev {
                                    *prev = current.clone();
                                }
                            }
                        }
                    }
                }
            }
        }

        if !settled.contains(end) {
            return None;
        }
        let total_weight = *dist.get(end)?;

        Some(self.reconstruct_path(start, end, &parent, total_weight))
    }

    /// 重构路径
    fn reconstruct_path(
        &self,
        start: &N,
        end: &N,
        parent: &HashMap<N, N>,
        total_weight: f64,
    ) -> PathResult<N> {
        let mut nodes = vec![end.clone()];
        let mut current = end;
        while current != start {
            match parent.get(current) {
                Some(prev) => {
                    nodes.push(prev.clone());
                    current = prev;
                }
                None => break,
            }
        }
        nodes.reverse();

        PathResult {
            nodes,
            total_weight,
        }
    }

    /// 判断两点是否连通
    pub fn is_reachable(&self, start: &N, end: &N) -> bool {
        self.shortest_path(start, end).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_with_shortcut() -> FlowNetwork<u32> {
        // 1 -- 2 -- 3 总长 2，直连 1 -- 3 长 5
        FlowNetwork::from_edges(vec![
            ((1, 2), (1.0, 10.0)),
            ((2, 3), (1.0, 10.0)),
            ((1, 3), (5.0, 10.0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_weighted_path_beats_hop_count() {
        let network = line_with_shortcut();
        let finder = PathFinder::new(&network);

        // 按跳数直连更短，但按长度绕行更短
        let path = finder.shortest_path(&1, &3).unwrap();
        assert_eq!(path.nodes, vec![1, 2, 3]);
        assert_eq!(path.total_weight, 2.0);
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_direct_edge_wins_on_weight() {
        // 全部长度为 1 时直连（总长 1）优于绕行（总长 2）
        let network = FlowNetwork::from_edges(vec![
            (('a', 'b'), (1.0, 3.0)),
            (('b', 'c'), (1.0, 2.0)),
            (('a', 'c'), (1.0, 4.0)),
        ])
        .unwrap();
        let finder = PathFinder::new(&network);

        let path = finder.shortest_path(&'a', &'c').unwrap();
        assert_eq!(path.nodes, vec!['a', 'c']);
        assert_eq!(path.total_weight, 1.0);
    }

    #[test]
    fn test_equal_cost_tie_break_is_deterministic() {
        // 菱形：0-1-3 与 0-2-3 等长，决胜规则选较小前驱 1
        let network = FlowNetwork::from_edges(vec![
            ((0, 1), (1.0, 1.0)),
            ((1, 3), (1.0, 1.0)),
            ((0, 2), (1.0, 1.0)),
            ((2, 3), (1.0, 1.0)),
        ])
        .unwrap();
        let finder = PathFinder::new(&network);

        let path = finder.shortest_path(&0, &3).unwrap();
        assert_eq!(path.nodes, vec![0, 1, 3]);
    }

    #[test]
    fn test_no_path() {
        let network =
            FlowNetwork::from_edges(vec![((1, 2), (1.0, 1.0)), ((3, 4), (1.0, 1.0))]).unwrap();
        let finder = PathFinder::new(&network);

        assert!(finder.shortest_path(&1, &4).is_none());
        assert!(!finder.is_reachable(&1, &4));
        assert!(finder.is_reachable(&1, &2));
    }

    #[test]
    fn test_unknown_node() {
        let network = FlowNetwork::from_edges(vec![((1, 2), (1.0, 1.0))]).unwrap();
        let finder = PathFinder::new(&network);
        assert!(finder.shortest_path(&1, &9).is_none());
    }

    #[test]
    fn test_start_equals_end() {
        let network = FlowNetwork::from_edges(vec![((1, 2), (1.0, 1.0))]).unwrap();
        let finder = PathFinder::new(&network);

        let path = finder.shortest_path(&1, &1).unwrap();
        assert_eq!(path.nodes, vec![1]);
        assert_eq!(path.total_weight, 0.0);
        assert!(path.is_empty());
    }
}
