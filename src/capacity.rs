//! 容量分配
//!
//! 上游几何处理只能给出路段长度，通行容量需要另行指定。
//! 这里提供随机分配：每条边取 `[0, upper)` 内的随机整数容量，
//! 配合可设种子的随机源保证实验可复现。

use crate::error::{Error, Result};
use crate::graph::FlowNetwork;
use crate::types::NodeKey;
use rand::Rng;

/// 给路网中每条边分配随机整数容量
///
/// 取值范围为 `[0, upper)`，允许抽到 0（这样的边进入结果图但
/// 不会进入残量图）。
pub fn assign_random_capacities<N, R>(
    network: &mut FlowNetwork<N>,
    upper: u32,
    rng: &mut R,
) -> Result<()>
where
    N: NodeKey,
    R: Rng,
{
    if upper == 0 {
        return Err(Error::InvalidCapacity(
            "随机容量上限必须为正".to_string(),
        ));
    }

    let keys: Vec<_> = network.edges().map(|(key, _)| key.clone()).collect();
    for key in keys {
        let capacity = rng.gen_range(0..upper) as f64;
        network.update_capacity(&key, capacity)?;
    }
    Ok(())
}

/// 随机选取一组不同的起点和终点
///
/// 终点与起点重合时重新抽取，直到二者不同；
/// 节点数不足两个时返回 `None`。
pub fn random_pair<N, R>(network: &FlowNetwork<N>, rng: &mut R) -> Option<(N, N)>
where
    N: NodeKey,
    R: Rng,
{
    let nodes: Vec<&N> = network.nodes().collect();
    if nodes.len() < 2 {
        return None;
    }

    let start = nodes[rng.gen_range(0..nodes.len())].clone();
    let mut end = nodes[rng.gen_range(0..nodes.len())].clone();
    while end == start {
        end = nodes[rng.gen_range(0..nodes.len())].clone();
    }
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn test_network() -> FlowNetwork<u32> {
        FlowNetwork::from_edges(vec![
            ((1, 2), (10.0, 0.0)),
            ((2, 3), (20.0, 0.0)),
            ((3, 4), (30.0, 0.0)),
            ((4, 1), (40.0, 0.0)),
        ])
        .unwrap()
    }

    #[test]
    fn test_capacities_in_range_and_integral() {
        let mut network = test_network();
        let mut rng = StdRng::seed_from_u64(7);
        assign_random_capacities(&mut network, 45, &mut rng).unwrap();

        for (_, data) in network.edges() {
            assert!(data.capacity() >= 0.0);
            assert!(data.capacity() < 45.0);
            assert_eq!(data.capacity(), data.capacity().trunc());
            // 长度不受容量分配影响
            assert!(data.weight() >= 10.0);
        }
    }

    #[test]
    fn test_same_seed_same_capacities() {
        let mut a = test_network();
        let mut b = test_network();
        assign_random_capacities(&mut a, 45, &mut StdRng::seed_from_u64(3)).unwrap();
        assign_random_capacities(&mut b, 45, &mut StdRng::seed_from_u64(3)).unwrap();

        for ((ka, da), (kb, db)) in a.edges().zip(b.edges()) {
            assert_eq!(ka, kb);
            assert_eq!(da.capacity(), db.capacity());
        }
    }

    #[test]
    fn test_zero_upper_rejected() {
        let mut network = test_network();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            assign_random_capacities(&mut network, 0, &mut rng),
            Err(Error::InvalidCapacity(_))
        ));
    }

    #[test]
    fn test_random_pair_distinct() {
        let network = test_network();
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..50 {
            let (start, end) = random_pair(&network, &mut rng).unwrap();
            assert_ne!(start, end);
            assert!(network.contains_node(&start));
            assert!(network.contains_node(&end));
        }
    }

    #[test]
    fn test_random_pair_needs_two_nodes() {
        let network: FlowNetwork<u32> = FlowNetwork::new();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(random_pair(&network, &mut rng).is_none());
    }
}
