//! StreetFlow CLI 工具
//!
//! 读入路段数据，按需分配随机容量，
//! 在给定或随机选取的起终点之间求解最大流并输出结果

use anyhow::{bail, Context};
use clap::Parser;
use prettytable::{row, Table};
use rand::rngs::StdRng;
use rand::SeedableRng;
use streetflow::algorithm::MaxFlowSolver;
use streetflow::capacity::{assign_random_capacities, random_pair};
use streetflow::import::{import_segments_csv, import_segments_jsonl};
use streetflow::metrics::global_metrics;
use streetflow::types::GeoNode;
use streetflow::FlowNetwork;

#[derive(Parser, Debug)]
#[command(name = "streetflow-cli")]
#[command(about = "路网最大流 / 最小割分析工具")]
struct Args {
    /// 路段数据文件（CSV: x1,y1,x2,y2,length[,capacity]）
    segments: String,

    /// 输入为 JSON Lines 格式
    #[arg(long)]
    jsonl: bool,

    /// 给每条路段分配 [0, N) 内的随机容量（不设置则沿用文件中的容量）
    #[arg(short = 'c', long, value_name = "N")]
    random_cap: Option<u32>,

    /// 随机数种子
    #[arg(short, long)]
    seed: Option<u64>,

    /// 起点坐标 "x,y"（缺省随机选取）
    #[arg(long)]
    start: Option<String>,

    /// 终点坐标 "x,y"（缺省随机选取）
    #[arg(long)]
    end: Option<String>,

    /// 增广迭代上限
    #[arg(long)]
    max_iterations: Option<usize>,

    /// 以 JSON 输出求解摘要
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if !args.json {
        println!("StreetFlow - 路网最大流 / 最小割分析");
        println!("====================================");
    }

    // 导入路段
    let (mut network, stats) = if args.jsonl {
        import_segments_jsonl(&args.segments)
            .with_context(|| format!("导入 JSONL 路段失败: {}", args.segments))?
    } else {
        import_segments_csv(&args.segments)
            .with_context(|| format!("导入 CSV 路段失败: {}", args.segments))?
    };

    if !args.json {
        println!("路段数据已加载: {}", args.segments);
        println!("  节点数: {}", network.node_count());
        println!("  边数: {}", network.edge_count());
        println!("  解析错误: {}", stats.errors);
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // 随机容量分配
    if let Some(upper) = args.random_cap {
        assign_random_capacities(&mut network, upper, &mut rng)?;
        if !args.json {
            println!("已分配随机容量: [0, {})", upper);
        }
    }

    // 起终点选取
    let (start, end) = resolve_pair(&args, &network, &mut rng)?;
    if !args.json {
        println!("起点: {}", start);
        println!("终点: {}", end);
    }

    // 求解
    let mut solver = MaxFlowSolver::new(&network, start, end)?;
    if let Some(limit) = args.max_iterations {
        solver = solver.with_max_iterations(limit);
    }
    let outcome = solver.solve()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.summary())?);
        return Ok(());
    }

    println!("\n求解完成!");
    println!("  最大流量: {}", outcome.max_flow);
    println!("  增广轮数: {}", outcome.augmentations.len());
    println!("  残量图剩余边数: {}", outcome.residual.edge_count());
    if outcome.hit_iteration_limit {
        println!("  注意: 达到迭代上限，结果为部分解");
    }

    let cut_edges = outcome.cut_edges();
    if !cut_edges.is_empty() {
        println!("\n割边集:");
        let mut table = Table::new();
        table.add_row(row!["边", "长度", "承载流量"]);
        for key in cut_edges {
            if let Some(data) = outcome.flow_graph.edge_by_key(key) {
                table.add_row(row![
                    key.to_string(),
                    format!("{:.2}", data.weight()),
                    format!("{:.2}", data.flow())
                ]);
            }
        }
        table.printstd();
    }

    let snapshot = global_metrics().snapshot();
    tracing::debug!(
        solves = snapshot.solves_total,
        iterations = snapshot.iterations_total,
        "本次运行指标"
    );

    Ok(())
}

/// 解析或随机选取起终点
fn resolve_pair(
    args: &Args,
    network: &FlowNetwork<GeoNode>,
    rng: &mut StdRng,
) -> anyhow::Result<(GeoNode, GeoNode)> {
    match (&args.start, &args.end) {
        (Some(raw_start), Some(raw_end)) => {
            let start = GeoNode::from_pair_str(raw_start)?;
            let end = GeoNode::from_pair_str(raw_end)?;
            if !network.contains_node(&start) {
                bail!("起点 {} 不在路网中", start);
            }
            if !network.contains_node(&end) {
                bail!("终点 {} 不在路网中", end);
            }
            if start == end {
                bail!("起点和终点不能相同");
            }
            Ok((start, end))
        }
        (None, None) => random_pair(network, rng).context("路网节点不足，无法随机选取起终点"),
        _ => bail!("起点和终点必须同时给出，或都交给随机选取"),
    }
}
