//! 性能指标收集模块
//!
//! 提供求解过程运行时指标的收集和导出功能

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 系统全局指标
#[derive(Debug)]
pub struct Metrics {
    /// 求解统计
    solve_stats: SolveStats,
    /// 启动时间
    start_time: Instant,
}

/// 求解统计
#[derive(Debug)]
struct SolveStats {
    /// 总求解数
    solves_total: AtomicU64,
    /// 增广迭代总数
    iterations_total: AtomicU64,
    /// 饱和删除的边总数
    saturated_edges_total: AtomicU64,
    /// 一轮增广都没有发生的求解数（起止点不连通或重合）
    no_path_solves: AtomicU64,
    /// 求解总耗时（微秒）
    total_duration_us: AtomicU64,
}

/// 可导出的指标快照
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub solves_total: u64,
    pub iterations_total: u64,
    pub saturated_edges_total: u64,
    pub no_path_solves: u64,
    pub avg_solve_duration_ms: f64,
    pub avg_iterations_per_solve: f64,
    pub uptime_seconds: u64,
}

/// Prometheus 格式指标
#[derive(Debug, Clone)]
pub struct PrometheusMetrics {
    pub content: String,
}

impl Metrics {
    /// 创建新的指标收集器
    pub fn new() -> Self {
        Self {
            solve_stats: SolveStats {
                solves_total: AtomicU64::new(0),
                iterations_total: AtomicU64::new(0),
                saturated_edges_total: AtomicU64::new(0),
                no_path_solves: AtomicU64::new(0),
                total_duration_us: AtomicU64::new(0),
            },
            start_time: Instant::now(),
        }
    }

    /// 记录求解开始
    pub fn record_solve_start(&self) -> SolveTimer {
        self.solve_stats.solves_total.fetch_add(1, Ordering::Relaxed);
        SolveTimer::new()
    }

    /// 记录求解完成
    pub fn record_solve_complete(&self, timer: SolveTimer, iterations: usize, saturated: usize) {
        let duration = timer.elapsed();

        self.solve_stats
            .iterations_total
            .fetch_add(iterations as u64, Ordering::Relaxed);
        self.solve_stats
            .saturated_edges_total
            .fetch_add(saturated as u64, Ordering::Relaxed);
        if iterations == 0 {
            self.solve_stats.no_path_solves.fetch_add(1, Ordering::Relaxed);
        }
        self.solve_stats
            .total_duration_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
    }

    /// 获取指标快照
    pub fn snapshot(&self) -> MetricsSnapshot {
        let solves_total = self.solve_stats.solves_total.load(Ordering::Relaxed);
        let iterations_total = self.solve_stats.iterations_total.load(Ordering::Relaxed);
        let saturated_edges_total = self.solve_stats.saturated_edges_total.load(Ordering::Relaxed);
        let no_path_solves = self.solve_stats.no_path_solves.load(Ordering::Relaxed);
        let total_duration_us = self.solve_stats.total_duration_us.load(Ordering::Relaxed);

        let uptime = self.start_time.elapsed().as_secs();

        let avg_solve_duration_ms = if solves_total > 0 {
            (total_duration_us as f64) / (solves_total as f64) / 1000.0
        } else {
            0.0
        };

        let avg_iterations_per_solve = if solves_total > 0 {
            (iterations_total as f64) / (solves_total as f64)
        } else {
            0.0
        };

        MetricsSnapshot {
            solves_total,
            iterations_total,
            saturated_edges_total,
            no_path_solves,
            avg_solve_duration_ms,
            avg_iterations_per_solve,
            uptime_seconds: uptime,
        }
    }

    /// 导出为 Prometheus 格式
    pub fn to_prometheus(&self) -> PrometheusMetrics {
        let snapshot = self.snapshot();

        let mut content = String::new();

        content.push_str("# HELP streetflow_solves_total Total number of max-flow solves\n");
        content.push_str("# TYPE streetflow_solves_total counter\n");
        content.push_str(&format!("streetflow_solves_total {}\n", snapshot.solves_total));

        content.push_str("# HELP streetflow_iterations_total Total augmenting iterations\n");
        content.push_str("# TYPE streetflow_iterations_total counter\n");
        content.push_str(&format!(
            "streetflow_iterations_total {}\n",
            snapshot.iterations_total
        ));

        content.push_str("# HELP streetflow_saturated_edges_total Edges removed at saturation\n");
        content.push_str("# TYPE streetflow_saturated_edges_total counter\n");
        content.push_str(&format!(
            "streetflow_saturated_edges_total {}\n",
            snapshot.saturated_edges_total
        ));

        content.push_str("# HELP streetflow_no_path_solves_total Solves that found no augmenting path\n");
        content.push_str("# TYPE streetflow_no_path_solves_total counter\n");
        content.push_str(&format!(
            "streetflow_no_path_solves_total {}\n",
            snapshot.no_path_solves
        ));

        content.push_str("# HELP streetflow_solve_duration_avg_ms Average solve duration in milliseconds\n");
        content.push_str("# TYPE streetflow_solve_duration_avg_ms gauge\n");
        content.push_str(&format!(
            "streetflow_solve_duration_avg_ms {:.2}\n",
            snapshot.avg_solve_duration_ms
        ));

        content.push_str("# HELP streetflow_uptime_seconds System uptime in seconds\n");
        content.push_str("# TYPE streetflow_uptime_seconds counter\n");
        content.push_str(&format!(
            "streetflow_uptime_seconds {}\n",
            snapshot.uptime_seconds
        ));

        PrometheusMetrics { content }
    }

    /// 重置所有指标
    pub fn reset(&self) {
        self.solve_stats.solves_total.store(0, Ordering::Relaxed);
        self.solve_stats.iterations_total.store(0, Ordering::Relaxed);
        self.solve_stats
            .saturated_edges_total
            .store(0, Ordering::Relaxed);
        self.solve_stats.no_path_solves.store(0, Ordering::Relaxed);
        self.solve_stats.total_duration_us.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// 求解计时器
pub struct SolveTimer {
    start: Instant,
}

impl SolveTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

/// 全局指标实例
static METRICS: once_cell::sync::Lazy<Arc<Metrics>> =
    once_cell::sync::Lazy::new(|| Arc::new(Metrics::new()));

/// 获取全局指标实例
pub fn global_metrics() -> Arc<Metrics> {
    METRICS.clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_snapshot() {
        let metrics = Metrics::new();

        let timer = metrics.record_solve_start();
        std::thread::sleep(Duration::from_millis(10));
        metrics.record_solve_complete(timer, 3, 4);

        let timer = metrics.record_solve_start();
        metrics.record_solve_complete(timer, 0, 0);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.solves_total, 2);
        assert_eq!(snapshot.iterations_total, 3);
        assert_eq!(snapshot.saturated_edges_total, 4);
        assert_eq!(snapshot.no_path_solves, 1);
        assert!(snapshot.avg_solve_duration_ms >= 5.0);
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = Metrics::new();
        let timer = metrics.record_solve_start();
        metrics.record_solve_complete(timer, 2, 1);

        let prom = metrics.to_prometheus();
        assert!(prom.content.contains("streetflow_solves_total 1"));
        assert!(prom.content.contains("streetflow_iterations_total 2"));
        assert!(prom.content.contains("streetflow_saturated_edges_total 1"));
    }

    #[test]
    fn test_reset() {
        let metrics = Metrics::new();
        let timer = metrics.record_solve_start();
        metrics.record_solve_complete(timer, 2, 1);

        metrics.reset();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.solves_total, 0);
        assert_eq!(snapshot.iterations_total, 0);
    }
}
