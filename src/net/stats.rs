//! 统计信息
//!
//! 定义拥塞模型的运行统计。

use serde::Serialize;

use crate::sim::SimTime;

/// chunk 级统计信息
#[derive(Debug, Default, Clone, Serialize)]
pub struct Stats {
    pub sent_chunks: u64,
    pub delivered_chunks: u64,
    pub delivered_bytes: u64,
    /// 进入第二跳及之后链路的次数
    pub hop_transitions: u64,
    /// 被重新分配作废、到点后忽略的完成事件数
    pub stale_events: u64,
    pub last_delivery: SimTime,
    /// 每个已送达 chunk 的完成时间（纳秒，发送到送达）
    #[serde(skip)]
    pub fct_ns: Vec<u64>,
}

impl Stats {
    pub fn mean_fct_ns(&self) -> Option<f64> {
        if self.fct_ns.is_empty() {
            return None;
        }
        let total: u128 = self.fct_ns.iter().map(|&v| v as u128).sum();
        Some(total as f64 / self.fct_ns.len() as f64)
    }

    pub fn max_fct_ns(&self) -> Option<u64> {
        self.fct_ns.iter().copied().max()
    }
}
