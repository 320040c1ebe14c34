//! Chunk 类型
//!
//! 一次逻辑传输：沿 route 逐跳前进，到达终点时触发完成回调（恰好一次）。

use super::id::{ChunkId, DeviceId, LinkId};
use crate::sim::{SimTime, Simulator};
use std::fmt;

/// 从源到目的（含两端）的设备序列
pub type Route = Vec<DeviceId>;

/// 完成回调：chunk 到达目的设备时以当前仿真时间调用。
pub type ChunkDoneCallback = Box<dyn FnOnce(ChunkId, SimTime, &mut Simulator) + Send>;

/// chunk 生命周期。`Transmitting` 与 `Propagating` 合起来即“在第 `hop` 跳上”。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkState {
    /// 已创建，尚未发送
    Pending,
    /// 占用 `route[hop] -> route[hop + 1]` 链路的带宽
    Transmitting { hop: usize },
    /// 已发完，正在经历该跳的传播时延
    Propagating { hop: usize },
    /// 已送达，回调已触发
    Delivered,
}

/// 一个待传输的数据块
pub struct Chunk {
    size: u64,
    route: Route,
    rate_cap: Option<f64>,
    pub(crate) state: ChunkState,
    pub(crate) links: Vec<LinkId>,
    pub(crate) sent_at: SimTime,
    pub(crate) on_arrival: Option<ChunkDoneCallback>,
}

impl Chunk {
    pub fn new<F>(size: u64, route: Route, on_arrival: F) -> Self
    where
        F: FnOnce(ChunkId, SimTime, &mut Simulator) + Send + 'static,
    {
        Self {
            on_arrival: Some(Box::new(on_arrival)),
            ..Self::without_callback(size, route)
        }
    }

    /// 不关心完成时间的 chunk（只看统计信息时使用）
    pub fn without_callback(size: u64, route: Route) -> Self {
        Self {
            size,
            route,
            rate_cap: None,
            state: ChunkState::Pending,
            links: Vec::new(),
            sent_at: SimTime::ZERO,
            on_arrival: None,
        }
    }

    /// 设置速率上限（bytes/ns），仅在 `SharingPolicy::MaxMin` 下生效。
    pub fn with_rate_cap(mut self, cap: f64) -> Self {
        assert!(cap.is_finite() && cap > 0.0, "rate cap must be positive, got {cap}");
        self.rate_cap = Some(cap);
        self
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn route(&self) -> &Route {
        &self.route
    }

    pub fn rate_cap(&self) -> Option<f64> {
        self.rate_cap
    }

    pub fn state(&self) -> ChunkState {
        self.state
    }

    /// 获取源设备
    pub fn src(&self) -> Option<DeviceId> {
        self.route.first().copied()
    }

    /// 获取目的设备
    pub fn dst(&self) -> Option<DeviceId> {
        self.route.last().copied()
    }

    /// 需要经过的链路数
    pub fn hops(&self) -> usize {
        self.route.len().saturating_sub(1)
    }

    pub fn sent_at(&self) -> SimTime {
        self.sent_at
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("size", &self.size)
            .field("route", &self.route)
            .field("rate_cap", &self.rate_cap)
            .field("state", &self.state)
            .field("has_callback", &self.on_arrival.is_some())
            .finish()
    }
}
