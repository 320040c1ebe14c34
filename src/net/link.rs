//! 链路类型
//!
//! 定义单向链路及其上的带宽竞争状态。链路本身不调度事件：成员变化后
//! 返回需要重新调度的 [`Reschedule`] 列表，由拥塞模型交给仿真器。

use super::id::{ChunkId, DeviceId};
use super::sharing::SharingPolicy;
use crate::sim::SimTime;
use tracing::trace;

/// 剩余字节低于该值即视为已发送完毕
pub(crate) const DRAINED_BYTES_EPSILON: f64 = 1e-6;

/// 正在占用链路带宽的一个 chunk
#[derive(Debug, Clone)]
pub struct Flow {
    pub chunk: ChunkId,
    /// chunk 总大小（字节）
    pub size: u64,
    /// 本跳剩余字节，只在 `catch_up` 时更新
    pub remaining: f64,
    /// 当前分到的带宽（bytes/ns）
    pub share: f64,
    pub rate_cap: Option<f64>,
    /// 最近一次调度的完成事件所属代数
    pub generation: u64,
}

impl Flow {
    fn drain_delay(&self) -> SimTime {
        if self.remaining < DRAINED_BYTES_EPSILON {
            return SimTime::ZERO;
        }
        SimTime::from_nanos_f64(self.remaining / self.share)
    }
}

/// 成员变化后需要重新调度完成事件的 flow
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reschedule {
    pub chunk: ChunkId,
    pub generation: u64,
    pub delay: SimTime,
}

/// 单向网络链路
#[derive(Debug)]
pub struct Link {
    pub from: DeviceId,
    pub to: DeviceId,
    /// 容量（bytes/ns，数值上等于 GB/s）
    pub bandwidth: f64,
    pub latency: SimTime,
    flows: Vec<Flow>,
    last_update: SimTime,
    next_generation: u64,
    pub bytes_carried: u64,
    pub chunks_carried: u64,
    pub peak_flows: usize,
    /// 至少有一个 flow 占用链路的累计时长
    pub busy: SimTime,
}

impl Link {
    /// 创建新链路
    pub fn new(from: DeviceId, to: DeviceId, bandwidth: f64, latency: SimTime) -> Self {
        Self {
            from,
            to,
            bandwidth,
            latency,
            flows: Vec::new(),
            last_update: SimTime::ZERO,
            next_generation: 0,
            bytes_carried: 0,
            chunks_carried: 0,
            peak_flows: 0,
            busy: SimTime::ZERO,
        }
    }

    /// 按加入顺序排列的活跃 flow
    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn flow(&self, chunk: ChunkId) -> Option<&Flow> {
        self.flows.iter().find(|f| f.chunk == chunk)
    }

    pub fn is_idle(&self) -> bool {
        self.flows.is_empty()
    }

    /// 当前分配出去的带宽总和，恒不超过 `bandwidth`
    pub fn allocated_bandwidth(&self) -> f64 {
        self.flows.iter().map(|f| f.share).sum()
    }

    /// 链路忙碌时间占 `now` 的比例
    pub fn utilization(&self, now: SimTime) -> f64 {
        if now == SimTime::ZERO {
            return 0.0;
        }
        self.busy.0 as f64 / now.0 as f64
    }

    /// 用旧速率结算 `last_update` 到 `now` 之间各 flow 发送的字节。
    fn catch_up(&mut self, now: SimTime) {
        let elapsed = now.saturating_sub(self.last_update);
        if elapsed > SimTime::ZERO && !self.flows.is_empty() {
            let dt = elapsed.0 as f64;
            for flow in &mut self.flows {
                flow.remaining = (flow.remaining - flow.share * dt).max(0.0);
            }
            self.busy = self.busy.saturating_add(elapsed);
        }
        self.last_update = self.last_update.max(now);
    }

    /// 重新分配带宽，并为每个 flow 换发新的代数与完成时延。
    fn redistribute(&mut self, policy: SharingPolicy) -> Vec<Reschedule> {
        let caps: Vec<Option<f64>> = self.flows.iter().map(|f| f.rate_cap).collect();
        let shares = policy.allocate(self.bandwidth, &caps);

        let mut out = Vec::with_capacity(self.flows.len());
        for (flow, share) in self.flows.iter_mut().zip(shares) {
            flow.share = share;
            flow.generation = self.next_generation;
            self.next_generation += 1;
            out.push(Reschedule {
                chunk: flow.chunk,
                generation: flow.generation,
                delay: flow.drain_delay(),
            });
        }
        trace!(
            from = ?self.from,
            to = ?self.to,
            flows = self.flows.len(),
            "链路带宽重新分配"
        );
        out
    }

    /// chunk 进入链路，剩余字节重置为整个 chunk 大小。
    pub(crate) fn join(
        &mut self,
        now: SimTime,
        chunk: ChunkId,
        size: u64,
        rate_cap: Option<f64>,
        policy: SharingPolicy,
    ) -> Vec<Reschedule> {
        debug_assert!(self.flow(chunk).is_none(), "chunk already on link");
        self.catch_up(now);
        self.flows.push(Flow {
            chunk,
            size,
            remaining: size as f64,
            share: 0.0,
            rate_cap,
            generation: 0,
        });
        self.peak_flows = self.peak_flows.max(self.flows.len());
        self.redistribute(policy)
    }

    /// 完成事件触发：若 `generation` 仍是该 flow 的当前代数，则将其移出链路，
    /// 返回移出的 flow 以及其余 flow 的重新调度；过期事件返回 `None`。
    pub(crate) fn drain(
        &mut self,
        now: SimTime,
        chunk: ChunkId,
        generation: u64,
        policy: SharingPolicy,
    ) -> Option<(Flow, Vec<Reschedule>)> {
        let idx = self
            .flows
            .iter()
            .position(|f| f.chunk == chunk && f.generation == generation)?;
        self.catch_up(now);
        let mut flow = self.flows.remove(idx);
        flow.remaining = 0.0;
        self.bytes_carried = self.bytes_carried.saturating_add(flow.size);
        self.chunks_carried += 1;
        let rest = self.redistribute(policy);
        Some((flow, rest))
    }
}
