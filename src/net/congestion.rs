//! 拥塞模型
//!
//! 持有链路 arena、有向边表和所有在途 chunk，是链路状态唯一的修改者。
//! chunk 在一条链路上按公平份额发送，发完后离开链路（触发其余 flow 的
//! 重新分配），经过该跳传播时延后进入下一条链路或送达。

use std::collections::HashMap;

use super::chunk::{Chunk, ChunkState, Route};
use super::chunk_arrived::ChunkArrived;
use super::id::{ChunkId, DeviceId, LinkId};
use super::link::{Link, Reschedule};
use super::link_drained::LinkDrained;
use super::sharing::SharingPolicy;
use super::stats::Stats;
use crate::error::RouteError;
use crate::sim::{SimTime, Simulator};
use tracing::{debug, trace};

/// 链路竞争引擎 + 拓扑图
#[derive(Debug)]
pub struct CongestionModel {
    device_count: usize,
    links: Vec<Link>,
    edges: HashMap<(DeviceId, DeviceId), LinkId>,
    chunks: HashMap<ChunkId, Chunk>,
    next_chunk_id: u64,
    policy: SharingPolicy,
    pub stats: Stats,
}

impl CongestionModel {
    pub fn new(device_count: usize, policy: SharingPolicy) -> Self {
        Self {
            device_count,
            links: Vec::new(),
            edges: HashMap::new(),
            chunks: HashMap::new(),
            next_chunk_id: 0,
            policy,
            stats: Stats::default(),
        }
    }

    pub fn device_count(&self) -> usize {
        self.device_count
    }

    pub fn policy(&self) -> SharingPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: SharingPolicy) {
        assert!(self.chunks.is_empty(), "sharing policy must be set before sending chunks");
        self.policy = policy;
    }

    /// 连接两个设备；`bidirectional` 时再建一条独立竞争的反向链路。
    ///
    /// 前置条件（违反即拓扑描述错误，直接 panic）：`a != b`，两端在范围内，
    /// `bandwidth > 0`，且该方向尚无链路。
    pub fn connect(
        &mut self,
        a: DeviceId,
        b: DeviceId,
        bandwidth: f64,
        latency: SimTime,
        bidirectional: bool,
    ) -> LinkId {
        assert!(a != b, "cannot connect device {a} to itself");
        assert!(
            a.0 < self.device_count && b.0 < self.device_count,
            "link {a}->{b} out of range (device count {})",
            self.device_count
        );
        assert!(
            bandwidth.is_finite() && bandwidth > 0.0,
            "link bandwidth must be positive, got {bandwidth}"
        );

        let id = self.add_link(a, b, bandwidth, latency);
        if bidirectional {
            self.add_link(b, a, bandwidth, latency);
        }
        id
    }

    fn add_link(&mut self, from: DeviceId, to: DeviceId, bandwidth: f64, latency: SimTime) -> LinkId {
        let id = LinkId(self.links.len());
        let prev = self.edges.insert((from, to), id);
        assert!(prev.is_none(), "duplicate link {from}->{to}");
        self.links.push(Link::new(from, to, bandwidth, latency));
        trace!(?id, %from, %to, bandwidth, ?latency, "创建链路");
        id
    }

    pub fn link(&self, id: LinkId) -> &Link {
        &self.links[id.0]
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link_between(&self, from: DeviceId, to: DeviceId) -> Option<LinkId> {
        self.edges.get(&(from, to)).copied()
    }

    /// 尚未送达的 chunk 数
    pub fn in_flight(&self) -> usize {
        self.chunks.len()
    }

    /// 在途 chunk 的状态；已送达（或从未发送）的返回 `None`
    pub fn chunk_state(&self, id: ChunkId) -> Option<ChunkState> {
        self.chunks.get(&id).map(|c| c.state)
    }

    /// 把 route 解析为链路序列。
    pub fn resolve_route(&self, route: &Route) -> Result<Vec<LinkId>, RouteError> {
        if route.len() < 2 {
            return Err(RouteError::TooShort { len: route.len() });
        }
        if let Some(&device) = route.iter().find(|d| d.0 >= self.device_count) {
            return Err(RouteError::DeviceOutOfRange {
                device,
                device_count: self.device_count,
            });
        }
        route
            .windows(2)
            .map(|pair| {
                self.link_between(pair[0], pair[1])
                    .ok_or(RouteError::MissingLink {
                        from: pair[0],
                        to: pair[1],
                    })
            })
            .collect()
    }

    /// 接收 chunk 并放到第一条链路上。
    #[tracing::instrument(skip(self, chunk, sim), fields(size = chunk.size(), hops = chunk.hops()))]
    pub fn admit(&mut self, mut chunk: Chunk, sim: &mut Simulator) -> Result<ChunkId, RouteError> {
        let links = self.resolve_route(chunk.route())?;
        debug_assert_eq!(chunk.state, ChunkState::Pending);

        let id = ChunkId(self.next_chunk_id);
        self.next_chunk_id += 1;
        chunk.links = links;
        chunk.sent_at = sim.now();
        self.stats.sent_chunks += 1;

        debug!(chunk = %id, route = ?chunk.route(), "🚀 chunk 开始发送");
        self.chunks.insert(id, chunk);
        self.enter_hop(id, 0, sim);
        Ok(id)
    }

    fn enter_hop(&mut self, id: ChunkId, hop: usize, sim: &mut Simulator) {
        let Some(chunk) = self.chunks.get_mut(&id) else {
            return;
        };
        let link_id = chunk.links[hop];
        chunk.state = ChunkState::Transmitting { hop };
        let (size, cap) = (chunk.size(), chunk.rate_cap());

        let link = &mut self.links[link_id.0];
        let resched = link.join(sim.now(), id, size, cap, self.policy);
        trace!(chunk = %id, hop, ?link_id, flows = link.flows().len(), "chunk 进入链路");
        Self::schedule_drains(link_id, resched, sim);
    }

    fn schedule_drains(link: LinkId, resched: Vec<Reschedule>, sim: &mut Simulator) {
        for r in resched {
            sim.schedule_in(
                r.delay,
                LinkDrained {
                    link,
                    chunk: r.chunk,
                    generation: r.generation,
                },
            );
        }
    }

    /// chunk 在链路上发送完毕。过期事件（代数不符）直接忽略。
    pub(crate) fn on_link_drained(
        &mut self,
        link_id: LinkId,
        id: ChunkId,
        generation: u64,
        sim: &mut Simulator,
    ) {
        let now = sim.now();
        let link = &mut self.links[link_id.0];
        let Some((_flow, resched)) = link.drain(now, id, generation, self.policy) else {
            self.stats.stale_events += 1;
            trace!(chunk = %id, ?link_id, generation, "忽略过期的链路完成事件");
            return;
        };
        let latency = link.latency;
        Self::schedule_drains(link_id, resched, sim);

        let Some(chunk) = self.chunks.get_mut(&id) else {
            return;
        };
        let hop = match chunk.state {
            ChunkState::Transmitting { hop } => hop,
            other => {
                debug_assert!(false, "drained chunk in unexpected state {other:?}");
                return;
            }
        };
        chunk.state = ChunkState::Propagating { hop };
        trace!(chunk = %id, hop, ?latency, "chunk 离开链路，开始传播");
        sim.schedule_in(latency, ChunkArrived { chunk: id, hop });
    }

    /// chunk 到达第 `hop` 跳的下游设备。
    pub(crate) fn on_chunk_arrived(&mut self, id: ChunkId, hop: usize, sim: &mut Simulator) {
        let Some(chunk) = self.chunks.get(&id) else {
            return;
        };
        let next = hop + 1;
        if next < chunk.links.len() {
            self.stats.hop_transitions += 1;
            self.enter_hop(id, next, sim);
            return;
        }
        let Some(mut chunk) = self.chunks.remove(&id) else {
            return;
        };
        self.deliver(id, &mut chunk, sim);
    }

    #[tracing::instrument(skip(self, chunk, sim), fields(chunk = %id, size = chunk.size()))]
    fn deliver(&mut self, id: ChunkId, chunk: &mut Chunk, sim: &mut Simulator) {
        let now = sim.now();
        chunk.state = ChunkState::Delivered;
        let fct = now.saturating_sub(chunk.sent_at);

        self.stats.delivered_chunks += 1;
        self.stats.delivered_bytes += chunk.size();
        self.stats.fct_ns.push(fct.0);
        self.stats.last_delivery = now;

        debug!(?now, fct_ns = fct.0, "✅ chunk 送达目的设备");
        if let Some(cb) = chunk.on_arrival.take() {
            cb(id, now, sim);
        }
    }
}
