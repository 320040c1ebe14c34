//! chunk 到达事件
//!
//! 传播时延结束后，chunk 到达当前跳的下游设备。

use super::id::ChunkId;
use super::net_world::NetWorld;
use crate::sim::{Event, Simulator, World};
use tracing::{debug, trace};

/// 事件：chunk 走完第 `hop` 跳，到达 `route[hop + 1]`。
#[derive(Debug)]
pub struct ChunkArrived {
    pub chunk: ChunkId,
    pub hop: usize,
}

impl Event for ChunkArrived {
    #[tracing::instrument(skip(self, sim, world), fields(chunk = %self.chunk, hop = self.hop))]
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let ChunkArrived { chunk, hop } = *self;

        debug!(now = ?sim.now(), "📨 chunk 到达下一跳设备");

        let w = world
            .as_any_mut()
            .downcast_mut::<NetWorld>()
            .expect("world must be NetWorld");
        w.topo.model_mut().on_chunk_arrived(chunk, hop, sim);

        trace!("ChunkArrived::execute 完成");
    }
}
