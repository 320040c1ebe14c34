//! 链路发送完成事件

use super::id::{ChunkId, LinkId};
use super::net_world::NetWorld;
use crate::sim::{Event, Simulator, World};

/// 事件：chunk 在链路上按当前份额发送完最后一个字节。
///
/// 每次带宽重新分配都会换发新的 `generation`，旧事件到点后被识别为过期。
#[derive(Debug)]
pub struct LinkDrained {
    pub link: LinkId,
    pub chunk: ChunkId,
    pub generation: u64,
}

impl Event for LinkDrained {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World) {
        let LinkDrained {
            link,
            chunk,
            generation,
        } = *self;
        let w = world
            .as_any_mut()
            .downcast_mut::<NetWorld>()
            .expect("world must be NetWorld");
        w.topo
            .model_mut()
            .on_link_drained(link, chunk, generation, sim);
    }
}
