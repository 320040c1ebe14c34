//! 网络世界实现
//!
//! 定义网络仿真的世界（World）实现，持有拓扑（及其拥塞模型）。

use crate::sim::{SimTime, Simulator, World};
use crate::topo::Topology;
use std::any::Any;

/// 每个事件执行后的观察回调，可用于检查不变量
pub type TickProbe = Box<dyn FnMut(&Topology, SimTime)>;

/// 网络世界：持有 Topology，事件通过向下转型拿到它。
pub struct NetWorld {
    pub topo: Topology,
    probe: Option<TickProbe>,
}

impl NetWorld {
    pub fn new(topo: Topology) -> Self {
        Self { topo, probe: None }
    }

    pub fn with_probe(mut self, probe: TickProbe) -> Self {
        self.probe = Some(probe);
        self
    }
}

impl World for NetWorld {
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn on_tick(&mut self, sim: &mut Simulator) {
        if let Some(probe) = self.probe.as_mut() {
            probe(&self.topo, sim.now());
        }
    }
}
