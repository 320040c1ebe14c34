//! 世界 trait
//!
//! 仿真世界持有事件执行时要修改的全部状态（拓扑、链路、chunk）。

use super::simulator::Simulator;
use std::any::Any;

/// 仿真世界：由业务层实现，事件通过 `as_any_mut` 向下转型取得具体类型。
pub trait World: Any {
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// 每个事件执行完毕后调用，可用于做不变量检查或采样。
    fn on_tick(&mut self, _sim: &mut Simulator) {}
}
