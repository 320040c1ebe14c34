//! 事件 trait
//!
//! 仿真中所有可调度的动作都实现 [`Event`]。

use super::simulator::Simulator;
use super::world::World;

/// 事件：可被调度执行。使用 `self: Box<Self>` 以支持 move/所有权转移。
///
/// 事件只携带标识符（链路、chunk、代数），真正的状态都在 [`World`] 里，
/// 执行时再按 id 取出，避免事件与状态之间的引用别名。
pub trait Event: Send + 'static {
    fn execute(self: Box<Self>, sim: &mut Simulator, world: &mut dyn World);

    /// 用于日志的事件名
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
