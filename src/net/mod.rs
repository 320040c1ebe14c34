//! 网络模拟模块
//!
//! 此模块包含拥塞感知传输仿真的核心组件：链路、chunk、带宽分配策略
//! 以及驱动 chunk 逐跳前进的拥塞模型。

// 子模块声明
mod id;
mod chunk;
mod sharing;
mod link;
mod stats;
mod congestion;
mod link_drained;
mod chunk_arrived;
mod net_world;

// 重新导出公共接口
pub use id::{ChunkId, DeviceId, LinkId};
pub use chunk::{Chunk, ChunkDoneCallback, ChunkState, Route};
pub use sharing::SharingPolicy;
pub use link::{Flow, Link, Reschedule};
pub use stats::Stats;
pub use congestion::CongestionModel;
pub use link_drained::LinkDrained;
pub use chunk_arrived::ChunkArrived;
pub use net_world::{NetWorld, TickProbe};
