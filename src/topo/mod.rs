//! 拓扑构建与路由
//!
//! 每种拓扑形状（Ring / FullyConnected / Switch / Mesh）各自提供建图函数与
//! 纯路由函数，[`Topology`] 把形状、路由和拥塞模型组合成对外的入口。

pub mod fully_connected;
pub mod mesh;
pub mod ring;
pub mod switch;

pub use mesh::MeshDims;

use crate::error::RouteError;
use crate::net::{Chunk, ChunkId, CongestionModel, DeviceId, LinkId, Route, SharingPolicy};
use crate::sim::{SimTime, Simulator};
use tracing::{debug, info, warn};

/// 拓扑形状，构建时确定，之后不变
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Ring { npus: usize },
    FullyConnected { npus: usize },
    /// 额外有一个 hub 设备，编号为 `npus`
    Switch { npus: usize },
    Mesh(MeshDims),
}

impl Shape {
    /// 可收发流量的端点数
    pub fn npus_count(&self) -> usize {
        match *self {
            Shape::Ring { npus } | Shape::FullyConnected { npus } | Shape::Switch { npus } => npus,
            Shape::Mesh(dims) => dims.devices(),
        }
    }

    /// 设备总数（含交换机）
    pub fn device_count(&self) -> usize {
        match *self {
            Shape::Switch { npus } => npus + 1,
            _ => self.npus_count(),
        }
    }
}

/// 单条链路的参数，所有链路相同
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkParams {
    /// GB/s，即 bytes/ns
    pub bandwidth: f64,
    pub latency: SimTime,
}

/// 拓扑门面：路由 + 拥塞模型 + 链路表
#[derive(Debug)]
pub struct Topology {
    shape: Shape,
    params: LinkParams,
    model: CongestionModel,
}

impl Topology {
    /// 按形状建图。参数非法（设备数不足、带宽非正）直接 panic。
    #[tracing::instrument]
    pub fn new(shape: Shape, params: LinkParams, policy: SharingPolicy) -> Self {
        let mut model = CongestionModel::new(shape.device_count(), policy);
        let LinkParams { bandwidth, latency } = params;
        match shape {
            Shape::Ring { npus } => ring::build(&mut model, npus, bandwidth, latency),
            Shape::FullyConnected { npus } => {
                fully_connected::build(&mut model, npus, bandwidth, latency)
            }
            Shape::Switch { npus } => switch::build(&mut model, npus, bandwidth, latency),
            Shape::Mesh(dims) => mesh::build(&mut model, dims, bandwidth, latency),
        }
        info!(
            devices = shape.device_count(),
            links = model.links().len(),
            "🧱 拓扑构建完成"
        );
        Self {
            shape,
            params,
            model,
        }
    }

    pub fn ring(npus: usize, bandwidth: f64, latency: SimTime) -> Self {
        Self::new(
            Shape::Ring { npus },
            LinkParams { bandwidth, latency },
            SharingPolicy::default(),
        )
    }

    pub fn fully_connected(npus: usize, bandwidth: f64, latency: SimTime) -> Self {
        Self::new(
            Shape::FullyConnected { npus },
            LinkParams { bandwidth, latency },
            SharingPolicy::default(),
        )
    }

    pub fn switch(npus: usize, bandwidth: f64, latency: SimTime) -> Self {
        Self::new(
            Shape::Switch { npus },
            LinkParams { bandwidth, latency },
            SharingPolicy::default(),
        )
    }

    pub fn mesh(
        rows: usize,
        cols: usize,
        bandwidth: f64,
        latency: SimTime,
        wrap_around: bool,
    ) -> Self {
        Self::new(
            Shape::Mesh(MeshDims {
                rows,
                cols,
                wrap_around,
            }),
            LinkParams { bandwidth, latency },
            SharingPolicy::default(),
        )
    }

    /// 切换带宽分配策略；必须在发送任何 chunk 之前调用。
    pub fn with_sharing(mut self, policy: SharingPolicy) -> Self {
        self.model.set_policy(policy);
        self
    }

    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn link_params(&self) -> LinkParams {
        self.params
    }

    pub fn npus_count(&self) -> usize {
        self.shape.npus_count()
    }

    pub fn device_count(&self) -> usize {
        self.shape.device_count()
    }

    pub fn model(&self) -> &CongestionModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut CongestionModel {
        &mut self.model
    }

    /// 计算 `src -> dst` 的设备序列（含两端）。纯函数，不改变仿真状态。
    pub fn route(&self, src: DeviceId, dst: DeviceId) -> Result<Route, RouteError> {
        let device_count = self.device_count();
        for device in [src, dst] {
            if device.0 >= device_count {
                return Err(RouteError::DeviceOutOfRange {
                    device,
                    device_count,
                });
            }
        }
        if src == dst {
            return Err(RouteError::SameDevice(src));
        }

        let path = match self.shape {
            Shape::Ring { npus } => ring::route(npus, src, dst),
            Shape::FullyConnected { .. } => fully_connected::route(src, dst),
            Shape::Switch { npus } => switch::route(npus, src, dst),
            Shape::Mesh(dims) => mesh::route(dims, src, dst),
        };
        debug!(%src, %dst, ?path, "计算路由");
        Ok(path)
    }

    /// 把 route 解析为链路序列，不发送。
    pub fn validate_route(&self, route: &Route) -> Result<Vec<LinkId>, RouteError> {
        self.model.resolve_route(route)
    }

    /// 发送 chunk：校验路由后交给拥塞模型。路由非法时只拒绝这一个 chunk。
    pub fn send(&mut self, chunk: Chunk, sim: &mut Simulator) -> Result<ChunkId, RouteError> {
        self.model.admit(chunk, sim).inspect_err(|err| {
            warn!(%err, "chunk 被拒绝");
        })
    }
}
