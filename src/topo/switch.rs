//! Switch 拓扑
//!
//! `npus` 个端点都只连到一个交换机（hub），hub 的设备号为 `npus`。

use crate::net::{CongestionModel, DeviceId, Route};
use crate::sim::SimTime;

pub(super) fn hub(npus: usize) -> DeviceId {
    DeviceId(npus)
}

pub(super) fn build(model: &mut CongestionModel, npus: usize, bandwidth: f64, latency: SimTime) {
    assert!(npus >= 2, "switch needs at least 2 NPUs, got {npus}");
    let hub = hub(npus);
    for i in 0..npus {
        model.connect(DeviceId(i), hub, bandwidth, latency, true);
    }
}

pub(super) fn route(npus: usize, src: DeviceId, dst: DeviceId) -> Route {
    let hub = hub(npus);
    if src == hub || dst == hub {
        vec![src, dst]
    } else {
        vec![src, hub, dst]
    }
}
