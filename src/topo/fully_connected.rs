//! FullyConnected 拓扑：任意两设备之间都有一对链路。

use crate::net::{CongestionModel, DeviceId, Route};
use crate::sim::SimTime;

pub(super) fn build(model: &mut CongestionModel, npus: usize, bandwidth: f64, latency: SimTime) {
    assert!(npus >= 2, "fully-connected needs at least 2 devices, got {npus}");
    for a in 0..npus {
        for b in (a + 1)..npus {
            model.connect(DeviceId(a), DeviceId(b), bandwidth, latency, true);
        }
    }
}

pub(super) fn route(src: DeviceId, dst: DeviceId) -> Route {
    vec![src, dst]
}
