//! Ring 拓扑
//!
//! 设备 `i` 与 `(i + 1) mod n` 双向相连，路由取较短的弧。

use crate::net::{CongestionModel, DeviceId, Route};
use crate::sim::SimTime;

pub(super) fn build(model: &mut CongestionModel, npus: usize, bandwidth: f64, latency: SimTime) {
    assert!(npus >= 2, "ring needs at least 2 devices, got {npus}");
    for i in 0..npus {
        let next = (i + 1) % npus;
        // n == 2 时 1 -> 0 与 0 -> 1 是同一对
        if npus == 2 && i == 1 {
            break;
        }
        model.connect(DeviceId(i), DeviceId(next), bandwidth, latency, true);
    }
}

/// 在长度为 `extent` 的环上从 `cur` 朝 `dst` 走一步。
///
/// 默认直接朝 `dst` 走；若 `wrap` 且直接距离超过 `extent / 2` 则反向绕行。
/// 距离恰为一半时走直接方向，所以 `i -> j` 与 `j -> i` 经过同一组设备。
pub(crate) fn step_toward(cur: usize, dst: usize, extent: usize, wrap: bool) -> usize {
    let direct_up = dst > cur;
    let up = if wrap && cur.abs_diff(dst) > extent / 2 {
        !direct_up
    } else {
        direct_up
    };
    if up {
        (cur + 1) % extent
    } else {
        (cur + extent - 1) % extent
    }
}

pub(super) fn route(npus: usize, src: DeviceId, dst: DeviceId) -> Route {
    let mut path = vec![src];
    let mut cur = src.0;
    while cur != dst.0 {
        cur = step_toward(cur, dst.0, npus, true);
        path.push(DeviceId(cur));
    }
    path
}
