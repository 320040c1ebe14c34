//! Mesh / Torus 拓扑
//!
//! 设备排成 `rows × cols` 网格，设备号 `row * cols + col`。路由采用 XY
//! 维序：先对齐列，再对齐行；开启 `wrap_around` 时每一维独立取较短的环向距离。

use super::ring::step_toward;
use crate::net::{CongestionModel, DeviceId, Route};
use crate::sim::SimTime;

/// 网格形状
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshDims {
    pub rows: usize,
    pub cols: usize,
    pub wrap_around: bool,
}

impl MeshDims {
    pub fn devices(&self) -> usize {
        self.rows * self.cols
    }

    pub fn coord_to_id(&self, col: usize, row: usize) -> DeviceId {
        DeviceId(row * self.cols + col)
    }

    /// 返回 `(col, row)`
    pub fn id_to_coord(&self, id: DeviceId) -> (usize, usize) {
        (id.0 % self.cols, id.0 / self.cols)
    }
}

pub(super) fn build(model: &mut CongestionModel, dims: MeshDims, bandwidth: f64, latency: SimTime) {
    let MeshDims { rows, cols, wrap_around } = dims;
    assert!(
        rows >= 1 && cols >= 1 && rows * cols >= 2,
        "mesh needs at least 2 devices, got {rows}x{cols}"
    );

    for col in 0..cols {
        for row in 0..rows {
            let cur = dims.coord_to_id(col, row);
            if col + 1 < cols {
                model.connect(cur, dims.coord_to_id(col + 1, row), bandwidth, latency, true);
            }
            if row + 1 < rows {
                model.connect(cur, dims.coord_to_id(col, row + 1), bandwidth, latency, true);
            }
        }
    }

    if wrap_around {
        // 维度只有 1 或 2 个设备时首尾已相邻（或是同一个），不再额外连接
        if cols > 2 {
            for row in 0..rows {
                let first = dims.coord_to_id(0, row);
                let last = dims.coord_to_id(cols - 1, row);
                model.connect(first, last, bandwidth, latency, true);
            }
        }
        if rows > 2 {
            for col in 0..cols {
                let first = dims.coord_to_id(col, 0);
                let last = dims.coord_to_id(col, rows - 1);
                model.connect(first, last, bandwidth, latency, true);
            }
        }
    }
}

pub(super) fn route(dims: MeshDims, src: DeviceId, dst: DeviceId) -> Route {
    let (mut col, mut row) = dims.id_to_coord(src);
    let (dst_col, dst_row) = dims.id_to_coord(dst);

    let mut path = vec![src];
    while col != dst_col {
        col = step_toward(col, dst_col, dims.cols, dims.wrap_around);
        path.push(dims.coord_to_id(col, row));
    }
    while row != dst_row {
        row = step_toward(row, dst_row, dims.rows, dims.wrap_around);
        path.push(dims.coord_to_id(col, row));
    }
    path
}
