//! Issue one chunk per traffic-matrix entry and summarize the run.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{TrafficMatrix, Transfer};
use crate::error::{RouteError, TrafficError};
use crate::net::{Chunk, ChunkId, NetWorld};
use crate::sim::{SimTime, Simulator};

/// A delivered chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arrival {
    pub chunk: ChunkId,
    pub transfer: Transfer,
    pub at: SimTime,
}

/// What `simulate_all_to_all` issued; arrivals fill in while the simulator runs.
#[derive(Debug)]
pub struct AllToAllReport {
    pub issued: usize,
    pub rejected: Vec<(Transfer, RouteError)>,
    arrivals: Arc<Mutex<Vec<Arrival>>>,
}

impl AllToAllReport {
    /// Arrivals recorded so far, in delivery order.
    pub fn arrivals(&self) -> Vec<Arrival> {
        self.arrivals
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Routes and sends every transfer of `matrix`. The simulator is not run.
///
/// A transfer that cannot be routed is logged and listed in
/// `AllToAllReport::rejected`; the remaining transfers are still sent.
#[tracing::instrument(skip_all, fields(devices = matrix.len()))]
pub fn simulate_all_to_all(
    matrix: &TrafficMatrix,
    world: &mut NetWorld,
    sim: &mut Simulator,
) -> Result<AllToAllReport, TrafficError> {
    let npus = world.topo.npus_count();
    if matrix.len() != npus {
        return Err(TrafficError::SizeMismatch {
            matrix: matrix.len(),
            npus,
        });
    }

    let arrivals = Arc::new(Mutex::new(Vec::new()));
    let mut issued = 0;
    let mut rejected = Vec::new();

    for transfer in matrix.transfers() {
        let route = match world.topo.route(transfer.src, transfer.dst) {
            Ok(route) => route,
            Err(err) => {
                warn!(src = %transfer.src, dst = %transfer.dst, %err, "跳过无法路由的传输");
                rejected.push((transfer, err));
                continue;
            }
        };

        let log = Arc::clone(&arrivals);
        let chunk = Chunk::new(transfer.bytes, route, move |chunk, at, _sim| {
            debug!(%chunk, src = %transfer.src, dst = %transfer.dst, ?at, "A chunk arrived at destination");
            log.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(Arrival {
                    chunk,
                    transfer,
                    at,
                });
        });
        match world.topo.send(chunk, sim) {
            Ok(_) => issued += 1,
            Err(err) => rejected.push((transfer, err)),
        }
    }

    info!(issued, rejected = rejected.len(), "📦 流量矩阵已全部发出");
    Ok(AllToAllReport {
        issued,
        rejected,
        arrivals,
    })
}

/// End-of-run numbers printed by the `all_to_all` binary.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub npus_count: usize,
    pub devices_count: usize,
    pub finish_time_ns: u64,
    pub events: u64,
    pub issued: usize,
    pub rejected: usize,
    pub delivered_chunks: u64,
    pub delivered_bytes: u64,
    pub stale_events: u64,
    pub mean_fct_ns: Option<f64>,
    pub max_fct_ns: Option<u64>,
    pub peak_link_flows: usize,
    pub max_link_utilization: f64,
}

impl RunSummary {
    pub fn collect(world: &NetWorld, sim: &Simulator, report: &AllToAllReport) -> Self {
        let topo = &world.topo;
        let model = topo.model();
        let now = sim.now();
        let links = model.links();
        Self {
            npus_count: topo.npus_count(),
            devices_count: topo.device_count(),
            finish_time_ns: now.as_nanos(),
            events: sim.dispatched(),
            issued: report.issued,
            rejected: report.rejected.len(),
            delivered_chunks: model.stats.delivered_chunks,
            delivered_bytes: model.stats.delivered_bytes,
            stale_events: model.stats.stale_events,
            mean_fct_ns: model.stats.mean_fct_ns(),
            max_fct_ns: model.stats.max_fct_ns(),
            peak_link_flows: links.iter().map(|l| l.peak_flows).max().unwrap_or(0),
            max_link_utilization: links
                .iter()
                .map(|l| l.utilization(now))
                .fold(0.0, f64::max),
        }
    }
}
