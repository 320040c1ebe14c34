//! Network description loading and topology construction.
//!
//! The description lists one entry per dimension, e.g.
//!
//! ```json
//! { "topology": ["Ring"], "npus_count": [8], "bandwidth": [50.0], "latency": [500.0] }
//! ```
//!
//! Only single-dimension networks are supported. A `Mesh` takes its shape from
//! `npus_count: [rows, cols]` and honours `wrap_around`.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;
use crate::net::SharingPolicy;
use crate::sim::SimTime;
use crate::topo::{LinkParams, MeshDims, Shape, Topology};

/// Building block of a network dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildingBlock {
    Ring,
    FullyConnected,
    Switch,
    Mesh,
}

impl fmt::Display for BuildingBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ring => "Ring",
            Self::FullyConnected => "FullyConnected",
            Self::Switch => "Switch",
            Self::Mesh => "Mesh",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    pub topology: Vec<BuildingBlock>,
    pub npus_count: Vec<usize>,
    /// Per-dimension link bandwidth in GB/s (= bytes/ns).
    pub bandwidth: Vec<f64>,
    /// Per-dimension link latency in ns.
    pub latency: Vec<f64>,
    #[serde(default)]
    pub wrap_around: bool,
    #[serde(default)]
    pub sharing: SharingPolicy,
}

impl NetworkConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Checks the description and resolves it to a shape plus link parameters.
    pub fn resolve(&self) -> Result<(Shape, LinkParams), ConfigError> {
        let dims = self.topology.len();
        if dims != 1 {
            return Err(ConfigError::UnsupportedDims { dims });
        }
        for (field, got) in [
            ("bandwidth", self.bandwidth.len()),
            ("latency", self.latency.len()),
        ] {
            if got != dims {
                return Err(ConfigError::LengthMismatch {
                    field,
                    expected: dims,
                    got,
                });
            }
        }

        let block = self.topology[0];
        let invalid = |reason: String| ConfigError::InvalidTopology {
            shape: block,
            reason,
        };

        let bandwidth = self.bandwidth[0];
        if !(bandwidth.is_finite() && bandwidth > 0.0) {
            return Err(invalid(format!("bandwidth must be positive, got {bandwidth}")));
        }
        let latency = self.latency[0];
        if !(latency.is_finite() && latency >= 0.0) {
            return Err(invalid(format!("latency must be non-negative, got {latency}")));
        }

        let expected_counts = if block == BuildingBlock::Mesh { 2 } else { 1 };
        if self.npus_count.len() != expected_counts {
            return Err(ConfigError::LengthMismatch {
                field: "npus_count",
                expected: expected_counts,
                got: self.npus_count.len(),
            });
        }
        if self.wrap_around && block != BuildingBlock::Mesh {
            warn!(%block, "wrap_around only applies to Mesh, ignoring");
        }

        let shape = match block {
            BuildingBlock::Mesh => {
                let (rows, cols) = (self.npus_count[0], self.npus_count[1]);
                if rows == 0 || cols == 0 || rows * cols < 2 {
                    return Err(invalid(format!(
                        "mesh needs at least 2 devices, got {rows}x{cols}"
                    )));
                }
                Shape::Mesh(MeshDims {
                    rows,
                    cols,
                    wrap_around: self.wrap_around,
                })
            }
            BuildingBlock::Ring => Shape::Ring {
                npus: self.single_dim_npus(&invalid)?,
            },
            BuildingBlock::FullyConnected => Shape::FullyConnected {
                npus: self.single_dim_npus(&invalid)?,
            },
            BuildingBlock::Switch => Shape::Switch {
                npus: self.single_dim_npus(&invalid)?,
            },
        };

        let params = LinkParams {
            bandwidth,
            latency: SimTime::from_nanos_f64(latency),
        };
        Ok((shape, params))
    }

    fn single_dim_npus(
        &self,
        invalid: &impl Fn(String) -> ConfigError,
    ) -> Result<usize, ConfigError> {
        let npus = self.npus_count[0];
        if npus < 2 {
            return Err(invalid(format!("needs at least 2 NPUs, got {npus}")));
        }
        Ok(npus)
    }
}

/// Builds the topology described by `cfg`.
pub fn construct_topology(cfg: &NetworkConfig) -> Result<Topology, ConfigError> {
    let (shape, params) = cfg.resolve()?;
    info!(?shape, bandwidth = params.bandwidth, latency = ?params.latency, sharing = ?cfg.sharing, "构建拓扑");
    Ok(Topology::new(shape, params, cfg.sharing))
}
