use crate::error::RouteError;
use crate::net::{DeviceId, Route};
use crate::sim::SimTime;
use crate::topo::{Shape, Topology};

fn ids(route: &Route) -> Vec<usize> {
    route.iter().map(|d| d.0).collect()
}

fn assert_route_uses_existing_links(topo: &Topology, route: &Route) {
    let links = topo
        .validate_route(route)
        .unwrap_or_else(|err| panic!("route {route:?} is not traversable: {err}"));
    assert_eq!(links.len(), route.len() - 1);
}

#[test]
fn ring_takes_shorter_arc_and_is_reversible() {
    for n in 2..=9 {
        let topo = Topology::ring(n, 10.0, SimTime(1));
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let fwd = topo.route(DeviceId(i), DeviceId(j)).unwrap();
                let d = i.abs_diff(j);
                assert_eq!(fwd.len(), 1 + d.min(n - d), "ring {n}: {i}->{j} {fwd:?}");
                assert_eq!(fwd.first(), Some(&DeviceId(i)));
                assert_eq!(fwd.last(), Some(&DeviceId(j)));

                let mut back = topo.route(DeviceId(j), DeviceId(i)).unwrap();
                back.reverse();
                assert_eq!(fwd, back, "ring {n}: {i}<->{j}");
                assert_route_uses_existing_links(&topo, &fwd);
            }
        }
    }
}

#[test]
fn ring_of_three_routes_directly_across_the_wrap_link() {
    let topo = Topology::ring(3, 10.0, SimTime(1));
    assert_eq!(ids(&topo.route(DeviceId(0), DeviceId(2)).unwrap()), vec![0, 2]);
    assert_eq!(ids(&topo.route(DeviceId(2), DeviceId(0)).unwrap()), vec![2, 0]);
}

#[test]
fn ring_link_count_matches_shape() {
    // 每对相邻设备一对单向链路；n == 2 时只有一对
    assert_eq!(Topology::ring(2, 1.0, SimTime::ZERO).model().links().len(), 2);
    assert_eq!(Topology::ring(5, 1.0, SimTime::ZERO).model().links().len(), 10);
}

#[test]
fn fully_connected_routes_are_direct() {
    let n = 6;
    let topo = Topology::fully_connected(n, 25.0, SimTime(2));
    assert_eq!(topo.model().links().len(), n * (n - 1));
    for i in 0..n {
        for j in 0..n {
            if i != j {
                let route = topo.route(DeviceId(i), DeviceId(j)).unwrap();
                assert_eq!(ids(&route), vec![i, j]);
                assert_route_uses_existing_links(&topo, &route);
            }
        }
    }
}

#[test]
fn switch_routes_through_the_hub() {
    let topo = Topology::switch(4, 25.0, SimTime(2));
    assert_eq!(topo.npus_count(), 4);
    assert_eq!(topo.device_count(), 5);
    assert_eq!(topo.shape(), Shape::Switch { npus: 4 });

    let route = topo.route(DeviceId(0), DeviceId(2)).unwrap();
    assert_eq!(ids(&route), vec![0, 4, 2]);
    assert_route_uses_existing_links(&topo, &route);

    assert_eq!(ids(&topo.route(DeviceId(4), DeviceId(1)).unwrap()), vec![4, 1]);
    assert_eq!(ids(&topo.route(DeviceId(3), DeviceId(4)).unwrap()), vec![3, 4]);
}

#[test]
fn mesh_without_wrap_uses_manhattan_distance() {
    let (rows, cols) = (3, 4);
    let topo = Topology::mesh(rows, cols, 10.0, SimTime(1), false);
    for src in 0..rows * cols {
        for dst in 0..rows * cols {
            if src == dst {
                continue;
            }
            let route = topo.route(DeviceId(src), DeviceId(dst)).unwrap();
            let (sc, sr) = (src % cols, src / cols);
            let (dc, dr) = (dst % cols, dst / cols);
            assert_eq!(route.len(), 1 + sc.abs_diff(dc) + sr.abs_diff(dr));
            assert_route_uses_existing_links(&topo, &route);
        }
    }
}

#[test]
fn torus_takes_shorter_ring_distance_per_dimension() {
    for (rows, cols) in [(3, 3), (4, 5), (2, 6), (1, 4)] {
        let topo = Topology::mesh(rows, cols, 10.0, SimTime(1), true);
        for src in 0..rows * cols {
            for dst in 0..rows * cols {
                if src == dst {
                    continue;
                }
                let route = topo.route(DeviceId(src), DeviceId(dst)).unwrap();
                let dc = (src % cols).abs_diff(dst % cols);
                let dr = (src / cols).abs_diff(dst / cols);
                let expected = 1 + dc.min(cols - dc) + dr.min(rows - dr);
                assert_eq!(route.len(), expected, "{rows}x{cols}: {src}->{dst} {route:?}");
                assert_route_uses_existing_links(&topo, &route);
            }
        }
    }
}

#[test]
fn mesh_routes_columns_before_rows() {
    let topo = Topology::mesh(2, 2, 10.0, SimTime(1), false);
    assert_eq!(ids(&topo.route(DeviceId(0), DeviceId(3)).unwrap()), vec![0, 1, 3]);
    assert_eq!(ids(&topo.route(DeviceId(3), DeviceId(0)).unwrap()), vec![3, 2, 0]);
}

#[test]
fn torus_wraps_around_the_row() {
    // 1 行 x 5 列：0 -> 4 走环回链路
    let topo = Topology::mesh(1, 5, 10.0, SimTime(1), true);
    assert_eq!(ids(&topo.route(DeviceId(0), DeviceId(4)).unwrap()), vec![0, 4]);
    assert_eq!(ids(&topo.route(DeviceId(1), DeviceId(4)).unwrap()), vec![1, 0, 4]);
}

#[test]
fn route_is_idempotent() {
    let topo = Topology::mesh(4, 4, 10.0, SimTime(1), true);
    let a = topo.route(DeviceId(1), DeviceId(14)).unwrap();
    let b = topo.route(DeviceId(1), DeviceId(14)).unwrap();
    assert_eq!(a, b);
    assert_eq!(topo.model().stats.sent_chunks, 0);
}

#[test]
fn route_rejects_same_device_and_out_of_range() {
    let topo = Topology::ring(4, 10.0, SimTime(1));
    assert_eq!(
        topo.route(DeviceId(2), DeviceId(2)),
        Err(RouteError::SameDevice(DeviceId(2)))
    );
    assert_eq!(
        topo.route(DeviceId(0), DeviceId(4)),
        Err(RouteError::DeviceOutOfRange {
            device: DeviceId(4),
            device_count: 4
        })
    );
}

#[test]
#[should_panic(expected = "ring needs at least 2 devices")]
fn ring_of_one_device_is_a_construction_defect() {
    let _ = Topology::ring(1, 10.0, SimTime(1));
}

#[test]
#[should_panic(expected = "link bandwidth must be positive")]
fn non_positive_bandwidth_is_a_construction_defect() {
    let _ = Topology::fully_connected(3, 0.0, SimTime(1));
}
