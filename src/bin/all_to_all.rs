//! 流量矩阵仿真
//!
//! 读取网络描述与流量矩阵，为每个非对角正数项发送一个 chunk，运行到事件
//! 队列为空后输出汇总。

use anasim_rs::config::{NetworkConfig, construct_topology};
use anasim_rs::net::{NetWorld, SharingPolicy};
use anasim_rs::sim::Simulator;
use anasim_rs::traffic::{RunSummary, TrafficMatrix, simulate_all_to_all};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "all-to-all",
    about = "Simulate a traffic matrix on a congestion-aware analytical network"
)]
struct Args {
    /// Path to the network description (JSON)
    #[arg(long)]
    network: PathBuf,

    /// Path to the traffic matrix (whitespace separated, one row per line)
    #[arg(long)]
    matrix: PathBuf,

    /// Override bandwidth sharing: equal or max_min
    #[arg(long)]
    sharing: Option<String>,

    /// Print the summary as a single JSON line
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    // 初始化 tracing（写到 stderr，stdout 只留结果）
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .init();

    let args = Args::parse();

    let mut cfg = match NetworkConfig::load(&args.network) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("[Error] {err}");
            return ExitCode::from(2);
        }
    };
    if let Some(raw) = args.sharing.as_deref() {
        match SharingPolicy::parse(raw) {
            Ok(policy) => cfg.sharing = policy,
            Err(err) => {
                eprintln!("[Error] {err}");
                return ExitCode::from(2);
            }
        }
    }

    let topo = match construct_topology(&cfg) {
        Ok(topo) => topo,
        Err(err) => {
            eprintln!("[Error] {err}");
            return ExitCode::from(2);
        }
    };
    let matrix = match TrafficMatrix::load(&args.matrix) {
        Ok(matrix) => matrix,
        Err(err) => {
            eprintln!("[Error] {err}");
            return ExitCode::from(2);
        }
    };

    let mut sim = Simulator::default();
    let mut world = NetWorld::new(topo);

    let report = match simulate_all_to_all(&matrix, &mut world, &mut sim) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("[Error] {err}");
            return ExitCode::from(2);
        }
    };
    for (transfer, err) in &report.rejected {
        eprintln!(
            "[Warn] skipped {} -> {} ({} bytes): {err}",
            transfer.src, transfer.dst, transfer.bytes
        );
    }

    while !sim.finished() {
        sim.proceed(&mut world);
    }

    let summary = RunSummary::collect(&world, &sim, &report);
    if args.json {
        match serde_json::to_string(&summary) {
            Ok(line) => println!("{line}"),
            Err(err) => {
                eprintln!("[Error] failed to encode summary: {err}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("Total NPUs Count: {}", summary.npus_count);
        println!("Total devices Count: {}", summary.devices_count);
        println!(
            "Simulation finished at time: {} ns",
            summary.finish_time_ns
        );
        println!(
            "delivered_chunks={}, delivered_bytes={}, rejected={}, stale_events={}",
            summary.delivered_chunks, summary.delivered_bytes, summary.rejected, summary.stale_events
        );
    }
    ExitCode::SUCCESS
}
