//! 随机流量矩阵生成

use anasim_rs::traffic::TrafficMatrix;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "gen-traffic", about = "Generate a random traffic matrix")]
struct Args {
    /// 节点数量
    #[arg(long, default_value_t = 8)]
    nodes: usize,
    /// 输出文件
    #[arg(long, default_value = "MeshChunkMatrix.txt")]
    output: PathBuf,
    /// 可选的数据块大小（字节）
    #[arg(long, num_args = 1.., default_values_t = [0_u64, 256, 512, 1024, 2048])]
    sizes: Vec<u64>,
    /// 稀疏度 (0-1)：每一项被置 0 的概率
    #[arg(long, default_value_t = 0.2)]
    sparsity: f64,
    /// 生成对称矩阵
    #[arg(long)]
    symmetric: bool,
    /// 随机种子
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.nodes == 0 || args.sizes.is_empty() {
        eprintln!("[Error] --nodes must be positive and --sizes non-empty");
        return ExitCode::from(2);
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let matrix = TrafficMatrix::generate(
        args.nodes,
        &args.sizes,
        args.sparsity,
        args.symmetric,
        &mut rng,
    );
    if let Err(err) = matrix.save(&args.output) {
        eprintln!("[Error] {err}");
        return ExitCode::FAILURE;
    }
    tracing::info!(
        nodes = args.nodes,
        total_bytes = matrix.total_bytes(),
        output = %args.output.display(),
        "matrix saved"
    );
    println!("matrix saved to {}", args.output.display());
    ExitCode::SUCCESS
}
