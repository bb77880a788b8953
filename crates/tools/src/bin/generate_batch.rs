use clap::Parser;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    let data_dir = &config.data_dir;
    let sizes = config.sizes.iter().copied();
    std::fs::create_dir_all(data_dir)?;
    batch_sort_model::generate_data(data_dir, sizes, config.length)?;
    Ok(())
}

/// Writes `batch_{size}.json` request bodies for load testing the sort endpoints.
#[derive(Clone, Debug, Parser)]
#[command()]
struct Config {
    #[arg()]
    data_dir: Box<std::path::Path>,
    /// Number of sequences in each generated batch.
    #[arg(required = true)]
    sizes: Vec<usize>,
    /// Values per sequence.
    #[arg(short, long, default_value_t = 1_000)]
    length: usize,
}
