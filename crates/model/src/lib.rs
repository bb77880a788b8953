pub mod batch;
pub mod generator;
pub mod wire;

pub use batch::{Batch, Sequence};
pub use wire::{SortRequest, SortResponse, TaskFailure};

/// Writes one request body per batch size into `out_dir`.
///
/// Files are named `batch_{size}.json` and are never overwritten.
pub fn generate_data(
    out_dir: &std::path::Path,
    sizes: impl Iterator<Item = usize>,
    length: usize,
) -> anyhow::Result<()> {
    for size in sizes {
        let file_name = format!("batch_{}.json", size);
        let file_path = out_dir.join(file_name.as_str());
        if let Ok(file) = std::fs::File::create_new(file_path) {
            write_data_file(&file, size, length)?;
        }
    }
    Ok(())
}

fn write_data_file(file: &std::fs::File, size: usize, length: usize) -> anyhow::Result<()> {
    let writer = std::io::BufWriter::new(file);
    let batch = generator::BatchGenerator::new(length).batch(size);
    serde_json::to_writer(writer, &SortRequest::new(batch))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_files_decode_as_requests() -> anyhow::Result<()> {
        let out_dir = std::env::temp_dir().join(format!("batch-sort-{}", std::process::id()));
        std::fs::create_dir_all(&out_dir)?;

        generate_data(&out_dir, [2, 5].into_iter(), 16)?;

        let bytes = std::fs::read(out_dir.join("batch_5.json"))?;
        let request: SortRequest = serde_json::from_slice(&bytes)?;
        let batch = request.into_batch();
        assert_eq!(batch.len(), 5);
        assert_eq!(batch.total_values(), 5 * 16);

        std::fs::remove_dir_all(&out_dir)?;
        Ok(())
    }
}
