//! Print the keys, shapes and subject record of archive files.
//!
//! Usage: `inspect-archive FILE...`

use mi_mockup::{archive_keys, MiArchive};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let paths: Vec<_> = std::env::args_os().skip(1).collect();
    if paths.is_empty() {
        return Err("usage: inspect-archive FILE...".into());
    }

    for path in paths {
        let path = std::path::Path::new(&path);
        println!("{}", path.display());
        println!("Loaded keys: {:?}", archive_keys(path)?);
        let archive = MiArchive::from_file(path)?;
        print!("{}", archive);
        // Labels actually used, in ascending order.
        let mut labels: Vec<i64> = archive.y.to_vec();
        labels.sort_unstable();
        labels.dedup();
        println!("y values: {:?}", labels);
    }

    Ok(())
}
