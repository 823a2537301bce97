//! Example: Creating archives with arcwrite
//!
//! Run with: `cargo run --example create_archive`
//!
//! Set `RUST_LOG=debug` to see per-entry logging.

use arcwrite::AnyArchiveWriter;
use arcwrite::ArchiveFormat;
use arcwrite::ArchiveWriter;
use arcwrite::TarArchiveWriter;
use arcwrite::ZipArchiveWriter;
use arcwrite::add_all;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let workdir = tempfile::tempdir()?;
    let source = workdir.path().join("example_src");
    std::fs::create_dir_all(source.join("docs"))?;
    std::fs::write(source.join("hello.txt"), "Hello, arcwrite!")?;
    std::fs::write(source.join("docs/notes.md"), "# Notes")?;

    // Example 1: entry by entry into a ZIP ("example" becomes example.zip)
    println!("Example 1: ZIP, one entry at a time");
    let base = workdir.path().join("example");
    let mut zip = ZipArchiveWriter::create(base.to_str().ok_or("non UTF-8 temp path")?)?;
    zip.add_directory("docs")?;
    zip.add_path("docs/notes.md", source.join("docs/notes.md"))?;
    zip.add_bytes("inline.txt", b"written from memory")?;
    println!("  wrote {}", zip.name());
    zip.close()?;

    // Example 2: a whole tree into a compressed TAR (".zip" becomes .tar.gz)
    println!("\nExample 2: directory tree into TAR+gzip");
    let base = workdir.path().join("tree.zip");
    let mut tar = TarArchiveWriter::create(base.to_str().ok_or("non UTF-8 temp path")?)?;
    let report = add_all(&mut tar, &source, true)?;
    println!(
        "  wrote {} ({} files, {} directories, compressed: {})",
        tar.name(),
        report.files_added,
        report.directories_added,
        tar.is_compressed()
    );
    tar.close()?;

    // Example 3: format picked at run time, written to memory
    println!("\nExample 3: runtime format selection");
    let format = ArchiveFormat::detect("backup.tar").unwrap_or(ArchiveFormat::Zip);
    let mut archive =
        AnyArchiveWriter::create_writer(format, "backup.tar", std::io::Cursor::new(Vec::new()));
    add_all(&mut archive, &source, false)?;
    let bytes = archive.close()?.into_inner();
    println!("  {format} archive of {} bytes in memory", bytes.len());

    println!("\nExamples completed successfully!");
    Ok(())
}
