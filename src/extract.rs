use flate2::read::MultiGzDecoder;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Cursor, Read};
use std::path::{Component, Path};
use tar::{Archive, EntryType};
use thiserror::Error;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("tarball not found, empty or not gzip-compressed")]
    EmptyOrInvalidArchive,
    #[error("extraction failed: {0}")]
    Io(#[from] io::Error),
}

/// Unpack a gzip-compressed tar stream under `destination`.
///
/// Directories and regular files are materialized; every other entry type is
/// ignored. The first read or write error aborts extraction and whatever was
/// already written stays on disk.
pub fn extract<R: Read>(destination: &Path, mut input: R) -> Result<(), ExtractError> {
    let mut magic = [0u8; 2];
    match input.read_exact(&mut magic) {
        Ok(()) if magic == GZIP_MAGIC => {}
        Ok(()) => return Err(ExtractError::EmptyOrInvalidArchive),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            return Err(ExtractError::EmptyOrInvalidArchive)
        }
        Err(e) => return Err(e.into()),
    }

    // Concatenated gzip members form a single stream
    let decoder = MultiGzDecoder::new(Cursor::new(magic).chain(input));
    let mut archive = Archive::new(decoder);

    for entry in archive.entries()? {
        let mut entry = entry?;
        let entry_path = entry.path()?.into_owned();

        if !stays_within_root(&entry_path) {
            tracing::warn!(
                "Skipping entry outside of module directory: {}",
                entry_path.display()
            );
            continue;
        }

        let target = destination.join(&entry_path);
        match entry.header().entry_type() {
            EntryType::Directory => create_dir_all(&target)?,
            EntryType::Regular => {
                let mode = entry.header().mode()? & 0o7777;
                write_file(&mut entry, &target, mode)?;
            }
            other => {
                tracing::debug!("Ignoring {:?} entry {}", other, entry_path.display());
            }
        }
    }

    tracing::info!("Saved module files to {}", destination.display());
    Ok(())
}

fn stays_within_root(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn create_dir_all(path: &Path) -> io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }
    builder.create(path)
}

fn write_file(data: &mut impl Read, target: &Path, mode: u32) -> io::Result<()> {
    if let Some(parent) = target.parent() {
        create_dir_all(parent)?;
    }

    // A read-only file left by an earlier install cannot be reopened for writing
    if let Ok(metadata) = fs::symlink_metadata(target) {
        if metadata.is_file() && metadata.permissions().readonly() {
            fs::remove_file(target)?;
        }
    }

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(target)?;
    io::copy(data, &mut file)?;
    set_mode(&file, mode)
}

#[cfg(unix)]
fn set_mode(file: &File, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_file: &File, _mode: u32) -> io::Result<()> {
    Ok(())
}
