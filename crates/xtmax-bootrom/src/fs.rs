//! Whole-file operations: patch an image in place, write or check `bootrom.h`.
//!
//! Inputs are read completely before anything is written. Outputs go to a temporary file next
//! to the destination and are renamed over it, so a failure never leaves a truncated file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::checksum::{patch_checksum, ChecksumPatch};
use crate::error::{BootRomError, Result};
use crate::header::{render_header, AddressSource, HeaderOptions};
use crate::segment::find_rom_segment;

/// Result of writing a header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderReport {
    pub path: PathBuf,
    pub addr: u64,
    pub image_len: usize,
    /// False when the file already held exactly this content.
    pub changed: bool,
}

/// Recompute the checksum byte of the image at `path` and write it back.
pub fn patch_image_file(path: &Path) -> Result<ChecksumPatch> {
    let mut image = read(path, "read ROM image")?;
    let patch = patch_checksum(&mut image)?;
    write_atomic(path, &image)?;

    info!(
        path = %path.display(),
        checksum = patch.checksum,
        changed = patch.changed(),
        "patched ROM checksum"
    );
    Ok(patch)
}

/// Linear address for `BOOTROM_ADDR`.
pub fn resolve_address(source: &AddressSource) -> Result<u64> {
    match source {
        AddressSource::Fixed(addr) => Ok(*addr),
        AddressSource::AsmSource(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| BootRomError::io("read assembly source", path, e))?;
            let segment = find_rom_segment(&text)
                .map_err(|err| match err {
                    BootRomError::MalformedSegment { line, text } => {
                        BootRomError::MalformedSegmentIn {
                            path: path.clone(),
                            line,
                            text,
                        }
                    }
                    other => other,
                })?
                .ok_or_else(|| BootRomError::MissingSegmentDirective { path: path.clone() })?;
            debug!(
                path = %path.display(),
                segment = segment.0,
                addr = segment.linear_addr(),
                "resolved ROM address from source"
            );
            Ok(segment.linear_addr())
        }
    }
}

/// Render the header for the image at `image_path` and write it to `out_path`.
pub fn emit_header_file(
    image_path: &Path,
    out_path: &Path,
    source: &AddressSource,
    opts: &HeaderOptions,
) -> Result<HeaderReport> {
    let (addr, image_len, header) = build_header(image_path, source, opts)?;

    let changed = match fs::read(out_path) {
        Ok(existing) => existing != header.as_bytes(),
        Err(_) => true,
    };
    write_atomic(out_path, header.as_bytes())?;

    info!(
        path = %out_path.display(),
        addr,
        image_len,
        changed,
        "wrote ROM header"
    );
    Ok(HeaderReport {
        path: out_path.to_path_buf(),
        addr,
        image_len,
        changed,
    })
}

/// Fail unless `out_path` already holds exactly the header [`emit_header_file`] would write.
pub fn check_header_file(
    image_path: &Path,
    out_path: &Path,
    source: &AddressSource,
    opts: &HeaderOptions,
) -> Result<()> {
    let (_addr, _image_len, header) = build_header(image_path, source, opts)?;

    match fs::read(out_path) {
        Ok(existing) if existing == header.as_bytes() => Ok(()),
        Ok(_) => Err(BootRomError::HeaderOutOfDate {
            path: out_path.to_path_buf(),
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(BootRomError::HeaderMissing {
            path: out_path.to_path_buf(),
        }),
        Err(err) => Err(BootRomError::io("read header", out_path, err)),
    }
}

fn build_header(
    image_path: &Path,
    source: &AddressSource,
    opts: &HeaderOptions,
) -> Result<(u64, usize, String)> {
    let image = read(image_path, "read ROM image")?;
    if image.is_empty() {
        return Err(BootRomError::EmptyImage);
    }
    let addr = resolve_address(source)?;
    Ok((addr, image.len(), render_header(addr, &image, opts)))
}

fn read(path: &Path, op: &'static str) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| BootRomError::io(op, path, e))
}

fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("bootrom");
    let tmp_path = parent.join(format!(".{file_name}.tmp.{}", std::process::id()));

    if let Err(err) = fs::write(&tmp_path, data) {
        let _ = fs::remove_file(&tmp_path);
        return Err(BootRomError::io("write temp file", &tmp_path, err));
    }

    // `rename` doesn't replace on Windows.
    #[cfg(windows)]
    {
        let _ = fs::remove_file(path);
    }

    if let Err(err) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(BootRomError::io("replace", path, err));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bootrom.h");

        write_atomic(&out, b"first").unwrap();
        write_atomic(&out, b"2nd").unwrap();

        assert_eq!(fs::read(&out).unwrap(), b"2nd");
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("bootrom.h")]);
    }

    #[test]
    fn write_atomic_into_missing_dir_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("bootrom.h");

        let err = write_atomic(&out, b"data").unwrap_err();
        assert!(matches!(err, BootRomError::Io { op: "write temp file", .. }));
        assert!(!out.exists());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_temp_write_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("bootrom.h");
        let tmp_path = dir
            .path()
            .join(format!(".bootrom.h.tmp.{}", std::process::id()));
        // Writes to /dev/full fail with ENOSPC after the open succeeds.
        std::os::unix::fs::symlink("/dev/full", &tmp_path).unwrap();

        let err = write_atomic(&out, b"#define BOOTROM_ADDR 0xce000\n").unwrap_err();
        assert!(matches!(err, BootRomError::Io { op: "write temp file", .. }));
        assert!(fs::symlink_metadata(&tmp_path).is_err());
        assert!(!out.exists());
    }
}
