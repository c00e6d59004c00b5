use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::error::{Error, Result};

/// Read an entire file into memory.
///
/// Fails with `FileNotFound` if the file cannot be opened and with `FileIo`
/// if the size cannot be determined or fewer bytes than announced were read.
pub fn read(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let io_err = |source| Error::FileIo { path: path.to_path_buf(), source };

    let mut file = fs::File::open(path).map_err(|source| Error::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    let len = file.metadata().map_err(io_err)?.len() as usize;

    let mut data = Vec::with_capacity(len);
    file.read_to_end(&mut data).map_err(io_err)?;
    if data.len() < len {
        return Err(io_err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("short read ({} of {} bytes)", data.len(), len),
        )));
    }
    debug!("read {}: {} bytes", path.display(), data.len());
    Ok(data)
}

/// Write `data` to `path`, creating missing parent directories.
pub fn write(path: impl AsRef<Path>, data: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let io_err = |source| Error::FileIo { path: path.to_path_buf(), source };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.is_dir() {
            debug!("creating directory {}", parent.display());
            fs::create_dir_all(parent).map_err(io_err)?;
        }
    }
    let mut file = fs::File::create(path).map_err(io_err)?;
    file.write_all(data).map_err(io_err)?;
    file.flush().map_err(io_err)
}
