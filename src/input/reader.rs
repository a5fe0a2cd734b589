use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use flate2::read::MultiGzDecoder;

use crate::input::DatasetError;

pub fn open_maybe_gz(path: &Path) -> Result<Box<dyn BufRead + Send>, DatasetError> {
    let file = File::open(path).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// First existing `dir/<name>` among `candidates`, plain files before `.gz`.
pub fn find_first(dir: &Path, candidates: &[&str]) -> Option<PathBuf> {
    for name in candidates {
        for candidate in [name.to_string(), format!("{name}.gz")] {
            let path = dir.join(candidate);
            if path.is_file() {
                return Some(path);
            }
        }
    }
    None
}

/// Reads one line into `buf`, mapping I/O failures onto the file being read.
pub fn read_line(
    reader: &mut dyn BufRead,
    buf: &mut String,
    path: &Path,
) -> Result<usize, DatasetError> {
    buf.clear();
    reader.read_line(buf).map_err(|source| DatasetError::Io {
        path: path.to_path_buf(),
        source,
    })
}
