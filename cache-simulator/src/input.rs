//! Trace input for cache simulation
//!
//! Traces are directories of `.csv`, `.log` or `.txt` files holding one
//! request per line as `timestamp,key,size[,ttl]`. Files are replayed in name
//! order and streamed one request at a time, so memory stays proportional to
//! the caches rather than to the trace.
//!
//! Keys that parse as `u64` are used as object ids directly. Any other key is
//! hashed with a fixed-seed `ahash` state, so two runs over the same trace
//! see the same ids.

use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use ahash::RandomState;
use sieve_size::{ObjId, Request};

use crate::error::{Result, SimulatorError};

const KEY_SEEDS: [u64; 4] = [
    0x243F_6A88_85A3_08D3,
    0x1319_8A2E_0370_7344,
    0xA409_3822_299F_31D0,
    0x082E_FA98_EC4E_6C89,
];

/// Maps trace keys to object ids.
#[derive(Debug, Clone)]
pub struct KeyMapper {
    hasher: RandomState,
}

impl KeyMapper {
    pub fn new() -> Self {
        let [k0, k1, k2, k3] = KEY_SEEDS;
        Self {
            hasher: RandomState::with_seeds(k0, k1, k2, k3),
        }
    }

    #[inline]
    pub fn id_for(&self, key: &str) -> ObjId {
        match key.parse::<u64>() {
            Ok(id) => id,
            Err(_) => self.hasher.hash_one(key),
        }
    }
}

impl Default for KeyMapper {
    fn default() -> Self {
        Self::new()
    }
}

/// One parsed trace line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRecord {
    /// Unix seconds; only validated, replay order is file order.
    pub timestamp: u64,
    pub id: ObjId,
    pub size: u64,
}

impl TraceRecord {
    pub fn request(&self) -> Request {
        Request::new(self.id, self.size)
    }
}

/// Reader for a directory of trace files
#[derive(Debug, Clone)]
pub struct LogReader {
    input_dir: PathBuf,
    keys: KeyMapper,
}

impl LogReader {
    pub fn new<P: AsRef<Path>>(input_dir: P) -> Self {
        Self {
            input_dir: input_dir.as_ref().to_path_buf(),
            keys: KeyMapper::new(),
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    /// All trace files in the input directory, sorted by name
    pub fn get_log_files(&self) -> Result<Vec<PathBuf>> {
        let entries =
            fs::read_dir(&self.input_dir).map_err(|e| SimulatorError::io(&self.input_dir, e))?;

        let mut log_files = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| SimulatorError::io(&self.input_dir, e))?
                .path();
            if !path.is_file() {
                continue;
            }
            let is_trace = path
                .extension()
                .is_some_and(|ext| ext == "csv" || ext == "log" || ext == "txt");
            if is_trace {
                log_files.push(path);
            }
        }

        log_files.sort();
        Ok(log_files)
    }

    /// Parses one line. Blank lines, `#` comments and a header on the first
    /// line yield `Ok(None)`.
    fn parse_line(
        keys: &KeyMapper,
        line: &str,
        line_num: usize,
    ) -> std::result::Result<Option<TraceRecord>, String> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || (line_num == 0 && line.contains("timestamp"))
        {
            return Ok(None);
        }

        let mut parts = line.splitn(4, ',');

        let ts_str = parts.next().unwrap_or_default().trim();
        let timestamp = ts_str
            .parse::<u64>()
            .map_err(|_| format!("invalid timestamp {ts_str:?}"))?;

        let key = parts
            .next()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or("missing key")?;

        let size_str = parts.next().ok_or("missing size")?.trim();
        let size = size_str
            .parse::<u64>()
            .map_err(|_| format!("invalid size {size_str:?}"))?;

        // The ttl column is accepted and ignored.
        Ok(Some(TraceRecord {
            timestamp,
            id: keys.id_for(key),
            // Zero-byte objects would never count against the capacity.
            size: size.max(1),
        }))
    }

    /// Streams every request of every trace file, in file order.
    pub fn stream_requests(&self) -> Result<RequestIterator> {
        let log_files = self.get_log_files()?;
        Ok(RequestIterator::new(log_files, self.keys.clone()))
    }
}

/// Streaming iterator over the requests of several trace files
#[derive(Debug)]
pub struct RequestIterator {
    files: Vec<PathBuf>,
    keys: KeyMapper,
    current_file_index: usize,
    current_reader: Option<BufReader<File>>,
    current_line_num: usize,
    line_buffer: String,
}

impl RequestIterator {
    fn new(files: Vec<PathBuf>, keys: KeyMapper) -> Self {
        Self {
            files,
            keys,
            current_file_index: 0,
            current_reader: None,
            current_line_num: 0,
            line_buffer: String::with_capacity(256),
        }
    }

    fn current_path(&self) -> PathBuf {
        self.files
            .get(self.current_file_index.saturating_sub(1))
            .cloned()
            .unwrap_or_default()
    }

    /// Opens the next file; `Ok(false)` once every file was read.
    fn open_next_file(&mut self) -> Result<bool> {
        let Some(path) = self.files.get(self.current_file_index) else {
            return Ok(false);
        };
        let file = File::open(path).map_err(|e| SimulatorError::io(path, e))?;
        tracing::debug!(file = %path.display(), "reading trace file");

        self.current_reader = Some(BufReader::with_capacity(1024 * 1024, file));
        self.current_line_num = 0;
        self.current_file_index += 1;
        Ok(true)
    }
}

impl Iterator for RequestIterator {
    type Item = Result<TraceRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_reader.is_none() {
                match self.open_next_file() {
                    Ok(true) => {}
                    Ok(false) => return None,
                    Err(e) => return Some(Err(e)),
                }
            }

            let reader = self.current_reader.as_mut()?;
            self.line_buffer.clear();
            match reader.read_line(&mut self.line_buffer) {
                Ok(0) => {
                    self.current_reader = None;
                }
                Ok(_) => {
                    let line_num = self.current_line_num;
                    self.current_line_num += 1;

                    match LogReader::parse_line(&self.keys, &self.line_buffer, line_num) {
                        Ok(Some(record)) => return Some(Ok(record)),
                        Ok(None) => {}
                        Err(message) => {
                            return Some(Err(SimulatorError::Parse {
                                path: self.current_path(),
                                line: line_num + 1,
                                message,
                            }))
                        }
                    }
                }
                Err(e) => return Some(Err(SimulatorError::io(self.current_path(), e))),
            }
        }
    }
}
