//! Indexed container output.
//!
//! A compiled bundle is two files in one directory: `data.json`, a JSON array
//! holding every payload on its own line, and `index.json`, mapping each
//! resource id to `[offset, length, cache]` of its payload bytes inside
//! `data.json`. The offsets exclude the separators, so a consumer can seek
//! and slice one payload without parsing the array.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// Name of the payload file inside the output directory.
pub const DATA_FILE: &str = "data.json";

/// Name of the index file inside the output directory.
pub const INDEX_FILE: &str = "index.json";

/// Streams payloads into `data.json` while accumulating `index.json`.
///
/// Dropping an unclosed writer truncates both files, so an aborted pass
/// leaves no partial container behind.
pub struct ContainerWriter {
    data: File,
    index_file: File,
    index: IndexMap<String, (u64, u64, u8)>,
    position: u64,
    closed: bool,
}

impl ContainerWriter {
    /// Create (or truncate) both container files and write the array prologue.
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        let mut data = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(dir.join(DATA_FILE))?;
        let index_file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(dir.join(INDEX_FILE))?;
        data.write_all(b"[")?;
        Ok(ContainerWriter {
            data,
            index_file,
            index: IndexMap::new(),
            position: 1,
            closed: false,
        })
    }

    /// Append one payload and record its region under `id`.
    pub fn write(&mut self, id: &str, payload: &str, cache: bool) -> Result<()> {
        if self.closed {
            return Err(Error::ContainerState {
                reason: "write after close".to_owned(),
            });
        }
        if self.index.contains_key(id) {
            return Err(Error::duplicate(
                format!("container.{id}"),
                "already written",
            ));
        }
        let sep: &[u8] = if self.index.is_empty() { b"\n" } else { b",\n" };
        self.data.write_all(sep)?;
        let offset = self.position + sep.len() as u64;
        self.data.write_all(payload.as_bytes())?;
        self.position = offset + payload.len() as u64;
        self.index
            .insert(id.to_owned(), (offset, payload.len() as u64, u8::from(cache)));
        Ok(())
    }

    /// Finish the array, flush `data.json`, and write the index object.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::ContainerState {
                reason: "already closed".to_owned(),
            });
        }
        self.data.write_all(b"\n]")?;
        self.data.flush()?;
        let index = serde_json::to_string(&self.index).map_err(std::io::Error::other)?;
        self.index_file.write_all(index.as_bytes())?;
        self.index_file.flush()?;
        self.closed = true;
        Ok(())
    }

    /// Discard everything written so far, leaving both files empty.
    pub fn abort(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::ContainerState {
                reason: "already closed".to_owned(),
            });
        }
        self.data.set_len(0)?;
        self.index_file.set_len(0)?;
        self.closed = true;
        Ok(())
    }
}

impl Drop for ContainerWriter {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(dir: &Path, name: &str) -> String {
        std::fs::read_to_string(dir.join(name)).unwrap()
    }

    #[test]
    fn exact_bytes_of_a_two_payload_container() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = ContainerWriter::create(dir.path()).unwrap();
        w.write("R.1", "{\"a\":1}", true).unwrap();
        w.write("R.2", "{\"b\":2}", false).unwrap();
        w.close().unwrap();

        assert_eq!(read(dir.path(), DATA_FILE), "[\n{\"a\":1},\n{\"b\":2}\n]");
        assert_eq!(
            read(dir.path(), INDEX_FILE),
            "{\"R.1\":[2,7,1],\"R.2\":[11,7,0]}"
        );
    }

    #[test]
    fn index_regions_slice_their_payloads() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = ContainerWriter::create(dir.path()).unwrap();
        w.write("R.1", "{\"a\":1}", false).unwrap();
        w.write("R.2", "{\"bb\":22}", false).unwrap();
        w.write("R.3", "{}", true).unwrap();
        w.close().unwrap();

        let data = read(dir.path(), DATA_FILE);
        let index: IndexMap<String, (usize, usize, u8)> =
            serde_json::from_str(&read(dir.path(), INDEX_FILE)).unwrap();
        assert_eq!(index["R.1"].0 + index["R.1"].1, index["R.2"].0 - 2);
        for (id, (offset, len, _)) in &index {
            let slice = &data[*offset..offset + len];
            let value: serde_json::Value = serde_json::from_str(slice).unwrap();
            assert!(value.is_object(), "{id} region is not one payload");
        }
        let whole: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(whole.as_array().unwrap().len(), 3);
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = ContainerWriter::create(dir.path()).unwrap();
        w.write("R.1", "{}", false).unwrap();
        let err = w.write("R.1", "{}", false).unwrap_err();
        assert!(matches!(err, Error::Duplicate { .. }));
        w.close().unwrap();
    }

    #[test]
    fn use_after_close_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = ContainerWriter::create(dir.path()).unwrap();
        w.close().unwrap();
        assert!(matches!(
            w.write("R.1", "{}", false),
            Err(Error::ContainerState { .. })
        ));
        assert!(matches!(w.close(), Err(Error::ContainerState { .. })));
    }

    #[test]
    fn abort_leaves_both_files_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = ContainerWriter::create(dir.path()).unwrap();
        w.write("R.1", "{\"a\":1}", false).unwrap();
        w.abort().unwrap();
        assert_eq!(read(dir.path(), DATA_FILE), "");
        assert_eq!(read(dir.path(), INDEX_FILE), "");
    }

    #[test]
    fn drop_without_close_aborts() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut w = ContainerWriter::create(dir.path()).unwrap();
            w.write("R.1", "{\"a\":1}", false).unwrap();
        }
        assert_eq!(read(dir.path(), DATA_FILE), "");
        assert_eq!(read(dir.path(), INDEX_FILE), "");
    }
}
