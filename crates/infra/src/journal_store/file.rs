use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{error, warn};

use carworks_core::{AggregateId, ExpectedVersion};

use super::r#trait::{JournalStore, JournalStoreError, StoredEvent, check_append};

/// Journal store backed by a JSON-lines file.
///
/// Every stored event is one line. A batch is written with a single write
/// and one `sync_data` before `append` returns, so an acknowledged batch
/// survives a crash. A failed write is cut back off the file. Streams of
/// several aggregates may share one file.
#[derive(Debug)]
pub struct JsonLinesJournalStore {
    path: PathBuf,
    /// What the file holds as far as this store knows; guards the file too.
    index: Mutex<FileIndex>,
}

#[derive(Debug, Default)]
struct FileIndex {
    streams: HashMap<AggregateId, StreamHead>,
    /// File length after the last append this store completed.
    len: u64,
}

#[derive(Debug)]
struct StreamHead {
    len: u64,
    aggregate_type: String,
}

impl JsonLinesJournalStore {
    /// Open (or lazily create) the journal file at `path`.
    ///
    /// A last line without its newline is what an interrupted append leaves
    /// behind. It was never acknowledged and is cut off.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, JournalStoreError> {
        let path = path.into();
        let index = index_file(&path)?;
        Ok(Self {
            path,
            index: Mutex::new(index),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl JournalStore for JsonLinesJournalStore {
    fn append(
        &self,
        events: Vec<StoredEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<(), JournalStoreError> {
        let Some(first) = events.first() else {
            return Ok(());
        };
        let aggregate_id = first.aggregate_id;

        let mut index = self
            .index
            .lock()
            .map_err(|_| JournalStoreError::LockPoisoned)?;

        // Bytes this store never acknowledged, e.g. from a failed write that
        // still landed. Re-read the file before deciding anything.
        if file_len(&self.path)? != index.len {
            warn!(path = %self.path.display(), "journal file changed; re-indexing");
            *index = index_file(&self.path)?;
        }

        let head = index.streams.get(&aggregate_id);
        check_append(
            head.map_or(0, |h| h.len),
            head.map(|h| h.aggregate_type.as_str()),
            &events,
            expected_version,
        )?;

        let mut batch = Vec::new();
        for event in &events {
            serde_json::to_writer(&mut batch, event)
                .map_err(|e| JournalStoreError::Serialization(e.to_string()))?;
            batch.push(b'\n');
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let intact_len = index.len;

        if let Err(err) = file.write_all(&batch).and_then(|()| file.sync_data()) {
            if let Err(rollback) = file.set_len(intact_len).and_then(|()| file.sync_data()) {
                error!(
                    path = %self.path.display(),
                    error = %rollback,
                    "cannot cut failed append off the journal file"
                );
            }
            return Err(err.into());
        }

        index.len = intact_len + batch.len() as u64;
        let head = index
            .streams
            .entry(aggregate_id)
            .or_insert_with(|| StreamHead {
                len: 0,
                aggregate_type: events[0].aggregate_type.clone(),
            });
        head.len += events.len() as u64;
        Ok(())
    }

    fn load(&self, aggregate_id: AggregateId) -> Result<Vec<StoredEvent>, JournalStoreError> {
        let _guard = self
            .index
            .lock()
            .map_err(|_| JournalStoreError::LockPoisoned)?;

        let mut stream: Vec<StoredEvent> = read_lines(&self.path)?
            .events
            .into_iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .collect();
        stream.sort_by_key(|e| e.position);
        Ok(stream)
    }
}

fn file_len(path: &Path) -> Result<u64, JournalStoreError> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(meta.len()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(0),
        Err(err) => Err(err.into()),
    }
}

/// Read the file, cut off a torn last line and index every stream.
fn index_file(path: &Path) -> Result<FileIndex, JournalStoreError> {
    let contents = read_lines(path)?;
    if contents.torn_tail {
        warn!(
            path = %path.display(),
            intact_len = contents.intact_len,
            "dropping torn last line of journal file"
        );
        let file = OpenOptions::new().write(true).open(path)?;
        file.set_len(contents.intact_len)?;
        file.sync_data()?;
    }

    let mut streams: HashMap<AggregateId, StreamHead> = HashMap::new();
    for event in contents.events {
        let head = streams
            .entry(event.aggregate_id)
            .or_insert_with(|| StreamHead {
                len: 0,
                aggregate_type: event.aggregate_type.clone(),
            });
        head.len += 1;
    }

    Ok(FileIndex {
        streams,
        len: contents.intact_len,
    })
}

#[derive(Debug, Default)]
struct FileContents {
    events: Vec<StoredEvent>,
    /// Length of the prefix made of complete lines.
    intact_len: u64,
    torn_tail: bool,
}

fn read_lines(path: &Path) -> Result<FileContents, JournalStoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(FileContents::default()),
        Err(err) => return Err(err.into()),
    };

    let mut reader = BufReader::new(file);
    let mut contents = FileContents::default();
    let mut line = Vec::new();
    let mut line_no = 0usize;
    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line)?;
        if read == 0 {
            break;
        }
        line_no += 1;
        if line.last() != Some(&b'\n') {
            contents.torn_tail = true;
            break;
        }
        if !line.trim_ascii().is_empty() {
            let event = serde_json::from_slice(&line).map_err(|e| {
                JournalStoreError::Serialization(format!("line {line_no}: {e}"))
            })?;
            contents.events.push(event);
        }
        contents.intact_len += read as u64;
    }
    Ok(contents)
}
