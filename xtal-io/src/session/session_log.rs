//! Session logs are JSON Lines files: a header object on the first line, then
//! one JSON array of compact events per serviced frame.

use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::events::{CompactEvent, Size};

pub const SESSION_FORMAT_VERSION: &str = "1";

pub type FrameEntry = Vec<CompactEvent>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionHeader {
    pub version: String,
    pub fps: f32,
    pub surface_size: Size,
    pub created_at: String,
}

impl SessionHeader {
    pub fn new(fps: f32, surface_size: Size) -> Self {
        Self {
            version: SESSION_FORMAT_VERSION.to_string(),
            fps,
            surface_size,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionLog {
    header: SessionHeader,
    frames: Vec<FrameEntry>,
}

impl SessionLog {
    pub fn new(header: SessionHeader) -> Self {
        Self {
            header,
            frames: Vec::new(),
        }
    }

    pub fn header(&self) -> &SessionHeader {
        &self.header
    }

    pub fn frames(&self) -> &[FrameEntry] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&[CompactEvent]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn push_frame(&mut self, entry: FrameEntry) {
        self.frames.push(entry);
    }

    /// Reads a log sequentially. A frame line that fails to parse ends the
    /// log there; everything before it is kept.
    pub fn from_reader(reader: impl BufRead) -> Result<Self, Box<dyn Error>> {
        let mut lines = reader.lines().enumerate();

        let header = loop {
            match lines.next() {
                Some((_, line)) => {
                    let line = line?;
                    if line.trim().is_empty() {
                        continue;
                    }
                    break serde_json::from_str::<SessionHeader>(&line)
                        .map_err(|err| {
                            format!("invalid session header: {}", err)
                        })?;
                }
                None => return Err("session log has no header".into()),
            }
        };

        if header.version != SESSION_FORMAT_VERSION {
            warn!(
                "Session log version {} differs from {}",
                header.version, SESSION_FORMAT_VERSION
            );
        }

        let mut log = SessionLog::new(header);

        for (index, line) in lines {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!("Session log unreadable at line {}: {}", index + 1, err);
                    break;
                }
            };

            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<FrameEntry>(&line) {
                Ok(entry) => log.push_frame(entry),
                Err(err) => {
                    warn!("Session log truncated at line {}: {}", index + 1, err);
                    break;
                }
            }
        }

        Ok(log)
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn write_to(&self, mut writer: impl Write) -> Result<(), Box<dyn Error>> {
        serde_json::to_writer(&mut writer, &self.header)?;
        writer.write_all(b"\n")?;
        for entry in &self.frames {
            serde_json::to_writer(&mut writer, entry)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), Box<dyn Error>> {
        if let Some(parent_dir) = path.parent() {
            fs::create_dir_all(parent_dir)?;
        }
        self.write_to(BufWriter::new(File::create(path)?))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionStats {
    pub frames_written: u64,
    pub path: PathBuf,
}

/// Append-only writer. Frames go to a `.part` file next to the target which
/// is renamed into place by [`SessionWriter::finish`]. The header must be
/// written before the first frame.
pub struct SessionWriter {
    writer: BufWriter<File>,
    part_path: PathBuf,
    target: PathBuf,
    header_written: bool,
    frames_written: u64,
}

impl SessionWriter {
    /// Opens the `.part` file without writing anything to it.
    pub fn open(target: &Path) -> io::Result<Self> {
        if let Some(parent_dir) = target.parent() {
            if !parent_dir.as_os_str().is_empty() {
                fs::create_dir_all(parent_dir)?;
            }
        }

        Self::open_part(part_path_for(target), target)
    }

    /// [`SessionWriter::open`] followed by the header. Nothing is left on
    /// disk if the header cannot be written.
    pub fn create(target: &Path, header: &SessionHeader) -> io::Result<Self> {
        let writer = Self::open(target)?;
        writer.with_header(header)
    }

    fn open_part(part_path: PathBuf, target: &Path) -> io::Result<Self> {
        let file = File::create(&part_path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            part_path,
            target: target.to_path_buf(),
            header_written: false,
            frames_written: 0,
        })
    }

    fn with_header(mut self, header: &SessionHeader) -> io::Result<Self> {
        match self.write_header(header) {
            Ok(()) => Ok(self),
            Err(err) => {
                if let Err(remove_err) = self.discard() {
                    warn!("Unable to remove partial session log: {}", remove_err);
                }
                Err(err)
            }
        }
    }

    pub fn write_header(&mut self, header: &SessionHeader) -> io::Result<()> {
        if self.header_written {
            return Err(io::Error::new(
                ErrorKind::InvalidInput,
                "session header already written",
            ));
        }
        serde_json::to_writer(&mut self.writer, header)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        self.header_written = true;
        Ok(())
    }

    pub fn part_path(&self) -> &Path {
        &self.part_path
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    pub fn append_frame(&mut self, events: &[CompactEvent]) -> io::Result<()> {
        self.require_header()?;
        serde_json::to_writer(&mut self.writer, events)?;
        self.writer.write_all(b"\n")?;
        self.frames_written += 1;
        Ok(())
    }

    /// Flushes and renames the `.part` file onto the target. On error the
    /// `.part` file is left where it is.
    pub fn finish(self) -> io::Result<SessionStats> {
        self.require_header()?;
        let SessionWriter {
            writer,
            part_path,
            target,
            frames_written,
            ..
        } = self;

        let file = writer.into_inner().map_err(|err| err.into_error())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&part_path, &target)?;

        Ok(SessionStats {
            frames_written,
            path: target,
        })
    }

    /// Closes and deletes the `.part` file.
    pub fn discard(self) -> io::Result<()> {
        let SessionWriter { writer, part_path, .. } = self;
        drop(writer);
        match fs::remove_file(&part_path) {
            Err(err) if err.kind() != ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }

    fn require_header(&self) -> io::Result<()> {
        if self.header_written {
            Ok(())
        } else {
            Err(io::Error::new(
                ErrorKind::InvalidInput,
                "session header not written",
            ))
        }
    }
}

fn part_path_for(target: &Path) -> PathBuf {
    static PART_COUNTER: AtomicU64 = AtomicU64::new(0);
    let n = PART_COUNTER.fetch_add(1, Ordering::Relaxed);
    let file_name = target
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "session".to_string());
    target.with_file_name(format!(
        "{}.{}-{}.part",
        file_name,
        std::process::id(),
        n
    ))
}
