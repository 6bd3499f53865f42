use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use crate::error::SessionError;
use crate::source::SampleBlock;
/// Append-only sink for pulled sample blocks.
///
/// One line per sample, tab separated: global sample index first, then the
/// channel values in device order. The file is opened in append mode so
/// repeated start/stop cycles against the same path keep accumulating, never
/// truncating earlier data.
pub struct SessionRecorder {
    path: PathBuf,
    writer: BufWriter<std::fs::File>,
}
impl SessionRecorder {
    pub fn open(path: &Path) -> Result<Self, SessionError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(SessionError::DurableWrite)?;
        log::debug!("recording to {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
        })
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    /// Writes the block's samples in pull order, starting at `start_index`.
    /// Flushes before returning so the block is durable once we report Ok.
    pub fn append(&mut self, start_index: u64, block: &SampleBlock) -> Result<(), SessionError> {
        for i in 0..block.count() {
            write!(self.writer, "{}", start_index + i as u64).map_err(SessionError::DurableWrite)?;
            for channel in &block.channels {
                write!(self.writer, "\t{:.6}", channel[i]).map_err(SessionError::DurableWrite)?;
            }
            writeln!(self.writer).map_err(SessionError::DurableWrite)?;
        }
        self.writer.flush().map_err(SessionError::DurableWrite)
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("neuroback-recorder-{tag}-{}.tsv", std::process::id()))
    }
    #[test]
    fn writes_one_tab_separated_line_per_sample() {
        let path = temp_path("lines");
        let _ = fs::remove_file(&path);
        let mut recorder = SessionRecorder::open(&path).unwrap();
        let block = SampleBlock {
            channels: vec![vec![1.0, 2.0], vec![-3.5, 4.25]],
        };
        recorder.append(10, &block).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "10\t1.000000\t-3.500000");
        assert_eq!(lines[1], "11\t2.000000\t4.250000");
        let _ = fs::remove_file(&path);
    }
    #[test]
    fn reopening_appends_instead_of_truncating() {
        let path = temp_path("append");
        let _ = fs::remove_file(&path);
        let block = SampleBlock {
            channels: vec![vec![1.0]],
        };
        {
            let mut recorder = SessionRecorder::open(&path).unwrap();
            recorder.append(0, &block).unwrap();
        }
        {
            let mut recorder = SessionRecorder::open(&path).unwrap();
            recorder.append(1, &block).unwrap();
        }
        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 2);
        let _ = fs::remove_file(&path);
    }
    #[test]
    fn empty_block_writes_nothing() {
        let path = temp_path("empty");
        let _ = fs::remove_file(&path);
        let mut recorder = SessionRecorder::open(&path).unwrap();
        recorder.append(0, &SampleBlock::empty(4)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
        let _ = fs::remove_file(&path);
    }
}
