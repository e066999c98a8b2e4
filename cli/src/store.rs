use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tilesweep_core::SaveStore;

/// Save store backed by a single file on disk.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    writer: Option<BufWriter<File>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reader: None,
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn not_open(mode: &str) -> io::Error {
    io::Error::other(format!("save file is not open for {mode}"))
}

impl SaveStore for FileStore {
    fn open_reader(&mut self) -> io::Result<()> {
        self.close()?;
        self.reader = Some(BufReader::new(File::open(&self.path)?));
        Ok(())
    }

    fn read_byte(&mut self) -> io::Result<u8> {
        let reader = self.reader.as_mut().ok_or_else(|| not_open("reading"))?;
        let mut byte = [0];
        reader.read_exact(&mut byte)?;
        Ok(byte[0])
    }

    fn open_writer(&mut self) -> io::Result<()> {
        self.close()?;
        self.writer = Some(BufWriter::new(File::create(&self.path)?));
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> io::Result<()> {
        let writer = self.writer.as_mut().ok_or_else(|| not_open("writing"))?;
        writer.write_all(&[byte])
    }

    fn close(&mut self) -> io::Result<()> {
        self.reader = None;
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }
}
