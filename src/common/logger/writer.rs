use std::{
    fs::{File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::Path,
    sync::{Arc, Mutex},
};

/// Appends log lines to a file and trims the oldest lines once the file
/// grows past `max_lines`.
#[derive(Clone)]
pub struct CappedFileWriter {
    path: String,
    max_lines: u32,
    written_since_trim: Arc<Mutex<u32>>,
}

impl CappedFileWriter {
    pub fn new(path: String, max_lines: u32) -> Self {
        Self {
            path,
            max_lines: max_lines.max(1),
            written_since_trim: Arc::new(Mutex::new(0)),
        }
    }

    /// Trim threshold: a tenth of the cap, never less than 50 lines.
    fn trim_every(&self) -> u32 {
        (self.max_lines / 10).max(50)
    }

    fn trim(&self) -> io::Result<()> {
        if !Path::new(&self.path).exists() {
            return Ok(());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let lines: Vec<String> = reader.lines().collect::<Result<_, _>>()?;

        let cap = self.max_lines as usize;
        if lines.len() > cap {
            let mut file = File::create(&self.path)?;
            for line in &lines[lines.len() - cap..] {
                writeln!(file, "{}", line)?;
            }
        }
        Ok(())
    }
}

impl io::Write for CappedFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(buf)?;

        let mut written = self
            .written_since_trim
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        *written += buf.iter().filter(|&&b| b == b'\n').count() as u32;

        if *written >= self.trim_every() {
            if let Err(e) = self.trim() {
                eprintln!("Failed to trim log file {}: {}", self.path, e);
            }
            *written = 0;
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CappedFileWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_is_trimmed_to_cap() {
        let path = std::env::temp_dir().join(format!(
            "nowplaying-writer-{}.log",
            uuid::Uuid::new_v4().simple()
        ));
        let path_str = path.to_string_lossy().to_string();

        let mut writer = CappedFileWriter::new(path_str.clone(), 60);
        for i in 0..120 {
            writer
                .write_all(format!("line {}\n", i).as_bytes())
                .expect("write should succeed");
        }

        let contents = std::fs::read_to_string(&path).expect("log file should exist");
        let lines: Vec<&str> = contents.lines().collect();
        assert!(lines.len() <= 110);
        assert_eq!(lines.last(), Some(&"line 119"));

        let _ = std::fs::remove_file(&path);
    }
}
