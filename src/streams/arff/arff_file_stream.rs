use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use crate::streams::Stream;
use crate::streams::arff::parser::{is_comment_or_empty, parse_data_line, parse_header};
use std::fs::File;
use std::io::{BufRead, BufReader, Error, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::Arc;

/// Streams instances out of an ARFF file, one row at a time. Dense and
/// sparse rows are both accepted; malformed rows are reported and skipped so
/// a single bad line cannot end a long run.
#[derive(Debug)]
pub struct ArffFileStream {
    path: PathBuf,
    reader: BufReader<File>,
    header: Arc<InstanceHeader>,
    data_start_pos: u64,
    next_line: Option<String>,
    finished: bool,
}

impl ArffFileStream {
    pub fn new(path: PathBuf, class_index: Option<usize>) -> Result<Self, Error> {
        let file = File::open(&path)?;
        let mut reader = BufReader::new(file);

        let (header, data_start_pos) = parse_header(&mut reader, class_index)?;

        let mut stream = ArffFileStream {
            path,
            reader,
            header: Arc::new(header),
            data_start_pos,
            next_line: None,
            finished: false,
        };
        stream.fill_next_line()?;
        Ok(stream)
    }

    fn fill_next_line(&mut self) -> Result<(), Error> {
        if self.finished {
            self.next_line = None;
            return Ok(());
        }
        let mut line = String::new();
        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                self.finished = true;
                self.next_line = None;
                return Ok(());
            }
            if !is_comment_or_empty(&line) {
                self.next_line = Some(line.trim().to_string());
                return Ok(());
            }
        }
    }
}

impl Stream for ArffFileStream {
    fn header(&self) -> &InstanceHeader {
        &self.header
    }

    fn has_more_instances(&self) -> bool {
        !self.finished || self.next_line.is_some()
    }

    fn next_instance(&mut self) -> Option<Box<dyn Instance>> {
        let line = self.next_line.take()?;
        if self.fill_next_line().is_err() {
            self.finished = true;
        }

        match parse_data_line(&self.header, &line) {
            Ok(instance) => Some(instance),
            Err(e) => {
                eprintln!("invalid data in line '{line}': {e}");
                self.next_instance()
            }
        }
    }

    fn restart(&mut self) -> Result<(), Error> {
        self.reader = BufReader::new(File::open(&self.path)?);
        self.reader.seek(SeekFrom::Start(self.data_start_pos))?;
        self.finished = false;
        self.next_line = None;
        self.fill_next_line()?;
        Ok(())
    }
}
