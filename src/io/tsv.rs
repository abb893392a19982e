use std::io;

use crate::error::Result;
use crate::metadata::ImageMetadata;

/// Render a float with the fewest digits that read back as the same value,
/// always keeping a fractional part. Values that are exactly representable in
/// single precision are rendered at that precision, so spacing read from a
/// NIfTI-1 header prints the way it was written.
pub fn format_float(value: f64) -> String {
    let narrowed = value as f32;
    if f64::from(narrowed) == value {
        format!("{narrowed:?}")
    } else {
        format!("{value:?}")
    }
}

fn format_tuple<T, F: Fn(&T) -> String>(values: &[T], render: F) -> String {
    let parts: Vec<String> = values.iter().map(render).collect();
    format!("({})", parts.join(", "))
}

fn format_labels(labels: &[String]) -> String {
    let parts: Vec<String> = labels
        .iter()
        .map(|s| format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect();
    format!("[{}]", parts.join(", "))
}

/// The cells of one output row, in [`ImageMetadata::FIELDS`] order
pub fn format_row(info: &ImageMetadata) -> [String; 7] {
    [
        info.protocol_name.clone().unwrap_or_default(),
        info.series_description.clone().unwrap_or_default(),
        format_tuple(&info.shape, |v| v.to_string()),
        format_tuple(&info.pixdims, |v| format_float(*v)),
        info.image_type
            .as_deref()
            .map(format_labels)
            .unwrap_or_default(),
        format_float(info.seconds),
        info.filename.to_string_lossy().into_owned(),
    ]
}

/// Writes [`ImageMetadata`] as tab-separated rows under a fixed header row.
///
/// Cells containing a tab, quote or line break are double-quoted.
pub struct TsvWriter<W: io::Write> {
    handle: csv::Writer<W>,
    wrote_header: bool,
}

impl<W: io::Write> TsvWriter<W> {
    pub fn new(file: W) -> TsvWriter<W> {
        let handle = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .terminator(csv::Terminator::Any(b'\n'))
            .quote_style(csv::QuoteStyle::Necessary)
            .from_writer(file);
        Self {
            handle,
            wrote_header: false,
        }
    }

    pub fn write_header(&mut self) -> Result<()> {
        if !self.wrote_header {
            self.handle.write_record(ImageMetadata::FIELDS)?;
            self.wrote_header = true;
        }
        Ok(())
    }

    /// Write one row, emitting the header row first if it has not been yet
    pub fn write(&mut self, info: &ImageMetadata) -> Result<()> {
        self.write_header()?;
        self.handle.write_record(format_row(info))?;
        Ok(())
    }

    pub fn write_all<'a, I: IntoIterator<Item = &'a ImageMetadata>>(&mut self, rows: I) -> Result<()> {
        self.write_header()?;
        for info in rows {
            self.write(info)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.handle.flush().map_err(|e| csv::Error::from(e).into())
    }

    pub fn into_inner(self) -> Result<W> {
        self.handle
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()).into())
    }
}
