//! Writer adapter that masks credentials in formatted log lines.

use crate::masking::SensitiveDataMasker;
use std::io;
use std::sync::Arc;
use tracing_subscriber::fmt::MakeWriter;

/// Wraps a [`MakeWriter`] so every formatted event is masked before output.
#[derive(Debug, Clone)]
pub struct MaskingMakeWriter<M> {
    inner: M,
    masker: Arc<SensitiveDataMasker>,
}

impl<M> MaskingMakeWriter<M> {
    /// Create a masking writer factory around `inner`.
    pub fn new(inner: M, masker: Arc<SensitiveDataMasker>) -> Self {
        Self { inner, masker }
    }
}

impl<'a, M> MakeWriter<'a> for MaskingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = MaskingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        MaskingWriter {
            inner: self.inner.make_writer(),
            masker: Arc::clone(&self.masker),
        }
    }
}

/// Writer produced by [`MaskingMakeWriter`].
#[derive(Debug)]
pub struct MaskingWriter<W> {
    inner: W,
    masker: Arc<SensitiveDataMasker>,
}

impl<W: io::Write> io::Write for MaskingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        let masked = self.masker.mask_string(&text);
        self.inner.write_all(masked.as_bytes())?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_writer_masks_line() {
        let mut writer = MaskingWriter {
            inner: Vec::new(),
            masker: Arc::new(SensitiveDataMasker::new()),
        };
        let line = b"refresh ok token=abcdefghijklmnopqrst\n";
        let written = writer.write(line).unwrap();
        assert_eq!(written, line.len());

        let out = String::from_utf8(writer.inner).unwrap();
        assert!(out.contains("abc***rst"));
        assert!(out.ends_with('\n'));
    }
}
