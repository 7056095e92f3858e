// Tracing subscriber installation with redacting writers
use std::io::{self, Write};
use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::{
    fmt::{self, time::ChronoUtc, MakeWriter},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::LoggerConfig;
use crate::redactor::{PiiRedactor, RedactionConfig};

#[derive(Error, Debug)]
pub enum LoggerError {
    #[error("Invalid log filter: {0}")]
    InvalidFilter(String),

    #[error("Global subscriber already installed: {0}")]
    AlreadyInitialized(String),
}

/// Writer that redacts each formatted event before it reaches the sink
pub struct RedactingWriter<W> {
    inner: W,
    redactor: Option<Arc<PiiRedactor>>,
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match &self.redactor {
            Some(redactor) => {
                let text = String::from_utf8_lossy(buf);
                self.inner.write_all(redactor.redact(&text).as_bytes())?;
                Ok(buf.len())
            }
            None => self.inner.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// `MakeWriter` producing stdout writers that redact PII
#[derive(Clone)]
pub struct RedactingMakeWriter {
    redactor: Option<Arc<PiiRedactor>>,
}

impl RedactingMakeWriter {
    pub fn new(config: &LoggerConfig) -> Self {
        let redactor = config.redact_pii.then(|| {
            Arc::new(PiiRedactor::new(
                RedactionConfig::default().with_hash_for_correlation(config.hash_for_correlation),
            ))
        });
        Self { redactor }
    }
}

impl<'a> MakeWriter<'a> for RedactingMakeWriter {
    type Writer = RedactingWriter<io::Stdout>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: io::stdout(),
            redactor: self.redactor.clone(),
        }
    }
}

/// Build the env filter: `RUST_LOG` wins, then the configured level
pub fn build_filter(config: &LoggerConfig) -> Result<EnvFilter, LoggerError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(format!(
            "{level},tower_http=info,sqlx=warn,hyper=info",
            level = config.level
        ))
        .map_err(|e| LoggerError::InvalidFilter(e.to_string())),
    }
}

/// Install the global tracing subscriber
pub fn init_tracing(config: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = build_filter(config)?;
    let writer = RedactingMakeWriter::new(config);

    let result = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false)
                    .with_writer(writer)
                    .json(),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init()
    };

    result.map_err(|e| LoggerError::AlreadyInitialized(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacting_writer_masks_output() {
        let redactor = Arc::new(PiiRedactor::new(
            RedactionConfig::default().with_hash_for_correlation(false),
        ));
        let mut writer = RedactingWriter {
            inner: Vec::new(),
            redactor: Some(redactor),
        };
        writer.write_all(b"call 09121234567 now\n").unwrap();
        assert_eq!(String::from_utf8(writer.inner).unwrap(), "call 09********* now\n");
    }

    #[test]
    fn test_writer_passthrough_when_disabled() {
        let mut writer = RedactingWriter {
            inner: Vec::new(),
            redactor: None,
        };
        writer.write_all(b"call 09121234567 now").unwrap();
        assert_eq!(String::from_utf8(writer.inner).unwrap(), "call 09121234567 now");
    }

    #[test]
    fn test_filter_from_config() {
        let config = LoggerConfig {
            level: "debug".to_string(),
            ..LoggerConfig::default()
        };
        assert!(build_filter(&config).is_ok());
    }
}
