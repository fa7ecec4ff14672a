use std::io::{stdout, BufWriter, Write};

use jdeser::util::objectstream::{models::Content, parser::StreamReader};
use sha1::{Digest, Sha1};
use tracing::{info, warn};

use crate::{
    app::{
        error::RuntimeError,
        export_type::ExportType,
        input::read_input,
        options::Options,
        progress::build_progress_bar_decode,
    },
    exporters::{exporter::Exporter, json::JSON, txt::TXT},
};

/// The result of one decode session over one payload
#[derive(Debug)]
pub struct DecodedPayload<'a> {
    /// Where the payload came from
    pub source: &'a str,
    /// Number of stream bytes, after any hex or base64 was undone
    pub size: usize,
    /// SHA-1 of the stream bytes, if requested
    pub digest: Option<String>,
    pub contents: Vec<Content>,
    /// The finished session, holding the handle table used to resolve references
    pub reader: StreamReader<'a>,
}

impl DecodedPayload<'_> {
    /// Bytes left after the decoded contents
    pub fn trailing(&self) -> usize {
        self.size.saturating_sub(self.reader.offset())
    }
}

/// Stores the application state and handles application lifecycle
pub struct Config {
    /// App configuration options
    pub options: Options,
}

impl Config {
    /// Create a new instance of the application
    pub fn new(options: Options) -> Result<Config, RuntimeError> {
        if options.digest && options.export_type == ExportType::Json {
            info!("Digests are included as the `sha1` key of each JSON document");
        }
        Ok(Config { options })
    }

    /// Decode one payload's stream bytes in a fresh session
    pub fn decode<'a>(
        &self,
        source: &'a str,
        bytes: &'a [u8],
    ) -> Result<DecodedPayload<'a>, RuntimeError> {
        let digest = self
            .options
            .digest
            .then(|| hex::encode(Sha1::digest(bytes)));

        let mut reader = StreamReader::with_options(bytes, self.options.decoder);
        let contents = if self.options.decode_all {
            reader.parse_all()
        } else {
            reader.parse().map(|content| vec![content])
        }
        .map_err(|why| RuntimeError::Decode(source.to_string(), why))?;

        for diagnostic in reader.diagnostics() {
            warn!("{source}: {diagnostic}");
        }

        Ok(DecodedPayload {
            source,
            size: bytes.len(),
            digest,
            contents,
            reader,
        })
    }

    /// Read, decode, and render a single payload
    fn inspect(&self, path: &str, exporter: &mut dyn Exporter<'_>) -> Result<(), RuntimeError> {
        let captured = read_input(path)?;
        let bytes = self.options.input_format.decode(path, captured)?;
        let decoded = self.decode(path, &bytes)?;
        info!(
            "Decoded {} content elements from {path}",
            decoded.contents.len()
        );
        exporter.export(&decoded)
    }

    /// Decode every payload, reporting failures without stopping
    pub fn start(&self) -> Result<(), RuntimeError> {
        let mut out = BufWriter::new(stdout().lock());
        let mut exporter: Box<dyn Exporter<'_> + '_> = match self.options.export_type {
            ExportType::Txt => Box::new(TXT::new(&mut out)),
            ExportType::Json => Box::new(JSON::new(&mut out)),
        };

        let total = self.options.paths.len();
        let pb = build_progress_bar_decode(total as u64);
        let mut failures = 0;

        for path in &self.options.paths {
            pb.set_message(path.clone());
            if let Err(why) = self.inspect(path, exporter.as_mut()) {
                // Output errors mean stdout is gone, so there is nothing left to report to
                if let RuntimeError::Output(_) = why {
                    return Err(why);
                }
                pb.suspend(|| eprintln!("{why}"));
                failures += 1;
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        drop(exporter);
        out.flush()?;

        match failures {
            0 => Ok(()),
            _ => Err(RuntimeError::PartialFailure(failures, total)),
        }
    }
}

#[cfg(test)]
mod tests {
    use jdeser::{
        error::stream::StreamError,
        util::objectstream::{models::Value, parser::DecoderOptions},
    };

    use crate::app::{
        error::RuntimeError,
        export_type::ExportType,
        input::InputFormat,
        options::Options,
        runtime::Config,
    };

    fn fake_config(decode_all: bool, digest: bool) -> Config {
        let options = Options {
            paths: vec!["-".to_string()],
            input_format: InputFormat::Auto,
            export_type: ExportType::Txt,
            decode_all,
            decoder: DecoderOptions::default(),
            digest,
            verbosity: 0,
        };
        Config::new(options).unwrap()
    }

    #[test]
    fn can_decode_first_element() {
        let config = fake_config(false, false);
        let bytes = [0xAC, 0xED, 0x00, 0x05, 0x70, 0x70];

        let decoded = config.decode("nulls", &bytes).unwrap();

        assert_eq!(decoded.contents.len(), 1);
        assert_eq!(decoded.contents[0].as_value(), Some(&Value::Null));
        assert_eq!(decoded.trailing(), 1);
        assert_eq!(decoded.digest, None);
    }

    #[test]
    fn can_decode_all_elements() {
        let config = fake_config(true, false);
        let bytes = [0xAC, 0xED, 0x00, 0x05, 0x70, 0x70];

        let decoded = config.decode("nulls", &bytes).unwrap();

        assert_eq!(decoded.contents.len(), 2);
        assert_eq!(decoded.trailing(), 0);
    }

    #[test]
    fn can_digest_payload() {
        let config = fake_config(false, true);
        let bytes = [0xAC, 0xED, 0x00, 0x05, 0x70];

        let decoded = config.decode("null", &bytes).unwrap();

        let digest = decoded.digest.unwrap();
        assert_eq!(digest.len(), 40);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn cant_decode_bad_magic() {
        let config = fake_config(false, false);
        let bytes = [0xCA, 0xFE, 0xBA, 0xBE];

        let result = config.decode("class file", &bytes);

        assert!(matches!(
            result,
            Err(RuntimeError::Decode(source, StreamError::Framing { .. })) if source == "class file"
        ));
    }
}
