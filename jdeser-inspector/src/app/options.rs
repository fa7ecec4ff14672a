use clap::{
    crate_description, crate_name, crate_version, value_parser, Arg, ArgAction, ArgMatches, Command,
};

use jdeser::util::objectstream::parser::DecoderOptions;

use crate::app::{
    error::RuntimeError,
    export_type::ExportType,
    input::{InputFormat, STDIN_PATH},
};

/// Default export type
pub const DEFAULT_EXPORT_TYPE: ExportType = ExportType::Txt;

// CLI Arg Names
pub const OPTION_PATHS: &str = "paths";
pub const OPTION_INPUT_FORMAT: &str = "input-format";
pub const OPTION_EXPORT_TYPE: &str = "format";
pub const OPTION_DECODE_ALL: &str = "all";
pub const OPTION_MAX_DEPTH: &str = "max-depth";
pub const OPTION_DIGEST: &str = "digest";
pub const OPTION_VERBOSE: &str = "verbose";

// Other CLI Text
pub const SUPPORTED_INPUT_FORMATS: &str = "auto, raw, hex, base64";
pub const SUPPORTED_EXPORT_TYPES: &str = "txt, json";
pub const ABOUT: &str = concat!(
    "Decodes Java object serialization streams into a readable tree\n",
    "without loading or running any of the classes they describe.\n",
    "Payloads may be raw stream bytes, hex, or base64, and may carry an RMI transport byte."
);

#[derive(Debug, PartialEq, Eq)]
pub struct Options {
    /// Payload files to decode; `-` reads stdin
    pub paths: Vec<String>,
    /// How the payloads were captured
    pub input_format: InputFormat,
    /// The type of file we are exporting data to
    pub export_type: ExportType,
    /// Decode every content element instead of only the first
    pub decode_all: bool,
    /// Settings passed to each decode session
    pub decoder: DecoderOptions,
    /// Print the SHA-1 of each payload
    pub digest: bool,
    /// How many times `-v` was passed
    pub verbosity: u8,
}

impl Options {
    pub fn from_args(args: &ArgMatches) -> Result<Self, RuntimeError> {
        let paths: Vec<String> = args
            .get_many::<String>(OPTION_PATHS)
            .map(|paths| paths.cloned().collect())
            .unwrap_or_default();
        let user_input_format = args.get_one::<String>(OPTION_INPUT_FORMAT);
        let user_export_type = args.get_one::<String>(OPTION_EXPORT_TYPE);
        let decode_all = args.get_flag(OPTION_DECODE_ALL);
        let max_depth = args.get_one::<usize>(OPTION_MAX_DEPTH).copied();
        let digest = args.get_flag(OPTION_DIGEST);
        let verbosity = args.get_count(OPTION_VERBOSE);

        if paths.is_empty() {
            return Err(RuntimeError::InvalidOptions(format!(
                "No payloads provided! Pass at least one path, or `{}` to read stdin.",
                STDIN_PATH
            )));
        }

        if paths.iter().filter(|path| *path == STDIN_PATH).count() > 1 {
            return Err(RuntimeError::InvalidOptions(
                "stdin can only be read once!".to_string(),
            ));
        }

        // Ensure the input format is valid
        let input_format = match user_input_format {
            Some(format) => InputFormat::from_cli(format).ok_or_else(|| {
                RuntimeError::InvalidOptions(format!(
                    "{format} is not a valid input format! Must be one of <{SUPPORTED_INPUT_FORMATS}>"
                ))
            })?,
            None => InputFormat::Auto,
        };

        // Ensure export type is valid
        let export_type = match user_export_type {
            Some(export_type_str) => ExportType::from_cli(export_type_str).ok_or_else(|| {
                RuntimeError::InvalidOptions(format!(
                    "{export_type_str} is not a valid export type! Must be one of <{SUPPORTED_EXPORT_TYPES}>"
                ))
            })?,
            None => DEFAULT_EXPORT_TYPE,
        };

        let mut decoder = DecoderOptions::default();
        if let Some(max_depth) = max_depth {
            if max_depth == 0 {
                return Err(RuntimeError::InvalidOptions(format!(
                    "`--{OPTION_MAX_DEPTH}` must be at least 1!"
                )));
            }
            decoder.max_depth = max_depth;
        }

        Ok(Options {
            paths,
            input_format,
            export_type,
            decode_all,
            decoder,
            digest,
            verbosity,
        })
    }
}

/// Build the command line interface
pub fn get_command() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .long_about(ABOUT)
        .arg_required_else_help(true)
        .arg(
            Arg::new(OPTION_PATHS)
                .help(format!(
                    "Payload files to decode; `{}` reads stdin\n",
                    STDIN_PATH
                ))
                .value_name("PATH")
                .num_args(1..)
                .display_order(0),
        )
        .arg(
            Arg::new(OPTION_INPUT_FORMAT)
                .short('i')
                .long(OPTION_INPUT_FORMAT)
                .help("How the payloads were captured\nIf omitted, the format is guessed per payload\n")
                .display_order(1)
                .value_name(SUPPORTED_INPUT_FORMATS),
        )
        .arg(
            Arg::new(OPTION_EXPORT_TYPE)
                .short('f')
                .long(OPTION_EXPORT_TYPE)
                .help(format!(
                    "Specify a single file format to render decoded payloads to\nIf omitted, defaults to {DEFAULT_EXPORT_TYPE}\n"
                ))
                .display_order(2)
                .value_name(SUPPORTED_EXPORT_TYPES),
        )
        .arg(
            Arg::new(OPTION_DECODE_ALL)
                .short('a')
                .long(OPTION_DECODE_ALL)
                .help("Decode every content element in the stream, i.e. each argument of an RMI call\n")
                .action(ArgAction::SetTrue)
                .display_order(3),
        )
        .arg(
            Arg::new(OPTION_MAX_DEPTH)
                .short('d')
                .long(OPTION_MAX_DEPTH)
                .help(format!(
                    "How deeply objects may nest before decoding stops\nIf omitted, defaults to {}\n",
                    DecoderOptions::default().max_depth
                ))
                .value_parser(value_parser!(usize))
                .value_name("N")
                .display_order(4),
        )
        .arg(
            Arg::new(OPTION_DIGEST)
                .short('s')
                .long(OPTION_DIGEST)
                .help("Print the SHA-1 digest of each decoded payload\n")
                .action(ArgAction::SetTrue)
                .display_order(5),
        )
        .arg(
            Arg::new(OPTION_VERBOSE)
                .short('v')
                .long(OPTION_VERBOSE)
                .help("Log more detail to stderr; repeat for more\n")
                .action(ArgAction::Count)
                .display_order(6),
        )
}
