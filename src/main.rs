use cflogparser::convert::{self, Stats};
use cflogparser::output::{Format, Output};
use cflogparser::{text, Error, Input, Record, RtmpLog, WebLog};
use clap::{Parser, ValueEnum};
use log::{debug, error, info, LevelFilter};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::thread;

const CHANNEL_CAPACITY: usize = 64;

/// Converts CloudFront access logs into JSON, one object per line.
#[derive(Parser, Debug)]
#[command(name = "cflog2json", version)]
struct Cli {
    /// Parse input as RTMP distribution log
    #[arg(long)]
    rtmp: bool,

    /// Encoding of the records written to standard output
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Minimum level of diagnostic messages; overrides RUST_LOG
    #[arg(long, value_enum)]
    log_level: Option<LogLevel>,

    /// Log files to read in order; `-` or no file reads standard input
    files: Vec<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Msgpack,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Format::Json,
            OutputFormat::Msgpack => Format::MessagePack,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    let format = cli.format.into();
    let result = if cli.rtmp {
        convert_all::<RtmpLog>(&cli.files, format)
    } else {
        convert_all::<WebLog>(&cli.files, format)
    };
    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

/// Parse failures are reported at the warn level, so that is the default.
fn init_logger(level: Option<LogLevel>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level.into());
    }
    builder.init();
}

/// Converts every input as one stream. Returns `false` if any file could not
/// be opened.
fn convert_all<R: Record>(files: &[PathBuf], format: Format) -> Result<bool, Error> {
    let stdout = io::stdout();
    let mut output = Output::new(BufWriter::new(stdout.lock()), format);
    let mut total = Stats::default();
    let mut all_opened = true;

    if files.is_empty() {
        total += convert_read::<R, _, _>(io::stdin(), "-", &mut output)?;
    }
    for path in files {
        if path == Path::new("-") {
            total += convert_read::<R, _, _>(io::stdin(), "-", &mut output)?;
            continue;
        }
        match File::open(path) {
            Ok(file) => {
                debug!("reading {}", path.display());
                let source = path.display().to_string();
                total += convert_read::<R, _, _>(file, &source, &mut output)?;
            }
            Err(e) => {
                error!("cannot open {}: {}", path.display(), e);
                all_opened = false;
            }
        }
    }
    output.flush()?;

    info!(
        "{} log: {} records, {} comment lines, {} failures",
        R::NAME,
        total.records,
        total.comments,
        total.failures
    );
    Ok(all_opened)
}

/// Reads lines on a separate thread and converts them on this one, in order.
fn convert_read<R, T, W>(read: T, source: &str, output: &mut Output<W>) -> Result<Stats, Error>
where
    R: Record,
    T: Read + Send + 'static,
    W: Write,
{
    let (data_tx, data_rx) = crossbeam_channel::bounded(CHANNEL_CAPACITY);
    let (ack_tx, ack_rx) = crossbeam_channel::bounded(CHANNEL_CAPACITY);
    let input = text::Input::with_read(data_tx, ack_rx, read);
    let in_thread = thread::spawn(move || input.run());

    let stats = convert::run::<R, W>(data_rx, ack_tx, output, source);
    in_thread
        .join()
        .map_err(|_| Error::CannotFetch("reader thread panicked".into()))??;
    stats
}
