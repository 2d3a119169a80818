use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use filetime::FileTime;

use tarbox::{EntryType, ReadOptions, ScanMode, SourceOptions, Trailer, WriteOptions};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Turn debugging information on. Repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    debug: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write a single entry to a new archive.
    Write {
        /// Path to the output archive file.
        #[arg(short, long)]
        archive: PathBuf,
        /// Name stored in the archive; regular-file content is read from it.
        #[arg(short, long)]
        source: String,
        /// Size in bytes. Taken from the source file when omitted.
        #[arg(long)]
        size: Option<u64>,
        /// Modification time in Unix seconds. Taken from the source file when omitted.
        #[arg(long)]
        mtime: Option<i64>,
        /// Entry type: 0 for a regular file, 5 for a directory.
        #[arg(short = 't', long = "type", default_value = "0", value_parser = parse_entry_type)]
        entry_type: EntryType,
        #[command(flatten)]
        write: WriteFlags,
    },
    /// Write every entry listed in a manifest to a new archive.
    WriteManifest {
        /// Path to the output archive file.
        #[arg(short, long)]
        archive: PathBuf,
        /// Manifest with one `sourceRef:archiveName:size:modifiedTime:entryType` line per entry.
        #[arg(short, long)]
        manifest: PathBuf,
        #[command(flatten)]
        write: WriteFlags,
    },
    /// Pack up files and directories to create an archive.
    Create {
        /// Path to the output archive file.
        #[arg(short, long)]
        archive: PathBuf,
        /// Store only the file name of each input, not its full path.
        #[arg(long)]
        flat: bool,
        /// Files or directories to pack up.
        #[arg(required(true))]
        input_files: Vec<PathBuf>,
        #[command(flatten)]
        write: WriteFlags,
    },
    /// List the entries of an archive.
    List {
        /// Path to the archive file.
        #[arg(short, long)]
        archive: PathBuf,
        #[command(flatten)]
        read: ReadFlags,
    },
    /// Unpack all entries from an archive.
    Extract {
        /// Path to the archive file.
        #[arg(short, long)]
        archive: PathBuf,
        /// Destination directory where all of the contents will be unpacked.
        #[arg(short, long, default_value = ".")]
        output_path: PathBuf,
        /// Replace files that already exist.
        #[arg(long)]
        overwrite: bool,
        #[command(flatten)]
        read: ReadFlags,
    },
}

#[derive(Args)]
struct WriteFlags {
    /// End-of-archive padding.
    #[arg(long, default_value_t, value_enum)]
    trailer: Trailer,
    /// Compress the archive with gzip.
    #[arg(short = 'z', long)]
    gzip: bool,
    /// Directory that source names are resolved against.
    #[arg(long)]
    source_root: Option<PathBuf>,
    /// Do not decrement directory checksums (the POSIX behaviour is the default on Unix).
    #[arg(long)]
    no_posix_adjust: bool,
}

impl WriteFlags {
    fn options(&self) -> WriteOptions {
        WriteOptions {
            trailer: self.trailer,
            posix_adjust: cfg!(unix) && !self.no_posix_adjust,
            gzip: self.gzip,
            source_root: self.source_root.clone(),
        }
    }
}

#[derive(Args)]
struct ReadFlags {
    /// Only scan the first SIZE bytes of the (decompressed) archive.
    #[arg(long)]
    size: Option<u64>,
    /// Print a summary line and extra detail.
    #[arg(short, long)]
    verbose: bool,
    /// How header offsets are found.
    #[arg(long, default_value_t, value_enum)]
    scan: ScanMode,
    /// Fail on headers whose checksum does not match.
    #[arg(long)]
    strict: bool,
}

impl ReadFlags {
    fn options(&self, destination: PathBuf) -> ReadOptions {
        ReadOptions {
            scan_mode: self.scan,
            verify_checksums: self.strict,
            destination,
        }
    }
}

fn parse_entry_type(value: &str) -> Result<EntryType, String> {
    value
        .parse::<u8>()
        .ok()
        .and_then(EntryType::from_code)
        .ok_or_else(|| format!("{} is not an entry type; use 0 (file) or 5 (directory)", value))
}

fn init_logging(debug: u8) {
    let level = match debug {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let mut builder = colog::default_builder();
    builder.filter_level(level);
    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {:#}", error);
            let status = error
                .downcast_ref::<tarbox::Error>()
                .map(tarbox::Error::status_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(status).unwrap_or(1))
        }
    }
}

fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Write {
            archive,
            source,
            size,
            mtime,
            entry_type,
            write,
        } => {
            let options = write.options();
            let (size, mtime) = match (size, mtime) {
                (Some(size), Some(mtime)) => (size, mtime),
                _ => {
                    let path = options.resolve(&source);
                    let metadata = fs::metadata(&path).with_context(|| {
                        format!("Unable to read metadata of: {}", path.display())
                    })?;
                    let file_size = if metadata.is_dir() { 0 } else { metadata.len() };
                    let file_mtime = FileTime::from_last_modification_time(&metadata);
                    (
                        size.unwrap_or(file_size),
                        mtime.unwrap_or(file_mtime.unix_seconds()),
                    )
                }
            };
            log::info!(
                "Creating an archive at {}, for {} {}",
                archive.display(),
                entry_type,
                source
            );
            tarbox::write_entry(&archive, &source, size, mtime, entry_type, &options)?;
        }
        Command::WriteManifest {
            archive,
            manifest,
            write,
        } => {
            let count = tarbox::write_entries(&archive, &manifest, &write.options())
                .with_context(|| format!("Writing entries of {}", manifest.display()))?;
            log::info!("Wrote {} entries to {}", count, archive.display());
        }
        Command::Create {
            archive,
            flat,
            input_files,
            write,
        } => {
            if input_files.is_empty() {
                bail!("No input files provided. Atleast one input file is required.");
            }
            log::info!(
                "Creating an archive at {}, for files: {}",
                archive.display(),
                input_files
                    .iter()
                    .map(|f| f.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            );
            let source_options = SourceOptions { flat };
            tarbox::create_archive(&archive, &input_files, &source_options, &write.options())?;
        }
        Command::List { archive, read } => {
            let options = read.options(PathBuf::from("."));
            let mut stdout = io::stdout().lock();
            tarbox::list_entries(&archive, read.size, read.verbose, &options, &mut stdout)?;
        }
        Command::Extract {
            archive,
            output_path,
            overwrite,
            read,
        } => {
            if !archive.is_file() {
                bail!("Input file {} has to be an archive.", archive.display());
            }
            if !output_path.is_dir() {
                bail!("Output path has to be a directory where all contents of the archive will be unpacked.")
            }
            let options = read.options(output_path);
            let mut stdout = io::stdout().lock();
            let report = tarbox::extract_entries(
                &archive,
                read.size,
                overwrite,
                read.verbose,
                &options,
                &mut stdout,
            )?;
            log::info!(
                "Extracted {} entries: {} files written, {} skipped, {} directories",
                report.entries(),
                report.files_written,
                report.files_skipped,
                report.directories_created
            );
        }
    }
    Ok(())
}
