use clap::arg_enum;
use log::{debug, info};
use rnpatch::format::{self, ParseMode};
use rnpatch::{EngineConfig, PatchEngine, PatchFile};
use snafu::{OptionExt, ResultExt, Snafu};
use std::fs;
use std::io::{self, Cursor};
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::process;
use structopt::StructOpt;

arg_enum! {
    #[derive(Debug)]
    enum Mode {
        Apply,
        Build,
        Dump,
        Scan
    }
}

#[derive(Debug, StructOpt)]
#[structopt(name = "rnpatch", about = "Apply and author .rnp code patches")]
struct Options {
    #[structopt(
        short,
        long,
        possible_values = &Mode::variants(),
        case_insensitive = true,
        default_value = "Apply"
    )]
    mode: Mode,
    /// Program identifier, hexadecimal
    #[structopt(short, long, parse(try_from_str = parse_title_id))]
    title: Option<u64>,
    /// Patch directory, overrides the config file
    #[structopt(short, long, parse(from_os_str))]
    dir: Option<PathBuf>,
    /// Engine configuration (JSON)
    #[structopt(short, long, parse(from_os_str))]
    config: Option<PathBuf>,
    #[structopt(long)]
    no_builtin: bool,
    #[structopt(short, long, parse(from_occurrences))]
    verbose: u8,
    #[structopt(short, long)]
    quiet: bool,
    #[structopt(index = 1, name = "INPUT", parse(from_os_str))]
    input: Option<PathBuf>,
    #[structopt(index = 2, name = "OUTPUT", parse(from_os_str))]
    output: Option<PathBuf>,
}

#[derive(Debug, Snafu)]
enum CliError {
    #[snafu(display("{:?} mode needs an INPUT file", mode))]
    MissingInput { mode: Mode },

    #[snafu(display("apply mode needs --title"))]
    MissingTitle,

    #[snafu(display("Could not read {}: {}", path.display(), source))]
    ReadFile { path: PathBuf, source: io::Error },

    #[snafu(display("Could not write {}: {}", path.display(), source))]
    WriteFile { path: PathBuf, source: io::Error },

    #[snafu(display("Bad JSON in {}: {}", path.display(), source))]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[snafu(display("Could not encode JSON: {}", source))]
    Encode { source: serde_json::Error },

    #[snafu(display("{}", source))]
    Patch { source: rnpatch::Error },
}

fn parse_title_id(src: &str) -> Result<u64, ParseIntError> {
    let digits = src.trim_start_matches("0x").trim_start_matches("0X");
    u64::from_str_radix(digits, 16)
}

fn main() {
    let opt = Options::from_args();

    let level = match (opt.quiet, opt.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    debug!("{:?}", opt);

    if let Err(e) = run(opt) {
        eprintln!("rnpatch: {}", e);
        process::exit(1);
    }
}

fn run(opt: Options) -> Result<(), CliError> {
    match opt.mode {
        Mode::Apply => {
            let input = opt.input.as_deref().context(MissingInput { mode: Mode::Apply })?;
            let title = opt.title.context(MissingTitle)?;
            let engine = PatchEngine::from_config(&load_config(&opt)?);

            let mut code = fs::read(input).context(ReadFile { path: input })?;
            let report = engine.patch_program(title, &mut code);

            let output = opt
                .output
                .clone()
                .unwrap_or_else(|| input.with_extension("patched"));
            fs::write(&output, &code).context(WriteFile { path: &output })?;
            info!("wrote {}", output.display());
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context(Encode)?
            );
        }
        Mode::Build => {
            let input = opt.input.as_deref().context(MissingInput { mode: Mode::Build })?;
            let json = fs::read(input).context(ReadFile { path: input })?;
            let patch: PatchFile =
                serde_json::from_slice(&json).context(Json { path: input })?;
            let coded = patch.to_bytes().context(Patch)?;

            let output = opt
                .output
                .clone()
                .unwrap_or_else(|| input.with_extension(format::EXTENSION));
            fs::write(&output, coded).context(WriteFile { path: &output })?;
            println!(
                "{}: {} titles, {} patches",
                output.display(),
                patch.title_ids.len(),
                patch.patches.len()
            );
        }
        Mode::Dump => {
            let input = opt.input.as_deref().context(MissingInput { mode: Mode::Dump })?;
            let bytes = fs::read(input).context(ReadFile { path: input })?;
            let patch = format::parse(&mut Cursor::new(bytes), ParseMode::Full).context(Patch)?;
            let coded = serde_json::to_string_pretty(&patch).context(Encode)?;
            match &opt.output {
                Some(output) => fs::write(output, coded).context(WriteFile { path: output })?,
                None => println!("{}", coded),
            }
        }
        Mode::Scan => {
            let config = load_config(&opt)?;
            let engine = PatchEngine::from_config(&config);
            let cache = engine.cache();
            println!("Patch files: {}", cache.files().len());
            for file in cache.files() {
                println!("  {}", file.display());
            }
            println!("Title prefixes: {}", cache.prefixes().len());
            for prefix in cache.prefixes() {
                println!("  {}", prefix);
            }
        }
    }
    Ok(())
}

fn load_config(opt: &Options) -> Result<EngineConfig, CliError> {
    let mut config = match &opt.config {
        Some(path) => read_config(path)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &opt.dir {
        config.patch_dir = dir.clone();
    }
    if opt.no_builtin {
        config.builtin_rules = false;
    }
    Ok(config)
}

fn read_config(path: &Path) -> Result<EngineConfig, CliError> {
    let json = fs::read(path).context(ReadFile { path })?;
    serde_json::from_slice(&json).context(Json { path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_ids_parse_as_hex() {
        assert_eq!(parse_title_id("0004003000008F02").unwrap(), 0x0004_0030_0000_8F02);
        assert_eq!(parse_title_id("0x8f02").unwrap(), 0x8F02);
        assert!(parse_title_id("xyz").is_err());
    }
}
