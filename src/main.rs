use clap::{Parser, Subcommand};
use scaffold_mutate::transform::{Fields, Name};
use scaffold_mutate::{format_source, list_type, ConfigError, Options, SourceKind};
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, info};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "scaffold")]
#[command(about = "Wire new types into a Cosmos SDK application by editing its Go and proto sources")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a list type: store, genesis, queries, messages and simulation
    List {
        /// Name of the new type
        #[arg(required_unless_present = "config")]
        name: Option<String>,

        /// Fields as `name` or `name:type`
        fields: Vec<String>,

        /// Module that receives the type
        #[arg(long, default_value = "")]
        module: String,

        /// Application name
        #[arg(long, default_value = "")]
        app: String,

        /// Owner of the application repository
        #[arg(long, default_value = "")]
        owner: String,

        /// Application root
        #[arg(long, default_value = ".")]
        path: PathBuf,

        /// Name of the field holding the message signer
        #[arg(long, default_value = "creator")]
        signer: String,

        /// Skip messages and only scaffold the state and queries
        #[arg(long)]
        no_message: bool,

        /// Read the options from a JSON file instead
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the edited files instead of writing them
        #[arg(long)]
        dry_run: bool,
    },
    /// Print Go and proto sources back in canonical form
    Fmt {
        /// File or directory
        path: PathBuf,

        /// Rewrite the files in place
        #[arg(long)]
        write: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List { name, fields, module, app, owner, path, signer, no_message, config, dry_run } => {
            let opts = match config {
                Some(config) => Options::load(&config),
                None => list_options(name.as_deref().unwrap_or_default(), &fields, &module, &app, &owner, &signer)
                    .map(|opts| opts.with_app_path(path)),
            };
            match opts {
                Ok(mut opts) => {
                    opts.no_message |= no_message;
                    scaffold_list(&opts, dry_run)
                }
                Err(err) => Err(err.to_string()),
            }
        }
        Commands::Fmt { path, write } => format_path(&path, write),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprint!("{}", message);
            if !message.ends_with('\n') {
                eprintln!();
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("scaffold_mutate=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();
}

fn list_options(
    name: &str,
    fields: &[String],
    module: &str,
    app: &str,
    owner: &str,
    signer: &str,
) -> Result<Options, ConfigError> {
    // The module defaults to the application name, as in a freshly created chain
    let module = if module.is_empty() { app } else { module };
    let fields: Fields = fields.join(",").parse()?;
    Ok(Options::new(app, owner, module, name)?.with_fields(fields).with_signer(Name::new(signer)?))
}

fn scaffold_list(opts: &Options, dry_run: bool) -> Result<(), String> {
    let start = Instant::now();
    let plan = list_type(opts);
    info!(type_name = %opts.type_name, module = %opts.module_name, files = plan.len(), "scaffolding list type");

    // Every file is edited in memory first so a failure leaves the tree untouched
    let mut edited = Vec::with_capacity(plan.len());
    for modification in &plan {
        let path = opts.app_path.join(&modification.path);
        let source = fs::read_to_string(&path).map_err(|err| format!("error: {}: {}", path.display(), err))?;
        debug!(path = %path.display(), steps = ?modification.target.names(), "modifying");
        let output = modification.run(&source, opts).map_err(|err| {
            if io::stderr().is_terminal() { err.render_color(&source) } else { err.render(&source) }
        })?;
        edited.push((path, output));
    }

    for (path, output) in &edited {
        if dry_run {
            println!("// {}\n{}", path.display(), output);
            continue;
        }
        fs::write(path, output).map_err(|err| format!("error: {}: {}", path.display(), err))?;
        print_modified(&path.display().to_string());
    }
    print_summary("Modified", edited.len(), start.elapsed());
    Ok(())
}

fn format_path(path: &Path, write: bool) -> Result<(), String> {
    let start = Instant::now();
    let files: Vec<PathBuf> = if path.is_dir() {
        WalkDir::new(path)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.into_path())
            .filter(|file| SourceKind::of(file).is_some())
            .collect()
    } else if path.is_file() {
        vec![path.to_path_buf()]
    } else {
        return Err(format!("error: {} does not exist", path.display()));
    };
    if files.is_empty() {
        return Err(format!("error: no .go or .proto files found in {}", path.display()));
    }

    for file in &files {
        let source = fs::read_to_string(file).map_err(|err| format!("error: {}: {}", file.display(), err))?;
        let output = format_source(&source, file).map_err(|err| {
            let name = file.display().to_string();
            if io::stderr().is_terminal() { err.render_color(&source, &name) } else { err.render(&source, &name) }
        })?;
        if write {
            if output != source {
                fs::write(file, &output).map_err(|err| format!("error: {}: {}", file.display(), err))?;
                print_modified(&file.display().to_string());
            }
        } else {
            print!("{}", output);
        }
    }
    if write {
        print_summary("Formatted", files.len(), start.elapsed());
    }
    Ok(())
}

fn print_modified(path: &str) {
    if io::stderr().is_terminal() {
        eprintln!("  \x1b[32m✓\x1b[0m {}", path);
    } else {
        eprintln!("  ✓ {}", path);
    }
}

fn print_summary(verb: &str, count: usize, elapsed: std::time::Duration) {
    let files_word = if count == 1 { "file" } else { "files" };
    let time_str = format_duration(elapsed);
    if io::stderr().is_terminal() {
        eprintln!("\n\x1b[1m✨ {} {} {} in {}\x1b[0m", verb, count, files_word, time_str);
    } else {
        eprintln!("\n✨ {} {} {} in {}", verb, count, files_word, time_str);
    }
}

fn format_duration(d: std::time::Duration) -> String {
    let micros = d.as_micros();
    if micros < 1000 {
        format!("{}μs", micros)
    } else if micros < 1_000_000 {
        format!("{:.1}ms", micros as f64 / 1000.0)
    } else {
        format!("{:.2}s", d.as_secs_f64())
    }
}
