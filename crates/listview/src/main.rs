//! listview - Browse, filter, sort and export a JSON record file.
//!
//! Usage:
//!   listview records.json                          # interactive browser
//!   listview records.json --print --page 2         # one page to stdout
//!   listview records.json --sort Name --desc --print
//!   listview records.json --filter Status=Paid --export paid.csv
//!   listview records.json --where Invoice=a01 --add Product=Widget --add Qty=3

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::fs::File;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::Parser;
use tracing::{Level, debug, info};
use tracing_subscriber::EnvFilter;

use listview_core::export::{CsvOptions, export_to_path};
use listview_core::form::RecordForm;
use listview_core::provider::{
    Criteria, JsonFileSink, JsonFileSource, RecordSink, RecordSource, RecordingNotifier,
};
use listview_core::session::ListSession;
use listview_core::table::{DEFAULT_PAGE_SIZE, ListView};
use listview_core::tui::App;
use listview_core::view::{build_table_view, render_text};
use listview_core::{Schema, VERSION};

/// Browse, filter, sort and export a JSON record file.
#[derive(Parser)]
#[command(name = "listview", about = "Paginated record list viewer", version = VERSION)]
struct Args {
    /// JSON file holding an array of flat objects.
    #[arg(value_name = "RECORDS")]
    records: PathBuf,

    /// Column schema (JSON). Inferred from the records when omitted.
    #[arg(long, value_name = "FILE")]
    schema: Option<PathBuf>,

    /// Records per page.
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: NonZeroUsize,

    /// Sort by this field.
    #[arg(long, value_name = "FIELD")]
    sort: Option<String>,

    /// Sort descending (with --sort).
    #[arg(long, requires = "sort")]
    desc: bool,

    /// Client-side filter, repeatable.
    #[arg(long, value_name = "FIELD=VALUE", value_parser = parse_key_value)]
    filter: Vec<(String, String)>,

    /// Criteria passed to the source when loading, repeatable.
    #[arg(long = "where", value_name = "FIELD=VALUE", value_parser = parse_key_value)]
    criteria: Vec<(String, String)>,

    /// Create a record from these fields before showing the list, repeatable.
    #[arg(long, value_name = "FIELD=VALUE", value_parser = parse_key_value)]
    add: Vec<(String, String)>,

    /// Print one page as text and exit.
    #[arg(long)]
    print: bool,

    /// Page to print (with --print).
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Write the filtered list as CSV and exit.
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// CSV destination for the `e` key in the browser.
    #[arg(long, value_name = "FILE", default_value = "export.csv")]
    export_path: PathBuf,

    /// CSV field delimiter (one ASCII character).
    #[arg(long, default_value_t = ',', value_parser = parse_delimiter)]
    delimiter: char,

    /// Omit the CSV header row.
    #[arg(long)]
    no_header: bool,

    /// Title shown above the table. Defaults to the file name.
    #[arg(long)]
    title: Option<String>,

    /// Write logs to this file. The browser logs nothing otherwise.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Parses `FIELD=VALUE`. The value may be empty; the field may not.
fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((field, value)) if !field.trim().is_empty() => {
            Ok((field.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected FIELD=VALUE, got '{}'", s)),
    }
}

fn parse_delimiter(s: &str) -> Result<char, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        _ => Err(format!("expected one ASCII character, got '{}'", s)),
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
/// The interactive browser owns the terminal, so without a log file it logs nothing.
fn init_logging(verbose: u8, quiet: bool, log_file: Option<&Path>, interactive: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::from_default_env()
        .add_directive(format!("listview={}", level).parse().unwrap())
        .add_directive(format!("listview_core={}", level).parse().unwrap());

    match log_file {
        Some(path) => match File::create(path) {
            Ok(file) => tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init(),
            Err(e) => {
                eprintln!("Error: cannot open log file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None if interactive => {}
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init(),
    }
}

/// Loads the schema file, or infers one from the records.
fn resolve_schema(args: &Args) -> Result<Schema, String> {
    if let Some(path) = &args.schema {
        return Schema::load(path).map_err(|e| format!("invalid schema: {}", e));
    }
    let mut source = JsonFileSource::new(&args.records, Schema::new());
    let records = source
        .fetch(&Criteria::new())
        .map_err(|e| format!("cannot read records: {}", e))?;
    let schema = Schema::infer(&records);
    debug!(columns = schema.columns().len(), "schema inferred");
    Ok(schema)
}

fn main() {
    let args = Args::parse();
    let interactive = !args.print && args.export.is_none();
    init_logging(args.verbose, args.quiet, args.log_file.as_deref(), interactive);

    let schema = match resolve_schema(&args) {
        Ok(schema) => schema,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let title = args.title.clone().unwrap_or_else(|| {
        args.records
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Records".to_string())
    });

    let criteria = args
        .criteria
        .iter()
        .fold(Criteria::new(), |c, (field, value)| c.with(field, value));
    let mut session = ListSession::new(
        ListView::new(schema.clone()).with_page_size(args.page_size),
        JsonFileSource::new(&args.records, schema.clone()),
        JsonFileSink::new(&args.records, schema.clone()),
        RecordingNotifier::new(),
    );

    let loaded = session.load(criteria.clone());
    if loaded.is_err() && !interactive {
        report(&session);
        std::process::exit(1);
    }

    if !args.add.is_empty() {
        let mut form = RecordForm::from_schema(&schema);
        for (field, value) in &args.add {
            form.set_input(field, value);
        }
        for (field, value) in criteria.iter() {
            if form.get(field).is_null() {
                form.set_input(field, value);
            }
        }
        let submitted = session.submit_form(&mut form);
        if !interactive {
            report(&session);
            if submitted.is_err() {
                std::process::exit(1);
            }
        }
    }

    let view = session.view_mut();
    for (field, value) in &args.filter {
        view.set_filter(field, value);
    }
    if let Some(field) = &args.sort {
        view.set_sort(field);
        if args.desc {
            view.set_sort(field);
        }
    }

    let csv = CsvOptions {
        include_header: !args.no_header,
        delimiter: args.delimiter,
    };

    if let Some(path) = &args.export {
        match export_to_path(session.view(), &csv, path) {
            Ok(rows) => info!(rows, path = %path.display(), "export finished"),
            Err(e) => {
                eprintln!("Error: cannot write '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        }
        if !args.print {
            return;
        }
    }

    if args.print {
        let view = session.view_mut();
        if args.page != 1 && !view.go_to_page(args.page) {
            eprintln!(
                "Error: page {} is out of range (1-{})",
                args.page,
                view.total_pages()
            );
            std::process::exit(1);
        }
        println!("{}", render_text(&build_table_view(session.view(), &title)));
        return;
    }

    let app = App::new(session, title).with_export(args.export_path.clone(), csv);
    if let Err(e) = app.run() {
        eprintln!("Error running TUI: {}", e);
        std::process::exit(1);
    }
}

/// Echoes the last notification for non-interactive runs.
fn report<S: RecordSource, K: RecordSink>(session: &ListSession<S, K, RecordingNotifier>) {
    if let Some(n) = session.notifier().last() {
        eprintln!("{}", n);
    }
}
