use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use miette::{IntoDiagnostic, Result, miette};

use skiff::{
    DataFrame, Session, SessionConfig, directory,
    logging::{LogConfig, LogFormat, init_logging},
    session::parse_delimiter,
};

#[derive(Parser)]
#[command(name = "skiff", version, about = "Lazy queries over a staff directory file")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Field separator, a single ASCII character or `tab`.
    #[arg(long, global = true)]
    delimiter: Option<String>,

    /// The first line is a header and is skipped.
    #[arg(long, global = true)]
    header: bool,

    /// Adjust log verbosity (-v info, -vv debug, -vvv trace, -q errors only).
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,

    /// pretty, compact or json.
    #[arg(long = "log-format", default_value = "pretty", global = true)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Print the first rows of a directory file.
    Show {
        file: PathBuf,

        #[arg(short = 'n', long = "rows")]
        rows: Option<usize>,
    },

    /// Print the directory schema.
    Schema { file: PathBuf },

    /// Answer every directory question.
    Exercises { file: PathBuf },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(false)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()?;
    miette::set_panic_hook();

    let cli = Cli::parse();

    let log_config = LogConfig::default()
        .with_level(cli.verbosity.tracing_level_filter())
        .with_env_filter(!cli.verbosity.is_present())
        .with_format(cli.log_format);
    init_logging(&log_config).into_diagnostic()?;

    let session = Session::new(session_config(&cli)?);

    match &cli.command {
        Command::Show { file, rows } => {
            let people = load(&session, file)?;
            people.show(rows.unwrap_or(session.config().show_rows))?;
        }
        Command::Schema { file } => {
            load(&session, file)?.print_schema();
        }
        Command::Exercises { file } => {
            let people = load(&session, file)?;
            run_exercises(&session, &people)?;
        }
    }

    session.stop();

    Ok(())
}

fn session_config(cli: &Cli) -> Result<SessionConfig> {
    let mut config = SessionConfig::from_env();
    if let Some(raw) = &cli.delimiter {
        let delimiter = parse_delimiter(raw)
            .ok_or_else(|| miette!("Invalid delimiter '{raw}', expected one ASCII character"))?;
        config = config.with_delimiter(delimiter);
    }
    if cli.header {
        config = config.with_headers(true);
    }

    Ok(config)
}

/// JSON Lines for `.json`/`.jsonl` files, delimited text otherwise.
fn load(session: &Session, file: &Path) -> Result<DataFrame> {
    let is_json = file
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("jsonl"));

    let people = if is_json {
        session.read_json(file, directory::schema())?
    } else {
        directory::load(session, file)?
    };

    Ok(people)
}

fn run_exercises(session: &Session, people: &DataFrame) -> Result<()> {
    let rows = session.config().show_rows;
    let sentinel = session.config().null_sentinel.as_str();

    println!("R2 members:");
    directory::r2_members(people)?.show(rows)?;

    println!("R2 by position:");
    directory::r2_by_position(people)?.show(rows)?;

    println!("People by HDR:");
    directory::count_by_hdr(people)?.show(rows)?;
    println!("HDR holders: {}", directory::hdr_count(people)?);

    println!("People per organization:");
    directory::people_per_organization(people)?.show(rows)?;

    println!("INSA staff: {}", directory::insa_staff(people)?);
    println!("MC in STAT: {}", directory::stat_lecturers(people)?);
    println!(
        "MC and CR with HDR: {}",
        directory::hdr_lecturers_and_researchers(people)?
    );
    println!(
        "Supervision ratio (DOC / HDR): {:.3}",
        directory::supervision_ratio(people)?
    );

    let hdr_teams = directory::hdr_per_team(people, sentinel)?;
    println!("HDR per team: {}", format_counts(&hdr_teams));
    if let Some(team) = directory::team_with_most(&hdr_teams) {
        println!("Team with most HDR: {team}");
    }

    println!("DOC per organization:");
    directory::doc_per_organization(people)?.show(rows)?;

    let doc_teams = directory::doc_per_team(people, sentinel)?;
    println!("DOC per team: {}", format_counts(&doc_teams));
    if let Some(team) = directory::team_with_most(&doc_teams) {
        println!("Team with most DOC: {team}");
    }

    println!("HDR per team, both columns:");
    directory::hdr_team_totals(people, sentinel)?.show(rows)?;

    println!("ANANUM students:");
    directory::ananum_students(people)?.show(rows)?;

    println!("Researchers:");
    directory::researchers(people)?.show(rows)?;

    println!("CNRS staff other than DR and CR:");
    directory::cnrs_staff_by_position(people)?.show(rows)?;

    Ok(())
}

fn format_counts(counts: &[(skiff::Value, i64)]) -> String {
    counts
        .iter()
        .map(|(value, count)| format!("({value}, {count})"))
        .collect::<Vec<_>>()
        .join(", ")
}
