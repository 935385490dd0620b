use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{Level, error, info};

use rv::controller::Controller;
use rv::domain::{Message, TVConfig, TVError};
use rv::logging;
use rv::model::{Model, Status};
use rv::ui::TableUI;

#[derive(Parser, Debug)]
#[command(version, about = "Browse the records of a CSV or JSON file one at a time")]
struct Args {
    /// CSV, JSON or JSON lines file to open
    path: Option<String>,

    /// Column searched by case-insensitive substring
    #[arg(long, default_value = "reraNo")]
    id_column: String,

    /// Columns offered as pick lists (comma separated)
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "projectStatus,state,district"
    )]
    filter_columns: Vec<String>,

    /// Event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll_ms: u64,

    /// Log file, defaults to rv.log in the working directory
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let result = run(args);
    ratatui::restore();
    match result {
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: Args) -> Result<(), TVError> {
    logging::init(args.log_file.clone(), args.log_level)?;
    info!("Starting rv with {:?}", args);

    let cfg = TVConfig::default()
        .event_poll_time(args.poll_ms)
        .id_column(args.id_column)
        .filter_columns(args.filter_columns);

    let mut model = Model::init(&cfg);
    if let Some(path) = args.path.as_deref() {
        model.load_data_file(path)?;
    }

    let mut ui = TableUI::new(&cfg);
    let controller = Controller::new(&cfg);
    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    model.update(Some(Message::Resize(size.width as usize, size.height as usize)))?;

    while model.status != Status::QUITTING {
        terminal.draw(|f| ui.draw(&model, f))?;

        let message = controller.handle_event(&model)?;
        if message.is_some() {
            model.update(message)?;
        }
    }

    info!("Quitting rv");
    Ok(())
}
