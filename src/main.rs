use anyhow::Result;
use colored::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use varaka_nexus::build_service;
use varaka_nexus::commands::{Command, HELP_TEXT, Record, View, parse_command};
use varaka_nexus::config::Config;
use varaka_nexus::models::ChatMessage;
use varaka_nexus::render::{render_chart, render_message, render_transcript};
use varaka_nexus::service::{OperatorService, TurnOutcome};
use varaka_nexus::session::{SessionEvent, SessionState};
use varaka_nexus::validation::is_submittable;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so the transcript on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load();

    let service = match build_service(&config) {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("Startup failed: {}", e);
            print_startup_failure();
            std::process::exit(1);
        }
    };

    print_banner(&service.snapshot().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e.to_string().red());
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => println!("{HELP_TEXT}"),
            Command::Prompt(text) => run_turn(&service, &text).await,
            Command::Scenario(preset) => {
                let state = service.snapshot().await;
                let text = preset.prompt(&state.telemetry, &state.machine);
                println!("{}", render_message(&ChatMessage::user(text.clone())));
                run_turn(&service, &text).await;
            }
            Command::Historical => {
                service.dispatch(SessionEvent::HistoricalDataLoaded).await?;
                print_last_message(&service.snapshot().await);
            }
            Command::Set {
                record,
                field,
                value,
            } => match service.dispatch(record.edit_event(field.clone(), value)).await {
                Ok(()) => println!("{} {}", "updated".green(), field),
                Err(e) => println!("{}", e.to_string().red()),
            },
            Command::Show(view) => {
                let state = service.snapshot().await;
                print_view(&state, view)?;
            }
        }
    }

    tracing::info!("Operator session closed");
    Ok(())
}

async fn run_turn(service: &OperatorService, text: &str) {
    if !is_submittable(text) {
        return;
    }
    let pending = if service.snapshot().await.has_historical_data {
        "GEÇMİŞ VERİ SETİ TARANIYOR..."
    } else {
        "SİMÜLASYON HESAPLANIYOR..."
    };
    println!("{}", pending.cyan().dimmed());

    match service.submit(text).await {
        TurnOutcome::Ignored => {}
        TurnOutcome::Completed => {
            let state = service.snapshot().await;
            print_last_message(&state);
            if state.chart_visible() {
                println!(
                    "{}",
                    render_chart(
                        &state.chart_data,
                        state.winning_scenario.as_ref(),
                        state.telemetry.target_cmt
                    )
                );
            }
        }
    }
}

fn print_last_message(state: &SessionState) {
    if let Some(msg) = state.last_message() {
        println!("{}", render_message(msg));
    }
}

fn print_view(state: &SessionState, view: View) -> Result<()> {
    match view {
        View::Record(Record::Telemetry) => {
            println!("{}", serde_yaml::to_string(&state.telemetry)?)
        }
        View::Record(Record::Costs) => println!("{}", serde_yaml::to_string(&state.costs)?),
        View::Record(Record::Machine) => println!("{}", serde_yaml::to_string(&state.machine)?),
        View::Chart => println!(
            "{}",
            render_chart(
                &state.chart_data,
                state.winning_scenario.as_ref(),
                state.telemetry.target_cmt
            )
        ),
        View::History => println!("{}", render_transcript(state)),
    }
    Ok(())
}

fn print_banner(state: &SessionState) {
    println!(
        "{}{}  {}",
        "VARAKA".bold(),
        "NEXUS".cyan().bold(),
        "R&D Lab Online".green()
    );
    print_last_message(state);
    println!("{}", "Type /help for commands.".dimmed());
}

fn print_startup_failure() {
    eprintln!();
    eprintln!("{}", "⚠️".red());
    eprintln!("{}", "Sistem Başlatılamadı".bold());
    eprintln!("Varaka Nexus API Anahtarı Gerekli.");
    eprintln!("Set GEMINI_API_KEY (or API_KEY) and restart.");
}
