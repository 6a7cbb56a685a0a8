use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use map_integration::{HeadlessMapHandle, HeadlessMapProvider};
use report_core::{
    address::parse_coordinate_pair,
    config::{load_settings, load_settings_from},
    geocoder::{Geocoder, MissingGeocoder, NominatimGeocoder},
    WizardController,
};
use tracing::info;

mod console;

use console::{ConsolePage, Prompt};

const ISSUE_TYPES: [&str; 5] = ["Pothole", "Graffiti", "Streetlight", "Litter", "Other"];

#[derive(Parser, Debug)]
#[command(name = "kiosk", version, about = "Citizen issue reporting kiosk")]
struct Args {
    #[arg(long, help = "Settings file (defaults to ./kiosk.toml when present)")]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = false, help = "Disable the geocoding service")]
    offline: bool,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk through the report form interactively.
    Walk,
    /// Resolve one address or "lat, lng" pair and print the resulting viewport.
    Locate {
        address: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let settings = match &args.config {
        Some(path) => load_settings_from(path)?,
        None => load_settings(),
    };
    let geocoder: Arc<dyn Geocoder> = if args.offline {
        Arc::new(MissingGeocoder)
    } else {
        Arc::new(
            NominatimGeocoder::new(&settings.geocoder_url, &settings.user_agent)
                .with_context(|| format!("invalid geocoder url '{}'", settings.geocoder_url))?,
        )
    };
    let maps = HeadlessMapProvider::new();
    let map = maps.handle();
    let mut controller =
        WizardController::new(settings, Box::new(ConsolePage::new()), Arc::new(maps), geocoder);

    match args.command.unwrap_or(Command::Walk) {
        Command::Walk => walk(&mut controller, &map).await,
        Command::Locate { address, json } => {
            let viewport = controller.resolve_address(&address).await?;
            if json {
                println!("{}", serde_json::to_string(&viewport)?);
            } else {
                println!(
                    "Centered on {} at zoom {}",
                    viewport.center, viewport.zoom
                );
            }
            Ok(())
        }
    }
}

async fn walk(controller: &mut WizardController, map: &HeadlessMapHandle) -> Result<()> {
    let mut prompt = Prompt::new();

    prompt.ask("Press Enter to start.").await?;
    controller.advance();

    let listing: Vec<String> = ISSUE_TYPES
        .iter()
        .enumerate()
        .map(|(i, name)| format!("{}) {name}", i + 1))
        .collect();
    let issue_type = loop {
        let answer = prompt
            .ask(&format!("Pick a number or type your own: {}", listing.join("  ")))
            .await?;
        if answer.is_empty() {
            continue;
        }
        break answer
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| ISSUE_TYPES.get(i))
            .map_or(answer.clone(), |name| name.to_string());
    };
    controller.select_issue_type(issue_type);

    let details = prompt.ask("Describe the issue.").await?;
    info!(chars = details.chars().count(), "details captured");
    controller.advance();

    controller.settle_map().await;
    loop {
        let answer = prompt
            .ask("Enter an address or \"lat, lng\" (\"pick lat, lng\" drops a pin, blank to continue).")
            .await?;
        if answer.is_empty() {
            break;
        }
        if let Some(rest) = answer.strip_prefix("pick ") {
            match parse_coordinate_pair(rest) {
                Some(at) => {
                    map.click(at);
                    controller.pump_map_clicks();
                }
                None => println!("! Expected \"pick lat, lng\"."),
            }
            continue;
        }
        if let Ok(viewport) = controller.resolve_address(&answer).await {
            println!("Map centered on {} (zoom {})", viewport.center, viewport.zoom);
        }
    }
    controller.advance();

    let share = prompt
        .ask("Share your contact details to receive a reference number? [y/N]")
        .await?;
    if !share.eq_ignore_ascii_case("y") && !share.eq_ignore_ascii_case("yes") {
        controller.submit_anonymously();
        return Ok(());
    }

    controller.offer_to_share_details();
    loop {
        let name = prompt.ask("Name:").await?;
        let email = prompt.ask("Email:").await?;
        if controller.submit_report(&name, &email).is_ok() {
            return Ok(());
        }
    }
}
