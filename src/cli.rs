use bussid_push::PushConfig;
use bussid_push::worker::render;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

pub(crate) fn run() -> i32 {
    match Cli::parse().command {
        Command::Vapid(args) => run_vapid(args),
        Command::Preview(args) => run_preview(args),
        Command::Config(args) => run_config(args),
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "bussid-push",
    version,
    about = "Developer tools for the Top Up BUSSID push notification client"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a VAPID key pair.
    Vapid(VapidArgs),
    /// Show how the service worker would render a push payload.
    Preview(PreviewArgs),
    /// Print the effective configuration.
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
struct VapidArgs {
    #[arg(long)]
    subject: Option<String>,
}

#[derive(Args, Debug)]
struct PreviewArgs {
    #[arg(long, env = "BUSSID_PUSH_CONFIG")]
    config: Option<PathBuf>,
    /// Origin the service worker is served from.
    #[arg(long, default_value = "https://localhost")]
    origin: String,
    /// Treat the payload as a page message instead of a push body.
    #[arg(long)]
    message: bool,
    payload: String,
}

#[derive(Args, Debug)]
struct ConfigArgs {
    #[arg(long, env = "BUSSID_PUSH_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct Preview {
    title: String,
    options: bussid_push::types::NotificationOptions,
}

fn run_vapid(args: VapidArgs) -> i32 {
    let credentials = match bussid_push::generate_vapid_credentials() {
        Ok(credentials) => credentials,
        Err(err) => {
            eprintln!("failed to generate VAPID credentials: {err}");
            return 1;
        }
    };
    let (subject, show_subject_note) = match args.subject {
        Some(subject) => (subject, false),
        None => ("mailto:you@example.com".to_string(), true),
    };

    println!("VAPID credentials generated.");
    println!();
    println!("# push sender");
    println!("VAPID_PRIVATE_KEY=\"{}\"", credentials.private_key);
    println!("VAPID_SUBJECT=\"{subject}\"");
    println!();
    println!("# page and worker configuration");
    println!("vapid_public_key = \"{}\"", credentials.public_key);
    if show_subject_note {
        println!();
        println!("Note: replace VAPID_SUBJECT with a contact URI you control.");
    }
    0
}

fn run_preview(args: PreviewArgs) -> i32 {
    let config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            return 2;
        }
    };
    match preview(&config, &args.origin, &args.payload, args.message) {
        Ok(Some(output)) => {
            println!("{output}");
            0
        }
        Ok(None) => {
            eprintln!("message is not a SHOW_NOTIFICATION request; the worker ignores it");
            1
        }
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    }
}

fn run_config(args: ConfigArgs) -> i32 {
    let rendered = load_config(args.config.as_ref()).and_then(|config| {
        config
            .to_toml()
            .map_err(|err| err.to_string())
    });
    match rendered {
        Ok(toml) => {
            print!("{toml}");
            0
        }
        Err(err) => {
            eprintln!("error: {err}");
            2
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<PushConfig, String> {
    match path {
        Some(path) => PushConfig::load(path).map_err(|err| err.to_string()),
        None => Ok(PushConfig::default()),
    }
}

fn preview(
    config: &PushConfig,
    origin: &str,
    payload: &str,
    message: bool,
) -> Result<Option<String>, String> {
    let rendered = if message {
        let value: serde_json::Value =
            serde_json::from_str(payload).map_err(|err| format!("message is not JSON: {err}"))?;
        render::render_message(value, origin, config)
    } else {
        render::render_push(payload, origin, config).map(Some)
    };
    let Some(rendered) = rendered.map_err(|err| err.to_string())? else {
        return Ok(None);
    };
    let preview = Preview {
        options: rendered.options(),
        title: rendered.title,
    };
    serde_json::to_string_pretty(&preview)
        .map(Some)
        .map_err(|err| err.to_string())
}
