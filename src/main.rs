use anyhow::Result;
use clap::Parser;
use std::io::{BufRead, Write};
use tracing::warn;

use voiceprint_console::{
    ApiClient, CaptureConfig, Config, MicrophoneBackend, StdinConfirm, Workflow, WorkflowError,
};

/// Operator console for a remote voiceprint service: capture a sample,
/// enroll or identify it, and inspect records, logs, and statistics.
#[derive(Debug, Parser)]
#[command(name = "voiceprint-console", version)]
struct Args {
    /// Path to the config file
    #[arg(short, long, default_value = "config/voiceprint-console")]
    config: String,

    /// Override the voiceprint service base URL
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;
    let base_url = args.base_url.unwrap_or(cfg.service.base_url);

    println!("voiceprint console, service at {}", base_url);

    let client = ApiClient::new(base_url);
    let mut workflow = Workflow::new(client, StdinConfirm);

    if let Err(e) = workflow.initial_load().await {
        warn!("Initial load failed: {}", e);
    }
    println!("stats: {}", workflow.view.render_stats());
    println!("recent identifications:\n{}", workflow.view.render_logs());
    print_help();

    let stdin = std::io::stdin();
    let mut input = String::new();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        input.clear();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let mut parts = input.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };

        let outcome = match command {
            "help" => {
                print_help();
                Ok(())
            }
            "start" => cmd_start(&mut workflow, cfg.audio.device.clone()).await,
            "stop" => cmd_stop(&mut workflow).await,
            "enroll" => cmd_enroll(&mut workflow, parts.next()).await,
            "identify" => cmd_identify(&mut workflow).await,
            "user" => cmd_user(&mut workflow, parts.next()).await,
            "list" => cmd_list(&mut workflow).await,
            "delete" => cmd_delete(&mut workflow, parts.next()).await,
            "logs" => cmd_logs(&mut workflow).await,
            "stats" => cmd_stats(&mut workflow).await,
            "quit" | "exit" => break,
            other => {
                println!("unknown command: {} (try 'help')", other);
                Ok(())
            }
        };

        if let Err(e) = outcome {
            println!("error: {}", e);
        }
    }

    Ok(())
}

fn print_help() {
    println!("commands:");
    println!("  start              begin recording from the microphone");
    println!("  stop               stop recording and encode the clip");
    println!("  enroll <userId>    enroll the captured clip for a user");
    println!("  identify           identify the speaker of the captured clip");
    println!("  user <userId>      select a user and list their voiceprints");
    println!("  list               re-list voiceprints for the selected user");
    println!("  delete <id>        delete a voiceprint record (asks first)");
    println!("  logs               show the identification log");
    println!("  stats              show aggregate statistics");
    println!("  quit               exit");
}

async fn cmd_start(
    workflow: &mut Workflow<StdinConfirm>,
    device: Option<String>,
) -> std::result::Result<(), WorkflowError> {
    let backend = MicrophoneBackend::new(CaptureConfig { device });
    workflow.start_recording(Box::new(backend)).await?;
    println!("recording; type 'stop' to finish");
    Ok(())
}

async fn cmd_stop(
    workflow: &mut Workflow<StdinConfirm>,
) -> std::result::Result<(), WorkflowError> {
    let clip = workflow.stop_recording().await?;
    println!(
        "captured {:.1}s clip ({} bytes, {})",
        clip.duration_secs,
        clip.bytes.len(),
        clip.media_type
    );
    Ok(())
}

async fn cmd_enroll(
    workflow: &mut Workflow<StdinConfirm>,
    user: Option<&str>,
) -> std::result::Result<(), WorkflowError> {
    let user = user.ok_or_else(|| WorkflowError::Validation("usage: enroll <userId>".to_string()))?;
    let message = workflow.enroll(user).await?;
    println!("enrolled: {}", message);
    println!("voiceprints for {}:\n{}", user, workflow.view.render_records());
    Ok(())
}

async fn cmd_identify(
    workflow: &mut Workflow<StdinConfirm>,
) -> std::result::Result<(), WorkflowError> {
    workflow.identify().await?;
    println!("{}", workflow.view.render_identification());
    println!("recent identifications:\n{}", workflow.view.render_logs());
    Ok(())
}

async fn cmd_user(
    workflow: &mut Workflow<StdinConfirm>,
    user: Option<&str>,
) -> std::result::Result<(), WorkflowError> {
    let user = user.ok_or_else(|| WorkflowError::Validation("usage: user <userId>".to_string()))?;
    workflow.select_user(user).await?;
    println!("voiceprints for {}:\n{}", user, workflow.view.render_records());
    Ok(())
}

async fn cmd_list(
    workflow: &mut Workflow<StdinConfirm>,
) -> std::result::Result<(), WorkflowError> {
    workflow.refresh_records().await?;
    match &workflow.view.selected_user {
        Some(user) => println!("voiceprints for {}:\n{}", user, workflow.view.render_records()),
        None => println!("no user selected (use 'user <userId>')"),
    }
    Ok(())
}

async fn cmd_delete(
    workflow: &mut Workflow<StdinConfirm>,
    id: Option<&str>,
) -> std::result::Result<(), WorkflowError> {
    let id: i64 = id
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| WorkflowError::Validation("usage: delete <id>".to_string()))?;

    if workflow.delete_record(id).await? {
        println!("deleted record {}", id);
        if workflow.view.selected_user.is_some() {
            println!("{}", workflow.view.render_records());
        }
    } else {
        println!("delete cancelled");
    }
    Ok(())
}

async fn cmd_logs(
    workflow: &mut Workflow<StdinConfirm>,
) -> std::result::Result<(), WorkflowError> {
    workflow.refresh_logs().await?;
    println!("recent identifications:\n{}", workflow.view.render_logs());
    Ok(())
}

async fn cmd_stats(
    workflow: &mut Workflow<StdinConfirm>,
) -> std::result::Result<(), WorkflowError> {
    workflow.refresh_stats().await?;
    println!("stats: {}", workflow.view.render_stats());
    Ok(())
}
