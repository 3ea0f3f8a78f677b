use std::sync::Arc;

use anyhow::bail;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use signout_core::{
    ApiClient, CallerSide, CaseDetail, ClientConfig, IllnessSeverity, Loadable, LoadOutcome,
    ScoreOutcome, ScorePanel, Signout, SignoutId, SubmitOutcome, ViewMode, Workflow,
};

#[derive(Parser)]
#[command(name = "signout")]
#[command(about = "Signout simulator client: read cases, write signouts, get them scored")]
struct Cli {
    /// Use the browser-side base URL (SIGNOUT_PUBLIC_API_BASE_URL)
    #[arg(long, global = true)]
    public: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the signout service is up
    Health,
    /// List all cases
    Cases,
    /// Show a case
    Case {
        case_id: String,
        /// Presentation mode, passed to the service as-is
        #[arg(long, default_value = "exam")]
        mode: String,
    },
    /// List signouts already written for a case
    Signouts { case_id: String },
    /// Write a signout for a case
    Create {
        case_id: String,
        /// Stable, Watcher or Unstable
        #[arg(long, default_value = "Stable")]
        severity: IllnessSeverity,
        #[arg(long, default_value = "")]
        summary: String,
        /// One item per line; "-", "*" and "•" markers are allowed
        #[arg(long, default_value = "")]
        actions: String,
        #[arg(long, default_value = "")]
        awareness: String,
        #[arg(long, default_value = "")]
        contingency: String,
        /// What the receiver read back
        #[arg(long, default_value = "")]
        synthesis: String,
        #[arg(long)]
        free_text: Option<String>,
    },
    /// Show a signout
    Show { signout_id: String },
    /// Score a signout
    Score {
        signout_id: String,
        /// Score again this many times; each result replaces the previous one
        #[arg(long, default_value_t = 1)]
        times: u32,
    },
}

/// Entry point for the signout client.
///
/// # Environment Variables
/// - `SIGNOUT_API_BASE_URL`: service URL for server-side callers (default: "http://backend:8000")
/// - `SIGNOUT_PUBLIC_API_BASE_URL`: service URL for browser-side callers (default: "http://localhost:8000")
/// - `SIGNOUT_API_TIMEOUT_SECS`: request timeout (default: 30)
/// - `SIGNOUT_RESCORE_POLICY`: `keep` or `clear` the last score when a re-score fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("signout=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("Use 'signout --help' for commands");
        return Ok(());
    };

    let side = if cli.public {
        CallerSide::Browser
    } else {
        CallerSide::Server
    };
    let config = ClientConfig::from_env(side)?;
    tracing::debug!(base_url = config.base_url(), "using signout service");

    let client = ApiClient::new(&config)?;
    let workflow = Workflow::new(Arc::new(client), config.rescore_policy());

    match command {
        Commands::Health => {
            let status = workflow.health().await.map_err(|e| anyhow::anyhow!(e.user_message()))?;
            if !status.is_ok() {
                bail!("Service reported status: {}", status.status);
            }
            println!("Service is up ({})", status.status);
        }
        Commands::Cases => {
            workflow.open_case_list().await;
            match workflow.screen() {
                signout_core::Screen::Cases(Loadable::Ready(cases)) if cases.is_empty() => {
                    println!("No cases found.");
                }
                signout_core::Screen::Cases(Loadable::Ready(cases)) => {
                    for case in cases {
                        println!(
                            "{}  {} [{}] {}",
                            case.case_id,
                            case.title,
                            case.difficulty,
                            case.tags.join(", ")
                        );
                    }
                }
                signout_core::Screen::Cases(Loadable::Failed(message)) => bail!(message),
                _ => {}
            }
        }
        Commands::Case { case_id, mode } => {
            let outcome = workflow.open_case(&case_id, ViewMode::new(mode)).await;
            check_load(outcome, "Case", &case_id)?;
            if let Some(detail) = workflow
                .screen()
                .as_case()
                .and_then(|page| page.detail.ready())
            {
                print_case(detail);
            }
        }
        Commands::Signouts { case_id } => match workflow.case_signouts(&case_id).await {
            Loadable::Ready(signouts) if signouts.is_empty() => {
                println!("No signouts for case {case_id}.");
            }
            Loadable::Ready(signouts) => {
                for meta in signouts {
                    println!("{}  {}", meta.id, display_time(&meta.created_at));
                }
            }
            Loadable::Absent => bail!("Case {case_id} not found."),
            Loadable::Failed(message) => bail!(message),
            Loadable::Loading => {}
        },
        Commands::Create {
            case_id,
            severity,
            summary,
            actions,
            awareness,
            contingency,
            synthesis,
            free_text,
        } => {
            let outcome = workflow.open_case(&case_id, ViewMode::default()).await;
            check_load(outcome, "Case", &case_id)?;
            workflow.start_signout_for_current_case()?;
            workflow.edit_signout(|draft| {
                draft.illness_severity = severity;
                draft.patient_summary = summary;
                draft.action_list = actions;
                draft.situational_awareness = awareness;
                draft.contingency_plans = contingency;
                draft.receiver_synthesis = synthesis;
                draft.free_text = free_text.unwrap_or_default();
            })?;

            match workflow.submit_signout().await {
                SubmitOutcome::Created(signout_id) => {
                    println!("Created signout {signout_id}");
                    println!("Score it with: signout score {signout_id}");
                }
                SubmitOutcome::Invalid(missing) => {
                    for field in &missing {
                        eprintln!("{field} is required");
                    }
                    bail!("Signout not submitted: {} field(s) missing", missing.len());
                }
                SubmitOutcome::Failed(message) => bail!(message),
                SubmitOutcome::Ignored | SubmitOutcome::Discarded => {
                    bail!("Signout was not submitted")
                }
            }
        }
        Commands::Show { signout_id } => {
            let id = parse_signout_id(&signout_id)?;
            let outcome = workflow.open_signout(id).await;
            check_load(outcome, "Signout", &signout_id)?;
            if let Some(signout) = workflow
                .screen()
                .as_signout()
                .and_then(|page| page.signout.ready())
            {
                print_signout(signout);
            }
        }
        Commands::Score { signout_id, times } => {
            let id = parse_signout_id(&signout_id)?;
            let outcome = workflow.open_signout(id).await;
            check_load(outcome, "Signout", &signout_id)?;

            for attempt in 1..=times.max(1) {
                let outcome = workflow.request_score().await;
                if let Some(page) = workflow.screen().as_signout() {
                    if times > 1 {
                        println!("--- attempt {attempt} ---");
                    }
                    print_score(&page.scoring);
                }
                match outcome {
                    ScoreOutcome::Applied => {}
                    ScoreOutcome::Failed(message) => bail!(message),
                    ScoreOutcome::NoSignout => bail!("Signout {signout_id} not found."),
                    ScoreOutcome::Busy | ScoreOutcome::Discarded => break,
                }
            }
        }
    }

    Ok(())
}

fn check_load(outcome: LoadOutcome, what: &str, id: &str) -> anyhow::Result<()> {
    match outcome {
        LoadOutcome::Loaded => Ok(()),
        LoadOutcome::NotFound => bail!("{what} {id} not found."),
        LoadOutcome::Failed(message) => bail!(message),
        LoadOutcome::Discarded => bail!("{what} {id} was replaced before it loaded"),
    }
}

fn parse_signout_id(raw: &str) -> anyhow::Result<SignoutId> {
    match SignoutId::parse(raw) {
        Some(id) => Ok(id),
        None => bail!("Signout id must not be empty"),
    }
}

fn display_time(raw: &str) -> String {
    signout_core::signout::parse_timestamp(raw)
        .map(|ts| ts.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn print_list(heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("{heading}:");
    for item in items {
        println!("  - {item}");
    }
}

fn print_case(detail: &CaseDetail) {
    let snapshot = &detail.snapshot;
    println!("{} ({})", detail.title, detail.case_id);
    if let Some(difficulty) = &detail.difficulty {
        println!("Difficulty: {difficulty}");
    }
    println!("{}", snapshot.one_liner);
    println!("Code status: {}", snapshot.code_status);
    print_list("Active problems", &snapshot.active_problems);

    for (heading, values) in [("Vitals", &snapshot.vitals), ("Labs", &snapshot.labs)] {
        if values.is_empty() {
            continue;
        }
        println!("{heading}:");
        for (name, value) in values {
            println!("  {name}: {value}");
        }
    }
    print_list("Medications", &snapshot.meds);
    print_list("Pending", &snapshot.pending);

    if let Some(truth) = &detail.hidden_truth {
        println!("Diagnosis: {}", truth.diagnosis);
        print_list("Pitfalls", &truth.pitfalls);
        print_list("Recommended actions", &truth.recommended_actions);
    }
}

fn print_signout(signout: &Signout) {
    println!(
        "Signout {} for case {} ({})",
        signout.id,
        signout.case_id,
        display_time(&signout.created_at)
    );
    println!("Illness severity: {}", signout.illness_severity);
    println!("Patient summary: {}", signout.patient_summary);
    println!("Action list:");
    for item in signout.action_items() {
        println!("  - {item}");
    }
    println!("Situational awareness: {}", signout.situational_awareness);
    println!("Contingency plans: {}", signout.contingency_plans);
    println!("Receiver synthesis: {}", signout.receiver_synthesis);
    if let Some(free_text) = &signout.free_text {
        println!("Notes: {free_text}");
    }
}

fn print_score(panel: &ScorePanel) {
    if let Some(error) = &panel.error {
        eprintln!("{error}");
    }
    let Some(score) = &panel.score else {
        return;
    };
    println!(
        "Total: {} (rubric {})",
        score.total_score, score.rubric_version
    );
    for (name, value) in &score.subscores {
        println!("  {name}: {value}");
    }
    print_list("Strengths", &score.strengths);
    print_list("Improvements", &score.improvements);
    print_list("Missing critical", &score.missing_critical);
}
