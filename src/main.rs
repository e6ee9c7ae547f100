use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use clap::{CommandFactory, Parser};
use colored::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use edu_portal_client::api::Destination;
use edu_portal_client::chat::ChatController;
use edu_portal_client::cli::{resolve_config, Args, Command};
use edu_portal_client::config::PortalConfig;
use edu_portal_client::error::QuizError;
use edu_portal_client::notify::Notifications;
use edu_portal_client::progress::ProgressController;
use edu_portal_client::quiz::{QuizController, QuizQuestion};
use edu_portal_client::terminal::{
    attempt_line, print_banners, TerminalChatView, TerminalProgressView, TerminalQuizView,
};
use edu_portal_client::transport::{HttpTransport, PortalTransport};

const BANNER_FLUSH: Duration = Duration::from_millis(100);

type Lines = tokio::io::Lines<BufReader<tokio::io::Stdin>>;

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "edu_portal_client=debug"
    } else {
        "edu_portal_client=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn prompt(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

async fn run_quiz(
    cfg: &PortalConfig,
    transport: Arc<dyn PortalTransport>,
    notifications: Notifications,
    question: QuizQuestion,
    hints_used: u32,
    lines: &mut Lines,
) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "{} question {} of {} (id {})",
        "Quiz".bright_cyan().bold(),
        question.question_num,
        question.total_questions,
        question.question_id
    );
    println!("{}", "Type an answer, `?` for a hint, `confidence=0.8` to set confidence, `:q` to quit.".dimmed());

    let view = Arc::new(TerminalQuizView::new());
    let quiz = QuizController::new(question, view.clone(), transport, notifications, &cfg.quiz)
        .with_hints_used(hints_used);

    loop {
        prompt(&view.prompt());
        let Some(line) = lines.next_line().await? else { break };
        let line = line.trim();

        if line == ":q" {
            break;
        }
        if line == "?" {
            // Failures are already reported as banners.
            let _ = quiz.request_hint().await;
            continue;
        }
        if let Some(value) = line.strip_prefix("confidence=") {
            match value.trim().parse::<f64>() {
                Ok(c) if (0.0..=1.0).contains(&c) => view.set_confidence(c),
                _ => eprintln!("{}", "confidence must be a number between 0 and 1".bright_yellow()),
            }
            continue;
        }

        view.set_answer(line);
        match quiz.submit_answer().await {
            Ok(outcome) => {
                if outcome.destination == Destination::QuizComplete {
                    println!("{}", "Quiz complete.".bright_green().bold());
                }
                break;
            }
            // Reported as banners; the form is unlocked for another try.
            Err(QuizError::Validation(_)) | Err(QuizError::Transport(_)) => {}
            Err(QuizError::Busy) => {}
        }
    }
    Ok(())
}

async fn run_chat(
    cfg: &PortalConfig,
    transport: Arc<dyn PortalTransport>,
    notifications: Notifications,
    session_id: String,
    lines: &mut Lines,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{} session {}", "Chat".bright_cyan().bold(), session_id);
    println!("{}", "Type a message and press enter. `/end` ends the session.".dimmed());

    let view = Arc::new(TerminalChatView::new());
    let chat = ChatController::new(session_id, view.clone(), transport, notifications, cfg.chat.clone());

    loop {
        prompt("> ");
        let Some(line) = lines.next_line().await? else { break };
        if line.trim() == "/end" {
            if let Ok(true) = chat.end_session().await {
                break;
            }
            continue;
        }
        view.set_input(line);
        chat.send_message().await;
        if !view.accepts_input() {
            break;
        }
    }
    Ok(())
}

async fn run_progress(
    transport: Arc<dyn PortalTransport>,
    notifications: Notifications,
    student_id: String,
    canvas: String,
    follow: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let progress = ProgressController::new(
        student_id,
        canvas,
        Arc::new(TerminalProgressView),
        transport,
        notifications,
    );
    let report = progress.load().await?;
    let now = chrono::Utc::now();
    for attempt in &report.attempts {
        println!("  {}", attempt_line(attempt, now));
    }
    println!(
        "{} {} attempts, trend {:+.1} points",
        "Progress".bright_cyan().bold(),
        report.attempts.len(),
        report.trend
    );
    if let Some(action) = follow {
        progress.follow_recommendation(&action).await?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    if let Err(e) = args.check() {
        e.exit();
    }

    if let Command::Completions { shell } = args.command {
        clap_complete::generate(shell, &mut Args::command(), "edu-portal", &mut std::io::stdout());
        return Ok(());
    }

    init_tracing(args.verbose);
    let cfg = resolve_config(&args)?;
    tracing::debug!(base_url = %cfg.base_url, "config loaded");

    let transport: Arc<dyn PortalTransport> = Arc::new(HttpTransport::from_config(&cfg));
    let notifications = Notifications::new(cfg.dismiss_after());
    let printer = tokio::spawn(print_banners(notifications.subscribe()));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let result = match args.command {
        Command::Quiz {
            question_id,
            question_num,
            total,
            hints_used,
        } => {
            let question = QuizQuestion {
                question_id,
                question_num,
                total_questions: total,
            };
            run_quiz(&cfg, transport, notifications, question, hints_used, &mut lines).await
        }
        Command::Chat { session_id } => {
            run_chat(&cfg, transport, notifications, session_id, &mut lines).await
        }
        Command::Progress {
            student_id,
            canvas,
            follow,
        } => {
            run_progress(transport, notifications, student_id, canvas, follow).await
        }
        Command::Completions { .. } => Ok(()),
    };

    // Let the printer drain banners raised just before exit.
    let _ = tokio::time::timeout(BANNER_FLUSH, printer).await;
    result
}
