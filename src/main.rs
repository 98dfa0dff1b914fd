#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # kodcheck
//!
//! Grading service for step-by-step coding lessons.
//!
//! `kodcheck serve` exposes `POST /api/openai/check-code` for the lesson UI.
//! `kodcheck check` grades one submission from the command line.

use std::path::PathBuf;

use anyhow::{Context, Result};
use bpaf::*;
use colored::Colorize;
use dotenvy::dotenv;
use kodcheck::{GradeRequest, Grader, Question, Verdict, config, server};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, util::SubscriberInitExt};

/// Where the submission for `check` comes from.
#[derive(Debug, Clone)]
enum CodeSource {
    /// Code given on the command line.
    Inline(String),
    /// Code read from a file.
    File(PathBuf),
}

/// Where the task description for `check` comes from.
#[derive(Debug, Clone)]
enum TaskSource {
    /// A ready-made description.
    Description(String),
    /// Lesson steps, joined one per line.
    Steps(Vec<String>),
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Run the grading endpoint
    Serve {
        /// Listen host override
        host: Option<String>,
        /// Listen port override
        port: Option<u16>,
    },
    /// Grade a single submission
    Check {
        /// Question title
        title: String,
        /// Task text
        task:  TaskSource,
        /// Submitted code
        code:  CodeSource,
        /// Print raw JSON instead of a summary
        json:  bool,
    },
}

/// Parse the command line arguments and return a `Cmd` enum
fn options() -> Cmd {
    let host = long("host")
        .help("Address to listen on (overrides KODCHECK_HOST)")
        .argument::<String>("HOST")
        .optional();
    let port = long("port")
        .help("Port to listen on (overrides PORT)")
        .argument::<u16>("PORT")
        .optional();
    let serve = construct!(Cmd::Serve { host, port })
        .to_options()
        .command("serve")
        .help("Serve the grading endpoint over HTTP");

    let title = long("title")
        .help("Question title")
        .argument::<String>("TITLE")
        .fallback(String::new());

    let description = long("description")
        .short('d')
        .help("Full task description")
        .argument::<String>("TEXT")
        .map(TaskSource::Description);
    let steps = long("step")
        .help("One lesson step; repeat for each step")
        .argument::<String>("TEXT")
        .some("at least one --step or a --description is required")
        .map(TaskSource::Steps);
    let task = construct!([description, steps]);

    let inline = long("code")
        .short('c')
        .help("Submitted code")
        .argument::<String>("CODE")
        .map(CodeSource::Inline);
    let file = long("code-file")
        .help("File containing the submitted code")
        .argument::<PathBuf>("PATH")
        .map(CodeSource::File);
    let code = construct!([inline, file]);

    let json = long("json").help("Print the verdict as JSON").switch();

    let check = construct!(Cmd::Check {
        title,
        task,
        code,
        json
    })
    .to_options()
    .command("check")
    .help("Grade one submission and print the verdict");

    construct!([serve, check])
        .to_options()
        .descr("Answer checker for step-by-step coding lessons")
        .run()
}

/// Prints a verdict in a human-friendly form.
fn print_summary(verdict: &Verdict) {
    let status = if verdict.is_correct {
        "CORRECT".green().bold()
    } else {
        "INCORRECT".red().bold()
    };
    println!("{status}  {}", verdict.feedback);
    for comment in &verdict.line_comments {
        println!("  {} {}", format!("line {}:", comment.line_number).dimmed(), comment.content);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false);
    let filter_layer =
        EnvFilter::try_from_env("KODCHECK_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    match options() {
        Cmd::Serve { host, port } => {
            let cfg = config::install(config::ConfigState::from_env().with_listen(host, port));
            if cfg.openai().is_none() {
                tracing::warn!("OPENAI_API_KEY is not set; every verdict will use the fallback");
            }
            let addr = cfg.socket_addr()?;
            server::serve(addr, Grader::from_config(), cfg.cors_origin()).await?;
        }
        Cmd::Check {
            title,
            task,
            code,
            json,
        } => {
            let code = match code {
                CodeSource::Inline(code) => code,
                CodeSource::File(path) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Could not read {}", path.display()))?,
            };
            let question = match task {
                TaskSource::Description(description) => Question::new(title, description),
                TaskSource::Steps(steps) => Question::from_steps(title, steps),
            };

            let verdict = Grader::from_config()
                .grade(&GradeRequest::new(code, question))
                .await;

            if json {
                println!("{}", serde_json::to_string_pretty(&verdict)?);
            } else {
                print_summary(&verdict);
            }
        }
    };

    Ok(())
}
