//! The `tutor ask` command: answer one question, typed or photographed.

use super::{handle_interrupt, prompt_theme, spinner};
use clap::Args;
use dialoguer::{Input, Select};
use serde::Serialize;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Arc;
use tutor_core::{
    format_answer, AnswerOutcome, AnswerPipeline, Config, ExtractionResult, ImageHandle,
    PipelineInput, PipelineOutcome, PipelineReport, Subject,
};

/// Arguments for the `ask` command.
#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question text (omit to read it from --image, or to be prompted)
    pub question: Option<String>,

    /// Subject the question belongs to
    #[arg(short, long, value_name = "physics|chemistry|mathematics")]
    pub subject: Option<Subject>,

    /// Photo of the question; its text replaces QUESTION
    #[arg(short, long, value_name = "PATH", conflicts_with = "question")]
    pub image: Option<PathBuf>,

    /// OCR language code (e.g. eng, fre); defaults to [ocr].language
    #[arg(short, long)]
    pub language: Option<String>,

    /// Print a JSON report instead of formatted text
    #[arg(long)]
    pub json: bool,
}

/// Machine-readable result of one `ask`.
#[derive(Debug, Serialize)]
struct AskReport<'a> {
    subject: Subject,
    #[serde(skip_serializing_if = "Option::is_none")]
    extracted: Option<&'a str>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    answer: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    paragraphs: Vec<String>,
    message: String,
}

impl<'a> AskReport<'a> {
    fn new(subject: Subject, report: &'a PipelineReport) -> Self {
        let answer = report.outcome.answer();
        Self {
            subject,
            extracted: report.extracted.as_deref(),
            status: status_label(&report.outcome),
            answer,
            paragraphs: answer.map(format_answer).unwrap_or_default(),
            message: report.outcome.user_message(),
        }
    }
}

fn status_label(outcome: &PipelineOutcome) -> &'static str {
    match outcome {
        PipelineOutcome::Answered(AnswerOutcome::Success { .. }) => "answered",
        PipelineOutcome::Answered(AnswerOutcome::RateLimited) => "rate_limited",
        PipelineOutcome::Answered(AnswerOutcome::Failure { .. }) => "failed",
        PipelineOutcome::Invalid(_) => "invalid",
        PipelineOutcome::ExtractionFailed(ExtractionResult::Failure { .. }) => "ocr_failed",
        PipelineOutcome::ExtractionFailed(_) => "no_text",
    }
}

/// Execute the ask command.
pub async fn execute(args: AskArgs, config: &Config) -> anyhow::Result<()> {
    let interactive = std::io::stdin().is_terminal() && !args.json;

    let Some(subject) = resolve_subject(args.subject, interactive)? else {
        return Ok(());
    };
    let Some(input) = resolve_input(args.question, args.image, interactive)? else {
        return Ok(());
    };

    let pipeline = build_pipeline(config, args.language.as_deref())?;

    let progress = spinner("starting");
    let observer_bar = progress.clone();
    let pipeline = pipeline
        .with_observer(Arc::new(move |stage| observer_bar.set_message(stage.to_string())));

    let pending = pipeline.spawn(input, subject);
    let canceller = pending.canceller();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.abort();
        }
    });

    let report = pending.wait().await;
    interrupt.abort();
    progress.finish_and_clear();

    let Some(report) = report else {
        eprintln!("Cancelled.");
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&AskReport::new(subject, &report))?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn build_pipeline(config: &Config, language: Option<&str>) -> anyhow::Result<AnswerPipeline> {
    let pipeline = AnswerPipeline::from_config(config)?;
    Ok(match language {
        Some(language) => pipeline.with_language(language),
        None => pipeline,
    })
}

fn resolve_subject(subject: Option<Subject>, interactive: bool) -> anyhow::Result<Option<Subject>> {
    if let Some(subject) = subject {
        return Ok(Some(subject));
    }
    if !interactive {
        anyhow::bail!("--subject is required (physics, chemistry or mathematics)");
    }

    let labels: Vec<&str> = Subject::ALL.iter().map(Subject::as_str).collect();
    let choice = handle_interrupt(
        Select::with_theme(&prompt_theme())
            .with_prompt("Subject")
            .items(&labels)
            .default(0)
            .interact(),
    )?;
    Ok(choice.map(|i| Subject::ALL[i]))
}

fn resolve_input(
    question: Option<String>,
    image: Option<PathBuf>,
    interactive: bool,
) -> anyhow::Result<Option<PipelineInput>> {
    if let Some(path) = image {
        let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
        return Ok(Some(PipelineInput::Image(ImageHandle::from_path(expanded))));
    }
    if let Some(text) = question {
        return Ok(Some(PipelineInput::Text(text)));
    }
    if !interactive {
        anyhow::bail!("Provide a QUESTION or --image PATH");
    }

    // Blank input still goes through the pipeline so validation reports it.
    let text = handle_interrupt(
        Input::<String>::with_theme(&prompt_theme())
            .with_prompt("Question")
            .allow_empty(true)
            .interact_text(),
    )?;
    Ok(text.map(PipelineInput::Text))
}

fn print_report(report: &PipelineReport) {
    if let Some(extracted) = &report.extracted {
        eprintln!("Question: {extracted}");
        eprintln!();
    }

    match report.outcome.answer() {
        Some(answer) => {
            for paragraph in format_answer(answer) {
                println!("{paragraph}");
                println!();
            }
        }
        None => eprintln!("{}", report.outcome.user_message()),
    }
}
