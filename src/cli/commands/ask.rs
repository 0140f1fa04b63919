//! Ask command.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use serde_json::{Value, json};

use super::{load_embedder, open_store};
use crate::config::Settings;
use crate::qa::{Answer, GroqSynthesizer, QuestionBatch, RetrievalQa};

/// Arguments of the ask command.
#[derive(Debug, Default)]
pub struct AskOptions {
    pub questions: Vec<String>,
    pub file: Option<PathBuf>,
    pub top_k: Option<usize>,
    pub parallel: Option<usize>,
    pub json: bool,
}

/// Run ask command - answer every question, exit with failure if any failed.
pub fn run(options: AskOptions, settings: &Settings) -> anyhow::Result<ExitCode> {
    let batch = read_batch(&options.questions, options.file.as_deref())?;
    let prompt = settings.prompt.template().map_err(anyhow::Error::msg)?;

    // Fail before loading the model when nothing is indexed
    let store = open_store(settings);
    store.manifest().context("cannot read the vector store")?;

    let embedder = load_embedder(settings)?;
    let synthesizer =
        GroqSynthesizer::from_config(&settings.llm).context("failed to configure the LLM client")?;

    let qa = RetrievalQa::new(&store, &embedder, &synthesizer)
        .with_prompt(prompt)
        .with_top_k(options.top_k.unwrap_or(settings.retrieval.top_k))
        .with_parallelism(
            options
                .parallel
                .unwrap_or(settings.retrieval.parallel_questions),
        );

    let answers = qa.answer(&batch)?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&answers_json(&answers))?);
    } else {
        print!("{}", render_answers(&answers));
    }

    let failed = answers.iter().filter(|a| !a.is_ok()).count();
    if failed > 0 {
        eprintln!("{failed} of {} questions failed", answers.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Collect questions from flags and a file, or from stdin when neither is given.
fn read_batch(questions: &[String], file: Option<&Path>) -> anyhow::Result<QuestionBatch> {
    let mut lines: Vec<String> = questions.to_vec();

    if let Some(file) = file {
        let content = std::fs::read_to_string(file)
            .with_context(|| format!("failed to read questions from {}", file.display()))?;
        lines.extend(content.lines().map(str::to_string));
    }

    if questions.is_empty() && file.is_none() {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read questions from stdin")?;
        lines.extend(content.lines().map(str::to_string));
    }

    Ok(QuestionBatch::from_questions(lines)?)
}

fn source_labels(answer: &Answer) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for result in &answer.sources {
        if !labels.contains(&result.chunk.source) {
            labels.push(result.chunk.source.clone());
        }
    }
    labels
}

/// "Question i / Answer i" blocks, numbered from 1.
fn render_answers(answers: &[Answer]) -> String {
    let mut out = String::new();

    for (i, answer) in answers.iter().enumerate() {
        let n = i + 1;
        out.push_str(&format!("Question {n}: {}\n", answer.question));
        match &answer.outcome {
            Ok(text) => out.push_str(&format!("Answer {n}: {text}\n")),
            Err(e) => out.push_str(&format!("Answer {n}: [error] {e}\n")),
        }
        let sources = source_labels(answer);
        if !sources.is_empty() {
            out.push_str(&format!("Sources: {}\n", sources.join(", ")));
        }
        out.push('\n');
    }

    out
}

fn answers_json(answers: &[Answer]) -> Value {
    Value::Array(
        answers
            .iter()
            .map(|answer| {
                let sources: Vec<Value> = answer
                    .sources
                    .iter()
                    .map(|r| {
                        json!({
                            "source": r.chunk.source,
                            "chunk_index": r.chunk.chunk_index,
                            "similarity": r.similarity,
                        })
                    })
                    .collect();

                json!({
                    "question": answer.question,
                    "answer": answer.outcome.as_ref().ok(),
                    "error": answer.outcome.as_ref().err().map(|e| e.to_string()),
                    "sources": sources,
                })
            })
            .collect(),
    )
}
