//! Batch question answering against a real on-disk store.

mod common;

use common::{KeywordEmbedder, ScriptedSynthesizer};
use pdfqa::documents::{ChunkingConfig, Document, split_documents};
use pdfqa::qa::{PromptTemplate, QaError, QuestionBatch, QuestionError, RetrievalQa};
use pdfqa::store::{StoreError, VectorStore};
use tempfile::TempDir;

fn indexed_store(dir: &TempDir, embedder: &KeywordEmbedder) -> VectorStore {
    let documents = vec![
        Document::new(
            "handbook.pdf",
            "Vacation requests go to your manager two weeks ahead.\n\n\
             Expense reports are due on the fifth of each month.",
        ),
        Document::new(
            "security.pdf",
            "Badges must be worn at all times inside the office.\n\n\
             Report lost badges to the front desk immediately.",
        ),
    ];
    let chunks = split_documents(&documents, &ChunkingConfig::new(60, 0));
    let store = VectorStore::open(dir.path());
    store.rebuild(&chunks, embedder).unwrap();
    store
}

#[test]
fn test_answers_pair_with_questions_in_order() {
    let dir = TempDir::new().unwrap();
    let embedder = KeywordEmbedder::new(256);
    let store = indexed_store(&dir, &embedder);
    let synthesizer = ScriptedSynthesizer::default();

    let batch = QuestionBatch::parse(
        "When are expense reports due?\n\nWhat do I do with lost badges?\n",
    )
    .unwrap();
    let answers = RetrievalQa::new(&store, &embedder, &synthesizer)
        .with_top_k(2)
        .answer(&batch)
        .unwrap();

    assert_eq!(answers.len(), 2);
    assert_eq!(answers[0].question, "When are expense reports due?");
    assert_eq!(
        answers[0].text(),
        Some("2 chunks: When are expense reports due?")
    );
    assert!(answers[0].sources[0].chunk.content.contains("Expense reports"));
    assert!(answers[1].sources[0].chunk.content.contains("lost badges"));
    assert_eq!(synthesizer.prompts.lock().len(), 2);
}

#[test]
fn test_parallel_batch_matches_sequential() {
    let dir = TempDir::new().unwrap();
    let embedder = KeywordEmbedder::new(256);
    let store = indexed_store(&dir, &embedder);

    let questions: Vec<String> = (0..12)
        .map(|i| format!("Question {i}: where do vacation requests go?"))
        .collect();
    let batch = QuestionBatch::from_questions(&questions).unwrap();

    let sequential_synth = ScriptedSynthesizer::default();
    let sequential = RetrievalQa::new(&store, &embedder, &sequential_synth)
        .answer(&batch)
        .unwrap();

    let parallel_synth = ScriptedSynthesizer::default();
    let parallel = RetrievalQa::new(&store, &embedder, &parallel_synth)
        .with_parallelism(4)
        .answer(&batch)
        .unwrap();

    let texts = |answers: &[pdfqa::Answer]| -> Vec<Option<String>> {
        answers.iter().map(|a| a.text().map(str::to_string)).collect()
    };
    assert_eq!(texts(&sequential), texts(&parallel));
    assert_eq!(
        parallel.iter().map(|a| a.question.as_str()).collect::<Vec<_>>(),
        questions.iter().map(String::as_str).collect::<Vec<_>>()
    );
}

#[test]
fn test_failures_stay_with_their_question() {
    let dir = TempDir::new().unwrap();
    let embedder = KeywordEmbedder::new(256);
    let store = indexed_store(&dir, &embedder);
    let synthesizer = ScriptedSynthesizer {
        fail_when_question_contains: Some("badge".to_string()),
        ..Default::default()
    };

    let batch = QuestionBatch::parse("Where do vacation requests go?\nWho gets lost badge reports?\nWhen are expenses due?").unwrap();
    let answers = RetrievalQa::new(&store, &embedder, &synthesizer)
        .with_parallelism(2)
        .answer(&batch)
        .unwrap();

    assert!(answers[0].is_ok());
    assert!(matches!(
        &answers[1].outcome,
        Err(QuestionError::SynthesisFailure(_))
    ));
    assert!(!answers[1].sources.is_empty());
    assert!(answers[2].is_ok());
}

#[test]
fn test_custom_prompt_template() {
    let dir = TempDir::new().unwrap();
    let embedder = KeywordEmbedder::new(256);
    let store = indexed_store(&dir, &embedder);
    let synthesizer = ScriptedSynthesizer::default();

    let template = PromptTemplate::new("Q: {question}\nCTX:\n{context}").unwrap();
    RetrievalQa::new(&store, &embedder, &synthesizer)
        .with_prompt(template)
        .with_top_k(1)
        .answer(&QuestionBatch::parse("badges").unwrap())
        .unwrap();

    let prompts = synthesizer.prompts.lock();
    assert!(prompts[0].text.starts_with("Q: badges\nCTX:\n"));
    assert!(prompts[0].text.ends_with(&prompts[0].context));
}

#[test]
fn test_batch_fails_without_store() {
    let dir = TempDir::new().unwrap();
    let store = VectorStore::open(dir.path());
    let embedder = KeywordEmbedder::new(32);
    let synthesizer = ScriptedSynthesizer::default();

    let result = RetrievalQa::new(&store, &embedder, &synthesizer)
        .answer(&QuestionBatch::parse("anything").unwrap());
    assert!(matches!(
        result,
        Err(QaError::Store(StoreError::StoreNotInitialized(_)))
    ));
}

#[test]
fn test_empty_batch_is_rejected_up_front() {
    assert!(matches!(
        QuestionBatch::parse("\n   \n"),
        Err(QaError::EmptyQuestionBatch)
    ));
}
