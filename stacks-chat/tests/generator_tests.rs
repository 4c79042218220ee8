//! Tests for prompt construction, context truncation, and streamed answers.

use std::sync::Arc;

use futures::StreamExt;
use stacks_chat::{
    AnswerContext, GeneratorConfig, MockLlm, ResponseGenerator, ResponseStyle, Turn,
    SOURCE_GENERAL, SOURCE_LIBRARY,
};

fn generator_with(llm: Arc<MockLlm>) -> ResponseGenerator {
    ResponseGenerator::new(llm, GeneratorConfig::default())
}

#[test]
fn context_is_truncated_to_the_character_cap() {
    let llm = Arc::new(MockLlm::new(vec![]));
    let generator = generator_with(llm);

    let long = "x".repeat(5000);
    let context = AnswerContext::from_web(long.clone());
    let instruction =
        generator.build_system_instruction(&context, ResponseStyle::Detailed);

    let expected: String = long.chars().take(4000).collect();
    assert!(instruction.contains(&expected));
    assert!(!instruction.contains(&"x".repeat(4001)));
}

#[test]
fn source_note_reflects_context_presence() {
    let with_context = AnswerContext::from_passages(&["a passage".to_string()]);
    let without = AnswerContext::none();
    assert_eq!(ResponseGenerator::source_note(&with_context), SOURCE_LIBRARY);
    assert_eq!(ResponseGenerator::source_note(&without), SOURCE_GENERAL);

    // Whitespace-only context counts as absent.
    let blank = AnswerContext::from_web("  \n ");
    assert_eq!(ResponseGenerator::source_note(&blank), SOURCE_GENERAL);
}

#[test]
fn style_changes_wording_but_not_gating() {
    let llm = Arc::new(MockLlm::new(vec![]));
    let generator = generator_with(llm);
    let context = AnswerContext::from_passages(&["a passage".to_string()]);

    let concise = generator.build_system_instruction(&context, ResponseStyle::Concise);
    let detailed = generator.build_system_instruction(&context, ResponseStyle::Detailed);

    assert_ne!(concise, detailed);
    for instruction in [&concise, &detailed] {
        assert!(instruction.contains("Sorry, I am built to answer only data science questions."));
        assert!(instruction.contains("SOURCE NOTE: Source: Data Science Library"));
    }
}

#[tokio::test]
async fn concatenated_fragments_reproduce_the_full_answer() {
    let llm = Arc::new(MockLlm::new(vec![
        "Gradient descent ",
        "iteratively minimizes a loss.\n\n",
        "Source: Data Science Library",
    ]));
    let generator = generator_with(llm);

    let history = vec![Turn::user("What is gradient descent?")];
    let stream = generator.generate(&history, &AnswerContext::none(), ResponseStyle::Concise);
    let answer = stream.collect_text().await;

    assert_eq!(
        answer,
        "Gradient descent iteratively minimizes a loss.\n\nSource: Data Science Library"
    );
}

#[tokio::test]
async fn generation_passes_system_instruction_and_history_to_the_model() {
    let llm = Arc::new(MockLlm::new(vec!["ok"]));
    let generator = generator_with(llm.clone());

    let history = vec![
        Turn::user("What is a confusion matrix?"),
        Turn::assistant("A table of prediction outcomes."),
        Turn::user("And precision?"),
    ];
    let context = AnswerContext::from_passages(&["Precision is TP / (TP + FP).".to_string()]);
    generator.generate(&history, &context, ResponseStyle::Detailed).collect_text().await;

    let request = llm.last_request().expect("model was called");
    assert_eq!(request.history, history);
    assert!(request.system.contains("Precision is TP / (TP + FP)."));
    assert!((request.temperature - 0.1).abs() < f32::EPSILON);
}

#[tokio::test]
async fn mid_stream_failure_yields_a_final_error_fragment() {
    let llm = Arc::new(MockLlm::new(vec!["partial "]).failing_after_fragments());
    let generator = generator_with(llm);

    let history = vec![Turn::user("What is a tensor?")];
    let stream = generator.generate(&history, &AnswerContext::none(), ResponseStyle::Detailed);
    let answer = stream.collect_text().await;

    assert!(answer.starts_with("partial "));
    assert!(answer.contains("Error generating response from LLM:"));
}

#[tokio::test]
async fn closing_the_stream_ends_it_immediately() {
    let llm = Arc::new(MockLlm::new(vec!["one", "two", "three"]));
    let generator = generator_with(llm);

    let history = vec![Turn::user("What is a dataframe?")];
    let mut stream =
        generator.generate(&history, &AnswerContext::none(), ResponseStyle::Concise);

    assert_eq!(stream.next().await.as_deref(), Some("one"));
    stream.close();
    assert_eq!(stream.next().await, None);
}
