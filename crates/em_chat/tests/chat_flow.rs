mod support;

use agent_provider_mock::MockReply;
use em_chat::rulesets::{GREETING_INSTRUCTION, PERSONA_RULESET_NAME};
use em_chat::{ChatError, ChatLoop, ChatState, ExitReason, RuntimeError};
use em_tui::strip_ansi;
use pretty_assertions::assert_eq;

use support::{envelope, Harness, ScriptedInput};

const PROMPT: &str = "Jacob> ";

fn run_chat(harness: &mut Harness, lines: &[&str]) -> (Result<em_chat::ChatSummary, ChatError>, usize) {
    let input = ScriptedInput::new(lines);
    let prompts = input.prompt_log();
    let mut chat = ChatLoop::new(&mut harness.em, input, PROMPT);
    assert_eq!(chat.state(), ChatState::Active);
    let result = chat.run();
    assert_eq!(chat.state(), ChatState::Terminated);
    let prompt_count = prompts.lock().expect("prompts").len();
    (result, prompt_count)
}

#[test]
fn continue_keeps_prompting_and_stop_ends_the_session() {
    let mut harness = Harness::plain(&[
        &envelope("Hello Jacob!", true),
        &envelope("Sure.", true),
        &envelope("Bye!", false),
    ]);

    let (result, prompts) = run_chat(&mut harness, &["hi", "see you", "unused"]);
    let summary = result.expect("chat");

    assert_eq!(summary.turns, 2);
    assert_eq!(summary.exit, ExitReason::Stopped);
    assert_eq!(prompts, 2);

    let output = harness.output();
    assert!(output.contains("│ Bye!"));
    assert_eq!(output.matches('╭').count(), 3);
}

#[test]
fn greeting_goes_first_and_its_outcome_is_ignored() {
    let mut harness = Harness::plain(&[&envelope("Hi, I'm Em.", false), &envelope("Ok", true)]);

    let (result, prompts) = run_chat(&mut harness, &["hello"]);
    let summary = result.expect("chat");

    assert_eq!(prompts, 2);
    assert_eq!(summary.turns, 1);
    assert_eq!(summary.exit, ExitReason::EndOfInput);

    let requests = harness.provider.requests();
    assert_eq!(requests[0].last_user_text(), Some(GREETING_INSTRUCTION));
    assert_eq!(requests[1].last_user_text(), Some("hello"));
}

#[test]
fn malformed_greeting_does_not_end_the_session() {
    let mut harness = Harness::plain(&["not json at all", &envelope("Bye!", false)]);

    let (result, prompts) = run_chat(&mut harness, &["bye"]);

    assert_eq!(result.expect("chat").exit, ExitReason::Stopped);
    assert_eq!(prompts, 1);
    assert!(harness.output().starts_with("Invalid JSON\n"));
}

#[test]
fn malformed_reply_prints_notice_and_terminates() {
    let mut harness = Harness::plain(&[&envelope("Hi", true), "not json at all"]);

    let (result, prompts) = run_chat(&mut harness, &["hello", "again"]);
    let summary = result.expect("chat");

    assert_eq!(summary.exit, ExitReason::InvalidEnvelope);
    assert_eq!(summary.turns, 1);
    assert_eq!(prompts, 1);
    assert!(harness.output().ends_with("Invalid JSON\n"));
}

#[test]
fn parse_failure_is_observably_the_same_as_stop() {
    let lines = ["one", "two", "three"];
    let mut stopped = Harness::plain(&[&envelope("Hi", true), &envelope("Bye!", false)]);
    let mut invalid = Harness::plain(&[&envelope("Hi", true), r#"{"response": 3}"#]);

    let (stop_result, stop_prompts) = run_chat(&mut stopped, &lines);
    let (invalid_result, invalid_prompts) = run_chat(&mut invalid, &lines);

    assert_eq!(stop_prompts, invalid_prompts);
    assert_eq!(
        stop_result.expect("chat").turns,
        invalid_result.expect("chat").turns
    );
    assert!(invalid.output().contains("Invalid response: "));
}

#[test]
fn bold_markdown_reaches_the_panel() {
    let mut harness = Harness::new(
        vec![MockReply::from(envelope("Hello **Jacob**!", true))],
        true,
    );

    let outcome = harness.em.respond("hi").expect("turn");
    assert!(outcome.keeps_chatting());

    let output = harness.output();
    assert!(output.contains("\x1b[1m"));
    let plain = strip_ansi(&output);
    assert!(plain.contains("Hello Jacob!"));
    assert!(plain.contains("╭─ Em "));
    assert!(plain.contains(" Wed Dec 23, 1:33am ─╯"));
}

#[test]
fn end_of_input_ends_the_session() {
    let mut harness = Harness::plain(&[&envelope("Hi", true)]);

    let input = ScriptedInput::new(&[]);
    let mut chat = ChatLoop::new(&mut harness.em, input, PROMPT);
    assert_eq!(chat.state(), ChatState::Active);
    let summary = chat.run().expect("chat");

    assert_eq!(summary.turns, 0);
    assert_eq!(summary.exit, ExitReason::EndOfInput);
    assert_eq!(chat.state(), ChatState::Terminated);
}

#[test]
fn terminated_loop_is_absorbing() {
    let mut harness = Harness::plain(&[&envelope("Hi", true), &envelope("Bye!", false)]);

    let input = ScriptedInput::new(&["bye", "still here?"]);
    let prompts = input.prompt_log();
    let mut chat = ChatLoop::new(&mut harness.em, input, PROMPT);
    assert_eq!(chat.run().expect("chat").exit, ExitReason::Stopped);
    assert_eq!(chat.state(), ChatState::Terminated);

    let again = chat.run().expect("second run");
    assert_eq!(again.turns, 0);
    assert_eq!(again.exit, ExitReason::Terminated);
    assert_eq!(chat.state(), ChatState::Terminated);
    drop(chat);

    assert_eq!(prompts.lock().expect("prompts").len(), 1);
    assert_eq!(harness.provider.requests().len(), 2);
}

#[test]
fn provider_failure_is_an_error() {
    let mut harness = Harness::new(
        vec![
            MockReply::from(envelope("Hi", true)),
            MockReply::Fail("connection reset".to_string()),
        ],
        false,
    );

    let (result, _) = run_chat(&mut harness, &["hello"]);
    match result {
        Err(ChatError::Runtime(error)) => {
            assert_eq!(error, RuntimeError::Provider("connection reset".to_string()))
        }
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn default_mock_echoes_until_farewell_and_keeps_history() {
    let mut harness = Harness::plain(&[]);

    let (result, prompts) = run_chat(&mut harness, &["how are you", "ok bye now", "unused"]);
    let summary = result.expect("chat");

    assert_eq!(summary.exit, ExitReason::Stopped);
    assert_eq!(prompts, 2);

    let output = harness.output();
    assert!(output.contains("You said: how are you"));
    assert!(output.contains("Goodbye!"));

    let requests = harness.provider.requests();
    assert_eq!(requests.len(), 3);
    assert!(requests[0].instructions.starts_with(&format!("Ruleset: {PERSONA_RULESET_NAME}")));
    assert_eq!(requests[2].messages.len(), 5);
    assert_eq!(harness.em.runtime().memory().len(), 6);
}
