#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};

use agent_provider_mock::{MockProvider, MockReply};
use em_chat::rulesets::default_rulesets;
use em_chat::{shared_buffer, AgentRuntime, Em, PromptInput, RenderWidth, TurnRenderer};
use em_tui::Palette;

pub const SUBTITLE: &str = "Wed Dec 23, 1:33am";

/// Scripted user lines; records every prompt it was asked to show.
#[derive(Default)]
pub struct ScriptedInput {
    lines: VecDeque<String>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl ScriptedInput {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|line| line.to_string()).collect(),
            prompts: Arc::default(),
        }
    }

    pub fn prompt_log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.prompts)
    }
}

impl PromptInput for ScriptedInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts
            .lock()
            .expect("prompt log")
            .push(prompt.to_string());
        Ok(self.lines.pop_front())
    }
}

pub struct Harness {
    pub em: Em,
    pub provider: Arc<MockProvider>,
    pub output: Arc<Mutex<Vec<u8>>>,
}

impl Harness {
    pub fn new(replies: Vec<MockReply>, color: bool) -> Self {
        let provider = Arc::new(MockProvider::new(replies));
        let runtime = AgentRuntime::new(provider.clone(), &default_rulesets());
        let renderer = TurnRenderer::new(Palette::new(color), SUBTITLE, RenderWidth::Fixed(60));
        let (writer, output) = shared_buffer();
        Self {
            em: Em::new(runtime, renderer, writer).with_spinner(false),
            provider,
            output,
        }
    }

    pub fn plain(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|reply| MockReply::from(*reply)).collect(), false)
    }

    pub fn output(&self) -> String {
        String::from_utf8(self.output.lock().expect("output").clone()).expect("utf8 output")
    }
}

pub fn envelope(response: &str, continue_chatting: bool) -> String {
    serde_json::json!({ "response": response, "continue_chatting": continue_chatting }).to_string()
}
