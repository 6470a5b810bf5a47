use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::Context;
use em_chat::rulesets::{default_rulesets, USER_NAME};
use em_chat::{
    logging, providers, startup_timestamp, AgentRuntime, ChatConfig, ChatLoop, Em, RenderWidth,
    StdinPrompt, TurnRenderer,
};
use em_tui::{EnvConfig, Palette, SharedWriter};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = ChatConfig::from_env().context("invalid configuration")?;
    logging::init_logging(&config.log_filter);

    let provider = providers::provider_from_config(&config).map_err(anyhow::Error::msg)?;
    let profile = provider.profile();
    tracing::info!(provider = %profile.provider_id, model = %profile.model_id, "starting em");

    let env = EnvConfig::from_env();
    let renderer = TurnRenderer::new(
        Palette::from_config(&env),
        startup_timestamp(),
        RenderWidth::Terminal(env),
    );
    let prompt = renderer.prompt(USER_NAME);

    let runtime = AgentRuntime::new(provider, &default_rulesets());
    let output: SharedWriter = Arc::new(std::sync::Mutex::new(io::stdout()));
    let mut em = Em::new(runtime, renderer, output).with_spinner(io::stdout().is_terminal());

    let summary = ChatLoop::new(&mut em, StdinPrompt::stdin(), prompt)
        .run()
        .context("chat session failed")?;
    tracing::info!(turns = summary.turns, exit = ?summary.exit, "session ended");
    Ok(())
}
