use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use civic_ai::{LlmClient, OpenAiClient, UnavailableClient};
use civic_assistant::AssistantDispatcher;
use civic_cli::Cli;
use civic_lifecycle::ReportLifecycle;
use civic_store::{InMemoryCivicStore, StoreFixture};
use tokio::io::{AsyncBufReadExt, BufReader};

const REPL_PROMPT: &str = "civic> ";
const EXIT_COMMANDS: [&str; 2] = ["/quit", "/exit"];

pub(crate) struct Runtime {
    pub(crate) assistant: AssistantDispatcher,
    pub(crate) lifecycle: ReportLifecycle,
    pub(crate) user_id: Option<u64>,
}

pub(crate) fn load_store(fixture: Option<&Path>) -> Result<InMemoryCivicStore> {
    let Some(path) = fixture else {
        return Ok(InMemoryCivicStore::new());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read fixture {}", path.display()))?;
    let fixture = StoreFixture::from_json_str(&raw)
        .with_context(|| format!("failed to parse fixture {}", path.display()))?;
    tracing::info!(
        users = fixture.users.len(),
        reports = fixture.reports.len(),
        "loaded store fixture"
    );
    Ok(InMemoryCivicStore::with_fixture(fixture))
}

pub(crate) fn build_delegate(cli: &Cli) -> Result<Arc<dyn LlmClient>> {
    match cli.openai_config() {
        Some(config) => {
            let client = OpenAiClient::new(config).context("failed to build completion client")?;
            Ok(Arc::new(client))
        }
        None => {
            tracing::warn!("no API key configured; assistant will answer from local fallbacks");
            Ok(Arc::new(UnavailableClient))
        }
    }
}

impl Runtime {
    pub(crate) fn from_cli(cli: &Cli) -> Result<Self> {
        let store = Arc::new(load_store(cli.fixture.as_deref())?);
        let delegate = build_delegate(cli)?;
        Ok(Self {
            assistant: AssistantDispatcher::new(store.clone(), delegate, cli.assistant_config()),
            lifecycle: ReportLifecycle::new(store, cli.lifecycle_config()),
            user_id: cli.user_id,
        })
    }

    pub(crate) async fn answer(&self, message: &str) -> Result<String> {
        self.assistant
            .respond(message, self.user_id)
            .await
            .context("assistant failed to answer")
    }

    async fn print_unread(&self) -> Result<()> {
        let Some(user_id) = self.user_id else {
            return Ok(());
        };
        let unread = self
            .lifecycle
            .unread_notifications(user_id)
            .await
            .context("failed to load notifications")?;
        for notification in unread {
            println!("[notification] {}", notification.text);
        }
        Ok(())
    }

    pub(crate) async fn run_stdin(&self) -> Result<()> {
        self.print_unread().await?;
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            print!("{REPL_PROMPT}");
            std::io::stdout()
                .flush()
                .context("failed to flush stdout")?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if EXIT_COMMANDS.iter().any(|command| *command == line) {
                break;
            }
            println!("{}", self.answer(line).await?);
        }
        Ok(())
    }
}
