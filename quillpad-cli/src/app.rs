//! Line-oriented dashboards over the session controller

use anyhow::Result;
use quillpad_core::core_accounts::{Account, DashboardAction};
use quillpad_core::{PostId, SessionController};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};

const HELP: &str = "Commands: list, post, comment <id>, dump, help, exit";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    List,
    Post,
    Comment(Option<String>),
    Dump,
    Help,
    Exit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = match words.next()?.to_lowercase().as_str() {
            "list" | "ls" => Command::List,
            "post" => Command::Post,
            "comment" => Command::Comment(words.next().map(str::to_string)),
            "dump" => Command::Dump,
            "help" | "?" => Command::Help,
            "exit" | "quit" => Command::Exit,
            other => Command::Unknown(other.to_string()),
        };
        Some(command)
    }

    fn action(&self) -> Option<DashboardAction> {
        match self {
            Command::List | Command::Dump => Some(DashboardAction::ListPosts),
            Command::Post => Some(DashboardAction::CreatePost),
            Command::Comment(_) => Some(DashboardAction::AddComment),
            _ => None,
        }
    }
}

pub struct App<R, W> {
    session: Arc<SessionController>,
    input: Lines<R>,
    output: W,
}

impl<R, W> App<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(session: Arc<SessionController>, input: R, output: W) -> Self {
        Self {
            session,
            input: input.lines(),
            output,
        }
    }

    /// Login, then the dashboard, until `exit` or end of input
    pub async fn run(&mut self) -> Result<()> {
        self.say("Blogging Platform Login (type 'exit' to quit)").await?;
        if let Some(account) = self.login().await? {
            self.dashboard(&account).await?;
        }
        self.say("Goodbye.").await
    }

    async fn login(&mut self) -> Result<Option<Account>> {
        loop {
            let Some(username) = self.prompt("Username: ").await? else {
                return Ok(None);
            };
            if username.trim().eq_ignore_ascii_case("exit") {
                return Ok(None);
            }
            let Some(password) = self.prompt("Password: ").await? else {
                return Ok(None);
            };

            match self.session.login(username.trim(), &password) {
                Some(account) => return Ok(Some(account)),
                None => self.say("Invalid username or password.").await?,
            }
        }
    }

    async fn dashboard(&mut self, account: &Account) -> Result<()> {
        let dashboard = account.role().dashboard();
        self.say(&format!("== {} - {} ==", dashboard.title, account.identifier()))
            .await?;
        if let Some(welcome) = dashboard.welcome {
            self.say(welcome).await?;
        }
        self.show_posts().await?;
        self.say(HELP).await?;

        loop {
            let Some(line) = self.prompt("> ").await? else {
                return Ok(());
            };
            let Some(command) = Command::parse(&line) else {
                continue;
            };

            if let Some(action) = command.action() {
                if !dashboard.offers(action) {
                    self.say(&format!("Not available on the {}.", dashboard.title))
                        .await?;
                    continue;
                }
            }

            match command {
                Command::List => self.show_posts().await?,
                Command::Post => self.create_post().await?,
                Command::Comment(id) => self.add_comment(id).await?,
                Command::Dump => {
                    let json = self.session.export_json()?;
                    self.say(&json).await?;
                }
                Command::Help => self.say(HELP).await?,
                Command::Exit => return Ok(()),
                Command::Unknown(word) => {
                    self.say(&format!("Unknown command '{}'. {}", word, HELP))
                        .await?
                }
            }
        }
    }

    async fn create_post(&mut self) -> Result<()> {
        let Some(title) = self.prompt_non_blank("Enter post title: ").await? else {
            return self.say("Cancelled.").await;
        };
        let Some(content) = self.prompt_non_blank("Enter post content: ").await? else {
            return self.say("Cancelled.").await;
        };

        match self.session.create_post(&title, &content) {
            Ok(post) => {
                self.say(&format!("Post created: [{}] {}", post.id(), post.title()))
                    .await?;
                self.show_posts().await
            }
            Err(e) => self.say(&format!("Error: {}", e)).await,
        }
    }

    async fn add_comment(&mut self, id: Option<String>) -> Result<()> {
        let raw = match id {
            Some(id) => id,
            None => match self.prompt("Enter ID of post to comment on: ").await? {
                Some(id) => id,
                None => return Ok(()),
            },
        };
        let Ok(post_id) = raw.parse::<PostId>() else {
            return self.say("Invalid Post ID.").await;
        };
        let Some(text) = self.prompt_non_blank("Enter your comment: ").await? else {
            return self.say("Cancelled.").await;
        };

        match self.session.add_comment(post_id, &text) {
            Ok(_) => self.show_posts().await,
            Err(e) => self.say(&format!("Error: {}", e)).await,
        }
    }

    async fn show_posts(&mut self) -> Result<()> {
        let text = self.session.render_all_posts()?;
        self.say(&text).await
    }

    async fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        self.output.write_all(label.as_bytes()).await?;
        self.output.flush().await?;
        Ok(self.input.next_line().await?)
    }

    async fn prompt_non_blank(&mut self, label: &str) -> Result<Option<String>> {
        Ok(self
            .prompt(label)
            .await?
            .filter(|line| !line.trim().is_empty()))
    }

    async fn say(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        if !text.ends_with('\n') {
            self.output.write_all(b"\n").await?;
        }
        self.output.flush().await?;
        Ok(())
    }
}
