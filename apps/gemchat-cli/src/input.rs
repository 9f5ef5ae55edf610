use std::io::{self, Write};
use tokio::io::{BufReader, Lines, Stdin};

/// Line-oriented stdin shared by every stage of the CLI
pub struct Input {
    lines: Lines<BufReader<Stdin>>,
}

impl Input {
    pub fn new(lines: Lines<BufReader<Stdin>>) -> Self {
        Self { lines }
    }

    /// Print `label` and wait for a trimmed line; `None` at end of input
    pub async fn prompt(&mut self, label: &str) -> anyhow::Result<Option<String>> {
        print!("{}", label);
        io::stdout().flush()?;
        self.next_line().await
    }

    /// Next trimmed line. Cancel-safe, so it can sit in a `select!`.
    pub async fn next_line(&mut self) -> anyhow::Result<Option<String>> {
        Ok(self
            .lines
            .next_line()
            .await?
            .map(|line| line.trim().to_string()))
    }
}

pub fn show_prompt(label: &str) {
    print!("{}", label);
    let _ = io::stdout().flush();
}
