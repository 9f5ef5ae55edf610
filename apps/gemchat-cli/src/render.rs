use chrono::{DateTime, Local, Utc};
use console::style;
use gemchat_store::{ChatroomRecord, Message, MessageContent, Sender};

pub fn time(at: DateTime<Utc>, fmt: &str) -> String {
    at.with_timezone(&Local).format(fmt).to_string()
}

/// Approximate decoded size of a base64 data URI, in KB
fn image_kb(data_uri: &str) -> usize {
    let payload = data_uri.split_once(',').map(|(_, p)| p).unwrap_or(data_uri);
    (payload.len() * 3 / 4).div_ceil(1024)
}

fn content(content: &MessageContent) -> String {
    match content {
        MessageContent::Text { text } => text.clone(),
        MessageContent::Image { data_uri } => {
            format!("{}", style(format!("[image {} KB]", image_kb(data_uri))).yellow())
        }
        MessageContent::TextWithImage { text, data_uri } => format!(
            "{}\n        {}",
            style(format!("[image {} KB]", image_kb(data_uri))).yellow(),
            text
        ),
    }
}

pub fn message(index: usize, message: &Message) {
    let who = match message.sender {
        Sender::User => style("you   ").cyan().bold(),
        Sender::Agent => style("gemini").magenta().bold(),
    };

    println!(
        "{:>4} {} {} {}",
        style(index).dim(),
        style(time(message.created_at, "%H:%M")).dim(),
        who,
        content(&message.content)
    );
}

pub fn window(messages: &[Message], total: usize, has_more: bool) {
    if has_more {
        println!(
            "{}",
            style(format!(
                "── {} earlier messages, /older to load ──",
                total - messages.len()
            ))
            .dim()
        );
    }
    if messages.is_empty() {
        println!("{}", style("No messages yet. Say hello!").dim());
    }

    let offset = total - messages.len();
    for (i, msg) in messages.iter().enumerate() {
        message(offset + i + 1, msg);
    }
}

pub fn chatrooms(records: &[&ChatroomRecord]) {
    if records.is_empty() {
        println!("{}", style("No chatrooms. Create one with /new <title>").dim());
        return;
    }

    for (i, record) in records.iter().enumerate() {
        let created = record
            .created_at()
            .map(|at| format!("Created {}", time(at, "%Y-%m-%d %H:%M")))
            .unwrap_or_default();
        println!(
            "{:>3}. {}  {}  {}",
            i + 1,
            style(&record.title).bold(),
            style(&record.id).dim(),
            style(created).dim()
        );
    }
}
