use console::style;
use gemchat_store::{
    ChatConfig, ChatError, ChatEvent, ChatSession, ChatroomRecord, ImageAttachment, LoadOutcome,
    Message,
};

use crate::input::{show_prompt, Input};
use crate::render;

const HELP: &str = "Commands:
  <text>                 - Send a message
  /image <path> [text]   - Send an image with an optional caption
  /older                 - Load older messages
  /copy <n>              - Print message n for copying
  /back                  - Return to the dashboard
  /help                  - Show this help";

/// Run one chatroom. Returns `false` if input ended.
pub async fn run(input: &mut Input, record: &ChatroomRecord, config: ChatConfig) -> anyhow::Result<bool> {
    let (session, mut events) = ChatSession::with_simulated_replies(record.id.clone(), config);

    println!("{}", style(&record.title).bold().underlined());
    println!("{}", style("Loading messages...").dim());
    session.load_history().await;
    redraw(&session);

    let prompt = format!("{}> ", record.title);
    show_prompt(&prompt);

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                if handle_event(&session, event) {
                    show_prompt(&prompt);
                }
            }

            line = input.next_line() => {
                let Some(line) = line? else {
                    return Ok(false);
                };

                if let Some(command) = line.strip_prefix('/') {
                    if !handle_command(&session, command).await {
                        return Ok(true);
                    }
                } else if !line.is_empty() {
                    report(session.send(Some(&line), None));
                }
                show_prompt(&prompt);
            }
        }
    }
}

/// Returns `false` when the user leaves the chatroom
async fn handle_command(session: &ChatSession, command: &str) -> bool {
    let (name, arg) = command.split_once(' ').unwrap_or((command, ""));
    let arg = arg.trim();

    match name {
        "older" => {
            let session = session.clone();
            tokio::spawn(async move {
                match session.load_more().await {
                    LoadOutcome::Loaded { .. } | LoadOutcome::Superseded => {}
                    LoadOutcome::AlreadyLoading => println!("{}", style("Already loading...").dim()),
                    LoadOutcome::NothingMore => println!("{}", style("No older messages").dim()),
                }
            });
        }
        "image" => {
            let (path, caption) = arg.split_once(' ').unwrap_or((arg, ""));
            if path.is_empty() {
                println!("Usage: /image <path> [caption]");
                return true;
            }
            match ImageAttachment::from_path(path).await {
                Ok(image) => report(session.send(Some(caption), Some(image))),
                Err(e) => println!("{}", style(format!("Cannot attach {}: {}", path, e)).red()),
            }
        }
        "copy" => {
            let history = session.history();
            match arg
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| history.get(i))
            {
                Some(message) => println!("{}", message.clipboard_text()),
                None => println!("Usage: /copy <n> (message number)"),
            }
        }
        "back" => return false,
        "help" => println!("{}", HELP),
        _ => println!("Unknown command. Type /help for available commands."),
    }
    true
}

/// Print a session event; returns whether anything was printed
fn handle_event(session: &ChatSession, event: ChatEvent) -> bool {
    match event {
        ChatEvent::OlderLoadStarted => {
            println!("\n{}", style("Loading older messages...").dim());
        }
        ChatEvent::OlderLoaded { .. } => {
            println!();
            redraw(session);
        }
        ChatEvent::MessageAppended(message) | ChatEvent::ReplyReceived(message) => {
            print_appended(session, &message);
        }
        ChatEvent::ReplyStarted => {
            println!("{}", style("gemini is typing...").dim().italic());
        }
        ChatEvent::HistoryLoaded { .. } => return false,
    }
    true
}

fn print_appended(session: &ChatSession, message: &Message) {
    let index = session
        .history()
        .iter()
        .position(|m| m.id == message.id)
        .map_or(0, |i| i + 1);
    print!("\r");
    render::message(index, message);
}

fn redraw(session: &ChatSession) {
    let snapshot = session.snapshot();
    render::window(&snapshot.messages, snapshot.total, snapshot.has_more);
}

fn report(result: Result<Message, ChatError>) {
    match result {
        Ok(_) => {}
        Err(ChatError::EmptyMessage) => {}
        Err(ChatError::HistoryLoading) => {
            println!("{}", style("Messages are still loading").yellow());
        }
        Err(ChatError::ReplyPending) => {
            println!("{}", style("Wait for the reply before sending again").yellow());
        }
        Err(e) => println!("{}", style(e).red()),
    }
}
