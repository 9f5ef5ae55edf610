use console::style;
use gemchat_store::{search, ChatConfig, ChatroomRecord, ChatroomRegistry, KeyValueStore, RegistryError};

use crate::chatroom;
use crate::input::Input;
use crate::render;

const HELP: &str = "Commands:
  /list              - Show all chatrooms
  /new <title>       - Create a chatroom
  /delete <n|id>     - Delete a chatroom
  /search <query>    - Filter chatrooms by title
  /open <n|id>       - Enter a chatroom
  /help              - Show this help
  /quit              - Exit";

pub async fn run<S: KeyValueStore>(
    input: &mut Input,
    registry: &mut ChatroomRegistry<S>,
    config: ChatConfig,
) -> anyhow::Result<()> {
    registry.hydrate().await;

    println!("{}", style("Dashboard").bold());
    render::chatrooms(&registry.list().iter().collect::<Vec<_>>());
    println!("{}", style("Type /help for commands").dim());

    loop {
        let Some(line) = input.prompt("dashboard> ").await? else {
            return Ok(());
        };
        if line.is_empty() {
            continue;
        }

        let (command, arg) = line.split_once(' ').unwrap_or((line.as_str(), ""));
        let arg = arg.trim();

        match command {
            "/list" => render::chatrooms(&registry.list().iter().collect::<Vec<_>>()),
            "/new" => match registry.create(arg).await {
                Ok(record) => println!("{}", style(format!("✓ Chatroom '{}' created", record.title)).green()),
                Err(RegistryError::EmptyTitle) => println!("{}", style("Usage: /new <title>").red()),
                Err(e) => eprintln!("Failed to create chatroom: {:#}", anyhow::Error::from(e)),
            },
            "/delete" => {
                let Some(id) = resolve(registry.list(), arg).map(|r| r.id.clone()) else {
                    println!("{}", style(format!("No chatroom '{}'", arg)).red());
                    continue;
                };
                match registry.delete(&id).await {
                    Ok(_) => println!("{}", style("✓ Chatroom deleted").green()),
                    Err(e) => eprintln!("Failed to delete chatroom: {:#}", anyhow::Error::from(e)),
                }
            }
            "/search" => render::chatrooms(&search(registry.list(), arg)),
            "/open" => {
                let Some(record) = resolve(registry.list(), arg).cloned() else {
                    println!("{}", style(format!("No chatroom '{}'", arg)).red());
                    continue;
                };
                if !chatroom::run(input, &record, config.clone()).await? {
                    return Ok(());
                }
                render::chatrooms(&registry.list().iter().collect::<Vec<_>>());
            }
            "/help" => println!("{}", HELP),
            "/quit" | "/exit" => return Ok(()),
            _ => println!("Unknown command. Type /help for available commands."),
        }
    }
}

/// Look a chatroom up by its 1-based position in the list or by id
fn resolve<'a>(records: &'a [ChatroomRecord], arg: &str) -> Option<&'a ChatroomRecord> {
    if let Some(record) = records.iter().find(|r| r.id == arg) {
        return Some(record);
    }

    arg.parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| records.get(i))
}
