//! Questlink terminal client - a line-oriented front end.
//!
//! Reads commands from stdin and prints the session whenever it changes.
//! Logs go to stderr; set `RUST_LOG=questlink=debug` for connection detail.
//!
//! ```text
//! connect <host> <port> <player>   open a session
//! disconnect                       close it
//! action <name>                    observe | traverse | acquire | deposit | speak
//! here <id>                        toggle an object from the surroundings
//! bag <id>                         toggle an object from the inventory
//! say <text>                       set the speech text
//! go                               submit the pending action
//! show                             print the whole session
//! quit
//! ```

use questlink::prelude::*;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "questlink=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let (client, mut events) = spawn_client(ClientConfig::default());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("questlink: type `connect <host> <port> <player>` to begin");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match run_command(&client, line.trim()).await {
                    Ok(true) => {}
                    Ok(false) => break,
                    Err(e) => println!("! {e}"),
                }
            }
            Some(event) = events.recv() => render_event(&client, event).await?,
        }
    }

    client.shutdown().await?;
    Ok(())
}

/// Applies one command line. Returns `false` when the user wants to quit.
async fn run_command(client: &ClientHandle, line: &str) -> Result<bool, QuestlinkError> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "" => {}
        "connect" => {
            let args: Vec<&str> = rest.split_whitespace().collect();
            let [host, port, player] = args.as_slice() else {
                println!("usage: connect <host> <port> <player>");
                return Ok(true);
            };
            let Ok(port) = port.parse::<u16>() else {
                println!("! port must be a number between 1 and 65535");
                return Ok(true);
            };
            let handle = client
                .connect(SessionEndpoint::new(*host, port, *player))
                .await?;
            println!("connecting (attempt {})", handle.into_inner());
        }
        "disconnect" => {
            if client.view().await?.connection_state.has_connection() {
                client.disconnect().await?;
            } else {
                println!("! not connected");
            }
        }
        "action" if rest.is_empty() => println!("usage: action <{}>", action_names()),
        "action" => {
            let action: PendingAction = rest.parse()?;
            client.set_pending_action(action).await?;
        }
        "here" | "bag" if rest.is_empty() => println!("usage: {command} <id>"),
        "here" => client.toggle_select(TargetSlot::Primary, rest).await?,
        "bag" => client.toggle_select(TargetSlot::Secondary, rest).await?,
        "say" => client.set_speech_payload(rest).await?,
        "go" => client.submit().await?,
        "show" => print_view(&client.view().await?),
        "quit" | "exit" => return Ok(false),
        other => println!("! unknown command: {other}"),
    }
    Ok(true)
}

async fn render_event(client: &ClientHandle, event: EngineEvent) -> Result<(), QuestlinkError> {
    match event {
        EngineEvent::StateChanged(state) => println!("[{}]", state.display_text()),
        EngineEvent::Notice(notice) => println!("! {notice}"),
        EngineEvent::SnapshotUpdated => {
            let view = client.view().await?;
            if let Some(latest) = view.transcript.entries().next() {
                println!("\n{latest}");
            }
            if !view.error_message.is_empty() {
                println!("! {}", view.error_message);
            }
        }
        EngineEvent::InputChanged => {
            let view = client.view().await?;
            println!("> {}", describe_input(&view));
        }
    }
    Ok(())
}

fn action_names() -> String {
    PendingAction::ALL
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" | ")
}

fn describe_input(view: &SessionView) -> String {
    let primary = view.selection.primary.as_deref().unwrap_or("-");
    let secondary = if view.pending_action == PendingAction::Speak {
        format!("\"{}\"", view.speech_payload)
    } else {
        view.selection.secondary.as_deref().unwrap_or("-").to_string()
    };
    format!("{} {primary} {secondary}", view.pending_action)
}

fn print_view(view: &SessionView) {
    let endpoint = view
        .endpoint
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".to_string());
    println!("status:  {} ({endpoint})", view.connection_state.display_text());
    println!("scene:   {}", view.scene_image);
    println!("here:    {}", list_items(&view.surroundings));
    println!("bag:     {}", list_items(&view.inventory));
    println!("input:   {}", describe_input(view));
    if !view.error_message.is_empty() {
        println!("error:   {}", view.error_message);
    }
    println!("\n{}", view.transcript.to_text());
}

fn list_items(items: &[Item]) -> String {
    if items.is_empty() {
        return "(nothing)".to_string();
    }
    items
        .iter()
        .map(|item| format!("{} [{}]", item.display_name, item.id))
        .collect::<Vec<_>>()
        .join(", ")
}
