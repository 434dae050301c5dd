//! Interactive chat session.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::TryRecvError};

use fale_client::{AppContext, ChatError, SessionEvent};
use fale_shared::types::{ConversationId, TemplateId};

const HELP: &str = "\
/regen          gera uma nova resposta para a última mensagem
/new            começa uma nova conversa
/open ID        abre uma conversa existente
/template ID    usa um modelo de prompt (/template none para remover)
/quit           sai";

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Message(String),
    Regenerate,
    New,
    Open(ConversationId),
    Template(Option<TemplateId>),
    Help,
    Quit,
    Invalid(String),
}

fn parse(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Some(Input::Message(line.to_string()));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    let input = match (name, arg) {
        ("regen", _) => Input::Regenerate,
        ("new", _) => Input::New,
        ("quit" | "exit", _) => Input::Quit,
        ("help", _) => Input::Help,
        ("open", id) => match id.parse() {
            Ok(id) => Input::Open(id),
            Err(_) => Input::Invalid(format!("id inválido: {id:?}")),
        },
        ("template", "none") => Input::Template(None),
        ("template", id) => match id.parse() {
            Ok(id) => Input::Template(Some(id)),
            Err(_) => Input::Invalid(format!("id inválido: {id:?}")),
        },
        _ => Input::Invalid(format!("comando desconhecido: /{name}")),
    };
    Some(input)
}

/// Whether the session was ended under us since the last check. Drains
/// everything queued on `events`.
fn session_ended(events: &mut broadcast::Receiver<SessionEvent>) -> bool {
    let mut ended = false;
    loop {
        match events.try_recv() {
            Ok(SessionEvent::AuthenticationRequired) => ended = true,
            Ok(_) | Err(TryRecvError::Lagged(_)) => {}
            Err(TryRecvError::Empty | TryRecvError::Closed) => return ended,
        }
    }
}

pub async fn run(ctx: &AppContext, conversation: Option<ConversationId>) -> anyhow::Result<()> {
    let mut events = ctx.session.events().subscribe();
    let mut chat = ctx.chat();
    if let Some(id) = conversation {
        chat.open(id).await?;
        for entry in chat.transcript() {
            println!("{}: {}\n", entry.sender.label(), entry.content);
        }
    }

    let selection = ctx.providers.selection();
    eprintln!(
        "{} / {}. Digite /help para ver os comandos.",
        selection.provider(),
        selection.model()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("> ");
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::debug!("chat interrupted");
                break;
            }
        };
        let Some(line) = line else { break };
        let Some(input) = parse(&line) else { continue };

        match input {
            Input::Quit => break,
            Input::Help => eprintln!("{HELP}"),
            Input::Invalid(why) => eprintln!("{why}"),
            Input::New => {
                chat.start_new();
                eprintln!("Nova conversa.");
            }
            Input::Open(id) => match chat.open(id).await {
                Ok(()) => eprintln!("{}", chat.title().unwrap_or_default()),
                Err(e) => eprintln!("Erro: {e}"),
            },
            Input::Template(None) => chat.select_template(None),
            Input::Template(Some(id)) => match ctx.prompts().get(id).await {
                Ok(template) => {
                    eprintln!("Modelo: {}", template.name);
                    chat.select_template(Some(template));
                }
                Err(e) => eprintln!("Erro: {e}"),
            },
            Input::Regenerate => match chat.regenerate_response().await {
                Ok(Some(entry)) => println!("Bot: {}\n", entry.content),
                Ok(None) => eprintln!("Nenhuma mensagem para regenerar."),
                Err(e) => report(e),
            },
            Input::Message(text) => match chat.send_message(&text).await {
                Ok(entry) => println!("Bot: {}\n", entry.content),
                Err(e) => report(e),
            },
        }

        if session_ended(&mut events) {
            eprintln!("Sessão encerrada; entre novamente com `fale login`.");
            break;
        }
    }

    if let Some(id) = chat.conversation_id() {
        eprintln!("Conversa {id} salva.");
    }
    Ok(())
}

fn report(err: ChatError) {
    eprintln!("{err}");
    if let ChatError::Failed(cause) = &err {
        tracing::debug!(error = %cause, "send failed");
    }
}
