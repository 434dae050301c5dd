//! One handler per subcommand. Each prints plain text to stdout.

use anyhow::{bail, Context};
use tokio::io::{AsyncBufReadExt, BufReader};

use fale_client::AppContext;
use fale_shared::providers::PROVIDERS;
use fale_shared::types::{NoteInput, PromptTemplateInput, RegisterProfile};

use crate::cli::{
    Command, ConversationCommand, KeyCommand, NoteCommand, PromptCommand, ProviderCommand,
    RegisterArgs, ThemeCommand,
};
use crate::repl;

pub async fn run(ctx: &AppContext, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let password = secret(password, "Senha").await?;
            ctx.login(&email, &password).await?;
            println!("Bem-vindo, {}!", display_name(ctx));
        }
        Command::Register(args) => register(ctx, args).await?,
        Command::Logout => {
            ctx.logout();
            println!("Sessão encerrada.");
        }
        Command::Whoami => {
            require_login(ctx)?;
            let profile = ctx.api.load_profile().await?;
            println!("{} <{}>", profile.display_name(), profile.email);
            if let Some(expires) = ctx.session.expires_at() {
                println!("token expira em {}", expires.to_rfc3339());
            }
        }
        Command::Chat { conversation } => {
            require_login(ctx)?;
            repl::run(ctx, conversation).await?;
        }
        Command::Conversations(cmd) => conversations(ctx, cmd).await?,
        Command::Keys(cmd) => keys(ctx, cmd).await?,
        Command::Prompts(cmd) => prompts(ctx, cmd).await?,
        Command::Notes(cmd) => notes(ctx, cmd).await?,
        Command::Daily => match ctx.daily_message().await? {
            Some(daily) => {
                println!("{}\n", daily.message);
                println!("\"{}\" ({})", daily.bible_verse, daily.bible_reference);
            }
            None => println!("Nenhuma mensagem para hoje."),
        },
        Command::Provider(cmd) => provider(ctx, cmd).await?,
        Command::Theme(cmd) => match cmd {
            ThemeCommand::Show => println!("{}", ctx.theme.mode()),
            ThemeCommand::Toggle => println!("{}", ctx.theme.toggle()?),
        },
        Command::ForgotPassword { email } => {
            let ack = ctx.session.forgot_password(&email).await?;
            println!("{}", ack.unwrap_or_else(|| "Solicitação enviada.".into()));
        }
        Command::ResetPassword { token, password } => {
            let password = secret(password, "Nova senha").await?;
            let confirm = prompt("Confirme a senha").await?;
            let ack = ctx
                .session
                .reset_password(&token, &password, &confirm)
                .await?;
            println!("{}", ack.unwrap_or_else(|| "Senha redefinida.".into()));
        }
    }
    Ok(())
}

async fn register(ctx: &AppContext, args: RegisterArgs) -> anyhow::Result<()> {
    let password = secret(args.password, "Senha").await?;
    let confirm_password = prompt("Confirme a senha").await?;
    let profile = RegisterProfile {
        first_name: args.first_name,
        last_name: args.last_name,
        email: args.email,
        password,
        confirm_password,
    };
    ctx.register(&profile).await?;
    println!("Conta criada. Bem-vindo, {}!", display_name(ctx));
    Ok(())
}

async fn conversations(ctx: &AppContext, cmd: ConversationCommand) -> anyhow::Result<()> {
    require_login(ctx)?;
    let mut manager = ctx.conversations();
    match cmd {
        ConversationCommand::List => {
            for c in manager.refresh().await? {
                let updated = c
                    .updated_at
                    .map(|t| t.format("%d/%m/%Y %H:%M").to_string())
                    .unwrap_or_default();
                println!("{:>6}  {:<16}  {}", c.id.0, updated, c.title);
            }
        }
        ConversationCommand::Show { id } => {
            let conversation = manager.get(id).await?;
            println!("# {}\n", conversation.title);
            for m in conversation.messages {
                println!("{}: {}\n", m.sender.label(), m.content);
            }
        }
        ConversationCommand::Rename { id, title } => {
            let renamed = manager.rename(id, &title).await?;
            println!("Conversa {} renomeada para \"{}\".", renamed.id, renamed.title);
        }
        ConversationCommand::Delete { id } => {
            manager.delete(id).await?;
            println!("Conversa {id} excluída.");
        }
        ConversationCommand::Export { id, output } => {
            let transcript = manager.export(id).await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, transcript)
                        .await
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("Conversa exportada para {}.", path.display());
                }
                None => print!("{transcript}"),
            }
        }
    }
    Ok(())
}

async fn keys(ctx: &AppContext, cmd: KeyCommand) -> anyhow::Result<()> {
    require_login(ctx)?;
    let mut manager = ctx.api_keys();
    match cmd {
        KeyCommand::List => {
            for k in manager.refresh().await? {
                let status = if k.is_active { "ativa" } else { "inativa" };
                println!("{:>6}  {:<12}  {}", k.id.0, k.provider, status);
            }
        }
        KeyCommand::Add { provider, key } => {
            let key = secret(key, "Chave de API").await?;
            manager.add(&provider, &key).await?;
            println!("Chave adicionada para {provider}.");
            ctx.providers.reconcile(manager.keys())?;
        }
        KeyCommand::Remove { id } => {
            manager.remove(id).await?;
            println!("Chave {id} removida.");
            ctx.providers.reconcile(manager.keys())?;
        }
    }
    Ok(())
}

async fn prompts(ctx: &AppContext, cmd: PromptCommand) -> anyhow::Result<()> {
    require_login(ctx)?;
    let mut manager = ctx.prompts();
    match cmd {
        PromptCommand::List => {
            for t in manager.refresh().await? {
                let kind = if t.is_system { "sistema" } else { "pessoal" };
                println!("{:>6}  {:<8}  {}", t.id.0, kind, t.name);
            }
        }
        PromptCommand::Show { id } => {
            let t = manager.get(id).await?;
            println!("{}", t.name);
            if let Some(description) = t.description.filter(|d| !d.is_empty()) {
                println!("{description}");
            }
            println!("\n{}", t.template_text);
        }
        PromptCommand::Create {
            name,
            template,
            description,
        } => {
            let created = manager
                .create(&PromptTemplateInput {
                    name,
                    description,
                    template,
                })
                .await?;
            println!("Modelo {} criado.", created.id);
        }
        PromptCommand::Delete { id } => {
            manager.delete(id).await?;
            println!("Modelo {id} excluído.");
        }
    }
    Ok(())
}

async fn notes(ctx: &AppContext, cmd: NoteCommand) -> anyhow::Result<()> {
    require_login(ctx)?;
    let mut manager = ctx.notes();
    let print = |n: &fale_shared::types::Note| {
        let star = if n.is_favorite { "*" } else { " " };
        let title = n.title.as_deref().unwrap_or("(sem título)");
        println!("{:>6} {star} {title}: {}", n.id.0, n.content);
    };
    match cmd {
        NoteCommand::List => manager.refresh().await?.iter().for_each(print),
        NoteCommand::Recent => manager.recent().await?.iter().for_each(print),
        NoteCommand::Add { content, title } => {
            let note = manager
                .create(&NoteInput {
                    title,
                    content,
                    ..NoteInput::default()
                })
                .await?;
            println!("Nota {} criada.", note.id);
        }
        NoteCommand::Favorite { id } => {
            manager.refresh().await?;
            let note = manager.toggle_favorite(id).await?;
            let state = if note.is_favorite { "marcada" } else { "desmarcada" };
            println!("Nota {id} {state} como favorita.");
        }
        NoteCommand::Delete { id } => {
            manager.delete(id).await?;
            println!("Nota {id} excluída.");
        }
    }
    Ok(())
}

async fn provider(ctx: &AppContext, cmd: ProviderCommand) -> anyhow::Result<()> {
    match cmd {
        ProviderCommand::Show => {
            let selection = ctx.providers.selection();
            for p in PROVIDERS {
                let marker = if p.id == selection.provider() { ">" } else { " " };
                println!("{marker} {:<10} {}", p.id, p.display_name);
                for m in p.models {
                    let current = p.id == selection.provider() && *m == selection.model();
                    println!("      {}{m}", if current { "* " } else { "  " });
                }
            }
        }
        ProviderCommand::Set { provider } => {
            let selection = ctx.providers.set_provider(&provider)?;
            println!("{} / {}", selection.provider(), selection.model());
        }
        ProviderCommand::Model { model } => {
            let selection = ctx.providers.set_model(&model)?;
            println!("{} / {}", selection.provider(), selection.model());
        }
    }
    Ok(())
}

fn require_login(ctx: &AppContext) -> anyhow::Result<()> {
    if !ctx.session.has_access_token() {
        bail!("não autenticado; use `fale login <email>` primeiro");
    }
    Ok(())
}

fn display_name(ctx: &AppContext) -> String {
    ctx.session
        .profile()
        .map(|p| p.display_name())
        .unwrap_or_default()
}

/// `given`, or a line typed at a prompt.
async fn secret(given: Option<String>, label: &str) -> anyhow::Result<String> {
    match given {
        Some(value) => Ok(value),
        None => prompt(label).await,
    }
}

async fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{label}: ");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("reading from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
