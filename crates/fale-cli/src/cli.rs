//! Command-line surface of the `fale` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use fale_shared::types::{ApiKeyId, ConversationId, NoteId, TemplateId};

#[derive(Debug, Parser)]
#[command(name = "fale", version, about = "Fale Com Jesus from the terminal")]
pub struct Cli {
    /// Backend base URL. Overrides FALE_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Directory holding the local settings database.
    #[arg(long, global = true, env = "FALE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and keep the session for later commands.
    Login {
        email: String,
        /// Read from stdin when omitted.
        #[arg(long, env = "FALE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account and sign in.
    Register(RegisterArgs),
    Logout,
    /// Show the signed-in user.
    Whoami,
    /// Interactive chat. Lines are sent as messages; `/help` lists commands.
    Chat {
        /// Continue an existing conversation.
        #[arg(long)]
        conversation: Option<ConversationId>,
    },
    #[command(subcommand)]
    Conversations(ConversationCommand),
    #[command(subcommand)]
    Keys(KeyCommand),
    #[command(subcommand)]
    Prompts(PromptCommand),
    #[command(subcommand)]
    Notes(NoteCommand),
    /// Today's message and verse.
    Daily,
    #[command(subcommand)]
    Provider(ProviderCommand),
    #[command(subcommand)]
    Theme(ThemeCommand),
    /// Ask for a password reset e-mail.
    ForgotPassword { email: String },
    /// Set a new password with the token from the reset e-mail.
    ResetPassword {
        token: String,
        #[arg(long, env = "FALE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub first_name: String,
    #[arg(long, default_value = "")]
    pub last_name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "FALE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum ConversationCommand {
    List,
    Show { id: ConversationId },
    Rename { id: ConversationId, title: String },
    Delete { id: ConversationId },
    /// Write the transcript to a file, or stdout when no path is given.
    Export {
        id: ConversationId,
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Subcommand)]
pub enum KeyCommand {
    List,
    Add {
        provider: String,
        /// Read from stdin when omitted.
        #[arg(long)]
        key: Option<String>,
    },
    Remove { id: ApiKeyId },
}

#[derive(Debug, Subcommand)]
pub enum PromptCommand {
    List,
    Show {
        id: TemplateId,
    },
    Create {
        name: String,
        template: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Delete {
        id: TemplateId,
    },
}

#[derive(Debug, Subcommand)]
pub enum NoteCommand {
    List,
    Recent,
    Add {
        content: String,
        #[arg(long)]
        title: Option<String>,
    },
    /// Toggle the favourite flag.
    Favorite { id: NoteId },
    Delete { id: NoteId },
}

#[derive(Debug, Subcommand)]
pub enum ProviderCommand {
    /// Current selection and the catalogue.
    Show,
    /// Switch provider; the model resets to the provider's default.
    Set { provider: String },
    Model { model: String },
}

#[derive(Debug, Subcommand)]
pub enum ThemeCommand {
    Show,
    Toggle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_nested_subcommands() {
        let cli = Cli::parse_from(["fale", "--api-url", "http://x", "conversations", "rename", "7", "Novo"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://x"));
        match cli.command {
            Command::Conversations(ConversationCommand::Rename { id, title }) => {
                assert_eq!(id, ConversationId(7));
                assert_eq!(title, "Novo");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
