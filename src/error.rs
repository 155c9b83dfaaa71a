use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Serenity error: {0}")]
    Serenity(Box<poise::serenity_prelude::Error>),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Storage I/O error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Storage format error: {0}")]
    StorageFormat(#[from] serde_json::Error),

    #[error("Invalid list name: {0}")]
    InvalidListName(String),

    #[error("Invalid nick: {0}")]
    InvalidNick(String),

    #[error("Pinglist already exists: {0}")]
    ListExists(String),

    #[error("No such ping list: {0}")]
    NoSuchList(String),

    #[error("Ping list is empty: {0}")]
    ListEmpty(String),
}

impl From<poise::serenity_prelude::Error> for BotError {
    fn from(err: poise::serenity_prelude::Error) -> Self {
        BotError::Serenity(Box::new(err))
    }
}

impl BotError {
    /// Returns a user-friendly error message suitable for displaying in chat
    pub fn user_message(&self) -> String {
        match self {
            BotError::Serenity(_) => {
                "Sorry, I'm having trouble communicating with Discord right now. Please try again later.".to_string()
            }
            BotError::EnvVar(_) => {
                "Sorry, there's a configuration issue on my end. Please contact the bot administrator.".to_string()
            }
            BotError::Storage(_) | BotError::StorageFormat(_) => {
                "Sorry, I could not save the ping lists. Please try again later.".to_string()
            }
            BotError::InvalidListName(_) => {
                "List names can only contain alphanumeric characters.".to_string()
            }
            BotError::InvalidNick(nick) => format!("Invalid nick: {nick}"),
            BotError::ListExists(name) => format!("Pinglist {name} already exists."),
            BotError::NoSuchList(_) => "No such ping list.".to_string(),
            BotError::ListEmpty(_) => "Ping list is empty.".to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_errors_render_the_expected_reply_lines() {
        assert_eq!(
            BotError::InvalidListName("a b".to_string()).user_message(),
            "List names can only contain alphanumeric characters."
        );
        assert_eq!(
            BotError::InvalidNick("9bad".to_string()).user_message(),
            "Invalid nick: 9bad"
        );
        assert_eq!(
            BotError::ListExists("team".to_string()).user_message(),
            "Pinglist team already exists."
        );
        assert_eq!(
            BotError::NoSuchList("ghost".to_string()).user_message(),
            "No such ping list."
        );
        assert_eq!(
            BotError::ListEmpty("team".to_string()).user_message(),
            "Ping list is empty."
        );
    }
}
