use crate::config::Config;
use crate::db;
use crate::db::users;
use crate::models::user::User;
use std::collections::HashMap;
use std::fmt;

pub mod commands;

#[derive(Debug)]
pub enum CommandError {
    CommandNotFound(String),
    Unauthenticated,
    Usage(String),
    NotFound(String),
    Config { msg: String },
    Db(diesel::result::Error),
    Pool { msg: String },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::CommandNotFound(name) => write!(f, "command not found: {name}"),
            CommandError::Unauthenticated => write!(f, "not logged in, sign in first"),
            CommandError::Usage(msg) => write!(f, "{msg}"),
            CommandError::NotFound(msg) => write!(f, "{msg}"),
            CommandError::Config { msg } => write!(f, "configuration error: {msg}"),
            CommandError::Db(err) => write!(f, "database error: {err}"),
            CommandError::Pool { msg } => write!(f, "database error: {msg}"),
        }
    }
}

impl From<diesel::result::Error> for CommandError {
    fn from(error: diesel::result::Error) -> Self {
        CommandError::Db(error)
    }
}

impl From<diesel::r2d2::PoolError> for CommandError {
    fn from(error: diesel::r2d2::PoolError) -> Self {
        CommandError::Pool {
            msg: format!("{error}"),
        }
    }
}

pub struct State {
    pub config: Config,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Command {
    pub name: String,
    pub args: Vec<String>,
}

type Handler = Box<dyn Fn(&mut State, Command) -> Result<(), CommandError>>;

/// Name-to-handler dispatch table. Unknown names fail with
/// `CommandError::CommandNotFound`.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Handler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        CommandRegistry {
            handlers: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, name: &str, handler: F)
    where
        F: Fn(&mut State, Command) -> Result<(), CommandError> + 'static,
    {
        self.handlers.insert(name.to_string(), Box::new(handler));
    }

    pub fn run(&self, state: &mut State, command: Command) -> Result<(), CommandError> {
        match self.handlers.get(&command.name) {
            Some(handler) => handler(state, command),
            None => Err(CommandError::CommandNotFound(command.name)),
        }
    }
}

/// Wraps a handler that needs the current user. The wrapper resolves the
/// user recorded in the config and fails fast with `Unauthenticated` before
/// the handler runs.
pub fn authenticated<F>(handler: F) -> impl Fn(&mut State, Command) -> Result<(), CommandError>
where
    F: Fn(&mut State, Command, User) -> Result<(), CommandError>,
{
    move |state: &mut State, command: Command| {
        let username = state.config.current_user_name.clone();

        if username.is_empty() {
            return Err(CommandError::Unauthenticated);
        }

        let mut connection = db::pool().get()?;

        let user =
            users::find_by_name(&mut connection, &username).ok_or(CommandError::Unauthenticated)?;

        handler(state, command, user)
    }
}

pub fn registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    registry.register("login", commands::login);
    registry.register("register", commands::register);
    registry.register("reset", commands::reset);
    registry.register("users", commands::users);
    registry.register("agg", commands::agg);
    registry.register("addfeed", authenticated(commands::add_feed));
    registry.register("feeds", commands::feeds);
    registry.register("follow", authenticated(commands::follow));
    registry.register("following", authenticated(commands::following));
    registry.register("unfollow", authenticated(commands::unfollow));
    registry.register("browse", authenticated(commands::browse));

    registry
}
