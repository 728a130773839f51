use std::io;

use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::backend::SecretBackend;
use crate::console::Console;
use crate::identifier::SecretId;
use crate::secrets::{SecretError, SecretManager};

const MENU_PROMPT: &str =
    "\n> Please specify [e]ntry, [l]isting, [r]etrieval, [d]eletion or e[x]it: ";
const SECRET_ID_PROMPT: &str = "\n> Secret identifier: ";
const USER_ID_PROMPT: &str = "\n> User ID: ";
const PASSWORD_PROMPT: &str = "\n> Password: ";

const INVALID_INPUT: &str = "\n⚠️ Invalid input.";
const INVALID_SECRET_ID: &str =
    "\n⚠️ Invalid identifier: letters, numbers, underscores and hyphens are permitted (no spaces)";
const GOODBYE: &str = "\nThank you. Goodbye";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Enter,
    List,
    Retrieve,
    Delete,
    Exit,
}

impl Command {
    /// Accepts exactly one of `e`, `l`, `r`, `d`, `x`.
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "e" => Some(Self::Enter),
            "l" => Some(Self::List),
            "r" => Some(Self::Retrieve),
            "d" => Some(Self::Delete),
            "x" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// How a menu command ended.
enum Outcome {
    Done(Result<(), SecretError>),
    /// Input ran out in the middle of a prompt.
    EndOfInput,
}

/// Runs the menu until `x` or end of input. Only console I/O failures escape.
pub fn run<B: SecretBackend, C: Console>(
    manager: &SecretManager<B>,
    console: &mut C,
) -> io::Result<()> {
    loop {
        let Some(answer) = console.prompt(MENU_PROMPT)? else {
            break;
        };

        let Some(command) = Command::parse(&answer) else {
            writeln!(console.out(), "{}", INVALID_INPUT)?;
            continue;
        };

        let outcome = match command {
            Command::Exit => break,
            Command::Enter => enter(manager, console)?,
            Command::List => Outcome::Done(manager.list(console.out()).map(|_| ())),
            Command::Retrieve => match read_secret_id(console)? {
                Some(id) => Outcome::Done(manager.retrieve(console.out(), &id).map(|_| ())),
                None => Outcome::EndOfInput,
            },
            Command::Delete => match read_secret_id(console)? {
                Some(id) => Outcome::Done(manager.delete(console.out(), &id)),
                None => Outcome::EndOfInput,
            },
        };

        match outcome {
            Outcome::Done(result) => log_result(command, result),
            Outcome::EndOfInput => break,
        }
    }

    writeln!(console.out(), "{}", GOODBYE)?;
    Ok(())
}

fn enter<B: SecretBackend, C: Console>(
    manager: &SecretManager<B>,
    console: &mut C,
) -> io::Result<Outcome> {
    let Some(id) = read_secret_id(console)? else {
        return Ok(Outcome::EndOfInput);
    };

    let user_id = loop {
        match console.prompt(USER_ID_PROMPT)? {
            None => return Ok(Outcome::EndOfInput),
            Some(user_id) if !user_id.is_empty() => break user_id,
            Some(_) => writeln!(console.out(), "{}", INVALID_INPUT)?,
        }
    };

    let password: SecretString = loop {
        match console.prompt_hidden(PASSWORD_PROMPT)? {
            None => return Ok(Outcome::EndOfInput),
            Some(password) if !password.expose_secret().is_empty() => break password,
            Some(_) => writeln!(console.out(), "{}", INVALID_INPUT)?,
        }
    };

    Ok(Outcome::Done(manager.store(console.out(), &id, &user_id, &password)))
}

/// Prompts until the answer is a valid secret identifier. `None` means end of input.
fn read_secret_id<C: Console>(console: &mut C) -> io::Result<Option<SecretId>> {
    loop {
        let Some(answer) = console.prompt(SECRET_ID_PROMPT)? else {
            return Ok(None);
        };
        match SecretId::parse(&answer) {
            Ok(id) => return Ok(Some(id)),
            Err(_) => writeln!(console.out(), "{}", INVALID_SECRET_ID)?,
        }
    }
}

fn log_result(command: Command, result: Result<(), SecretError>) {
    match result {
        Ok(()) => debug!(?command, "operation completed"),
        Err(SecretError::Internal(cause)) => {
            warn!(?command, error = %cause, "operation abandoned")
        }
        Err(e) => debug!(?command, error = %e, "operation declined"),
    }
}
