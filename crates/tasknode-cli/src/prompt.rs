//! Terminal prompts for credentials.

use std::io::{self, Write};

use anyhow::{bail, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountAction {
    Login,
    Signup,
}

impl AccountAction {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "l" | "login" => Some(AccountAction::Login),
            "s" | "signup" | "sign up" => Some(AccountAction::Signup),
            _ => None,
        }
    }
}

fn read_line(prompt: &str) -> Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

pub fn email() -> Result<String> {
    let email = read_line("Email: ")?;
    if email.is_empty() {
        bail!("Email is required");
    }
    Ok(email)
}

pub fn password(prompt: &str) -> Result<String> {
    let password = rpassword::prompt_password(prompt)?;
    if password.is_empty() {
        bail!("Password is required");
    }
    Ok(password)
}

/// Ask whether to log in or sign up. `None` when the answer is not understood.
pub fn account_action() -> Result<Option<AccountAction>> {
    let input = read_line("Would you like to [l]ogin or [s]ignup? ")?;
    Ok(AccountAction::parse(&input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_account_action() {
        assert_eq!(AccountAction::parse("l"), Some(AccountAction::Login));
        assert_eq!(AccountAction::parse(" Login \n"), Some(AccountAction::Login));
        assert_eq!(AccountAction::parse("S"), Some(AccountAction::Signup));
        assert_eq!(AccountAction::parse("signup"), Some(AccountAction::Signup));
        assert_eq!(AccountAction::parse(""), None);
        assert_eq!(AccountAction::parse("quit"), None);
    }
}
