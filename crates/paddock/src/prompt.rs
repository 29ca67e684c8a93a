//! Terminal credential prompt.
//!
//! Prompts go to stderr: stdout is the inventory channel the
//! orchestrator parses. Passwords are read without echo.

use std::io::Write;

use secrecy::SecretString;
use url::Url;

use paddock_core::CredentialPrompt;

/// Interactive prompt against the controlling terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn password(&self, endpoint: &Url, username: &str) -> std::io::Result<SecretString> {
        eprint!("Password for {username} at {endpoint}: ");
        std::io::stderr().flush()?;
        let password = rpassword::read_password()?;
        Ok(SecretString::from(password))
    }

    fn username(&self, current: &str) -> std::io::Result<String> {
        let input: String = dialoguer::Input::new()
            .with_prompt(format!("Username [{current}]"))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| match e {
                dialoguer::Error::IO(io) => io,
            })?;

        Ok(if input.is_empty() {
            current.to_string()
        } else {
            input
        })
    }
}
