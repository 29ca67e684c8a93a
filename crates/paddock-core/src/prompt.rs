// Credential prompt boundary.
//
// Pure I/O seam: the builder asks for credentials through this trait,
// the binary implements it against the terminal, and tests inject a
// scripted fake. No business logic lives behind it.

use secrecy::SecretString;
use url::Url;

/// Interactively obtains credentials for an endpoint.
pub trait CredentialPrompt {
    /// Ask for the password of `username` at `endpoint`, without
    /// echoing input.
    fn password(&self, endpoint: &Url, username: &str) -> std::io::Result<SecretString>;

    /// Ask for a corrected username. Implementations treat empty
    /// input as "keep `current`".
    fn username(&self, current: &str) -> std::io::Result<String>;
}
