/// Lowercased address accepted by the subscription form.
///
/// The check is deliberately loose: a non-empty value holding at least one `@` and one `.`
/// anywhere in it. It is not an RFC 5322 validator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    pub fn parse(email: String) -> Result<SubscriberEmail, String> {
        let is_empty = email.is_empty();
        let is_missing_at_symbol = !email.contains('@');
        let is_missing_dot = !email.contains('.');

        if is_empty || is_missing_at_symbol || is_missing_dot {
            return Err(format!("{} email is not valid", email));
        }

        Ok(Self(email.to_lowercase()))
    }

    /// Case-insensitive comparison against an address read back from the store
    pub fn matches(&self, other: &str) -> bool {
        self.0 == other.to_lowercase()
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubscriberEmail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
