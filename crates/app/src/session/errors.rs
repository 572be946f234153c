//! Credential errors.

use thiserror::Error;

/// Why a login, registration or profile update was refused.
///
/// Every variant carries a user-facing Indonesian message via
/// [`CredentialError::user_message`]; `Display` stays English for logs.
#[derive(Debug, Error)]
pub enum CredentialError {
    /// No account exists for the email.
    #[error("account not found")]
    UserNotFound,

    /// The password did not match.
    #[error("wrong password")]
    WrongPassword,

    /// Registration attempted with an email that is already taken.
    #[error("email already in use")]
    EmailInUse,

    /// The password does not meet the minimum requirements.
    #[error("password too weak")]
    WeakPassword,

    /// The email is not a valid address.
    #[error("invalid email address")]
    InvalidEmail,

    /// The provider is throttling this client.
    #[error("too many attempts")]
    RateLimited,

    /// The provider could not be reached.
    #[error("network failure")]
    Network(#[source] reqwest::Error),

    /// No backend provider is configured.
    #[error("backend provider not configured")]
    MisconfiguredBackend,

    /// Anything the taxonomy does not cover.
    #[error("authentication failed: {0}")]
    Unknown(String),
}

impl CredentialError {
    /// The message shown to the customer.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UserNotFound => "Akun tidak ditemukan. Silakan daftar terlebih dahulu.",
            Self::WrongPassword => "Password salah. Silakan coba lagi.",
            Self::EmailInUse => "Email sudah digunakan. Silakan gunakan email lain.",
            Self::WeakPassword => "Password terlalu lemah. Gunakan minimal 6 karakter.",
            Self::InvalidEmail => "Format email tidak valid.",
            Self::RateLimited => "Terlalu banyak percobaan. Silakan coba lagi nanti.",
            Self::Network(_) => "Koneksi internet bermasalah. Silakan coba lagi.",
            Self::MisconfiguredBackend => {
                "Mode demo aktif. Gunakan email \"demo@makanbar.com\" dan password \"demo123\" untuk login."
            }
            Self::Unknown(_) => "Terjadi kesalahan. Silakan coba lagi.",
        }
    }
}

impl From<reqwest::Error> for CredentialError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_a_user_message() {
        let kinds = [
            CredentialError::UserNotFound,
            CredentialError::WrongPassword,
            CredentialError::EmailInUse,
            CredentialError::WeakPassword,
            CredentialError::InvalidEmail,
            CredentialError::RateLimited,
            CredentialError::MisconfiguredBackend,
            CredentialError::Unknown("boom".to_owned()),
        ];

        for kind in kinds {
            assert!(!kind.user_message().is_empty(), "no message for {kind}");
        }
    }
}
