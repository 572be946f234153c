//! Session data models.

use serde::{Deserialize, Serialize};

/// The email whose owner is treated as the storefront admin.
///
/// Role classification is a plain string comparison against this constant,
/// reproduced from the source system. It is a client-side display
/// convenience only and must never gate anything security-relevant: real
/// authorization needs a server-verified claim.
pub const ADMIN_EMAIL: &str = "admin@makanbar.com";

/// Session privilege classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Ordinary customer.
    User,
    /// Storefront administrator.
    Admin,
}

impl Role {
    /// Derives the role from an email address (see [`ADMIN_EMAIL`]).
    #[must_use]
    pub fn for_email(email: &str) -> Self {
        if email == ADMIN_EMAIL {
            Self::Admin
        } else {
            Self::User
        }
    }
}

/// A single authenticated user's profile as known to the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider-assigned account id.
    pub id: String,

    /// Account email.
    pub email: String,

    /// Display name shown in the UI.
    pub display_name: String,

    /// Derived from [`Identity::email`], never stored independently.
    pub role: Role,
}

impl Identity {
    /// Builds an identity, deriving the role from the email.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        let email = email.into();
        let role = Role::for_email(&email);

        Self {
            id: id.into(),
            email,
            display_name: display_name.into(),
            role,
        }
    }

    /// Whether this identity classifies as a privileged session.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Profile fields a user may change after registration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    /// New display name, when changing it.
    pub display_name: Option<String>,
}

/// The current session as seen by route gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The authenticated identity; `None` means anonymous/guest.
    pub identity: Option<Identity>,

    /// True only while the initial session resolution is in flight;
    /// identity-dependent views must not render until this clears.
    pub loading: bool,
}

impl Session {
    /// The state at process start: nobody yet, still resolving.
    #[must_use]
    pub const fn resolving() -> Self {
        Self {
            identity: None,
            loading: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_email_classifies_as_admin() {
        let identity = Identity::new("uid-1", ADMIN_EMAIL, "Admin");

        assert_eq!(identity.role, Role::Admin);
        assert!(identity.is_admin());
    }

    #[test]
    fn any_other_email_classifies_as_user() {
        let identity = Identity::new("uid-2", "demo@makanbar.com", "Demo");

        assert_eq!(identity.role, Role::User);
        assert!(!identity.is_admin());
    }

    #[test]
    fn near_miss_emails_are_not_admin() {
        assert_eq!(Role::for_email("Admin@makanbar.com"), Role::User);
        assert_eq!(Role::for_email("admin@makanbar.com "), Role::User);
    }
}
