//! Classification of the login modal.

/// Header fragment of the unusual-activity challenge.
const USERNAME_CHALLENGE_MARKER: &str = "Enter your phone number or username";

/// Header fragment of the sign-in modal.
const SIGN_IN_MARKER: &str = "Sign in";

/// What the page shows where the login modal would be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenKind {
    /// No modal: the context is already logged in.
    AlreadyHome,
    /// Sign-in modal asking for an email.
    SignInPrompt,
    /// Challenge asking for the account handle.
    UsernameChallenge,
    /// A modal we have no rule for.
    Unknown,
}

impl ScreenKind {
    /// Classifies the modal header text, `None` meaning no modal rendered.
    ///
    /// The challenge marker is checked first since its wording may mention
    /// signing in as well.
    #[must_use]
    pub fn classify(header: Option<&str>) -> Self {
        match header {
            None => Self::AlreadyHome,
            Some(text) if text.contains(USERNAME_CHALLENGE_MARKER) => Self::UsernameChallenge,
            Some(text) if text.contains(SIGN_IN_MARKER) => Self::SignInPrompt,
            Some(_) => Self::Unknown,
        }
    }

    /// Returns `true` if an email must be entered.
    #[inline]
    #[must_use]
    pub const fn needs_login(self) -> bool {
        matches!(self, Self::SignInPrompt)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;

    #[test]
    fn test_classify_known_headers() {
        assert_eq!(ScreenKind::classify(None), ScreenKind::AlreadyHome);
        assert_eq!(
            ScreenKind::classify(Some("Sign in to X")),
            ScreenKind::SignInPrompt
        );
        assert_eq!(
            ScreenKind::classify(Some("Enter your phone number or username")),
            ScreenKind::UsernameChallenge
        );
        assert_eq!(
            ScreenKind::classify(Some("Something went wrong")),
            ScreenKind::Unknown
        );
    }

    #[test]
    fn test_only_sign_in_needs_login() {
        assert!(ScreenKind::SignInPrompt.needs_login());
        assert!(!ScreenKind::AlreadyHome.needs_login());
        assert!(!ScreenKind::UsernameChallenge.needs_login());
        assert!(!ScreenKind::Unknown.needs_login());
    }

    proptest! {
        #[test]
        fn prop_challenge_marker_wins(prefix in ".{0,20}", suffix in ".{0,20}") {
            let text = format!("{prefix}{USERNAME_CHALLENGE_MARKER}{suffix}");
            prop_assert_eq!(ScreenKind::classify(Some(&text)), ScreenKind::UsernameChallenge);
        }

        #[test]
        fn prop_text_without_markers_is_unknown(text in "[a-z ]{0,40}") {
            prop_assume!(!text.contains("Sign in"));
            prop_assert_eq!(ScreenKind::classify(Some(&text)), ScreenKind::Unknown);
        }
    }
}
