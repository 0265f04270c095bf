//! Named UI targets and the queries that find them.
//!
//! Every element the engine touches is addressed by a [`LocatorKey`]. The
//! key maps to a [`By`] query evaluated against the page's current DOM. The
//! table is a `match`, so a key without a query does not compile.
//!
//! # Example
//!
//! ```ignore
//! use tweetfree::{By, LocatorKey};
//!
//! let query = LocatorKey::LoginEmail.query();
//! assert!(matches!(query, By::XPath(_)));
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// By
// ============================================================================

/// Element query strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum By {
    /// XPath expression.
    ///
    /// # Example
    /// ```ignore
    /// By::XPath("//*[@id=\"modal-header\"]/span/span".into())
    /// ```
    XPath(String),

    /// CSS selector.
    ///
    /// # Example
    /// ```ignore
    /// By::Css("[data-testid='tweetButton']".into())
    /// ```
    Css(String),
}

impl By {
    /// Returns the BiDi locator type (`xpath` or `css`).
    #[inline]
    #[must_use]
    pub fn strategy(&self) -> &'static str {
        match self {
            Self::XPath(_) => "xpath",
            Self::Css(_) => "css",
        }
    }

    /// Returns the query expression.
    #[inline]
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::XPath(v) | Self::Css(v) => v,
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.strategy(), self.value())
    }
}

// ============================================================================
// LocatorKey
// ============================================================================

/// A fixed UI target on the remote page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LocatorKey {
    /// Header text of whichever modal is open (login flow screens).
    ModalHeader,
    /// Login flow: account email/phone input.
    LoginEmail,
    /// Login flow: "Next" after the email.
    LoginNext,
    /// Login flow: password input.
    LoginPassword,
    /// Login flow: final "Log in" button.
    LoginSubmit,
    /// Unusual-activity challenge: username input.
    ChallengeUsername,
    /// Unusual-activity challenge: "Next".
    ChallengeNext,
    /// Home timeline: composer container, present once the timeline rendered.
    ComposerArea,
    /// Home timeline: the composer itself (clicked, then typed into).
    Composer,
    /// Home timeline: "Post" button of the composer.
    ComposerSubmit,
    /// Status page: the focused article.
    StatusArticle,
    /// Status page: like control.
    Like,
    /// Status page: retweet control.
    Retweet,
    /// Retweet menu: confirm entry.
    RetweetConfirm,
    /// Status page: inline reply composer.
    ReplyComposer,
    /// Status page: reply submit button.
    ReplyConfirm,
    /// Profile page: header block.
    ProfileOverlay,
    /// Profile page: following counter.
    Following,
    /// Profile page: following counter on the alternate layout.
    FollowingBackup,
    /// Profile page: followers counter.
    Followers,
    /// Profile page: join date.
    Joined,
    /// Profile page: post count in the title bar.
    TweetCount,
    /// Profile page: verification badge.
    VerifiedBadge,
}

impl LocatorKey {
    /// Every key in the table.
    pub const ALL: [LocatorKey; 23] = [
        Self::ModalHeader,
        Self::LoginEmail,
        Self::LoginNext,
        Self::LoginPassword,
        Self::LoginSubmit,
        Self::ChallengeUsername,
        Self::ChallengeNext,
        Self::ComposerArea,
        Self::Composer,
        Self::ComposerSubmit,
        Self::StatusArticle,
        Self::Like,
        Self::Retweet,
        Self::RetweetConfirm,
        Self::ReplyComposer,
        Self::ReplyConfirm,
        Self::ProfileOverlay,
        Self::Following,
        Self::FollowingBackup,
        Self::Followers,
        Self::Joined,
        Self::TweetCount,
        Self::VerifiedBadge,
    ];

    /// Stable snake_case name used in logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ModalHeader => "modal_header",
            Self::LoginEmail => "login_email",
            Self::LoginNext => "login_next",
            Self::LoginPassword => "login_password",
            Self::LoginSubmit => "login_submit",
            Self::ChallengeUsername => "challenge_username",
            Self::ChallengeNext => "challenge_next",
            Self::ComposerArea => "composer_area",
            Self::Composer => "composer",
            Self::ComposerSubmit => "composer_submit",
            Self::StatusArticle => "status_article",
            Self::Like => "like",
            Self::Retweet => "retweet",
            Self::RetweetConfirm => "retweet_confirm",
            Self::ReplyComposer => "reply_composer",
            Self::ReplyConfirm => "reply_confirm",
            Self::ProfileOverlay => "profile_overlay",
            Self::Following => "following",
            Self::FollowingBackup => "following_backup",
            Self::Followers => "followers",
            Self::Joined => "joined",
            Self::TweetCount => "tweet_count",
            Self::VerifiedBadge => "verified_badge",
        }
    }

    /// Returns the query that resolves this target.
    #[must_use]
    pub fn query(self) -> By {
        By::XPath(self.xpath().to_string())
    }

    /// Raw XPath for this target.
    ///
    /// These are absolute paths into the rendered React tree and break when
    /// the platform reshuffles its layout; update them here only.
    #[must_use]
    pub const fn xpath(self) -> &'static str {
        match self {
            Self::ModalHeader => r#"//*[@id="modal-header"]/span/span"#,

            Self::LoginSubmit => {
                r#"//*[@id="layers"]/div/div/div/div/div/div/div[2]/div[2]/div/div/div[2]/div[2]/div[2]/div/div[1]/div/div/div/div"#
            }
            Self::LoginEmail => {
                r#"//*[@id="layers"]/div/div/div/div/div/div/div[2]/div[2]/div/div/div[2]/div[2]/div/div/div/div[5]/label/div/div[2]/div/input"#
            }
            Self::LoginNext => {
                r#"//*[@id="layers"]/div/div/div/div/div/div/div[2]/div[2]/div/div/div[2]/div[2]/div/div/div/div[6]/div"#
            }
            Self::LoginPassword => {
                r#"//*[@id="layers"]/div/div/div/div/div/div/div[2]/div[2]/div/div/div[2]/div[2]/div[1]/div/div/div[3]/div/label/div/div[2]/div[1]/input"#
            }

            Self::ChallengeUsername => {
                r#"//*[@id="layers"]/div/div/div/div/div/div/div[2]/div[2]/div/div/div[2]/div[2]/div[1]/div/div[2]/label/div/div[2]/div/input"#
            }
            Self::ChallengeNext => {
                r#"//*[@id="layers"]/div/div/div/div/div/div/div[2]/div[2]/div/div/div[2]/div[2]/div[2]/div/div/div/div/div"#
            }

            Self::ComposerArea => {
                r#"//*[@id="react-root"]/div/div/div[2]/main/div/div/div/div/div/div[3]/div/div[2]/div[1]/div/div/div"#
            }
            Self::Composer => {
                r#"//*[@id="react-root"]/div/div/div[2]/main/div/div/div/div[1]/div/div[3]/div/div[2]/div[1]/div/div/div/div[2]/div[1]"#
            }
            Self::ComposerSubmit => {
                "/html/body/div[1]/div/div/div[2]/main/div/div/div/div/div/div[3]/div/div[2]/div[1]/div/div/div/div[2]/div[2]/div[2]/div/div/div/div[3]"
            }

            Self::StatusArticle => {
                r#"//*[@id="react-root"]/div/div/div[2]/main/div/div/div/div/div/section/div/div/div[1]/div/div/article"#
            }
            Self::Like => r#"//*[starts-with(@id, "id__")]/div[3]/div/div/div/div"#,
            Self::Retweet => r#"//*[starts-with(@id, "id__")]/div[2]/div/div/div/div"#,
            Self::RetweetConfirm => {
                r#"//*[@id="layers"]/div[2]/div/div/div/div[2]/div/div[3]/div/div/div/div"#
            }
            Self::ReplyComposer => {
                r#"//*[@id="react-root"]/div/div/div[2]/main/div/div/div/div/div/section/div/div/div[1]/div/div/div/div/div[2]/div[1]/div/div/div/div[2]/div[1]/div/div/div/div/div[1]/div/div/div/div/div/label/div[1]/div"#
            }
            Self::ReplyConfirm => {
                r#"//*[@id="react-root"]/div/div/div[2]/main/div/div/div/div/div/section/div/div/div[1]/div/div/div/div/div[2]/div[2]/div/div/div/div[2]/div[2]/div[2]/div/div/div/div[2]"#
            }

            Self::ProfileOverlay => {
                r#"//*[@id="react-root"]/div/div/div[2]/main/div/div/div/div/div/div[3]/div/div/div/div"#
            }
            Self::Following => {
                r#"//*[@id="react-root"]/div/div/div[2]/main/div/div/div/div/div/div[3]/div/div/div/div/div[4]/div[1]/a/span[1]/span"#
            }
            Self::FollowingBackup => {
                r#"//*[@id="react-root"]/div/div/div[2]/main/div/div/div/div/div/div[3]/div/div/div/div[2]/div[5]/div[1]/a/span[1]/span"#
            }
            Self::Followers => {
                r#"//*[@id="react-root"]/div/div/div[2]/main/div/div/div/div/div/div[3]/div/div/div/div/div[4]/div[2]/a/span[1]/span"#
            }
            Self::Joined => {
                r#"//*[@id="react-root"]/div/div/div[2]/main/div/div/div/div/div/div[3]/div/div/div/div/div[3]/div/span/span"#
            }
            Self::TweetCount => {
                r#"//*[@id="react-root"]/div/div/div[2]/main/div/div/div/div[1]/div/div[1]/div[1]/div/div/div/div/div/div[2]/div/div"#
            }
            Self::VerifiedBadge => {
                r#"//*[@id="react-root"]/div/div/div[2]/main/div/div/div/div/div/div[3]/div/div/div/div/div[2]/div[1]/div/div[1]/div/div/span[2]/div/div"#
            }
        }
    }
}

impl fmt::Display for LocatorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Tests
// ============================================================================
