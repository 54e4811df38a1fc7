//! The session: an opaque bearer token plus the profile that came with it.

use crate::roles::RoleSet;
use crate::user::UserProfile;

/// Who is logged in.
///
/// An empty token means "not authenticated". Token and profile are only ever
/// replaced together; the sole exception is [`Session::with_user`], which swaps
/// the profile of an already-authenticated session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    token: String,
    user: Option<UserProfile>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Build an authenticated session. A blank token yields an anonymous one.
    pub fn authenticated(token: impl Into<String>, user: UserProfile) -> Self {
        let token = token.into();
        if token.trim().is_empty() {
            return Self::anonymous();
        }
        Self {
            token,
            user: Some(user),
        }
    }

    /// Rebuild from durable storage, where either entry may be missing.
    ///
    /// A token without a profile, or a profile without a token, is a
    /// half-written session and is discarded.
    pub fn restore(token: Option<String>, user: Option<UserProfile>) -> Self {
        match (token, user) {
            (Some(token), Some(user)) => Self::authenticated(token, user),
            _ => Self::anonymous(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn must_change_password(&self) -> bool {
        self.user
            .as_ref()
            .is_some_and(UserProfile::must_change_password)
    }

    pub fn roles(&self) -> RoleSet {
        self.user
            .as_ref()
            .map(UserProfile::role_set)
            .unwrap_or_default()
    }

    /// Replace the profile, keeping the token. No-op on an anonymous session.
    pub fn with_user(&self, user: UserProfile) -> Self {
        if !self.is_authenticated() {
            return Self::anonymous();
        }
        Self {
            token: self.token.clone(),
            user: Some(user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::RoleRef;
    use crate::user::MustChangePassword;

    fn ana() -> UserProfile {
        UserProfile {
            email: "ana@kora.cl".into(),
            roles: vec![RoleRef::plain("Masoterapeuta")],
            must_change_password: MustChangePassword::REQUIRED,
            ..UserProfile::default()
        }
    }

    #[test]
    fn blank_token_is_anonymous() {
        let session = Session::authenticated("  ", ana());
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[test]
    fn half_written_storage_is_discarded() {
        assert_eq!(Session::restore(Some("t".into()), None), Session::anonymous());
        assert_eq!(Session::restore(None, Some(ana())), Session::anonymous());
        assert!(Session::restore(Some("t".into()), Some(ana())).is_authenticated());
    }

    #[test]
    fn with_user_keeps_token() {
        let session = Session::authenticated("abc", ana());
        assert!(session.must_change_password());
        assert!(session.roles().contains("masoterapeuta"));

        let mut cleared = ana();
        cleared.must_change_password = MustChangePassword::CLEARED;
        let next = session.with_user(cleared);
        assert_eq!(next.token(), "abc");
        assert!(!next.must_change_password());

        assert_eq!(Session::anonymous().with_user(ana()), Session::anonymous());
    }
}
