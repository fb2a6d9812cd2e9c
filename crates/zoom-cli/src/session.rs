//! The login state machine.
//!
//! `LoggedOut -> Authenticating -> LoggedIn`, and back to `LoggedOut` on
//! logout or on a failed attempt. A failed attempt leaves its message behind
//! until [`Session::take_login_error`] reads it.

use zoom_core::{Role, auth::Identity};

#[derive(Debug, Clone, PartialEq)]
pub enum Session {
  LoggedOut { last_error: Option<String> },
  Authenticating,
  LoggedIn(Identity),
}

impl Default for Session {
  fn default() -> Self { Self::LoggedOut { last_error: None } }
}

impl Session {
  pub fn identity(&self) -> Option<&Identity> {
    match self {
      Self::LoggedIn(identity) => Some(identity),
      _ => None,
    }
  }

  pub fn role(&self) -> Option<Role> { self.identity().map(Identity::role) }

  pub fn begin(&mut self) { *self = Self::Authenticating; }

  pub fn succeed(&mut self, identity: Identity) { *self = Self::LoggedIn(identity); }

  pub fn fail(&mut self, message: impl Into<String>) {
    *self = Self::LoggedOut { last_error: Some(message.into()) };
  }

  pub fn logout(&mut self) { *self = Self::default(); }

  /// The message of the last failed login, returned once.
  pub fn take_login_error(&mut self) -> Option<String> {
    match self {
      Self::LoggedOut { last_error } => last_error.take(),
      _ => None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use zoom_core::auth::AdminIdentity;

  #[test]
  fn failed_login_message_is_read_once() {
    let mut s = Session::default();
    s.begin();
    assert_eq!(s, Session::Authenticating);
    s.fail("Invalid Admin Credentials");
    assert_eq!(s.take_login_error().as_deref(), Some("Invalid Admin Credentials"));
    assert_eq!(s.take_login_error(), None);
  }

  #[test]
  fn logout_returns_to_logged_out() {
    let mut s = Session::default();
    s.begin();
    s.succeed(Identity::Admin(AdminIdentity::new("zoom4404")));
    assert_eq!(s.role(), Some(Role::Admin));
    s.logout();
    assert!(s.identity().is_none());
    assert_eq!(s.take_login_error(), None);
  }
}
