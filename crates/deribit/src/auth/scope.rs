//! Authorization scope requested from `public/auth`.

use std::fmt;

/// Access level for one scope area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    ReadWrite,
    None,
}

impl Access {
    fn as_str(self) -> &'static str {
        match self {
            Access::Read => "read",
            Access::ReadWrite => "read_write",
            Access::None => "none",
        }
    }
}

/// A requested scope, rendered as a space-separated list.
///
/// # Example
///
/// ```
/// use deribit::auth::{Access, Scope};
///
/// let scope = Scope::new()
///     .account(Access::Read)
///     .trade(Access::None)
///     .session("bot");
/// assert_eq!(scope.to_string(), "account:read trade:none session:bot");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    account: Option<Access>,
    trade: Option<Access>,
    wallet: Option<Access>,
    session: Option<String>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(mut self, access: Access) -> Self {
        self.account = Some(access);
        self
    }

    pub fn trade(mut self, access: Access) -> Self {
        self.trade = Some(access);
        self
    }

    pub fn wallet(mut self, access: Access) -> Self {
        self.wallet = Some(access);
        self
    }

    /// Bind the token to a named session instead of the connection.
    pub fn session(mut self, name: impl Into<String>) -> Self {
        self.session = Some(name.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.account.is_none()
            && self.trade.is_none()
            && self.wallet.is_none()
            && self.session.is_none()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(4);
        for (area, access) in [
            ("account", self.account),
            ("trade", self.trade),
            ("wallet", self.wallet),
        ] {
            if let Some(access) = access {
                parts.push(format!("{}:{}", area, access.as_str()));
            }
        }
        if let Some(ref name) = self.session {
            parts.push(format!("session:{}", name));
        }
        write!(f, "{}", parts.join(" "))
    }
}
