use saledash_core::UserId;

use crate::{Role, SessionClaims};

/// Request-scoped context: the acting user and their preferences.
///
/// Passed explicitly to every host operation. Unauthenticated requests act
/// as the host's public user, so [`SessionContext::user_id`] always yields an
/// id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    user_id: UserId,
    authenticated: bool,
    login: Option<String>,
    name: String,
    roles: Vec<Role>,
    lang: String,
    tz: String,
}

impl SessionContext {
    pub fn authenticated(user_id: UserId, login: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user_id,
            authenticated: true,
            login: Some(login.into()),
            name: name.into(),
            roles: Vec::new(),
            lang: "en_US".to_string(),
            tz: "UTC".to_string(),
        }
    }

    /// Anonymous request, resolved to the host's public user.
    pub fn public(public_user: UserId) -> Self {
        Self {
            user_id: public_user,
            authenticated: false,
            login: None,
            name: "Public user".to_string(),
            roles: Vec::new(),
            lang: "en_US".to_string(),
            tz: "UTC".to_string(),
        }
    }

    pub fn from_claims(claims: &SessionClaims) -> Self {
        Self::authenticated(claims.sub, claims.login.clone(), claims.name.clone())
            .with_roles(claims.roles.clone())
    }

    pub fn with_roles(mut self, roles: Vec<Role>) -> Self {
        self.roles = roles;
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    pub fn with_tz(mut self, tz: impl Into<String>) -> Self {
        self.tz = tz.into();
        self
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn is_public(&self) -> bool {
        !self.authenticated
    }

    pub fn login(&self) -> Option<&str> {
        self.login.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::ADMIN)
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn tz(&self) -> &str {
        &self.tz
    }
}
