// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::UserId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// Credential context passed explicitly to every API call. The token is
/// opaque and issued by the auth service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    pub user: Option<SessionUser>,
    pub token: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn hydrate(&mut self, user: SessionUser, token: impl Into<String>) {
        self.user = Some(user);
        self.token = Some(token.into());
    }

    /// Forgets the user and token. Called on logout and whenever the API
    /// answers 401.
    pub fn clear(&mut self) {
        self.user = None;
        self.token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|token| !token.is_empty())
    }

    /// Header value for authenticated requests.
    pub fn bearer(&self) -> Option<String> {
        self.token
            .as_deref()
            .filter(|token| !token.is_empty())
            .map(|token| format!("Bearer {token}"))
    }

}
