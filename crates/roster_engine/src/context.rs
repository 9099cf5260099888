use serde::{Deserialize, Serialize};
use url::Url;

use crate::{FailureKind, FetchError};

/// Who is signed in. Center users only see their own students and bills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    #[default]
    Admin,
    Center,
}

/// Everything a request needs from the signed-in session, passed explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiContext {
    pub base_url: Url,
    pub token: Option<String>,
    pub role: Role,
    pub center_id: Option<String>,
}

impl ApiContext {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, err.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::new(
                FailureKind::InvalidUrl,
                format!("{base_url} cannot be used as a base url"),
            ));
        }
        Ok(Self {
            base_url,
            token: None,
            role: Role::Admin,
            center_id: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_center(mut self, center_id: impl Into<String>) -> Self {
        self.role = Role::Center;
        self.center_id = Some(center_id.into());
        self
    }

    /// `centerId` to scope requests with; only center users have one.
    pub fn scoped_center_id(&self) -> Option<&str> {
        match self.role {
            Role::Center => self.center_id.as_deref(),
            Role::Admin => None,
        }
    }

    /// Appends `path` to the base url's path, keeping any base path prefix.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| FetchError::new(FailureKind::InvalidUrl, "base url has no path"))?
            .pop_if_empty()
            .extend(path.split('/').filter(|segment| !segment.is_empty()));
        Ok(url)
    }
}
