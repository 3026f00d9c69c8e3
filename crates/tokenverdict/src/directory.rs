//! User and client lookups
//!
//! Validation consults these collaborators synchronously. Implementations
//! backed by remote stores block the calling validation chain for the
//! duration of the lookup.

use crate::error::{Error, Result};
use std::collections::{BTreeSet, HashMap};

/// A user as known to the user directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    /// `None` when every authority has been withdrawn from the account
    pub authorities: Option<BTreeSet<String>>,
}

impl User {
    pub fn new<I, S>(id: impl Into<String>, authorities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            authorities: Some(authorities.into_iter().map(Into::into).collect()),
        }
    }

    /// A user whose account no longer carries any authority
    pub fn revoked(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            authorities: None,
        }
    }
}

/// A registered OAuth client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    pub id: String,
    pub allowed_scopes: BTreeSet<String>,
}

impl Client {
    pub fn new<I, S>(id: impl Into<String>, allowed_scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            allowed_scopes: allowed_scopes.into_iter().map(Into::into).collect(),
        }
    }
}

/// Looks up users by id
///
/// Returns [`Error::UserNotFound`] for unknown ids. Any other error is a
/// backend failure.
pub trait UserDirectory {
    fn find_by_id(&self, user_id: &str) -> Result<User>;
}

/// Looks up clients by id
///
/// Returns [`Error::ClientNotFound`] for unknown ids. Any other error is a
/// backend failure.
pub trait ClientRegistry {
    fn find_by_id(&self, client_id: &str) -> Result<Client>;
}

impl<D: UserDirectory + ?Sized> UserDirectory for &D {
    fn find_by_id(&self, user_id: &str) -> Result<User> {
        (**self).find_by_id(user_id)
    }
}

impl<R: ClientRegistry + ?Sized> ClientRegistry for &R {
    fn find_by_id(&self, client_id: &str) -> Result<Client> {
        (**self).find_by_id(client_id)
    }
}

impl UserDirectory for HashMap<String, User> {
    fn find_by_id(&self, user_id: &str) -> Result<User> {
        self.get(user_id)
            .cloned()
            .ok_or_else(|| Error::UserNotFound(user_id.to_string()))
    }
}

impl ClientRegistry for HashMap<String, Client> {
    fn find_by_id(&self, client_id: &str) -> Result<Client> {
        self.get(client_id)
            .cloned()
            .ok_or_else(|| Error::ClientNotFound(client_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_directory() {
        let users: HashMap<String, User> =
            HashMap::from([("u1".to_string(), User::new("u1", ["read"]))]);

        let user = users.find_by_id("u1").unwrap();
        assert_eq!(user.authorities, Some(BTreeSet::from(["read".to_string()])));
        assert_eq!(
            users.find_by_id("u2"),
            Err(Error::UserNotFound("u2".into()))
        );
    }

    #[test]
    fn test_map_registry() {
        let clients: HashMap<String, Client> =
            HashMap::from([("app".to_string(), Client::new("app", ["read", "write"]))]);

        assert_eq!(clients.find_by_id("app").unwrap().allowed_scopes.len(), 2);
        assert_eq!(
            clients.find_by_id("other"),
            Err(Error::ClientNotFound("other".into()))
        );
    }
}
