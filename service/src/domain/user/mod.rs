//! [`User`] definitions.

pub mod session;

use std::sync::LazyLock;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{Display, Error, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::session::Session;

/// Account of a person using the system.
#[derive(Clone, Debug)]
pub struct User {
    /// ID of this [`User`]
    pub id: Id,

    /// [`Login`] of this [`User`].
    pub login: Login,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`Role`] of this [`User`].
    pub role: Role,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTime`] when this [`User`] was deleted.
    pub deleted_at: Option<DeletionDateTime>,
}

impl User {
    /// Returns whether this [`User`] has the elevated [`Role::Admin`].
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

define_kind! {
    #[doc = "Capability tier of a [`User`]."]
    enum Role {
        #[doc = "May read everything and change everything."]
        Admin = 1,

        #[doc = "May only read."]
        Viewer = 2,
    }
}

/// Login of a [`User`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Login(String);

impl Login {
    /// Creates a new [`Login`] if the given `login` is valid.
    #[must_use]
    pub fn new(login: impl Into<String>) -> Option<Self> {
        let login = login.into();
        Self::check(&login).then_some(Self(login))
    }

    /// Checks whether the given `login` is a valid [`Login`].
    fn check(login: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Login`] invariants:
        /// - Must consist of letters, digits, `.`, `_` or `-` only;
        /// - Must be between 2 and 64 characters long.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[\p{L}\p{N}._-]{2,64}$").expect("valid regex")
        });

        REGEX.is_match(login.as_ref())
    }
}

impl FromStr for Login {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Login`")
    }
}

/// Password of a [`User`].
#[derive(Clone, Debug, Display, Eq, From, PartialEq)]
#[from(&str, String)]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        password.len() > 1 && password.len() <= 128
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Password hash of a [`User`].
///
/// [bcrypt] hash of the [`Password`], carrying its own salt and cost.
///
/// [bcrypt]: https://en.wikipedia.org/wiki/Bcrypt
#[derive(Clone, Debug, Display, Eq, PartialEq)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Cost of hashing a [`Password`].
    const COST: u32 = if cfg!(test) { 4 } else { bcrypt::DEFAULT_COST };

    /// Hashes the given [`Password`] with a random salt.
    ///
    /// # Errors
    ///
    /// If the system random number generator fails.
    pub fn new(password: &Password) -> Result<Self, HashingError> {
        bcrypt::hash(&password.0, Self::COST)
            .map(Self)
            .map_err(HashingError)
    }

    /// Checks whether this [`PasswordHash`] was created out of the given
    /// [`Password`].
    ///
    /// A malformed [`PasswordHash`] matches no [`Password`].
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        bcrypt::verify(&password.0, &self.0).unwrap_or(false)
    }
}

/// Error of hashing a [`Password`].
#[derive(Debug, Display, Error)]
#[display("failed to hash `Password`: {_0}")]
pub struct HashingError(bcrypt::BcryptError);

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

/// [`DateTime`] when a [`User`] was deleted.
pub type DeletionDateTime = DateTimeOf<(User, unit::Deletion)>;

#[cfg(test)]
mod tests {
    use super::{Login, Password, PasswordHash};

    #[test]
    fn validates_login() {
        for valid in ["admin", "jane.doe", "j_doe-2", "Müller"] {
            assert!(Login::new(valid).is_some(), "{valid}");
        }
        for invalid in ["", "a", " admin", "jane doe", "x@y"] {
            assert!(Login::new(invalid).is_none(), "{invalid}");
        }
    }

    #[test]
    fn verifies_password() {
        let password = Password::new("admin").unwrap();

        let hash = PasswordHash::new(&password).unwrap();

        assert!(hash.to_string().starts_with("$2"));
        assert!(!hash.to_string().contains("admin"));
        assert!(hash.verify(&password));
        assert!(!hash.verify(&Password::new("Admin").unwrap()));
    }

    #[test]
    fn salts_every_hash() {
        let password = Password::new("secret").unwrap();

        let (a, b) = (
            PasswordHash::new(&password).unwrap(),
            PasswordHash::new(&password).unwrap(),
        );

        assert_ne!(a, b);
        assert!(a.verify(&password) && b.verify(&password));
    }

    #[test]
    fn rejects_malformed_hash() {
        let hash = PasswordHash("plain".to_owned());

        assert!(!hash.verify(&Password::new("plain").unwrap()));
    }
}
