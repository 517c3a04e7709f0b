//! [`Command`] for creating a [`Session`].

use common::{
    operations::{By, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Login, Password};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`] by [`User`] credentials.
#[derive(Debug)]
pub struct CreateUserSession {
    /// [`Login`] of a [`User`].
    pub login: user::Login,

    /// [`Password`] of a [`User`].
    pub password: SecretBox<user::Password>,
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: for<'l> Database<
        Select<By<Option<User>, &'l user::Login>>,
        Ok = Option<User>,
        Err = Traced<database::Error>,
    >,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateUserSession { login, password } = cmd;

        let user = self
            .database()
            .execute(Select(By::new(&login)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::WrongCredentials)
            .map_err(tracerr::wrap!())?;
        if !user.password_hash.verify(password.expose_secret()) {
            return Err(tracerr::new!(E::WrongCredentials));
        }

        let expires_at = (DateTime::now() + self.config.session_ttl).coerce();
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &Session {
                user_id: user.id,
                expires_at,
            },
            &self.config.jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`CreateUserSession`] contains wrong credentials.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}
