//! Wire protocol
//!
//! Frame codec, credentials and the session state machine for the broker's
//! Socket.IO style WebSocket feed.

mod auth;
pub mod frame;
mod session;
pub mod value;

pub use auth::{
    AuthPayload, ClientProfile, CredentialProvider, Credentials, CredentialsError, EnvCredentials,
    SESSION_TOKEN_ENV, USER_ID_ENV,
};
pub use frame::{decode, encode, ConnectionInfo, Frame, PONG};
pub use session::{
    SessionState, SessionStateMachine, Transition, AUTH_SUCCESS_EVENT, PING_SERVER_EVENT,
};
