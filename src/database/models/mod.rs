//! Database models.

mod attempt;

pub use attempt::{
    LoginAttemptRecord, MESSAGE_MAX_LEN, NewLoginAttempt, SESSION_NONE, STATUS_NETWORK_ERROR,
    STATUS_TIMEOUT, TIMESTAMP_FORMAT, now_timestamp,
};
