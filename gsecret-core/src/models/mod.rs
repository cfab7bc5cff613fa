//! Core data structures

mod secret_ref;

pub use secret_ref::{
    LATEST_VERSION, MAX_SECRET_ID_LEN, SecretRef, SecretVersion, VERSION_SEPARATOR,
    is_valid_secret_id, split_credential_pair,
};
