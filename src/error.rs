//! Error types.
//!
//! Two families of errors exist:
//!
//! - [`ConfigError`]: returned while building a policy or cache from its
//!   configuration (unknown policy names, malformed parameter strings, a zero
//!   eviction window).
//! - [`VerifyError`]: returned by the diagnostic `verify` walk when the queue
//!   and the object store disagree. These indicate a bug or an external
//!   mutation of queue links and are never expected in correct operation.
//!
//! A missing object on `remove` is not an error; it is reported as `false`.

extern crate alloc;

use crate::object::ObjId;
use alloc::string::String;
use thiserror::Error;

/// Errors raised while parsing or validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A `key=value` pair named a parameter the policy does not know.
    #[error("unknown parameter `{key}` for {policy}")]
    UnknownParameter {
        /// Policy the parameter was given to.
        policy: &'static str,
        /// The offending key as written.
        key: String,
    },

    /// A parameter entry was not of the form `key=value`.
    #[error("malformed parameter `{0}`, expected key=value")]
    MalformedParameter(String),

    /// A parameter value could not be parsed.
    #[error("invalid value `{value}` for parameter `{key}`")]
    InvalidValue {
        /// Parameter name.
        key: String,
        /// The value as written.
        value: String,
    },

    /// The eviction window must hold at least one object.
    #[error("eviction-window-size must be at least 1")]
    ZeroWindow,

    /// The policy name did not match any known policy.
    #[error("unknown eviction policy `{0}`")]
    UnknownPolicy(String),

    /// Parameters were given to a policy that takes none.
    #[error("{0} does not accept parameters")]
    UnexpectedParameters(&'static str),
}

/// Consistency violations detected by `verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VerifyError {
    /// A queued object is missing from the object index.
    #[error("object {id} is queued but not indexed")]
    NotIndexed {
        /// Identifier of the orphaned object.
        id: ObjId,
    },

    /// Walked queue length differs from the store's object count.
    #[error("queue holds {walked} objects but the store tracks {tracked}")]
    ObjectCountMismatch {
        /// Objects seen walking the queue.
        walked: u64,
        /// Objects tracked by the store.
        tracked: u64,
    },

    /// Summed object sizes differ from the store's occupied bytes.
    #[error("queue holds {walked} bytes but the store tracks {tracked}")]
    ByteCountMismatch {
        /// Bytes summed walking the queue.
        walked: u64,
        /// Bytes tracked by the store.
        tracked: u64,
    },

    /// The scan hand points at an object that is no longer queued.
    #[error("scan hand refers to an object that is not queued")]
    DanglingHand,

    /// Forward and backward links disagree around an object.
    #[error("queue links around object {id} are inconsistent")]
    BrokenLink {
        /// Identifier of the object whose neighbour links disagree.
        id: ObjId,
    },
}
