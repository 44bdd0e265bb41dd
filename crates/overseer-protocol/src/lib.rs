//! Wire protocol spoken between a domain controller and a host's server
//! manager.
//!
//! Messages are sequences of tagged fields: one-byte tags, big-endian
//! 32-bit integers, length-prefixed UTF-8 strings and length-prefixed opaque
//! payloads carrying JSON-encoded model types. [`FrameReader`] and
//! [`FrameWriter`] implement the field codec; [`ManagementRequest`] and
//! [`ManagementResponse`] describe the messages of every
//! [`ManagementCommand`]; [`ManagementClient`] drives the controller side of
//! an exchange.

mod client;
mod command;
mod error;
mod frame;
mod message;
mod model;

pub use client::{ClientError, ManagementClient};
pub use command::{ManagementCommand, tags};
pub use error::{FrameError, FramingError};
pub use frame::{
    FrameReader, FrameWriter, MAX_OPAQUE_BYTES, MAX_UTF8_BYTES, PREALLOCATION_LIMIT,
};
pub use message::{ManagementRequest, ManagementResponse};
pub use model::{
    DomainModel, DomainModelUpdate, HostModelUpdate, ModelUpdateResponse, ServerGroup,
    ServerIdentity, ServerIdentityResponse, ServerModelUpdate, ServerUpdateOutcome,
    ServerUpdateResponse, UpdateFailure,
};
