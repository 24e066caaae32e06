//! stratus-aws: the AWS command catalogue for Stratus templates.
//!
//! [`AwsFactory`] builds every command of the catalogue with its typed
//! service handle bound. The handles are backed by a [`api::Transport`]:
//! [`api::HttpTransport`] in production, a recording mock in tests.

pub mod api;
pub mod commands;
pub mod docs;
pub mod factory;
pub mod images;
pub mod keygen;

#[cfg(test)]
mod testing;

pub use api::{Apis, HttpTransport, Transport};
pub use docs::docs;
pub use factory::AwsFactory;
