//! Object store client for the Transit harness.
//!
//! Containers and block blobs over plain HTTP, authenticated with the
//! account-level shared key: every request carries an `x-ms-date` header and
//! an `Authorization: SharedKey <account>:<signature>` header, where the
//! signature is an HMAC-SHA256 over the canonical request string. This is
//! the subset of the blob store contract the verification flow needs —
//! create/check/delete a container, upload a blob, check a blob exists.

mod auth;
mod client;

pub use auth::SharedKeySigner;
pub use client::BlobStoreClient;
