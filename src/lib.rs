//! Session core for ad-hoc 2v2 foosball matches coordinated over chat
//! channels.
//!
//! Each channel holds at most one live session: a forming lobby or a running
//! game. The transport adapter feeds user events into the service layer and
//! renders the returned snapshots; durable storage sits behind the traits in
//! [`dao::gateway`].

pub mod config;
pub mod dao;
pub mod error;
pub mod services;
pub mod state;
