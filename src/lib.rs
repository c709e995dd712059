//! HemoLife: in-memory blood bank administration.
//!
//! Every screen of the console (inventory, donors, collections, issuance and
//! users) manages its records the same way: a [`store::Store`] owned by the
//! [`services::BloodBank`], searched through [`search`], edited through a
//! [`form::FormModal`].

pub mod config;
pub mod form;
pub mod models;
pub mod policy;
pub mod search;
pub mod seed;
pub mod services;
pub mod store;
pub mod utils;
