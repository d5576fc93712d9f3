// src/models/mod.rs

use std::sync::LazyLock;

use regex::Regex;

pub mod report;
pub mod response;
pub mod roster;

/// Quiz and question ids. Question ids end up inside a `responses.<id>`
/// field name and quiz ids inside document keys, so dots are rejected.
pub static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid id pattern"));
