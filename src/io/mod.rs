// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - JSON model documents and files

mod json;
mod store;

pub use json::{from_json, to_json, EdgeRecord, JsonPoint, PaperDocument};
pub use store::{load_paper, save_paper};
