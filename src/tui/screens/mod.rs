//! # Screens
//!
//! Complete interactive workflows.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

mod config_form;

pub use config_form::ConfigForm;
