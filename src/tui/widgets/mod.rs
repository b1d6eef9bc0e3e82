//! # Widgets
//!
//! Reusable input components for screens.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

mod text_input;

pub use text_input::TextInput;
