// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod change_text_case;

pub use change_text_case::ChangeTextCaseProcessor;
