// Copyright 2026 Cradle Authors
// SPDX-License-Identifier: Apache-2.0

//! Built-in tool handlers.
//!
//! Each handler wraps one workspace adapter operation behind the
//! [`ToolHandler`](crate::tools::ToolHandler) contract. Handlers hold no
//! state; the workspace is supplied per call.

mod bash;
mod git_status;
mod glob;
mod list_dir;
mod read_file;
mod search;
mod write_file;

pub use bash::BashHandler;
pub use git_status::GitStatusHandler;
pub use glob::GlobHandler;
pub use list_dir::ListDirHandler;
pub use read_file::ReadFileHandler;
pub use search::SearchHandler;
pub use write_file::WriteFileHandler;
