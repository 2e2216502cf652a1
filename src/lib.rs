//! ImgFE: a scripted raster image editor.
//!
//! Images live in a [`session::SessionCache`] under user-chosen names.
//! Script lines are parsed into [`command::Command`]s by
//! [`script::ScriptRunner`], which executes them against the cache. The
//! pixel operations themselves are pure functions in [`ops`].

pub mod logger;

pub mod canvas;
pub mod cli;
pub mod command;
pub mod editor;
pub mod error;
pub mod io;
pub mod ops;
pub mod script;
pub mod session;

pub use canvas::{Channel, Image, Pixel};
pub use command::{Command, Outcome, Transform};
pub use error::{EditError, Result};
pub use script::{RunSummary, RunnerConfig, ScriptRunner};
pub use session::SessionCache;
