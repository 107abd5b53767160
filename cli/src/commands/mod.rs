mod helpers;
mod log;
mod summary;

pub(crate) use log::cmd_log;
pub(crate) use summary::{cmd_entries, cmd_history, cmd_summary};
