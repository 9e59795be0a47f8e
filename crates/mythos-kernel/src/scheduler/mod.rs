//! Process scheduling.
//!
//! - [`ProcessTable`]: pid allocation, lineage, lifecycle
//! - [`BoundedStream`]: capped output buffers for scripts and the console

mod stream;
mod table;

pub use stream::{BoundedStream, OutputSink, DEFAULT_STREAM_MAX_SIZE};
pub use table::{
    Pid, Process, ProcessHandle, ProcessStatus, ProcessTable, DEFAULT_PID_BASE, INIT_PID,
};
