pub mod directory;
/// The delimited text format of the record files.
pub mod format;

pub use directory::{Directory, InitError, LoadError, Loaded, SaveError, Unloaded};
pub use format::{DataFiles, LineError, Parsed, RecordKind, SkippedLine, load, serialize};
