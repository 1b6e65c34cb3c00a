//! Process exit codes, following BSD sysexits.h where one applies

/// Command completed
pub const OK: i32 = 0;

/// Bad arguments, or no network file given nor configured
pub const USAGE: i32 = 64;

/// Network description parsed but does not form a single binary tree
pub const DATAERR: i32 = 65;

/// Network description file does not exist
pub const NOINPUT: i32 = 66;

/// Node protocol violated while composing or traversing
pub const SOFTWARE: i32 = 70;

/// Reading a description or config file failed
pub const IOERR: i32 = 74;

/// Configuration file or environment override is invalid
pub const CONFIG: i32 = 78;

