// Shared utilities

pub mod io;
