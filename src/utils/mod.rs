// Shared byte-level helpers
pub mod encoding;
pub mod synchsafe;
