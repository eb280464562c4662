// === TYPES MODULE ===

pub mod progress;
pub mod webauthn;
