// handlers/mod.rs - Two security tiers
//
// Public (no auth)      → /, /health
// Protected (JWT auth)  → /api/:user_id/tasks/*
pub mod fallback;
pub mod public;
pub mod tasks;
