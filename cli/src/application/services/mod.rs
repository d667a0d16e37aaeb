//! Application services — use-case orchestration.
//!
//! Each service module composes domain logic with port trait calls. Services
//! import only from `crate::domain` and `crate::application::ports` — never
//! from `crate::infra`, `crate::commands`, or `crate::output`.

pub mod lifecycle;
pub mod lifecycle_service;
pub mod locks;
