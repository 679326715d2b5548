//! Supabase gateway for pairdays.
//!
//! Implements `pairdays_core::gateway::Gateway` over Supabase's HTTP APIs:
//! PostgREST for rows, Storage for images, GoTrue for password sign-in.
//! The signed-in session is persisted under the user's config directory and
//! refreshed when it expires.

mod gateway;
mod postgrest;
pub mod session;

pub use gateway::SupabaseGateway;
pub use session::SessionStore;
