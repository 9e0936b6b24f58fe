// Module layout (Clean Architecture style)
// - bootstrap: configuration, storage selection and startup wiring
// - infrastructure: storage adapters (Supabase, Gist, proxy, local) and HTTP transport
// - presentation: `/api/data`, `/api/github-proxy` and health handlers
// - application: ports, DTOs and link use cases
// - domain: link and snapshot models

pub mod application;
pub mod bootstrap;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
