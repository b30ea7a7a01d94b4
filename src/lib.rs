// Reflectify — conversational-reflection backend.
//
// A user message plus optional history and profile facts comes in; one
// assistant reply goes out. A deterministic intent fast path answers curated
// inputs (greetings, farewells, crisis language); everything else flows
// through prompt assembly, a swappable generation backend, and a response
// sanitizer that turns raw model output into clean displayable text.

pub mod atoms;
pub mod config;
pub mod engine;
pub mod server;
