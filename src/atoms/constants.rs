// ── Reflectify Atoms: Constants ────────────────────────────────────────────
// All named constants for the crate live here.
// Rationale: collecting constants in one place eliminates magic strings,
// makes auditing easier, and keeps every layer's code self-documenting.

// ── Fallback replies ───────────────────────────────────────────────────────
// The caller must never receive an empty or error reply; every failure mode
// maps to one of these fixed strings. The texts are distinct on purpose so
// logs and bug reports can tell the failure modes apart. Treat as stable:
// the frontend matches on some of them.

/// Generation service answered with a non-2xx status.
pub const FALLBACK_GATEWAY: &str =
    "I'm having trouble connecting right now. Please try again.";

/// Generation call exceeded its deadline.
pub const FALLBACK_TIMEOUT: &str = "The response took too long. Please try again.";

/// 2xx response whose body carried no completion.
pub const FALLBACK_MALFORMED: &str = "I'm here to listen. Could you tell me more?";

/// Completion was empty, or the sanitizer stripped everything away.
pub const FALLBACK_EMPTY: &str =
    "I'm here to listen. Tell me more about what's on your mind.";

/// Any other locally-recovered failure (connection refused, DNS, …).
pub const FALLBACK_GENERIC: &str = "Something went wrong. Please try again.";

// ── Crisis keyword override ────────────────────────────────────────────────
// Safety-critical phrases checked as plain substring containment against the
// normalized input, independent of the catalog. The phrase list is a safety
// decision; do not re-tune without review.

/// Map of intent tag → trigger phrases (already in normalized form).
pub const CRITICAL_KEYWORDS: &[(&str, &[&str])] = &[(
    "suicide",
    &[
        "kill myself",
        "end my life",
        "better off without me",
        "want to die",
        "wish i was dead",
    ],
)];

/// Built-in reply for a crisis match when the catalog is empty or lacks the
/// tag. Guarantees crisis language always gets a safe deterministic answer,
/// whatever state the corpus is in.
pub const CRISIS_SAFETY_RESPONSE: &str = "I'm really glad you told me this, and I'm taking it seriously. \
You deserve support from a real person right now — please reach out to a crisis line \
like 988 (US) or your local emergency number, or talk to someone you trust. \
You don't have to carry this alone.";

// ── Matcher thresholds ─────────────────────────────────────────────────────
// These affect crisis-response correctness and must not drift.

/// Minimum normalized length (input and pattern) for the fuzzy pass.
pub const FUZZY_MIN_LEN: usize = 3;

/// Containment only counts as a match when min(len)/max(len) exceeds this.
pub const FUZZY_LENGTH_RATIO: f64 = 0.7;

// ── Engine defaults ────────────────────────────────────────────────────────

pub const DEFAULT_CONTEXT_MESSAGE_LIMIT: usize = 10;
pub const DEFAULT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_TOP_P: f64 = 0.9;
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_MODEL: &str = "Qwen/Qwen2.5-14B-Instruct";
pub const DEFAULT_PORT: u16 = 8001;

// ── HTTP boundary ──────────────────────────────────────────────────────────

/// Frontend origins allowed by the CORS layer.
pub const FRONTEND_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];
