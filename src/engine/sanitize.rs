// Reflectify Engine — Response Sanitizer
// Cleans raw generator output into displayable text. Runs only on the
// generative path; intent-matched responses are returned verbatim.
//
// The pipeline is an ordered table of pure text transforms folded over the
// input — each stage independently unit-testable, each feeding the next.
// Postcondition: never returns an empty string.

use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, trace};

use crate::atoms::constants::FALLBACK_EMPTY;

// ── Template token inventory ───────────────────────────────────────────────
// The exact markers the prompt-template backend's model family emits.

/// Markers separating a prompt echo from the completion itself. When the
/// generation service echoes the prompt, everything up to and including the
/// last of these is discarded.
const COMPLETION_DELIMITERS: &[&str] = &["[/INST]", "<|im_start|>assistant"];

/// Control/special tokens stripped verbatim wherever they appear.
const CONTROL_TOKENS: &[&str] = &[
    "<|im_start|>",
    "<|im_end|>",
    "<|endoftext|>",
    "<s>",
    "</s>",
    "[INST]",
    "[/INST]",
    "<<SYS>>",
    "<</SYS>>",
    "<pad>",
    "<unk>",
];

// ── Compiled patterns ──────────────────────────────────────────────────────

/// A hallucinated role switch: the model starting a new "user" turn.
static ROLE_SWITCH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*(?:user|human)[ \t]*:|<\|im_start\|>user|\[INST\]").unwrap()
});

/// Residual bracket-delimited control tokens not on the fixed list.
static CONTROL_RESIDUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\|[^<>|]{1,32}\|>").unwrap());

/// A leftover echo of the assistant label at the very start.
static ECHO_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\A\s*(?:assistant|response|reflectify)[ \t]*:[ \t]*").unwrap());

/// Lines consisting solely of a role name.
static STRAY_ROLE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*(?:user|assistant)[ \t]*$\n?").unwrap());

/// Markdown bullet markers at line start, normalized to `•`.
static BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^([ \t]*)[*-][ \t]+").unwrap());

/// Lines that are only a 1–3 digit number (numbering artifacts).
static NUMBERING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*\d{1,3}[ \t]*$\n?").unwrap());

static MANY_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());
static MANY_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]{2,}").unwrap());

// ── Stage table ────────────────────────────────────────────────────────────

struct Stage {
    name: &'static str,
    apply: fn(&str) -> String,
}

const STAGES: &[Stage] = &[
    Stage { name: "completion-split", apply: split_after_prompt_echo },
    Stage { name: "role-switch-cut", apply: cut_hallucinated_user_turn },
    Stage { name: "control-tokens", apply: strip_control_tokens },
    Stage { name: "control-residue", apply: strip_control_residue },
    Stage { name: "echo-label", apply: strip_echo_label },
    Stage { name: "stray-role-lines", apply: strip_stray_role_lines },
    Stage { name: "bullets", apply: canonicalize_bullets },
    Stage { name: "numbering-artifacts", apply: drop_numbering_lines },
    Stage { name: "whitespace", apply: collapse_whitespace },
];

/// Run the full cleaning pipeline over a raw completion.
pub fn sanitize(raw: &str) -> String {
    let cleaned = STAGES.iter().fold(raw.to_string(), |text, stage| {
        let next = (stage.apply)(&text);
        if next != text {
            trace!("[sanitize] stage '{}' changed the text", stage.name);
        }
        next
    });

    if cleaned.is_empty() {
        debug!("[sanitize] output empty after cleaning, substituting fallback");
        FALLBACK_EMPTY.to_string()
    } else {
        cleaned
    }
}

// ── Stages ─────────────────────────────────────────────────────────────────

/// 1. Keep only the text after the last prompt/completion delimiter.
fn split_after_prompt_echo(text: &str) -> String {
    let mut cut = None;
    for delim in COMPLETION_DELIMITERS {
        if let Some(pos) = text.rfind(delim) {
            let end = pos + delim.len();
            cut = Some(cut.map_or(end, |c: usize| c.max(end)));
        }
    }
    match cut {
        Some(end) => text[end..].to_string(),
        None => text.to_string(),
    }
}

/// 2. Truncate from the first hallucinated user turn onward — the generator
/// must never continue the dialogue on the user's behalf.
fn cut_hallucinated_user_turn(text: &str) -> String {
    match ROLE_SWITCH.find(text) {
        Some(m) => text[..m.start()].to_string(),
        None => text.to_string(),
    }
}

/// 3. Strip every known control token verbatim.
fn strip_control_tokens(text: &str) -> String {
    let mut out = text.to_string();
    for token in CONTROL_TOKENS {
        out = out.replace(token, "");
    }
    out
}

/// 4. Strip anything that still looks like a bracketed control token.
fn strip_control_residue(text: &str) -> String {
    CONTROL_RESIDUE.replace_all(text, "").into_owned()
}

/// 5. Drop a leading assistant-label echo.
fn strip_echo_label(text: &str) -> String {
    ECHO_LABEL.replace(text, "").into_owned()
}

/// 6. Drop lines that are nothing but a stray role name.
fn strip_stray_role_lines(text: &str) -> String {
    STRAY_ROLE_LINE.replace_all(text, "").into_owned()
}

/// 7. Normalize `*` / `-` bullets to the canonical glyph.
fn canonicalize_bullets(text: &str) -> String {
    BULLET.replace_all(text, "${1}\u{2022} ").into_owned()
}

/// 8. Drop lines that are only a small number.
fn drop_numbering_lines(text: &str) -> String {
    NUMBERING_LINE.replace_all(text, "").into_owned()
}

/// 9. Collapse 3+ newlines to 2, runs of spaces to one, and trim.
fn collapse_whitespace(text: &str) -> String {
    let newlines = MANY_NEWLINES.replace_all(text, "\n\n");
    let spaces = MANY_SPACES.replace_all(&newlines, " ");
    spaces.trim().to_string()
}
