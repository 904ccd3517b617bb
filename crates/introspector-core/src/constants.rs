/// Introspector — centralized constants.
/// Output budgets, snippet bounds, endpoints and default models live here.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    pub const DEFAULT_DIRECT_MODEL: &str = "claude-sonnet-4-20250514";
    pub const DEFAULT_ROUTED_MODEL: &str = "anthropic/claude-sonnet-4";
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const CLAUDE_BASE_URL: &str = "https://api.anthropic.com";
    pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api";
    pub const ANTHROPIC_VERSION: &str = "2023-06-01";
    /// Attribution headers the routing backend shows on its dashboard.
    pub const OPENROUTER_REFERER: &str = "https://github.com/introspector/introspector";
    pub const OPENROUTER_TITLE: &str = "Introspector";
}

// ─── Environment ──────────────────────────────────────────────────────────────

pub mod env {
    pub const DIRECT_API_KEY: &str = "ANTHROPIC_API_KEY";
    pub const ROUTED_API_KEY: &str = "OPENROUTER_API_KEY";
}

// ─── Limits ───────────────────────────────────────────────────────────────────

pub mod limits {
    /// Output budget for the opening haiku and every conversational reply.
    pub const MAX_CONVERSATION_TOKENS: u32 = 500;
    /// Summaries enumerate several bullets, so they get twice the budget.
    pub const MAX_SUMMARY_TOKENS: u32 = 1000;
    /// Most recent notes pulled in as context.
    pub const CONTEXT_FILE_LIMIT: usize = 10;
    /// Characters kept from each context note.
    pub const CONTEXT_SNIPPET_LENGTH: usize = 500;
    /// A summary needs at least one full exchange.
    pub const MIN_MESSAGES_FOR_SUMMARY: usize = 2;
}

// ─── Session ──────────────────────────────────────────────────────────────────

pub mod session {
    /// Synthetic first user turn that opens every session.
    pub const OPENING_USER_TURN: &str = "Begin the session.";
    /// User input containing this (case-insensitive) goes straight to finalize.
    pub const AHA_TRIGGER: &str = "aha";
    /// Assistant replies containing both of these signal a capturable insight.
    pub const RESOLUTION_MARKERS: [&str; 2] = ["capture", "insight"];
    pub const USER_LABEL: &str = "You";
    pub const ASSISTANT_LABEL: &str = "Introspector";
}

// ─── Config Paths ─────────────────────────────────────────────────────────────

pub mod paths {
    pub const CONFIG_DIR: &str = "introspector";
    pub const CONFIG_FILE: &str = "config.toml";
    pub const DEFAULT_SAVE_FOLDER: &str = "Introspections";
    pub const NOTE_EXTENSION: &str = "md";
}
