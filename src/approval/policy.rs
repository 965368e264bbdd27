//! Approval policies: should a proposed tool call pause for a human?
//!
//! Policies are pure and synchronous — no I/O, no side effects — so the
//! engine can consult them inline for every proposed call. They compose:
//! [`AllowListPolicy`] answers for names its patterns match and delegates
//! everything else to a fallback policy.

use std::sync::Arc;

use crate::session::SessionState;
use crate::tools::ToolDescriptor;

// ============================================================================
// Contract
// ============================================================================

/// What the policy may look at besides the tool itself.
#[derive(Debug, Clone, Copy)]
pub struct ApprovalContext<'a> {
    pub conversation_id: &'a str,
    pub session: &'a SessionState,
}

/// Decision function gating proposed tool calls.
///
/// Returns `true` when the call must pause for human sign-off. Unknown tools
/// reach a policy as conservative descriptors (see
/// [`ToolDescriptor::unknown`]), so evaluation never panics on a name it has
/// not seen — the fail-safe answer is "requires approval".
pub trait ApprovalPolicy: Send + Sync {
    fn requires_approval(&self, tool: &ToolDescriptor, ctx: &ApprovalContext<'_>) -> bool;
}

// ============================================================================
// Built-in policies
// ============================================================================

/// The default rule: read-only tools never require approval; everything else
/// defers to the flag the tool itself declares.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultApprovalPolicy;

impl ApprovalPolicy for DefaultApprovalPolicy {
    fn requires_approval(&self, tool: &ToolDescriptor, _ctx: &ApprovalContext<'_>) -> bool {
        if tool.read_only {
            return false;
        }
        tool.requires_approval
    }
}

/// Auto-approves tools whose names match any of a set of `*`-glob patterns,
/// regardless of the tool's own flag; non-matches delegate to the fallback
/// policy (the default rule unless overridden).
pub struct AllowListPolicy {
    patterns: Vec<String>,
    fallback: Arc<dyn ApprovalPolicy>,
}

impl AllowListPolicy {
    #[must_use]
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            fallback: Arc::new(DefaultApprovalPolicy),
        }
    }

    /// Replace the fallback consulted for names no pattern matches.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<dyn ApprovalPolicy>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl ApprovalPolicy for AllowListPolicy {
    fn requires_approval(&self, tool: &ToolDescriptor, ctx: &ApprovalContext<'_>) -> bool {
        if self
            .patterns
            .iter()
            .any(|pattern| matches_pattern(pattern, &tool.name))
        {
            return false;
        }
        self.fallback.requires_approval(tool, ctx)
    }
}

// ============================================================================
// Pattern matching
// ============================================================================

/// Match a tool name against a pattern where `*` spans any run of
/// characters. Without a `*` the match is exact.
fn matches_pattern(pattern: &str, name: &str) -> bool {
    if !pattern.contains('*') {
        return pattern == name;
    }

    let parts: Vec<&str> = pattern.split('*').collect();
    let mut remaining = name;

    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }

        if i == 0 {
            // Pattern does not start with '*': part must anchor at the front.
            if let Some(rest) = remaining.strip_prefix(part) {
                remaining = rest;
            } else {
                return false;
            }
        } else if i == parts.len() - 1 {
            // Pattern does not end with '*': part must anchor at the back.
            if !remaining.ends_with(part) {
                return false;
            }
        } else if let Some(pos) = remaining.find(part) {
            remaining = &remaining[pos + part.len()..];
        } else {
            return false;
        }
    }

    true
}

// ============================================================================
// Tests
// ============================================================================
