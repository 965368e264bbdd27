//! Human-in-the-loop approval: decisions and the gating policy.

mod decision;
mod policy;

pub use decision::{ApprovalDecision, DecisionAction};
pub use policy::{AllowListPolicy, ApprovalContext, ApprovalPolicy, DefaultApprovalPolicy};
