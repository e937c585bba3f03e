//! Engine metrics.
//!
//! Recorded through the `metrics` facade; a no-op unless the caller installs
//! a recorder.

use lipsync_models::{MotionCategory, Segment, TimelinePlan};
use metrics::{counter, histogram};

/// Metric names as constants for consistency.
pub mod names {
    pub const SEGMENTS_TOTAL: &str = "lipsync_segments_total";
    pub const PLANS_TOTAL: &str = "lipsync_plans_total";
    pub const MISSING_CATEGORY_TOTAL: &str = "lipsync_missing_category_total";
    pub const SHORTFALL_TRUNCATIONS_TOTAL: &str = "lipsync_shortfall_truncations_total";
    pub const PLAN_DRIFT_SECONDS: &str = "lipsync_plan_drift_seconds";
    pub const PLAN_DURATION_SECONDS: &str = "lipsync_plan_duration_seconds";
}

/// Record classified segments by kind.
pub fn record_segments(segments: &[Segment]) {
    for segment in segments {
        counter!(names::SEGMENTS_TOTAL, "kind" => segment.kind.as_str()).increment(1);
    }
}

/// Record a successful plan.
pub fn record_plan(plan: &TimelinePlan) {
    counter!(names::PLANS_TOTAL, "outcome" => "planned").increment(1);
    histogram!(names::PLAN_DRIFT_SECONDS).record(plan.final_drift());
    histogram!(names::PLAN_DURATION_SECONDS).record(plan.total_duration);
}

/// Record a plan aborted for a missing category.
pub fn record_missing_category(category: MotionCategory) {
    counter!(names::PLANS_TOTAL, "outcome" => "missing_category").increment(1);
    counter!(names::MISSING_CATEGORY_TOTAL, "category" => category.as_str()).increment(1);
}

/// Record a truncated talk slice during realignment.
pub fn record_shortfall() {
    counter!(names::SHORTFALL_TRUNCATIONS_TOTAL).increment(1);
}
