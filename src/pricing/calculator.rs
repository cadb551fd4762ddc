//! Break-even arithmetic
//!
//! A remote option pays off once cumulative hourly savings cover the one-time
//! egress charge: `H = egress / (local - remote)`.

pub const ADVISORY_REMOTE_MORE_EXPENSIVE: &str =
    "Not recommended. Compute cost is higher than the data-local option.";

pub const ADVISORY_IDENTICAL_COST: &str =
    "Compute cost is identical. This option is always more expensive.";

pub const ADVISORY_DATA_LOCAL: &str = "This is your data-local option.";

/// Outcome of a break-even comparison
#[derive(Debug, Clone, PartialEq)]
pub struct BreakEven {
    /// `None` when the remote option never pays off
    pub hours: Option<f64>,
    pub advisory: String,
}

/// Compare a remote option against the data-local baseline.
///
/// Returns no break-even when the remote hourly cost is greater than or equal
/// to the local one. Otherwise the hours are rounded to one decimal place,
/// halves away from zero.
pub fn compute_break_even(
    local_cost_per_hour: f64,
    remote_cost_per_hour: f64,
    one_time_egress_cost: f64,
) -> BreakEven {
    if remote_cost_per_hour > local_cost_per_hour {
        return BreakEven {
            hours: None,
            advisory: ADVISORY_REMOTE_MORE_EXPENSIVE.to_string(),
        };
    }

    if remote_cost_per_hour == local_cost_per_hour {
        return BreakEven {
            hours: None,
            advisory: ADVISORY_IDENTICAL_COST.to_string(),
        };
    }

    let hourly_savings = local_cost_per_hour - remote_cost_per_hour;
    let hours = round_one_decimal(one_time_egress_cost / hourly_savings);

    BreakEven {
        hours: Some(hours),
        advisory: format!(
            "Cheaper than data-local provider if your job runs for MORE than {:.1} hours.",
            hours
        ),
    }
}

fn round_one_decimal(value: f64) -> f64 {
    // f64::round rounds half away from zero
    (value * 10.0).round() / 10.0
}
