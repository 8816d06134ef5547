//! Cloud provider integration: request signing, token lifecycle and
//! the signed device API client.

pub mod client;
pub mod sign;
pub mod token;

/// Provider error code: the carried access token is invalid.
pub const CODE_TOKEN_INVALID: i64 = 1010;

/// Provider error code: the carried access token has expired.
pub const CODE_TOKEN_EXPIRED: i64 = 1011;

/// Provider error code: request frequency exceeded, back off.
pub const CODE_RATE_LIMITED: i64 = 1013;

/// Telemetry code for instantaneous power draw, in tenths of a watt.
pub const STATUS_CODE_POWER: &str = "cur_power";

/// Telemetry code for line voltage, in tenths of a volt.
pub const STATUS_CODE_VOLTAGE: &str = "cur_voltage";

/// Whether an envelope code means the token must be refreshed.
pub fn is_auth_rejection(code: i64) -> bool {
    code == CODE_TOKEN_INVALID || code == CODE_TOKEN_EXPIRED
}
