//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources override these; keys a source leaves out keep the default.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("telemetry.printing_interval_ms", 1000)?
        .set_default("telemetry.idle_interval_ms", 2500)?
        .set_default("telemetry.sleeping_interval_ms", 10_000)?
        .set_default("telemetry.sleep_after_secs", 180)?
        .set_default("telemetry.refresh_interval_secs", 300)?
        .set_default("telemetry.jitter_threshold", 0.5)?
        .set_default("telemetry.queue_length_limit", 4)?
        .set_default("commands.poll_interval_ms", 500)?
        .set_default("commands.max_attempts", 10)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")?
        .set_default("logging.output", "stdout")
}
