//! Merge rules: defaults, override order, conflict handling.

use crate::config::DEFAULT_LABEL_SELECTOR;
use crate::extension::loader::DEFAULT_DATA_KEY;
use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
///
/// Later sources override earlier ones key by key; tables are merged, not replaced.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("extensions.source", "none")?
        .set_default("extensions.data_key", DEFAULT_DATA_KEY)?
        .set_default("extensions.label_selector", DEFAULT_LABEL_SELECTOR)?
        .set_default("extensions.fetch_timeout_secs", 30)
}
