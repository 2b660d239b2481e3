//! Config CLI command.

use std::io::Write;

use super::emit;
use crate::config::PostforgeConfig;
use crate::{Error, Result};

/// Config command handler.
pub struct ConfigCommand;

impl ConfigCommand {
    /// Writes the effective configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn show(config: &PostforgeConfig, out: &mut impl Write) -> Result<()> {
        let rendered =
            toml::to_string_pretty(config).map_err(|e| Error::operation("serialize_config", e))?;
        emit(out, rendered.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_round_trips() {
        let config = PostforgeConfig::default().with_seed_dir("./seeds");
        let mut out = Vec::new();

        ConfigCommand::show(&config, &mut out).unwrap();

        let parsed = PostforgeConfig::parse(&String::from_utf8(out).unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
