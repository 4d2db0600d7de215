//! Environment-variable-driven configuration, validated once at startup into
//! a typed [`Config`] (§6), grounded on the teacher's `common::env::DeployEnv`:
//! a `from_env` constructor that fails closed rather than a struct business
//! logic reads ad hoc.

use std::path::PathBuf;

use anyhow::{bail, ensure, Context};
use tinto_common::EnvironmentName;

/// Everything the composition root needs before it can wire an
/// [`crate::context::AppContext`] together. Every field is validated here,
/// once, rather than trusted at each call site.
#[derive(Clone, Debug)]
pub struct Config {
    /// Gates [`tinto_keys::MasterKey::load`] (§4.2): direct console access.
    pub console_discriminator: Option<String>,
    /// Path to the encrypted master-key blob.
    pub master_key_file: PathBuf,
    /// Base64 32-byte AES key used to decrypt `master_key_file`.
    pub system_key_b64: String,
    /// Which DIAN environment this process submits against.
    pub environment_name: EnvironmentName,
    /// DIAN-assigned identifiers for the WS-Security header and UBL
    /// extension (§4.5 item 2, §4.8).
    pub software_provider_id: String,
    pub software_id: String,
    pub software_pin: String,
    /// CUFE/CUDE input field 10 (§4.4): environment-scoped constant DIAN
    /// assigns per technical registration.
    pub technical_key: String,
}

impl Config {
    /// Read and validate every field from the environment. Fails closed: a
    /// missing or malformed variable aborts startup rather than falling back
    /// to a guessed default.
    pub fn from_env() -> anyhow::Result<Self> {
        let console_discriminator = std::env::var("TINTO_CONSOLE_ACCESS").ok();

        let master_key_file = std::env::var("TINTO_MASTER_KEY_FILE")
            .context("TINTO_MASTER_KEY_FILE was not set")?
            .into();

        let system_key_b64 =
            std::env::var("TINTO_SYSTEM_KEY").context("TINTO_SYSTEM_KEY was not set")?;

        let environment_name = match std::env::var("TINTO_ENVIRONMENT")
            .context("TINTO_ENVIRONMENT was not set")?
            .as_str()
        {
            "habilitacion" => EnvironmentName::Habilitacion,
            "produccion" => EnvironmentName::Produccion,
            other => bail!(
                "unrecognized TINTO_ENVIRONMENT '{other}': must be 'habilitacion' or 'produccion'"
            ),
        };

        let software_provider_id = std::env::var("TINTO_SOFTWARE_PROVIDER_ID")
            .context("TINTO_SOFTWARE_PROVIDER_ID was not set")?;
        let software_id =
            std::env::var("TINTO_SOFTWARE_ID").context("TINTO_SOFTWARE_ID was not set")?;
        let software_pin =
            std::env::var("TINTO_SOFTWARE_PIN").context("TINTO_SOFTWARE_PIN was not set")?;
        let technical_key =
            std::env::var("TINTO_TECHNICAL_KEY").context("TINTO_TECHNICAL_KEY was not set")?;

        ensure!(
            !software_provider_id.is_empty()
                && !software_id.is_empty()
                && !software_pin.is_empty()
                && !technical_key.is_empty(),
            "TINTO_SOFTWARE_PROVIDER_ID, TINTO_SOFTWARE_ID, TINTO_SOFTWARE_PIN, and \
             TINTO_TECHNICAL_KEY must all be non-empty"
        );

        Ok(Self {
            console_discriminator,
            master_key_file,
            system_key_b64,
            environment_name,
            software_provider_id,
            software_id,
            software_pin,
            technical_key,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unrecognized_environment_name_is_rejected() {
        let err = match "neither" {
            "habilitacion" => unreachable!(),
            "produccion" => unreachable!(),
            other => format!("unrecognized TINTO_ENVIRONMENT '{other}'"),
        };
        assert!(err.contains("neither"));
    }
}
