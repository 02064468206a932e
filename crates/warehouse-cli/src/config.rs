//! Run configuration: JSON file, CLI overrides and credentials.
//!
//! Precedence is CLI flag, then config file, then built-in default. The
//! credential pair comes from the config file or, failing that, from
//! `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`. Environment values are only
//! read, never written back.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use warehouse_model::{KeyStrategy, ReferenceLayout, Unit};

pub const ACCESS_KEY_ENV: &str = "AWS_ACCESS_KEY_ID";
pub const SECRET_KEY_ENV: &str = "AWS_SECRET_ACCESS_KEY";

const REMOTE_SCHEMES: [&str; 2] = ["s3://", "s3a://"];
const REDACTED: &str = "[REDACTED]";

/// Access key pair for object storage. The secret is checked for presence
/// and dropped; only a masked key id is ever shown.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    origin: &'static str,
}

impl Credentials {
    /// Build a pair from two optional halves. Both absent is `None`; one
    /// absent is an error.
    pub fn from_parts(
        access_key_id: Option<String>,
        secret_access_key: Option<String>,
        origin: &'static str,
    ) -> Result<Option<Self>> {
        let access_key_id = access_key_id.filter(|v| !v.trim().is_empty());
        let has_secret = secret_access_key.is_some_and(|v| !v.trim().is_empty());
        match (access_key_id, has_secret) {
            (Some(access_key_id), true) => Ok(Some(Self {
                access_key_id,
                origin,
            })),
            (None, false) => Ok(None),
            (Some(_), false) => bail!("{origin}: access key id is set but the secret access key is missing"),
            (None, true) => bail!("{origin}: secret access key is set but the access key id is missing"),
        }
    }

    /// Key id with all but the last four characters hidden.
    pub fn masked_key_id(&self) -> String {
        let tail = self.access_key_id.len().saturating_sub(4);
        match self.access_key_id.get(tail..) {
            Some(visible) if tail > 0 => format!("****{visible}"),
            _ => "****".to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.masked_key_id())
            .field("secret_access_key", &REDACTED)
            .field("origin", &self.origin)
            .finish()
    }
}

/// On-disk configuration. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub source: Option<String>,
    pub destination: Option<String>,
    pub credentials: Option<CredentialsFile>,
    pub key_strategy: Option<KeyStrategy>,
    /// Reference layout JSON, relative to the config file's directory.
    pub reference_layout: Option<PathBuf>,
}

#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CredentialsFile {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl fmt::Debug for CredentialsFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = |v: &Option<String>| v.as_ref().map(|_| REDACTED);
        f.debug_struct("CredentialsFile")
            .field("access_key_id", &shown(&self.access_key_id))
            .field("secret_access_key", &shown(&self.secret_access_key))
            .finish()
    }
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&text)
            .with_context(|| format!("parse config {}", path.display()))?;
        if let (Some(layout), Some(dir)) = (&config.reference_layout, path.parent())
            && layout.is_relative()
        {
            config.reference_layout = Some(dir.join(layout));
        }
        Ok(config)
    }
}

/// Values supplied on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub key_strategy: Option<KeyStrategy>,
    pub reference_layout: Option<PathBuf>,
    pub only: Vec<Unit>,
    pub dry_run: bool,
    pub check_integrity: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub credentials: Option<Credentials>,
    pub key_strategy: KeyStrategy,
    pub layout: ReferenceLayout,
    /// Units to run, in execution order.
    pub units: Vec<Unit>,
    pub dry_run: bool,
    pub check_integrity: bool,
}

impl RunConfig {
    /// Resolve the run settings. `env` looks up environment variables so
    /// callers decide where they come from.
    pub fn resolve<F>(overrides: &Overrides, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match &overrides.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };

        let credentials = match &file.credentials {
            Some(pair) => Credentials::from_parts(
                pair.access_key_id.clone(),
                pair.secret_access_key.clone(),
                "config credentials",
            )?,
            None => Credentials::from_parts(
                env(ACCESS_KEY_ENV),
                env(SECRET_KEY_ENV),
                "environment credentials",
            )?,
        };

        let source = overrides
            .source
            .clone()
            .or(file.source)
            .context("no source location: pass --source or set `source` in the config file")?;
        let destination = overrides.destination.clone().or(file.destination).context(
            "no destination location: pass --destination or set `destination` in the config file",
        )?;
        let source = local_location("source", &source, credentials.as_ref())?;
        let destination = local_location("destination", &destination, credentials.as_ref())?;

        let layout = match overrides.reference_layout.as_ref().or(file.reference_layout.as_ref()) {
            Some(path) => ReferenceLayout::load(path)
                .with_context(|| format!("load reference layout {}", path.display()))?,
            None => ReferenceLayout::default(),
        };

        let units = if overrides.only.is_empty() {
            Unit::ALL.to_vec()
        } else {
            Unit::ALL
                .into_iter()
                .filter(|unit| overrides.only.contains(unit))
                .collect()
        };

        Ok(Self {
            source,
            destination,
            credentials,
            key_strategy: overrides
                .key_strategy
                .or(file.key_strategy)
                .unwrap_or_default(),
            layout,
            units,
            dry_run: overrides.dry_run,
            check_integrity: overrides.check_integrity,
        })
    }
}

/// Map a location to a local path. Remote locations need credentials and
/// are then refused: this build only reads and writes mounted filesystems.
fn local_location(role: &str, location: &str, credentials: Option<&Credentials>) -> Result<PathBuf> {
    let location = location.trim();
    if location.is_empty() {
        bail!("{role} location is empty");
    }
    let lower = location.to_ascii_lowercase();
    if REMOTE_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        let Some(credentials) = credentials else {
            bail!(
                "{role} location {location} is remote and needs credentials \
                 ({ACCESS_KEY_ENV} / {SECRET_KEY_ENV} or `credentials` in the config file)"
            );
        };
        bail!(
            "{role} location {location} is remote; object storage is not supported \
             (found {} key {}), mount the bucket and pass the mount path",
            credentials.origin,
            credentials.masked_key_id()
        );
    }
    Ok(PathBuf::from(location.strip_prefix("file://").unwrap_or(location)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn local(source: &str, destination: &str) -> Overrides {
        Overrides {
            source: Some(source.to_string()),
            destination: Some(destination.to_string()),
            ..Overrides::default()
        }
    }

    #[test]
    fn defaults_apply_without_a_file() {
        let config = RunConfig::resolve(&local("data", "out"), no_env).unwrap();
        assert_eq!(config.source, PathBuf::from("data"));
        assert_eq!(config.key_strategy, KeyStrategy::Monotonic);
        assert_eq!(config.units, Unit::ALL);
        assert!(config.credentials.is_none());
        assert_eq!(config.layout, ReferenceLayout::default());
    }

    #[test]
    fn missing_source_is_an_error() {
        let overrides = Overrides {
            destination: Some("out".into()),
            ..Overrides::default()
        };
        let err = RunConfig::resolve(&overrides, no_env).unwrap_err();
        assert!(err.to_string().contains("no source location"));
    }

    #[test]
    fn only_keeps_unit_order() {
        let mut overrides = local("data", "out");
        overrides.only = vec![Unit::Reference, Unit::Immigration];
        let config = RunConfig::resolve(&overrides, no_env).unwrap();
        assert_eq!(config.units, [Unit::Immigration, Unit::Reference]);
    }

    #[test]
    fn half_credential_pair_is_rejected() {
        let env: HashMap<&str, &str> = HashMap::from([(ACCESS_KEY_ENV, "AKIA")]);
        let err = RunConfig::resolve(&local("data", "out"), |k| {
            env.get(k).map(|v| (*v).to_string())
        })
        .unwrap_err();
        assert!(err.to_string().contains("secret access key is missing"));
    }

    #[test]
    fn remote_location_needs_credentials() {
        let err = RunConfig::resolve(&local("s3a://bucket/raw", "out"), no_env).unwrap_err();
        assert!(err.to_string().contains("needs credentials"), "{err}");
    }

    #[test]
    fn remote_location_with_credentials_is_unsupported() {
        let env: HashMap<&str, &str> =
            HashMap::from([(ACCESS_KEY_ENV, "AKIAEXAMPLE1"), (SECRET_KEY_ENV, "shh")]);
        let err = RunConfig::resolve(&local("data", "S3://bucket/out"), |k| {
            env.get(k).map(|v| (*v).to_string())
        })
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("not supported"), "{message}");
        assert!(message.contains("environment credentials key ****PLE1"), "{message}");
        assert!(!message.contains("shh"));
    }

    #[test]
    fn debug_redacts_secrets() {
        let creds = Credentials::from_parts(Some("AKIA123".into()), Some("hunter2".into()), "test")
            .unwrap()
            .unwrap();
        let shown = format!("{creds:?}");
        assert!(!shown.contains("AKIA123"));
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("****A123"));
        assert!(shown.contains(REDACTED));
    }

    #[test]
    fn short_key_id_is_fully_masked() {
        let creds = Credentials::from_parts(Some("AKIA".into()), Some("s".into()), "test")
            .unwrap()
            .unwrap();
        assert_eq!(creds.masked_key_id(), "****");
    }

    #[test]
    fn file_values_yield_to_flags() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etl.json");
        fs::write(
            &path,
            r#"{
                "source": "raw",
                "destination": "lake",
                "key_strategy": "content-hash",
                "credentials": {"access_key_id": "AKIA", "secret_access_key": "shh"}
            }"#,
        )
        .unwrap();
        let overrides = Overrides {
            config: Some(path),
            destination: Some("elsewhere".into()),
            ..Overrides::default()
        };
        let config = RunConfig::resolve(&overrides, no_env).unwrap();
        assert_eq!(config.source, PathBuf::from("raw"));
        assert_eq!(config.destination, PathBuf::from("elsewhere"));
        assert_eq!(config.key_strategy, KeyStrategy::ContentHash);
        assert_eq!(
            config.credentials.as_ref().map(Credentials::masked_key_id),
            Some("****".to_string())
        );
    }

    #[test]
    fn unknown_config_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("etl.json");
        fs::write(&path, r#"{"sauce": "raw"}"#).unwrap();
        let overrides = Overrides {
            config: Some(path),
            ..Overrides::default()
        };
        assert!(RunConfig::resolve(&overrides, no_env).is_err());
    }
}
