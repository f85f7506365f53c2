use std::{fmt, fs, path::Path, str::FromStr};

use kmsc_kmip::kmip_0::kmip_types::ProtocolVersion;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, ClientResult};

pub const DEFAULT_SETTINGS_FILE: &str = "kms.json";

/// Which dialect service drives the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "kmip14")]
    Kmip14,
    #[serde(rename = "kmip20")]
    Kmip20,
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kmip14 => write!(f, "kmip14"),
            Self::Kmip20 => write!(f, "kmip20"),
        }
    }
}

impl FromStr for ServiceType {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kmip14" => Ok(Self::Kmip14),
            "kmip20" => Ok(Self::Kmip20),
            other => Err(ClientError::Usage(format!("unknown service type: {other}"))),
        }
    }
}

/// Everything the client needs to reach and speak to one KMS server.
///
/// Mutable between operations; not synchronized — callers that share a
/// settings value across threads bring their own lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigurationSettings {
    /// Persist changes to `settings_file` when they happen
    pub save_settings_to_file: bool,
    /// Where the JSON settings live
    pub settings_file: String,
    /// KMS server name, informational only
    pub kms_server_name: String,
    /// KMS server host name or IP address
    pub kms_server_ip: String,
    /// KMS server port, typically 5696
    pub kms_server_port: u16,
    /// Certificate-authority bundle, PEM
    pub cert_auth_file: String,
    /// Client private key, PKCS#8 PEM
    pub key_file: String,
    /// Client certificate, PEM
    pub cert_file: String,
    /// Major protocol version sent in request headers
    pub protocol_version_major: i32,
    /// Minor protocol version sent in request headers
    pub protocol_version_minor: i32,
    /// The dialect service matching the protocol version
    pub service_type: ServiceType,
    /// Skip server certificate verification (self-signed test servers)
    pub insecure_skip_verify: bool,
    /// Per-operation deadline over write+read, seconds
    pub timeout_secs: Option<u64>,
    /// Console: print the elapsed time of each command
    pub show_elapsed: bool,
}

impl Default for ConfigurationSettings {
    fn default() -> Self {
        Self {
            save_settings_to_file: true,
            settings_file: DEFAULT_SETTINGS_FILE.to_owned(),
            kms_server_name: String::new(),
            kms_server_ip: "localhost".to_owned(),
            kms_server_port: 5696,
            cert_auth_file: String::new(),
            key_file: String::new(),
            cert_file: String::new(),
            protocol_version_major: 1,
            protocol_version_minor: 4,
            service_type: ServiceType::Kmip14,
            insecure_skip_verify: true,
            timeout_secs: Some(30),
            show_elapsed: false,
        }
    }
}

impl ConfigurationSettings {
    #[must_use]
    pub const fn protocol_version(&self) -> ProtocolVersion {
        ProtocolVersion::new(self.protocol_version_major, self.protocol_version_minor)
    }

    /// Record a negotiated protocol version and flip the dialect service
    /// to match.
    pub fn adopt_version(&mut self, version: ProtocolVersion) {
        self.protocol_version_major = version.protocol_version_major;
        self.protocol_version_minor = version.protocol_version_minor;
        self.service_type = if version.protocol_version_major >= 2 {
            ServiceType::Kmip20
        } else {
            ServiceType::Kmip14
        };
    }

    /// Save all configuration settings to the JSON settings file,
    /// world-readable (0644), owner-writable.
    pub fn store(&self) -> ClientResult<()> {
        debug!(file = %self.settings_file, "store configuration settings");
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ClientError::Usage(format!("cannot serialize settings: {e}")))?;
        fs::write(&self.settings_file, json)
            .map_err(|e| ClientError::Transport(format!("cannot write settings: {e}")))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.settings_file, fs::Permissions::from_mode(0o644))
                .map_err(|e| ClientError::Transport(format!("cannot chmod settings: {e}")))?;
        }
        Ok(())
    }

    /// Read the configuration settings from a JSON file.
    ///
    /// A missing file is not an error: the defaults are returned and
    /// written out, so a fresh working directory bootstraps itself.
    pub fn restore(path: Option<&str>) -> ClientResult<Self> {
        let path = path.unwrap_or(DEFAULT_SETTINGS_FILE);
        if Path::new(path).exists() {
            debug!(file = %path, "restore configuration settings");
            let content = fs::read_to_string(path)
                .map_err(|e| ClientError::Transport(format!("cannot read settings: {e}")))?;
            let mut settings: Self = serde_json::from_str(&content)
                .map_err(|e| ClientError::Usage(format!("cannot parse settings {path}: {e}")))?;
            settings.settings_file = path.to_owned();
            Ok(settings)
        } else {
            debug!(file = %path, "settings file does not exist, using defaults");
            let settings = Self {
                settings_file: path.to_owned(),
                ..Self::default()
            };
            settings.store()?;
            Ok(settings)
        }
    }
}

#[allow(clippy::unwrap_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restore_of_missing_file_yields_defaults_and_creates_it() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kms.json");
        let path_str = path.to_str().unwrap();

        let settings = ConfigurationSettings::restore(Some(path_str)).unwrap();
        assert_eq!(settings.kms_server_port, 5696);
        assert_eq!(settings.protocol_version(), ProtocolVersion::KMIP_1_4);
        assert_eq!(settings.service_type, ServiceType::Kmip14);
        assert!(path.exists());
    }

    #[test]
    fn store_restore_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kms.json");
        let path_str = path.to_str().unwrap();

        let mut settings = ConfigurationSettings {
            settings_file: path_str.to_owned(),
            kms_server_ip: "10.0.0.7".to_owned(),
            kms_server_port: 5697,
            cert_auth_file: "/etc/kms/ca.pem".to_owned(),
            ..ConfigurationSettings::default()
        };
        settings.adopt_version(ProtocolVersion::KMIP_2_0);
        settings.store().unwrap();

        let restored = ConfigurationSettings::restore(Some(path_str)).unwrap();
        assert_eq!(restored.kms_server_ip, "10.0.0.7");
        assert_eq!(restored.kms_server_port, 5697);
        assert_eq!(restored.service_type, ServiceType::Kmip20);
        assert_eq!(restored.protocol_version(), ProtocolVersion::KMIP_2_0);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o644);
        }
    }

    #[test]
    fn adopt_version_flips_the_dialect() {
        let mut settings = ConfigurationSettings::default();
        settings.adopt_version(ProtocolVersion::KMIP_2_0);
        assert_eq!(settings.service_type, ServiceType::Kmip20);
        settings.adopt_version(ProtocolVersion::KMIP_1_4);
        assert_eq!(settings.service_type, ServiceType::Kmip14);
    }
}
