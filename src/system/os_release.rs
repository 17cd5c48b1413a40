//! `/etc/os-release` parsing.

use std::fs;
use std::io;
use std::path::Path;

/// The subset of os-release fields the installer cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsRelease {
    pub id: String,
    pub version_id: String,
    pub pretty_name: Option<String>,
}

impl OsRelease {
    pub fn load(path: &Path) -> io::Result<Self> {
        Ok(Self::parse(&fs::read_to_string(path)?))
    }

    /// Parse `KEY=value` lines; quotes around values are stripped and
    /// unknown keys ignored.
    pub fn parse(content: &str) -> Self {
        let mut release = OsRelease::default();

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'').to_string();

            match key.trim() {
                "ID" => release.id = value.to_lowercase(),
                "VERSION_ID" => release.version_id = value,
                "PRETTY_NAME" => release.pretty_name = Some(value),
                _ => {}
            }
        }

        release
    }

    /// Name for display: PRETTY_NAME when present, else `ID VERSION_ID`.
    pub fn display_name(&self) -> String {
        match &self.pretty_name {
            Some(name) => name.clone(),
            None => format!("{} {}", self.id, self.version_id).trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UBUNTU_2204: &str = r#"PRETTY_NAME="Ubuntu 22.04.4 LTS"
NAME="Ubuntu"
VERSION_ID="22.04"
VERSION="22.04.4 LTS (Jammy Jellyfish)"
VERSION_CODENAME=jammy
ID=ubuntu
ID_LIKE=debian
"#;

    #[test]
    fn test_parse_ubuntu() {
        let release = OsRelease::parse(UBUNTU_2204);
        assert_eq!(release.id, "ubuntu");
        assert_eq!(release.version_id, "22.04");
        assert_eq!(release.display_name(), "Ubuntu 22.04.4 LTS");
    }

    #[test]
    fn test_parse_ignores_noise() {
        let release = OsRelease::parse("# comment\n\ngarbage\nID='Debian'\n");
        assert_eq!(release.id, "debian");
        assert!(release.version_id.is_empty());
        assert_eq!(release.display_name(), "debian");
    }
}
