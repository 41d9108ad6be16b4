use std::path::Path;
use std::path::PathBuf;

use rand::Rng;
use rand::RngExt;
use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;

/// The JSON descriptor a sidecar reads to learn how to connect to the
/// bridge's five channels and sign its messages.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConnectionInfo {
    pub ip: String,
    pub transport: String,

    pub shell_port: u16,
    pub iopub_port: u16,
    pub stdin_port: u16,
    pub control_port: u16,
    pub hb_port: u16,

    pub key: String,
    pub signature_scheme: String,
    pub kernel_name: String,
}

impl ConnectionInfo {
    pub fn new(ip: &str, key: &str, ports: ChannelPorts) -> Self {
        Self {
            ip: ip.to_string(),
            transport: "tcp".to_string(),
            shell_port: ports.shell,
            iopub_port: ports.iopub,
            stdin_port: ports.stdin,
            control_port: ports.control,
            hb_port: ports.hb,
            key: key.to_string(),
            signature_scheme: "hmac-sha256".to_string(),
            kernel_name: "python3".to_string(),
        }
    }
}

/// The five bound TCP ports, in the same order the endpoint binds them.
#[derive(Debug, Clone, Copy)]
pub struct ChannelPorts {
    pub shell: u16,
    pub iopub: u16,
    pub hb: u16,
    pub control: u16,
    pub stdin: u16,
}

/// Owns the connection file on disk for the lifetime of the bridge: the
/// temporary directory is created in [`ConnectionFile::write`] and removed
/// in [`ConnectionFile::remove`].
pub struct ConnectionFile {
    dir: tempfile::TempDir,
    path: PathBuf,
}

impl ConnectionFile {
    /// Writes a new connection file describing `info` into a fresh
    /// `runtimed-bridge-*` temporary directory.
    pub fn write(info: &ConnectionInfo) -> Result<Self, Error> {
        let dir = tempfile::Builder::new()
            .prefix("runtimed-bridge-")
            .tempdir()
            .map_err(Error::CreateConnectionDir)?;

        let suffix: [u8; 4] = rand::rng().random();
        let file_name = format!("kernel-bridge-{}.json", hex::encode(suffix));
        let path = dir.path().join(file_name);

        let contents = serde_json::to_vec(info).map_err(Error::CannotSerialize)?;
        std::fs::write(&path, contents).map_err(Error::WriteConnectionFile)?;

        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Removes the connection file and its parent directory. Filesystem
    /// errors are ignored: the directory may already be gone.
    pub fn remove(self) {
        let _ = std::fs::remove_file(&self.path);
        let _ = self.dir.close();
    }
}
