use serde::Deserialize;

/// One element of the `pm2 jlist` array.
///
/// pm2 emits far more fields than these; everything the exporter does not
/// use is ignored, and every field it does use falls back to zero/empty
/// when absent so a partial `pm2_env` never fails the whole collection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pm2Process {
    #[serde(default)]
    pub pid: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pm2_env: Pm2Env,
    #[serde(default)]
    pub monit: Monit,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Pm2Env {
    /// Textual process state, e.g. "online", "stopped", "errored".
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub restart_time: i64,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Process start time, epoch milliseconds. Zero when pm2 has none.
    #[serde(default)]
    pub pm_uptime: i64,
    #[serde(default)]
    pub versioning: Versioning,
}

/// Source-control info pm2 attaches when the app directory is a checkout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Versioning {
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub revision: String,
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Monit {
    /// Resident memory in bytes.
    #[serde(default)]
    pub memory: i64,
    /// CPU usage in percent.
    #[serde(default)]
    pub cpu: f64,
}
