//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use bon::Builder;

/// Default listen address, `0.0.0.0:5000`.
pub const DEFAULT_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5000);

/// Settings for [`serve`](super::serve).
#[derive(Debug, Clone, Builder)]
pub struct ServeConfig {
    /// Directory holding the pipeline and label mappings.
    #[builder(into)]
    pub artifacts: PathBuf,

    #[builder(default = DEFAULT_ADDR)]
    pub addr: SocketAddr,

    /// Maximum concurrent predictor calls. Default: number of CPU cores.
    #[builder(default = default_concurrency())]
    pub max_concurrency: usize,
}

/// Available CPU cores, or 1 if unknown.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism().map_or(1, |n| n.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults() {
        let config = ServeConfig::builder().artifacts("artifacts").build();
        assert_eq!(config.addr.port(), 5000);
        assert!(config.addr.ip().is_unspecified());
        assert!(config.max_concurrency >= 1);
        assert_eq!(config.artifacts, PathBuf::from("artifacts"));
    }
}
