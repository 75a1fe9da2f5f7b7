use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // log level for http tracing
    pub log_level: tracing::Level,
}

impl Config {
    pub fn new(listen_addr: SocketAddr, log_level: tracing::Level) -> Self {
        tracing::debug!(%listen_addr, ?log_level, "creating HTTP server config");
        Self {
            listen_addr,
            log_level,
        }
    }
}
