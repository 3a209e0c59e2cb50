//! Network capabilities used by the probes: HTTP fetching, TLS peer
//! certificates and WHOIS registry lookups.

pub mod http_client;
pub mod tls;
pub mod whois;
