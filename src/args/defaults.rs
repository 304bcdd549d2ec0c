/// Config file picked up from the working directory when `--config` is absent.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "pingstat.toml";

pub(crate) const DEFAULT_HOST: &str = "localhost";
/// Graphite plaintext listener port.
pub(crate) const DEFAULT_PORT: u16 = 2003;
pub(crate) const DEFAULT_PREFIX: &str = "ping";
pub(crate) const DEFAULT_FPING: &str = "/usr/sbin/fping";
/// ICMP payload bytes; 56 gives the classic 84-byte packet.
pub(crate) const DEFAULT_PACKET_SIZE: u16 = 56;
