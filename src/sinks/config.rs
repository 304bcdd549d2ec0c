use crate::args::PingArgs;

/// Where and under which prefix metrics are published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphiteConfig {
    pub host: String,
    pub port: u16,
    pub prefix: String,
}

impl GraphiteConfig {
    #[must_use]
    pub fn from_args(args: &PingArgs) -> Self {
        Self {
            host: args.host.clone(),
            port: args.port,
            prefix: args.prefix.clone(),
        }
    }

    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
