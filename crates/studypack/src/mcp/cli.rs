use crate::session::DEFAULT_TTL_SECS;

#[derive(Debug, clap::Parser)]
#[command(name = "mcp")]
#[command(about = "Model Context Protocol server")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Start MCP server with stdio transport
    #[clap(name = "stdio")]
    Stdio(ServerOptions),
}

#[derive(Debug, clap::Args)]
pub struct ServerOptions {
    /// Seconds a processed document stays available to the session tools
    #[arg(long, env = "STUDYPACK_SESSION_TTL", default_value_t = DEFAULT_TTL_SECS)]
    pub session_ttl_secs: u64,
}
