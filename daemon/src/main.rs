//! Suncoin daemon: entry point for running a Suncoin full node.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use suncoin_emission::{EmissionPolicy, ReservedAddressTable};
use suncoin_network::{BuildInfo, Daemon};
use suncoin_node::{init_logging, signals, NodeConfig, Supervisor};
use suncoin_rpc::RpcServer;
use suncoin_store_lmdb::{DatabaseHandle, LmdbEnvironment};
use suncoin_utils::{ShutdownSignal, Subsystem};
use suncoin_web::WebServer;

#[derive(Parser)]
#[command(name = "suncoin", version, about = "Suncoin full node daemon")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, env = "SUNCOIN_CONFIG")]
    config: Option<PathBuf>,

    /// Directory to store app data (defaults to ./.suncoin).
    #[arg(long, env = "SUNCOIN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Database location (defaults to <data-dir>/data.db).
    #[arg(long, env = "SUNCOIN_DB_PATH")]
    db_path: Option<PathBuf>,

    /// IP address to serve P2P on. Leave empty to listen on all interfaces.
    #[arg(long, env = "SUNCOIN_ADDRESS")]
    address: Option<String>,

    /// Port for P2P connections.
    #[arg(long, env = "SUNCOIN_PORT")]
    port: Option<u16>,

    /// Disable all network activity.
    #[arg(long, env = "SUNCOIN_DISABLE_NETWORKING")]
    disable_networking: bool,

    /// Don't allow incoming connections.
    #[arg(long, env = "SUNCOIN_DISABLE_INCOMING")]
    disable_incoming: bool,

    /// Don't make outgoing connections.
    #[arg(long, env = "SUNCOIN_DISABLE_OUTGOING")]
    disable_outgoing: bool,

    /// Only listen on and connect to localhost.
    #[arg(long, env = "SUNCOIN_LOCALHOST_ONLY")]
    localhost_only: bool,

    /// Maximum number of outgoing connections.
    #[arg(long, env = "SUNCOIN_MAX_OUTGOING")]
    max_outgoing_connections: Option<usize>,

    /// Seconds between outgoing connection attempts.
    #[arg(long, env = "SUNCOIN_OUTGOING_RATE")]
    outgoing_connections_rate: Option<u64>,

    /// Maximum number of tracked peers.
    #[arg(long, env = "SUNCOIN_MAX_PEERS")]
    max_peers: Option<usize>,

    /// Peers to dial (comma-separated "ip:port" list).
    #[arg(long, env = "SUNCOIN_PEERS", value_delimiter = ',')]
    peers: Vec<String>,

    /// Force a connection to this ip:port on startup.
    #[arg(long, env = "SUNCOIN_CONNECT_TO")]
    connect_to: Option<String>,

    /// Disable the JSON-RPC interface.
    #[arg(long, env = "SUNCOIN_DISABLE_RPC")]
    disable_rpc: bool,

    #[arg(long, env = "SUNCOIN_RPC_ADDR")]
    rpc_interface_addr: Option<String>,

    #[arg(long, env = "SUNCOIN_RPC_PORT")]
    rpc_interface_port: Option<u16>,

    /// Number of RPC worker tasks.
    #[arg(long, env = "SUNCOIN_RPC_THREADS")]
    rpc_thread_num: Option<usize>,

    /// Disable the web interface.
    #[arg(long, env = "SUNCOIN_DISABLE_WEB")]
    disable_web_interface: bool,

    #[arg(long, env = "SUNCOIN_WEB_ADDR")]
    web_interface_addr: Option<String>,

    #[arg(long, env = "SUNCOIN_WEB_PORT")]
    web_interface_port: Option<u16>,

    /// Serve the web interface over HTTPS.
    #[arg(long, env = "SUNCOIN_WEB_HTTPS")]
    web_interface_https: bool,

    /// TLS certificate (defaults to <data-dir>/cert.pem).
    #[arg(long, env = "SUNCOIN_WEB_CERT")]
    web_interface_cert: Option<PathBuf>,

    /// TLS key (defaults to <data-dir>/key.pem).
    #[arg(long, env = "SUNCOIN_WEB_KEY")]
    web_interface_key: Option<PathBuf>,

    /// Static content directory for the web GUI.
    #[arg(long, env = "SUNCOIN_GUI_DIR")]
    gui_dir: Option<PathBuf>,

    /// Disable the CSRF check on the web API.
    #[arg(long, env = "SUNCOIN_DISABLE_CSRF")]
    disable_csrf: bool,

    /// Print the web interface address to stdout.
    #[arg(long)]
    print_web_interface_address: bool,

    /// Genesis address override.
    #[arg(long, env = "SUNCOIN_GENESIS_ADDRESS")]
    genesis_address: Option<String>,

    /// Genesis signature override (hex).
    #[arg(long, env = "SUNCOIN_GENESIS_SIGNATURE")]
    genesis_signature: Option<String>,

    /// Genesis timestamp override.
    #[arg(long, env = "SUNCOIN_GENESIS_TIMESTAMP")]
    genesis_timestamp: Option<u64>,

    /// Blockchain public key override (hex).
    #[arg(long, env = "SUNCOIN_BLOCKCHAIN_PUBKEY")]
    blockchain_public_key: Option<String>,

    /// Blockchain secret key (hex); only for a master node.
    #[arg(long, env = "SUNCOIN_BLOCKCHAIN_SECKEY", hide_env_values = true)]
    blockchain_secret_key: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "SUNCOIN_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "SUNCOIN_LOG_FORMAT")]
    log_format: Option<String>,
}

/// Layer CLI flags and env vars over the file (or default) configuration.
fn resolve_config(cli: Cli) -> anyhow::Result<NodeConfig> {
    let base = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config file {}", path.display()))?,
        None => NodeConfig::default(),
    };

    Ok(NodeConfig {
        data_dir: cli.data_dir.unwrap_or(base.data_dir),
        db_path: cli.db_path.or(base.db_path),
        address: cli.address.unwrap_or(base.address),
        port: cli.port.unwrap_or(base.port),
        disable_networking: cli.disable_networking || base.disable_networking,
        disable_incoming: cli.disable_incoming || base.disable_incoming,
        disable_outgoing: cli.disable_outgoing || base.disable_outgoing,
        localhost_only: cli.localhost_only || base.localhost_only,
        outgoing_max: cli.max_outgoing_connections.unwrap_or(base.outgoing_max),
        outgoing_rate_secs: cli.outgoing_connections_rate.unwrap_or(base.outgoing_rate_secs),
        max_peers: cli.max_peers.unwrap_or(base.max_peers),
        default_connections: if cli.peers.is_empty() {
            base.default_connections
        } else {
            cli.peers
        },
        connect_to: cli.connect_to.or(base.connect_to),
        enable_rpc: !cli.disable_rpc && base.enable_rpc,
        rpc_addr: cli.rpc_interface_addr.unwrap_or(base.rpc_addr),
        rpc_port: cli.rpc_interface_port.unwrap_or(base.rpc_port),
        rpc_threads: cli.rpc_thread_num.unwrap_or(base.rpc_threads),
        enable_web: !cli.disable_web_interface && base.enable_web,
        web_addr: cli.web_interface_addr.unwrap_or(base.web_addr),
        web_port: cli.web_interface_port.unwrap_or(base.web_port),
        web_https: cli.web_interface_https || base.web_https,
        web_cert: cli.web_interface_cert.or(base.web_cert),
        web_key: cli.web_interface_key.or(base.web_key),
        static_dir: cli.gui_dir.unwrap_or(base.static_dir),
        disable_csrf: cli.disable_csrf || base.disable_csrf,
        print_web_interface_address: cli.print_web_interface_address
            || base.print_web_interface_address,
        genesis_address: cli.genesis_address.or(base.genesis_address),
        genesis_signature: cli.genesis_signature.or(base.genesis_signature),
        genesis_timestamp: cli.genesis_timestamp.or(base.genesis_timestamp),
        blockchain_pubkey: cli.blockchain_public_key.or(base.blockchain_pubkey),
        blockchain_seckey: cli.blockchain_secret_key.or(base.blockchain_seckey),
        log_level: cli.log_level.unwrap_or(base.log_level),
        log_format: cli.log_format.unwrap_or(base.log_format),
        ..base
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = resolve_config(Cli::parse())?;
    init_logging(config.log_format()?, &config.log_level)?;

    let network = config
        .network_params()
        .context("invalid network parameters")?;
    let table = ReservedAddressTable::mainnet().context("invalid distribution address table")?;
    tracing::info!(
        reserved = table.len(),
        initial_balance = table.initial_balance(),
        "emission schedule loaded"
    );
    let policy = Arc::new(EmissionPolicy::new(table));
    if network.is_master() {
        tracing::info!("blockchain secret key configured, running as master");
    }

    let db_path = config.resolved_db_path();
    let db = LmdbEnvironment::open(&db_path).with_context(|| {
        format!(
            "failed to open database at {}. Is another instance running?",
            db_path.display()
        )
    })?;
    let db = Arc::new(db);
    tracing::info!(path = %db_path.display(), schema = db.schema_version(), "database opened");

    let build = BuildInfo {
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: option_env!("SUNCOIN_COMMIT").unwrap_or("unknown").to_string(),
    };
    let daemon = Arc::new(
        Daemon::new(config.daemon_config(&network), Arc::clone(&db), policy, build)
            .context("failed to create network daemon")?,
    );
    let gateway = daemon.gateway();

    // Startup order. Shutdown runs in reverse.
    let mut handles: Vec<Arc<dyn Subsystem>> = Vec::new();
    handles.push(Arc::new(DatabaseHandle::new(db)));
    handles.push(daemon);

    if config.enable_rpc {
        let rpc = RpcServer::new(config.rpc_config()?, Arc::clone(&gateway))
            .context("failed to create RPC server")?;
        handles.push(Arc::new(rpc));
    }

    if config.enable_web {
        let web = WebServer::new(config.web_config()?, gateway)
            .await
            .context("failed to create web interface")?;
        if config.print_web_interface_address {
            println!("{}", web.full_address());
        }
        tracing::info!(address = %web.full_address(), "web interface configured");
        handles.push(Arc::new(web));
    }

    let termination = Arc::new(ShutdownSignal::new());
    let mut supervisor = Supervisor::start(handles, Arc::clone(&termination));
    let diagnostics = supervisor.diagnostics();

    let interrupts = signals::listen_for_interrupts().context("failed to install signal handlers")?;
    let escalation_dump = diagnostics.clone();
    tokio::spawn(signals::handle_interrupts(interrupts, termination, move || {
        signals::abort_with_diagnostics(&escalation_dump);
    }));
    signals::spawn_diagnostic_listener(diagnostics).context("failed to install SIGUSR1 handler")?;

    supervisor.run();
    let cause = supervisor.await_termination().await;
    tracing::info!(?cause, "shutting down");

    match supervisor.shutdown(&cause).await {
        Ok(()) => {
            tracing::info!("Goodbye");
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = %err, "node stopped after subsystem failure");
            Err(err.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_file_values() {
        let dir = std::env::temp_dir().join(format!("suncoin-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("suncoin.toml");
        std::fs::write(&file, "rpc_port = 9000\nweb_port = 9001\nlocalhost_only = true\n").unwrap();

        let cli = Cli::parse_from([
            "suncoin",
            "--config",
            file.to_str().unwrap(),
            "--rpc-interface-port",
            "9100",
            "--disable-web-interface",
        ]);
        let config = resolve_config(cli).unwrap();
        assert_eq!(config.rpc_port, 9100);
        assert_eq!(config.web_port, 9001);
        assert!(config.localhost_only);
        assert!(!config.enable_web);
        assert!(config.enable_rpc);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
