//! local-ai-tool-proxy: HTTP bridge from web apps to local AI CLI agents
//!
//! Accepts prompts over HTTP, hands them to an installed command-line agent
//! together with a configured system prompt, and returns the agent's answer
//! as plain text.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use local_ai_tool_proxy::{
    config::{AppConfig, ConfigError},
    create_default_registry,
    providers::ProviderRegistry,
    run_server, ProxyState,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Parser)]
#[command(name = "local-ai-tool-proxy")]
#[command(version)]
#[command(about = "HTTP proxy that bridges web applications with local AI CLI tools")]
#[command(long_about = "
local-ai-tool-proxy accepts prompts over HTTP and answers them with an
installed AI command-line agent (claude, gemini, codex, continue, opencode),
always sending the configured system prompt along.

Example usage:
  local-ai-tool-proxy run --system-prompt system-prompt.txt
  local-ai-tool-proxy run --config config.yaml --provider gemini
  local-ai-tool-proxy list-providers --verbose
")]
struct Cli {
    /// Path to config file (default: config.yaml or config.yml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Set logging level (trace, debug, info, warn, error)
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the proxy server
    Run {
        /// Override listen port
        #[arg(short, long)]
        port: Option<u16>,
        /// Override the default provider
        #[arg(long)]
        provider: Option<String>,
        /// Override the CORS allowed origin
        #[arg(long)]
        allowed_origin: Option<String>,
        /// Override the system prompt file
        #[arg(long, value_name = "PATH")]
        system_prompt: Option<PathBuf>,
    },

    /// List the available AI providers
    ListProviders {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Validate configuration
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level_filter = if let Some(level) = cli.log_level {
        level.to_string()
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
            .to_string()
    };

    let subscriber = tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::new(&level_filter));
    match cli.log_format {
        LogFormat::Pretty => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    match cli.command {
        Commands::Run {
            port,
            provider,
            allowed_origin,
            system_prompt,
        } => {
            let mut config = load_config_or_exit(cli.config.as_deref());
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(provider) = provider {
                config.generation.default_provider = provider;
            }
            if let Some(origin) = allowed_origin {
                config.server.allowed_origin = origin;
            }
            if let Some(path) = system_prompt {
                config.generation.system_prompt_path = Some(path);
            }
            run_proxy(config).await?;
        }
        Commands::ListProviders { verbose } => {
            let config = load_config_or_exit(cli.config.as_deref());
            list_providers(&create_default_registry(&config), verbose);
        }
        Commands::CheckConfig => {
            check_config(cli.config.as_deref());
        }
    }

    Ok(())
}

/// Validate everything and start serving
async fn run_proxy(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = create_default_registry(&config);
    let system_prompt = match prepare(&config, &registry) {
        Ok(prompt) => prompt,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    log_banner(&config, &registry);

    let state = ProxyState::new(config, registry, system_prompt)?;
    run_server(state).await?;

    Ok(())
}

/// Check the configuration against the registry and read the system prompt
fn prepare(config: &AppConfig, registry: &ProviderRegistry) -> Result<String, ConfigError> {
    config.validate(registry)?;
    config.system_prompt()
}

fn log_banner(config: &AppConfig, registry: &ProviderRegistry) {
    let scheme = config.server.scheme();
    let prompt_path = config
        .generation
        .system_prompt_path
        .as_deref()
        .map(|p| p.display().to_string())
        .unwrap_or_default();

    tracing::info!("Local AI Tool Proxy v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        address = %format!("{}://{}:{}", scheme, config.server.host, config.server.port),
        default_provider = %config.generation.default_provider,
        system_prompt = %prompt_path,
        allowed_origin = %config.server.allowed_origin,
        "Starting proxy"
    );
    tracing::info!(providers = ?registry.names(), "Providers registered");
    if let Some(limit) = config.generation.max_concurrent {
        tracing::info!(max_concurrent = limit, "Generation concurrency limited");
    }
    match config.generation.timeout() {
        Some(timeout) => tracing::info!(timeout = ?timeout, "Generation timeout"),
        None => tracing::warn!("Generation timeout disabled"),
    }
    tracing::info!("API docs: {}://localhost:{}/openapi.json", scheme, config.server.port);
}

/// List all available providers
fn list_providers(registry: &ProviderRegistry, verbose: bool) {
    println!("Available providers:\n");

    for descriptor in registry.descriptors() {
        if verbose {
            println!("  {}:", descriptor.name);
            println!("    {}", descriptor.description);
            println!();
        } else {
            println!("  {:12} {}", descriptor.name, descriptor.description);
        }
    }

    if verbose {
        println!("To use a different executable for a provider, edit your config.yaml:");
        println!("\nproviders:");
        println!("  claude:");
        println!("    binary: /opt/claude/bin/claude");
    }
}

/// Validate configuration and print a summary
fn check_config(config_path: Option<&Path>) {
    let config = load_config_or_exit(config_path);
    let registry = create_default_registry(&config);

    if let Err(e) = prepare(&config, &registry) {
        eprintln!("✗ Configuration error: {}", e);
        std::process::exit(1);
    }

    println!("✓ Configuration is valid\n");
    println!("Server:");
    println!("  Listen: {}:{}", config.server.host, config.server.port);
    println!("  TLS: {}", if config.server.is_tls() { "enabled" } else { "disabled" });
    println!("  Allowed origin: {}", config.server.allowed_origin);
    println!("\nGeneration:");
    println!("  Default provider: {}", config.generation.default_provider);
    if let Some(ref path) = config.generation.system_prompt_path {
        println!("  System prompt: {}", path.display());
    }
    match config.generation.timeout() {
        Some(timeout) => println!("  Timeout: {}s", timeout.as_secs()),
        None => println!("  Timeout: disabled"),
    }
    match config.generation.max_concurrent {
        Some(limit) => println!("  Max concurrent: {}", limit),
        None => println!("  Max concurrent: unlimited"),
    }
    if !config.providers.is_empty() {
        println!("\nProvider overrides:");
        let mut names: Vec<&String> = config.providers.keys().collect();
        names.sort();
        for name in names {
            if let Some(ref binary) = config.providers[name].binary {
                println!("  {} : {}", name, binary);
            }
        }
    }
    println!("\nStats:");
    println!("  Enabled: {}", config.stats.enabled);
    println!("  Format: {:?}", config.stats.format);
}

/// Load configuration and environment overrides, or exit with error
fn load_config_or_exit(config_path: Option<&Path>) -> AppConfig {
    match AppConfig::load_or_default(config_path) {
        Ok(mut config) => {
            config.apply_env();
            config
        }
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            if matches!(e, ConfigError::NotFound(_)) {
                eprintln!("\nOmit --config to run with built-in defaults and environment variables.");
            }
            std::process::exit(1);
        }
    }
}
