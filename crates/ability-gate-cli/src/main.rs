// crates/ability-gate-cli/src/main.rs
// ============================================================================
// Module: Ability Gate CLI Entry Point
// Description: Command dispatcher for offline ability decisions.
// Purpose: Evaluate, explain, and list abilities against a JSON world fixture.
// Dependencies: clap, ability-gate-core, ability-gate-config, serde, thiserror.
// ============================================================================

//! ## Overview
//! The `ability-gate` binary answers permission questions offline. A world
//! fixture (JSON) supplies the actor, the resource snapshot, request facts,
//! and the membership directory; the optional TOML config supplies licenses,
//! feature flags, instance settings, engine limits, and the audit sink.
//!
//! `check` exits 0 when the ability is allowed and 1 when it is denied, so
//! shell scripts can branch on the decision. Errors exit 2.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use ability_gate_cli::t;
use ability_gate_config::AbilityGateConfig;
use ability_gate_core::Ability;
use ability_gate_core::AbilityRegistry;
use ability_gate_core::Actor;
use ability_gate_core::Collaborators;
use ability_gate_core::PolicyDecision;
use ability_gate_core::PolicySession;
use ability_gate_core::RequestContext;
use ability_gate_core::Resource;
use ability_gate_core::ResourceKind;
use ability_gate_core::ResourceSnapshot;
use ability_gate_core::interfaces::memory::InMemoryDirectory;
use ability_gate_core::runtime::AbilityDefinition;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a world fixture.
const MAX_WORLD_BYTES: usize = 4 * 1024 * 1024;
/// Exit code for a denied `check`.
const DENIED_EXIT_CODE: u8 = 1;
/// Exit code for any failure.
const ERROR_EXIT_CODE: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "ability-gate", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Decide one ability; exit 0 when allowed and 1 when denied.
    Check(DecisionCommand),
    /// Print the decision trace for one ability as JSON.
    Explain(DecisionCommand),
    /// Print every ability the actor holds on the resource as JSON.
    Abilities(WorldArgs),
    /// Print ability metadata from the compiled policy tables as JSON.
    Registry(RegistryCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Inputs shared by every decision command.
#[derive(Args, Debug)]
struct WorldArgs {
    /// World fixture (JSON) describing actor, resource, request, and directory.
    #[arg(long, value_name = "PATH")]
    world: PathBuf,
    /// Optional config file; built-in defaults apply when omitted.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Arguments for `check` and `explain`.
#[derive(Args, Debug)]
struct DecisionCommand {
    /// World and config inputs.
    #[command(flatten)]
    world: WorldArgs,
    /// Ability name, for example `push_code`.
    #[arg(long, value_name = "NAME")]
    ability: String,
}

/// Arguments for `registry`.
#[derive(Args, Debug)]
struct RegistryCommand {
    /// Only list abilities declared for this resource kind.
    #[arg(long, value_enum)]
    kind: Option<KindArg>,
    /// Only show this ability.
    #[arg(long, value_name = "NAME")]
    ability: Option<String>,
}

/// Resource kinds accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum KindArg {
    /// The instance.
    Global,
    /// Projects.
    Project,
    /// Groups.
    Group,
    /// Issues.
    Issue,
    /// Work items.
    WorkItem,
    /// Vulnerabilities.
    Vulnerability,
}

impl From<KindArg> for ResourceKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Global => Self::Global,
            KindArg::Project => Self::Project,
            KindArg::Group => Self::Group,
            KindArg::Issue => Self::Issue,
            KindArg::WorkItem => Self::WorkItem,
            KindArg::Vulnerability => Self::Vulnerability,
        }
    }
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a config file.
    Validate(ConfigValidateCommand),
}

/// Arguments for config validation.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to ability-gate.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: World Fixture
// ============================================================================

/// Everything a decision needs besides config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorldFixture {
    /// Memberships, bans, custom roles, and job token allowlists.
    #[serde(default)]
    directory: InMemoryDirectory,
    /// Actor asking.
    actor: Actor,
    /// Resource being acted on.
    resource: ResourceSnapshot,
    /// Request facts (SSO session, client IP).
    #[serde(default)]
    request: RequestContext,
}

/// Collected abilities for JSON output.
#[derive(Debug, Serialize)]
struct AbilityListing {
    /// Resource kind evaluated.
    kind: ResourceKind,
    /// Held abilities in declaration order.
    abilities: BTreeSet<Ability>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for formatted messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a formatted message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Errors raised while reading a bounded input file.
#[derive(Debug, Error)]
enum ReadLimitError {
    /// The file could not be opened or read.
    #[error("{0}")]
    Io(std::io::Error),
    /// The file exceeds the configured limit.
    #[error("size {size} exceeds limit {limit}")]
    TooLarge {
        /// Observed size in bytes.
        size: u64,
        /// Limit in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Check(command) => command_check(&command),
        Commands::Explain(command) => command_explain(&command),
        Commands::Abilities(command) => command_abilities(&command),
        Commands::Registry(command) => command_registry(&command),
        Commands::Config {
            command,
        } => command_config(command),
    }
}

// ============================================================================
// SECTION: Decision Commands
// ============================================================================

/// Executes `check`.
fn command_check(command: &DecisionCommand) -> CliResult<ExitCode> {
    let ability = resolve_ability(&command.ability)?;
    let (config, world) = load_inputs(&command.world)?;
    let allowed = with_session(&config, &world, |session, resource| {
        session
            .allowed(ability, resource)
            .map_err(|err| CliError::new(t!("decision.failed", error = err)))
    })?;
    let target = world.resource.as_resource().reference();
    let line = if allowed {
        t!("check.allowed", ability = ability, resource = target)
    } else {
        t!("check.denied", ability = ability, resource = target)
    };
    write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(if allowed { ExitCode::SUCCESS } else { ExitCode::from(DENIED_EXIT_CODE) })
}

/// Executes `explain`.
fn command_explain(command: &DecisionCommand) -> CliResult<ExitCode> {
    let ability = resolve_ability(&command.ability)?;
    let (config, world) = load_inputs(&command.world)?;
    let decision = explain_decision(&config, &world, ability)?;
    write_json(&decision)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `abilities`.
fn command_abilities(command: &WorldArgs) -> CliResult<ExitCode> {
    let (config, world) = load_inputs(command)?;
    let listing = collect_listing(&config, &world)?;
    write_json(&listing)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `registry`.
fn command_registry(command: &RegistryCommand) -> CliResult<ExitCode> {
    let definitions =
        registry_listing(command.kind.map(ResourceKind::from), command.ability.as_deref())?;
    write_json(&definitions)?;
    Ok(ExitCode::SUCCESS)
}

/// Explains one decision in `world`.
fn explain_decision(
    config: &AbilityGateConfig,
    world: &WorldFixture,
    ability: Ability,
) -> CliResult<PolicyDecision> {
    with_session(config, world, |session, resource| {
        session
            .explain(ability, resource)
            .map_err(|err| CliError::new(t!("decision.failed", error = err)))
    })
}

/// Collects every ability the actor holds in `world`.
fn collect_listing(config: &AbilityGateConfig, world: &WorldFixture) -> CliResult<AbilityListing> {
    let abilities = with_session(config, world, |session, resource| {
        session
            .collect_abilities(resource)
            .map_err(|err| CliError::new(t!("decision.failed", error = err)))
    })?;
    Ok(AbilityListing {
        kind: world.resource.as_resource().kind(),
        abilities,
    })
}

/// Lists registry metadata, optionally filtered by kind or name.
fn registry_listing(
    kind: Option<ResourceKind>,
    ability: Option<&str>,
) -> CliResult<Vec<AbilityDefinition>> {
    let registry = build_registry()?;
    if let Some(name) = ability {
        let definition = registry
            .lookup(name)
            .ok_or_else(|| CliError::new(t!("registry.not_found", name = name)))?;
        return Ok(vec![definition]);
    }
    Ok(registry
        .definitions()
        .into_iter()
        .filter(|definition| kind.is_none_or(|kind| definition.applies_to(kind)))
        .collect())
}

/// Parses an ability name.
fn resolve_ability(name: &str) -> CliResult<Ability> {
    Ability::from_name(name.trim()).ok_or_else(|| CliError::new(t!("ability.unknown", name = name)))
}

// ============================================================================
// SECTION: Session Wiring
// ============================================================================

/// Loads the config (or defaults) and the world fixture.
fn load_inputs(args: &WorldArgs) -> CliResult<(AbilityGateConfig, WorldFixture)> {
    let config = match args.config.as_deref() {
        Some(path) => AbilityGateConfig::load(Some(path))
            .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?,
        None => AbilityGateConfig::default(),
    };
    let world = load_world(&args.world)?;
    Ok((config, world))
}

/// Reads and parses a world fixture.
fn load_world(path: &Path) -> CliResult<WorldFixture> {
    let bytes = read_bytes_with_limit(path, MAX_WORLD_BYTES).map_err(|err| match err {
        ReadLimitError::Io(error) => {
            CliError::new(t!("world.read_failed", path = path.display(), error = error))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!("world.too_large", path = path.display(), limit = limit, size = size)),
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|err| CliError::new(t!("world.parse_failed", path = path.display(), error = err)))
}

/// Compiles the built-in policy tables.
fn build_registry() -> CliResult<AbilityRegistry> {
    AbilityRegistry::standard()
        .map_err(|err| CliError::new(t!("registry.build_failed", error = err)))
}

/// Opens a session over `world` configured by `config` and hands it to `f`.
fn with_session<T>(
    config: &AbilityGateConfig,
    world: &WorldFixture,
    f: impl FnOnce(&PolicySession<'_>, Resource<'_>) -> CliResult<T>,
) -> CliResult<T> {
    let registry = build_registry()?;
    let licenses = config
        .license_snapshot()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let flags = config
        .flag_overrides()
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let audit = config
        .audit
        .build_sink()
        .map_err(|err| CliError::new(t!("audit.open_failed", error = err)))?;
    let session = PolicySession::new(
        &registry,
        Collaborators::with_directory(&world.directory, &licenses, &flags),
        world.actor.clone(),
    )
    .with_settings(config.instance_settings())
    .with_request(world.request.clone())
    .with_options(config.engine_options())
    .with_audit(audit.as_ref());
    f(&session, world.resource.as_resource())
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(&command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let _config = AbilityGateConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: I/O Helpers
// ============================================================================

/// Reads a file, refusing anything larger than `max_bytes`.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut limited = file.take(limit.saturating_add(1));
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Writes pretty JSON followed by a newline to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
    bytes.push(b'\n');
    let mut stdout = std::io::stdout();
    stdout.write_all(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output failure for `stream`.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    t!("output.write_failed", stream = stream, error = error)
}

/// Emits an error message to stderr and returns the failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::from(ERROR_EXIT_CODE)
}
