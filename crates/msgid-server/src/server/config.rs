use core::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, ValueEnum};
use msgid::{
    AtomicSnowflakeGenerator, CUSTOM_EPOCH, ClockRegressionPolicy, GeneratorConfig, IdService,
    MessageId, MonotonicClock, SnowflakeId, SystemClock, TimeSource,
};

/// Default epoch in Unix milliseconds (2025-01-01T00:00:00Z).
pub const DEFAULT_EPOCH_MS: u64 = CUSTOM_EPOCH.as_millis() as u64;

/// Runtime configuration for the `msgid-server` binary.
///
/// Every value can be given as a flag or through the environment (a `.env`
/// file is loaded first).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "msgid-server",
    version,
    about = "An HTTP service for Snowflake-style message IDs"
)]
pub struct CliArgs {
    /// Node identifier embedded in every ID.
    ///
    /// Must be unique among all running instances and fit the layout's node
    /// field (`0..=1023`). Anything else aborts startup.
    ///
    /// Environment variable: `NODE_ID`
    #[arg(long, env = "NODE_ID", default_value_t = 1, allow_negative_numbers = true)]
    pub node_id: i64,

    /// Epoch as milliseconds since 1970-01-01 UTC.
    ///
    /// Environment variable: `EPOCH_MS`
    #[arg(long, env = "EPOCH_MS", default_value_t = DEFAULT_EPOCH_MS)]
    pub epoch_ms: u64,

    /// Time source used for timestamps.
    ///
    /// Environment variable: `CLOCK`
    #[arg(long, env = "CLOCK", value_enum, default_value_t = ClockKind::Monotonic)]
    pub clock: ClockKind,

    /// What to do when the clock reads earlier than the last issued ID.
    ///
    /// Environment variable: `REGRESSION_POLICY`
    #[arg(long, env = "REGRESSION_POLICY", value_enum, default_value_t = RegressionPolicy::FailFast)]
    pub regression_policy: RegressionPolicy,

    /// Upper bound on waiting out a clock regression under `wait`.
    ///
    /// Environment variable: `MAX_REGRESSION_WAIT_MS`
    #[arg(long, env = "MAX_REGRESSION_WAIT_MS", default_value_t = 10)]
    pub max_regression_wait_ms: u64,

    /// How long to wait for the next millisecond once the sequence is used
    /// up before failing the request.
    ///
    /// Environment variable: `EXHAUSTION_TIMEOUT_MS`
    #[arg(long, env = "EXHAUSTION_TIMEOUT_MS", default_value_t = 100)]
    pub exhaustion_timeout_ms: u64,

    /// Address to listen on.
    ///
    /// Environment variable: `SERVER_ADDR`
    #[arg(long, env = "SERVER_ADDR", default_value_t = String::from("0.0.0.0:8080"))]
    pub server_addr: String,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ClockKind {
    /// Anchored to the wall clock once, then advanced by a monotonic timer.
    Monotonic,
    /// Reads the wall clock on every call; follows NTP adjustments.
    System,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum RegressionPolicy {
    FailFast,
    Wait,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub node_id: u64,
    pub epoch: Duration,
    pub clock: ClockKind,
    pub generator: GeneratorConfig,
    pub server_addr: String,
}

impl TryFrom<CliArgs> for ServerConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let max_node_id = MessageId::max_node_id();
        let node_id = match u64::try_from(args.node_id) {
            Ok(node_id) if node_id <= max_node_id => node_id,
            _ => bail!(
                "NODE_ID ({}) must be in [0, {}]",
                args.node_id,
                max_node_id
            ),
        };

        if args.exhaustion_timeout_ms == 0 {
            bail!("EXHAUSTION_TIMEOUT_MS must be greater than 0");
        }

        let regression_policy = match args.regression_policy {
            RegressionPolicy::FailFast => ClockRegressionPolicy::FailFast,
            RegressionPolicy::Wait => ClockRegressionPolicy::Wait {
                max: Duration::from_millis(args.max_regression_wait_ms),
            },
        };

        let generator = GeneratorConfig::default()
            .with_regression_policy(regression_policy)
            .with_exhaustion_timeout(Duration::from_millis(args.exhaustion_timeout_ms));

        Ok(Self {
            node_id,
            epoch: Duration::from_millis(args.epoch_ms),
            clock: args.clock,
            generator,
            server_addr: args.server_addr,
        })
    }
}

/// Clock implementation used by the generator, chosen at startup.
#[derive(Clone, Debug)]
pub enum Clock {
    Monotonic(MonotonicClock),
    System(SystemClock),
}

impl TimeSource for Clock {
    fn current_millis(&self) -> u64 {
        match self {
            Self::Monotonic(clock) => clock.current_millis(),
            Self::System(clock) => clock.current_millis(),
        }
    }
}

/// The generator shared by all request handlers.
pub type Generator = AtomicSnowflakeGenerator<MessageId, Clock>;

pub type Service = IdService<Generator, MessageId, Clock>;

impl ServerConfig {
    pub fn build_clock(&self) -> anyhow::Result<Clock> {
        let clock = match self.clock {
            ClockKind::Monotonic => MonotonicClock::with_epoch(self.epoch).map(Clock::Monotonic),
            ClockKind::System => SystemClock::with_epoch(self.epoch).map(Clock::System),
        };
        clock.with_context(|| format!("EPOCH_MS ({}) is unusable", self.epoch.as_millis()))
    }

    pub fn build_service(&self) -> anyhow::Result<Service> {
        let generator = Generator::with_config(self.node_id, self.build_clock()?, self.generator)
            .context("failed to create the ID generator")?;
        Ok(IdService::new(generator))
    }
}
