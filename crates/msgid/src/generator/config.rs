use core::time::Duration;

/// What a generator does when the clock reads earlier than the last issued
/// timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockRegressionPolicy {
    /// Fail the call with [`Error::ClockRegression`].
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    #[default]
    FailFast,
    /// Sleep until the clock catches up, for at most `max`.
    ///
    /// A regression larger than the remaining budget fails immediately with
    /// [`Error::ClockRegression`], as does one still unresolved after `max`.
    ///
    /// [`Error::ClockRegression`]: crate::Error::ClockRegression
    Wait {
        /// Upper bound on the total time spent waiting in one call.
        max: Duration,
    },
}

/// Bounds on how long a blocking generation call may wait.
///
/// Part of the deployment contract: the chosen values change both latency and
/// which failures callers observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Behavior when the clock moves backward.
    pub regression_policy: ClockRegressionPolicy,
    /// How long to spin for the next millisecond once the sequence is
    /// exhausted before returning [`Error::SequenceExhausted`].
    ///
    /// [`Error::SequenceExhausted`]: crate::Error::SequenceExhausted
    pub exhaustion_timeout: Duration,
}

impl GeneratorConfig {
    /// Default bound on the sequence exhaustion spin.
    pub const DEFAULT_EXHAUSTION_TIMEOUT: Duration = Duration::from_millis(100);

    /// Returns a config with the given regression policy.
    #[must_use]
    pub const fn with_regression_policy(mut self, policy: ClockRegressionPolicy) -> Self {
        self.regression_policy = policy;
        self
    }

    /// Returns a config with the given exhaustion timeout.
    #[must_use]
    pub const fn with_exhaustion_timeout(mut self, timeout: Duration) -> Self {
        self.exhaustion_timeout = timeout;
        self
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            regression_policy: ClockRegressionPolicy::FailFast,
            exhaustion_timeout: Self::DEFAULT_EXHAUSTION_TIMEOUT,
        }
    }
}
