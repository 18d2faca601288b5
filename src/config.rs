//! Gateway configuration.

use std::{path::PathBuf, time::Duration};

/// Options accepted when creating a [`Gateway`](crate::gateway::Gateway).
///
/// # Batch caps
///
/// The transmit and delete phases pack at most `size - 1` items into one
/// helper invocation, so a batch size of `N` bounds the helper's argument
/// vector rather than the item count. Anything left over waits for the next
/// poll cycle.
#[derive(Clone, Debug)]
pub struct GatewayConfig {
    /// Pause between the end of one poll cycle and the start of the next.
    pub interval: Duration,
    /// Bound on outbound messages per `send` invocation (see Batch caps).
    pub transmit_batch_size: usize,
    /// Bound on locations per `delete` invocation (see Batch caps).
    pub delete_batch_size: usize,
    /// Transmit attempts before an outbound item is abandoned; `0` retries
    /// forever.
    pub max_transmit_attempts: u32,
    /// Emit verbose per-record traces through the `log` facade.
    pub debug: bool,
    /// Helper binary to spawn.
    pub command: PathBuf,
    /// When set, `<prefix>/bin` is prepended to the `PATH` used to resolve
    /// the helper.
    pub prefix: Option<PathBuf>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            transmit_batch_size: 64,
            delete_batch_size: 1024,
            max_transmit_attempts: 2,
            debug: false,
            command: PathBuf::from("gammu-json"),
            prefix: None,
        }
    }
}

impl GatewayConfig {
    /// Clamp values to bounds the pipeline can operate with.
    ///
    /// A batch size below 2 would pack zero items per invocation and stall
    /// its queue forever; a zero interval would spin on the helper.
    ///
    /// # Examples
    ///
    /// ```
    /// use smsgate::config::GatewayConfig;
    ///
    /// let cfg = GatewayConfig {
    ///     transmit_batch_size: 0,
    ///     ..GatewayConfig::default()
    /// };
    /// assert_eq!(cfg.normalised().transmit_batch_size, 2);
    /// ```
    #[must_use]
    pub fn normalised(mut self) -> Self {
        self.transmit_batch_size = self.transmit_batch_size.max(2);
        self.delete_batch_size = self.delete_batch_size.max(2);
        self.interval = self.interval.max(Duration::from_millis(1));
        self
    }
}
