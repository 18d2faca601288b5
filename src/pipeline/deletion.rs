//! Delete phase: flush the deletion index.

use log::{debug, warn};

use crate::{
    error::GatewayError,
    gateway::GatewayCore,
    message::{wire::DeleteReport, Location},
    runner::RunnerError,
};

const DELETE: &str = "delete";

/// Run the delete phase over a batch of owed locations.
///
/// At most `delete_batch_size - 1` locations go into one helper invocation;
/// iteration order over the index is unspecified. Locations the helper
/// acknowledges with `"ok"` leave the index, everything else stays for a
/// later attempt. A subprocess failure leaves the whole index untouched.
pub(crate) async fn run(core: &GatewayCore) -> Result<(), GatewayError> {
    let locations: Vec<Location> = {
        let state = core.state();
        if state.deletions.is_empty() {
            return Ok(());
        }
        let cap = core.config.delete_batch_size.saturating_sub(1).max(1);
        state.deletions.keys().copied().take(cap).collect()
    };

    let mut args = Vec::with_capacity(locations.len() + 1);
    args.push(DELETE.to_owned());
    args.extend(locations.iter().map(ToString::to_string));
    if core.config.debug {
        debug!("deleting {} modem locations", locations.len());
    }

    let root = core.runner.run(&args).await?;
    let report: DeleteReport = serde_json::from_value(root).map_err(RunnerError::Parse)?;

    let mut state = core.state();
    for (slot, verdict) in &report.detail {
        let Ok(location) = slot.parse::<u32>().map(Location::new) else {
            warn!("delete verdict for unparseable location {slot:?}");
            continue;
        };
        if verdict == "ok" {
            state.deletions.remove(&location);
        } else if let Some(owner) = state.deletions.get(&location) {
            debug!(
                "modem kept location {location} (from {}, group {:?}): {verdict}",
                owner.from, owner.id
            );
        }
    }
    Ok(())
}
