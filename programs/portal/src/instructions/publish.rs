use anchor_lang::prelude::*;
use span_svm_std::Bytes32;

use crate::events::IntentPublished;
use crate::types::{intent_hash, Intent};

#[derive(AnchorSerialize, AnchorDeserialize)]
pub struct PublishArgs {
    pub intent: Intent,
    pub route_hash: Bytes32,
}

#[derive(Accounts)]
#[instruction(args: PublishArgs)]
pub struct Publish {}

/// Announces an intent without requiring funds. Stateless, so publishing the
/// same intent twice is a harmless repeat of the same event, never an error.
///
/// `route_hash` is supplied by the caller rather than recomputed here: the
/// route is encoded for the destination chain and only the destination
/// portal can verify it against the route data during fulfill. The intent
/// hash derived from it is still binding for funding and settlement.
pub fn publish_intent(_: Context<Publish>, args: PublishArgs) -> Result<()> {
    let PublishArgs { intent, route_hash } = args;
    let Intent {
        destination,
        route: _,
        reward,
    } = intent;

    let intent_hash = intent_hash(destination, &route_hash, &reward.hash());
    emit!(IntentPublished::new(
        intent_hash,
        destination,
        route_hash,
        reward
    ));

    Ok(())
}
