//! # Example: priority_pipeline
//!
//! A flat registry acting as a staged pipeline: validators run first, then
//! consumers, then an audit tail. A validator that rejects the payload
//! short-circuits the round so the later stages never see it.
//!
//! Demonstrates how to:
//! - Register callbacks at different priorities (lower = earlier).
//! - Use `mark_short_circuit` to veto lower-priority stages.
//! - Use `mark_removal` for a one-shot callback.
//!
//! ## Run
//! ```bash
//! cargo run --example priority_pipeline
//! ```

use relay::{CallbackFn, CallbackSpec, Delivery, Relay, RelayConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let relay: Relay<i64> = Relay::new(RelayConfig::default());

    // Stage 1 (priority -10): validation. Negative payloads are vetoed.
    let validator = CallbackFn::arc("validator", |d: &mut Delivery<i64>| {
        if *d.payload() < 0 {
            println!("[validator] rejecting {}", d.payload());
            d.mark_short_circuit();
        } else {
            println!("[validator] accepting {}", d.payload());
        }
        Ok(())
    });
    relay
        .add(CallbackSpec::new(validator).with_priority(-10))
        .await;

    // Stage 2 (priority 0): consumers.
    let consumer = CallbackFn::arc("consumer", |d: &mut Delivery<i64>| {
        println!("[consumer] processing {}", d.payload());
        Ok(())
    });
    relay.add(CallbackSpec::new(consumer)).await;

    // One-shot consumer: reacts to the first accepted payload only.
    let first_only = CallbackFn::arc("first-only", |d: &mut Delivery<i64>| {
        println!("[first-only] saw {} and leaves", d.payload());
        d.mark_removal();
        Ok(())
    });
    relay.add(CallbackSpec::new(first_only)).await;

    // Stage 3 (priority 10): audit tail.
    let audit = CallbackFn::arc("audit", |d: &mut Delivery<i64>| {
        println!("[audit] recorded {}", d.payload());
        Ok(())
    });
    relay.add(CallbackSpec::new(audit).with_priority(10)).await;

    for payload in [7, -3, 21] {
        println!("--- invoke({payload}) ---");
        relay.invoke(payload).await;
    }

    println!("{} callbacks still registered", relay.len());
    relay.cancel_all().await;
}
