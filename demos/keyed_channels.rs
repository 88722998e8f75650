//! # Example: keyed_channels
//!
//! A keyed registry matching replies to waiting requests: each request id is
//! a key, and a one-shot callback under that key resolves a oneshot channel
//! when the reply arrives. Requests that never get a reply are evicted on
//! timeout and their waiters learn about it through the cancel hook.
//!
//! Demonstrates how to:
//! - Partition callbacks per logical key (`KeyedRelay`).
//! - Bridge a one-shot callback to a `tokio::sync::oneshot` waiter.
//! - Rely on timeout eviction for replies that never come.
//!
//! ## Run
//! ```bash
//! cargo run --example keyed_channels
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::oneshot;

use relay::{CallbackFn, CallbackSpec, Delivery, KeyedRelay, RelayConfig};

/// Registers a one-shot waiter for `request` and returns the receiving end.
async fn expect_reply(
    relay: &KeyedRelay<u64, String>,
    request: u64,
    timeout: Duration,
) -> oneshot::Receiver<Option<String>> {
    let (tx, rx) = oneshot::channel();
    let slot = Arc::new(Mutex::new(Some(tx)));
    let react_slot = slot.clone();

    let waiter = CallbackFn::new("reply-waiter", move |d: &mut Delivery<String>| {
        if let Some(tx) = react_slot.lock().ok().and_then(|mut guard| guard.take()) {
            let _ = tx.send(Some(d.payload().clone()));
        }
        d.mark_removal();
        Ok(())
    })
    // The cancel hook fires on eviction: resolve the waiter with "no reply".
    .on_cancel(move || {
        if let Some(tx) = slot.lock().ok().and_then(|mut guard| guard.take()) {
            let _ = tx.send(None);
        }
        Ok(())
    })
    .into_arc();

    relay
        .add(request, CallbackSpec::new(waiter).with_timeout(Some(timeout)))
        .await;
    rx
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let relay: KeyedRelay<u64, String> = KeyedRelay::new(RelayConfig::default());

    // Request 1 gets a reply in time; request 2 never does.
    let answered = expect_reply(&relay, 1, Duration::from_millis(500)).await;
    let orphaned = expect_reply(&relay, 2, Duration::from_millis(200)).await;

    relay.invoke(&1, "pong".to_string()).await;

    match answered.await {
        Ok(Some(reply)) => println!("request 1 answered: {reply}"),
        _ => println!("request 1 went unanswered"),
    }

    // The eviction timer resolves request 2 with "no reply".
    match orphaned.await {
        Ok(Some(reply)) => println!("request 2 answered (unexpected): {reply}"),
        _ => println!("request 2 evicted after 200ms with no reply"),
    }

    println!("{} callbacks still registered", relay.len());
}
