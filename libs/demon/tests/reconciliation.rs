//! Trade reconciliation against a scripted exchange

mod common;

use common::{bot_trade, foreign_trade, Harness, MemoryStore};
use demon::application::{Ledger, ReconcileError, Reconciler};
use demon::domain::{DemonEvent, PairState};

fn ledger() -> Ledger {
    Ledger::new(vec![PairState::new("BTCUSDT", 10.0, 1000.0, 0.9, 1.1).with_cursor(4)])
}

#[tokio::test]
async fn test_cursor_is_monotonic_across_overlapping_fetches() {
    let h = Harness::new(MemoryStore::new());
    for id in [5, 6, 7] {
        h.exchange.push_trade("BTCUSDT", bot_trade(id, true, 1.0, 100.0));
    }
    let reconciler = Reconciler::new(h.exchange.as_ref(), h.store.as_ref(), h.sink.as_ref());
    let mut ledger = ledger();

    let first = reconciler.reconcile(&mut ledger, "BTCUSDT").await.unwrap();
    let second = reconciler.reconcile(&mut ledger, "BTCUSDT").await.unwrap();

    assert_eq!(first.iter().map(|t| t.id).collect::<Vec<_>>(), vec![5, 6, 7]);
    assert!(second.is_empty());

    let pair = ledger.get("BTCUSDT").unwrap();
    assert_eq!(pair.last_applied_trade_id, 7);
    assert_eq!(pair.base_qty, 13.0);
    assert_eq!(pair.quote_qty, 700.0);

    // Second fetch asked only for what came after the cursor
    let fetches = h.exchange.trade_fetches.lock().clone();
    assert_eq!(fetches, vec![("BTCUSDT".to_string(), 4), ("BTCUSDT".to_string(), 7)]);

    assert_eq!(h.store.saves(), 1);
    assert_eq!(h.store.saved().unwrap()[0].last_applied_trade_id, 7);
    assert_eq!(h.sink.count(|e| matches!(e, DemonEvent::TradeApplied { .. })), 3);
}

#[tokio::test]
async fn test_fetch_failure_leaves_ledger_untouched() {
    let h = Harness::new(MemoryStore::new());
    h.exchange.push_trade("BTCUSDT", bot_trade(5, true, 1.0, 100.0));
    h.exchange.set_fail_trades(true);
    let reconciler = Reconciler::new(h.exchange.as_ref(), h.store.as_ref(), h.sink.as_ref());
    let mut ledger = ledger();

    let err = reconciler.reconcile(&mut ledger, "BTCUSDT").await.unwrap_err();

    assert!(matches!(err, ReconcileError::Fetch(_)));
    assert_eq!(ledger.get("BTCUSDT").unwrap(), &ledger_pair());
    assert_eq!(h.store.saves(), 0);
}

#[tokio::test]
async fn test_save_failure_rolls_back_then_retries() {
    let h = Harness::new(MemoryStore::new());
    h.exchange.push_trade("BTCUSDT", bot_trade(5, false, 2.0, 100.0));
    *h.store.fail_saves.lock() = true;
    let reconciler = Reconciler::new(h.exchange.as_ref(), h.store.as_ref(), h.sink.as_ref());
    let mut ledger = ledger();

    let err = reconciler.reconcile(&mut ledger, "BTCUSDT").await.unwrap_err();
    assert!(matches!(err, ReconcileError::Persist(_)));
    assert_eq!(ledger.get("BTCUSDT").unwrap(), &ledger_pair());
    assert_eq!(h.sink.count(|e| matches!(e, DemonEvent::TradeApplied { .. })), 0);

    // Disk recovers: the same fill is fetched again and applied once
    *h.store.fail_saves.lock() = false;
    let applied = reconciler.reconcile(&mut ledger, "BTCUSDT").await.unwrap();

    assert_eq!(applied.len(), 1);
    let pair = ledger.get("BTCUSDT").unwrap();
    assert_eq!(pair.base_qty, 8.0);
    assert_eq!(pair.quote_qty, 1200.0);
    assert_eq!(pair.last_applied_trade_id, 5);
}

#[tokio::test]
async fn test_foreign_fills_are_consumed_not_applied() {
    let h = Harness::new(MemoryStore::new());
    h.exchange.push_trade("BTCUSDT", foreign_trade(5, true, 3.0, 100.0));
    h.exchange.push_trade("BTCUSDT", bot_trade(6, true, 1.0, 100.0));
    let reconciler = Reconciler::new(h.exchange.as_ref(), h.store.as_ref(), h.sink.as_ref());
    let mut ledger = ledger();

    let applied = reconciler.reconcile(&mut ledger, "BTCUSDT").await.unwrap();

    assert_eq!(applied.iter().map(|t| t.id).collect::<Vec<_>>(), vec![6]);
    let pair = ledger.get("BTCUSDT").unwrap();
    assert_eq!(pair.base_qty, 11.0);
    assert_eq!(pair.last_applied_trade_id, 6);
}

#[tokio::test]
async fn test_only_foreign_fills_still_persist_cursor() {
    let h = Harness::new(MemoryStore::new());
    h.exchange.push_trade("BTCUSDT", foreign_trade(9, false, 1.0, 100.0));
    let reconciler = Reconciler::new(h.exchange.as_ref(), h.store.as_ref(), h.sink.as_ref());
    let mut ledger = ledger();

    let applied = reconciler.reconcile(&mut ledger, "BTCUSDT").await.unwrap();

    assert!(applied.is_empty());
    assert_eq!(h.store.saves(), 1);
    assert_eq!(h.store.saved().unwrap()[0].last_applied_trade_id, 9);
    assert_eq!(h.store.saved().unwrap()[0].base_qty, 10.0);
}

#[tokio::test]
async fn test_no_new_trades_skips_save() {
    let h = Harness::new(MemoryStore::new());
    let reconciler = Reconciler::new(h.exchange.as_ref(), h.store.as_ref(), h.sink.as_ref());
    let mut ledger = ledger();

    assert!(reconciler.reconcile(&mut ledger, "BTCUSDT").await.unwrap().is_empty());
    assert_eq!(h.store.saves(), 0);
}

fn ledger_pair() -> PairState {
    PairState::new("BTCUSDT", 10.0, 1000.0, 0.9, 1.1).with_cursor(4)
}
