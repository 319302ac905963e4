//! Broadcast fan-out queue
//!
//! A single FIFO of tagged messages dispatched to the observer sink from
//! a worker pool. Producers push in O(1); workers pop one message at a
//! time so slow sinks parallelize across workers instead of serializing
//! behind one. Delivery order for a symbol is therefore not guaranteed —
//! observers order by the timestamps inside the messages.

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{debug, info};
use types::depth::BookLevel;
use types::trade::Trade;

use crate::sink::ObserverSink;

/// A queued fan-out message.
#[derive(Debug, Clone)]
pub enum BroadcastMessage {
    Trade(Trade),
    BookUpdate {
        symbol: String,
        bids: Vec<BookLevel>,
        asks: Vec<BookLevel>,
    },
}

struct QueueState {
    messages: VecDeque<BroadcastMessage>,
    running: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    cv: Condvar,
    sink: Arc<dyn ObserverSink>,
}

/// Multi-producer fan-out queue with a dispatch worker pool.
pub struct BroadcastQueue {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl BroadcastQueue {
    /// Pool size defaults to hardware concurrency, falling back to 4.
    pub fn new(sink: Arc<dyn ObserverSink>) -> Self {
        let workers = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);
        Self::with_workers(sink, workers)
    }

    pub fn with_workers(sink: Arc<dyn ObserverSink>, workers: usize) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                messages: VecDeque::new(),
                running: true,
            }),
            cv: Condvar::new(),
            sink,
        });

        info!(workers, "starting broadcast workers");
        let handles = (0..workers.max(1))
            .map(|i| {
                let shared = Arc::clone(&shared);
                std::thread::Builder::new()
                    .name(format!("broadcast-{i}"))
                    .spawn(move || worker_loop(shared))
                    .expect("failed to spawn broadcast worker")
            })
            .collect();

        Self {
            shared,
            workers: Mutex::new(handles),
        }
    }

    pub fn push_trade(&self, trade: Trade) {
        self.push(BroadcastMessage::Trade(trade));
    }

    pub fn push_book_update(&self, symbol: &str, bids: Vec<BookLevel>, asks: Vec<BookLevel>) {
        self.push(BroadcastMessage::BookUpdate {
            symbol: symbol.to_string(),
            bids,
            asks,
        });
    }

    fn push(&self, message: BroadcastMessage) {
        {
            let mut state = self.shared.state.lock();
            if !state.running {
                return;
            }
            state.messages.push_back(message);
        }
        self.shared.cv.notify_one();
    }

    /// Current queue depth.
    pub fn len(&self) -> usize {
        self.shared.state.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop accepting messages, let workers drain what is queued, and
    /// join them. Idempotent.
    pub fn stop(&self) {
        {
            let mut state = self.shared.state.lock();
            state.running = false;
        }
        self.shared.cv.notify_all();
        let handles: Vec<JoinHandle<()>> = self.workers.lock().drain(..).collect();
        for handle in handles {
            if handle.join().is_err() {
                tracing::error!("broadcast worker panicked");
            }
        }
        debug!("broadcast workers joined");
    }
}

impl Drop for BroadcastQueue {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(shared: Arc<Shared>) {
    loop {
        // Pop exactly one message; hold the lock only for the pop
        let message = {
            let mut state = shared.state.lock();
            loop {
                if let Some(message) = state.messages.pop_front() {
                    break Some(message);
                }
                if !state.running {
                    break None;
                }
                shared.cv.wait(&mut state);
            }
        };

        let Some(message) = message else {
            return;
        };

        match message {
            BroadcastMessage::Trade(trade) => shared.sink.broadcast_trade(&trade),
            BroadcastMessage::BookUpdate {
                symbol,
                bids,
                asks,
            } => shared
                .sink
                .broadcast_orderbook_update(&symbol, &bids, &asks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use types::numeric::{Price, Quantity};
    use types::order::Side;

    #[derive(Default)]
    struct CountingSink {
        trades: AtomicUsize,
        books: AtomicUsize,
    }

    impl ObserverSink for CountingSink {
        fn broadcast_trade(&self, _trade: &Trade) {
            self.trades.fetch_add(1, Ordering::SeqCst);
        }

        fn broadcast_orderbook_update(
            &self,
            _symbol: &str,
            _bids: &[BookLevel],
            _asks: &[BookLevel],
        ) {
            self.books.fetch_add(1, Ordering::SeqCst);
        }

        fn client_count(&self) -> usize {
            0
        }
    }

    fn sample_trade(id: &str) -> Trade {
        Trade {
            trade_id: id.into(),
            symbol: "BTC-USDT".into(),
            price: Price::from_minor(1_000_000),
            quantity: Quantity::from_minor(500_000),
            aggressor_side: Side::Buy,
            maker_order_id: "ORD-1".into(),
            taker_order_id: "ORD-2".into(),
            maker_fee: 5,
            taker_fee: 10,
            timestamp_iso: String::new(),
        }
    }

    #[test]
    fn test_all_messages_dispatched_before_stop_returns() {
        let sink = Arc::new(CountingSink::default());
        let queue = BroadcastQueue::with_workers(sink.clone(), 4);

        for i in 0..100 {
            queue.push_trade(sample_trade(&format!("T-{i}")));
        }
        queue.push_book_update("BTC-USDT", Vec::new(), Vec::new());
        queue.stop();

        assert_eq!(sink.trades.load(Ordering::SeqCst), 100);
        assert_eq!(sink.books.load(Ordering::SeqCst), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_push_after_stop_is_dropped() {
        let sink = Arc::new(CountingSink::default());
        let queue = BroadcastQueue::with_workers(sink.clone(), 2);
        queue.stop();

        queue.push_trade(sample_trade("T-1"));
        assert_eq!(sink.trades.load(Ordering::SeqCst), 0);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_stop_idempotent() {
        let queue = BroadcastQueue::with_workers(Arc::new(CountingSink::default()), 2);
        queue.stop();
        queue.stop();
    }

    #[test]
    fn test_single_worker_preserves_fifo() {
        // With one worker, dispatch order equals push order
        #[derive(Default)]
        struct OrderSink {
            seen: parking_lot::Mutex<Vec<String>>,
        }
        impl ObserverSink for OrderSink {
            fn broadcast_trade(&self, trade: &Trade) {
                self.seen.lock().push(trade.trade_id.clone());
            }
            fn broadcast_orderbook_update(
                &self,
                _symbol: &str,
                _bids: &[BookLevel],
                _asks: &[BookLevel],
            ) {
            }
            fn client_count(&self) -> usize {
                0
            }
        }

        let sink = Arc::new(OrderSink::default());
        let queue = BroadcastQueue::with_workers(sink.clone(), 1);
        for i in 0..10 {
            queue.push_trade(sample_trade(&format!("T-{i}")));
        }
        queue.stop();

        let seen = sink.seen.lock();
        let expected: Vec<String> = (0..10).map(|i| format!("T-{i}")).collect();
        assert_eq!(*seen, expected);
    }
}
