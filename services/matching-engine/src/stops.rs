//! Per-symbol stop-order manager
//!
//! Holds conditional orders keyed by trigger price and materializes the
//! ones a last-traded price satisfies. Buy stops fire when the price
//! rises to the trigger, sell stops when it falls to it. Trailing stops
//! re-key as the tracked extreme moves.

use std::collections::{BTreeMap, HashMap, VecDeque};
use types::numeric::Price;
use types::order::{Order, Side};
use types::stop::{StopOrder, StopType};

pub struct StopOrderManager {
    symbol: String,
    /// Buy stops by trigger price, ascending; lowest trigger fires first.
    buy_stops: BTreeMap<Price, VecDeque<StopOrder>>,
    /// Sell stops by trigger price; highest trigger fires first.
    sell_stops: BTreeMap<Price, VecDeque<StopOrder>>,
    /// order_id → trigger price, for cancellation.
    order_index: HashMap<String, Price>,
}

impl StopOrderManager {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            buy_stops: BTreeMap::new(),
            sell_stops: BTreeMap::new(),
            order_index: HashMap::new(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Store a stop order. Trailing stops start tracking from their
    /// trigger price.
    pub fn add_stop_order(&mut self, mut stop: StopOrder) {
        if stop.stop_type == StopType::TrailingStop {
            stop.best_price = stop.trigger_price;
        }
        self.insert(stop);
    }

    /// Replay-only insert: the stored record is taken as-is.
    pub fn insert_from_replay(&mut self, stop: StopOrder) {
        self.insert(stop);
    }

    fn insert(&mut self, stop: StopOrder) {
        self.order_index
            .insert(stop.order_id.clone(), stop.trigger_price);
        let side = match stop.side {
            Side::Buy => &mut self.buy_stops,
            Side::Sell => &mut self.sell_stops,
        };
        side.entry(stop.trigger_price).or_default().push_back(stop);
    }

    /// Cancel a stop order by id.
    pub fn cancel_stop_order(&mut self, order_id: &str) -> bool {
        let Some(trigger_price) = self.order_index.get(order_id).copied() else {
            return false;
        };
        for stops in [&mut self.buy_stops, &mut self.sell_stops] {
            if let Some(queue) = stops.get_mut(&trigger_price) {
                if let Some(pos) = queue.iter().position(|s| s.order_id == order_id) {
                    queue.remove(pos);
                    if queue.is_empty() {
                        stops.remove(&trigger_price);
                    }
                    self.order_index.remove(order_id);
                    return true;
                }
            }
        }
        false
    }

    /// Materialize every stop whose trigger `last_trade_price` satisfies,
    /// removing it from the manager. Buy stops come out lowest trigger
    /// first, sell stops highest first.
    pub fn check_triggers(&mut self, last_trade_price: Price, timestamp: i64) -> Vec<Order> {
        let mut triggered = Vec::new();

        let fired: Vec<Price> = self
            .buy_stops
            .range(..=last_trade_price)
            .map(|(price, _)| *price)
            .collect();
        for price in fired {
            if let Some(queue) = self.buy_stops.remove(&price) {
                for stop in queue {
                    self.order_index.remove(&stop.order_id);
                    triggered.push(stop.materialize(timestamp));
                }
            }
        }

        let fired: Vec<Price> = self
            .sell_stops
            .range(last_trade_price..)
            .map(|(price, _)| *price)
            .rev()
            .collect();
        for price in fired {
            if let Some(queue) = self.sell_stops.remove(&price) {
                for stop in queue {
                    self.order_index.remove(&stop.order_id);
                    triggered.push(stop.materialize(timestamp));
                }
            }
        }

        triggered
    }

    /// Ratchet trailing stops against a new last price. Buy side tracks
    /// the lowest price seen (trigger = best + trail), sell side the
    /// highest (trigger = best − trail). A moved trigger re-keys the
    /// entry in its ladder.
    pub fn update_trailing_stops(&mut self, last_trade_price: Price) {
        Self::trail_side(
            &mut self.buy_stops,
            &mut self.order_index,
            last_trade_price,
            true,
        );
        Self::trail_side(
            &mut self.sell_stops,
            &mut self.order_index,
            last_trade_price,
            false,
        );
    }

    fn trail_side(
        stops: &mut BTreeMap<Price, VecDeque<StopOrder>>,
        order_index: &mut HashMap<String, Price>,
        last: Price,
        is_buy: bool,
    ) {
        let mut moved = Vec::new();
        for queue in stops.values_mut() {
            let mut i = 0;
            while i < queue.len() {
                let improved = queue[i].stop_type == StopType::TrailingStop
                    && if is_buy {
                        last < queue[i].best_price
                    } else {
                        last > queue[i].best_price
                    };
                if improved {
                    if let Some(mut stop) = queue.remove(i) {
                        stop.best_price = last;
                        stop.trigger_price = if is_buy {
                            last + stop.trail_amount
                        } else {
                            last - stop.trail_amount
                        };
                        moved.push(stop);
                    }
                } else {
                    i += 1;
                }
            }
        }
        stops.retain(|_, queue| !queue.is_empty());
        for stop in moved {
            order_index.insert(stop.order_id.clone(), stop.trigger_price);
            stops.entry(stop.trigger_price).or_default().push_back(stop);
        }
    }

    /// All currently dormant stops, buy side then sell side.
    pub fn active_stops(&self) -> Vec<StopOrder> {
        self.buy_stops
            .values()
            .chain(self.sell_stops.values())
            .flatten()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order_index.is_empty()
    }
}
