//! The cart store.
//!
//! One [`CartStore`] per running application, constructed at startup and
//! cloned to whoever needs it. All clones share the same state.

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use glossy_core::{Price, Product, ProductId, ProductVariant, VariantId};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::config::CartConfig;
use crate::error::CartError;
use crate::line::{CartLine, LineKey};
use crate::persist;
use crate::storage::{CartStorage, StorageEvent, WriterId};
use crate::totals::CartTotals;

/// Shopping cart backed by a persisted slot.
///
/// Mutations persist the whole cart on success and bump the revision
/// observed through [`subscribe`](Self::subscribe). Derived values are
/// recomputed on every read.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    config: CartConfig,
    storage: Arc<dyn CartStorage>,
    writer: WriterId,
    lines: Mutex<Vec<CartLine>>,
    events: Mutex<broadcast::Receiver<StorageEvent>>,
    revision: watch::Sender<u64>,
}

impl CartStore {
    /// Open the cart persisted under `config.storage_key`.
    ///
    /// An unreadable slot yields an empty cart.
    #[must_use]
    pub fn open(storage: impl CartStorage, config: CartConfig) -> Self {
        Self::open_shared(Arc::new(storage), config)
    }

    /// Same as [`open`](Self::open) for an already shared backend.
    #[must_use]
    pub fn open_shared(storage: Arc<dyn CartStorage>, config: CartConfig) -> Self {
        // Subscribe before loading so no change can slip in between
        let events = storage.subscribe();
        let lines = load_lines(storage.as_ref(), &config.storage_key);
        let (revision, _) = watch::channel(0);
        let writer = WriterId::new();

        info!(
            key = %config.storage_key,
            writer = %writer,
            lines = lines.len(),
            "Cart store opened"
        );

        Self {
            inner: Arc::new(CartStoreInner {
                config,
                storage,
                writer,
                lines: Mutex::new(lines),
                events: Mutex::new(events),
                revision,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &CartConfig {
        &self.inner.config
    }

    /// Identity attached to this store's writes.
    #[must_use]
    pub fn writer_id(&self) -> WriterId {
        self.inner.writer
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` units of a variant.
    ///
    /// Merges into the existing line for the same product and variant.
    /// Returns the line's new quantity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::StockExceeded` if the resulting quantity would be
    /// above `variant.stock`. The cart is left untouched.
    #[instrument(
        skip(self, product, variant, quantity),
        fields(product_id = %product.id, variant_id = %variant.id, quantity = quantity.get())
    )]
    pub fn add_item(
        &self,
        product: &Product,
        variant: &ProductVariant,
        quantity: NonZeroU32,
    ) -> Result<u32, CartError> {
        let key = LineKey::new(product.id, variant.id);
        let max = variant.stock;

        let new_quantity = {
            let mut lines = self.lines();

            let new_quantity = if let Some(line) = lines.iter_mut().find(|l| l.matches(key)) {
                let wanted = line.quantity.saturating_add(quantity.get());
                if wanted > max {
                    warn!(wanted, max, "Stock exceeded, line unchanged");
                    return Err(CartError::StockExceeded { max });
                }
                line.quantity = wanted;
                wanted
            } else {
                if quantity.get() > max {
                    warn!(max, "Stock exceeded, line not added");
                    return Err(CartError::StockExceeded { max });
                }
                lines.push(CartLine {
                    product: product.clone(),
                    selected_variant: variant.clone(),
                    quantity: quantity.get(),
                });
                quantity.get()
            };

            self.persist(&lines);
            new_quantity
        };

        self.notify();
        debug!(new_quantity, "Item added");
        Ok(new_quantity)
    }

    /// Change a line's quantity by `delta`.
    ///
    /// Applied only if the result stays within `1..=stock`; otherwise, or
    /// if no line matches, nothing happens. Returns whether it applied.
    #[instrument(skip(self, key), fields(key = %key))]
    pub fn update_quantity(&self, key: LineKey, delta: i64) -> bool {
        {
            let mut lines = self.lines();
            let Some(line) = lines.iter_mut().find(|l| l.matches(key)) else {
                return false;
            };

            let Some(new_quantity) = i64::from(line.quantity)
                .checked_add(delta)
                .and_then(|q| u32::try_from(q).ok())
                .filter(|q| (1..=line.stock()).contains(q))
            else {
                debug!(current = line.quantity, "Quantity change out of bounds, ignored");
                return false;
            };

            line.quantity = new_quantity;
            self.persist(&lines);
        }

        self.notify();
        true
    }

    /// Remove a line. Returns whether one was removed.
    #[instrument(skip(self, key), fields(key = %key))]
    pub fn remove_item(&self, key: LineKey) -> bool {
        {
            let mut lines = self.lines();
            let before = lines.len();
            lines.retain(|l| !l.matches(key));
            if lines.len() == before {
                return false;
            }
            self.persist(&lines);
        }

        self.notify();
        true
    }

    /// Empty the cart.
    #[instrument(skip(self))]
    pub fn clear(&self) {
        {
            let mut lines = self.lines();
            lines.clear();
            self.persist(&lines);
        }

        self.notify();
        info!("Cart cleared");
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Snapshot of the lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<CartLine> {
        self.lines().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines().is_empty()
    }

    /// Quantity held for a product/variant pair, 0 when absent.
    #[must_use]
    pub fn get_item_quantity(&self, product_id: ProductId, variant_id: VariantId) -> u32 {
        let key = LineKey::new(product_id, variant_id);
        self.lines()
            .iter()
            .find(|l| l.matches(key))
            .map_or(0, |l| l.quantity)
    }

    /// All derived values at once, from a single consistent snapshot.
    #[must_use]
    pub fn totals(&self) -> CartTotals {
        CartTotals::compute(&self.lines(), &self.inner.config.shipping)
    }

    #[must_use]
    pub fn total_item_count(&self) -> u32 {
        self.totals().item_count
    }

    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.totals().subtotal
    }

    #[must_use]
    pub fn shipping_fee(&self) -> Price {
        self.totals().shipping_fee
    }

    #[must_use]
    pub fn total(&self) -> Price {
        self.totals().total
    }

    // =========================================================================
    // Change notification
    // =========================================================================

    /// Observe the cart's revision.
    ///
    /// The value increases after every successful mutation and every reload
    /// caused by an external change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Current revision.
    #[must_use]
    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    // =========================================================================
    // Cross-context sync
    // =========================================================================

    /// React to one storage event.
    ///
    /// Reloads when the event concerns this store's key and was not caused
    /// by this store's own write. Returns whether it reloaded.
    pub fn handle_event(&self, event: &StorageEvent) -> bool {
        if !self.is_external(event) {
            return false;
        }
        self.reload();
        true
    }

    /// Drain the storage events received so far and reload once if any of
    /// them came from another writer. Returns whether it reloaded.
    pub fn apply_external_changes(&self) -> bool {
        let mut external = false;
        {
            let mut events = self
                .inner
                .events
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            loop {
                match events.try_recv() {
                    Ok(event) => external |= self.is_external(&event),
                    Err(TryRecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed storage events, forcing reload");
                        external = true;
                    }
                    Err(TryRecvError::Empty | TryRecvError::Closed) => break,
                }
            }
        }

        if external {
            self.reload();
        }
        external
    }

    /// Spawn a task that reloads the cart whenever another writer changes
    /// the slot.
    ///
    /// The task stops when the storage backend goes away or every clone of
    /// this store has been dropped.
    #[must_use]
    pub fn spawn_sync(&self) -> JoinHandle<()> {
        let mut events = self.inner.storage.subscribe();
        let weak: Weak<CartStoreInner> = Arc::downgrade(&self.inner);

        tokio::spawn(async move {
            loop {
                let outcome = events.recv().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                let store = Self { inner };
                match outcome {
                    Ok(event) => {
                        store.handle_event(&event);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Missed storage events, forcing reload");
                        store.reload();
                    }
                    Err(RecvError::Closed) => {
                        debug!("Storage event channel closed, stopping cart sync");
                        break;
                    }
                }
            }
        })
    }

    /// Replace the in-memory cart with the slot's current contents.
    #[instrument(skip(self))]
    pub fn reload(&self) {
        {
            let mut lines = self.lines();
            *lines = load_lines(self.inner.storage.as_ref(), &self.inner.config.storage_key);
            info!(lines = lines.len(), "Cart synced from another context");
        }
        self.notify();
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn lines(&self) -> MutexGuard<'_, Vec<CartLine>> {
        self.inner
            .lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn is_external(&self, event: &StorageEvent) -> bool {
        event.key == self.inner.config.storage_key && event.origin != Some(self.inner.writer)
    }

    fn notify(&self) {
        self.inner.revision.send_modify(|rev| *rev += 1);
    }

    /// Write the whole cart to the slot. Failures are logged, never returned.
    fn persist(&self, lines: &[CartLine]) {
        let key = &self.inner.config.storage_key;
        let result = persist::encode(lines)
            .and_then(|bytes| self.inner.storage.save(key, &bytes, self.inner.writer));

        if let Err(e) = result {
            error!(key = %key, error = %e, "Failed to persist cart, keeping in-memory state");
        }
    }
}

/// Read the slot, falling back to an empty cart on any fault.
fn load_lines(storage: &dyn CartStorage, key: &str) -> Vec<CartLine> {
    match storage.load(key) {
        Ok(Some(bytes)) => persist::decode(&bytes).unwrap_or_else(|e| {
            error!(key = %key, error = %e, "Corrupt cart slot, starting empty");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            error!(key = %key, error = %e, "Failed to load cart, starting empty");
            Vec::new()
        }
    }
}
