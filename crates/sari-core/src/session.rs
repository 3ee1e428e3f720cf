//! # Checkout Engine: Scan Session
//!
//! The event-driven state machine behind the scanner screen. One scan is
//! handled at a time; while a modal is open further scans are suppressed.
//!
//! ## States
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   IDLE ──open()──► SCANNING ◄────────────────────────────────┐         │
//! │                       │                                      │         │
//! │          handle_scan  │                                      │         │
//! │      ┌────────────────┼──────────────────┐                   │         │
//! │      ▼                ▼                  ▼                   │         │
//! │  CHECK_PENDING    ADD_PENDING        QTY_ENTRY               │         │
//! │  (price shown)    (item form)        (SELL, qty prompt)      │         │
//! │      │                │                  │                   │         │
//! │  acknowledge()    save_item()     confirm_quantity()         │         │
//! │      └────────────────┴──────────────────┴───────────────────┘         │
//! │                                                                         │
//! │   SCANNING ──review_cart()──► CART_REVIEW ──checkout()──► COMMITTING   │
//! │                                   ▲                           │         │
//! │                                   └──── sink failed ──────────┤         │
//! │                                                               │ ok      │
//! │   IDLE ◄──────────────────────────────────────────────────────┘         │
//! │                                                                         │
//! │   exit() from any state: cart discarded, back to IDLE                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every error leaves the session in a state that accepts input again.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::cart::{Cart, CartLine};
use crate::catalog::UpsertOutcome;
use crate::checkout::{process_checkout, CheckoutPlan, SaleStamp};
use crate::error::{CoreError, CoreResult};
use crate::form::ItemForm;
use crate::money::Money;
use crate::sink::CommitSink;
use crate::store::StoreSnapshot;
use crate::types::{InventoryItem, ScanMode};
use crate::validation::{normalize_barcode, validate_discount, validate_quantity};

/// Where the scanner screen is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionState {
    Idle,
    Scanning,
    CheckPending,
    AddPending,
    QtyEntry,
    CartReview,
    Committing,
}

impl SessionState {
    /// A modal is open: scans are ignored until it is closed.
    pub fn is_modal(&self) -> bool {
        !matches!(self, SessionState::Idle | SessionState::Scanning)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "IDLE",
            SessionState::Scanning => "SCANNING",
            SessionState::CheckPending => "CHECK_PENDING",
            SessionState::AddPending => "ADD_PENDING",
            SessionState::QtyEntry => "QTY_ENTRY",
            SessionState::CartReview => "CART_REVIEW",
            SessionState::Committing => "COMMITTING",
        };
        f.write_str(name)
    }
}

/// What a scan produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// CHECK mode: the item's price and stock, nothing changed.
    PriceCheck(InventoryItem),
    /// ADD mode, known barcode: the form pre-filled from the record.
    EditForm(ItemForm),
    /// ADD mode, unknown barcode: a blank registration form.
    RegisterForm(ItemForm),
    /// SELL mode: asking how many. `in_cart` is what the cart already holds.
    QuantityPrompt { item: InventoryItem, in_cart: i64 },
    /// A modal was open; the scan was dropped.
    Suppressed(SessionState),
}

#[derive(Debug, Clone)]
enum Pending {
    Check,
    Form(ItemForm),
    Quantity(InventoryItem),
}

/// One scanner session: mode, state, cart and discount.
#[derive(Debug, Clone)]
pub struct ScanSession {
    mode: ScanMode,
    state: SessionState,
    cart: Cart,
    discount: Money,
    pending: Option<Pending>,
}

impl ScanSession {
    pub fn new(mode: ScanMode) -> Self {
        ScanSession {
            mode,
            state: SessionState::Idle,
            cart: Cart::new(),
            discount: Money::zero(),
            pending: None,
        }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    /// The form currently open in ADD mode.
    pub fn form(&self) -> Option<&ItemForm> {
        match &self.pending {
            Some(Pending::Form(form)) => Some(form),
            _ => None,
        }
    }

    pub fn form_mut(&mut self) -> Option<&mut ItemForm> {
        match &mut self.pending {
            Some(Pending::Form(form)) => Some(form),
            _ => None,
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(from = %self.state, to = %next, "Session transition");
        self.state = next;
    }

    fn expect_state(&self, action: &str, expected: SessionState) -> CoreResult<()> {
        if self.state != expected {
            return Err(CoreError::invalid_state(action, self.state));
        }
        Ok(())
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Opens the scanner.
    pub fn open(&mut self) {
        if self.state == SessionState::Idle {
            self.transition(SessionState::Scanning);
        }
    }

    /// Switches scan mode. Only allowed while no modal is open.
    pub fn set_mode(&mut self, mode: ScanMode) -> CoreResult<()> {
        if self.state.is_modal() {
            return Err(CoreError::invalid_state("change mode", self.state));
        }
        info!(mode = %mode, "Scan mode changed");
        self.mode = mode;
        Ok(())
    }

    /// Closes the scanner. Nothing has been written yet, so the cart is
    /// simply dropped. Returns the number of discarded lines.
    pub fn exit(&mut self) -> usize {
        let discarded = self.cart.line_count();
        if discarded > 0 {
            info!(lines = discarded, "Cart discarded on exit");
        }
        self.cart.clear();
        self.discount = Money::zero();
        self.pending = None;
        self.transition(SessionState::Idle);
        discarded
    }

    // =========================================================================
    // Scanning
    // =========================================================================

    /// Handles one decoded scan.
    ///
    /// ## When This Errors
    /// - Blank scan (`Validation`)
    /// - CHECK / SELL scan of an unknown barcode (`ItemNotFound`)
    /// - SELL scan of an item with `qty <= 0` (`InsufficientStock`)
    ///
    /// In every error case the session stays in SCANNING.
    pub fn handle_scan(&mut self, raw: &str, store: &StoreSnapshot) -> CoreResult<ScanOutcome> {
        if self.state.is_modal() {
            debug!(state = %self.state, "Scan suppressed");
            return Ok(ScanOutcome::Suppressed(self.state));
        }
        if self.state == SessionState::Idle {
            return Err(CoreError::invalid_state("scan", self.state));
        }

        let barcode = normalize_barcode(raw)?;
        let found = store.catalog.lookup(&barcode);
        debug!(barcode = %barcode, mode = %self.mode, found = found.is_some(), "Scan");

        match self.mode {
            ScanMode::Check => {
                let item = found.ok_or(CoreError::ItemNotFound(barcode))?.clone();
                self.pending = Some(Pending::Check);
                self.transition(SessionState::CheckPending);
                Ok(ScanOutcome::PriceCheck(item))
            }
            ScanMode::Add => {
                let outcome = match found {
                    Some(item) => ScanOutcome::EditForm(ItemForm::edit(item)),
                    None => ScanOutcome::RegisterForm(ItemForm::register(&barcode)),
                };
                if let ScanOutcome::EditForm(form) | ScanOutcome::RegisterForm(form) = &outcome {
                    self.pending = Some(Pending::Form(form.clone()));
                }
                self.transition(SessionState::AddPending);
                Ok(outcome)
            }
            ScanMode::Sell => {
                let item = found.ok_or(CoreError::ItemNotFound(barcode))?.clone();
                let in_cart = self.cart.quantity_of(&item.id);
                if item.is_out_of_stock() || in_cart >= item.qty {
                    return Err(CoreError::InsufficientStock {
                        barcode: item.id.clone(),
                        name: item.name.clone(),
                        available: item.qty.max(0),
                        requested: in_cart.saturating_add(1),
                    });
                }
                self.pending = Some(Pending::Quantity(item.clone()));
                self.transition(SessionState::QtyEntry);
                Ok(ScanOutcome::QuantityPrompt { item, in_cart })
            }
        }
    }

    /// Closes the price-check modal.
    pub fn acknowledge(&mut self) -> CoreResult<()> {
        self.expect_state("acknowledge", SessionState::CheckPending)?;
        self.pending = None;
        self.transition(SessionState::Scanning);
        Ok(())
    }

    /// Closes whichever modal is open without applying it. The cart is kept.
    pub fn cancel(&mut self) -> CoreResult<()> {
        match self.state {
            SessionState::CheckPending
            | SessionState::AddPending
            | SessionState::QtyEntry
            | SessionState::CartReview => {
                self.pending = None;
                self.transition(SessionState::Scanning);
                Ok(())
            }
            state => Err(CoreError::invalid_state("cancel", state)),
        }
    }

    /// Empties the cart and resets the discount without leaving the scanner.
    pub fn void_cart(&mut self) -> CoreResult<usize> {
        if self.state == SessionState::Committing {
            return Err(CoreError::invalid_state("void the cart", self.state));
        }
        let discarded = self.cart.line_count();
        self.cart.clear();
        self.discount = Money::zero();
        if self.state == SessionState::CartReview {
            self.transition(SessionState::Scanning);
        }
        info!(lines = discarded, "Cart voided");
        Ok(discarded)
    }

    // =========================================================================
    // ADD mode
    // =========================================================================

    /// Saves the open form: validate, persist, then upsert into the catalog.
    ///
    /// ## Lost updates
    /// The save replaces every field. If the catalog's stock moved since the
    /// form was opened, the form's qty still wins; this is logged so the
    /// overwrite is visible.
    ///
    /// A validation or sink error keeps the form open for correction.
    pub async fn save_item<S: CommitSink>(
        &mut self,
        store: &mut StoreSnapshot,
        sink: &S,
    ) -> CoreResult<(InventoryItem, UpsertOutcome)> {
        self.expect_state("save an item", SessionState::AddPending)?;
        let form = self
            .form()
            .ok_or_else(|| CoreError::invalid_state("save an item", self.state))?;
        let item = form.into_item()?;

        if let (Some(seen), Some(current)) = (form.scanned_qty, store.catalog.lookup(&item.id)) {
            if current.qty != seen {
                warn!(
                    barcode = %item.id,
                    seen,
                    current = current.qty,
                    saved = item.qty,
                    "Stock changed while the form was open; saved qty replaces it"
                );
            }
        }

        let outcome = store.save_item(sink, item.clone()).await?;
        info!(barcode = %item.id, ?outcome, "Item saved");

        self.pending = None;
        self.transition(SessionState::Scanning);
        Ok((item, outcome))
    }

    // =========================================================================
    // SELL mode
    // =========================================================================

    /// Adds the scanned item with the entered quantity.
    ///
    /// A non-positive quantity keeps the prompt open. A stock failure closes
    /// it with the cart unchanged.
    pub fn confirm_quantity(&mut self, qty: i64) -> CoreResult<CartLine> {
        self.expect_state("enter a quantity", SessionState::QtyEntry)?;
        let item = match &self.pending {
            Some(Pending::Quantity(item)) => item.clone(),
            _ => return Err(CoreError::invalid_state("enter a quantity", self.state)),
        };
        validate_quantity(qty)?;

        self.pending = None;
        self.transition(SessionState::Scanning);
        let line = self.cart.add_or_merge(&item, qty)?;
        Ok(line.clone())
    }

    /// Opens the cart review.
    pub fn review_cart(&mut self) -> CoreResult<()> {
        self.expect_state("review the cart", SessionState::Scanning)?;
        if self.cart.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        self.transition(SessionState::CartReview);
        Ok(())
    }

    /// Removes one cart line. Leaving review with an empty cart drops back to
    /// scanning.
    pub fn remove_line(&mut self, index: usize) -> CoreResult<CartLine> {
        if !matches!(self.state, SessionState::Scanning | SessionState::CartReview) {
            return Err(CoreError::invalid_state("remove a line", self.state));
        }
        let removed = self.cart.remove(index)?;

        // a discount bigger than the new subtotal no longer applies
        if validate_discount(self.discount, self.cart.subtotal()).is_err() {
            self.discount = Money::zero();
        }
        if self.cart.is_empty() && self.state == SessionState::CartReview {
            self.transition(SessionState::Scanning);
        }
        Ok(removed)
    }

    /// Sets the cart-level discount on the review screen.
    pub fn set_discount(&mut self, discount: Money) -> CoreResult<()> {
        self.expect_state("set a discount", SessionState::CartReview)?;
        validate_discount(discount, self.cart.subtotal())?;
        self.discount = discount;
        Ok(())
    }

    /// Grand total currently shown on the review screen.
    pub fn grand_total(&self) -> CoreResult<Money> {
        self.cart.grand_total(self.discount)
    }

    /// Commits the reviewed cart.
    ///
    /// The session closes only after the sink confirms. On failure it goes
    /// back to CART_REVIEW with the cart and discount intact.
    pub async fn checkout<S: CommitSink>(
        &mut self,
        store: &mut StoreSnapshot,
        sink: &S,
        stamp: SaleStamp,
    ) -> CoreResult<CheckoutPlan> {
        self.expect_state("check out", SessionState::CartReview)?;
        self.transition(SessionState::Committing);

        match process_checkout(&mut self.cart, &mut self.discount, store, sink, stamp).await {
            Ok(plan) => {
                self.transition(SessionState::Idle);
                Ok(plan)
            }
            Err(err) => {
                self.transition(SessionState::CartReview);
                Err(err)
            }
        }
    }
}

impl Default for ScanSession {
    fn default() -> Self {
        ScanSession::new(ScanMode::Sell)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
