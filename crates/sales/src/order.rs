use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use saledash_core::{Aggregate, AggregateRoot, DomainError, RecordId, UserId};
use saledash_events::Event;
use saledash_products::ProductId;

/// Sale order identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaleOrderId(pub RecordId);

impl SaleOrderId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl core::fmt::Display for SaleOrderId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Sale order state lifecycle.
///
/// `Draft` is a quotation; `Sale` is a confirmed order; `Done` is a locked
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaleOrderStatus {
    Draft,
    Sale,
    Done,
    Cancel,
}

impl SaleOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SaleOrderStatus::Draft => "draft",
            SaleOrderStatus::Sale => "sale",
            SaleOrderStatus::Done => "done",
            SaleOrderStatus::Cancel => "cancel",
        }
    }
}

/// Order line: product, quantity, unit price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub line_no: u32,
    pub product_id: ProductId,
    pub quantity: i64,
    /// Price in smallest currency unit (e.g., cents).
    pub price_unit: u64,
}

impl OrderLine {
    /// Untaxed line amount (quantity × unit price).
    pub fn subtotal(&self) -> u64 {
        (self.quantity.max(0) as u64).saturating_mul(self.price_unit)
    }
}

/// Aggregate root: SaleOrder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleOrder {
    id: SaleOrderId,
    salesperson: Option<UserId>,
    date_order: Option<DateTime<Utc>>,
    status: SaleOrderStatus,
    lines: Vec<OrderLine>,
    version: u64,
    created: bool,
}

impl SaleOrder {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: SaleOrderId) -> Self {
        Self {
            id,
            salesperson: None,
            date_order: None,
            status: SaleOrderStatus::Draft,
            lines: Vec::new(),
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> SaleOrderId {
        self.id
    }

    pub fn salesperson(&self) -> Option<UserId> {
        self.salesperson
    }

    /// Quotation date while in draft; confirmation date once confirmed.
    pub fn date_order(&self) -> Option<DateTime<Utc>> {
        self.date_order
    }

    pub fn status(&self) -> SaleOrderStatus {
        self.status
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn amount_total(&self) -> u64 {
        self.lines
            .iter()
            .map(OrderLine::subtotal)
            .fold(0, u64::saturating_add)
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn is_modifiable(&self) -> bool {
        matches!(self.status, SaleOrderStatus::Draft)
    }

    /// Confirmed or locked orders count as sales.
    pub fn is_sale(&self) -> bool {
        matches!(self.status, SaleOrderStatus::Sale | SaleOrderStatus::Done)
    }
}

impl AggregateRoot for SaleOrder {
    type Id = SaleOrderId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateSaleOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSaleOrder {
    pub order_id: SaleOrderId,
    pub salesperson: UserId,
    pub date_order: DateTime<Utc>,
}

/// Command: AddLine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddLine {
    pub order_id: SaleOrderId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub price_unit: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ConfirmOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmOrder {
    pub order_id: SaleOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: LockOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockOrder {
    pub order_id: SaleOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelOrder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelOrder {
    pub order_id: SaleOrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleOrderCommand {
    CreateSaleOrder(CreateSaleOrder),
    AddLine(AddLine),
    ConfirmOrder(ConfirmOrder),
    LockOrder(LockOrder),
    CancelOrder(CancelOrder),
}

/// Event: SaleOrderCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleOrderCreated {
    pub order_id: SaleOrderId,
    pub salesperson: UserId,
    pub date_order: DateTime<Utc>,
}

/// Event: LineAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineAdded {
    pub order_id: SaleOrderId,
    pub line_no: u32,
    pub product_id: ProductId,
    pub quantity: i64,
    pub price_unit: u64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderConfirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmed {
    pub order_id: SaleOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderLocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLocked {
    pub order_id: SaleOrderId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: OrderCancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    pub order_id: SaleOrderId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleOrderEvent {
    SaleOrderCreated(SaleOrderCreated),
    LineAdded(LineAdded),
    OrderConfirmed(OrderConfirmed),
    OrderLocked(OrderLocked),
    OrderCancelled(OrderCancelled),
}

impl Event for SaleOrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SaleOrderEvent::SaleOrderCreated(_) => "sale.order.created",
            SaleOrderEvent::LineAdded(_) => "sale.order.line_added",
            SaleOrderEvent::OrderConfirmed(_) => "sale.order.confirmed",
            SaleOrderEvent::OrderLocked(_) => "sale.order.locked",
            SaleOrderEvent::OrderCancelled(_) => "sale.order.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            SaleOrderEvent::SaleOrderCreated(e) => e.date_order,
            SaleOrderEvent::LineAdded(e) => e.occurred_at,
            SaleOrderEvent::OrderConfirmed(e) => e.occurred_at,
            SaleOrderEvent::OrderLocked(e) => e.occurred_at,
            SaleOrderEvent::OrderCancelled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for SaleOrder {
    type Command = SaleOrderCommand;
    type Event = SaleOrderEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            SaleOrderEvent::SaleOrderCreated(e) => {
                self.id = e.order_id;
                self.salesperson = Some(e.salesperson);
                self.date_order = Some(e.date_order);
                self.status = SaleOrderStatus::Draft;
                self.lines.clear();
                self.created = true;
            }
            SaleOrderEvent::LineAdded(e) => {
                self.lines.push(OrderLine {
                    line_no: e.line_no,
                    product_id: e.product_id,
                    quantity: e.quantity,
                    price_unit: e.price_unit,
                });
            }
            SaleOrderEvent::OrderConfirmed(e) => {
                self.status = SaleOrderStatus::Sale;
                self.date_order = Some(e.occurred_at);
            }
            SaleOrderEvent::OrderLocked(_) => {
                self.status = SaleOrderStatus::Done;
            }
            SaleOrderEvent::OrderCancelled(_) => {
                self.status = SaleOrderStatus::Cancel;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            SaleOrderCommand::CreateSaleOrder(cmd) => self.handle_create(cmd),
            SaleOrderCommand::AddLine(cmd) => self.handle_add_line(cmd),
            SaleOrderCommand::ConfirmOrder(cmd) => self.handle_confirm(cmd),
            SaleOrderCommand::LockOrder(cmd) => self.handle_lock(cmd),
            SaleOrderCommand::CancelOrder(cmd) => self.handle_cancel(cmd),
        }
    }
}

impl SaleOrder {
    fn ensure_existing(&self, order_id: SaleOrderId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.id != order_id {
            return Err(DomainError::invariant("order_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateSaleOrder) -> Result<Vec<SaleOrderEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("sale order already exists"));
        }

        Ok(vec![SaleOrderEvent::SaleOrderCreated(SaleOrderCreated {
            order_id: cmd.order_id,
            salesperson: cmd.salesperson,
            date_order: cmd.date_order,
        })])
    }

    fn handle_add_line(&self, cmd: &AddLine) -> Result<Vec<SaleOrderEvent>, DomainError> {
        self.ensure_existing(cmd.order_id)?;

        if !self.is_modifiable() {
            return Err(DomainError::invariant(
                "cannot modify order once it is confirmed, locked or cancelled",
            ));
        }

        if cmd.quantity <= 0 {
            return Err(DomainError::validation("quantity must be positive"));
        }

        // Free lines are fine; totals that no longer fit a u64 are not.
        let subtotal = (cmd.quantity as u64)
            .checked_mul(cmd.price_unit)
            .ok_or_else(|| DomainError::validation("line subtotal is out of range"))?;
        self.amount_total()
            .checked_add(subtotal)
            .ok_or_else(|| DomainError::validation("order total is out of range"))?;

        let next_line_no = (self.lines.len() as u32) + 1;

        Ok(vec![SaleOrderEvent::LineAdded(LineAdded {
            order_id: cmd.order_id,
            line_no: next_line_no,
            product_id: cmd.product_id,
            quantity: cmd.quantity,
            price_unit: cmd.price_unit,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_confirm(&self, cmd: &ConfirmOrder) -> Result<Vec<SaleOrderEvent>, DomainError> {
        self.ensure_existing(cmd.order_id)?;

        if self.status != SaleOrderStatus::Draft {
            return Err(DomainError::invariant("only draft orders can be confirmed"));
        }

        if self.lines.is_empty() {
            return Err(DomainError::validation("cannot confirm order without lines"));
        }

        Ok(vec![SaleOrderEvent::OrderConfirmed(OrderConfirmed {
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_lock(&self, cmd: &LockOrder) -> Result<Vec<SaleOrderEvent>, DomainError> {
        self.ensure_existing(cmd.order_id)?;

        if self.status != SaleOrderStatus::Sale {
            return Err(DomainError::invariant("only confirmed orders can be locked"));
        }

        Ok(vec![SaleOrderEvent::OrderLocked(OrderLocked {
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelOrder) -> Result<Vec<SaleOrderEvent>, DomainError> {
        self.ensure_existing(cmd.order_id)?;

        match self.status {
            SaleOrderStatus::Draft | SaleOrderStatus::Sale => {}
            SaleOrderStatus::Done => {
                return Err(DomainError::invariant("locked orders cannot be cancelled"));
            }
            SaleOrderStatus::Cancel => {
                return Err(DomainError::invariant("order is already cancelled"));
            }
        }

        Ok(vec![SaleOrderEvent::OrderCancelled(OrderCancelled {
            order_id: cmd.order_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;
    use saledash_events::execute;

    fn order_id(n: u64) -> SaleOrderId {
        SaleOrderId::new(RecordId::new(n))
    }

    fn product_id(n: u64) -> ProductId {
        ProductId::new(RecordId::new(n))
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn created_order(id: SaleOrderId) -> SaleOrder {
        let mut order = SaleOrder::empty(id);
        execute(
            &mut order,
            &SaleOrderCommand::CreateSaleOrder(CreateSaleOrder {
                order_id: id,
                salesperson: UserId::new(5),
                date_order: test_time(),
            }),
        )
        .unwrap();
        order
    }

    fn add_line(order: &mut SaleOrder, quantity: i64, price_unit: u64) -> Result<(), DomainError> {
        let id = order.id_typed();
        execute(
            order,
            &SaleOrderCommand::AddLine(AddLine {
                order_id: id,
                product_id: product_id(1),
                quantity,
                price_unit,
                occurred_at: test_time(),
            }),
        )
        .map(|_| ())
    }

    fn confirm(order: &mut SaleOrder, at: DateTime<Utc>) -> Result<Vec<SaleOrderEvent>, DomainError> {
        let id = order.id_typed();
        execute(
            order,
            &SaleOrderCommand::ConfirmOrder(ConfirmOrder {
                order_id: id,
                occurred_at: at,
            }),
        )
    }

    #[test]
    fn create_emits_sale_order_created_event() {
        let order = SaleOrder::empty(order_id(42));
        let events = order
            .handle(&SaleOrderCommand::CreateSaleOrder(CreateSaleOrder {
                order_id: order_id(42),
                salesperson: UserId::new(5),
                date_order: test_time(),
            }))
            .unwrap();

        assert_eq!(events.len(), 1);
        match &events[0] {
            SaleOrderEvent::SaleOrderCreated(e) => {
                assert_eq!(e.order_id, order_id(42));
                assert_eq!(e.salesperson, UserId::new(5));
            }
            _ => panic!("Expected SaleOrderCreated event"),
        }
    }

    #[test]
    fn create_twice_conflicts() {
        let order = created_order(order_id(1));
        let err = order
            .handle(&SaleOrderCommand::CreateSaleOrder(CreateSaleOrder {
                order_id: order_id(1),
                salesperson: UserId::new(5),
                date_order: test_time(),
            }))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn add_line_numbers_lines_sequentially() {
        let mut order = created_order(order_id(1));
        add_line(&mut order, 2, 100).unwrap();
        add_line(&mut order, 1, 50).unwrap();

        let numbers: Vec<u32> = order.lines().iter().map(|l| l.line_no).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(order.amount_total(), 250);
    }

    #[test]
    fn add_line_rejects_non_positive_quantities() {
        let mut order = created_order(order_id(1));
        assert!(matches!(add_line(&mut order, 0, 100), Err(DomainError::Validation(_))));
        assert!(matches!(add_line(&mut order, -3, 100), Err(DomainError::Validation(_))));
        assert!(order.lines().is_empty());
    }

    #[test]
    fn free_lines_are_accepted() {
        let mut order = created_order(order_id(1));
        add_line(&mut order, 2, 0).unwrap();
        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.amount_total(), 0);
    }

    #[test]
    fn add_line_rejects_totals_that_overflow() {
        let mut order = created_order(order_id(1));
        let half = u64::MAX / 2 + 1;

        assert!(matches!(add_line(&mut order, 3, half), Err(DomainError::Validation(_))));
        add_line(&mut order, 1, half).unwrap();
        assert!(matches!(add_line(&mut order, 1, half), Err(DomainError::Validation(_))));

        assert_eq!(order.lines().len(), 1);
        assert_eq!(order.amount_total(), half);
    }

    #[test]
    fn confirm_moves_draft_to_sale_and_stamps_date_order() {
        let mut order = created_order(order_id(42));
        add_line(&mut order, 1, 100).unwrap();

        let confirmed_at = test_time() + Duration::hours(1);
        confirm(&mut order, confirmed_at).unwrap();

        assert_eq!(order.status(), SaleOrderStatus::Sale);
        assert_eq!(order.date_order(), Some(confirmed_at));
        assert!(order.is_sale());
    }

    #[test]
    fn confirm_without_lines_is_rejected_and_leaves_state() {
        let mut order = created_order(order_id(1));
        let before = order.clone();

        let err = confirm(&mut order, test_time()).unwrap_err();

        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(order, before);
    }

    #[test]
    fn confirm_unknown_order_is_not_found() {
        let mut order = SaleOrder::empty(order_id(9));
        assert_eq!(confirm(&mut order, test_time()).unwrap_err(), DomainError::NotFound);
    }

    #[test]
    fn cannot_confirm_twice_or_modify_confirmed_order() {
        let mut order = created_order(order_id(1));
        add_line(&mut order, 1, 100).unwrap();
        confirm(&mut order, test_time()).unwrap();

        match confirm(&mut order, test_time()).unwrap_err() {
            DomainError::InvariantViolation(msg) if msg.contains("only draft") => {}
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(matches!(add_line(&mut order, 1, 100), Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn lock_requires_confirmed_and_blocks_cancel() {
        let mut order = created_order(order_id(1));
        let lock = SaleOrderCommand::LockOrder(LockOrder {
            order_id: order_id(1),
            occurred_at: test_time(),
        });
        assert!(matches!(order.handle(&lock), Err(DomainError::InvariantViolation(_))));

        add_line(&mut order, 1, 100).unwrap();
        confirm(&mut order, test_time()).unwrap();
        execute(&mut order, &lock).unwrap();
        assert_eq!(order.status(), SaleOrderStatus::Done);
        assert!(order.is_sale());

        let cancel = SaleOrderCommand::CancelOrder(CancelOrder {
            order_id: order_id(1),
            occurred_at: test_time(),
        });
        assert!(matches!(order.handle(&cancel), Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn cancelled_order_is_not_a_sale() {
        let mut order = created_order(order_id(1));
        execute(
            &mut order,
            &SaleOrderCommand::CancelOrder(CancelOrder {
                order_id: order_id(1),
                occurred_at: test_time(),
            }),
        )
        .unwrap();
        assert_eq!(order.status(), SaleOrderStatus::Cancel);
        assert!(!order.is_sale());
    }

    #[test]
    fn handle_does_not_mutate_state() {
        let mut order = created_order(order_id(1));
        add_line(&mut order, 1, 100).unwrap();
        let before = order.clone();

        let cmd = SaleOrderCommand::ConfirmOrder(ConfirmOrder {
            order_id: order_id(1),
            occurred_at: test_time(),
        });
        let first = order.handle(&cmd).unwrap();
        let second = order.handle(&cmd).unwrap();

        assert_eq!(first, second);
        assert_eq!(order, before);
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(SaleOrderStatus::Sale.as_str(), "sale");
        assert_eq!(
            serde_json::to_string(&SaleOrderStatus::Cancel).ok().as_deref(),
            Some("\"cancel\"")
        );
    }

    proptest! {
        #[test]
        fn amount_total_is_sum_of_lines_and_version_counts_events(
            lines in proptest::collection::vec((1i64..50, 1u64..10_000), 0..12)
        ) {
            let mut order = created_order(order_id(3));
            for (qty, price) in &lines {
                add_line(&mut order, *qty, *price).unwrap();
            }

            let expected: u64 = lines.iter().map(|(q, p)| (*q as u64) * *p).sum();
            prop_assert_eq!(order.amount_total(), expected);
            prop_assert_eq!(order.version(), 1 + lines.len() as u64);
        }
    }
}
