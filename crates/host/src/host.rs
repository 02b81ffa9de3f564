use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, trace};

use saledash_auth::SessionContext;
use saledash_core::{DomainError, UserId};
use saledash_events::{execute, Event};
use saledash_inventory::{
    AddMove, CancelPicking, CreatePicking, MarkTodo, PickingId, PickingType, SetMoveQuantity, StockPicking,
    StockPickingCommand, ValidatePicking,
};
use saledash_products::{Product, ProductId};
use saledash_sales::{
    AddLine, CancelOrder, ConfirmOrder, CreateSaleOrder, LockOrder, SaleOrder, SaleOrderCommand,
    SaleOrderId,
};

use crate::error::HostError;
use crate::hooks::{ExtensionPoint, TransitionHook};
use crate::query::SaleOrderFilter;
use crate::session::{SessionInfo, SessionInfoAugmenter};
use crate::store::{IdSequence, InMemoryRecordStore, RecordStore, StoreError};

const SALE_ORDER: &str = "sale.order";
const STOCK_PICKING: &str = "stock.picking";
const PRODUCT: &str = "product.product";

/// Server facts reported in the session payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub db_name: String,
    pub server_version: String,
}

impl Default for HostInfo {
    fn default() -> Self {
        Self {
            db_name: "saledash".to_string(),
            server_version: "18.0".to_string(),
        }
    }
}

/// Input for a new quotation. Unset fields fall back to the next id, the
/// acting user, and the current time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewSaleOrder {
    pub id: Option<SaleOrderId>,
    pub salesperson: Option<UserId>,
    pub date_order: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPicking {
    pub id: Option<PickingId>,
    pub picking_type: PickingType,
    pub origin: Option<String>,
}

impl NewPicking {
    pub fn new(picking_type: PickingType) -> Self {
        Self {
            id: None,
            picking_type,
            origin: None,
        }
    }
}

/// The business host: records, default transitions and extension points.
///
/// Register hooks while the host is still exclusively owned, then share it
/// behind an `Arc`; every operation takes `&self`.
pub struct Host {
    info: HostInfo,
    products: InMemoryRecordStore<ProductId, Product>,
    orders: InMemoryRecordStore<SaleOrderId, SaleOrder>,
    pickings: InMemoryRecordStore<PickingId, StockPicking>,
    product_ids: IdSequence,
    order_ids: IdSequence,
    picking_ids: IdSequence,
    order_confirmed: ExtensionPoint<SaleOrder>,
    picking_validated: ExtensionPoint<StockPicking>,
    session_augmenters: Vec<Arc<dyn SessionInfoAugmenter>>,
}

impl Host {
    pub fn new(info: HostInfo) -> Self {
        Self {
            info,
            products: InMemoryRecordStore::new(),
            orders: InMemoryRecordStore::new(),
            pickings: InMemoryRecordStore::new(),
            product_ids: IdSequence::new(),
            order_ids: IdSequence::new(),
            picking_ids: IdSequence::new(),
            order_confirmed: ExtensionPoint::new("sale.order.after_confirm"),
            picking_validated: ExtensionPoint::new("stock.picking.after_validate"),
            session_augmenters: Vec::new(),
        }
    }

    pub fn info(&self) -> &HostInfo {
        &self.info
    }

    // ─────────────────────────────────────────────────────────────────────
    // Extension points
    // ─────────────────────────────────────────────────────────────────────

    pub fn on_order_confirmed(&mut self, hook: Arc<dyn TransitionHook<SaleOrder>>) {
        self.order_confirmed.register(hook);
    }

    pub fn on_picking_validated(&mut self, hook: Arc<dyn TransitionHook<StockPicking>>) {
        self.picking_validated.register(hook);
    }

    pub fn on_session_info(&mut self, augmenter: Arc<dyn SessionInfoAugmenter>) {
        debug!(augmenter = augmenter.name(), "session augmenter registered");
        self.session_augmenters.push(augmenter);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────

    pub fn register_product(
        &self,
        name: &str,
        category: &str,
        standard_price: u64,
    ) -> Result<Product, HostError> {
        let id = ProductId::new(self.product_ids.next_id()?);
        let product = Product::new(id, name, category, standard_price)?;
        self.products.insert_new(id, product.clone())?;
        debug!(product_id = %id, category = product.category(), "product registered");
        Ok(product)
    }

    pub fn product(&self, id: ProductId) -> Option<Product> {
        self.products.get(&id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Sale orders
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_sale_order(
        &self,
        ctx: &SessionContext,
        new: NewSaleOrder,
    ) -> Result<SaleOrder, HostError> {
        let id = match new.id {
            Some(id) => {
                self.order_ids.observe(id.0);
                id
            }
            None => SaleOrderId::new(self.order_ids.next_id()?),
        };

        let mut order = SaleOrder::empty(id);
        execute(
            &mut order,
            &SaleOrderCommand::CreateSaleOrder(CreateSaleOrder {
                order_id: id,
                salesperson: new.salesperson.unwrap_or(ctx.user_id()),
                date_order: new.date_order.unwrap_or_else(Utc::now),
            }),
        )?;

        self.orders.insert_new(id, order.clone()).map_err(|e| match e {
            StoreError::AlreadyExists => {
                HostError::Domain(DomainError::conflict(format!("sale order {id} already exists")))
            }
            other => HostError::Store(other),
        })?;

        debug!(order_id = %id, user_id = %ctx.user_id(), "sale order created");
        Ok(order)
    }

    pub fn add_order_line(
        &self,
        _ctx: &SessionContext,
        id: SaleOrderId,
        product_id: ProductId,
        quantity: i64,
        price_unit: u64,
    ) -> Result<SaleOrder, HostError> {
        if self.products.get(&product_id).is_none() {
            return Err(HostError::not_found(PRODUCT, product_id.get()));
        }

        self.transition_order(
            id,
            SaleOrderCommand::AddLine(AddLine {
                order_id: id,
                product_id,
                quantity,
                price_unit,
                occurred_at: Utc::now(),
            }),
        )
    }

    /// Confirm a quotation, then run the `after_confirm` hooks.
    ///
    /// Returns the confirmed order. When a hook fails the order stays
    /// confirmed and the hook error is returned.
    pub fn confirm_sale_order(
        &self,
        ctx: &SessionContext,
        id: SaleOrderId,
    ) -> Result<SaleOrder, HostError> {
        let order = self.transition_order(
            id,
            SaleOrderCommand::ConfirmOrder(ConfirmOrder {
                order_id: id,
                occurred_at: Utc::now(),
            }),
        )?;
        info!(order_id = %id, user_id = %ctx.user_id(), amount_total = order.amount_total(), "sale order confirmed");

        self.order_confirmed.run(ctx, &order)?;
        Ok(order)
    }

    pub fn lock_sale_order(&self, ctx: &SessionContext, id: SaleOrderId) -> Result<SaleOrder, HostError> {
        let order = self.transition_order(
            id,
            SaleOrderCommand::LockOrder(LockOrder {
                order_id: id,
                occurred_at: Utc::now(),
            }),
        )?;
        debug!(order_id = %id, user_id = %ctx.user_id(), "sale order locked");
        Ok(order)
    }

    pub fn cancel_sale_order(&self, ctx: &SessionContext, id: SaleOrderId) -> Result<SaleOrder, HostError> {
        let order = self.transition_order(
            id,
            SaleOrderCommand::CancelOrder(CancelOrder {
                order_id: id,
                occurred_at: Utc::now(),
            }),
        )?;
        debug!(order_id = %id, user_id = %ctx.user_id(), "sale order cancelled");
        Ok(order)
    }

    pub fn sale_order(&self, id: SaleOrderId) -> Option<SaleOrder> {
        self.orders.get(&id)
    }

    /// Matching orders, newest order date first (ties: higher id first).
    pub fn search_sale_orders(&self, filter: &SaleOrderFilter) -> Vec<SaleOrder> {
        let mut found: Vec<SaleOrder> = self
            .orders
            .list()
            .into_iter()
            .filter(|o| filter.matches(o))
            .collect();

        found.sort_by(|a, b| {
            b.date_order()
                .cmp(&a.date_order())
                .then_with(|| b.id_typed().cmp(&a.id_typed()))
        });

        if let Some(limit) = filter.limit {
            found.truncate(limit);
        }
        found
    }

    fn transition_order(&self, id: SaleOrderId, cmd: SaleOrderCommand) -> Result<SaleOrder, HostError> {
        self.orders
            .modify(&id, |order| -> Result<SaleOrder, DomainError> {
                let events = execute(order, &cmd)?;
                trace_events(SALE_ORDER, id.get(), &events);
                Ok(order.clone())
            })?
            .ok_or_else(|| HostError::not_found(SALE_ORDER, id.get()))?
            .map_err(HostError::from)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Stock pickings
    // ─────────────────────────────────────────────────────────────────────

    pub fn create_picking(&self, ctx: &SessionContext, new: NewPicking) -> Result<StockPicking, HostError> {
        let id = match new.id {
            Some(id) => {
                self.picking_ids.observe(id.0);
                id
            }
            None => PickingId::new(self.picking_ids.next_id()?),
        };

        let mut picking = StockPicking::empty(id);
        execute(
            &mut picking,
            &StockPickingCommand::CreatePicking(CreatePicking {
                picking_id: id,
                picking_type: new.picking_type,
                origin: new.origin,
                occurred_at: Utc::now(),
            }),
        )?;

        self.pickings.insert_new(id, picking.clone()).map_err(|e| match e {
            StoreError::AlreadyExists => {
                HostError::Domain(DomainError::conflict(format!("picking {id} already exists")))
            }
            other => HostError::Store(other),
        })?;

        debug!(picking_id = %id, user_id = %ctx.user_id(), "picking created");
        Ok(picking)
    }

    pub fn add_move(
        &self,
        _ctx: &SessionContext,
        id: PickingId,
        product_id: ProductId,
        product_uom_qty: i64,
    ) -> Result<StockPicking, HostError> {
        if self.products.get(&product_id).is_none() {
            return Err(HostError::not_found(PRODUCT, product_id.get()));
        }

        self.transition_picking(
            id,
            StockPickingCommand::AddMove(AddMove {
                picking_id: id,
                product_id,
                product_uom_qty,
                occurred_at: Utc::now(),
            }),
        )
    }

    pub fn set_move_quantity(
        &self,
        _ctx: &SessionContext,
        id: PickingId,
        move_no: u32,
        quantity: i64,
    ) -> Result<StockPicking, HostError> {
        self.transition_picking(
            id,
            StockPickingCommand::SetMoveQuantity(SetMoveQuantity {
                picking_id: id,
                move_no,
                quantity,
                occurred_at: Utc::now(),
            }),
        )
    }

    pub fn mark_picking_todo(&self, _ctx: &SessionContext, id: PickingId) -> Result<StockPicking, HostError> {
        self.transition_picking(
            id,
            StockPickingCommand::MarkTodo(MarkTodo {
                picking_id: id,
                occurred_at: Utc::now(),
            }),
        )
    }

    pub fn cancel_picking(&self, ctx: &SessionContext, id: PickingId) -> Result<StockPicking, HostError> {
        let picking = self.transition_picking(
            id,
            StockPickingCommand::CancelPicking(CancelPicking {
                picking_id: id,
                occurred_at: Utc::now(),
            }),
        )?;
        debug!(picking_id = %id, user_id = %ctx.user_id(), "picking cancelled");
        Ok(picking)
    }

    /// Validate a picking, then run the `after_validate` hooks.
    ///
    /// Returns the validated picking. When a hook fails the picking stays
    /// done and the hook error is returned.
    pub fn validate_picking(&self, ctx: &SessionContext, id: PickingId) -> Result<StockPicking, HostError> {
        let picking = self.transition_picking(
            id,
            StockPickingCommand::ValidatePicking(ValidatePicking {
                picking_id: id,
                occurred_at: Utc::now(),
            }),
        )?;
        info!(picking_id = %id, user_id = %ctx.user_id(), "picking validated");

        self.picking_validated.run(ctx, &picking)?;
        Ok(picking)
    }

    pub fn picking(&self, id: PickingId) -> Option<StockPicking> {
        self.pickings.get(&id)
    }

    fn transition_picking(
        &self,
        id: PickingId,
        cmd: StockPickingCommand,
    ) -> Result<StockPicking, HostError> {
        self.pickings
            .modify(&id, |picking| -> Result<StockPicking, DomainError> {
                let events = execute(picking, &cmd)?;
                trace_events(STOCK_PICKING, id.get(), &events);
                Ok(picking.clone())
            })?
            .ok_or_else(|| HostError::not_found(STOCK_PICKING, id.get()))?
            .map_err(HostError::from)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────

    /// Default session payload extended by every registered augmenter.
    pub fn session_info(&self, ctx: &SessionContext) -> Result<SessionInfo, HostError> {
        let mut info = SessionInfo::host_default(ctx, &self.info);
        for augmenter in &self.session_augmenters {
            augmenter.augment(ctx, &mut info).map_err(|err| {
                tracing::warn!(augmenter = augmenter.name(), error = %err, "session augmenter failed");
                HostError::Hook(err)
            })?;
        }
        Ok(info)
    }
}

impl core::fmt::Debug for Host {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Host")
            .field("info", &self.info)
            .field("order_confirmed", &self.order_confirmed)
            .field("picking_validated", &self.picking_validated)
            .field(
                "session_augmenters",
                &self.session_augmenters.iter().map(|a| a.name().to_string()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new(HostInfo::default())
    }
}

fn trace_events<E: Event>(model: &'static str, id: u64, events: &[E]) {
    for ev in events {
        trace!(model, record_id = id, event = ev.event_type(), version = ev.version(), at = %ev.occurred_at(), "applied");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use saledash_core::RecordId;
    use saledash_inventory::PickingStatus;
    use saledash_sales::SaleOrderStatus;
    use std::sync::Mutex;

    fn ctx() -> SessionContext {
        SessionContext::authenticated(UserId::new(5), "demo", "Demo")
    }

    fn order_with_line(host: &Host, id: u64) -> SaleOrderId {
        let product = host.register_product("Desk", "Furniture", 100).unwrap();
        let order = host
            .create_sale_order(
                &ctx(),
                NewSaleOrder {
                    id: Some(SaleOrderId::new(RecordId::new(id))),
                    ..NewSaleOrder::default()
                },
            )
            .unwrap();
        host.add_order_line(&ctx(), order.id_typed(), product.id(), 2, 150).unwrap();
        order.id_typed()
    }

    fn recorder<R: 'static>() -> (Arc<Mutex<Vec<u64>>>, impl Fn(&SessionContext, &R) -> anyhow::Result<()> + Send + Sync)
    where
        R: HasId,
    {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |_: &SessionContext, r: &R| -> anyhow::Result<()> {
            sink.lock().unwrap().push(r.raw_id());
            Ok(())
        })
    }

    trait HasId {
        fn raw_id(&self) -> u64;
    }

    impl HasId for SaleOrder {
        fn raw_id(&self) -> u64 {
            self.id_typed().get()
        }
    }

    impl HasId for StockPicking {
        fn raw_id(&self) -> u64 {
            self.id_typed().get()
        }
    }

    #[test]
    fn confirm_runs_hook_once_with_confirmed_order() {
        let mut host = Host::default();
        let (seen, hook) = recorder::<SaleOrder>();
        host.on_order_confirmed(Arc::new(hook));

        let id = order_with_line(&host, 42);
        let confirmed = host.confirm_sale_order(&ctx(), id).unwrap();

        assert_eq!(confirmed.status(), SaleOrderStatus::Sale);
        assert_eq!(*seen.lock().unwrap(), vec![42]);
    }

    #[test]
    fn failed_confirmation_skips_hooks() {
        let mut host = Host::default();
        let (seen, hook) = recorder::<SaleOrder>();
        host.on_order_confirmed(Arc::new(hook));

        let empty = host.create_sale_order(&ctx(), NewSaleOrder::default()).unwrap();
        let err = host.confirm_sale_order(&ctx(), empty.id_typed()).unwrap_err();

        assert!(matches!(err, HostError::Domain(DomainError::Validation(_))));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn confirming_unknown_order_is_not_found() {
        let host = Host::default();
        let err = host
            .confirm_sale_order(&ctx(), SaleOrderId::new(RecordId::new(99)))
            .unwrap_err();
        assert!(matches!(err, HostError::RecordNotFound { model: "sale.order", id: 99 }));
    }

    #[test]
    fn hook_failure_propagates_but_keeps_transition() {
        let mut host = Host::default();
        host.on_order_confirmed(Arc::new(
            |_: &SessionContext, _: &SaleOrder| -> anyhow::Result<()> { anyhow::bail!("bus unavailable") },
        ));

        let id = order_with_line(&host, 1);
        let err = host.confirm_sale_order(&ctx(), id).unwrap_err();

        assert!(err.hook_error().is_some());
        assert_eq!(host.sale_order(id).map(|o| o.status()), Some(SaleOrderStatus::Sale));
    }

    #[test]
    fn validate_runs_hook_once() {
        let mut host = Host::default();
        let (seen, hook) = recorder::<StockPicking>();
        host.on_picking_validated(Arc::new(hook));

        let product = host.register_product("Desk", "Furniture", 100).unwrap();
        let picking = host
            .create_picking(
                &ctx(),
                NewPicking {
                    id: Some(PickingId::new(RecordId::new(7))),
                    ..NewPicking::new(PickingType::Outgoing)
                },
            )
            .unwrap();
        host.add_move(&ctx(), picking.id_typed(), product.id(), 3).unwrap();

        let done = host.validate_picking(&ctx(), picking.id_typed()).unwrap();

        assert_eq!(done.status(), PickingStatus::Done);
        assert_eq!(*seen.lock().unwrap(), vec![7]);

        assert!(host.validate_picking(&ctx(), picking.id_typed()).is_err());
        assert_eq!(*seen.lock().unwrap(), vec![7]);
    }

    #[test]
    fn cancelled_picking_cannot_be_validated() {
        let mut host = Host::default();
        let (seen, hook) = recorder::<StockPicking>();
        host.on_picking_validated(Arc::new(hook));

        let product = host.register_product("Desk", "Furniture", 100).unwrap();
        let picking = host.create_picking(&ctx(), NewPicking::new(PickingType::Incoming)).unwrap();
        host.add_move(&ctx(), picking.id_typed(), product.id(), 1).unwrap();

        let cancelled = host.cancel_picking(&ctx(), picking.id_typed()).unwrap();
        assert_eq!(cancelled.status(), PickingStatus::Cancel);
        assert!(host.validate_picking(&ctx(), picking.id_typed()).is_err());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn explicit_ids_conflict_and_advance_the_sequence() {
        let host = Host::default();
        let explicit = NewSaleOrder {
            id: Some(SaleOrderId::new(RecordId::new(10))),
            ..NewSaleOrder::default()
        };
        host.create_sale_order(&ctx(), explicit.clone()).unwrap();

        assert!(matches!(
            host.create_sale_order(&ctx(), explicit),
            Err(HostError::Domain(DomainError::Conflict(_)))
        ));
        let next = host.create_sale_order(&ctx(), NewSaleOrder::default()).unwrap();
        assert_eq!(next.id_typed().get(), 11);
    }

    #[test]
    fn exhausted_sequence_is_an_error_not_a_panic() {
        let host = Host::default();
        let last = NewSaleOrder {
            id: Some(SaleOrderId::new(RecordId::new(u64::MAX))),
            ..NewSaleOrder::default()
        };
        host.create_sale_order(&ctx(), last).unwrap();

        assert!(matches!(
            host.create_sale_order(&ctx(), NewSaleOrder::default()),
            Err(HostError::Store(StoreError::SequenceExhausted))
        ));

        let mut picking = NewPicking::new(PickingType::Outgoing);
        picking.id = Some(PickingId::new(RecordId::new(u64::MAX)));
        host.create_picking(&ctx(), picking).unwrap();
        assert!(matches!(
            host.create_picking(&ctx(), NewPicking::new(PickingType::Outgoing)),
            Err(HostError::Store(StoreError::SequenceExhausted))
        ));
    }

    #[test]
    fn oversized_lines_are_rejected() {
        let host = Host::default();
        let product = host.register_product("Desk", "Furniture", 100).unwrap();
        let order = host.create_sale_order(&ctx(), NewSaleOrder::default()).unwrap();
        let half = u64::MAX / 2 + 1;

        host.add_order_line(&ctx(), order.id_typed(), product.id(), 1, half).unwrap();
        assert!(matches!(
            host.add_order_line(&ctx(), order.id_typed(), product.id(), 1, half),
            Err(HostError::Domain(DomainError::Validation(_)))
        ));
        assert_eq!(host.sale_order(order.id_typed()).unwrap().amount_total(), half);
    }

    #[test]
    fn lines_require_known_products() {
        let host = Host::default();
        let order = host.create_sale_order(&ctx(), NewSaleOrder::default()).unwrap();
        let err = host
            .add_order_line(&ctx(), order.id_typed(), ProductId::new(RecordId::new(5)), 1, 1)
            .unwrap_err();
        assert!(matches!(err, HostError::RecordNotFound { model: "product.product", .. }));
    }

    #[test]
    fn search_filters_by_state_salesperson_and_date() {
        let host = Host::default();
        let product = host.register_product("Desk", "Furniture", 100).unwrap();
        let other = SessionContext::authenticated(UserId::new(6), "other", "Other");

        let mine = host.create_sale_order(&ctx(), NewSaleOrder::default()).unwrap();
        host.add_order_line(&ctx(), mine.id_typed(), product.id(), 1, 10).unwrap();
        host.confirm_sale_order(&ctx(), mine.id_typed()).unwrap();

        let draft = host.create_sale_order(&ctx(), NewSaleOrder::default()).unwrap();
        let theirs = host.create_sale_order(&other, NewSaleOrder::default()).unwrap();
        host.add_order_line(&other, theirs.id_typed(), product.id(), 1, 10).unwrap();
        host.confirm_sale_order(&other, theirs.id_typed()).unwrap();

        let found = host.search_sale_orders(&SaleOrderFilter::sales_of(UserId::new(5)));
        let ids: Vec<_> = found.iter().map(|o| o.id_typed()).collect();
        assert_eq!(ids, vec![mine.id_typed()]);
        assert!(!ids.contains(&draft.id_typed()));

        let future = Utc::now() + chrono::Duration::days(1);
        assert!(
            host.search_sale_orders(&SaleOrderFilter::sales_of(UserId::new(5)).since(future))
                .is_empty()
        );
    }

    #[test]
    fn session_info_runs_augmenters() {
        struct Flag;
        impl SessionInfoAugmenter for Flag {
            fn name(&self) -> &str {
                "flag"
            }
            fn augment(&self, _ctx: &SessionContext, info: &mut SessionInfo) -> anyhow::Result<()> {
                info.add("flag", true)?;
                Ok(())
            }
        }

        let mut host = Host::default();
        let plain = host.session_info(&ctx()).unwrap();
        host.on_session_info(Arc::new(Flag));
        let augmented = host.session_info(&ctx()).unwrap();

        assert_eq!(augmented.len(), plain.len() + 1);
        assert!(plain.keys().all(|k| augmented.get(k) == plain.get(k)));
        assert_eq!(augmented.get("flag"), Some(&serde_json::json!(true)));
    }
}
