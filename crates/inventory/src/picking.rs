use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use saledash_core::{Aggregate, AggregateRoot, DomainError, RecordId};
use saledash_events::Event;
use saledash_products::ProductId;

/// Stock picking identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PickingId(pub RecordId);

impl PickingId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl core::fmt::Display for PickingId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickingType {
    Incoming,
    Outgoing,
    Internal,
}

/// Picking state lifecycle.
///
/// `Confirmed` means waiting for availability, `Assigned` means ready.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickingStatus {
    Draft,
    Confirmed,
    Assigned,
    Done,
    Cancel,
}

impl PickingStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PickingStatus::Done | PickingStatus::Cancel)
    }
}

/// One product movement inside a picking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMove {
    pub move_no: u32,
    pub product_id: ProductId,
    /// Demand.
    pub product_uom_qty: i64,
    /// Quantity actually moved.
    pub quantity: i64,
}

/// Aggregate root: StockPicking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockPicking {
    id: PickingId,
    picking_type: PickingType,
    origin: Option<String>,
    status: PickingStatus,
    moves: Vec<StockMove>,
    date_done: Option<DateTime<Utc>>,
    version: u64,
    created: bool,
}

impl StockPicking {
    /// Create an empty, not-yet-created aggregate instance.
    pub fn empty(id: PickingId) -> Self {
        Self {
            id,
            picking_type: PickingType::Internal,
            origin: None,
            status: PickingStatus::Draft,
            moves: Vec::new(),
            date_done: None,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> PickingId {
        self.id
    }

    pub fn picking_type(&self) -> PickingType {
        self.picking_type
    }

    /// Source document reference (e.g. the sale order name).
    pub fn origin(&self) -> Option<&str> {
        self.origin.as_deref()
    }

    pub fn status(&self) -> PickingStatus {
        self.status
    }

    pub fn moves(&self) -> &[StockMove] {
        &self.moves
    }

    pub fn date_done(&self) -> Option<DateTime<Utc>> {
        self.date_done
    }

    pub fn is_created(&self) -> bool {
        self.created
    }
}

impl AggregateRoot for StockPicking {
    type Id = PickingId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreatePicking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePicking {
    pub picking_id: PickingId,
    pub picking_type: PickingType,
    pub origin: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: AddMove.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddMove {
    pub picking_id: PickingId,
    pub product_id: ProductId,
    pub product_uom_qty: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: MarkTodo (draft → waiting).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkTodo {
    pub picking_id: PickingId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetMoveQuantity (record the quantity actually moved).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetMoveQuantity {
    pub picking_id: PickingId,
    pub move_no: u32,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ValidatePicking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatePicking {
    pub picking_id: PickingId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: CancelPicking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelPicking {
    pub picking_id: PickingId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockPickingCommand {
    CreatePicking(CreatePicking),
    AddMove(AddMove),
    MarkTodo(MarkTodo),
    SetMoveQuantity(SetMoveQuantity),
    ValidatePicking(ValidatePicking),
    CancelPicking(CancelPicking),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickingCreated {
    pub picking_id: PickingId,
    pub picking_type: PickingType,
    pub origin: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAdded {
    pub picking_id: PickingId,
    pub move_no: u32,
    pub product_id: ProductId,
    pub product_uom_qty: i64,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickingMarkedTodo {
    pub picking_id: PickingId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveQuantitySet {
    pub picking_id: PickingId,
    pub move_no: u32,
    pub quantity: i64,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PickingValidated.
///
/// `done_quantities` holds the final moved quantity per move, in move order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickingValidated {
    pub picking_id: PickingId,
    pub done_quantities: Vec<i64>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickingCancelled {
    pub picking_id: PickingId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockPickingEvent {
    PickingCreated(PickingCreated),
    MoveAdded(MoveAdded),
    PickingMarkedTodo(PickingMarkedTodo),
    MoveQuantitySet(MoveQuantitySet),
    PickingValidated(PickingValidated),
    PickingCancelled(PickingCancelled),
}

impl Event for StockPickingEvent {
    fn event_type(&self) -> &'static str {
        match self {
            StockPickingEvent::PickingCreated(_) => "stock.picking.created",
            StockPickingEvent::MoveAdded(_) => "stock.picking.move_added",
            StockPickingEvent::PickingMarkedTodo(_) => "stock.picking.marked_todo",
            StockPickingEvent::MoveQuantitySet(_) => "stock.picking.move_quantity_set",
            StockPickingEvent::PickingValidated(_) => "stock.picking.validated",
            StockPickingEvent::PickingCancelled(_) => "stock.picking.cancelled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            StockPickingEvent::PickingCreated(e) => e.occurred_at,
            StockPickingEvent::MoveAdded(e) => e.occurred_at,
            StockPickingEvent::PickingMarkedTodo(e) => e.occurred_at,
            StockPickingEvent::MoveQuantitySet(e) => e.occurred_at,
            StockPickingEvent::PickingValidated(e) => e.occurred_at,
            StockPickingEvent::PickingCancelled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for StockPicking {
    type Command = StockPickingCommand;
    type Event = StockPickingEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            StockPickingEvent::PickingCreated(e) => {
                self.id = e.picking_id;
                self.picking_type = e.picking_type;
                self.origin = e.origin.clone();
                self.status = PickingStatus::Draft;
                self.moves.clear();
                self.date_done = None;
                self.created = true;
            }
            StockPickingEvent::MoveAdded(e) => {
                self.moves.push(StockMove {
                    move_no: e.move_no,
                    product_id: e.product_id,
                    product_uom_qty: e.product_uom_qty,
                    quantity: 0,
                });
            }
            StockPickingEvent::PickingMarkedTodo(_) => {
                // Availability is not tracked, so a todo picking is immediately ready.
                self.status = PickingStatus::Assigned;
            }
            StockPickingEvent::MoveQuantitySet(e) => {
                if let Some(m) = self.moves.iter_mut().find(|m| m.move_no == e.move_no) {
                    m.quantity = e.quantity;
                }
            }
            StockPickingEvent::PickingValidated(e) => {
                for (m, qty) in self.moves.iter_mut().zip(&e.done_quantities) {
                    m.quantity = *qty;
                }
                self.status = PickingStatus::Done;
                self.date_done = Some(e.occurred_at);
            }
            StockPickingEvent::PickingCancelled(_) => {
                self.status = PickingStatus::Cancel;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            StockPickingCommand::CreatePicking(cmd) => self.handle_create(cmd),
            StockPickingCommand::AddMove(cmd) => self.handle_add_move(cmd),
            StockPickingCommand::MarkTodo(cmd) => self.handle_mark_todo(cmd),
            StockPickingCommand::SetMoveQuantity(cmd) => self.handle_set_quantity(cmd),
            StockPickingCommand::ValidatePicking(cmd) => self.handle_validate(cmd),
            StockPickingCommand::CancelPicking(cmd) => self.handle_cancel(cmd),
        }
    }
}

impl StockPicking {
    fn ensure_existing(&self, picking_id: PickingId) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        if self.id != picking_id {
            return Err(DomainError::invariant("picking_id mismatch"));
        }
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), DomainError> {
        if self.status.is_terminal() {
            return Err(DomainError::invariant("picking is already done or cancelled"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreatePicking) -> Result<Vec<StockPickingEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("picking already exists"));
        }

        Ok(vec![StockPickingEvent::PickingCreated(PickingCreated {
            picking_id: cmd.picking_id,
            picking_type: cmd.picking_type,
            origin: cmd.origin.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_add_move(&self, cmd: &AddMove) -> Result<Vec<StockPickingEvent>, DomainError> {
        self.ensure_existing(cmd.picking_id)?;
        self.ensure_open()?;

        if cmd.product_uom_qty <= 0 {
            return Err(DomainError::validation("move demand must be positive"));
        }

        Ok(vec![StockPickingEvent::MoveAdded(MoveAdded {
            picking_id: cmd.picking_id,
            move_no: (self.moves.len() as u32) + 1,
            product_id: cmd.product_id,
            product_uom_qty: cmd.product_uom_qty,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_mark_todo(&self, cmd: &MarkTodo) -> Result<Vec<StockPickingEvent>, DomainError> {
        self.ensure_existing(cmd.picking_id)?;

        if self.status != PickingStatus::Draft {
            return Err(DomainError::invariant("only draft pickings can be marked as todo"));
        }
        if self.moves.is_empty() {
            return Err(DomainError::validation("cannot mark a picking without moves as todo"));
        }

        Ok(vec![StockPickingEvent::PickingMarkedTodo(PickingMarkedTodo {
            picking_id: cmd.picking_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_set_quantity(
        &self,
        cmd: &SetMoveQuantity,
    ) -> Result<Vec<StockPickingEvent>, DomainError> {
        self.ensure_existing(cmd.picking_id)?;
        self.ensure_open()?;

        if cmd.quantity < 0 {
            return Err(DomainError::validation("moved quantity must not be negative"));
        }
        if !self.moves.iter().any(|m| m.move_no == cmd.move_no) {
            return Err(DomainError::not_found());
        }

        Ok(vec![StockPickingEvent::MoveQuantitySet(MoveQuantitySet {
            picking_id: cmd.picking_id,
            move_no: cmd.move_no,
            quantity: cmd.quantity,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_validate(&self, cmd: &ValidatePicking) -> Result<Vec<StockPickingEvent>, DomainError> {
        self.ensure_existing(cmd.picking_id)?;
        self.ensure_open()?;

        if self.moves.is_empty() {
            return Err(DomainError::validation("cannot validate a picking without moves"));
        }

        // Moves nobody counted are processed in full.
        let done_quantities = self
            .moves
            .iter()
            .map(|m| if m.quantity > 0 { m.quantity } else { m.product_uom_qty })
            .collect();

        Ok(vec![StockPickingEvent::PickingValidated(PickingValidated {
            picking_id: cmd.picking_id,
            done_quantities,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_cancel(&self, cmd: &CancelPicking) -> Result<Vec<StockPickingEvent>, DomainError> {
        self.ensure_existing(cmd.picking_id)?;
        self.ensure_open()?;

        Ok(vec![StockPickingEvent::PickingCancelled(PickingCancelled {
            picking_id: cmd.picking_id,
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use saledash_events::execute;

    fn picking_id(n: u64) -> PickingId {
        PickingId::new(RecordId::new(n))
    }

    fn product_id(n: u64) -> ProductId {
        ProductId::new(RecordId::new(n))
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    fn created(id: PickingId) -> StockPicking {
        let mut p = StockPicking::empty(id);
        execute(
            &mut p,
            &StockPickingCommand::CreatePicking(CreatePicking {
                picking_id: id,
                picking_type: PickingType::Outgoing,
                origin: Some("S00042".to_string()),
                occurred_at: now(),
            }),
        )
        .unwrap();
        p
    }

    fn add_move(p: &mut StockPicking, qty: i64) -> Result<Vec<StockPickingEvent>, DomainError> {
        let id = p.id_typed();
        execute(
            p,
            &StockPickingCommand::AddMove(AddMove {
                picking_id: id,
                product_id: product_id(1),
                product_uom_qty: qty,
                occurred_at: now(),
            }),
        )
    }

    fn validate(p: &mut StockPicking) -> Result<Vec<StockPickingEvent>, DomainError> {
        let id = p.id_typed();
        execute(
            p,
            &StockPickingCommand::ValidatePicking(ValidatePicking {
                picking_id: id,
                occurred_at: now(),
            }),
        )
    }

    #[test]
    fn create_records_type_and_origin() {
        let p = created(picking_id(7));
        assert_eq!(p.picking_type(), PickingType::Outgoing);
        assert_eq!(p.origin(), Some("S00042"));
        assert_eq!(p.status(), PickingStatus::Draft);
        assert_eq!(p.version(), 1);
    }

    #[test]
    fn validate_completes_uncounted_moves_with_full_demand() {
        let mut p = created(picking_id(7));
        add_move(&mut p, 5).unwrap();
        add_move(&mut p, 3).unwrap();
        execute(
            &mut p,
            &StockPickingCommand::SetMoveQuantity(SetMoveQuantity {
                picking_id: picking_id(7),
                move_no: 2,
                quantity: 2,
                occurred_at: now(),
            }),
        )
        .unwrap();

        validate(&mut p).unwrap();

        assert_eq!(p.status(), PickingStatus::Done);
        assert!(p.date_done().is_some());
        let done: Vec<i64> = p.moves().iter().map(|m| m.quantity).collect();
        assert_eq!(done, vec![5, 2]);
    }

    #[test]
    fn validate_from_ready_state() {
        let mut p = created(picking_id(7));
        add_move(&mut p, 1).unwrap();
        execute(
            &mut p,
            &StockPickingCommand::MarkTodo(MarkTodo {
                picking_id: picking_id(7),
                occurred_at: now(),
            }),
        )
        .unwrap();
        assert_eq!(p.status(), PickingStatus::Assigned);

        validate(&mut p).unwrap();
        assert_eq!(p.status(), PickingStatus::Done);
    }

    #[test]
    fn validate_without_moves_is_rejected_and_leaves_state() {
        let mut p = created(picking_id(7));
        let before = p.clone();

        assert!(matches!(validate(&mut p), Err(DomainError::Validation(_))));
        assert_eq!(p, before);
    }

    #[test]
    fn cannot_validate_twice_or_after_cancel() {
        let mut p = created(picking_id(1));
        add_move(&mut p, 1).unwrap();
        validate(&mut p).unwrap();
        assert!(matches!(validate(&mut p), Err(DomainError::InvariantViolation(_))));

        let mut q = created(picking_id(2));
        add_move(&mut q, 1).unwrap();
        execute(
            &mut q,
            &StockPickingCommand::CancelPicking(CancelPicking {
                picking_id: picking_id(2),
                occurred_at: now(),
            }),
        )
        .unwrap();
        assert!(matches!(validate(&mut q), Err(DomainError::InvariantViolation(_))));
    }

    #[test]
    fn unknown_picking_is_not_found() {
        let mut p = StockPicking::empty(picking_id(3));
        assert_eq!(validate(&mut p).unwrap_err(), DomainError::NotFound);
    }

    #[test]
    fn set_quantity_on_missing_move_is_not_found() {
        let p = created(picking_id(1));
        let err = p
            .handle(&StockPickingCommand::SetMoveQuantity(SetMoveQuantity {
                picking_id: picking_id(1),
                move_no: 9,
                quantity: 1,
                occurred_at: now(),
            }))
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    proptest! {
        #[test]
        fn validated_moves_never_end_at_zero(demands in proptest::collection::vec(1i64..100, 1..10)) {
            let mut p = created(picking_id(4));
            for d in &demands {
                add_move(&mut p, *d).unwrap();
            }
            validate(&mut p).unwrap();

            for (m, d) in p.moves().iter().zip(&demands) {
                prop_assert_eq!(m.quantity, *d);
            }
        }
    }
}
