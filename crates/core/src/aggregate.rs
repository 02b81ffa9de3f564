//! Business records as command/event state machines.

use core::fmt::Debug;
use core::hash::Hash;

/// A host record with a stable id and a transition counter.
pub trait AggregateRoot {
    type Id: Clone + Eq + Hash + Debug;

    fn id(&self) -> &Self::Id;

    /// Number of events applied since the record was created.
    fn version(&self) -> u64;
}

/// A record whose transitions are decided by `handle` and replayed by `apply`.
///
/// `handle` reads state only and either rejects the command or lists the
/// events it implies. `apply` folds one event into state and cannot fail.
/// Neither performs IO: reactions such as bus notifications are run by the
/// host after the events are applied.
pub trait Aggregate: AggregateRoot {
    type Command: Clone + Debug;
    type Event: Clone + Debug;
    type Error: Debug;

    fn apply(&mut self, event: &Self::Event);

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error>;
}
