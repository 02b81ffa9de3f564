use saledash_core::Aggregate;

/// Run `command` against `aggregate` and apply what it decides.
///
/// On rejection the aggregate is left exactly as it was.
pub fn execute<A: Aggregate>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error> {
    let events = aggregate.handle(command)?;
    events.iter().for_each(|ev| aggregate.apply(ev));
    Ok(events)
}
